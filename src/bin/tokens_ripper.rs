use std::path::Path;

use steam2egs::keyvalues::KvBlock;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let vdf_path = Path::new(&args[1]);

    let text = std::fs::read_to_string(vdf_path).expect("Failed to read file.");

    let root = KvBlock::parse(&text).expect("Failed to parse KeyValues.");

    std::fs::write(
        format!(
            "./out/tokens_{}.json",
            vdf_path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .expect("Failed to get file stem.")
        ),
        serde_json::to_vec_pretty(&root).expect("Failed to serialise"),
    )
    .expect("Failed to write serialised token tree.");
}
