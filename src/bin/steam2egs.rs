use std::{fs, path::PathBuf};

use clap::Parser;

use steam2egs::{
    convert::{MergeOptions, merge_localizations},
    egs::LocalizationTable,
    keyvalues::KvBlock,
    steam::{AchievementKeys, LanguageTokens},
};

#[derive(Parser, Debug)]
#[command(version, about = "Convert Steam achievement localization data into an EGS import table")]
struct Cli {
    /// Steam keys VDF mapping achievement keys to game identifiers
    #[arg(long, value_name = "FILE", default_value = "in-keys.vdf")]
    keys: PathBuf,

    /// Steam localization VDF holding the per-language token blocks
    #[arg(long, value_name = "FILE", default_value = "in-loc_all.vdf")]
    loc: PathBuf,

    /// Existing EGS achievement localization table (skipped if absent)
    #[arg(long, value_name = "FILE", default_value = "in-achievementLocalizations.csv")]
    table: PathBuf,

    /// The path which the merged table will be written to
    #[arg(short = 'o', long, value_name = "FILE", default_value = "out-achievementLocalizations.csv")]
    out: PathBuf,

    /// Append fresh rows instead of updating matching existing ones
    #[arg(long)]
    override_existing: bool,

    /// Leave the icons of existing rows untouched
    #[arg(long)]
    keep_icons: bool,

    /// Locale whose rows seed missing "default" rows (empty to disable)
    #[arg(long, value_name = "LOCALE", default_value = "en-US")]
    default_locale: String,
}

fn main() {
    let cli = Cli::parse();

    let keys_text = match fs::read_to_string(&cli.keys) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Unable to read keys file {}. Error: {}", cli.keys.display(), e);
            error_exit();
        }
    };

    let keys_root = match KvBlock::parse(&keys_text) {
        Ok(root) => root,
        Err(e) => {
            eprintln!("Unable to parse {}. Error: {}", cli.keys.display(), e);
            error_exit();
        }
    };

    let keys = match AchievementKeys::from_keyvalues(&keys_root) {
        Ok(keys) => keys,
        Err(e) => {
            eprintln!("Unable to read key mapping from {}. Error: {}", cli.keys.display(), e);
            error_exit();
        }
    };

    let loc_text = match fs::read_to_string(&cli.loc) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Unable to read localization file {}. Error: {}", cli.loc.display(), e);
            error_exit();
        }
    };

    let loc_root = match KvBlock::parse(&loc_text) {
        Ok(root) => root,
        Err(e) => {
            eprintln!("Unable to parse {}. Error: {}", cli.loc.display(), e);
            error_exit();
        }
    };

    let tokens = match LanguageTokens::from_keyvalues(&loc_root) {
        Ok(tokens) => tokens,
        Err(e) => {
            eprintln!("Unable to read language tokens from {}. Error: {}", cli.loc.display(), e);
            error_exit();
        }
    };

    let mut table = if cli.table.is_file() {
        match LocalizationTable::load(&cli.table) {
            Ok(table) => table,
            Err(e) => {
                eprintln!("Unable to read table {}. Error: {}", cli.table.display(), e);
                error_exit();
            }
        }
    } else {
        println!(
            "No existing table at {}, starting from an empty one.",
            cli.table.display()
        );

        LocalizationTable::default()
    };

    let options = MergeOptions {
        override_existing: cli.override_existing,
        overwrite_icons_in_existing: !cli.keep_icons,
        default_locale: match cli.default_locale.is_empty() {
            true => None,
            false => Some(cli.default_locale.clone()),
        },
    };

    println!(
        "Merging {} achievements from {} into {} existing rows.",
        keys.len(),
        cli.keys.display(),
        table.len()
    );

    merge_localizations(&keys, &tokens, &mut table, &options);

    if let Err(e) = table.save(&cli.out) {
        eprintln!("Failed to write output table. Error: {}", e);

        error_exit();
    }

    println!("Wrote {} rows to {}", table.len(), cli.out.display());
}

fn error_exit() -> ! {
    eprintln!("\nUnable to continue.");

    std::process::exit(1);
}
