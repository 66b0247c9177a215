use strum::IntoEnumIterator;

use crate::{
    egs::{LocalizationRecord, LocalizationTable},
    steam::{AchievementKeys, LanguageTokens, SteamLanguage},
};

/// The sentinel locale whose row donates icon paths to rows added by the
/// merge. It is never a displayed locale.
pub const DEFAULT_SENTINEL_LOCALE: &str = "default";

#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Append a fresh row even when one already exists for (name, locale)
    /// instead of updating it in place.
    pub override_existing: bool,
    /// Refresh the icons of updated rows from the achievement's default row.
    pub overwrite_icons_in_existing: bool,
    /// Locale whose row seeds a synthesized "default" row for achievements
    /// that have none. None disables the synthesis.
    pub default_locale: Option<String>,
}

impl Default for MergeOptions {
    fn default() -> Self {
        MergeOptions {
            override_existing: false,
            overwrite_icons_in_existing: true,
            default_locale: Some("en-US".to_string()),
        }
    }
}

/**
Merges Steam achievement tokens into an EGS localization table.

Walks achievements in key-mapping order and languages in
[`SteamLanguage`] order. For each pair, the `{key}_NAME` / `{key}_DESC`
tokens become the row's titles and descriptions (locked and unlocked
variants are always set equal); a language whose tokens are missing or
empty is skipped without touching the table. Rows appended by the merge
take their icon paths from the achievement's `"default"` row, when one
exists.

After an achievement's languages are processed, an achievement that had no
`"default"` row gets one synthesized by cloning its row at
`options.default_locale`. The clone is appended after the language rows,
so it only becomes an icon donor on the next run over the written table.
*/
pub fn merge_localizations(
    keys: &AchievementKeys,
    tokens: &LanguageTokens,
    table: &mut LocalizationTable,
    options: &MergeOptions,
) {
    for (steam_key, identifier) in keys.iter() {
        let default_row = table.find(identifier, DEFAULT_SENTINEL_LOCALE);
        let had_default_row = default_row.is_some();

        let (default_locked_icon, default_unlocked_icon) = match default_row {
            Some(row) => (row.locked_icon.clone(), row.unlocked_icon.clone()),
            None => (String::new(), String::new()),
        };

        for language in SteamLanguage::iter() {
            let locale = language.egs_locale();

            let title = tokens.token(language, &format!("{steam_key}_NAME"));
            let description = tokens.token(language, &format!("{steam_key}_DESC"));

            let (Some(title), Some(description)) = (title, description) else {
                continue;
            };

            if title.is_empty() || description.is_empty() {
                continue;
            }

            let update_existing =
                !options.override_existing && table.find(identifier, locale).is_some();

            if update_existing {
                if let Some(row) = table.find_mut(identifier, locale) {
                    row.locked_title = title.to_string();
                    row.unlocked_title = title.to_string();
                    row.locked_description = description.to_string();
                    row.unlocked_description = description.to_string();

                    if options.overwrite_icons_in_existing && had_default_row {
                        row.locked_icon = default_locked_icon.clone();
                        row.unlocked_icon = default_unlocked_icon.clone();
                    }
                }
            } else {
                table.push(LocalizationRecord {
                    name: identifier.to_string(),
                    locale: locale.to_string(),
                    locked_title: title.to_string(),
                    locked_description: description.to_string(),
                    unlocked_title: title.to_string(),
                    unlocked_description: description.to_string(),
                    flavor_text: String::new(),
                    locked_icon: default_locked_icon.clone(),
                    unlocked_icon: default_unlocked_icon.clone(),
                });
            }
        }

        // The donor lookup above already ran for this achievement, so a row
        // synthesized here feeds icon propagation from the next run onward.
        if !had_default_row {
            if let Some(default_locale) = options.default_locale.as_deref() {
                if let Some(source) = table.find(identifier, default_locale) {
                    let mut row = source.clone();
                    row.locale = DEFAULT_SENTINEL_LOCALE.to_string();

                    table.push(row);
                }
            }
        }
    }
}
