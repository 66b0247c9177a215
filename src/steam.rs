use std::fmt;

use indexmap::IndexMap;
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::keyvalues::{KvBlock, KvValue};

/// The Steam languages recognised by the conversion, in the order the merge
/// pass walks them. Hungarian is deliberately absent (EGS has no locale for
/// it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum SteamLanguage {
    English,
    French,
    Korean,
    SChinese,
    TChinese,
    Japanese,
    Portuguese,
    Finnish,
    Turkish,
}

impl SteamLanguage {
    /// The locale code EGS uses for this source language.
    pub fn egs_locale(self) -> &'static str {
        match self {
            SteamLanguage::English => "en-US",
            SteamLanguage::French => "fr",
            SteamLanguage::Korean => "ko",
            SteamLanguage::SChinese => "zh-Hans",
            SteamLanguage::TChinese => "zh-Hant",
            SteamLanguage::Japanese => "ja",
            SteamLanguage::Portuguese => "pt-BR",
            SteamLanguage::Finnish => "fi",
            SteamLanguage::Turkish => "tr",
        }
    }
}

#[derive(Debug)]
pub enum SteamDataError {
    /// The expected top-level block was not present in the file.
    MissingBlock(&'static str),
    /// A key that should hold a plain string held a block instead.
    ExpectedString(String),
    /// A key that should hold a block held a plain string instead.
    ExpectedBlock(String),
}

impl fmt::Display for SteamDataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SteamDataError::MissingBlock(name) => {
                write!(f, "Missing \"{}\" block at the top of the file", name)
            }
            SteamDataError::ExpectedString(key) => {
                write!(f, "Key \"{}\" holds a block where a string was expected", key)
            }
            SteamDataError::ExpectedBlock(key) => {
                write!(f, "Key \"{}\" holds a string where a block was expected", key)
            }
        }
    }
}

impl std::error::Error for SteamDataError {}

/// The achievement key mapping from the Steam `keys` file: each Steam script
/// key (e.g. `ACH_WIN`) paired with the game-level achievement identifier.
/// File order is preserved; the merge pass walks achievements in this order.
#[derive(Debug, Default)]
pub struct AchievementKeys {
    keys: IndexMap<String, String>,
}

impl AchievementKeys {
    /**
    Reads the mapping out of a parsed keys file.

    The file carries a single top-level `"keys"` block whose entries map
    Steam keys to game identifiers.

    # Errors
    - [`SteamDataError::MissingBlock`] when there is no `"keys"` block
    - [`SteamDataError::ExpectedString`] when an entry holds a nested block
    */
    pub fn from_keyvalues(root: &KvBlock) -> Result<AchievementKeys, SteamDataError> {
        let block = root
            .get_block("keys")
            .ok_or(SteamDataError::MissingBlock("keys"))?;

        let mut keys = IndexMap::new();

        for (steam_key, value) in block.iter() {
            match value {
                KvValue::Str(identifier) => {
                    keys.insert(steam_key.to_string(), identifier.clone());
                }
                KvValue::Block(_) => {
                    return Err(SteamDataError::ExpectedString(steam_key.to_string()));
                }
            }
        }

        Ok(AchievementKeys { keys })
    }

    /// (steam key, game identifier) pairs in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.keys.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Per-language token sets from the Steam `loc_all` file: language name to a
/// flat token-name → translated-text map. Read-only after load.
#[derive(Debug, Default)]
pub struct LanguageTokens {
    languages: IndexMap<String, IndexMap<String, String>>,
}

impl LanguageTokens {
    /**
    Reads the token tree out of a parsed localization file.

    The file carries a single top-level `"lang"` block; each entry in it is a
    language block holding its strings under a `"Tokens"` sub-block. A
    language without a `"Tokens"` sub-block yields an empty token set.

    # Errors
    - [`SteamDataError::MissingBlock`] when there is no `"lang"` block
    - [`SteamDataError::ExpectedBlock`] when a language entry is a string
    */
    pub fn from_keyvalues(root: &KvBlock) -> Result<LanguageTokens, SteamDataError> {
        let lang_block = root
            .get_block("lang")
            .ok_or(SteamDataError::MissingBlock("lang"))?;

        let mut languages = IndexMap::new();

        for (language, value) in lang_block.iter() {
            let KvValue::Block(body) = value else {
                return Err(SteamDataError::ExpectedBlock(language.to_string()));
            };

            let mut tokens = IndexMap::new();

            if let Some(token_block) = body.get_block("Tokens") {
                for (name, value) in token_block.iter() {
                    if let KvValue::Str(text) = value {
                        tokens.insert(name.to_string(), text.clone());
                    }
                }
            }

            languages.insert(language.to_string(), tokens);
        }

        Ok(LanguageTokens { languages })
    }

    /// Looks up a token by exact name for one language. Returns None for an
    /// unknown language or token.
    pub fn token(&self, language: SteamLanguage, name: &str) -> Option<&str> {
        self.languages
            .get(language.as_ref())
            .and_then(|tokens| tokens.get(name))
            .map(|text| text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn language_table_is_complete_and_ordered() {
        let mapped: Vec<(String, &str)> = SteamLanguage::iter()
            .map(|lang| (lang.to_string(), lang.egs_locale()))
            .collect();

        assert_eq!(
            mapped,
            [
                ("english".to_string(), "en-US"),
                ("french".to_string(), "fr"),
                ("korean".to_string(), "ko"),
                ("schinese".to_string(), "zh-Hans"),
                ("tchinese".to_string(), "zh-Hant"),
                ("japanese".to_string(), "ja"),
                ("portuguese".to_string(), "pt-BR"),
                ("finnish".to_string(), "fi"),
                ("turkish".to_string(), "tr"),
            ]
        );
    }

    #[test]
    fn keys_load_in_file_order() {
        let root = KvBlock::parse(
            r#"
            "keys"
            {
                "ACH_WIN"   "Achievement_Win"
                "ACH_LOSE"  "Achievement_Lose"
            }
            "#,
        )
        .unwrap();

        let keys = AchievementKeys::from_keyvalues(&root).unwrap();

        let pairs: Vec<(&str, &str)> = keys.iter().collect();
        assert_eq!(
            pairs,
            [
                ("ACH_WIN", "Achievement_Win"),
                ("ACH_LOSE", "Achievement_Lose"),
            ]
        );
    }

    #[test]
    fn missing_keys_block_is_an_error() {
        let root = KvBlock::parse("\"notkeys\" { }").unwrap();

        let err = AchievementKeys::from_keyvalues(&root).unwrap_err();
        assert!(matches!(err, SteamDataError::MissingBlock("keys")));
    }

    #[test]
    fn tokens_resolve_per_language() {
        let root = KvBlock::parse(
            r#"
            "lang"
            {
                "english"
                {
                    "Tokens"
                    {
                        "ACH_WIN_NAME"  "Victory"
                    }
                }
                "japanese"
                {
                }
            }
            "#,
        )
        .unwrap();

        let tokens = LanguageTokens::from_keyvalues(&root).unwrap();

        assert_eq!(
            tokens.token(SteamLanguage::English, "ACH_WIN_NAME"),
            Some("Victory")
        );
        // Language present but without a Tokens block
        assert_eq!(tokens.token(SteamLanguage::Japanese, "ACH_WIN_NAME"), None);
        // Language absent from the file entirely
        assert_eq!(tokens.token(SteamLanguage::French, "ACH_WIN_NAME"), None);
    }

    #[test]
    fn language_entry_must_be_a_block() {
        let root = KvBlock::parse("\"lang\" { \"english\" \"oops\" }").unwrap();

        let err = LanguageTokens::from_keyvalues(&root).unwrap_err();
        match err {
            SteamDataError::ExpectedBlock(key) => assert_eq!(key, "english"),
            other => panic!("Expected ExpectedBlock, got {:?}", other),
        }
    }
}
