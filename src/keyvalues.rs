use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

/// A single value inside a KeyValues document: either a plain string or a
/// nested `{ ... }` block.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum KvValue {
    Str(String),
    Block(KvBlock),
}

/**
An ordered block of a Valve KeyValues ("VDF") text document.

Steam's achievement files are plain KeyValues text: quoted (or bare) keys,
each followed by either a quoted/bare string value or a nested brace block,
with `//` line comments. Entry order follows file order, which matters for
the conversion pass.

# Examples
```
use steam2egs::keyvalues::KvBlock;

let root = KvBlock::parse("\"keys\" { \"ACH_WIN\" \"Achievement_Win\" }")
    .expect("Unable to parse KeyValues.");

let keys = root.get_block("keys").expect("Missing keys block.");
assert_eq!(keys.get_str("ACH_WIN"), Some("Achievement_Win"));
```
*/
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct KvBlock {
    entries: IndexMap<String, KvValue>,
}

#[derive(Debug)]
pub enum KvParseError {
    /// A quoted string was still open when the input ended.
    UnterminatedString { line: usize },
    /// A `{` block was never closed.
    UnclosedBlock { line: usize },
    /// A `}` appeared with no block open.
    StrayClose { line: usize },
    /// A `{` appeared where a key was expected.
    BlockWithoutKey { line: usize },
    /// A key reached the end of its block without a value.
    MissingValue { key: String, line: usize },
}

impl fmt::Display for KvParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KvParseError::UnterminatedString { line } => {
                write!(f, "Unterminated quoted string starting on line {}", line)
            }
            KvParseError::UnclosedBlock { line } => {
                write!(f, "Block opened on line {} is never closed", line)
            }
            KvParseError::StrayClose { line } => {
                write!(f, "Unexpected '}}' on line {}", line)
            }
            KvParseError::BlockWithoutKey { line } => {
                write!(f, "Unexpected '{{' with no key on line {}", line)
            }
            KvParseError::MissingValue { key, line } => {
                write!(f, "Key \"{}\" on line {} has no value", key, line)
            }
        }
    }
}

impl std::error::Error for KvParseError {}

enum Token {
    Str { text: String, line: usize },
    Open { line: usize },
    Close { line: usize },
}

struct Tokenizer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
}

impl<'a> Tokenizer<'a> {
    fn new(input: &'a str) -> Tokenizer<'a> {
        Tokenizer {
            chars: input.chars().peekable(),
            line: 1,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next();
        if c == Some('\n') {
            self.line += 1;
        }
        c
    }

    fn next_token(&mut self) -> Result<Option<Token>, KvParseError> {
        loop {
            let Some(&c) = self.chars.peek() else {
                return Ok(None);
            };

            match c {
                c if c.is_whitespace() => {
                    self.bump();
                }
                '/' => {
                    self.bump();

                    if self.chars.peek() == Some(&'/') {
                        while let Some(c) = self.bump() {
                            if c == '\n' {
                                break;
                            }
                        }
                    } else {
                        // A lone slash starts a bare token
                        return Ok(Some(self.bare_token('/')));
                    }
                }
                '{' => {
                    let line = self.line;
                    self.bump();
                    return Ok(Some(Token::Open { line }));
                }
                '}' => {
                    let line = self.line;
                    self.bump();
                    return Ok(Some(Token::Close { line }));
                }
                '"' => return self.quoted_token().map(Some),
                _ => {
                    self.bump();
                    return Ok(Some(self.bare_token(c)));
                }
            }
        }
    }

    fn bare_token(&mut self, first: char) -> Token {
        let line = self.line;
        let mut text = String::new();
        text.push(first);

        while let Some(&c) = self.chars.peek() {
            if c.is_whitespace() || matches!(c, '"' | '{' | '}') {
                break;
            }

            text.push(c);
            self.bump();
        }

        Token::Str { text, line }
    }

    fn quoted_token(&mut self) -> Result<Token, KvParseError> {
        let line = self.line;
        self.bump(); // opening quote

        let mut text = String::new();

        loop {
            match self.bump() {
                None => return Err(KvParseError::UnterminatedString { line }),
                Some('"') => return Ok(Token::Str { text, line }),
                Some('\\') => match self.bump() {
                    None => return Err(KvParseError::UnterminatedString { line }),
                    Some('n') => text.push('\n'),
                    Some('t') => text.push('\t'),
                    // \" and \\ pass the character through
                    Some(c) => text.push(c),
                },
                Some(c) => text.push(c),
            }
        }
    }
}

impl KvBlock {
    /**
    Parses a KeyValues document into its root block.

    # Errors
    Returns a [`KvParseError`] carrying the 1-based line number of the
    offending token when the input is not well-formed.
    */
    pub fn parse(input: &str) -> Result<KvBlock, KvParseError> {
        let mut tokens = Tokenizer::new(input);

        KvBlock::parse_block(&mut tokens, None)
    }

    /// Parses the entries of one block. `opened_at` is the line of the `{`
    /// that opened it, or None for the document root.
    fn parse_block(
        tokens: &mut Tokenizer,
        opened_at: Option<usize>,
    ) -> Result<KvBlock, KvParseError> {
        let mut block = KvBlock::default();

        loop {
            match tokens.next_token()? {
                None => match opened_at {
                    Some(line) => return Err(KvParseError::UnclosedBlock { line }),
                    None => return Ok(block),
                },
                Some(Token::Close { line }) => match opened_at {
                    Some(_) => return Ok(block),
                    None => return Err(KvParseError::StrayClose { line }),
                },
                Some(Token::Open { line }) => {
                    return Err(KvParseError::BlockWithoutKey { line });
                }
                Some(Token::Str { text: key, line }) => match tokens.next_token()? {
                    Some(Token::Str { text, .. }) => {
                        block.entries.insert(key, KvValue::Str(text));
                    }
                    Some(Token::Open { line }) => {
                        let child = KvBlock::parse_block(tokens, Some(line))?;
                        block.entries.insert(key, KvValue::Block(child));
                    }
                    Some(Token::Close { line }) => {
                        return Err(KvParseError::MissingValue { key, line });
                    }
                    None => {
                        return Err(KvParseError::MissingValue { key, line });
                    }
                },
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&KvValue> {
        self.entries.get(key)
    }

    /// Returns the string value under `key`, or None if the key is absent or
    /// holds a block.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.entries.get(key) {
            Some(KvValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    /// Returns the nested block under `key`, or None if the key is absent or
    /// holds a string.
    pub fn get_block(&self, key: &str) -> Option<&KvBlock> {
        match self.entries.get(key) {
            Some(KvValue::Block(b)) => Some(b),
            _ => None,
        }
    }

    /// Entries in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &KvValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn insert<K: Into<String>>(&mut self, key: K, value: KvValue) {
        self.entries.insert(key.into(), value);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_blocks_parse_in_order() {
        let root = KvBlock::parse(
            r#"
            "lang"
            {
                "english"
                {
                    "Tokens"
                    {
                        "ACH_WIN_NAME"  "Victory"
                        "ACH_WIN_DESC"  "Win a match"
                    }
                }
                "french"
                {
                    "Tokens"
                    {
                        "ACH_WIN_NAME"  "Victoire"
                    }
                }
            }
            "#,
        )
        .unwrap();

        let lang = root.get_block("lang").unwrap();
        let names: Vec<&str> = lang.iter().map(|(k, _)| k).collect();
        assert_eq!(names, ["english", "french"]);

        let tokens = lang
            .get_block("english")
            .and_then(|b| b.get_block("Tokens"))
            .unwrap();

        assert_eq!(tokens.get_str("ACH_WIN_NAME"), Some("Victory"));
        assert_eq!(tokens.get_str("ACH_WIN_DESC"), Some("Win a match"));
        assert_eq!(tokens.get_str("ACH_WIN_ICON"), None);
    }

    #[test]
    fn escapes_and_bare_tokens() {
        let root = KvBlock::parse(
            "key1 \"a \\\"quoted\\\" word\"\nkey2 \"line one\\nline two\"\nbare_key bare_value",
        )
        .unwrap();

        assert_eq!(root.get_str("key1"), Some("a \"quoted\" word"));
        assert_eq!(root.get_str("key2"), Some("line one\nline two"));
        assert_eq!(root.get_str("bare_key"), Some("bare_value"));
    }

    #[test]
    fn comments_are_ignored() {
        let root = KvBlock::parse(
            r#"
            // leading comment
            "a" "1" // trailing comment
            "b" // comment between key and value
                "2"
            "#,
        )
        .unwrap();

        assert_eq!(root.get_str("a"), Some("1"));
        assert_eq!(root.get_str("b"), Some("2"));
        assert_eq!(root.len(), 2);
    }

    #[test]
    fn empty_values_are_kept() {
        let root = KvBlock::parse("\"hungarian_name\" \"\"").unwrap();

        assert_eq!(root.get_str("hungarian_name"), Some(""));
    }

    #[test]
    fn string_lookup_on_block_returns_none() {
        let root = KvBlock::parse("\"keys\" { }").unwrap();

        assert_eq!(root.get_str("keys"), None);
        assert!(root.get_block("keys").unwrap().is_empty());
    }

    #[test]
    fn manually_built_blocks_compare_equal_to_parsed() {
        let mut tokens = KvBlock::default();
        tokens.insert("ACH_WIN_NAME", KvValue::Str("Victory".to_string()));

        let mut root = KvBlock::default();
        root.insert("Tokens", KvValue::Block(tokens));

        let parsed = KvBlock::parse("\"Tokens\" { \"ACH_WIN_NAME\" \"Victory\" }").unwrap();

        assert_eq!(parsed, root);
        assert!(matches!(root.get("Tokens"), Some(KvValue::Block(_))));
    }

    #[test]
    fn unclosed_block_names_opening_line() {
        let err = KvBlock::parse("\"keys\"\n{\n\"a\" \"1\"\n").unwrap_err();

        match err {
            KvParseError::UnclosedBlock { line } => assert_eq!(line, 2),
            other => panic!("Expected UnclosedBlock, got {:?}", other),
        }
    }

    #[test]
    fn stray_close_is_rejected() {
        let err = KvBlock::parse("\"a\" \"1\"\n}").unwrap_err();

        match err {
            KvParseError::StrayClose { line } => assert_eq!(line, 2),
            other => panic!("Expected StrayClose, got {:?}", other),
        }
    }

    #[test]
    fn key_without_value_is_rejected() {
        let err = KvBlock::parse("\"keys\" { \"dangling\" }").unwrap_err();

        match err {
            KvParseError::MissingValue { key, .. } => assert_eq!(key, "dangling"),
            other => panic!("Expected MissingValue, got {:?}", other),
        }
    }

    #[test]
    fn unterminated_string_is_rejected() {
        let err = KvBlock::parse("\"a\" \"never ends").unwrap_err();

        assert!(matches!(err, KvParseError::UnterminatedString { line: 1 }));
    }
}
