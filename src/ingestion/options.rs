//! Text parsing options.
//!
//! [`ParseOptions`] is plain data and can be loaded from JSON, so a deployment can describe its
//! document layout (delimiter, header rows, duplicate policy) in a config file:
//!
//! ```rust
//! use master_data::ingestion::{DuplicateKeyPolicy, ParseOptions};
//!
//! # fn main() -> Result<(), master_data::LoadError> {
//! let opts = ParseOptions::from_json_str(r#"{ "delimiter": ",", "duplicate_keys": "keep_last" }"#)?;
//! assert_eq!(opts.delimiter, b',');
//! assert_eq!(opts.header_lines, 3);
//! assert_eq!(opts.duplicate_keys, DuplicateKeyPolicy::KeepLast);
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::LoadResult;

/// What to do when two rows share a primary-key value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateKeyPolicy {
    /// Keep the first accepted record; later duplicates are rejected with a diagnostic.
    #[default]
    KeepFirst,
    /// Replace the earlier record with the later one (keeping the earlier position); the
    /// collision is still reported with a diagnostic carrying the later row's line and tokens.
    KeepLast,
}

/// Options controlling how a delimited text document is parsed.
///
/// Use [`Default`] for the standard layout: tab-separated, `"`-quoted, 3 header lines,
/// first-wins duplicate keys, no binary output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParseOptions {
    /// Field delimiter (single ASCII character).
    #[serde(with = "ascii_char")]
    pub delimiter: u8,
    /// Quote character (single ASCII character).
    #[serde(with = "ascii_char")]
    pub quote: u8,
    /// Number of leading non-empty lines reserved for headers/metadata.
    pub header_lines: usize,
    /// Duplicate primary-key handling.
    pub duplicate_keys: DuplicateKeyPolicy,
    /// Also produce the versioned binary blob when building.
    pub emit_binary: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            delimiter: b'\t',
            quote: b'"',
            header_lines: 3,
            duplicate_keys: DuplicateKeyPolicy::default(),
            emit_binary: false,
        }
    }
}

impl ParseOptions {
    /// Read options from a JSON object; missing keys take their default.
    pub fn from_json_str(input: &str) -> LoadResult<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Minimum number of non-empty lines a document needs (headers plus one data row).
    pub fn min_document_lines(&self) -> usize {
        self.header_lines.saturating_add(1)
    }
}

mod ascii_char {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u8, serializer: S) -> Result<S::Ok, S::Error> {
        let mut buf = [0u8; 4];
        serializer.serialize_str(char::from(*value).encode_utf8(&mut buf))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
        let s = String::deserialize(deserializer)?;
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii() => Ok(c as u8),
            _ => Err(<D::Error as Error>::custom(format!(
                "expected a single ASCII character, got {s:?}"
            ))),
        }
    }
}
