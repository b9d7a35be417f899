//! Database builder: text document to sealed [`Database`] plus diagnostics.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;

use crate::database::{encode_records, Database};
use crate::types::MasterRecord;

use super::diagnostics::{DiagnosticCause, DiagnosticKind, ParseDiagnostic};
use super::options::{DuplicateKeyPolicy, ParseOptions};
use super::record::parse_record;
use super::tokenizer::tokenize_line;

/// Result of a build: the sealed database, every diagnostic collected on the way, and the
/// binary blob when [`ParseOptions::emit_binary`] is set.
#[derive(Debug, Clone)]
pub struct BuildOutput<R: MasterRecord> {
    pub database: Database<R>,
    pub diagnostics: Vec<ParseDiagnostic>,
    pub binary: Option<Vec<u8>>,
}

impl<R: MasterRecord> BuildOutput<R> {
    /// Diagnostics of one kind.
    pub fn diagnostics_of(&self, kind: DiagnosticKind) -> impl Iterator<Item = &ParseDiagnostic> {
        self.diagnostics.iter().filter(move |d| d.kind() == kind)
    }
}

/// Accumulates records, resolves primary-key collisions, and seals a [`Database`].
///
/// The builder is the only mutable stage; [`DatabaseBuilder::build`] consumes it.
pub struct DatabaseBuilder<R: MasterRecord> {
    options: ParseOptions,
    records: Vec<R>,
    index: HashMap<R::Key, usize>,
    // Source line of each accepted record (0 when appended in code).
    lines: Vec<usize>,
    diagnostics: Vec<ParseDiagnostic>,
}

impl<R: MasterRecord> DatabaseBuilder<R> {
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            records: Vec::new(),
            index: HashMap::new(),
            lines: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Builder with default parse options and the given duplicate-key policy.
    pub fn with_policy(policy: DuplicateKeyPolicy) -> Self {
        Self::new(ParseOptions {
            duplicate_keys: policy,
            ..ParseOptions::default()
        })
    }

    /// Number of records accepted so far.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn diagnostics(&self) -> &[ParseDiagnostic] {
        &self.diagnostics
    }

    /// Add a record built in code. Returns `false` if it was rejected as a duplicate.
    pub fn append(&mut self, record: R) -> bool {
        self.accept(record, 0, None, &[])
    }

    /// Parse a whole delimited text document and add its valid rows.
    ///
    /// Lines are split on `\n` or `\r\n`; blank lines are dropped; the first
    /// [`ParseOptions::header_lines`] remaining lines are skipped. A document with fewer than
    /// `header_lines + 1` non-empty lines is rejected as a whole with a single
    /// [`DiagnosticCause::DocumentTooShort`]. Otherwise every data row is tokenized and parsed
    /// independently; a bad row produces a diagnostic and the loop moves on.
    pub fn append_text(&mut self, text: &str) {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let lines: Vec<(usize, &str)> = text
            .split('\n')
            .enumerate()
            .map(|(i, line)| (i + 1, line.strip_suffix('\r').unwrap_or(line)))
            .filter(|(_, line)| !line.trim().is_empty())
            .collect();

        let required = self.options.min_document_lines();
        if lines.len() < required {
            self.diagnostics
                .push(ParseDiagnostic::document(DiagnosticCause::DocumentTooShort {
                    found: lines.len(),
                    required,
                }));
            return;
        }

        let (delimiter, quote) = (self.options.delimiter, self.options.quote);
        for (idx0, &(line_no, line)) in lines[self.options.header_lines..].iter().enumerate() {
            let row = Some(idx0 + 1);
            let tokens = tokenize_line(line, delimiter, quote);
            match parse_record::<R>(line_no, row, &tokens) {
                Ok(record) => {
                    self.accept(record, line_no, row, &tokens);
                }
                Err(diagnostic) => self.diagnostics.push(diagnostic),
            }
        }
    }

    fn accept(&mut self, record: R, line: usize, row: Option<usize>, tokens: &[String]) -> bool {
        match self.index.entry(record.key()) {
            Entry::Vacant(e) => {
                e.insert(self.records.len());
                self.records.push(record);
                self.lines.push(line);
                true
            }
            Entry::Occupied(e) => {
                let pos = *e.get();
                self.diagnostics.push(ParseDiagnostic::row(
                    line,
                    row,
                    tokens.to_vec(),
                    DiagnosticCause::DuplicatePrimaryKey {
                        key: format!("{:?}", e.key()),
                        first_line: self.lines[pos],
                    },
                ));
                match self.options.duplicate_keys {
                    DuplicateKeyPolicy::KeepFirst => false,
                    DuplicateKeyPolicy::KeepLast => {
                        self.records[pos] = record;
                        self.lines[pos] = line;
                        true
                    }
                }
            }
        }
    }

    /// Seal the accumulated records.
    pub fn build(self) -> BuildOutput<R> {
        let binary = self
            .options
            .emit_binary
            .then(|| encode_records(&self.records));
        BuildOutput {
            database: Database::from_parts(self.records, self.index),
            diagnostics: self.diagnostics,
            binary,
        }
    }
}

impl<R: MasterRecord> fmt::Debug for DatabaseBuilder<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseBuilder")
            .field("options", &self.options)
            .field("records", &self.records.len())
            .field("diagnostics", &self.diagnostics.len())
            .finish()
    }
}

/// Parse `text` and seal the result in one call.
///
/// ```rust
/// use master_data::ingestion::{build_database_from_text, DiagnosticKind, ParseOptions};
/// use master_data::records::PlanetMaster;
///
/// let text = "planet master\nid\tname\tname_jp\tcenter\tradius\tgravity\tspeed\tlight\touter\n\
///             int\tstring\tstring\tint\tfloat\tfloat\tfloat\tfloat\tfloat\n\
///             1\tMars\t火星\t0\t3389.5\t3.72\t24.1\t1.52\t0.1\n\
///             2\tVenus\t\t0\t6051.8\t8.87\n";
/// let out = build_database_from_text::<PlanetMaster>(text, &ParseOptions::default());
/// assert_eq!(out.database.count(), 1);
/// assert_eq!(out.diagnostics.len(), 1);
/// assert_eq!(out.diagnostics[0].kind(), DiagnosticKind::RowShape);
/// ```
pub fn build_database_from_text<R: MasterRecord>(text: &str, options: &ParseOptions) -> BuildOutput<R> {
    let mut builder = DatabaseBuilder::new(options.clone());
    builder.append_text(text);
    builder.build()
}
