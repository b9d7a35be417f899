//! Row- and document-level ingestion failures.
//!
//! Diagnostics are data: the builder collects them next to the database it produces and never
//! stops on one (except [`DiagnosticCause::DocumentTooShort`], which ends the parse before any
//! row is looked at).

use std::fmt;

use thiserror::Error;

use crate::types::DataType;

/// Why a row (or the whole document) was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiagnosticCause {
    /// The document has no room for a data row after the header lines.
    #[error("document too short: {found} non-empty lines, need at least {required}")]
    DocumentTooShort { found: usize, required: usize },

    /// The row has fewer columns than the schema requires.
    #[error("wrong column count: expected at least {expected}, found {found}")]
    RowShape { expected: usize, found: usize },

    /// A token could not be converted to its field's declared type.
    #[error("field {index} ('{field}') is not a valid {data_type}: {message} (raw='{raw}')")]
    FieldCoercion {
        index: usize,
        field: String,
        data_type: DataType,
        raw: String,
        message: String,
    },

    /// The row's primary key was already taken by an accepted record.
    #[error("duplicate primary key {key} (first accepted on line {first_line})")]
    DuplicatePrimaryKey { key: String, first_line: usize },

    /// Values matched the schema but the record type refused them.
    #[error("record rejected: {message}")]
    RecordConstruction { message: String },
}

/// Fieldless classification of a [`DiagnosticCause`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    DocumentTooShort,
    RowShape,
    FieldCoercion,
    DuplicatePrimaryKey,
    RecordConstruction,
}

/// One ingestion failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDiagnostic {
    /// 1-based physical line in the document; `0` for document-level diagnostics.
    pub line: usize,
    /// 1-based ordinal of the data row (after header lines); `None` for document-level
    /// diagnostics and records appended in code.
    pub row: Option<usize>,
    /// Raw tokens of the row, as produced by the tokenizer.
    pub tokens: Vec<String>,
    /// What went wrong.
    pub cause: DiagnosticCause,
}

impl ParseDiagnostic {
    /// Document-level diagnostic (no line, no tokens).
    pub fn document(cause: DiagnosticCause) -> Self {
        Self {
            line: 0,
            row: None,
            tokens: Vec::new(),
            cause,
        }
    }

    /// Diagnostic for one data row.
    pub fn row(line: usize, row: Option<usize>, tokens: Vec<String>, cause: DiagnosticCause) -> Self {
        Self {
            line,
            row,
            tokens,
            cause,
        }
    }

    pub fn kind(&self) -> DiagnosticKind {
        match self.cause {
            DiagnosticCause::DocumentTooShort { .. } => DiagnosticKind::DocumentTooShort,
            DiagnosticCause::RowShape { .. } => DiagnosticKind::RowShape,
            DiagnosticCause::FieldCoercion { .. } => DiagnosticKind::FieldCoercion,
            DiagnosticCause::DuplicatePrimaryKey { .. } => DiagnosticKind::DuplicatePrimaryKey,
            DiagnosticCause::RecordConstruction { .. } => DiagnosticKind::RecordConstruction,
        }
    }

    /// `true` if this diagnostic aborted the whole document.
    pub fn is_document_level(&self) -> bool {
        self.kind() == DiagnosticKind::DocumentTooShort
    }
}

impl fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_document_level() {
            return write!(f, "document: {}", self.cause);
        }
        match self.row {
            Some(row) => write!(f, "line {} (row {row}): {}", self.line, self.cause)?,
            None => write!(f, "line {}: {}", self.line, self.cause)?,
        }
        if !self.tokens.is_empty() {
            write!(f, " tokens={:?}", self.tokens)?;
        }
        Ok(())
    }
}
