//! Ingestion pipeline: delimited text to a sealed [`crate::database::Database`].
//!
//! Stages, leaf first:
//!
//! - [`tokenizer`]: one line to trimmed tokens (quote-aware)
//! - [`record`]: tokens to a typed record, or a [`ParseDiagnostic`]
//! - [`builder`]: the row loop, duplicate-key policy and sealing
//! - [`unified`]: path/source entrypoints with format detection and observer reporting
//!
//! Everything up to [`builder`] is pure and does no I/O.

pub mod builder;
pub mod diagnostics;
pub mod observability;
pub mod options;
pub mod record;
pub mod tokenizer;
pub mod unified;

pub use builder::{build_database_from_text, BuildOutput, DatabaseBuilder};
pub use diagnostics::{DiagnosticCause, DiagnosticKind, ParseDiagnostic};
pub use observability::{
    CompositeObserver, FileObserver, LoadContext, LoadObserver, LoadSeverity, LoadStats, StdErrObserver,
};
pub use options::{DuplicateKeyPolicy, ParseOptions};
pub use record::parse_record;
pub use tokenizer::tokenize_line;
pub use unified::{load_from_bytes, load_from_path, load_from_source, LoadOptions, MasterDataType};
