//! `master-data` turns delimited master-data text (reference tables such as planet definitions)
//! into an immutable, primary-key indexed, in-memory [`database::Database`].
//!
//! The primary entrypoint is [`ingestion::build_database_from_text`], a pure function from the
//! document text to a sealed database plus a list of [`ingestion::ParseDiagnostic`]s. Persisted
//! files are loaded with [`ingestion::load_from_path`] (format inferred from the extension).
//!
//! ## Input document
//!
//! - UTF-8 text, lines separated by `\n` or `\r\n`; blank lines are ignored.
//! - The first 3 non-empty lines are headers/metadata and are skipped
//!   (see [`ingestion::ParseOptions::header_lines`]).
//! - Every other line is one record; fields are tab-separated and may be `"`-quoted to embed the
//!   delimiter.
//! - Numbers use a locale-independent format (`.` decimal point, no grouping).
//!
//! ## Failure model
//!
//! Bad rows never abort a load. Rows with too few columns, values that do not parse, and
//! duplicate primary keys (first one wins by default) are skipped and reported as diagnostics.
//! Only a document too short to hold a data row is rejected as a whole, yielding an empty
//! database and one diagnostic.
//!
//! ## Quick example
//!
//! ```rust
//! use master_data::ingestion::{build_database_from_text, ParseOptions};
//! use master_data::records::PlanetMaster;
//!
//! let text = "planet\nid\tname\tname_jp\tcenter\tradius\tgravity\tspeed\tlight\touter\n\
//!             int\tstring\tstring\tint\tfloat\tfloat\tfloat\tfloat\tfloat\n\
//!             1\tMars\t火星\t0\t3389.5\t3.72\t24.1\t1.52\t0.1\n";
//! let out = build_database_from_text::<PlanetMaster>(text, &ParseOptions::default());
//! assert!(out.diagnostics.is_empty());
//!
//! let mars = out.database.get_by_id(&1).unwrap();
//! assert_eq!(mars.name_jp, "火星");
//! assert_eq!(mars.radius, 3389.5);
//! ```
//!
//! ## Binary form
//!
//! A database can be written to a versioned binary blob and read back without re-parsing:
//!
//! ```rust
//! # use master_data::ingestion::{build_database_from_text, ParseOptions};
//! # use master_data::records::PlanetMaster;
//! use master_data::database::Database;
//! # let text = "h\nh\nh\n1\tMars\t火星\t0\t3389.5\t3.72\t24.1\t1.52\t0.1\n";
//! # let db = build_database_from_text::<PlanetMaster>(text, &ParseOptions::default()).database;
//! let bytes = db.to_bytes();
//! let restored = Database::<PlanetMaster>::from_bytes(&bytes).unwrap();
//! assert_eq!(restored, db);
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: tokenizer, row parser, builder, loading entrypoints and observers
//! - [`database`]: the sealed database, its binary codec, and a hot-reload handle
//! - [`types`]: schema, values and the [`types::MasterRecord`] trait
//! - [`records`]: concrete record types
//! - [`source`]: the seam to wherever raw master data is fetched from
//! - [`error`]: error types used across loading

pub mod database;
pub mod error;
pub mod ingestion;
pub mod records;
pub mod source;
pub mod types;

pub use error::{LoadError, LoadResult};
