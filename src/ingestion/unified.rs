//! Unified loading entrypoints.
//!
//! Most callers should use [`load_from_path`] (a persisted file) or [`load_from_source`] (any
//! [`MasterDataSource`]), which decode text or binary master data into a sealed
//! [`crate::database::Database`].
//!
//! - If [`LoadOptions::format`] is `None`, the format is inferred from the file extension.
//! - If a [`super::observability::LoadObserver`] is provided, diagnostics, success, failures and
//!   alerts are reported to it.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::database::Database;
use crate::error::{LoadError, LoadResult};
use crate::source::MasterDataSource;
use crate::types::MasterRecord;

use super::builder::{build_database_from_text, BuildOutput};
use super::observability::{LoadContext, LoadObserver, LoadSeverity, LoadStats};
use super::options::ParseOptions;

/// Supported master-data formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MasterDataType {
    /// Delimited text (tab-separated by default).
    Csv,
    /// Versioned binary blob (see [`crate::database::encode_records`]).
    Bin,
}

impl MasterDataType {
    /// Parse a format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" | "tsv" | "txt" => Some(Self::Csv),
            "bin" => Some(Self::Bin),
            _ => None,
        }
    }

    /// Canonical file extension.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Bin => "bin",
        }
    }

    /// File name used to persist master data for `environment`: `masterdata-{env}.{ext}`.
    pub fn file_name(self, environment: &str) -> String {
        format!("masterdata-{environment}.{}", self.extension())
    }
}

impl fmt::Display for MasterDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Options controlling unified loading behavior.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct LoadOptions {
    /// If `None`, infer the format from the file extension.
    pub format: Option<MasterDataType>,
    /// Text parsing options (ignored for binary input).
    pub parse: ParseOptions,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn LoadObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: LoadSeverity,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            format: None,
            parse: ParseOptions::default(),
            observer: None,
            alert_at_or_above: LoadSeverity::Critical,
        }
    }
}

impl fmt::Debug for LoadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadOptions")
            .field("format", &self.format)
            .field("parse", &self.parse)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

/// Decode already-fetched master data.
///
/// Text is parsed with `parse` (row failures become diagnostics); binary is decoded as a whole
/// and yields no diagnostics. Text that is not UTF-8 is an error.
pub fn load_from_bytes<R: MasterRecord>(
    bytes: &[u8],
    format: MasterDataType,
    parse: &ParseOptions,
) -> LoadResult<BuildOutput<R>> {
    match format {
        MasterDataType::Csv => {
            let text = std::str::from_utf8(bytes).map_err(|e| LoadError::UnsupportedFormat {
                message: format!("master data text is not valid UTF-8: {e}"),
            })?;
            Ok(build_database_from_text(text, parse))
        }
        MasterDataType::Bin => {
            let database = Database::from_bytes(bytes)?;
            let binary = parse.emit_binary.then(|| bytes.to_vec());
            Ok(BuildOutput {
                database,
                diagnostics: Vec::new(),
                binary,
            })
        }
    }
}

/// Load a persisted master-data file.
///
/// When an observer is configured, this function reports:
///
/// - `on_diagnostic` for every collected diagnostic
/// - `on_success` once a database was produced, with record/diagnostic counts
/// - `on_failure` on failure, with a computed severity
/// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
///
/// use master_data::ingestion::{load_from_path, LoadOptions, StdErrObserver};
/// use master_data::records::PlanetMaster;
///
/// # fn main() -> Result<(), master_data::LoadError> {
/// let opts = LoadOptions {
///     observer: Some(Arc::new(StdErrObserver)),
///     ..Default::default()
/// };
/// // `.csv` selects text parsing; `.bin` would select the binary decoder.
/// let out = load_from_path::<PlanetMaster>("masterdata-dev1.csv", &opts)?;
/// println!("planets={} rejected={}", out.database.count(), out.diagnostics.len());
/// # Ok(())
/// # }
/// ```
pub fn load_from_path<R: MasterRecord>(
    path: impl AsRef<Path>,
    options: &LoadOptions,
) -> LoadResult<BuildOutput<R>> {
    let path = path.as_ref();
    let format = match options.format {
        Some(f) => Some(f),
        None => path
            .extension()
            .and_then(|s| s.to_str())
            .and_then(MasterDataType::from_extension),
    };

    let ctx = LoadContext {
        origin: path.display().to_string(),
        format: format.unwrap_or(MasterDataType::Csv),
        table: R::schema().table.clone(),
    };

    let result = match format {
        Some(format) => std::fs::read(path)
            .map_err(LoadError::from)
            .and_then(|bytes| load_from_bytes(&bytes, format, &options.parse)),
        None => Err(LoadError::UnsupportedFormat {
            message: format!("cannot infer format from path ({})", path.display()),
        }),
    };

    report(&ctx, options, &result);
    result
}

/// Fetch master data for `environment` from `source` and load it.
///
/// `options.format` is ignored; `data_type` decides both what is fetched and how it is decoded.
pub fn load_from_source<R: MasterRecord, S: MasterDataSource + ?Sized>(
    source: &S,
    environment: &str,
    data_type: MasterDataType,
    options: &LoadOptions,
) -> LoadResult<BuildOutput<R>> {
    let ctx = LoadContext {
        origin: source.describe(environment, data_type),
        format: data_type,
        table: R::schema().table.clone(),
    };

    let result = source
        .fetch(environment, data_type)
        .and_then(|bytes| load_from_bytes(&bytes, data_type, &options.parse));

    report(&ctx, options, &result);
    result
}

fn report<R: MasterRecord>(ctx: &LoadContext, options: &LoadOptions, result: &LoadResult<BuildOutput<R>>) {
    let Some(obs) = options.observer.as_ref() else {
        return;
    };
    match result {
        Ok(out) => {
            for d in &out.diagnostics {
                obs.on_diagnostic(ctx, LoadSeverity::for_diagnostic(d), d);
            }
            obs.on_success(
                ctx,
                LoadStats {
                    records: out.database.count(),
                    diagnostics: out.diagnostics.len(),
                },
            );
        }
        Err(e) => {
            let sev = LoadSeverity::for_error(e);
            obs.on_failure(ctx, sev, e);
            if sev >= options.alert_at_or_above {
                obs.on_alert(ctx, sev, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{load_from_bytes, MasterDataType};
    use crate::database::encode_records;
    use crate::ingestion::options::ParseOptions;
    use crate::records::PlanetMaster;

    #[test]
    fn extension_mapping() {
        assert_eq!(MasterDataType::from_extension("CSV"), Some(MasterDataType::Csv));
        assert_eq!(MasterDataType::from_extension("tsv"), Some(MasterDataType::Csv));
        assert_eq!(MasterDataType::from_extension("bin"), Some(MasterDataType::Bin));
        assert_eq!(MasterDataType::from_extension("json"), None);
        assert_eq!(MasterDataType::Bin.file_name("dev1"), "masterdata-dev1.bin");
        assert_eq!(MasterDataType::Csv.to_string(), "csv");
    }

    #[test]
    fn text_must_be_utf8() {
        let err = load_from_bytes::<PlanetMaster>(&[0xff, 0xfe], MasterDataType::Csv, &ParseOptions::default())
            .unwrap_err();
        assert!(err.to_string().contains("not valid UTF-8"));
    }

    #[test]
    fn binary_input_has_no_diagnostics() {
        let blob = encode_records::<PlanetMaster>(&[]);
        let out = load_from_bytes::<PlanetMaster>(&blob, MasterDataType::Bin, &ParseOptions::default()).unwrap();
        assert!(out.database.is_empty());
        assert!(out.diagnostics.is_empty());
        assert!(out.binary.is_none());
    }
}
