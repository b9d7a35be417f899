use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::LoadError;

use super::diagnostics::ParseDiagnostic;
use super::unified::MasterDataType;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LoadSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (a rejected row; loading went on).
    Warning,
    /// Error-level event (the document or the load failed).
    Error,
    /// Critical error (typically I/O or other infrastructure failures).
    Critical,
}

impl LoadSeverity {
    /// Severity of a collected diagnostic.
    pub fn for_diagnostic(diagnostic: &ParseDiagnostic) -> Self {
        if diagnostic.is_document_level() {
            LoadSeverity::Error
        } else {
            LoadSeverity::Warning
        }
    }

    /// Severity of a load failure.
    pub fn for_error(error: &LoadError) -> Self {
        match error {
            LoadError::Io(_) => LoadSeverity::Critical,
            LoadError::Config(_)
            | LoadError::SchemaMismatch { .. }
            | LoadError::Binary { .. }
            | LoadError::UnsupportedFormat { .. } => LoadSeverity::Error,
        }
    }
}

/// Context about a load attempt.
#[derive(Debug, Clone)]
pub struct LoadContext {
    /// Where the data came from: a file path, or [`crate::source::MasterDataSource::describe`]
    /// (`{environment}/{data_type}` by default).
    pub origin: String,
    /// Format used for loading.
    pub format: MasterDataType,
    /// Table of the record type being loaded.
    pub table: String,
}

/// Minimal stats reported on a successful load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadStats {
    /// Number of records in the sealed database.
    pub records: usize,
    /// Number of diagnostics collected.
    pub diagnostics: usize,
}

/// Observer interface for load outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait LoadObserver: Send + Sync {
    /// Called once per diagnostic, before `on_success`.
    fn on_diagnostic(&self, _ctx: &LoadContext, _severity: LoadSeverity, _diagnostic: &ParseDiagnostic) {}

    /// Called when a database was produced (possibly empty, possibly with diagnostics).
    fn on_success(&self, _ctx: &LoadContext, _stats: LoadStats) {}

    /// Called when loading fails.
    fn on_failure(&self, _ctx: &LoadContext, _severity: LoadSeverity, _error: &LoadError) {}

    /// Called when a load failure meets an alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &LoadError) {
        self.on_failure(ctx, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn LoadObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn LoadObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl LoadObserver for CompositeObserver {
    fn on_diagnostic(&self, ctx: &LoadContext, severity: LoadSeverity, diagnostic: &ParseDiagnostic) {
        for o in &self.observers {
            o.on_diagnostic(ctx, severity, diagnostic);
        }
    }

    fn on_success(&self, ctx: &LoadContext, stats: LoadStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &LoadContext, severity: LoadSeverity, error: &LoadError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &LoadError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Logs load events to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl LoadObserver for StdErrObserver {
    fn on_diagnostic(&self, ctx: &LoadContext, severity: LoadSeverity, diagnostic: &ParseDiagnostic) {
        eprintln!(
            "[load][{:?}] table={} origin={} {}",
            severity, ctx.table, ctx.origin, diagnostic
        );
    }

    fn on_success(&self, ctx: &LoadContext, stats: LoadStats) {
        eprintln!(
            "[load][ok] table={} format={:?} origin={} records={} diagnostics={}",
            ctx.table, ctx.format, ctx.origin, stats.records, stats.diagnostics
        );
    }

    fn on_failure(&self, ctx: &LoadContext, severity: LoadSeverity, error: &LoadError) {
        eprintln!(
            "[load][{:?}] table={} format={:?} origin={} err={}",
            severity, ctx.table, ctx.format, ctx.origin, error
        );
    }

    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &LoadError) {
        eprintln!(
            "[ALERT][load][{:?}] table={} format={:?} origin={} err={}",
            severity, ctx.table, ctx.format, ctx.origin, error
        );
    }
}

/// Appends load events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl LoadObserver for FileObserver {
    fn on_diagnostic(&self, ctx: &LoadContext, severity: LoadSeverity, diagnostic: &ParseDiagnostic) {
        self.append_line(&format!(
            "{} diag severity={:?} table={} origin={} {}",
            unix_ts(),
            severity,
            ctx.table,
            ctx.origin,
            diagnostic
        ));
    }

    fn on_success(&self, ctx: &LoadContext, stats: LoadStats) {
        self.append_line(&format!(
            "{} ok table={} format={:?} origin={} records={} diagnostics={}",
            unix_ts(),
            ctx.table,
            ctx.format,
            ctx.origin,
            stats.records,
            stats.diagnostics
        ));
    }

    fn on_failure(&self, ctx: &LoadContext, severity: LoadSeverity, error: &LoadError) {
        self.append_line(&format!(
            "{} fail severity={:?} table={} format={:?} origin={} err={}",
            unix_ts(),
            severity,
            ctx.table,
            ctx.format,
            ctx.origin,
            error
        ));
    }

    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &LoadError) {
        self.append_line(&format!(
            "{} ALERT severity={:?} table={} format={:?} origin={} err={}",
            unix_ts(),
            severity,
            ctx.table,
            ctx.format,
            ctx.origin,
            error
        ));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
