//! Where master data comes from.
//!
//! The loading core only needs the final bytes; [`MasterDataSource`] is the seam behind which a
//! downloader, a cache directory, or a test fixture lives. [`LocalFileSource`] is the persisted
//! side: files named `masterdata-{environment}.{csv|bin}` in one directory.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::LoadResult;
use crate::ingestion::MasterDataType;

// Distinguishes temp files of concurrent stores within one process.
static STORE_SEQ: AtomicU64 = AtomicU64::new(0);

/// A provider of raw master-data bytes keyed by environment and data type.
pub trait MasterDataSource {
    /// Return the complete bytes for `environment` / `data_type`.
    fn fetch(&self, environment: &str, data_type: MasterDataType) -> LoadResult<Vec<u8>>;

    /// Human-readable origin used in observer callbacks.
    fn describe(&self, environment: &str, data_type: MasterDataType) -> String {
        format!("{environment}/{data_type}")
    }
}

/// Master data persisted as files in a directory.
#[derive(Debug, Clone)]
pub struct LocalFileSource {
    dir: PathBuf,
}

impl LocalFileSource {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file for `environment` / `data_type`.
    pub fn path_for(&self, environment: &str, data_type: MasterDataType) -> PathBuf {
        self.dir.join(data_type.file_name(environment))
    }

    /// Persist freshly downloaded bytes.
    ///
    /// The bytes go to a temporary sibling first and are renamed into place, so a reader never
    /// observes a partially written file and an interrupted store leaves the previous file
    /// untouched. Every call gets its own temporary file, so concurrent stores of the same
    /// target end with one complete payload.
    pub fn store(&self, environment: &str, data_type: MasterDataType, bytes: &[u8]) -> LoadResult<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(environment, data_type);
        let tmp = path.with_extension(format!(
            "{}.{}-{}.tmp",
            data_type.extension(),
            std::process::id(),
            STORE_SEQ.fetch_add(1, Ordering::Relaxed)
        ));

        let write = || -> std::io::Result<()> {
            let mut f = fs::File::create(&tmp)?;
            f.write_all(bytes)?;
            f.sync_all()?;
            fs::rename(&tmp, &path)
        };
        if let Err(e) = write() {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(path)
    }
}

impl MasterDataSource for LocalFileSource {
    fn fetch(&self, environment: &str, data_type: MasterDataType) -> LoadResult<Vec<u8>> {
        Ok(fs::read(self.path_for(environment, data_type))?)
    }

    fn describe(&self, environment: &str, data_type: MasterDataType) -> String {
        self.path_for(environment, data_type).display().to_string()
    }
}
