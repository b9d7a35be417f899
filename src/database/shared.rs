use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::types::MasterRecord;

use super::Database;

/// Hot-reload handle around a sealed [`Database`].
///
/// Readers take an `Arc` snapshot and keep using it for as long as they like; [`replace`]
/// swaps in a freshly built database wholesale. A live database is never mutated.
///
/// [`replace`]: SharedDatabase::replace
pub struct SharedDatabase<R: MasterRecord> {
    current: RwLock<Arc<Database<R>>>,
}

impl<R: MasterRecord> SharedDatabase<R> {
    pub fn new(database: Database<R>) -> Self {
        Self {
            current: RwLock::new(Arc::new(database)),
        }
    }

    /// Snapshot of the current database.
    pub fn snapshot(&self) -> Arc<Database<R>> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Install `database` and return the one it replaced.
    pub fn replace(&self, database: Database<R>) -> Arc<Database<R>> {
        let next = Arc::new(database);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, next)
    }
}

impl<R: MasterRecord> Default for SharedDatabase<R> {
    fn default() -> Self {
        Self::new(Database::empty())
    }
}

impl<R: MasterRecord> fmt::Debug for SharedDatabase<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedDatabase")
            .field("count", &self.snapshot().count())
            .finish()
    }
}
