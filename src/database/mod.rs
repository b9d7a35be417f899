//! Sealed, key-indexed record store.
//!
//! A [`Database`] is produced once (by [`crate::ingestion::DatabaseBuilder`], by
//! [`Database::from_records`] or by decoding a binary blob) and is read-only afterwards. To
//! reload, build a new one and swap it in through [`SharedDatabase`].
//!
//! ```rust
//! use master_data::database::Database;
//! use master_data::ingestion::DuplicateKeyPolicy;
//! use master_data::records::PlanetMaster;
//!
//! let planet = PlanetMaster {
//!     id: 1,
//!     name: "Mars".to_string(),
//!     name_jp: "火星".to_string(),
//!     rotation_center_planet_id: 0,
//!     radius: 3389.5,
//!     gravity: 3.72,
//!     orbital_speed: 24.1,
//!     light_intensity: 1.52,
//!     light_outer_radius: 0.1,
//! };
//! let (db, diagnostics) = Database::from_records(vec![planet], DuplicateKeyPolicy::KeepFirst);
//! assert!(diagnostics.is_empty());
//! assert_eq!(db.count(), 1);
//! assert_eq!(db.get_by_id(&1).map(|p| p.name.as_str()), Some("Mars"));
//! assert!(db.get_by_id(&2).is_none());
//! ```

mod binary;
mod shared;

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use crate::ingestion::{DuplicateKeyPolicy, ParseDiagnostic};
use crate::types::MasterRecord;

pub use binary::{decode_records, encode_records, FORMAT_VERSION, MAGIC};
pub use shared::SharedDatabase;

/// Immutable, in-memory, primary-key indexed collection of records.
///
/// Records keep the order in which they were first accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct Database<R: MasterRecord> {
    records: Vec<R>,
    index: HashMap<R::Key, usize>,
}

impl<R: MasterRecord> Database<R> {
    /// A database with no records.
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Seal a list of records built in code.
    ///
    /// Duplicate keys are resolved with `policy`; each collision yields one diagnostic.
    pub fn from_records(
        records: Vec<R>,
        policy: DuplicateKeyPolicy,
    ) -> (Self, Vec<ParseDiagnostic>) {
        let mut builder = crate::ingestion::DatabaseBuilder::<R>::with_policy(policy);
        for record in records {
            builder.append(record);
        }
        let out = builder.build();
        (out.database, out.diagnostics)
    }

    // Caller guarantees `index` maps every record key to its position.
    pub(crate) fn from_parts(records: Vec<R>, index: HashMap<R::Key, usize>) -> Self {
        debug_assert_eq!(records.len(), index.len());
        Self { records, index }
    }

    /// Number of indexed records.
    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a record by primary key.
    pub fn get_by_id<Q>(&self, id: &Q) -> Option<&R>
    where
        R::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.get(id).map(|&pos| &self.records[pos])
    }

    pub fn contains_id<Q>(&self, id: &Q) -> bool
    where
        R::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(id)
    }

    /// Every record in insertion order. Call again to restart.
    pub fn all(&self) -> std::slice::Iter<'_, R> {
        self.records.iter()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.records.iter()
    }

    /// Encode into the versioned binary format (see [`encode_records`]).
    pub fn to_bytes(&self) -> Vec<u8> {
        encode_records(&self.records)
    }

    /// Decode a blob produced by [`Database::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> crate::LoadResult<Self> {
        decode_records(bytes)
    }
}

impl<R: MasterRecord> Default for Database<R> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<'a, R: MasterRecord> IntoIterator for &'a Database<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.all()
    }
}

#[cfg(test)]
mod tests {
    use super::Database;
    use crate::ingestion::{DiagnosticKind, DuplicateKeyPolicy};
    use crate::records::PlanetMaster;

    fn planet(id: i64, name: &str) -> PlanetMaster {
        PlanetMaster {
            id,
            name: name.to_string(),
            name_jp: String::new(),
            rotation_center_planet_id: 0,
            radius: 1.0,
            gravity: 1.0,
            orbital_speed: 1.0,
            light_intensity: 1.0,
            light_outer_radius: 1.0,
        }
    }

    #[test]
    fn lookup_count_and_iteration() {
        let (db, diags) = Database::from_records(
            vec![planet(3, "Earth"), planet(1, "Mercury"), planet(2, "Venus")],
            DuplicateKeyPolicy::KeepFirst,
        );
        assert!(diags.is_empty());
        assert_eq!(db.count(), 3);
        assert!(!db.is_empty());
        assert_eq!(db.get_by_id(&1).unwrap().name, "Mercury");
        assert!(db.contains_id(&2));
        assert!(!db.contains_id(&4));
        assert!(db.get_by_id(&4).is_none());

        let names: Vec<&str> = db.all().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Earth", "Mercury", "Venus"]);
        // Restartable.
        assert_eq!(db.all().count(), 3);
        assert_eq!((&db).into_iter().count(), 3);
    }

    #[test]
    fn empty_database() {
        let db = Database::<PlanetMaster>::empty();
        assert_eq!(db.count(), 0);
        assert!(db.is_empty());
        assert_eq!(db.all().next(), None);
        assert_eq!(db, Database::default());
    }

    #[test]
    fn from_records_keeps_first_duplicate() {
        let (db, diags) = Database::from_records(
            vec![planet(1, "first"), planet(1, "second")],
            DuplicateKeyPolicy::KeepFirst,
        );
        assert_eq!(db.count(), 1);
        assert_eq!(db.get_by_id(&1).unwrap().name, "first");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind(), DiagnosticKind::DuplicatePrimaryKey);
    }

    #[test]
    fn from_records_keep_last_replaces_in_place() {
        let (db, diags) = Database::from_records(
            vec![planet(1, "first"), planet(2, "other"), planet(1, "second")],
            DuplicateKeyPolicy::KeepLast,
        );
        assert_eq!(db.count(), 2);
        assert_eq!(db.get_by_id(&1).unwrap().name, "second");
        let ids: Vec<i64> = db.all().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(diags.len(), 1);
    }
}
