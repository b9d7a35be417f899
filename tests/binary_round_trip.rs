use master_data::database::{Database, FORMAT_VERSION, MAGIC};
use master_data::ingestion::{build_database_from_text, ParseOptions};
use master_data::records::PlanetMaster;
use master_data::LoadError;

fn fixture_db() -> Database<PlanetMaster> {
    let text = std::fs::read_to_string("tests/fixtures/planets.tsv").unwrap();
    build_database_from_text::<PlanetMaster>(&text, &ParseOptions::default()).database
}

#[test]
fn deserialize_serialize_preserves_count_and_lookups() {
    let db = fixture_db();
    let restored = Database::<PlanetMaster>::from_bytes(&db.to_bytes()).unwrap();

    assert_eq!(restored.count(), db.count());
    for id in -1..10 {
        assert_eq!(restored.get_by_id(&id), db.get_by_id(&id), "id {id}");
    }
    let a: Vec<_> = db.all().collect();
    let b: Vec<_> = restored.all().collect();
    assert_eq!(a, b);
}

#[test]
fn blob_starts_with_magic_and_version() {
    let bytes = fixture_db().to_bytes();
    assert_eq!(&bytes[..4], MAGIC);
    assert_eq!(u16::from_le_bytes([bytes[4], bytes[5]]), FORMAT_VERSION);
}

#[test]
fn builder_blob_matches_database_encoding() {
    let text = std::fs::read_to_string("tests/fixtures/planets.tsv").unwrap();
    let opts = ParseOptions {
        emit_binary: true,
        ..ParseOptions::default()
    };
    let out = build_database_from_text::<PlanetMaster>(&text, &opts);
    assert_eq!(out.binary.as_deref(), Some(out.database.to_bytes().as_slice()));
}

#[test]
fn corrupted_blob_is_rejected_not_misread() {
    let mut bytes = fixture_db().to_bytes();
    let last = bytes.len() - 1;
    bytes.truncate(last);
    let err = Database::<PlanetMaster>::from_bytes(&bytes).unwrap_err();
    assert!(matches!(err, LoadError::Binary { .. }));
}
