use master_data::ingestion::{
    build_database_from_text, tokenize_line, DiagnosticCause, DiagnosticKind, ParseOptions,
};
use master_data::records::PlanetMaster;

const HEADERS: &str = "planet master\n\
                       id\tname\tname_jp\tcenter\tradius\tgravity\tspeed\tlight\touter\n\
                       int\tstring\tstring\tint\tfloat\tfloat\tfloat\tfloat\tfloat\n";

fn document(rows: &[String]) -> String {
    let mut text = HEADERS.to_string();
    for row in rows {
        text.push_str(row);
        text.push('\n');
    }
    text
}

fn row(id: i64, name: &str) -> String {
    format!("{id}\t{name}\t{name}-jp\t0\t{id}.5\t1.25\t2\t3\t0.5")
}

#[test]
fn mars_and_short_venus_scenario() {
    let text = document(&[
        "1\tMars\t火星\t0\t3389.5\t3.72\t24.1\t1.52\t0.1".to_string(),
        "2\tVenus\t\t0\t6051.8\t8.87".to_string(),
    ]);
    let out = build_database_from_text::<PlanetMaster>(&text, &ParseOptions::default());

    assert_eq!(out.database.count(), 1);
    assert_eq!(
        out.database.get_by_id(&1),
        Some(&PlanetMaster {
            id: 1,
            name: "Mars".to_string(),
            name_jp: "火星".to_string(),
            rotation_center_planet_id: 0,
            radius: 3389.5,
            gravity: 3.72,
            orbital_speed: 24.1,
            light_intensity: 1.52,
            light_outer_radius: 0.1,
        })
    );
    assert!(out.database.get_by_id(&2).is_none());

    assert_eq!(out.diagnostics.len(), 1);
    let d = &out.diagnostics[0];
    assert_eq!(d.kind(), DiagnosticKind::RowShape);
    assert_eq!(d.row, Some(2));
    assert_eq!(d.line, 5);
    assert_eq!(d.tokens[1], "Venus");
}

#[test]
fn every_well_formed_row_is_indexed() {
    let rows: Vec<String> = (1..=50).map(|i| row(i, &format!("p{i}"))).collect();
    let out = build_database_from_text::<PlanetMaster>(&document(&rows), &ParseOptions::default());

    assert!(out.diagnostics.is_empty());
    assert_eq!(out.database.count(), 50);
    for p in out.database.all() {
        assert_eq!(out.database.get_by_id(&p.id), Some(p));
    }
    let ids: Vec<i64> = out.database.all().map(|p| p.id).collect();
    assert_eq!(ids, (1..=50).collect::<Vec<_>>());
}

#[test]
fn header_only_document_yields_one_document_diagnostic() {
    let out = build_database_from_text::<PlanetMaster>(HEADERS, &ParseOptions::default());
    assert_eq!(out.database.count(), 0);
    assert_eq!(out.diagnostics.len(), 1);
    assert!(out.diagnostics[0].is_document_level());
    assert_eq!(out.diagnostics[0].kind(), DiagnosticKind::DocumentTooShort);
}

#[test]
fn quoted_field_keeps_delimiter_verbatim() {
    assert_eq!(
        tokenize_line("4\t\"Moon\tLuna\"\t月", b'\t', b'"'),
        vec!["4", "Moon\tLuna", "月"]
    );

    let text = document(&["4\t\"Moon\tLuna\"\t月\t3\t1737.4\t1.62\t1.022\t0.3\t0.1".to_string()]);
    let out = build_database_from_text::<PlanetMaster>(&text, &ParseOptions::default());
    assert!(out.diagnostics.is_empty(), "{:?}", out.diagnostics);
    assert_eq!(out.database.get_by_id(&4).unwrap().name, "Moon\tLuna");
}

#[test]
fn quoted_field_after_padding_is_one_column() {
    let text = document(&["4\t \"Moon\tLuna\"\t月\t3\t1737.4\t1.62\t1.022\t0.3\t0.1".to_string()]);
    let out = build_database_from_text::<PlanetMaster>(&text, &ParseOptions::default());
    assert!(out.diagnostics.is_empty(), "{:?}", out.diagnostics);
    let moon = out.database.get_by_id(&4).unwrap();
    assert_eq!(moon.name, "Moon\tLuna");
    assert_eq!(moon.name_jp, "月");
    assert_eq!(moon.rotation_center_planet_id, 3);
}

#[test]
fn short_row_is_skipped_and_neighbours_survive() {
    let text = document(&[
        row(1, "a"),
        "2\tb\tb-jp\t0".to_string(),
        row(3, "c"),
    ]);
    let out = build_database_from_text::<PlanetMaster>(&text, &ParseOptions::default());
    assert_eq!(out.database.count(), 2);
    assert!(out.database.contains_id(&1));
    assert!(out.database.contains_id(&3));
    assert_eq!(
        out.diagnostics[0].cause,
        DiagnosticCause::RowShape {
            expected: 9,
            found: 4
        }
    );
}

#[test]
fn coercion_failure_names_row_field_and_token() {
    let text = document(&[row(1, "a"), "2\tb\tb-jp\tzero\t1\t1\t1\t1\t1".to_string()]);
    let out = build_database_from_text::<PlanetMaster>(&text, &ParseOptions::default());
    assert_eq!(out.database.count(), 1);

    let d = &out.diagnostics[0];
    assert_eq!(d.row, Some(2));
    match &d.cause {
        DiagnosticCause::FieldCoercion {
            index, field, raw, ..
        } => {
            assert_eq!(*index, 3);
            assert_eq!(field, "rotation_center_planet_id");
            assert_eq!(raw, "zero");
        }
        other => panic!("unexpected cause: {other:?}"),
    }
}

#[test]
fn later_duplicate_key_is_rejected() {
    let text = document(&[row(1, "first"), row(2, "other"), row(1, "second")]);
    let out = build_database_from_text::<PlanetMaster>(&text, &ParseOptions::default());

    assert_eq!(out.database.count(), 2);
    assert_eq!(out.database.get_by_id(&1).unwrap().name, "first");
    assert_eq!(out.diagnostics.len(), 1);
    assert_eq!(out.diagnostics[0].kind(), DiagnosticKind::DuplicatePrimaryKey);
    assert_eq!(out.diagnostics[0].row, Some(3));
}

#[test]
fn parsing_is_deterministic() {
    let text = document(&[row(1, "a"), "bad".to_string(), row(1, "dup")]);
    let a = build_database_from_text::<PlanetMaster>(&text, &ParseOptions::default());
    let b = build_database_from_text::<PlanetMaster>(&text, &ParseOptions::default());
    assert_eq!(a.database, b.database);
    assert_eq!(a.diagnostics, b.diagnostics);
}

#[test]
fn fixture_file_loads_every_planet() {
    let text = std::fs::read_to_string("tests/fixtures/planets.tsv").unwrap();
    let out = build_database_from_text::<PlanetMaster>(&text, &ParseOptions::default());
    assert!(out.diagnostics.is_empty(), "{:?}", out.diagnostics);
    assert_eq!(out.database.count(), 6);
    assert_eq!(out.database.get_by_id(&0).unwrap().name_jp, "太陽");
    assert_eq!(out.database.get_by_id(&4).unwrap().rotation_center_planet_id, 3);
}
