use std::fs;
use std::path::PathBuf;

use iati_cli::snapshot::{load_store, save_store};
use iati_import::{ImportTarget, InMemoryStore, Orchestrator, Table};
use iati_model::ImportOptions;

fn store_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("iati-cli-{}-{name}.json", std::process::id()))
}

#[test]
fn saved_store_lets_a_snippet_target_an_earlier_activity() {
    let path = store_path("target");
    let mut first = InMemoryStore::new();
    let run = Orchestrator::new(ImportOptions::default())
        .unwrap()
        .run(
            &mut first,
            "<iati-activity><iati-identifier>XM-S</iati-identifier></iati-activity>",
            "activity.xml",
            ImportTarget::Resolve,
        )
        .unwrap();
    let target = run.activities[0].activity;
    save_store(&first, &path).unwrap();

    let mut store = load_store(&path).unwrap();
    fs::remove_file(&path).unwrap();
    let snippet = Orchestrator::new(ImportOptions::default())
        .unwrap()
        .run(
            &mut store,
            r#"<sector code="11110" percentage="100"/>"#,
            "snippet.xml",
            ImportTarget::Activity(target),
        )
        .unwrap();

    assert_eq!(snippet.activities[0].activity, target);
    assert_eq!(store.count(Table::Activities), 1);
    assert_eq!(store.count(Table::ActivitySectors), 1);
    assert_eq!(store.count(Table::ImportLogs), 2);
}

#[test]
fn target_without_saved_rows_is_rejected() {
    let mut store = InMemoryStore::new();
    let result = Orchestrator::new(ImportOptions::default()).unwrap().run(
        &mut store,
        r#"<sector code="11110"/>"#,
        "snippet.xml",
        ImportTarget::Activity(iati_import::RowId(7)),
    );
    assert!(result.is_err());
}

#[test]
fn unreadable_store_file_names_the_path() {
    let path = store_path("broken");
    fs::write(&path, "{ not json").unwrap();
    let error = load_store(&path).unwrap_err();
    fs::remove_file(&path).unwrap();
    assert!(format!("{error:#}").contains("parse store"));
}
