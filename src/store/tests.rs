//! Tests for the file-backed store.

use super::*;
use crate::catalog::Value;
use crate::error::EngineError;
use crate::test_support::{employment_catalog, employment_template};
use chrono::NaiveDate;
use std::fs;
use tempfile::TempDir;

fn store() -> (TempDir, FileStore) {
    let temp_dir = TempDir::new().unwrap();
    let store = FileStore::new(temp_dir.path());
    (temp_dir, store)
}

fn write(store: &FileStore, relative: &str, content: &str) {
    let path = store.root().join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

// =========================================================================
// Templates
// =========================================================================

#[test]
fn test_save_new_template_starts_at_version_one() {
    let (_dir, store) = store();
    let saved = store.save_template(&employment_template()).unwrap();

    assert_eq!(saved.version, 1);
    assert!(saved.updated_at.is_some());
    assert!(saved.updated_by.as_deref().unwrap().contains('@'));
    assert!(store.templates_dir().join("employment.yaml").is_file());

    let loaded = store.load_template("employment").unwrap();
    assert_eq!(loaded, saved);
}

#[test]
fn test_save_increments_version() {
    let (_dir, store) = store();
    let first = store.save_template(&employment_template()).unwrap();
    let mut edited = first.clone();
    edited.title = "Employment Agreement (2025)".to_string();
    let second = store.save_template(&edited).unwrap();
    assert_eq!(second.version, 2);
    assert_eq!(store.load_template("employment").unwrap().title, edited.title);
}

#[test]
fn test_stale_save_is_edit_conflict() {
    let (_dir, store) = store();
    let base = store.save_template(&employment_template()).unwrap();

    let mut alice = base.clone();
    alice.delete_clause("probation").unwrap();
    let mut bob = base.clone();
    bob.delete_clause("duties").unwrap();

    store.save_template(&alice).unwrap();
    let err = store.save_template(&bob).unwrap_err();
    assert!(matches!(
        err,
        EngineError::EditConflict {
            expected: 1,
            found: 2,
            ..
        }
    ));
    assert_eq!(err.exit_code(), crate::exit_codes::EDIT_CONFLICT);
    assert!(store.load_template("employment").unwrap().clause("duties").is_some());
}

#[test]
fn test_new_template_with_nonzero_version_conflicts() {
    let (_dir, store) = store();
    let mut template = employment_template();
    template.version = 4;
    assert!(matches!(
        store.save_template(&template),
        Err(EngineError::EditConflict { found: 0, .. })
    ));
}

#[test]
fn test_concurrent_saves_from_same_version_conflict() {
    let (_dir, store) = store();
    let base = store.save_template(&employment_template()).unwrap();

    for round in 0..20 {
        let version = base.version + round;
        let mut first = store.load_template("employment").unwrap();
        first.title = format!("First {}", round);
        let mut second = first.clone();
        second.title = format!("Second {}", round);
        assert_eq!(first.version, version);

        let barrier = std::sync::Barrier::new(2);
        let results: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = [&first, &second]
                .into_iter()
                .map(|template| {
                    let store = &store;
                    let barrier = &barrier;
                    scope.spawn(move || {
                        barrier.wait();
                        store.save_template(template)
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let saved: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        assert_eq!(saved.len(), 1, "round {}: exactly one save must land", round);
        assert!(results.iter().any(|r| matches!(
            r,
            Err(EngineError::EditConflict { found, .. }) if *found == version + 1
        )));

        let stored = store.load_template("employment").unwrap();
        assert_eq!(stored.version, version + 1);
        assert_eq!(stored.title, saved[0].title);
    }
}

#[test]
fn test_save_releases_its_lock() {
    let (_dir, store) = store();
    store.save_template(&employment_template()).unwrap();
    assert!(!store.templates_dir().join(".employment.lock").exists());

    let mut stale = employment_template();
    stale.version = 7;
    assert!(store.save_template(&stale).is_err());
    assert!(!store.templates_dir().join(".employment.lock").exists());
}

#[test]
fn test_json_template_is_read_and_saved_in_place() {
    let (_dir, store) = store();
    write(
        &store,
        "templates/nda.json",
        r#"{"id": "nda", "title": "NDA", "clauses": [{"id": "a", "condition": "@mutual"}]}"#,
    );

    let template = store.load_template("nda").unwrap();
    assert_eq!(template.clauses.len(), 1);

    store.save_template(&template).unwrap();
    assert!(!store.templates_dir().join("nda.yaml").exists());
    let content = fs::read_to_string(store.templates_dir().join("nda.json")).unwrap();
    assert!(content.contains("\"version\": 1"));
    assert!(content.contains("\"operator\": \"isTrue\""));
}

#[test]
fn test_yaml_preferred_over_json() {
    let (_dir, store) = store();
    write(&store, "templates/t.yaml", "id: t\ntitle: From YAML\n");
    write(&store, "templates/t.json", r#"{"id": "t", "title": "From JSON"}"#);
    assert_eq!(store.load_template("t").unwrap().title, "From YAML");
}

#[test]
fn test_missing_template_is_user_error_with_fix() {
    let (_dir, store) = store();
    let err = store.load_template("absent").unwrap_err();
    assert!(matches!(err, EngineError::UserError(_)));
    assert!(err.to_string().contains("Fix:"));
}

#[test]
fn test_missing_template_lists_available_ones() {
    let (_dir, store) = store();
    write(&store, "templates/lease.yaml", "id: lease\n");
    write(&store, "templates/nda.json", r#"{"id": "nda"}"#);

    let err = store.load_template("employment").unwrap_err();
    assert!(
        err.to_string().ends_with("Fix: use one of: lease, nda"),
        "{}",
        err
    );
}

#[test]
fn test_malformed_template_error_names_file() {
    let (_dir, store) = store();
    write(&store, "templates/nda.yaml", "id: [unclosed\n");
    let err = store.load_template("nda").unwrap_err();
    assert!(err.to_string().contains("nda.yaml"));
    assert!(err.to_string().contains("failed to parse template YAML"));
}

#[test]
fn test_template_id_must_match_file() {
    let (_dir, store) = store();
    write(&store, "templates/a.yaml", "id: b\n");
    assert!(store.load_template("a").is_err());
}

#[test]
fn test_path_like_ids_rejected() {
    let (_dir, store) = store();
    for id in ["", "../etc", "a/b", ".hidden"] {
        assert!(store.load_template(id).is_err(), "{:?}", id);
    }
}

#[test]
fn test_list_templates() {
    let (_dir, store) = store();
    assert!(store.list_templates().unwrap().is_empty());
    write(&store, "templates/b.yaml", "id: b\n");
    write(&store, "templates/a.json", r#"{"id": "a"}"#);
    write(&store, "templates/notes.txt", "ignored");
    write(&store, "templates/.b.yaml.tmp", "id: b\n");
    assert_eq!(store.list_templates().unwrap(), vec!["a", "b"]);
}

// =========================================================================
// Catalogs and values
// =========================================================================

#[test]
fn test_catalog_round_trip() {
    let (_dir, store) = store();
    store
        .save_catalog("employment", &employment_catalog())
        .unwrap();
    let catalog = store.get_parameters("employment").unwrap();
    assert_eq!(catalog, employment_catalog());
}

#[test]
fn test_missing_catalog_is_error() {
    let (_dir, store) = store();
    assert!(store.get_parameters("employment").is_err());
}

#[test]
fn test_values_coerced_against_catalog() {
    let (_dir, store) = store();
    store
        .save_catalog("employment", &employment_catalog())
        .unwrap();
    write(
        &store,
        "values/employment/jordan.yaml",
        "has_bonus: \"true\"\nsalary: \"95000\"\nstart_date: 2025-07-01\ncontract_type: casual\nnotes: extra\nbonus_pct: null\n",
    );

    let values = store.get_values("employment", "jordan").unwrap();
    assert_eq!(values.get("has_bonus"), Some(&Value::Bool(true)));
    assert_eq!(values.get("salary"), Some(&Value::Number(95000.0)));
    assert_eq!(
        values.get("start_date"),
        Some(&Value::Date(NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()))
    );
    assert_eq!(
        values.get("contract_type"),
        Some(&Value::EnumOption("casual".to_string()))
    );
    assert_eq!(values.get("notes"), Some(&Value::Text("extra".to_string())));
    assert!(!values.contains("bonus_pct"));
}

#[test]
fn test_values_with_bad_enum_option_rejected() {
    let (_dir, store) = store();
    store
        .save_catalog("employment", &employment_catalog())
        .unwrap();
    write(&store, "values/employment/x.yaml", "contract_type: contractor\n");
    let err = store.get_values("employment", "x").unwrap_err();
    assert!(matches!(err, EngineError::InvalidValue { .. }));
}

#[test]
fn test_values_without_catalog_are_inferred() {
    let (_dir, store) = store();
    write(&store, "values/t/ctx.json", r#"{"flag": true, "n": 3}"#);
    let values = store.get_values("t", "ctx").unwrap();
    assert_eq!(values.get("flag"), Some(&Value::Bool(true)));
    assert_eq!(values.get("n"), Some(&Value::Number(3.0)));
}

#[test]
fn test_empty_values_file() {
    let (_dir, store) = store();
    write(&store, "values/t/empty.yaml", "");
    assert!(store.get_values("t", "empty").unwrap().is_empty());
}
