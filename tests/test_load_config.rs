//! Config loader tests: platform key names, validation and date selection.

use chrono::NaiveDate;
use std::fs;
use tempfile::tempdir;

use sharepoint_transfer::dates::DateFormat;
use sharepoint_transfer::error::TransferError;
use sharepoint_transfer::load_config::{load_config, DateSelection, OperationType};

fn write_config(dir: &std::path::Path, json: &str) {
    fs::write(dir.join("config.json"), json).unwrap();
}

const FULL_CONFIG: &str = r##"{
    "sharepoint": {
        "client_id": "sp-client",
        "#client_secret": "sp-secret",
        "tenant_id": "sp-tenant",
        "username": "user@example.com",
        "#password": "pw",
        "authority": "https://login.microsoftonline.com"
    },
    "o365": {
        "client_id": "o-client",
        "#client_secret": "o-secret",
        "tenant_id": "o-tenant",
        "hostname": "example.sharepoint.com",
        "url": "/sites/analytics"
    },
    "main_folder_path": "/base/reports",
    "operation_type": "upload",
    "date_from": "2024-01-10",
    "date_to": "2024-01-12",
    "filter_day": true,
    "folder_suffix": "_final",
    "filename_prefix": "daily_",
    "date_format": "underscore"
}"##;

#[test]
fn full_config_loads_with_platform_secret_keys() {
    let dir = tempdir().unwrap();
    write_config(dir.path(), FULL_CONFIG);

    let config = load_config(dir.path()).expect("Config should load");
    assert_eq!(config.sharepoint.client_id, "sp-client");
    assert_eq!(config.sharepoint.client_secret.as_deref(), Some("sp-secret"));
    assert_eq!(config.sharepoint.password.as_deref(), Some("pw"));
    assert_eq!(config.o365.client_secret, "o-secret");
    assert_eq!(config.operation, OperationType::Upload);
    assert!(config.filter_day);
    assert_eq!(config.folder_suffix.as_deref(), Some("_final"));
    assert_eq!(config.filename_prefix.as_deref(), Some("daily_"));
    assert_eq!(config.date_format, DateFormat::Underscore);
    assert!(matches!(config.dates, DateSelection::Range { .. }));
}

#[test]
fn missing_section_names_the_key() {
    let dir = tempdir().unwrap();
    write_config(
        dir.path(),
        r#"{"main_folder_path": "/base", "operation_type": "upload"}"#,
    );

    let err = load_config(dir.path()).unwrap_err();
    assert!(matches!(err, TransferError::Config(_)));
    assert!(err.to_string().contains("sharepoint"), "got: {err}");
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn missing_operation_type_names_the_key() {
    let dir = tempdir().unwrap();
    let json = FULL_CONFIG.replace(r#""operation_type": "upload","#, "");
    write_config(dir.path(), &json);

    let err = load_config(dir.path()).unwrap_err();
    assert!(err.to_string().contains("operation_type"), "got: {err}");
}

#[test]
fn invalid_operation_type_is_a_user_facing_config_error() {
    let dir = tempdir().unwrap();
    let json = FULL_CONFIG.replace(r#""operation_type": "upload""#, r#""operation_type": "sync""#);
    write_config(dir.path(), &json);

    // Validation fires during load, before any drive client is even built.
    let err = load_config(dir.path()).unwrap_err();
    assert!(matches!(err, TransferError::Config(_)));
    assert!(err.to_string().contains("Invalid operation type: sync"));
    assert!(err.is_user_error());
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn malformed_json_is_a_config_error() {
    let dir = tempdir().unwrap();
    write_config(dir.path(), "{not json");

    let err = load_config(dir.path()).unwrap_err();
    assert!(matches!(err, TransferError::Config(_)));
}

#[test]
fn missing_config_file_is_a_config_error() {
    let dir = tempdir().unwrap();
    let err = load_config(dir.path()).unwrap_err();
    assert!(matches!(err, TransferError::Config(_)));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn date_of_processing_takes_precedence_over_range() {
    let dir = tempdir().unwrap();
    let json = FULL_CONFIG.replace(
        r#""date_from": "2024-01-10","#,
        r#""date_from": "2024-01-10", "date_of_processing": "2024-02-01","#,
    );
    write_config(dir.path(), &json);

    let config = load_config(dir.path()).unwrap();
    match &config.dates {
        DateSelection::Single(Some(expr)) => assert_eq!(expr, "2024-02-01"),
        other => panic!("Expected single-date selection, got {other:?}"),
    }
}

#[test]
fn half_open_range_config_names_the_missing_bound() {
    let dir = tempdir().unwrap();
    let json = FULL_CONFIG.replace(r#""date_to": "2024-01-12","#, "");
    write_config(dir.path(), &json);

    let err = load_config(dir.path()).unwrap_err();
    assert!(err.to_string().contains("date_to"), "got: {err}");
}

#[test]
fn absent_dates_default_to_today() {
    let dir = tempdir().unwrap();
    let json = FULL_CONFIG
        .replace(r#""date_from": "2024-01-10","#, "")
        .replace(r#""date_to": "2024-01-12","#, "");
    write_config(dir.path(), &json);

    let config = load_config(dir.path()).unwrap();
    let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    assert_eq!(config.dates.resolve(today).unwrap(), vec![today]);
}

#[test]
fn range_selection_resolves_half_open_interval() {
    let dir = tempdir().unwrap();
    write_config(dir.path(), FULL_CONFIG);

    let config = load_config(dir.path()).unwrap();
    let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let dates = config.dates.resolve(today).unwrap();
    assert_eq!(
        dates,
        vec![
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 11).unwrap(),
        ]
    );
}

#[test]
fn relative_range_bounds_resolve_against_today() {
    let dir = tempdir().unwrap();
    let json = FULL_CONFIG
        .replace(r#""date_from": "2024-01-10""#, r#""date_from": "-2 days""#)
        .replace(r#""date_to": "2024-01-12""#, r#""date_to": "today""#);
    write_config(dir.path(), &json);

    let config = load_config(dir.path()).unwrap();
    let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    assert_eq!(
        config.dates.resolve(today).unwrap(),
        vec![
            NaiveDate::from_ymd_opt(2024, 5, 30).unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 31).unwrap(),
        ]
    );
}

#[test]
fn unparsable_date_expression_is_a_date_parse_error() {
    let dir = tempdir().unwrap();
    let json = FULL_CONFIG.replace(r#""date_from": "2024-01-10""#, r#""date_from": "someday""#);
    write_config(dir.path(), &json);

    let config = load_config(dir.path()).unwrap();
    let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let err = config.dates.resolve(today).unwrap_err();
    assert!(matches!(err, TransferError::DateParse(_)));
    assert!(err.to_string().contains("someday"));
    assert_eq!(err.exit_code(), 1);
}
