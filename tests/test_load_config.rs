use std::env;
use std::fs::write;
use std::path::PathBuf;

use serial_test::serial;
use tempfile::NamedTempFile;

use jira2pdf::load_config::load_config;
use jira2pdf::render::FieldKind;

fn set_credentials() {
    env::set_var("J2P_USERNAME", "reporter");
    env::set_var("J2P_PASSWORD", "hunter2");
}

/// A static config plus the required env vars produces a fully merged config
/// with credentials injected from the environment.
#[test]
#[serial]
fn load_config_success_injects_env_credentials() {
    let config_yaml = r#"
jira_url: https://jira.example.com
projects: [PROJ, OTHER]
jira_issue_fields: [Key, Summary, Assignee, Created, Comment]
datetime_format: "%d.%m.%Y %H:%M"
query_page_size: 100
issues_per_pdf: 50
max_field_length: 300
output_dir: ./reports
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();
    set_credentials();

    let config = load_config(config_file.path()).expect("Config should load");

    assert_eq!(config.jira.base_url, "https://jira.example.com");
    assert_eq!(config.jira.username, "reporter");
    assert_eq!(config.jira.password, "hunter2");
    assert!(!config.jira.accept_invalid_certs);
    assert_eq!(config.jira.page_size, 100);
    assert_eq!(config.projects, vec!["PROJ", "OTHER"]);
    assert_eq!(
        config.fields,
        vec![
            FieldKind::Key,
            FieldKind::Summary,
            FieldKind::Assignee,
            FieldKind::Created,
            FieldKind::Comment,
        ]
    );
    assert_eq!(config.render.datetime_format, "%d.%m.%Y %H:%M");
    assert_eq!(config.render.max_field_length, 300);
    assert_eq!(config.issues_per_pdf, 50);
    assert_eq!(config.output_dir, PathBuf::from("./reports"));
}

/// Omitted keys fall back to the documented defaults.
#[test]
#[serial]
fn load_config_applies_defaults() {
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), "jira_url: https://jira.example.com\n").unwrap();
    set_credentials();

    let config = load_config(config_file.path()).expect("Config should load");

    assert_eq!(config.jira.page_size, 4000);
    assert_eq!(config.issues_per_pdf, 2000);
    assert_eq!(config.render.max_field_length, 1000);
    assert_eq!(config.render.datetime_format, "%Y-%m-%d %H:%M:%S");
    assert_eq!(config.render.api_datetime_format, "%Y-%m-%dT%H:%M:%S%.3f%z");
    assert!(config.projects.is_empty());
    assert!(!config.fields.is_empty());
    assert_eq!(config.output_dir, PathBuf::from("."));
}

/// Missing credential env vars fail before anything else happens.
#[test]
#[serial]
fn load_config_errors_on_missing_env() {
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), "jira_url: https://jira.example.com\n").unwrap();
    env::remove_var("J2P_USERNAME");
    env::remove_var("J2P_PASSWORD");

    let err = load_config(config_file.path()).unwrap_err();
    assert!(
        err.to_string().contains("J2P_USERNAME"),
        "Must error for missing env var, got: {err}"
    );
}

/// An empty credential counts as unset.
#[test]
#[serial]
fn load_config_errors_on_empty_credential() {
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), "jira_url: https://jira.example.com\n").unwrap();
    env::set_var("J2P_USERNAME", "reporter");
    env::set_var("J2P_PASSWORD", "");

    let err = load_config(config_file.path()).unwrap_err();
    assert!(
        err.to_string().contains("J2P_PASSWORD"),
        "Must error for empty env var, got: {err}"
    );
}

/// Malformed YAML is a load error, reported as such.
#[test]
#[serial]
fn load_config_errors_for_invalid_file() {
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), b"not-yaml: [:::").unwrap();
    set_credentials();

    let err = load_config(config_file.path()).unwrap_err();
    let msg = err.to_string();
    assert!(
        msg.contains("parse") || msg.contains("YAML"),
        "Parse error expected, got: {msg}"
    );
}

/// Unknown field names are rejected at load time instead of being silently
/// skipped during rendering.
#[test]
#[serial]
fn load_config_rejects_unknown_field_names() {
    let config_yaml = r#"
jira_url: https://jira.example.com
jira_issue_fields: [Key, Duedate]
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();
    set_credentials();

    let err = load_config(config_file.path()).unwrap_err();
    assert!(
        err.to_string().contains("Duedate"),
        "Unknown field error expected, got: {err}"
    );
}

/// Zero-valued limits would break partitioning and pagination downstream, so
/// the loader refuses them.
#[test]
#[serial]
fn load_config_rejects_zero_issues_per_pdf() {
    let config_yaml = r#"
jira_url: https://jira.example.com
issues_per_pdf: 0
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();
    set_credentials();

    let err = load_config(config_file.path()).unwrap_err();
    assert!(
        err.to_string().contains("issues_per_pdf"),
        "Zero issues_per_pdf error expected, got: {err}"
    );
}
