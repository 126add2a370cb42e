//! Loads the static YAML config file and injects credentials from required
//! environment variables, producing the merged [`ExportConfig`].
//!
//! All validation happens here, before any network activity: missing
//! credentials, unreadable or malformed YAML, unknown field names and
//! zero-valued limits are config errors.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Deserialize;
use tracing::{error, info};

use crate::config::{ExportConfig, JiraSettings, RenderOptions};
use crate::render::FieldKind;

const ENV_USERNAME: &str = "J2P_USERNAME";
const ENV_PASSWORD: &str = "J2P_PASSWORD";

const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DEFAULT_API_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";
const DEFAULT_QUERY_PAGE_SIZE: usize = 4000;
const DEFAULT_ISSUES_PER_PDF: usize = 2000;
const DEFAULT_MAX_FIELD_LENGTH: usize = 1000;
const DEFAULT_JQL_TEMPLATE: &str = "project = \"{project}\" ORDER BY created ASC";

/// Default field selection when the config names none.
const DEFAULT_FIELDS: &[&str] = &["Key", "Summary", "Status", "Assignee", "Created"];

#[derive(Deserialize)]
struct StaticConfig {
    jira_url: String,
    #[serde(default)]
    projects: Vec<String>,
    jql_template: Option<String>,
    jira_issue_fields: Option<Vec<String>>,
    datetime_format: Option<String>,
    api_datetime_format: Option<String>,
    query_page_size: Option<usize>,
    issues_per_pdf: Option<usize>,
    max_field_length: Option<usize>,
    #[serde(default)]
    accept_invalid_certs: bool,
    output_dir: Option<PathBuf>,
}

/// Loads a static YAML config (no secrets) and injects the required env vars
/// for credentials. Returns a fully merged `ExportConfig` or an error.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ExportConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let username = require_env(ENV_USERNAME)?;
    let password = require_env(ENV_PASSWORD)?;

    let config_content = fs::read_to_string(path_ref).map_err(|e| {
        error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
        anyhow::anyhow!("Failed to read config file {:?}: {}", path_ref, e)
    })?;

    let static_conf: StaticConfig = serde_yaml::from_str(&config_content).map_err(|e| {
        error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
        anyhow::anyhow!("Failed to parse config YAML: {e}")
    })?;

    let page_size = static_conf.query_page_size.unwrap_or(DEFAULT_QUERY_PAGE_SIZE);
    let issues_per_pdf = static_conf.issues_per_pdf.unwrap_or(DEFAULT_ISSUES_PER_PDF);
    let max_field_length = static_conf
        .max_field_length
        .unwrap_or(DEFAULT_MAX_FIELD_LENGTH);

    if page_size == 0 {
        anyhow::bail!("query_page_size must be greater than zero");
    }
    if issues_per_pdf == 0 {
        anyhow::bail!("issues_per_pdf must be greater than zero");
    }
    if max_field_length == 0 {
        anyhow::bail!("max_field_length must be greater than zero");
    }

    let field_names: Vec<String> = match static_conf.jira_issue_fields {
        Some(names) => names,
        None => DEFAULT_FIELDS.iter().map(|s| s.to_string()).collect(),
    };
    let fields = parse_field_selection(&field_names)?;

    let config = ExportConfig {
        jira: JiraSettings {
            base_url: static_conf.jira_url,
            username,
            password,
            accept_invalid_certs: static_conf.accept_invalid_certs,
            page_size,
        },
        projects: static_conf.projects,
        jql_template: static_conf
            .jql_template
            .unwrap_or_else(|| DEFAULT_JQL_TEMPLATE.to_string()),
        fields,
        render: RenderOptions {
            datetime_format: static_conf
                .datetime_format
                .unwrap_or_else(|| DEFAULT_DATETIME_FORMAT.to_string()),
            api_datetime_format: static_conf
                .api_datetime_format
                .unwrap_or_else(|| DEFAULT_API_DATETIME_FORMAT.to_string()),
            max_field_length,
        },
        issues_per_pdf,
        output_dir: static_conf.output_dir.unwrap_or_else(|| PathBuf::from(".")),
    };

    info!(
        jira_url = %config.jira.base_url,
        page_size = page_size,
        issues_per_pdf = issues_per_pdf,
        "Config loaded and merged successfully"
    );
    Ok(config)
}

fn require_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => {
            error!(var = name, "Required environment variable not set");
            anyhow::bail!("environment variable {name} not set")
        }
    }
}

/// Unknown field names are a config error surfaced here, not silently skipped
/// at render time.
fn parse_field_selection(names: &[String]) -> Result<Vec<FieldKind>> {
    names
        .iter()
        .map(|name| {
            FieldKind::parse(name).ok_or_else(|| {
                error!(field = %name, "Unknown field name in jira_issue_fields");
                anyhow::anyhow!("unknown field name in jira_issue_fields: {name}")
            })
        })
        .collect()
}
