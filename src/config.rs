//! Runtime configuration types.
//!
//! The merged configuration is constructed once by `load_config` and passed by
//! reference into every component; there is no process-global state.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::render::FieldKind;

/// The fully merged export configuration (static YAML + environment secrets).
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub jira: JiraSettings,
    /// Explicit ordered project keys; empty means discover every project
    /// visible to the credentials.
    pub projects: Vec<String>,
    /// JQL template with a `{project}` placeholder, expanded per project.
    pub jql_template: String,
    /// Ordered field selection rendered per issue.
    pub fields: Vec<FieldKind>,
    pub render: RenderOptions,
    /// Maximum issues per output document.
    pub issues_per_pdf: usize,
    pub output_dir: PathBuf,
}

impl ExportConfig {
    pub fn trace_loaded(&self) {
        info!(
            jira_url = %self.jira.base_url,
            projects = self.projects.len(),
            fields = self.fields.len(),
            issues_per_pdf = self.issues_per_pdf,
            output_dir = %self.output_dir.display(),
            "Loaded export configuration"
        );
        debug!(
            fields = ?self.fields,
            jql_template = %self.jql_template,
            "Field selection (full debug)"
        );
    }
}

/// Connection settings for the Jira REST API.
#[derive(Debug, Clone)]
pub struct JiraSettings {
    pub base_url: String,
    pub username: String,
    pub password: String,
    /// Disables TLS certificate validation. Off by default; only for
    /// instances with self-signed certificates.
    pub accept_invalid_certs: bool,
    /// Page size for the paginated search endpoint.
    pub page_size: usize,
}

/// Formatting knobs applied while rendering issue fields.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// strftime format used for displayed timestamps.
    pub datetime_format: String,
    /// strftime format the API's `created` field is parsed with.
    pub api_datetime_format: String,
    /// Per-field truncation limit in characters, no ellipsis.
    pub max_field_length: usize,
}
