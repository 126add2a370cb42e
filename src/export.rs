//! Coordinating module for the fetch-partition-render pipeline.
//!
//! One project is fully fetched and its documents fully built before the next
//! project begins; pages arrive in increasing offset order and issues are
//! rendered in fetch order. The first fetch or write error aborts the run.

use serde::Serialize;
use tracing::{error, info};

use crate::client::{FetchError, IssueSource};
use crate::config::ExportConfig;
use crate::pdf::{build_partitioned_documents, FileReport, WriteError};
use crate::render::api_fields;

#[derive(Debug)]
pub enum ExportError {
    Fetch(FetchError),
    Write(WriteError),
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::Fetch(e) => write!(f, "{e}"),
            ExportError::Write(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Fetch(e) => Some(e),
            ExportError::Write(e) => Some(e),
        }
    }
}

impl From<FetchError> for ExportError {
    fn from(e: FetchError) -> Self {
        ExportError::Fetch(e)
    }
}

impl From<WriteError> for ExportError {
    fn from(e: WriteError) -> Self {
        ExportError::Write(e)
    }
}

#[derive(Debug, Serialize)]
pub struct ExportReport {
    pub projects: Vec<ProjectReport>,
}

#[derive(Debug, Serialize)]
pub struct ProjectReport {
    pub project: String,
    pub issues_total: usize,
    pub files: Vec<FileReport>,
}

/// Entrypoint: export every configured (or discovered) project to PDF files.
pub async fn export(
    config: &ExportConfig,
    source: &dyn IssueSource,
) -> Result<ExportReport, ExportError> {
    let projects = if config.projects.is_empty() {
        info!("No explicit project list configured, discovering projects");
        source.list_project_keys().await?
    } else {
        config.projects.clone()
    };
    info!(projects = projects.len(), "Starting export");

    let fields = api_fields(&config.fields);
    let mut reports = Vec::with_capacity(projects.len());

    for project in &projects {
        let jql = config.jql_template.replace("{project}", project);
        info!(project = %project, jql = %jql, "Fetching issues for project");

        let issues = source.fetch_issues(&jql, &fields).await.map_err(|e| {
            error!(project = %project, error = %e, "Issue fetch failed");
            e
        })?;

        let files = build_partitioned_documents(
            project,
            &issues,
            &config.fields,
            &config.render,
            config.issues_per_pdf,
            &config.output_dir,
        )
        .map_err(|e| {
            error!(project = %project, error = %e, "Document build failed");
            e
        })?;

        info!(
            project = %project,
            issues = issues.len(),
            files = files.len(),
            "Project export complete"
        );
        reports.push(ProjectReport {
            project: project.clone(),
            issues_total: issues.len(),
            files,
        });
    }

    Ok(ExportReport { projects: reports })
}
