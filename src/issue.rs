//! Data model for issues returned by the Jira REST search endpoint.
//!
//! Everything except `id` and `key` is optional: the API omits nested objects
//! (assignee, status, priority, progress, comments) whenever they are unset,
//! and an absent object must never fail deserialization or rendering.

use serde::Deserialize;

/// A single tracked work item with structured metadata and free-text fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Issue {
    pub id: String,
    pub key: String,
    #[serde(default)]
    pub fields: IssueFields,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueFields {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub status: Option<Named>,
    pub priority: Option<Named>,
    pub assignee: Option<User>,
    pub reporter: Option<User>,
    pub creator: Option<User>,
    /// Raw timestamp string; parsed lazily with the configured API format.
    pub created: Option<String>,
    pub progress: Option<Progress>,
    pub aggregateprogress: Option<Progress>,
    pub comment: Option<CommentPage>,
}

/// Nested objects (status, priority) that only contribute a display name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Named {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct User {
    pub name: Option<String>,
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Progress {
    pub progress: Option<i64>,
    pub total: Option<i64>,
}

/// Jira wraps comments in a paging envelope; only the entries matter here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentPage {
    #[serde(default)]
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Comment {
    pub author: Option<User>,
    pub body: Option<String>,
}
