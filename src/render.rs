//! Field rendering: maps the configured, ordered field selection to formatted
//! text blocks per issue.
//!
//! Each supported field is a [`FieldKind`] variant carrying its own extraction
//! and formatting rule. Unknown names in the configuration are rejected at
//! load time by [`FieldKind::parse`] returning `None`. Rendering is
//! deterministic: the same issue and selection always produce byte-identical
//! output.

use chrono::DateTime;
use tracing::warn;

use crate::config::RenderOptions;
use crate::issue::{CommentPage, Issue, Named, Progress, User};

/// A supported issue field, in the case-sensitive spelling used in config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Key,
    Id,
    Summary,
    Description,
    Assignee,
    Reporter,
    Creator,
    Status,
    Priority,
    Created,
    Progress,
    AggregateProgress,
    Comment,
}

impl FieldKind {
    /// Case-sensitive lookup against the field registry.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "Key" => Some(Self::Key),
            "Id" => Some(Self::Id),
            "Summary" => Some(Self::Summary),
            "Description" => Some(Self::Description),
            "Assignee" => Some(Self::Assignee),
            "Reporter" => Some(Self::Reporter),
            "Creator" => Some(Self::Creator),
            "Status" => Some(Self::Status),
            "Priority" => Some(Self::Priority),
            "Created" => Some(Self::Created),
            "Progress" => Some(Self::Progress),
            "AggregateProgress" => Some(Self::AggregateProgress),
            "Comment" => Some(Self::Comment),
            _ => None,
        }
    }

    /// Label emitted in front of the rendered value.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Key => "Key",
            Self::Id => "Id",
            Self::Summary => "Summary",
            Self::Description => "Description",
            Self::Assignee => "Assignee",
            Self::Reporter => "Reporter",
            Self::Creator => "Creator",
            Self::Status => "Status",
            Self::Priority => "Priority",
            Self::Created => "Created",
            Self::Progress => "Progress",
            Self::AggregateProgress => "AggregateProgress",
            Self::Comment => "Comment",
        }
    }

    /// The REST field name to request from the search endpoint, if any.
    /// `key` and `id` are always present on the issue envelope.
    pub fn api_field(&self) -> Option<&'static str> {
        match self {
            Self::Key | Self::Id => None,
            Self::Summary => Some("summary"),
            Self::Description => Some("description"),
            Self::Assignee => Some("assignee"),
            Self::Reporter => Some("reporter"),
            Self::Creator => Some("creator"),
            Self::Status => Some("status"),
            Self::Priority => Some("priority"),
            Self::Created => Some("created"),
            Self::Progress => Some("progress"),
            Self::AggregateProgress => Some("aggregateprogress"),
            Self::Comment => Some("comment"),
        }
    }
}

/// Comma-joined REST field filter for a selection, deduplicated, in order.
pub fn api_fields(selection: &[FieldKind]) -> String {
    let mut names: Vec<&str> = Vec::new();
    for kind in selection {
        if let Some(name) = kind.api_field() {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names.join(",")
}

/// One rendered field: bold label plus a possibly multi-line value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldBlock {
    pub label: &'static str,
    pub value: String,
}

/// Renders the selected fields of one issue, in selection order. Absent
/// nested data yields an empty value under the field's label, never an error.
pub fn render_issue(issue: &Issue, selection: &[FieldKind], opts: &RenderOptions) -> Vec<FieldBlock> {
    selection
        .iter()
        .map(|kind| FieldBlock {
            label: kind.label(),
            value: render_field(issue, *kind, opts),
        })
        .collect()
}

fn render_field(issue: &Issue, kind: FieldKind, opts: &RenderOptions) -> String {
    let fields = &issue.fields;
    match kind {
        FieldKind::Key => issue.key.clone(),
        FieldKind::Id => issue.id.clone(),
        FieldKind::Summary => fields.summary.clone().unwrap_or_default(),
        FieldKind::Description => truncate(
            fields.description.as_deref().unwrap_or_default(),
            opts.max_field_length,
        ),
        FieldKind::Assignee => user_name(&fields.assignee),
        FieldKind::Reporter => user_name(&fields.reporter),
        FieldKind::Creator => user_name(&fields.creator),
        FieldKind::Status => named(&fields.status),
        FieldKind::Priority => named(&fields.priority),
        FieldKind::Created => format_created(issue, opts),
        FieldKind::Progress => format_progress(&fields.progress),
        FieldKind::AggregateProgress => format_progress(&fields.aggregateprogress),
        FieldKind::Comment => format_comments(&fields.comment, opts),
    }
}

/// Truncation is by character count, with no ellipsis marker.
fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

fn user_name(user: &Option<User>) -> String {
    user.as_ref()
        .and_then(|u| u.display_name.clone().or_else(|| u.name.clone()))
        .unwrap_or_default()
}

fn named(obj: &Option<Named>) -> String {
    obj.as_ref()
        .and_then(|n| n.name.clone())
        .unwrap_or_default()
}

/// Parses `created` with the configured API format and re-formats it for
/// display. A parse failure is the only non-fatal error in the pipeline: it
/// logs a warning and renders as empty.
fn format_created(issue: &Issue, opts: &RenderOptions) -> String {
    let Some(raw) = issue.fields.created.as_deref() else {
        return String::new();
    };
    match DateTime::parse_from_str(raw, &opts.api_datetime_format) {
        Ok(parsed) => parsed.format(&opts.datetime_format).to_string(),
        Err(e) => {
            warn!(
                issue = %issue.key,
                created = raw,
                error = %e,
                "Failed to parse created timestamp, rendering empty"
            );
            String::new()
        }
    }
}

fn format_progress(progress: &Option<Progress>) -> String {
    match progress {
        Some(p) => format!(
            "{}/{}",
            p.progress.unwrap_or_default(),
            p.total.unwrap_or_default()
        ),
        None => String::new(),
    }
}

/// One `author - body` line per comment, in API order.
fn format_comments(page: &Option<CommentPage>, opts: &RenderOptions) -> String {
    let Some(page) = page else {
        return String::new();
    };
    let lines: Vec<String> = page
        .comments
        .iter()
        .map(|c| {
            format!(
                "{} - {}",
                user_name(&c.author),
                truncate(c.body.as_deref().unwrap_or_default(), opts.max_field_length)
            )
        })
        .collect();
    lines.join("\n")
}
