//! Jira REST API client: project discovery and paginated issue search.
//!
//! The [`IssueSource`] trait is the seam between the orchestrator and the
//! network; it is mockable for tests. [`JiraClient`] is the real
//! implementation, authenticating with static basic credentials on every
//! request.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::config::JiraSettings;
use crate::issue::Issue;

/// Errors raised by the issue client. All are fatal for the current run:
/// there is no retry, no backoff and no partial-result return.
#[derive(Debug)]
pub enum FetchError {
    /// Transport-level failure.
    Http(reqwest::Error),
    /// The API answered with a non-success status.
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    /// The response body was not the expected JSON shape.
    Decode(serde_json::Error),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Http(e) => write!(f, "Jira API request failed: {e}"),
            FetchError::Status { url, status } => {
                write!(f, "Jira API returned {status} for {url}")
            }
            FetchError::Decode(e) => {
                write!(f, "Jira API response could not be decoded: {e}")
            }
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Http(e) => Some(e),
            FetchError::Status { .. } => None,
            FetchError::Decode(e) => Some(e),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Http(e)
    }
}

/// Read-only view of the issue tracker, implemented by [`JiraClient`] and by
/// mocks in tests.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait IssueSource: Send + Sync {
    /// Every project key visible to the authenticated credentials, in the
    /// order the API returns them (no guaranteed sort).
    async fn list_project_keys(&self) -> Result<Vec<String>, FetchError>;

    /// All issues matching `jql`, requesting only the given comma-separated
    /// `fields`. Pages through the search endpoint in increasing offset
    /// order; a zero-result query yields an empty Vec.
    async fn fetch_issues(&self, jql: &str, fields: &str) -> Result<Vec<Issue>, FetchError>;
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    issues: Vec<Issue>,
}

/// Folds one search page into the accumulated result and decides whether a
/// further page must be requested: a page shorter than `page_size` is the
/// termination signal, so an empty first page ends the fetch with an empty
/// result rather than an error.
fn accumulate_page(all: &mut Vec<Issue>, page: Vec<Issue>, page_size: usize) -> bool {
    let fetched = page.len();
    all.extend(page);
    fetched >= page_size
}

#[derive(Deserialize)]
struct ProjectRef {
    key: String,
}

pub struct JiraClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
    page_size: usize,
}

impl JiraClient {
    pub fn new(settings: &JiraSettings) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(settings.accept_invalid_certs)
            .build()?;
        if settings.accept_invalid_certs {
            info!("TLS certificate validation disabled by configuration");
        }
        Ok(JiraClient {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            username: settings.username.clone(),
            password: settings.password.clone(),
            page_size: settings.page_size,
        })
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.http
            .get(url)
            .basic_auth(&self.username, Some(&self.password))
            .header("Accept", "application/json")
    }
}

#[async_trait]
impl IssueSource for JiraClient {
    async fn list_project_keys(&self) -> Result<Vec<String>, FetchError> {
        let url = format!("{}/rest/api/2/project", self.base_url);
        info!(url = %url, "Listing visible projects");

        let resp = self.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status { url, status });
        }
        let body = resp.bytes().await?;
        let projects: Vec<ProjectRef> =
            serde_json::from_slice(&body).map_err(FetchError::Decode)?;

        info!(count = projects.len(), "Project listing complete");
        Ok(projects.into_iter().map(|p| p.key).collect())
    }

    async fn fetch_issues(&self, jql: &str, fields: &str) -> Result<Vec<Issue>, FetchError> {
        let url = format!("{}/rest/api/2/search", self.base_url);
        let mut all_issues = Vec::new();
        let mut start_at = 0usize;

        // Successive offsets until a page comes back short of the page size.
        loop {
            debug!(jql = jql, start_at = start_at, page_size = self.page_size, "Fetching search page");
            let resp = self
                .get(&url)
                .query(&[
                    ("jql", jql),
                    ("fields", fields),
                    ("startAt", &start_at.to_string()),
                    ("maxResults", &self.page_size.to_string()),
                ])
                .send()
                .await?;
            let status = resp.status();
            if !status.is_success() {
                return Err(FetchError::Status {
                    url: url.clone(),
                    status,
                });
            }
            let body = resp.bytes().await?;
            let page: SearchResponse =
                serde_json::from_slice(&body).map_err(FetchError::Decode)?;

            let more = accumulate_page(&mut all_issues, page.issues, self.page_size);
            debug!(total = all_issues.len(), "Search page received");

            if !more {
                break;
            }
            start_at = all_issues.len();
        }

        info!(jql = jql, issues = all_issues.len(), "Issue fetch complete");
        Ok(all_issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::IssueFields;

    fn issue(key: &str) -> Issue {
        Issue {
            id: key.into(),
            key: key.into(),
            fields: IssueFields::default(),
        }
    }

    fn keys(all: &[Issue]) -> Vec<&str> {
        all.iter().map(|i| i.key.as_str()).collect()
    }

    #[test]
    fn pages_concatenate_in_order_and_a_short_page_terminates() {
        let pages = vec![
            vec![issue("P-1"), issue("P-2")],
            vec![issue("P-3"), issue("P-4")],
            vec![issue("P-5")],
        ];

        let mut all = Vec::new();
        let mut offsets = Vec::new();
        let mut continued = Vec::new();
        for page in pages {
            offsets.push(all.len());
            continued.push(accumulate_page(&mut all, page, 2));
        }

        // Offsets increase by the page length; only the short page stops.
        assert_eq!(offsets, vec![0, 2, 4]);
        assert_eq!(continued, vec![true, true, false]);
        assert_eq!(keys(&all), vec!["P-1", "P-2", "P-3", "P-4", "P-5"]);
    }

    #[test]
    fn exact_multiple_fetches_one_trailing_empty_page() {
        let mut all = Vec::new();
        assert!(accumulate_page(&mut all, vec![issue("P-1"), issue("P-2")], 2));
        assert!(!accumulate_page(&mut all, Vec::new(), 2));
        assert_eq!(keys(&all), vec!["P-1", "P-2"]);
    }

    #[test]
    fn empty_first_page_yields_empty_result_and_stops() {
        let mut all = Vec::new();
        assert!(!accumulate_page(&mut all, Vec::new(), 2));
        assert!(all.is_empty());
    }

    #[test]
    fn decode_failure_is_its_own_error_variant() {
        let cause = serde_json::from_str::<u32>("not json").unwrap_err();
        let err = FetchError::Decode(cause);
        assert!(err.to_string().contains("could not be decoded"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
