// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! External issue tracker access.
//!
//! Facets linked to a tracker issue keep a cached snapshot of that issue.
//! The [`IssueTracker`] trait is the seam used to fetch fresh issue JSON, with
//! [`JiraTracker`] as the real implementation talking to a Jira REST API.
//!
//! # Credentials
//!
//! Jira is accessed through basic authentication. Credentials are read from
//! `<root>/auth.toml`, where both `username` and `password` are optional. Any
//! missing credential is prompted for interactively. Credentials are resolved
//! at most once per process, no matter how many fetches run concurrently.

use crate::config::{AuthConfig, ConfigError, Settings};

use inquire::{Password, Text};
use reqwest::Client;
use serde_json::Value;
use std::{
    fs,
    future::Future,
    io,
    path::{Path, PathBuf},
};
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Source of raw issue JSON.
pub trait IssueTracker: Send + Sync {
    /// Fetch issue JSON by issue key.
    fn fetch_issue(&self, key: &str) -> impl Future<Output = Result<Value>> + Send;
}

/// Resolved tracker credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Load credentials from auth file, prompting for whatever is missing.
    ///
    /// # Errors
    ///
    /// - Return [`TrackerError::ReadAuth`] if auth file exists but cannot
    ///   be read.
    /// - Return [`TrackerError::Auth`] if auth file cannot be parsed.
    /// - Return [`TrackerError::Prompt`] if prompting fails.
    pub fn load_or_prompt(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let auth = match fs::read_to_string(path) {
            Ok(data) => data.parse::<AuthConfig>().map_err(|err| TrackerError::Auth {
                source: err,
                path: path.to_path_buf(),
            })?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!(
                    "credentials can be stored in {:?} with optional keys 'username' and 'password'",
                    path.display()
                );
                AuthConfig::default()
            }
            Err(err) => {
                return Err(TrackerError::ReadAuth {
                    source: err,
                    path: path.to_path_buf(),
                })
            }
        };

        let username = match auth.username {
            Some(username) => username,
            None => Text::new("Jira username:").prompt()?,
        };
        let password = match auth.password {
            Some(password) => password,
            None => Password::new("Jira password:")
                .without_confirmation()
                .prompt()?,
        };

        Ok(Self { username, password })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fmt.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Issue tracker access through Jira REST API.
#[derive(Debug)]
pub struct JiraTracker {
    client: Client,
    host: Option<String>,
    auth_path: PathBuf,
    credentials: OnceCell<Credentials>,
}

impl JiraTracker {
    /// Construct new Jira tracker.
    ///
    /// # Errors
    ///
    /// - Return [`TrackerError::Request`] if HTTP client cannot be built.
    pub fn new(settings: &Settings, auth_path: impl Into<PathBuf>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("facet/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            host: settings.jira_host.clone(),
            auth_path: auth_path.into(),
            credentials: OnceCell::new(),
        })
    }

    /// Resolve credentials, prompting at most once per tracker.
    ///
    /// # Errors
    ///
    /// - Return [`TrackerError`] if credentials cannot be loaded.
    pub async fn credentials(&self) -> Result<&Credentials> {
        self.credentials
            .get_or_try_init(|| async { Credentials::load_or_prompt(&self.auth_path) })
            .await
    }

    /// REST endpoint of issue JSON.
    ///
    /// # Errors
    ///
    /// - Return [`TrackerError::NoHost`] if no tracker host is configured.
    /// - Return [`TrackerError::InvalidKey`] if issue key would escape its
    ///   path segment.
    pub fn issue_json_url(&self, key: &str) -> Result<String> {
        let host = self.host.as_deref().ok_or(TrackerError::NoHost)?;
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(TrackerError::InvalidKey(key.into()));
        }

        Ok(format!("https://{host}/rest/api/latest/issue/{key}"))
    }
}

impl IssueTracker for JiraTracker {
    fn fetch_issue(&self, key: &str) -> impl Future<Output = Result<Value>> + Send {
        async move {
            let url = self.issue_json_url(key)?;
            let credentials = self.credentials().await?;
            debug!("fetch issue json: {url}");

            let response = self
                .client
                .get(&url)
                .basic_auth(&credentials.username, Some(&credentials.password))
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                return Err(TrackerError::Status {
                    url,
                    status: status.as_u16(),
                });
            }

            parse_issue_body(&response.bytes().await?)
        }
    }
}

/// Parse raw issue response body.
///
/// Rejects bodies that carry nothing, i.e., empty bodies, `null`, and `{}`.
///
/// # Errors
///
/// - Return [`TrackerError::EmptyBody`] if body carries nothing.
/// - Return [`TrackerError::Json`] if body is not valid JSON.
pub fn parse_issue_body(body: &[u8]) -> Result<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(TrackerError::EmptyBody);
    }

    let json: Value = serde_json::from_slice(body)?;
    match &json {
        Value::Null => Err(TrackerError::EmptyBody),
        Value::Object(map) if map.is_empty() => Err(TrackerError::EmptyBody),
        _ => Ok(json),
    }
}

/// Tracker error types.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// No tracker host configured in settings.
    #[error("no jira_host configured in settings")]
    NoHost,

    /// Issue key cannot be used in a request path.
    #[error("invalid issue key {0:?}")]
    InvalidKey(String),

    /// Request could not be completed.
    #[error(transparent)]
    Request(#[from] reqwest::Error),

    /// Tracker answered with non-success status.
    #[error("request to {url} failed with status {status}")]
    Status { url: String, status: u16 },

    /// Tracker answered with nothing.
    #[error("tracker returned an empty issue")]
    EmptyBody,

    /// Tracker answered with invalid JSON.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Auth file cannot be read.
    #[error("failed to read auth file at {:?}", path.display())]
    ReadAuth {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    /// Auth file cannot be parsed.
    #[error("corrupt auth file at {:?}", path.display())]
    Auth {
        #[source]
        source: ConfigError,
        path: PathBuf,
    },

    /// Credential prompt failed.
    #[error(transparent)]
    Prompt(#[from] inquire::InquireError),
}

/// Friendly result alias :3
pub type Result<T, E = TrackerError> = std::result::Result<T, E>;

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use simple_test_case::test_case;
    use std::{
        collections::HashMap,
        sync::atomic::{AtomicUsize, Ordering},
    };

    /// Tracker answering from canned issue JSON.
    ///
    /// Keys without canned JSON fail with a 503.
    #[derive(Debug, Default)]
    pub(crate) struct StubTracker {
        pub(crate) issues: HashMap<String, Value>,
        pub(crate) calls: AtomicUsize,
    }

    impl StubTracker {
        pub(crate) fn with_issue(mut self, key: &str, json: Value) -> Self {
            self.issues.insert(key.into(), json);
            self
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl IssueTracker for StubTracker {
        fn fetch_issue(&self, key: &str) -> impl Future<Output = Result<Value>> + Send {
            async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                tokio::task::yield_now().await;
                self.issues
                    .get(key)
                    .cloned()
                    .ok_or_else(|| TrackerError::Status {
                        url: format!("stub://{key}"),
                        status: 503,
                    })
            }
        }
    }

    #[test]
    fn parse_issue_body_rejects_nothing() {
        for body in ["", "  \n", "null", "{}"] {
            assert!(
                matches!(parse_issue_body(body.as_bytes()), Err(TrackerError::EmptyBody)),
                "body {body:?} should be empty"
            );
        }

        assert!(matches!(
            parse_issue_body(b"{\"fields\""),
            Err(TrackerError::Json(_))
        ));
    }

    #[test]
    fn parse_issue_body_accepts_issue() -> anyhow::Result<()> {
        let result = parse_issue_body(br#"{"fields":{"summary":"Fix bug"}}"#)?;
        assert_eq!(result, json!({ "fields": { "summary": "Fix bug" } }));
        Ok(())
    }

    #[test]
    fn issue_json_url_requires_host() -> anyhow::Result<()> {
        let tracker = JiraTracker::new(&Settings::default(), "auth.toml")?;
        assert!(matches!(
            tracker.issue_json_url("PROJ-1"),
            Err(TrackerError::NoHost)
        ));

        let settings = Settings {
            jira_host: Some("jira.example.com".into()),
            ..Default::default()
        };
        let tracker = JiraTracker::new(&settings, "auth.toml")?;
        assert_eq!(
            tracker.issue_json_url("PROJ-1")?,
            "https://jira.example.com/rest/api/latest/issue/PROJ-1"
        );

        Ok(())
    }

    #[test_case("PROJ-1/../../admin"; "path traversal")]
    #[test_case("PROJ-1?expand=all"; "query")]
    #[test_case("PROJ 1"; "whitespace")]
    #[test_case(""; "empty")]
    #[test]
    fn issue_json_url_rejects_unsafe_keys(key: &str) {
        let settings = Settings {
            jira_host: Some("jira.example.com".into()),
            ..Default::default()
        };
        let tracker = JiraTracker::new(&settings, "auth.toml").unwrap();
        assert!(matches!(
            tracker.issue_json_url(key),
            Err(TrackerError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn credentials_from_auth_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = crate::path::auth_file(dir.path());
        fs::write(
            &path,
            indoc! {r#"
                username = "jdoe"
                password = "hunter2"
            "#},
        )?;

        let tracker = JiraTracker::new(&Settings::default(), &path)?;
        let result = tracker.credentials().await?;
        assert_eq!(result.username, "jdoe");
        assert_eq!(result.password, "hunter2");

        // Cached for the lifetime of the tracker.
        fs::remove_file(&path)?;
        assert_eq!(tracker.credentials().await?.username, "jdoe");

        Ok(())
    }

    #[test]
    fn credentials_reject_unknown_keys() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = crate::path::auth_file(dir.path());
        fs::write(&path, "user = \"jdoe\"\n")?;

        let result = Credentials::load_or_prompt(&path);
        assert!(matches!(result, Err(TrackerError::Auth { .. })));

        Ok(())
    }
}
