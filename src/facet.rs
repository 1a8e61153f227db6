// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Facet domain representation.
//!
//! A __facet__ is a named unit of work, usually mapped onto an issue in an
//! external tracker. Each facet owns a directory in the facet store holding
//! its configuration, a cached snapshot of its tracker issue, and any
//! free-form notes the user keeps around.
//!
//! # Workflow Status
//!
//! A facet linked to a tracker issue derives its workflow status from the
//! cached issue snapshot. A facet without a tracker issue stores its status
//! directly in its configuration, defaulting to "todo". A facet is
//! __active__ when it is followed and not done.
//!
//! # Snapshot Caching
//!
//! Snapshots are fetched lazily. The first access of a facet without a
//! cached snapshot fetches one from the tracker. Failed fetches never touch
//! the previously cached snapshot.
//!
//! # See Also
//!
//! 1. [`status`]
//! 2. [`snapshot`]
//! 3. [`patch`]

pub mod patch;
pub mod snapshot;
pub mod status;

use crate::{
    config::{FacetConfig, FacetName, Settings},
    facet::{
        patch::FacetPatch,
        snapshot::{IssueSnapshot, SnapshotError, SNAPSHOT_FILE_NAME},
        status::{facet_style, StatusError, WorkflowStatus},
    },
    fetch::{FetchCause, FetchError},
    path::PathError,
    store::{read_config_at, write_config_at, StoreError},
    tracker::IssueTracker,
};

use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, warn};

/// Candidate notes files, in order of preference.
const NOTES_FILE_NAMES: [&str; 4] = ["notes.txt", "notes.md", "notes.org", "notes.py"];

/// Pull request description file.
const PR_FILE_NAME: &str = "PR.md";

/// Summary shown when issue snapshot cannot be obtained.
const FAILED_SUMMARY: &str = "<failed to fetch summary>";

/// A single facet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Facet {
    name: FacetName,
    dir: PathBuf,
    config: FacetConfig,
}

impl Facet {
    /// Construct new facet from already loaded configuration.
    pub fn new(name: FacetName, dir: impl Into<PathBuf>, config: FacetConfig) -> Self {
        Self {
            name,
            dir: dir.into(),
            config,
        }
    }

    /// Name of facet.
    pub fn name(&self) -> &FacetName {
        &self.name
    }

    /// Directory of facet.
    pub fn dir(&self) -> &Path {
        self.dir.as_path()
    }

    /// Configuration of facet as of last read or write.
    pub fn config(&self) -> &FacetConfig {
        &self.config
    }

    /// Tracker issue key of facet.
    pub fn issue_key(&self) -> Option<&str> {
        self.config.jira.as_deref()
    }

    /// Branch of facet.
    pub fn branch(&self) -> Option<&str> {
        self.config.branch.as_deref()
    }

    /// Shell expanded repository path of facet.
    ///
    /// # Errors
    ///
    /// - Return [`PathError::ShellExpansion`] if repository path references
    ///   an undefined variable.
    pub fn repo_path(&self) -> Result<Option<PathBuf>, PathError> {
        self.config
            .repo
            .as_deref()
            .map(crate::path::expand_path)
            .transpose()
    }

    /// Path of cached issue snapshot.
    pub fn snapshot_file(&self) -> PathBuf {
        self.dir.join(SNAPSHOT_FILE_NAME)
    }

    /// Path of notes file.
    ///
    /// Picks the first notes file that exists, or "notes.txt" otherwise.
    pub fn notes_file(&self) -> PathBuf {
        NOTES_FILE_NAMES
            .iter()
            .map(|file_name| self.dir.join(file_name))
            .find(|path| path.exists())
            .unwrap_or_else(|| self.dir.join(NOTES_FILE_NAMES[0]))
    }

    /// Path of pull request description file.
    pub fn pr_file(&self) -> PathBuf {
        self.dir.join(PR_FILE_NAME)
    }

    /// Browser URL of tracker issue.
    pub fn issue_url(&self, settings: &Settings) -> Option<String> {
        let host = settings.jira_host.as_deref()?;
        let key = self.issue_key()?;
        Some(format!("https://{host}/browse/{key}"))
    }

    /// Browser URL of pull request for facet branch.
    pub fn pull_request_url(&self, settings: &Settings) -> Option<String> {
        let base = settings.github_repo_url.as_deref()?;
        let branch = self.branch()?;
        Some(format!("{}/pull/{branch}", base.trim_end_matches('/')))
    }

    /// Merge patch into facet configuration.
    ///
    /// Re-reads the configuration on disk, fills in keys from the patch that
    /// are missing, and writes the result back. Existing keys always win.
    ///
    /// # Errors
    ///
    /// - Return [`FacetError::StatusDerived`] if the patch would leave an
    ///   explicit status next to a tracker issue.
    /// - Return [`FacetError::Store`] if configuration cannot be read or
    ///   written.
    #[instrument(skip(self, patch), fields(facet = %self.name), level = "debug")]
    pub fn apply_patch(&mut self, patch: &FacetPatch) -> Result<()> {
        let existing = read_config_at(&self.dir, &self.name)?;
        let mixed = |config: &FacetConfig| config.jira.is_some() && config.status.is_some();
        let merged = patch.apply_to(existing.clone());

        // INVARIANT: Older configs that already mix both are left as they are.
        if mixed(&merged) && !mixed(&existing) {
            return Err(FacetError::StatusDerived {
                facet: self.name.clone(),
            });
        }

        write_config_at(&self.dir, &merged)?;
        self.config = merged;

        Ok(())
    }

    /// Show facet in default listings.
    ///
    /// # Errors
    ///
    /// - Return [`FacetError::Store`] if configuration cannot be read or
    ///   written.
    pub fn follow(&mut self) -> Result<()> {
        self.rewrite_config(|config| FacetConfig {
            follow: Some(true),
            ..config
        })
    }

    /// Hide facet from default listings.
    ///
    /// # Errors
    ///
    /// - Return [`FacetError::Store`] if configuration cannot be read or
    ///   written.
    pub fn unfollow(&mut self) -> Result<()> {
        self.rewrite_config(|config| FacetConfig {
            follow: Some(false),
            ..config
        })
    }

    /// Store explicit workflow status.
    ///
    /// # Errors
    ///
    /// - Return [`FacetError::StatusDerived`] if facet is linked to a tracker
    ///   issue, because its status then comes from the tracker.
    /// - Return [`FacetError::Store`] if configuration cannot be read or
    ///   written.
    pub fn set_status(&mut self, status: WorkflowStatus) -> Result<()> {
        if self.issue_key().is_some() {
            return Err(FacetError::StatusDerived {
                facet: self.name.clone(),
            });
        }

        self.rewrite_config(|config| FacetConfig {
            status: Some(status),
            ..config
        })
    }

    fn rewrite_config(&mut self, edit: impl FnOnce(FacetConfig) -> FacetConfig) -> Result<()> {
        let config = edit(read_config_at(&self.dir, &self.name)?);
        write_config_at(&self.dir, &config)?;
        self.config = config;

        Ok(())
    }

    /// Get cached issue snapshot, fetching it first if absent.
    ///
    /// # Errors
    ///
    /// - Return [`FacetError::NoIssueKey`] if facet has no tracker issue.
    /// - Return [`FacetError::Snapshot`] if cached snapshot is unreadable.
    /// - Return [`FacetError::Fetch`] if fetching fails.
    pub async fn snapshot<T>(&self, tracker: &T) -> Result<IssueSnapshot>
    where
        T: IssueTracker,
    {
        let key = self.require_issue_key()?;
        if let Some(snapshot) = IssueSnapshot::load(self.snapshot_file())? {
            return Ok(snapshot);
        }

        debug!("no cached snapshot for {}", self.name);
        Ok(self.fetch_snapshot(key, tracker).await?)
    }

    /// Fetch issue snapshot unconditionally, replacing cached one.
    ///
    /// # Errors
    ///
    /// - Return [`FacetError::NoIssueKey`] if facet has no tracker issue.
    /// - Return [`FacetError::Fetch`] if fetching fails.
    pub async fn refetch<T>(&self, tracker: &T) -> Result<IssueSnapshot>
    where
        T: IssueTracker,
    {
        let key = self.require_issue_key()?;
        Ok(self.fetch_snapshot(key, tracker).await?)
    }

    /// Fetch issue snapshot for issue key, and cache it.
    ///
    /// The cached snapshot is only replaced after a complete, non-empty
    /// response has been received.
    pub(crate) async fn fetch_snapshot<T>(
        &self,
        key: &str,
        tracker: &T,
    ) -> Result<IssueSnapshot, FetchError>
    where
        T: IssueTracker,
    {
        let fail = |cause: FetchCause| FetchError {
            facet: self.name.clone(),
            issue: key.to_string(),
            cause,
        };

        let json = tracker
            .fetch_issue(key)
            .await
            .map_err(|err| fail(err.into()))?;
        let snapshot = IssueSnapshot::new(json);
        snapshot
            .store(self.snapshot_file())
            .map_err(|err| fail(err.into()))?;

        Ok(snapshot)
    }

    fn require_issue_key(&self) -> Result<&str> {
        self.issue_key().ok_or_else(|| FacetError::NoIssueKey {
            facet: self.name.clone(),
        })
    }

    /// Resolve workflow status of facet.
    ///
    /// # Errors
    ///
    /// - Return [`FacetError::Status`] if tracker status has no mapping.
    /// - Return [`FacetError::Snapshot`] or [`FacetError::Fetch`] if issue
    ///   snapshot cannot be obtained.
    pub async fn status<T>(&self, tracker: &T) -> Result<WorkflowStatus>
    where
        T: IssueTracker,
    {
        if self.issue_key().is_none() {
            return Ok(self.config.status.unwrap_or_default());
        }

        self.snapshot(tracker)
            .await?
            .status()
            .map_err(|err| FacetError::Status {
                facet: self.name.clone(),
                source: err,
            })
    }

    /// Check if facet is done.
    ///
    /// # Errors
    ///
    /// - Return [`FacetError`] if status cannot be resolved.
    pub async fn is_done<T>(&self, tracker: &T) -> Result<bool>
    where
        T: IssueTracker,
    {
        Ok(self.status(tracker).await?.is_done())
    }

    /// Check if facet is active, i.e., followed and not done.
    ///
    /// Unfollowed facets are never active, so their status is not resolved.
    ///
    /// # Errors
    ///
    /// - Return [`FacetError`] if status cannot be resolved.
    pub async fn is_active<T>(&self, tracker: &T) -> Result<bool>
    where
        T: IssueTracker,
    {
        if !self.config.is_followed() {
            return Ok(false);
        }

        Ok(!self.is_done(tracker).await?)
    }

    /// Format facet as single summary line.
    ///
    /// The facet name is styled by workflow status, and emphasized when it is
    /// the current facet. The issue summary follows in plain text. Tracker
    /// problems never escape this method: the name falls back to unstyled
    /// text, and the summary to a placeholder.
    pub async fn format<T>(&self, tracker: &T, is_current: bool) -> String
    where
        T: IssueTracker,
    {
        if self.issue_key().is_none() {
            let style = facet_style(Some(self.config.status.unwrap_or_default()), is_current);
            return self.name.style(style).to_string();
        }

        let (status, summary) = match self.snapshot(tracker).await {
            Ok(snapshot) => {
                let status = snapshot
                    .status()
                    .inspect_err(|err| warn!("facet {}: {err}", self.name))
                    .ok();
                let summary = snapshot.summary().unwrap_or_default().to_string();
                (status, summary)
            }
            Err(err) => {
                warn!("facet {}: {err}", self.name);
                (None, FAILED_SUMMARY.to_string())
            }
        };

        let name = match (status, is_current) {
            (None, false) => self.name.to_string(),
            _ => self.name.style(facet_style(status, is_current)).to_string(),
        };

        format!("{name}  {summary}")
    }
}

/// Facet error types.
#[derive(Debug, thiserror::Error)]
pub enum FacetError {
    /// Facet has no tracker issue to fetch.
    #[error("facet {facet} has no tracker issue")]
    NoIssueKey { facet: FacetName },

    /// Facet status comes from tracker, and cannot be set.
    #[error("facet {facet} derives its status from its tracker issue")]
    StatusDerived { facet: FacetName },

    /// Tracker status cannot be mapped.
    #[error("cannot resolve status of facet {facet}")]
    Status {
        facet: FacetName,
        #[source]
        source: StatusError,
    },

    /// Fetching issue snapshot failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Cached issue snapshot is unusable.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    /// Facet configuration cannot be read or written.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Friendly result alias :3
pub type Result<T, E = FacetError> = std::result::Result<T, E>;
