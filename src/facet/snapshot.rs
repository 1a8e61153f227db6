// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Remote issue snapshot caching.
//!
//! A __snapshot__ is the raw JSON document the tracker returned for a facet's
//! issue during the last successful fetch. It is cached in the facet
//! directory as `jira.json`, and overwritten wholesale on every fetch. No
//! history is kept.

use crate::facet::status::{StatusError, WorkflowStatus};

use serde_json::Value;
use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    fs, io,
    path::{Path, PathBuf},
};

/// Name of snapshot file inside of a facet directory.
pub const SNAPSHOT_FILE_NAME: &str = "jira.json";

/// Cached view of a tracker issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueSnapshot(Value);

impl IssueSnapshot {
    /// Construct new snapshot from raw tracker JSON.
    pub fn new(json: Value) -> Self {
        Self(json)
    }

    /// One line summary of issue.
    pub fn summary(&self) -> Option<&str> {
        self.0.pointer("/fields/summary").and_then(Value::as_str)
    }

    /// Tracker native status name of issue.
    pub fn status_name(&self) -> Option<&str> {
        self.0.pointer("/fields/status/name").and_then(Value::as_str)
    }

    /// Map tracker status into workflow status.
    ///
    /// # Errors
    ///
    /// - Return [`StatusError::Missing`] if snapshot has no status name.
    /// - Return [`StatusError::Unmapped`] if status name has no mapping.
    pub fn status(&self) -> Result<WorkflowStatus, StatusError> {
        WorkflowStatus::from_tracker(self.status_name().ok_or(StatusError::Missing)?)
    }

    /// Raw tracker JSON.
    pub fn as_json(&self) -> &Value {
        &self.0
    }

    /// Read cached snapshot, if any.
    ///
    /// An absent snapshot file is not an error.
    ///
    /// # Errors
    ///
    /// - Return [`SnapshotError::Read`] if file exists but cannot be read.
    /// - Return [`SnapshotError::Empty`] if file is empty.
    /// - Return [`SnapshotError::Malformed`] if file is not valid JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(SnapshotError::Read {
                    source: err,
                    path: path.to_path_buf(),
                })
            }
        };

        if data.trim().is_empty() {
            return Err(SnapshotError::Empty {
                path: path.to_path_buf(),
            });
        }

        let json = serde_json::from_str(&data).map_err(|err| SnapshotError::Malformed {
            source: err,
            path: path.to_path_buf(),
        })?;

        Ok(Some(Self(json)))
    }

    /// Replace cached snapshot atomically.
    ///
    /// # Errors
    ///
    /// - Return [`SnapshotError::Write`] if snapshot cannot be written.
    pub fn store(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        crate::store::atomic_write(path, self.to_string().as_bytes()).map_err(|err| {
            SnapshotError::Write {
                source: err,
                path: path.to_path_buf(),
            }
        })
    }
}

impl Display for IssueSnapshot {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        let json = serde_json::to_string_pretty(&self.0).map_err(|_| std::fmt::Error)?;
        fmt.write_str(json.as_str())?;
        fmt.write_str("\n")
    }
}

/// Snapshot cache error types.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Snapshot file cannot be read.
    #[error("failed to read snapshot at {:?}", path.display())]
    Read {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    /// Snapshot file cannot be written.
    #[error("failed to write snapshot at {:?}", path.display())]
    Write {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    /// Snapshot file is empty.
    #[error("snapshot at {:?} is empty", path.display())]
    Empty { path: PathBuf },

    /// Snapshot file is not valid JSON.
    #[error("malformed snapshot at {:?}", path.display())]
    Malformed {
        #[source]
        source: serde_json::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = SnapshotError> = std::result::Result<T, E>;
