// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT


use anyhow::Result;
use facet::{
    config::FacetName,
    facet::Facet,
    path::state_file,
    state::StateFile,
    store::{CreateOptions, FacetStore},
    tracker::{IssueTracker, TrackerError},
};
use serde_json::Value;
use std::{
    collections::HashMap,
    fs::File,
    future::Future,
    sync::atomic::{AtomicUsize, Ordering},
    time::{Duration, SystemTime},
};
use tempfile::TempDir;

/// Facet store rooted in a throwaway directory.
pub(crate) struct StoreFixture {
    pub(crate) root: TempDir,
    pub(crate) store: FacetStore,
}

impl StoreFixture {
    pub(crate) fn new() -> Result<Self> {
        Self::with_settings("")
    }

    pub(crate) fn with_settings(settings: &str) -> Result<Self> {
        let root = tempfile::tempdir()?;
        std::fs::write(facet::path::settings_file(root.path()), settings)?;
        let store = FacetStore::open(root.path())?;

        Ok(Self { root, store })
    }

    pub(crate) fn state(&self) -> StateFile {
        StateFile::new(state_file(self.root.path()))
    }

    pub(crate) fn create(&self, name: &str, jira: Option<&str>) -> Result<Facet> {
        let options = CreateOptions {
            jira: jira.map(Into::into),
            ..Default::default()
        };

        Ok(self.store.create(&name.parse::<FacetName>()?, options)?)
    }

    /// Pin modification time of facet directory, `secs` after the epoch.
    pub(crate) fn age(&self, name: &str, secs: u64) -> Result<()> {
        let dir = self.store.facet_dir(&name.parse::<FacetName>()?);
        File::open(dir)?.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))?;

        Ok(())
    }
}

/// Tracker serving canned issues from memory.
#[derive(Debug, Default)]
pub(crate) struct MockTracker {
    issues: HashMap<String, Value>,
    calls: AtomicUsize,
}

impl MockTracker {
    pub(crate) fn with_issue(mut self, key: &str, json: Value) -> Self {
        self.issues.insert(key.into(), json);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl IssueTracker for MockTracker {
    fn fetch_issue(&self, key: &str) -> impl Future<Output = Result<Value, TrackerError>> + Send {
        async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            self.issues
                .get(key)
                .cloned()
                .ok_or_else(|| TrackerError::Status {
                    url: format!("mock://{key}"),
                    status: 500,
                })
        }
    }
}
