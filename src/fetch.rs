// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Concurrent issue snapshot fetching.
//!
//! Refreshes the cached issue snapshots of many facets at once. Every facet
//! gets its own fetch, and all fetches run concurrently. The batch always
//! waits for every fetch to finish, and reports each outcome separately.
//! One failing fetch never cancels another, nor does it touch the failing
//! facet's previously cached snapshot.
//!
//! # Fetch Lifecycle
//!
//! ```text
//! Pending -> InFlight -> Succeeded
//!                     -> Failed
//! ```
//!
//! Facets without a tracker issue skip straight from pending to skipped.
//! Failed fetches are not retried.

use crate::{
    config::FacetName,
    facet::{snapshot::IssueSnapshot, snapshot::SnapshotError, Facet},
    tracker::{IssueTracker, TrackerError},
};

use futures::future::join_all;
use tracing::{debug, instrument, warn};

/// Terminal outcome of a single fetch.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Fresh snapshot was fetched and cached.
    Succeeded(IssueSnapshot),

    /// Fetch failed, cached snapshot left untouched.
    Failed(FetchError),

    /// Facet has no tracker issue to fetch.
    Skipped,
}

impl FetchOutcome {
    /// Check if fetch failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Outcome of fetch for one facet.
#[derive(Debug)]
pub struct FetchReport {
    pub facet: FacetName,
    pub outcome: FetchOutcome,
}

/// Fetch issue snapshots of all facets concurrently.
///
/// Returns one report per facet, in the same order as the given facets.
#[instrument(skip_all, fields(count = facets.len()), level = "debug")]
pub async fn fetch_all<T>(facets: &[Facet], tracker: &T) -> Vec<FetchReport>
where
    T: IssueTracker,
{
    join_all(facets.iter().map(|facet| fetch_one(facet, tracker))).await
}

async fn fetch_one<T>(facet: &Facet, tracker: &T) -> FetchReport
where
    T: IssueTracker,
{
    let name = facet.name().clone();
    debug!("pending fetch for {name}");

    let Some(key) = facet.issue_key() else {
        debug!("skip fetch for {name}: no tracker issue");
        return FetchReport {
            facet: name,
            outcome: FetchOutcome::Skipped,
        };
    };

    debug!("fetch in flight for {name}: {key}");
    let outcome = match facet.fetch_snapshot(key, tracker).await {
        Ok(snapshot) => {
            debug!("fetch succeeded for {name}");
            FetchOutcome::Succeeded(snapshot)
        }
        Err(error) => {
            warn!("fetch failed for {name}: {error}");
            FetchOutcome::Failed(error)
        }
    };

    FetchReport {
        facet: name,
        outcome,
    }
}

/// Failed fetch of a facet's issue snapshot.
#[derive(Debug, thiserror::Error)]
#[error("failed to fetch issue {issue} for facet {facet}")]
pub struct FetchError {
    pub facet: FacetName,
    pub issue: String,
    #[source]
    pub cause: FetchCause,
}

/// Underlying cause of failed fetch.
#[derive(Debug, thiserror::Error)]
pub enum FetchCause {
    /// Tracker could not deliver issue.
    #[error(transparent)]
    Tracker(#[from] TrackerError),

    /// Fetched issue could not be cached.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}
