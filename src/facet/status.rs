// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Workflow status handling.
//!
//! Every facet sits in exactly one __workflow status__. When a facet is linked
//! to an external tracker issue, the status is derived from the tracker's own
//! status name through a fixed table. Otherwise, the status comes straight
//! from the facet config.
//!
//! # Tracker Status Table
//!
//! | Tracker status | Workflow status |
//! |----------------|-----------------|
//! | Open           | Todo            |
//! | To Do          | Todo            |
//! | Groomed        | Todo            |
//! | Reopened       | Todo            |
//! | In Progress    | Doing           |
//! | Review         | UnderReview     |
//! | Closed         | Done            |
//! | Done           | Done            |
//!
//! Any tracker status outside of this table is an error. Defaulting it to
//! some workflow status would quietly hide or resurrect facets.

use owo_colors::Style;
use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

/// Tracker status names and the workflow status they map onto.
pub const TRACKER_STATUS_TABLE: [(&str, WorkflowStatus); 8] = [
    ("Open", WorkflowStatus::Todo),
    ("To Do", WorkflowStatus::Todo),
    ("Groomed", WorkflowStatus::Todo),
    ("Reopened", WorkflowStatus::Todo),
    ("In Progress", WorkflowStatus::Doing),
    ("Review", WorkflowStatus::UnderReview),
    ("Closed", WorkflowStatus::Done),
    ("Done", WorkflowStatus::Done),
];

/// Closed set of workflow statuses.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkflowStatus {
    #[default]
    Todo,
    Doing,
    UnderReview,
    Done,
}

impl WorkflowStatus {
    /// Map tracker status name into workflow status.
    ///
    /// # Errors
    ///
    /// - Return [`StatusError::Unmapped`] if status name is not part of
    ///   [`TRACKER_STATUS_TABLE`].
    pub fn from_tracker(status_name: &str) -> Result<Self> {
        TRACKER_STATUS_TABLE
            .iter()
            .find(|(name, _)| *name == status_name)
            .map(|(_, status)| *status)
            .ok_or_else(|| StatusError::Unmapped(status_name.into()))
    }

    /// Check if status marks work as finished.
    pub fn is_done(self) -> bool {
        matches!(self, Self::Done)
    }

    /// Display style of status.
    pub fn style(self) -> Style {
        match self {
            Self::Todo => Style::new(),
            Self::Doing => Style::new().green(),
            Self::UnderReview => Style::new().yellow(),
            Self::Done => Style::new().dimmed(),
        }
    }
}

impl Display for WorkflowStatus {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(match self {
            Self::Todo => "todo",
            Self::Doing => "doing",
            Self::UnderReview => "under-review",
            Self::Done => "done",
        })
    }
}

impl FromStr for WorkflowStatus {
    type Err = StatusError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        match data {
            "todo" => Ok(Self::Todo),
            "doing" => Ok(Self::Doing),
            "under-review" => Ok(Self::UnderReview),
            "done" => Ok(Self::Done),
            _ => Err(StatusError::Unknown(data.into())),
        }
    }
}

/// Determine display style of facet name.
///
/// An unknown status, e.g., because the tracker could not be reached,
/// renders unstyled. The current facet is always emphasized.
pub fn facet_style(status: Option<WorkflowStatus>, is_current: bool) -> Style {
    let style = status.map(WorkflowStatus::style).unwrap_or_else(Style::new);
    if is_current {
        style.bold()
    } else {
        style
    }
}

/// Workflow status error types.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StatusError {
    /// Tracker reported a status name with no known mapping.
    #[error("tracker status {0:?} has no workflow status mapping")]
    Unmapped(String),

    /// Workflow status name is not one of the known statuses.
    #[error("unknown workflow status {0:?}, expected todo, doing, under-review, or done")]
    Unknown(String),

    /// Tracker snapshot carries no status name at all.
    #[error("tracker snapshot has no status name")]
    Missing,
}

/// Friendly result alias :3
pub type Result<T, E = StatusError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use owo_colors::OwoColorize;
    use pretty_assertions::assert_eq;
    use simple_test_case::test_case;

    #[test_case("Open", WorkflowStatus::Todo; "open")]
    #[test_case("To Do", WorkflowStatus::Todo; "to do")]
    #[test_case("Groomed", WorkflowStatus::Todo; "groomed")]
    #[test_case("Reopened", WorkflowStatus::Todo; "reopened")]
    #[test_case("In Progress", WorkflowStatus::Doing; "in progress")]
    #[test_case("Review", WorkflowStatus::UnderReview; "review")]
    #[test_case("Closed", WorkflowStatus::Done; "closed")]
    #[test_case("Done", WorkflowStatus::Done; "done")]
    #[test]
    fn tracker_status_maps(name: &str, expect: WorkflowStatus) {
        use pretty_assertions::assert_eq;

        assert_eq!(WorkflowStatus::from_tracker(name), Ok(expect));
    }

    #[test_case("Blocked"; "unknown name")]
    #[test_case("in progress"; "case mismatch")]
    #[test_case(""; "empty")]
    #[test]
    fn tracker_status_unmapped(name: &str) {
        use pretty_assertions::assert_eq;

        assert_eq!(
            WorkflowStatus::from_tracker(name),
            Err(StatusError::Unmapped(name.into()))
        );
    }

    #[test]
    fn workflow_status_display_parses_back() {
        for status in [
            WorkflowStatus::Todo,
            WorkflowStatus::Doing,
            WorkflowStatus::UnderReview,
            WorkflowStatus::Done,
        ] {
            assert_eq!(status.to_string().parse::<WorkflowStatus>(), Ok(status));
        }

        assert_eq!(
            "blocked".parse::<WorkflowStatus>(),
            Err(StatusError::Unknown("blocked".into()))
        );
    }

    #[test]
    fn only_done_is_done() {
        let done = [
            WorkflowStatus::Todo,
            WorkflowStatus::Doing,
            WorkflowStatus::UnderReview,
            WorkflowStatus::Done,
        ]
        .into_iter()
        .filter(|status| status.is_done())
        .collect::<Vec<_>>();

        assert_eq!(done, vec![WorkflowStatus::Done]);
    }

    #[test]
    fn current_facet_is_emphasized() {
        let result = format!(
            "{}",
            "PROJ-1".style(facet_style(Some(WorkflowStatus::Doing), true))
        );
        let expect = format!("{}", "PROJ-1".style(Style::new().green().bold()));
        assert_eq!(result, expect);

        let result = format!("{}", "PROJ-1".style(facet_style(None, true)));
        let expect = format!("{}", "PROJ-1".style(Style::new().bold()));
        assert_eq!(result, expect);
    }

    #[test]
    fn unknown_status_is_plain() {
        let result = format!("{}", "PROJ-1".style(facet_style(None, false)));
        assert_eq!(result, "PROJ-1");
    }
}
