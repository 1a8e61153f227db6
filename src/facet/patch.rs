// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Facet configuration patching.
//!
//! A __patch__ is a partial facet configuration that gets merged into an
//! existing one. The merge is one-sided: keys already present in the
//! existing configuration win, so a patch only fills in what is missing.
//! Merging is single level, since facet configuration has no nesting.

use crate::config::{ConfigError, FacetConfig};

use std::str::FromStr;

/// Partial facet configuration to fill gaps with.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct FacetPatch(FacetConfig);

impl FacetPatch {
    /// Construct new patch.
    pub fn new(config: FacetConfig) -> Self {
        Self(config)
    }

    /// Merge patch into existing configuration.
    ///
    /// Existing values win over patch values on conflict.
    pub fn apply_to(&self, existing: FacetConfig) -> FacetConfig {
        // INVARIANT: Destructure so new config fields cannot be forgotten.
        let FacetConfig {
            name,
            repo,
            branch,
            jira,
            follow,
            status,
        } = self.0.clone();

        FacetConfig {
            name: existing.name.or(name),
            repo: existing.repo.or(repo),
            branch: existing.branch.or(branch),
            jira: existing.jira.or(jira),
            follow: existing.follow.or(follow),
            status: existing.status.or(status),
        }
    }
}

impl FromStr for FacetPatch {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        Ok(Self(data.parse::<FacetConfig>()?))
    }
}

impl From<FacetConfig> for FacetPatch {
    fn from(config: FacetConfig) -> Self {
        Self(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facet::status::WorkflowStatus;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn existing_value_wins() {
        let existing = FacetConfig {
            repo: Some("Y".into()),
            ..Default::default()
        };
        let patch = FacetPatch::new(FacetConfig {
            repo: Some("X".into()),
            ..Default::default()
        });

        let result = patch.apply_to(existing);
        assert_eq!(result.repo.as_deref(), Some("Y"));
    }

    #[test]
    fn patch_fills_missing_keys() -> anyhow::Result<()> {
        let existing = FacetConfig {
            name: Some("PROJ-1".into()),
            branch: Some("PROJ-1".into()),
            follow: Some(false),
            ..Default::default()
        };
        let patch: FacetPatch = indoc! {r#"
            repo = "~/src/project"
            branch = "other"
            jira = "PROJ-1"
            follow = true
            status = "doing"
        "#}
        .parse()?;

        let result = patch.apply_to(existing);
        let expect = FacetConfig {
            name: Some("PROJ-1".into()),
            repo: Some("~/src/project".into()),
            branch: Some("PROJ-1".into()),
            jira: Some("PROJ-1".into()),
            follow: Some(false),
            status: Some(WorkflowStatus::Doing),
        };
        assert_eq!(result, expect);

        Ok(())
    }

    #[test]
    fn empty_patch_is_identity() {
        let existing = FacetConfig {
            repo: Some("Y".into()),
            follow: Some(true),
            ..Default::default()
        };

        let result = FacetPatch::default().apply_to(existing.clone());
        assert_eq!(result, existing);
    }

    #[test]
    fn patch_rejects_unknown_keys() {
        let result = "repository = \"X\"".parse::<FacetPatch>();
        assert!(result.is_err());
    }
}
