// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Specify the layout for configuration files that facet uses to simplify
//! the process of serialization and deserialization. File I/O is left to the
//! caller to figure out.

use crate::facet::status::WorkflowStatus;

use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    str::FromStr,
};

/// Validated facet name.
///
/// The name of a facet doubles as the name of its directory, and usually as
/// its tracker issue key. Thus, a name cannot be empty, cannot contain path
/// separators or whitespace, and cannot begin with the reserved "." prefix.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct FacetName(String);

impl FacetName {
    /// Treat facet name as string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl FromStr for FacetName {
    type Err = ConfigError;

    fn from_str(name: &str) -> Result<Self> {
        let invalid = name.is_empty()
            || name.starts_with('.')
            || name.contains(['/', '\\'])
            || name.chars().any(char::is_whitespace);

        if invalid {
            return Err(ConfigError::InvalidName(name.into()));
        }

        Ok(Self(name.into()))
    }
}

impl TryFrom<String> for FacetName {
    type Error = ConfigError;

    fn try_from(name: String) -> Result<Self> {
        name.parse()
    }
}

impl From<FacetName> for String {
    fn from(name: FacetName) -> Self {
        name.0
    }
}

impl AsRef<str> for FacetName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Display for FacetName {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(self.as_str())
    }
}

/// Facet configuration layout.
///
/// Every facet comes with a __facet config__ file, `facet.toml`, that acts
/// as the sole source of truth for the facet's attributes. All fields are
/// optional. The `name` field is implied by the facet's directory, and gets
/// reconstructed from it when absent.
///
/// Unknown keys are rejected, so a typo like `folow = true` fails loudly
/// instead of being silently ignored.
///
/// # General Layout
///
/// ```toml
/// name = "PROJ-1"
/// repo = "~/src/project"
/// branch = "PROJ-1"
/// jira = "PROJ-1"
/// follow = true
/// status = "doing"
/// ```
///
/// The `issue_key` key is accepted as an alias for `jira`.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FacetConfig {
    /// Name of the facet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Path to associated working copy. Shell expansion is deferred until
    /// the path is requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,

    /// Branch associated with the facet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    /// Issue key in external tracker.
    #[serde(alias = "issue_key", skip_serializing_if = "Option::is_none")]
    pub jira: Option<String>,

    /// Show facet in default listings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow: Option<bool>,

    /// Explicit workflow status, only used without an external tracker.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<WorkflowStatus>,
}

impl FacetConfig {
    /// Initial configuration of a freshly created facet.
    ///
    /// Branch defaults to the facet name, and the facet is followed.
    pub fn initial(name: &FacetName) -> Self {
        Self {
            name: Some(name.to_string()),
            branch: Some(name.to_string()),
            follow: Some(true),
            ..Default::default()
        }
    }

    /// Check if facet shows up in default listings.
    pub fn is_followed(&self) -> bool {
        self.follow.unwrap_or(false)
    }
}

impl FromStr for FacetConfig {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        toml::de::from_str(data).map_err(ConfigError::Deserialize)
    }
}

impl Display for FacetConfig {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::ser::to_string_pretty(self)
                .map_err(ConfigError::Serialize)?
                .as_str(),
        )
    }
}

/// User settings layout.
///
/// Lives at the top of the facet root as `settings.toml`. Every setting is
/// optional.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Host of external issue tracker, e.g., "jira.example.com".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jira_host: Option<String>,

    /// Repository path given to newly created facets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_repo: Option<String>,

    /// Base URL of hosted repository used to derive pull request URLs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_repo_url: Option<String>,
}

impl FromStr for Settings {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        toml::de::from_str(data).map_err(ConfigError::Deserialize)
    }
}

impl Display for Settings {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::ser::to_string_pretty(self)
                .map_err(ConfigError::Serialize)?
                .as_str(),
        )
    }
}

/// Tracker credential layout.
///
/// Lives at the top of the facet root as `auth.toml`. Both keys are
/// optional, missing ones get prompted for.
#[derive(Default, PartialEq, Eq, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl FromStr for AuthConfig {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        toml::de::from_str(data).map_err(ConfigError::Deserialize)
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.debug_struct("AuthConfig")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Configuration error types.
#[derive(Clone, Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to serialize configuration.
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    /// Facet name cannot be used as a directory entry.
    #[error("invalid facet name {0:?}")]
    InvalidName(String),
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}

/// Friendly result alias :3
type Result<T, E = ConfigError> = std::result::Result<T, E>;
