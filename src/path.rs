// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Determine where the facet root lives, and where each piece of persisted
//! state sits inside of it.
//!
//! # Facet Root Layout
//!
//! ```text
//! <root>/
//!     settings.toml
//!     auth.toml
//!     state.json
//!     facets/
//!         PROJ-1/
//!             facet.toml
//!             jira.json
//!             notes.txt
//!             PR.md
//! ```

use std::path::{Path, PathBuf};

/// Environment variable that overrides the default facet root.
pub const FACET_DIRECTORY_VAR: &str = "FACET_DIRECTORY";

/// Determine absolute path to the facet root directory.
///
/// Uses `$FACET_DIRECTORY` if it is set, performing shell expansion on it.
/// Otherwise falls back to XDG Base Directory path `$XDG_DATA_HOME/facet`.
/// Does not check if the path returned actually exists.
///
/// # Errors
///
/// - Return [`PathError::NoWayHome`] if data directory cannot be determined.
/// - Return [`PathError::ShellExpansion`] if `$FACET_DIRECTORY` references
///   an undefined variable.
///
/// # See Also
///
/// - [XDG Base Directory](https://wiki.archlinux.org/title/XDG_Base_Directory)
pub fn default_facet_root() -> Result<PathBuf> {
    if let Ok(root) = std::env::var(FACET_DIRECTORY_VAR) {
        return expand_path(root);
    }

    dirs::data_dir()
        .map(|path| path.join("facet"))
        .ok_or(PathError::NoWayHome)
}

/// Perform shell expansion on a path, e.g., `~/src/$PROJECT`.
///
/// # Errors
///
/// - Return [`PathError::ShellExpansion`] if a variable is undefined.
pub fn expand_path(path: impl AsRef<str>) -> Result<PathBuf> {
    Ok(PathBuf::from(shellexpand::full(path.as_ref())?.into_owned()))
}

/// Directory housing every facet entry.
pub fn facets_dir(root: &Path) -> PathBuf {
    root.join("facets")
}

/// Process-wide state file holding the active facet pointer.
pub fn state_file(root: &Path) -> PathBuf {
    root.join("state.json")
}

/// User settings file.
pub fn settings_file(root: &Path) -> PathBuf {
    root.join("settings.toml")
}

/// Tracker credential file.
pub fn auth_file(root: &Path) -> PathBuf {
    root.join("auth.toml")
}

/// Path resolution error types.
#[derive(Clone, Debug, thiserror::Error)]
pub enum PathError {
    /// No way to determine user's home or data directory.
    ///
    /// # See Also
    ///
    /// - [`dirs::home_dir`](https://docs.rs/dirs/latest/dirs/fn.home_dir.html)
    #[error("cannot determine absolute path to user's home directory")]
    NoWayHome,

    /// Path references an undefined variable.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),
}

/// Friendly result alias :3
pub type Result<T, E = PathError> = std::result::Result<T, E>;
