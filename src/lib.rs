// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Facet, a workspace switcher for units of work.
//!
//! A __facet__ is a named unit of work, usually backed by an issue in an
//! external tracker like Jira. Every facet lives in its own directory of the
//! __facet store__, next to a cached snapshot of its tracker issue and any
//! notes the user keeps around. One facet at a time can be the __active
//! facet__, which most commands fall back to when no facet is named.
//!
//! # Store Layout
//!
//! ```text
//! <root>/
//! ├── settings.toml
//! ├── auth.toml
//! ├── state.json
//! └── facets/
//!     └── PROJ-1/
//!         ├── facet.toml
//!         ├── jira.json
//!         └── notes.txt
//! ```
//!
//! The root defaults to the user's data directory, but can be overridden
//! through the `FACET_DIRECTORY` environment variable.

pub mod config;
pub mod facet;
pub mod fetch;
pub mod path;
pub mod state;
pub mod store;
pub mod tracker;

pub use config::{FacetConfig, FacetName, Settings};
pub use facet::{Facet, FacetError};
pub use state::{ActiveFacet, StateFile};
pub use store::{CreateOptions, FacetStore};
pub use tracker::{IssueTracker, JiraTracker};
