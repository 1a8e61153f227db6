// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Process-wide state.
//!
//! Facet keeps a small JSON document at `<root>/state.json` for state that
//! belongs to no facet in particular. The only key facet itself uses is
//! `facet`, which points at the __active facet__. Other keys are preserved
//! as-is, since every write merges into whatever is already there.

use crate::{
    config::FacetName,
    facet::Facet,
    store::{atomic_write, FacetStore, StoreError},
};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use tracing::{info, instrument};

/// Layout of process-wide state document.
#[derive(Default, Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct State {
    /// Name of active facet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facet: Option<FacetName>,

    /// Keys facet does not know about.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Process-wide state file.
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    /// Construct new state file handle.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of state file.
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// Read state document.
    ///
    /// An absent state file reads as empty state.
    ///
    /// # Errors
    ///
    /// - Return [`StateError::Read`] if state file cannot be read.
    /// - Return [`StateError::Malformed`] if state file cannot be parsed.
    pub fn read(&self) -> Result<State> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(State::default()),
            Err(err) => {
                return Err(StateError::Read {
                    source: err,
                    path: self.path.clone(),
                })
            }
        };

        serde_json::from_str(&data).map_err(|err| StateError::Malformed {
            source: err,
            path: self.path.clone(),
        })
    }

    /// Edit state document through read-merge-write.
    ///
    /// # Errors
    ///
    /// - Return [`StateError`] if state cannot be read or written.
    pub fn update(&self, editor: impl FnOnce(&mut State)) -> Result<State> {
        let mut state = self.read()?;
        editor(&mut state);

        let mut data = serde_json::to_string_pretty(&state).map_err(|err| StateError::Malformed {
            source: err,
            path: self.path.clone(),
        })?;
        data.push('\n');

        atomic_write(&self.path, data.as_bytes()).map_err(|err| StateError::Write {
            source: err,
            path: self.path.clone(),
        })?;

        Ok(state)
    }
}

/// Pointer to active facet.
///
/// Absence of an active facet is a normal condition. It only becomes an
/// error once something needs to dereference the pointer.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct ActiveFacet(Option<FacetName>);

impl ActiveFacet {
    /// Construct new active facet pointer.
    pub fn new(name: Option<FacetName>) -> Self {
        Self(name)
    }

    /// Load active facet pointer from state file.
    ///
    /// # Errors
    ///
    /// - Return [`StateError`] if state file cannot be read.
    pub fn load(state: &StateFile) -> Result<Self> {
        Ok(Self(state.read()?.facet))
    }

    /// Name of active facet, if any.
    pub fn name(&self) -> Option<&FacetName> {
        self.0.as_ref()
    }

    /// Name of active facet.
    ///
    /// # Errors
    ///
    /// - Return [`StateError::NoActiveFacet`] if no facet is active.
    pub fn get(&self) -> Result<&FacetName> {
        self.0.as_ref().ok_or(StateError::NoActiveFacet)
    }

    /// Check if target facet is the active one.
    pub fn is(&self, name: &FacetName) -> bool {
        self.0.as_ref() == Some(name)
    }

    /// Pick explicit facet name, or fall back to active facet.
    ///
    /// # Errors
    ///
    /// - Return [`StateError::NoActiveFacet`] if neither is available.
    pub fn resolve(&self, name: Option<FacetName>) -> Result<FacetName> {
        match name {
            Some(name) => Ok(name),
            None => self.get().cloned(),
        }
    }

    /// Switch active facet.
    ///
    /// Validates that the facet exists, records it as active in the state
    /// file, and marks it as most recently modified in the store.
    ///
    /// # Errors
    ///
    /// - Return [`StateError::Store`] if facet cannot be opened or touched.
    /// - Return [`StateError`] if state file cannot be updated.
    #[instrument(skip(self, store, state), level = "debug")]
    pub fn workon(
        &mut self,
        store: &FacetStore,
        state: &StateFile,
        name: &FacetName,
    ) -> Result<Facet> {
        let facet = store.open_facet(name)?;
        store.touch(name)?;
        state.update(|state| state.facet = Some(name.clone()))?;
        info!("working on facet {name}");
        self.0 = Some(name.clone());

        Ok(facet)
    }

    /// Clear active facet if it points at target facet.
    ///
    /// # Errors
    ///
    /// - Return [`StateError`] if state file cannot be updated.
    pub fn release(&mut self, state: &StateFile, name: &FacetName) -> Result<()> {
        if !self.is(name) {
            return Ok(());
        }

        state.update(|state| state.facet = None)?;
        self.0 = None;

        Ok(())
    }
}

/// State error types.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// State file cannot be read.
    #[error("failed to read state at {:?}", path.display())]
    Read {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    /// State file cannot be written.
    #[error("failed to write state at {:?}", path.display())]
    Write {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    /// State file is not valid.
    #[error("malformed state at {:?}", path.display())]
    Malformed {
        #[source]
        source: serde_json::Error,
        path: PathBuf,
    },

    /// No facet is active.
    #[error("no active facet, run `facet workon <name>` first")]
    NoActiveFacet,

    /// Facet store interaction failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Friendly result alias :3
pub type Result<T, E = StateError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CreateOptions;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_state_is_empty() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        let state = StateFile::new(crate::path::state_file(root.path()));

        assert_eq!(state.read()?, State::default());
        let active = ActiveFacet::load(&state)?;
        assert_eq!(active.name(), None);
        assert!(matches!(active.get(), Err(StateError::NoActiveFacet)));

        Ok(())
    }

    #[test]
    fn update_preserves_unknown_keys() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        let path = crate::path::state_file(root.path());
        fs::write(&path, r#"{"facet": "old", "theme": "dark"}"#)?;
        let state = StateFile::new(&path);

        state.update(|state| state.facet = Some("new".parse().unwrap()))?;

        let result = fs::read_to_string(&path)?;
        let expect = indoc! {r#"
            {
              "facet": "new",
              "theme": "dark"
            }
        "#};
        assert_eq!(result, expect);

        Ok(())
    }

    #[test]
    fn workon_switches_active_facet() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        let store = FacetStore::open(root.path())?;
        let state = StateFile::new(crate::path::state_file(root.path()));
        let mut active = ActiveFacet::load(&state)?;

        let first = "first".parse::<FacetName>()?;
        let second = "second".parse::<FacetName>()?;
        store.create(&first, CreateOptions::default())?;
        store.create(&second, CreateOptions::default())?;

        active.workon(&store, &state, &first)?;
        assert_eq!(ActiveFacet::load(&state)?.get()?, &first);
        assert_eq!(store.names()?.next(), Some(first.clone()));

        active.workon(&store, &state, &second)?;
        assert!(active.is(&second));
        assert_eq!(ActiveFacet::load(&state)?.get()?, &second);
        assert_eq!(store.names()?.next(), Some(second.clone()));

        Ok(())
    }

    #[test]
    fn workon_missing_facet_keeps_pointer() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        let store = FacetStore::open(root.path())?;
        let state = StateFile::new(crate::path::state_file(root.path()));
        let mut active = ActiveFacet::load(&state)?;

        let result = active.workon(&store, &state, &"ghost".parse::<FacetName>()?);
        assert!(matches!(
            result,
            Err(StateError::Store(StoreError::NotFound { .. }))
        ));
        assert_eq!(active, ActiveFacet::default());
        assert!(!state.path().exists());

        Ok(())
    }

    #[test]
    fn resolve_prefers_explicit_name() -> anyhow::Result<()> {
        let active = ActiveFacet::new(Some("current".parse::<FacetName>()?));
        assert_eq!(active.resolve(Some("other".parse::<FacetName>()?))?.as_str(), "other");
        assert_eq!(active.resolve(None)?.as_str(), "current");
        assert!(ActiveFacet::default().resolve(None).is_err());

        Ok(())
    }

    #[test]
    fn release_clears_matching_pointer() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        let state = StateFile::new(crate::path::state_file(root.path()));
        let name: FacetName = "gone".parse()?;
        state.update(|state| state.facet = Some(name.clone()))?;
        let mut active = ActiveFacet::load(&state)?;

        active.release(&state, &"other".parse::<FacetName>()?)?;
        assert!(active.is(&name));

        active.release(&state, &name)?;
        assert_eq!(ActiveFacet::load(&state)?, ActiveFacet::default());

        Ok(())
    }
}
