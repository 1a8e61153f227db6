// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Facet store management and manipulation.
//!
//! Facet groups all facets together into one place called the __facet
//! store__, which lives at `<root>/facets`. Each facet is given its own
//! unique name, and the name of a facet in the store is the name of the
//! directory that contains it. So, `<root>/facets/PROJ-1` means that the
//! facet store contains a facet named "PROJ-1".
//!
//! Facet only evaluates the top-level of the facet store. Entries starting
//! with "." are reserved for metadata, and are never treated as facets.
//!
//! # Atomic Writes
//!
//! Every file facet writes goes through a temporary file in the same
//! directory that is then renamed over the target. Readers thus observe
//! either the old document or the new one, never a partial write. Writes
//! leave the modification time of the containing directory alone, so the
//! recency order of facets only changes when a facet gets touched.

use crate::{
    config::{ConfigError, FacetConfig, FacetName, Settings},
    facet::Facet,
    tracker::IssueTracker,
};

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    time::SystemTime,
};
use tracing::{debug, info, instrument, warn};

/// Name of facet configuration file inside of a facet directory.
pub const CONFIG_FILE_NAME: &str = "facet.toml";

/// Facet store.
#[derive(Debug, Clone)]
pub struct FacetStore {
    root: PathBuf,
    settings: Settings,
}

impl FacetStore {
    /// Open facet store at target facet root.
    ///
    /// Creates the store directory if it does not exist yet, and loads user
    /// settings from `<root>/settings.toml` when present.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::CreateStore`] if store directory cannot be
    ///   created.
    /// - Return [`StoreError::ReadSettings`] or [`StoreError::Settings`] if
    ///   settings file exists but cannot be loaded.
    #[instrument(skip(root), level = "debug")]
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let store_dir = crate::path::facets_dir(&root);
        debug!("open facet store: {:?}", store_dir.display());
        fs::create_dir_all(&store_dir).map_err(|err| StoreError::CreateStore {
            source: err,
            path: store_dir.clone(),
        })?;

        let settings = load_settings(crate::path::settings_file(&root))?;

        Ok(Self { root, settings })
    }

    /// Facet root this store lives under.
    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    /// User settings loaded with the store.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Directory of facet entry, existing or not.
    pub fn facet_dir(&self, name: &FacetName) -> PathBuf {
        crate::path::facets_dir(&self.root).join(name.as_str())
    }

    /// Check if facet exists in store.
    pub fn exists(&self, name: &FacetName) -> bool {
        self.facet_dir(name).is_dir()
    }

    /// List facet names, most recently modified first.
    ///
    /// Entries beginning with "." are skipped. Entries whose names cannot be
    /// facet names are skipped with a warning. Ties in modification time are
    /// broken by name.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::ListStore`] if store directory cannot be read.
    pub fn names(&self) -> Result<impl Iterator<Item = FacetName>> {
        let store_dir = crate::path::facets_dir(&self.root);
        let list_err = |err| StoreError::ListStore {
            source: err,
            path: store_dir.clone(),
        };

        let mut entries = Vec::new();
        for entry in fs::read_dir(&store_dir).map_err(list_err)? {
            let entry = entry.map_err(list_err)?;
            let file_name = entry.file_name().to_string_lossy().into_owned();

            // INVARIANT: Reserved prefix is never a facet.
            if file_name.starts_with('.') {
                continue;
            }

            let name = match file_name.parse::<FacetName>() {
                Ok(name) => name,
                Err(error) => {
                    warn!("skipping store entry {file_name:?}: {error}");
                    continue;
                }
            };

            let modified = entry
                .metadata()
                .and_then(|meta| meta.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            entries.push((modified, name));
        }

        entries.sort_by(|(lhs_time, lhs_name), (rhs_time, rhs_name)| {
            rhs_time.cmp(lhs_time).then_with(|| lhs_name.cmp(rhs_name))
        });

        Ok(entries.into_iter().map(|(_, name)| name))
    }

    /// Read facet configuration.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::NotFound`] if facet has no configuration file.
    /// - Return [`StoreError::ConfigCorrupt`] if configuration cannot be
    ///   parsed.
    /// - Return [`StoreError::NameMismatch`] if stored name disagrees with
    ///   facet directory.
    pub fn read_config(&self, name: &FacetName) -> Result<FacetConfig> {
        read_config_at(&self.facet_dir(name), name)
    }

    /// Overwrite facet configuration entirely.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::NotFound`] if facet does not exist.
    /// - Return [`StoreError::WriteConfig`] if write fails.
    pub fn write_config(&self, name: &FacetName, config: &FacetConfig) -> Result<()> {
        let dir = self.facet_dir(name);
        if !dir.is_dir() {
            return Err(StoreError::NotFound {
                facet: name.clone(),
                path: dir,
            });
        }

        write_config_at(&dir, config)
    }

    /// Open existing facet.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::NotFound`] if facet does not exist.
    /// - Return [`StoreError::ConfigCorrupt`] if configuration cannot be
    ///   parsed.
    pub fn open_facet(&self, name: &FacetName) -> Result<Facet> {
        let config = self.read_config(name)?;
        Ok(Facet::new(name.clone(), self.facet_dir(name), config))
    }

    /// Create new facet.
    ///
    /// Allocates the facet directory, and writes its initial configuration.
    /// The repository path defaults to the `default_repo` setting.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::AlreadyExists`] if facet already exists.
    /// - Return [`StoreError::CreateFacet`] if directory cannot be created.
    /// - Return [`StoreError::WriteConfig`] if configuration cannot be
    ///   written.
    #[instrument(skip(self, options), level = "debug")]
    pub fn create(&self, name: &FacetName, options: CreateOptions) -> Result<Facet> {
        let dir = self.facet_dir(name);
        info!("create new facet: {name}");

        fs::create_dir(&dir).map_err(|err| match err.kind() {
            io::ErrorKind::AlreadyExists => StoreError::AlreadyExists {
                facet: name.clone(),
            },
            _ => StoreError::CreateFacet {
                source: err,
                path: dir.clone(),
            },
        })?;

        let mut config = FacetConfig::initial(name);
        config.jira = options.jira;
        config.repo = options.repo.or_else(|| self.settings.default_repo.clone());
        if let Some(branch) = options.branch {
            config.branch = Some(branch);
        }

        write_config_at(&dir, &config)?;

        Ok(Facet::new(name.clone(), dir, config))
    }

    /// Remove facet along with everything in its directory.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::NotFound`] if facet does not exist.
    /// - Return [`StoreError::RemoveFacet`] if directory cannot be removed.
    #[instrument(skip(self), level = "debug")]
    pub fn remove(&self, name: &FacetName) -> Result<()> {
        let dir = self.facet_dir(name);
        if !dir.is_dir() {
            return Err(StoreError::NotFound {
                facet: name.clone(),
                path: dir,
            });
        }

        info!("remove facet: {name}");
        fs::remove_dir_all(&dir).map_err(|err| StoreError::RemoveFacet {
            source: err,
            path: dir,
        })
    }

    /// Mark facet as most recently modified.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::NotFound`] if facet does not exist.
    /// - Return [`StoreError::Touch`] if modification time cannot be set.
    pub fn touch(&self, name: &FacetName) -> Result<()> {
        self.touch_at(name, SystemTime::now())
    }

    pub(crate) fn touch_at(&self, name: &FacetName, time: SystemTime) -> Result<()> {
        let dir = self.facet_dir(name);
        if !dir.is_dir() {
            return Err(StoreError::NotFound {
                facet: name.clone(),
                path: dir,
            });
        }

        fs::File::open(&dir)
            .and_then(|handle| handle.set_modified(time))
            .map_err(|err| StoreError::Touch {
                source: err,
                path: dir,
            })
    }

    /// List facets, most recently modified first.
    ///
    /// Without `include_inactive`, only active facets are listed, i.e.,
    /// facets that are followed and not done. Any facet that cannot be
    /// opened, or whose status cannot be resolved, is skipped with a warning
    /// so that one broken facet never hides the rest.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::ListStore`] if store directory cannot be read.
    pub async fn list<T>(&self, include_inactive: bool, tracker: &T) -> Result<Vec<Facet>>
    where
        T: IssueTracker,
    {
        let all = self.open_all()?;
        if include_inactive {
            return Ok(all);
        }

        let mut facets = Vec::new();
        for facet in all {
            match facet.is_active(tracker).await {
                Ok(true) => facets.push(facet),
                Ok(false) => continue,
                Err(error) => warn!("skipping facet {}: {error}", facet.name()),
            }
        }

        Ok(facets)
    }

    /// Open every facet, most recently modified first.
    ///
    /// Facets that cannot be opened are skipped with a warning.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::ListStore`] if store directory cannot be read.
    pub fn open_all(&self) -> Result<Vec<Facet>> {
        let facets = self
            .names()?
            .filter_map(|name| match self.open_facet(&name) {
                Ok(facet) => Some(facet),
                Err(error) => {
                    warn!("skipping facet {name}: {error}");
                    None
                }
            })
            .collect();

        Ok(facets)
    }

    /// Open every followed facet, most recently modified first.
    ///
    /// Unlike [`FacetStore::list`], workflow status is never resolved, so
    /// facets with a stale or broken issue snapshot are kept.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::ListStore`] if store directory cannot be read.
    pub fn followed(&self) -> Result<Vec<Facet>> {
        let mut facets = self.open_all()?;
        facets.retain(|facet| facet.config().is_followed());

        Ok(facets)
    }

    /// Rewrite every facet configuration in canonical form.
    ///
    /// Legacy keys like `issue_key` are written back under their canonical
    /// name, and missing names are filled in. Each facet reports its own
    /// outcome.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::ListStore`] if store directory cannot be read.
    #[instrument(skip(self), level = "debug")]
    pub fn migrate(&self) -> Result<Vec<(FacetName, Result<()>)>> {
        let outcomes = self
            .names()?
            .map(|name| {
                let outcome = self
                    .read_config(&name)
                    .and_then(|config| self.write_config(&name, &config));
                (name, outcome)
            })
            .collect();

        Ok(outcomes)
    }
}

/// Options for facet creation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CreateOptions {
    /// Tracker issue key to link facet to.
    pub jira: Option<String>,

    /// Repository path, overriding the `default_repo` setting.
    pub repo: Option<String>,

    /// Branch name, overriding the facet name.
    pub branch: Option<String>,
}

/// Read facet configuration inside of facet directory.
pub(crate) fn read_config_at(dir: &Path, name: &FacetName) -> Result<FacetConfig> {
    let path = dir.join(CONFIG_FILE_NAME);
    let data = fs::read_to_string(&path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => StoreError::NotFound {
            facet: name.clone(),
            path: path.clone(),
        },
        _ => StoreError::ReadConfig {
            source: err,
            path: path.clone(),
        },
    })?;

    let mut config: FacetConfig = data.parse().map_err(|err| StoreError::ConfigCorrupt {
        source: err,
        path: path.clone(),
    })?;

    // INVARIANT: Name is implied by location.
    //   - Reconstruct it when absent.
    //   - Refuse a stored name that points elsewhere.
    match &config.name {
        None => config.name = Some(name.to_string()),
        Some(stored) if stored != name.as_str() => {
            return Err(StoreError::NameMismatch {
                facet: name.clone(),
                stored: stored.clone(),
                path,
            });
        }
        Some(_) => {}
    }

    Ok(config)
}

/// Overwrite facet configuration inside of facet directory.
pub(crate) fn write_config_at(dir: &Path, config: &FacetConfig) -> Result<()> {
    let path = dir.join(CONFIG_FILE_NAME);
    debug!("write facet config: {:?}", path.display());
    atomic_write(&path, config.to_string().as_bytes())
        .map_err(|err| StoreError::WriteConfig { source: err, path })
}

/// Load user settings, falling back to defaults when file is missing.
pub fn load_settings(path: impl AsRef<Path>) -> Result<Settings> {
    let path = path.as_ref();
    match fs::read_to_string(path) {
        Ok(data) => data.parse().map_err(|err| StoreError::Settings {
            source: err,
            path: path.to_path_buf(),
        }),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Settings::default()),
        Err(err) => Err(StoreError::ReadSettings {
            source: err,
            path: path.to_path_buf(),
        }),
    }
}

/// Replace file contents through temporary file plus rename.
///
/// The modification time of the parent directory is preserved, because the
/// facet store orders facets by it, and only [`FacetStore::touch`] may
/// change that order.
pub(crate) fn atomic_write(path: &Path, data: &[u8]) -> io::Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| io::Error::other(format!("{:?} has no parent", path.display())))?;
    let modified = fs::metadata(dir).and_then(|meta| meta.modified()).ok();

    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    temp.write_all(data)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|err| err.error)?;

    if let Some(modified) = modified {
        if let Err(error) = fs::File::open(dir).and_then(|handle| handle.set_modified(modified)) {
            warn!("cannot restore modification time of {:?}: {error}", dir.display());
        }
    }

    Ok(())
}

/// All possible error types for facet store interaction.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Store directory cannot be created.
    #[error("failed to create facet store at {:?}", path.display())]
    CreateStore {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    /// Store directory cannot be listed.
    #[error("failed to list facet store at {:?}", path.display())]
    ListStore {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    /// Facet, or its configuration file, does not exist.
    #[error("facet {facet} not found at {:?}", path.display())]
    NotFound { facet: FacetName, path: PathBuf },

    /// Facet name is already taken.
    #[error("facet {facet} already exists")]
    AlreadyExists { facet: FacetName },

    /// Facet directory cannot be created.
    #[error("failed to create facet at {:?}", path.display())]
    CreateFacet {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    /// Facet directory cannot be removed.
    #[error("failed to remove facet at {:?}", path.display())]
    RemoveFacet {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    /// Facet directory modification time cannot be set.
    #[error("failed to touch facet at {:?}", path.display())]
    Touch {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    /// Facet configuration cannot be read.
    #[error("failed to read facet config at {:?}", path.display())]
    ReadConfig {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    /// Facet configuration cannot be written.
    #[error("failed to write facet config at {:?}", path.display())]
    WriteConfig {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    /// Facet configuration cannot be parsed.
    #[error("corrupt facet config at {:?}", path.display())]
    ConfigCorrupt {
        #[source]
        source: ConfigError,
        path: PathBuf,
    },

    /// Facet configuration names a different facet.
    #[error("corrupt facet config at {:?}: names {stored:?} instead of {facet}", path.display())]
    NameMismatch {
        facet: FacetName,
        stored: String,
        path: PathBuf,
    },

    /// Settings file cannot be read.
    #[error("failed to read settings at {:?}", path.display())]
    ReadSettings {
        #[source]
        source: io::Error,
        path: PathBuf,
    },

    /// Settings file cannot be parsed.
    #[error("corrupt settings at {:?}", path.display())]
    Settings {
        #[source]
        source: ConfigError,
        path: PathBuf,
    },
}

impl StoreError {
    /// Check if error means facet does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if error means facet configuration is unusable.
    pub fn is_config_corrupt(&self) -> bool {
        matches!(self, Self::ConfigCorrupt { .. } | Self::NameMismatch { .. })
    }
}

/// Friendly result alias :3
pub type Result<T, E = StoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{facet::status::WorkflowStatus, tracker::tests::StubTracker};
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn name(name: &str) -> FacetName {
        name.parse().unwrap()
    }

    fn age(store: &FacetStore, facet: &str, secs_ago: u64) {
        let time = SystemTime::now() - Duration::from_secs(secs_ago);
        store.touch_at(&name(facet), time).unwrap();
    }

    #[test]
    fn create_then_exists() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        let store = FacetStore::open(root.path())?;

        for facet in ["PROJ-1", "scratch", "x"] {
            let facet = name(facet);
            assert!(!store.exists(&facet));
            let created = store.create(&facet, CreateOptions::default())?;
            assert!(store.exists(&facet));
            assert!(created.config().is_followed());
            assert!(store.read_config(&facet)?.is_followed());
        }

        Ok(())
    }

    #[test]
    fn create_writes_initial_config() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        fs::write(
            crate::path::settings_file(root.path()),
            r#"default_repo = "~/src/website""#,
        )?;
        let store = FacetStore::open(root.path())?;

        let options = CreateOptions {
            jira: Some("PROJ-1".into()),
            ..Default::default()
        };
        store.create(&name("PROJ-1"), options)?;

        let result = fs::read_to_string(store.facet_dir(&name("PROJ-1")).join(CONFIG_FILE_NAME))?;
        let expect = indoc! {r#"
            name = "PROJ-1"
            repo = "~/src/website"
            branch = "PROJ-1"
            jira = "PROJ-1"
            follow = true
        "#};
        assert_eq!(result, expect);

        Ok(())
    }

    #[test]
    fn create_twice_fails() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        let store = FacetStore::open(root.path())?;
        store.create(&name("dup"), CreateOptions::default())?;

        let result = store.create(&name("dup"), CreateOptions::default());
        assert!(matches!(result, Err(StoreError::AlreadyExists { .. })));

        Ok(())
    }

    #[test]
    fn write_then_read_config() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        let store = FacetStore::open(root.path())?;
        let facet = name("PROJ-7");
        store.create(&facet, CreateOptions::default())?;

        let config = FacetConfig {
            name: Some("PROJ-7".into()),
            repo: Some("~/src/project".into()),
            branch: Some("fix-bug".into()),
            jira: None,
            follow: Some(false),
            status: Some(WorkflowStatus::UnderReview),
        };
        store.write_config(&facet, &config)?;
        assert_eq!(store.read_config(&facet)?, config);

        Ok(())
    }

    #[test]
    fn read_config_missing() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        let store = FacetStore::open(root.path())?;

        let result = store.read_config(&name("ghost"));
        assert!(result.is_err_and(|error| error.is_not_found()));

        fs::create_dir(store.facet_dir(&name("empty")))?;
        let result = store.read_config(&name("empty"));
        assert!(result.is_err_and(|error| error.is_not_found()));

        Ok(())
    }

    #[test]
    fn read_config_reconstructs_name() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        let store = FacetStore::open(root.path())?;
        let facet = name("nameless");
        let dir = store.facet_dir(&facet);
        fs::create_dir(&dir)?;
        fs::write(dir.join(CONFIG_FILE_NAME), "follow = true\n")?;

        let result = store.read_config(&facet)?;
        assert_eq!(result.name.as_deref(), Some("nameless"));

        fs::write(dir.join(CONFIG_FILE_NAME), "name = \"other\"\n")?;
        let result = store.read_config(&facet);
        assert!(result.is_err_and(|error| error.is_config_corrupt()));

        Ok(())
    }

    #[test]
    fn names_most_recent_first() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        let store = FacetStore::open(root.path())?;
        for facet in ["alpha", "beta", "gamma"] {
            store.create(&name(facet), CreateOptions::default())?;
        }
        fs::create_dir(crate::path::facets_dir(root.path()).join(".trash"))?;

        age(&store, "alpha", 10);
        age(&store, "beta", 30);
        age(&store, "gamma", 20);
        let result = store.names()?.map(String::from).collect::<Vec<_>>();
        assert_eq!(result, vec!["alpha", "gamma", "beta"]);

        store.touch(&name("beta"))?;
        let result = store.names()?.map(String::from).collect::<Vec<_>>();
        assert_eq!(result, vec!["beta", "alpha", "gamma"]);

        Ok(())
    }

    #[test]
    fn writes_keep_recency_order() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        let store = FacetStore::open(root.path())?;
        for facet in ["alpha", "beta"] {
            store.create(&name(facet), CreateOptions::default())?;
        }

        age(&store, "alpha", 10);
        age(&store, "beta", 20);

        let mut beta = store.open_facet(&name("beta"))?;
        beta.unfollow()?;
        beta.set_status(WorkflowStatus::Doing)?;
        atomic_write(&beta.dir().join("notes.txt"), b"remember the milk\n")?;

        let result = store.names()?.map(String::from).collect::<Vec<_>>();
        assert_eq!(result, vec!["alpha", "beta"]);

        Ok(())
    }

    #[tokio::test]
    async fn list_filters_inactive_and_skips_broken() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        let store = FacetStore::open(root.path())?;
        let tracker = StubTracker::default();

        store.create(&name("todo"), CreateOptions::default())?;
        let mut done = store.create(&name("done"), CreateOptions::default())?;
        done.set_status(WorkflowStatus::Done)?;
        let mut unfollowed = store.create(&name("unfollowed"), CreateOptions::default())?;
        unfollowed.unfollow()?;
        store.create(&name("broken"), CreateOptions::default())?;
        fs::write(
            store.facet_dir(&name("broken")).join(CONFIG_FILE_NAME),
            "follow = maybe\n",
        )?;

        age(&store, "todo", 40);
        age(&store, "done", 30);
        age(&store, "unfollowed", 20);
        age(&store, "broken", 10);

        let result = store
            .list(false, &tracker)
            .await?
            .iter()
            .map(|facet| facet.name().to_string())
            .collect::<Vec<_>>();
        assert_eq!(result, vec!["todo"]);

        let result = store
            .list(true, &tracker)
            .await?
            .iter()
            .map(|facet| facet.name().to_string())
            .collect::<Vec<_>>();
        assert_eq!(result, vec!["unfollowed", "done", "todo"]);

        Ok(())
    }

    #[test]
    fn remove_destroys_everything() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        let store = FacetStore::open(root.path())?;
        let facet = name("gone");
        store.create(&facet, CreateOptions::default())?;
        fs::write(store.facet_dir(&facet).join("notes.txt"), "remember")?;

        store.remove(&facet)?;
        assert!(!store.exists(&facet));
        assert!(store.remove(&facet).is_err_and(|error| error.is_not_found()));

        Ok(())
    }

    #[test]
    fn migrate_canonicalizes_configs() -> anyhow::Result<()> {
        let root = tempfile::tempdir()?;
        let store = FacetStore::open(root.path())?;
        let facet = name("legacy");
        let dir = store.facet_dir(&facet);
        fs::create_dir(&dir)?;
        fs::write(dir.join(CONFIG_FILE_NAME), "issue_key = \"LEG-1\"\nfollow = true\n")?;

        let outcomes = store.migrate()?;
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].1.is_ok());

        let result = fs::read_to_string(dir.join(CONFIG_FILE_NAME))?;
        let expect = indoc! {r#"
            name = "legacy"
            jira = "LEG-1"
            follow = true
        "#};
        assert_eq!(result, expect);

        Ok(())
    }
}
