//! Module ownership index
//!
//! Maps module names to the application that defines them. The index is
//! stored as YAML, one list of modules per application:
//!
//! ```yaml
//! cowboy:
//!   - cowboy
//!   - cowboy_req
//! ranch:
//!   - ranch
//! ```

use crate::app::Application;
use crate::fs::FileSystem;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_INDEX_FILE: &str = "moduleindex.yaml";

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Failed to read module index {path:?}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("Invalid module index {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// What to assume when the index cannot be loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingIndexPolicy {
    /// The application owns exactly its own source modules
    #[default]
    SelfOnly,
    /// No module has a known owner
    Empty,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleIndex {
    apps: BTreeMap<String, Vec<String>>,
}

impl ModuleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_yaml(content: &str, path: &Path) -> Result<Self, IndexError> {
        let apps: Option<BTreeMap<String, Vec<String>>> =
            serde_yaml::from_str(content).map_err(|source| IndexError::Invalid {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self {
            apps: apps.unwrap_or_default(),
        })
    }

    pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Self, IndexError> {
        let content = fs.read_to_string(path).map_err(|e| IndexError::Read {
            path: path.to_path_buf(),
            reason: format!("{:#}", e),
        })?;
        let index = Self::from_yaml(&content, path)?;
        debug!(path = %path.display(), apps = index.apps.len(), "Loaded module index");
        Ok(index)
    }

    /// Index in which `app` owns exactly its production modules
    pub fn self_only(app: &Application) -> Self {
        let mut index = Self::new();
        index.insert(&app.name, app.modules());
        index
    }

    pub fn insert(&mut self, app: &str, modules: impl IntoIterator<Item = String>) {
        self.apps.entry(app.to_string()).or_default().extend(modules);
    }

    /// Owning application of `module`. If several applications list the
    /// module, the first in name order wins.
    pub fn find(&self, module: &str) -> Option<&str> {
        self.apps
            .iter()
            .find(|(_, modules)| modules.iter().any(|m| m == module))
            .map(|(app, _)| app.as_str())
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }
}

/// Loads the index, degrading to `policy` when it is absent or unreadable
pub fn load_or_fallback(
    fs: &dyn FileSystem,
    path: &Path,
    app: &Application,
    policy: MissingIndexPolicy,
) -> ModuleIndex {
    match ModuleIndex::load(fs, path) {
        Ok(index) => index,
        Err(err) => {
            warn!(error = %err, fallback = ?policy, "Module index unavailable");
            match policy {
                MissingIndexPolicy::SelfOnly => ModuleIndex::self_only(app),
                MissingIndexPolicy::Empty => ModuleIndex::new(),
            }
        }
    }
}
