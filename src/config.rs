//! Per-application configuration
//!
//! Settings are read from `<app>/beamgraph.yaml` when present and fall back to
//! defaults otherwise. Every field is optional:
//!
//! ```yaml
//! ignored_deps: [kernel, stdlib]
//! module_mappings:
//!   ssl_cipher: ssl
//! erlc_opts: [+debug_info, +warn_export_vars]
//! test_erlc_opts: [+debug_info, -DTEST=1]
//! extra_apps: [crypto]
//! missing_index: self_only   # or: empty
//! module_index: ../moduleindex.yaml
//! ```
//!
//! # Environment Variables
//!
//! - `BEAMGRAPH_MODULE_INDEX`: module index path, overrides `module_index`
//! - `BEAMGRAPH_LOG_LEVEL`: logging level - default: "info"
//! - `BEAMGRAPH_LOG_JSON`: JSON log output (true|false) - default: "false"

use crate::app::Application;
use crate::fs::FileSystem;
use crate::index::{MissingIndexPolicy, DEFAULT_INDEX_FILE};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, Level};

pub const CONFIG_FILE: &str = "beamgraph.yaml";
pub const MODULE_INDEX_ENV: &str = "BEAMGRAPH_MODULE_INDEX";

const DEFAULT_ERLC_OPTS: &[&str] = &["+debug_info"];
const DEFAULT_TEST_ERLC_OPTS: &[&str] = &["+debug_info", "-DTEST=1"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path:?}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("Invalid config {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid log level: {0}. Valid options: trace, debug, info, warn, error")]
    InvalidLogLevel(String),
}

/// The settings the resolvers consult
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Applications never recorded as dependencies
    pub ignored_deps: BTreeSet<String>,

    /// Module -> owning application, consulted before the module index
    pub module_mappings: BTreeMap<String, String>,

    pub missing_index: MissingIndexPolicy,
}

impl ResolverConfig {
    pub fn is_ignored(&self, app: &str) -> bool {
        self.ignored_deps.contains(app)
    }

    pub fn mapping(&self, module: &str) -> Option<&str> {
        self.module_mappings.get(module).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageConfig {
    pub name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,

    #[serde(flatten)]
    pub resolver: ResolverConfig,

    pub erlc_opts: Vec<String>,
    pub test_erlc_opts: Vec<String>,
    pub extra_apps: Vec<String>,

    /// Module index location, relative to the application directory
    pub module_index: Option<PathBuf>,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            name: None,
            version: None,
            description: None,
            resolver: ResolverConfig::default(),
            erlc_opts: DEFAULT_ERLC_OPTS.iter().map(|s| s.to_string()).collect(),
            test_erlc_opts: DEFAULT_TEST_ERLC_OPTS.iter().map(|s| s.to_string()).collect(),
            extra_apps: Vec::new(),
            module_index: None,
        }
    }
}

impl PackageConfig {
    pub fn from_yaml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Option<Self> =
            serde_yaml::from_str(content).map_err(|source| ConfigError::Invalid {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(config.unwrap_or_default())
    }

    pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Self, ConfigError> {
        let content = fs.read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: format!("{:#}", e),
        })?;
        Self::from_yaml(&content, path)
    }

    /// Loads `<app_dir>/beamgraph.yaml`, or defaults when the file is absent
    pub fn load_or_default(fs: &dyn FileSystem, app_dir: &Path) -> Result<Self, ConfigError> {
        let path = app_dir.join(CONFIG_FILE);
        if !fs.is_file(&path) {
            debug!(path = %path.display(), "No package config, using defaults");
            return Ok(Self::default());
        }
        let config = Self::load(fs, &path)?;
        debug!(path = %path.display(), "Loaded package config");
        Ok(config)
    }

    /// Copies options and metadata overrides onto the application. The name
    /// is chosen before scanning and is left alone here.
    pub fn apply_to(&self, app: &mut Application) {
        if self.version.is_some() {
            app.version = self.version.clone();
        }
        if self.description.is_some() {
            app.description = self.description.clone();
        }
        app.erlc_opts.extend(self.erlc_opts.iter().cloned());
        app.test_erlc_opts.extend(self.test_erlc_opts.iter().cloned());
        app.extra_apps.extend(self.extra_apps.iter().cloned());
    }

    /// Where to read the module index from. Precedence: `explicit`, then
    /// `BEAMGRAPH_MODULE_INDEX`, then `module_index`, then the nearest
    /// `moduleindex.yaml` in `app_dir` or one of its ancestors.
    pub fn index_path(
        &self,
        fs: &dyn FileSystem,
        app_dir: &Path,
        explicit: Option<&Path>,
    ) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        if let Ok(path) = env::var(MODULE_INDEX_ENV) {
            if !path.is_empty() {
                return PathBuf::from(path);
            }
        }
        if let Some(path) = &self.module_index {
            return app_dir.join(path);
        }
        app_dir
            .ancestors()
            .map(|dir| dir.join(DEFAULT_INDEX_FILE))
            .find(|candidate| fs.is_file(candidate))
            .unwrap_or_else(|| app_dir.join(DEFAULT_INDEX_FILE))
    }
}

/// Parses a log level name, case-insensitively
pub fn validate_log_level(level: &str) -> Result<Level, ConfigError> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(ConfigError::InvalidLogLevel(level.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;
    use serial_test::serial;

    struct EnvGuard {
        key: String,
        old_value: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &str, value: &str) -> Self {
            let old_value = env::var(key).ok();
            env::set_var(key, value);
            Self {
                key: key.to_string(),
                old_value,
            }
        }

        fn unset(key: &str) -> Self {
            let old_value = env::var(key).ok();
            env::remove_var(key);
            Self {
                key: key.to_string(),
                old_value,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.old_value {
                Some(v) => env::set_var(&self.key, v),
                None => env::remove_var(&self.key),
            }
        }
    }

    #[test]
    fn test_defaults() {
        let config = PackageConfig::default();
        assert_eq!(config.erlc_opts, vec!["+debug_info"]);
        assert_eq!(config.test_erlc_opts, vec!["+debug_info", "-DTEST=1"]);
        assert!(config.resolver.ignored_deps.is_empty());
        assert_eq!(config.resolver.missing_index, MissingIndexPolicy::SelfOnly);
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
name: shop
ignored_deps: [kernel, stdlib]
module_mappings:
  ssl_cipher: ssl
erlc_opts: [+debug_info, +warn_export_vars]
extra_apps: [crypto]
missing_index: empty
"#;
        let config = PackageConfig::from_yaml(yaml, Path::new(CONFIG_FILE)).unwrap();
        assert_eq!(config.name.as_deref(), Some("shop"));
        assert!(config.resolver.is_ignored("kernel"));
        assert!(!config.resolver.is_ignored("cowboy"));
        assert_eq!(config.resolver.mapping("ssl_cipher"), Some("ssl"));
        assert_eq!(config.resolver.missing_index, MissingIndexPolicy::Empty);
        assert_eq!(config.erlc_opts, vec!["+debug_info", "+warn_export_vars"]);
        // Unset keys keep their defaults
        assert_eq!(config.test_erlc_opts, vec!["+debug_info", "-DTEST=1"]);
        assert_eq!(config.extra_apps, vec!["crypto"]);
    }

    #[test]
    fn test_invalid_config() {
        let err = PackageConfig::from_yaml("missing_index: sometimes", Path::new(CONFIG_FILE))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_load_or_default_without_file() {
        let fs = MockFileSystem::new();
        let config = PackageConfig::load_or_default(&fs, Path::new("shop")).unwrap();
        assert_eq!(config, PackageConfig::default());
    }

    #[test]
    fn test_apply_to_application() {
        let config = PackageConfig {
            name: Some("store".to_string()),
            version: Some("2.0.0".to_string()),
            extra_apps: vec!["crypto".to_string()],
            ..Default::default()
        };
        let mut app = Application::new("shop");
        app.version = Some("1.0.0".to_string());
        config.apply_to(&mut app);

        assert_eq!(app.name, "shop");
        assert_eq!(app.version.as_deref(), Some("2.0.0"));
        assert!(app.erlc_opts.contains("+debug_info"));
        assert!(app.test_erlc_opts.contains("-DTEST=1"));
        assert!(app.extra_apps.contains("crypto"));
    }

    #[test]
    #[serial]
    fn test_index_path_precedence() {
        let _guard = EnvGuard::unset(MODULE_INDEX_ENV);
        let fs = MockFileSystem::new();
        fs.add_file("repo/moduleindex.yaml", "");
        let app_dir = fs.root().join("repo/apps/shop");
        let config = PackageConfig::default();

        assert_eq!(
            config.index_path(&fs, &app_dir, None),
            fs.root().join("repo/moduleindex.yaml")
        );
        assert_eq!(
            config.index_path(&fs, &app_dir, Some(Path::new("/tmp/idx.yaml"))),
            PathBuf::from("/tmp/idx.yaml")
        );

        let _env = EnvGuard::set(MODULE_INDEX_ENV, "/etc/idx.yaml");
        assert_eq!(
            config.index_path(&fs, &app_dir, None),
            PathBuf::from("/etc/idx.yaml")
        );
    }

    #[test]
    fn test_validate_log_level() {
        assert_eq!(validate_log_level("DEBUG").unwrap(), Level::DEBUG);
        assert!(matches!(
            validate_log_level("loud"),
            Err(ConfigError::InvalidLogLevel(_))
        ));
    }
}
