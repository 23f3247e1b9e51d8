//! The application under resolution
//!
//! An [`Application`] holds the classified file sets of one Erlang/OTP
//! application together with its compiler options and the cross-application
//! dependencies accumulated while its sources are resolved.

pub mod metadata;
pub mod naming;
pub mod role;

pub use metadata::AppMetadata;
pub use role::FileRole;

use crate::fs::FileSystem;
use crate::util::OrderedSet;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

#[derive(Debug, Clone, Default)]
pub struct Application {
    pub name: String,
    pub version: Option<String>,
    pub description: Option<String>,
    pub srcs: OrderedSet<String>,
    pub private_hdrs: OrderedSet<String>,
    pub public_hdrs: OrderedSet<String>,
    pub app_descriptors: OrderedSet<String>,
    pub app_srcs: OrderedSet<String>,
    pub test_srcs: OrderedSet<String>,
    pub test_hdrs: OrderedSet<String>,
    pub priv_files: OrderedSet<String>,
    pub license_files: OrderedSet<String>,
    pub erlc_opts: OrderedSet<String>,
    pub test_erlc_opts: OrderedSet<String>,
    /// Cross-application dependencies accumulated during resolution
    pub deps: OrderedSet<String>,
    /// Runtime-only applications declared by configuration
    pub extra_apps: OrderedSet<String>,
}

impl Application {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builds an application from a directory listing, classifying every
    /// file and reading `src/*.app.src` metadata when present
    pub fn scan(fs: &dyn FileSystem, root: &Path, name: impl Into<String>) -> Result<Self> {
        let mut app = Self::new(name);
        let files = fs
            .list_files(root)
            .with_context(|| format!("Failed to list application files under {:?}", root))?;

        for file in &files {
            app.add_file(&to_package_path(file));
        }

        debug!(
            app = %app.name,
            srcs = app.srcs.len(),
            test_srcs = app.test_srcs.len(),
            hdrs = app.private_hdrs.len() + app.public_hdrs.len(),
            "Classified application files"
        );

        if let Some(app_src) = app.app_srcs.values().into_iter().next() {
            let content = fs
                .read_to_string(&root.join(&app_src))
                .with_context(|| format!("Failed to read {}", app_src))?;
            let meta = AppMetadata::parse(&content);
            app.version = meta.version;
            app.description = meta.description;
        }

        Ok(app)
    }

    /// Classifies and records one package-relative path. Returns the role it
    /// was filed under, if any.
    pub fn add_file(&mut self, path: &str) -> Option<FileRole> {
        let role = FileRole::classify(path)?;
        trace!(path, role = %role, "classified");
        self.files_mut(role).add(path.to_string());
        Some(role)
    }

    pub fn files(&self, role: FileRole) -> &OrderedSet<String> {
        match role {
            FileRole::Source => &self.srcs,
            FileRole::PrivateHeader => &self.private_hdrs,
            FileRole::PublicHeader => &self.public_hdrs,
            FileRole::AppDescriptor => &self.app_descriptors,
            FileRole::AppSource => &self.app_srcs,
            FileRole::TestSource => &self.test_srcs,
            FileRole::TestHeader => &self.test_hdrs,
            FileRole::Resource => &self.priv_files,
            FileRole::License => &self.license_files,
        }
    }

    fn files_mut(&mut self, role: FileRole) -> &mut OrderedSet<String> {
        match role {
            FileRole::Source => &mut self.srcs,
            FileRole::PrivateHeader => &mut self.private_hdrs,
            FileRole::PublicHeader => &mut self.public_hdrs,
            FileRole::AppDescriptor => &mut self.app_descriptors,
            FileRole::AppSource => &mut self.app_srcs,
            FileRole::TestSource => &mut self.test_srcs,
            FileRole::TestHeader => &mut self.test_hdrs,
            FileRole::Resource => &mut self.priv_files,
            FileRole::License => &mut self.license_files,
        }
    }

    /// Role of a path already recorded in this application
    pub fn role_of(&self, path: &str) -> Option<FileRole> {
        FileRole::classify(path).filter(|role| self.files(*role).contains(path))
    }

    pub fn is_header(&self, path: &str) -> bool {
        self.private_hdrs.contains(path) || self.public_hdrs.contains(path)
    }

    /// Sorted module names of the production sources
    pub fn modules(&self) -> Vec<String> {
        self.srcs
            .sorted()
            .into_iter()
            .map(|src| naming::module_name(src).to_string())
            .collect()
    }

    /// First production source (in sorted order) defining `module`
    pub fn source_for_module(&self, module: &str) -> Option<&String> {
        self.srcs
            .sorted()
            .into_iter()
            .find(|src| naming::module_name(src) == module)
    }

    /// First test-directory source (in sorted order) defining `module`
    pub fn test_source_for_module(&self, module: &str) -> Option<&String> {
        self.test_srcs
            .sorted()
            .into_iter()
            .find(|src| naming::module_name(src) == module)
    }
}

fn to_package_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Default application name for a directory: its final path component
pub fn default_name(root: &Path) -> Option<String> {
    let root: PathBuf = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
    root.file_name().map(|n| n.to_string_lossy().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;

    #[test]
    fn test_add_file_routes_by_role() {
        let mut app = Application::new("shop");
        assert_eq!(app.add_file("src/shop.erl"), Some(FileRole::Source));
        assert_eq!(app.add_file("include/shop.hrl"), Some(FileRole::PublicHeader));
        assert_eq!(app.add_file("README.md"), None);

        assert!(app.srcs.contains("src/shop.erl"));
        assert!(app.public_hdrs.contains("include/shop.hrl"));
        assert_eq!(app.role_of("src/shop.erl"), Some(FileRole::Source));
        assert_eq!(app.role_of("src/other.erl"), None);
    }

    #[test]
    fn test_module_lookup() {
        let mut app = Application::new("shop");
        app.add_file("src/shop_cart.erl");
        app.add_file("src/shop.erl");
        app.add_file("test/shop_SUITE.erl");

        assert_eq!(app.modules(), vec!["shop", "shop_cart"]);
        assert_eq!(app.source_for_module("shop_cart").map(String::as_str), Some("src/shop_cart.erl"));
        assert!(app.source_for_module("shop_SUITE").is_none());
        assert_eq!(
            app.test_source_for_module("shop_SUITE").map(String::as_str),
            Some("test/shop_SUITE.erl")
        );
    }

    #[test]
    fn test_scan_reads_metadata() {
        let fs = MockFileSystem::new();
        fs.add_file("shop/src/shop.erl", "-module(shop).");
        fs.add_file(
            "shop/src/shop.app.src",
            r#"{application, shop, [{vsn, "0.4.1"}, {description, "Shop"}]}."#,
        );
        fs.add_file("shop/LICENSE", "");
        fs.add_file("shop/priv/index.html", "");

        let app = Application::scan(&fs, Path::new("shop"), "shop").unwrap();
        assert_eq!(app.srcs.values(), vec!["src/shop.erl"]);
        assert_eq!(app.app_srcs.values(), vec!["src/shop.app.src"]);
        assert_eq!(app.license_files.values(), vec!["LICENSE"]);
        assert_eq!(app.priv_files.values(), vec!["priv/index.html"]);
        assert_eq!(app.version.as_deref(), Some("0.4.1"));
        assert_eq!(app.description.as_deref(), Some("Shop"));
    }
}
