//! End-to-end generation for one application directory
//!
//! Scan the directory, apply `beamgraph.yaml`, load the module index and
//! synthesize the build plan. Only a parse failure, an unreadable directory
//! or an invalid config aborts the run; a missing index degrades to the
//! configured fallback.

use crate::app::{self, Application};
use crate::config::PackageConfig;
use crate::error::GenerateError;
use crate::fs::FileSystem;
use crate::index;
use crate::parser::ErlAttrParser;
use crate::synth::{BuildPlan, Synthesizer};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Application name; defaults to the config override, then the
    /// directory name
    pub name: Option<String>,
    /// Module index path
    pub index: Option<PathBuf>,
    /// Config file; defaults to `<app_dir>/beamgraph.yaml`
    pub config: Option<PathBuf>,
}

pub fn load_config(
    fs: &dyn FileSystem,
    app_dir: &Path,
    explicit: Option<&Path>,
) -> Result<PackageConfig, GenerateError> {
    let config = match explicit {
        Some(path) => PackageConfig::load(fs, path)?,
        None => PackageConfig::load_or_default(fs, app_dir)?,
    };
    Ok(config)
}

/// Scans and configures the application without resolving anything
pub fn prepare(
    fs: &dyn FileSystem,
    app_dir: &Path,
    options: &GenerateOptions,
    config: &PackageConfig,
) -> Result<Application, GenerateError> {
    let name = options
        .name
        .clone()
        .or_else(|| config.name.clone())
        .or_else(|| app::default_name(app_dir))
        .ok_or_else(|| GenerateError::MissingName(app_dir.to_path_buf()))?;

    let mut app = Application::scan(fs, app_dir, name).map_err(|e| GenerateError::Scan {
        path: app_dir.to_path_buf(),
        reason: format!("{:#}", e),
    })?;
    config.apply_to(&mut app);
    Ok(app)
}

pub fn generate(
    fs: Arc<dyn FileSystem>,
    app_dir: &Path,
    options: &GenerateOptions,
) -> Result<(Application, BuildPlan), GenerateError> {
    let start = Instant::now();
    info!("Generating build plan for: {}", app_dir.display());

    let config = load_config(fs.as_ref(), app_dir, options.config.as_deref())?;
    let mut app = prepare(fs.as_ref(), app_dir, options, &config)?;
    debug!(app = %app.name, srcs = app.srcs.len(), test_srcs = app.test_srcs.len(), "Scanned application");

    let index_path = config.index_path(fs.as_ref(), app_dir, options.index.as_deref());
    let module_index = index::load_or_fallback(
        fs.as_ref(),
        &index_path,
        &app,
        config.resolver.missing_index,
    );

    let parser = ErlAttrParser::new(Arc::clone(&fs), app_dir.to_path_buf()).map_err(|e| {
        GenerateError::Scan {
            path: app_dir.to_path_buf(),
            reason: format!("{:#}", e),
        }
    })?;
    let plan = Synthesizer::new(&parser, &config.resolver, &module_index).generate(&mut app)?;

    info!(
        "Generated {} units for {} in {:.2?}",
        plan.unit_count(),
        app.name,
        start.elapsed()
    );
    Ok((app, plan))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;
    use serial_test::serial;

    fn mock_app() -> Arc<MockFileSystem> {
        let fs = Arc::new(MockFileSystem::new());
        fs.add_file(
            "shop/src/shop.erl",
            "-module(shop).\n-include(\"shop.hrl\").\nstart() -> shop_cart:new(), cowboy:start().\n",
        );
        fs.add_file("shop/src/shop_cart.erl", "-module(shop_cart).\nnew() -> ok.\n");
        fs.add_file("shop/include/shop.hrl", "-record(item, {id}).\n");
        fs.add_file("moduleindex.yaml", "cowboy: [cowboy]\nshop: [shop, shop_cart]\n");
        fs
    }

    #[test]
    #[serial]
    fn test_generate_from_mock_file_system() {
        let fs = mock_app();
        let (app, plan) = generate(fs.clone(), &fs.root().join("shop"), &GenerateOptions::default()).unwrap();

        assert_eq!(app.name, "shop");
        assert_eq!(plan.erlang_app.deps, vec!["cowboy"]);
        let unit = plan.unit("ebin_shop_beam").unwrap();
        assert_eq!(unit.hdrs.values(), vec!["include/shop.hrl"]);
    }

    #[test]
    #[serial]
    fn test_name_override() {
        let fs = mock_app();
        let options = GenerateOptions {
            name: Some("store".to_string()),
            ..Default::default()
        };
        let (app, plan) = generate(fs.clone(), &fs.root().join("shop"), &options).unwrap();
        assert_eq!(app.name, "store");
        assert_eq!(plan.erlang_app.app_name, "store");
        // shop now belongs to another application in the index
        assert_eq!(plan.erlang_app.deps, vec!["cowboy", "shop"]);
    }

    #[test]
    #[serial]
    fn test_name_flag_wins_over_config() {
        let fs = mock_app();
        fs.add_file("shop/beamgraph.yaml", "name: fromconfig\n");
        let options = GenerateOptions {
            name: Some("fromcli".to_string()),
            ..Default::default()
        };
        let (app, plan) = generate(fs.clone(), &fs.root().join("shop"), &options).unwrap();
        assert_eq!(app.name, "fromcli");
        assert_eq!(plan.erlang_app.app_name, "fromcli");
    }

    #[test]
    #[serial]
    fn test_config_name_wins_over_directory() {
        let fs = mock_app();
        fs.add_file("shop/beamgraph.yaml", "name: fromconfig\n");
        let (app, _) = generate(fs.clone(), &fs.root().join("shop"), &GenerateOptions::default()).unwrap();
        assert_eq!(app.name, "fromconfig");
    }

    #[test]
    #[serial]
    fn test_parse_error_is_fatal() {
        let fs = mock_app();
        fs.add_file("shop/src/broken.erl", "-module(broken).\nf() -> \"oops.\n");
        let err = generate(fs.clone(), &fs.root().join("shop"), &GenerateOptions::default()).unwrap_err();
        assert!(matches!(err, GenerateError::Parse(_)));
    }
}
