use super::commands::{ClassifyArgs, GenerateArgs};
use super::output::{Classification, OutputFormatter};
use crate::app::{self, Application};
use crate::fs::{FileSystem, RealFileSystem};
use crate::generate::{generate, GenerateOptions};
use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

fn resolve_app_dir(app_dir: &Option<PathBuf>) -> Result<PathBuf> {
    match app_dir {
        Some(path) => Ok(path.clone()),
        None => env::current_dir().context("Failed to determine current directory"),
    }
}

fn write_output(output: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, output)
                .with_context(|| format!("Failed to write output to {}", path.display()))?;
            info!("Output written to {}", path.display());
        }
        None => println!("{}", output),
    }
    Ok(())
}

fn run_generate(args: &GenerateArgs) -> Result<()> {
    let app_dir = resolve_app_dir(&args.app_dir)?;
    let options = GenerateOptions {
        name: args.name.clone(),
        index: args.index.clone(),
        config: args.config.clone(),
    };
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let (_, plan) = generate(fs, &app_dir, &options)?;

    let formatted = OutputFormatter::new(args.format.into()).format_plan(&plan)?;
    write_output(&formatted, args.output.as_deref())
}

fn run_classify(args: &ClassifyArgs) -> Result<()> {
    let app_dir = resolve_app_dir(&args.app_dir)?;
    let name = app::default_name(&app_dir).unwrap_or_default();
    let app = Application::scan(&RealFileSystem, &app_dir, name)?;

    let formatted =
        OutputFormatter::new(args.format.into()).format_classification(&Classification::from_app(&app))?;
    write_output(&formatted, None)
}

/// Runs `generate`, returning the process exit code
pub fn handle_generate(args: &GenerateArgs) -> i32 {
    match run_generate(args) {
        Ok(()) => 0,
        Err(e) => {
            error!("Generation failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            1
        }
    }
}

/// Runs `classify`, returning the process exit code
pub fn handle_classify(args: &ClassifyArgs) -> i32 {
    match run_classify(args) {
        Ok(()) => 0,
        Err(e) => {
            error!("Classification failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            1
        }
    }
}
