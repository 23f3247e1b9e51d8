//! beamgraph - build dependency graph synthesis for Erlang/OTP applications
//!
//! beamgraph reads the sources of one application and produces a build plan:
//! one compilation unit per source file, each with explicit edges to the
//! headers it includes, the sibling modules it needs compiled first and the
//! other applications it depends on, plus the aggregate descriptors a build
//! tool needs to package and test the application.
//!
//! # Core Concepts
//!
//! - **Application**: the classified files of one OTP application
//! - **Source facts**: includes, referenced modules and called modules,
//!   extracted per file by a [`SourceParser`]
//! - **Module index**: which application owns which module
//! - **Resolution**: turning facts into header, sibling and application edges
//! - **Build plan**: the synthesized descriptors
//!
//! # Example Usage
//!
//! ```no_run
//! use beamgraph::fs::{FileSystem, RealFileSystem};
//! use beamgraph::generate::{generate, GenerateOptions};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem::new());
//! let (app, plan) = generate(fs, Path::new("apps/shop"), &GenerateOptions::default())?;
//! println!("{} depends on {:?}", app.name, plan.erlang_app.deps);
//! # Ok::<(), beamgraph::GenerateError>(())
//! ```
//!
//! # Project Structure
//!
//! - [`app`]: application model and file classification
//! - [`parser`]: source fact extraction
//! - [`index`]: module ownership index
//! - [`resolve`]: include, module and call resolution
//! - [`synth`]: compilation-unit synthesis and build plan descriptors

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod fs;
pub mod generate;
pub mod index;
pub mod parser;
pub mod resolve;
pub mod synth;
pub mod util;

pub use app::{Application, FileRole};
pub use config::{ConfigError, PackageConfig, ResolverConfig};
pub use error::GenerateError;
pub use index::{IndexError, MissingIndexPolicy, ModuleIndex};
pub use parser::{ErlAttrParser, ParseError, SourceFacts, SourceParser};
pub use resolve::{FileDependencies, FileResolver, ResolveMode, Resolution, ResolverContext};
pub use synth::{BuildPlan, CompilationUnit, Synthesizer};
pub use util::{init_logging, LoggingConfig, OrderedSet};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name_is_beamgraph() {
        assert_eq!(NAME, "beamgraph");
    }
}
