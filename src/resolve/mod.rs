//! Dependency resolution
//!
//! Turns the [`SourceFacts`](crate::parser::SourceFacts) of one file into
//! concrete edges: header paths, sibling artifacts inside the application and
//! other applications. Resolution is a pure function of the application's
//! classified files, the [`ResolverConfig`] and the [`ModuleIndex`]; nothing
//! here touches the file system.
//!
//! References that lead nowhere are not errors. Each lookup returns a
//! [`Resolution`] so callers decide what to log and what to keep.

mod file;
mod include;
mod module;

pub use file::{FileDependencies, FileResolver, ResolveMode};
pub use include::{is_external_install_path, IncludeResolver, IncludeTier, LibInclude};
pub use module::{owner, resolve_call, resolve_module, resolve_test_call, CallTarget, ModuleTarget};

use crate::app::Application;
use crate::config::ResolverConfig;
use crate::index::ModuleIndex;

/// Outcome of resolving one reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<T> {
    Resolved(T),
    /// Resolved to an application on the ignore list
    Ignored(String),
    /// Resolved to the application being resolved
    SelfOwned,
    Unresolved,
}

impl<T> Resolution<T> {
    pub fn resolved(self) -> Option<T> {
        match self {
            Resolution::Resolved(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resolution<U> {
        match self {
            Resolution::Resolved(value) => Resolution::Resolved(f(value)),
            Resolution::Ignored(app) => Resolution::Ignored(app),
            Resolution::SelfOwned => Resolution::SelfOwned,
            Resolution::Unresolved => Resolution::Unresolved,
        }
    }
}

/// Everything a resolver consults, borrowed for the duration of one pass
#[derive(Debug, Clone, Copy)]
pub struct ResolverContext<'a> {
    pub app: &'a Application,
    pub config: &'a ResolverConfig,
    pub index: &'a ModuleIndex,
}

impl<'a> ResolverContext<'a> {
    pub fn new(app: &'a Application, config: &'a ResolverConfig, index: &'a ModuleIndex) -> Self {
        Self { app, config, index }
    }

    /// Classifies an owning application against this context
    pub(crate) fn classify_owner(&self, owner: &str) -> Resolution<String> {
        if owner == self.app.name {
            Resolution::SelfOwned
        } else if self.config.is_ignored(owner) {
            Resolution::Ignored(owner.to_string())
        } else {
            Resolution::Resolved(owner.to_string())
        }
    }
}
