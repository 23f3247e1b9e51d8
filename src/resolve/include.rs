//! Header resolution
//!
//! An include reference is tried against an ordered list of tiers, first hit
//! wins:
//!
//! 1. `exact` - the reference is a classified header path
//! 2. `source_dir` - relative to the including file's directory
//! 3. `private_root` - under `src/`, private headers only
//! 4. `public_root` - under `include/`, public headers only
//!
//! Test-directory sources add two tiers matched against test headers:
//! `test_source_dir` and `test_root` (under `test/`).

use super::Resolution;
use crate::app::Application;
use crate::config::ResolverConfig;
use crate::util::paths;
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, trace};

/// One way of turning an include reference into a header path
pub trait IncludeTier: Send + Sync {
    fn name(&self) -> &'static str;

    fn try_resolve(&self, app: &Application, from: &str, reference: &str) -> Option<String>;
}

struct ExactHeader;

impl IncludeTier for ExactHeader {
    fn name(&self) -> &'static str {
        "exact"
    }

    fn try_resolve(&self, app: &Application, _from: &str, reference: &str) -> Option<String> {
        let candidate = paths::clean(reference);
        app.is_header(&candidate).then_some(candidate)
    }
}

struct SourceDir;

impl IncludeTier for SourceDir {
    fn name(&self) -> &'static str {
        "source_dir"
    }

    fn try_resolve(&self, app: &Application, from: &str, reference: &str) -> Option<String> {
        let candidate = paths::join(paths::dir(from), reference);
        app.is_header(&candidate).then_some(candidate)
    }
}

/// Which classified header set a rooted tier matches against
#[derive(Clone, Copy)]
enum HeaderSet {
    Private,
    Public,
    Test,
}

impl HeaderSet {
    fn contains(self, app: &Application, path: &str) -> bool {
        match self {
            HeaderSet::Private => app.private_hdrs.contains(path),
            HeaderSet::Public => app.public_hdrs.contains(path),
            HeaderSet::Test => app.test_hdrs.contains(path),
        }
    }
}

struct UnderRoot {
    name: &'static str,
    root: &'static str,
    set: HeaderSet,
}

impl IncludeTier for UnderRoot {
    fn name(&self) -> &'static str {
        self.name
    }

    fn try_resolve(&self, app: &Application, _from: &str, reference: &str) -> Option<String> {
        let candidate = paths::join(self.root, reference);
        self.set.contains(app, &candidate).then_some(candidate)
    }
}

struct TestSourceDir;

impl IncludeTier for TestSourceDir {
    fn name(&self) -> &'static str {
        "test_source_dir"
    }

    fn try_resolve(&self, app: &Application, from: &str, reference: &str) -> Option<String> {
        let candidate = paths::join(paths::dir(from), reference);
        app.test_hdrs.contains(&candidate).then_some(candidate)
    }
}

/// What a library-qualified include turned into
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibInclude {
    /// A header inside the application
    Header(String),
    /// The application that provides the header
    Dependency(String),
}

pub struct IncludeResolver {
    tiers: Vec<Box<dyn IncludeTier>>,
}

impl IncludeResolver {
    pub fn new(tiers: Vec<Box<dyn IncludeTier>>) -> Self {
        Self { tiers }
    }

    /// Tiers for sources under `src/`
    pub fn standard() -> Self {
        Self::new(Self::standard_tiers())
    }

    /// Tiers for sources under `test/`
    pub fn for_tests() -> Self {
        let mut tiers = Self::standard_tiers();
        tiers.push(Box::new(TestSourceDir));
        tiers.push(Box::new(UnderRoot {
            name: "test_root",
            root: "test",
            set: HeaderSet::Test,
        }));
        Self::new(tiers)
    }

    fn standard_tiers() -> Vec<Box<dyn IncludeTier>> {
        vec![
            Box::new(ExactHeader),
            Box::new(SourceDir),
            Box::new(UnderRoot {
                name: "private_root",
                root: "src",
                set: HeaderSet::Private,
            }),
            Box::new(UnderRoot {
                name: "public_root",
                root: "include",
                set: HeaderSet::Public,
            }),
        ]
    }

    pub fn tier_names(&self) -> Vec<&'static str> {
        self.tiers.iter().map(|tier| tier.name()).collect()
    }

    /// First header any tier produces. A file never resolves to itself.
    pub fn resolve(&self, app: &Application, from: &str, reference: &str) -> Option<String> {
        self.tiers.iter().find_map(|tier| {
            let path = tier
                .try_resolve(app, from, reference)
                .filter(|path| path != from)?;
            trace!(src = from, include = reference, tier = tier.name(), path = %path, "matched");
            Some(path)
        })
    }

    /// Resolves `-include("...")`
    pub fn resolve_include(&self, app: &Application, from: &str, reference: &str) -> Resolution<String> {
        match self.resolve(app, from, reference) {
            Some(path) => {
                debug!(src = from, include = reference, path = %path, "include");
                Resolution::Resolved(path)
            }
            None => {
                if !is_external_install_path(reference) {
                    debug!(src = from, include = reference, "ignoring include, cannot be found");
                }
                Resolution::Unresolved
            }
        }
    }

    /// Resolves `-include_lib("app/...")`. The reference is first tried as a
    /// plain include; otherwise its leading segment names the providing
    /// application, which is either this one (the rest is resolved locally)
    /// or a dependency.
    pub fn resolve_include_lib(
        &self,
        app: &Application,
        config: &ResolverConfig,
        from: &str,
        reference: &str,
    ) -> Resolution<LibInclude> {
        if let Some(path) = self.resolve(app, from, reference) {
            debug!(src = from, include_lib = reference, path = %path, "include_lib");
            return Resolution::Resolved(LibInclude::Header(path));
        }

        let (lib, rest) = reference.split_once('/').unwrap_or((reference, ""));
        if lib.is_empty() {
            debug!(src = from, include_lib = reference, "ignoring include_lib, no application");
            return Resolution::Unresolved;
        }

        if lib == app.name {
            return match self.resolve(app, from, rest) {
                Some(path) => {
                    debug!(src = from, include_lib = reference, path = %path, "include_lib (self)");
                    Resolution::Resolved(LibInclude::Header(path))
                }
                None => {
                    debug!(src = from, include_lib = reference, "ignoring include_lib (self), cannot be found");
                    Resolution::Unresolved
                }
            };
        }

        if config.is_ignored(lib) {
            debug!(src = from, include_lib = reference, app = lib, "ignoring include_lib");
            return Resolution::Ignored(lib.to_string());
        }

        debug!(src = from, include_lib = reference, app = lib, "include_lib");
        Resolution::Resolved(LibInclude::Dependency(lib.to_string()))
    }
}

impl Default for IncludeResolver {
    fn default() -> Self {
        Self::standard()
    }
}

fn install_path_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"/lib/[^-/]+-[^/]+/include/").expect("valid regex"))
}

/// Whether an unresolved reference points into an installed OTP library
/// (`.../lib/<name>-<version>/include/...`), which is expected to be missing
pub fn is_external_install_path(reference: &str) -> bool {
    install_path_pattern().is_match(reference)
}
