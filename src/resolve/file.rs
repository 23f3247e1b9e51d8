//! Per-file resolution

use super::include::{IncludeResolver, LibInclude};
use super::module::{resolve_call, resolve_module, resolve_test_call, CallTarget, ModuleTarget};
use super::{Resolution, ResolverContext};
use crate::app::naming;
use crate::parser::SourceFacts;
use crate::util::OrderedSet;
use serde::Serialize;
use tracing::debug;

/// The context a source is compiled in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveMode {
    /// `src/*.erl` with the normal options
    Production,
    /// `src/*.erl` with the test options
    TestBuild,
    /// `test/*.erl`
    TestDir,
}

impl ResolveMode {
    /// Artifact a unit in this mode depends on for a sibling source
    pub fn sibling_artifact(self, src: &str) -> String {
        match self {
            ResolveMode::Production => naming::beam_file(src),
            ResolveMode::TestBuild | ResolveMode::TestDir => naming::test_beam_file(src),
        }
    }

    /// Artifact produced for a source in this mode
    pub fn output(self, src: &str) -> String {
        match self {
            ResolveMode::Production => naming::beam_file(src),
            ResolveMode::TestBuild => naming::test_beam_file(src),
            ResolveMode::TestDir => naming::test_dir_beam_file(src),
        }
    }

    fn include_resolver(self) -> IncludeResolver {
        match self {
            ResolveMode::Production | ResolveMode::TestBuild => IncludeResolver::standard(),
            ResolveMode::TestDir => IncludeResolver::for_tests(),
        }
    }
}

/// Resolved edges of one source file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileDependencies {
    pub hdrs: OrderedSet<String>,
    /// Sibling artifacts needed to compile
    pub beam: OrderedSet<String>,
    /// Applications needed to compile
    pub deps: OrderedSet<String>,
    /// Applications reached through calls; folded into the application's
    /// dependency set rather than the unit's
    pub app_deps: OrderedSet<String>,
    /// Test-directory artifacts needed only to run
    pub runtime_beam: OrderedSet<String>,
    /// Applications needed only to run
    pub runtime_deps: OrderedSet<String>,
}

pub struct FileResolver<'a> {
    ctx: ResolverContext<'a>,
    mode: ResolveMode,
    includes: IncludeResolver,
}

impl<'a> FileResolver<'a> {
    pub fn new(ctx: ResolverContext<'a>, mode: ResolveMode) -> Self {
        Self {
            ctx,
            mode,
            includes: mode.include_resolver(),
        }
    }

    pub fn mode(&self) -> ResolveMode {
        self.mode
    }

    pub fn resolve(&self, src: &str, facts: &SourceFacts) -> FileDependencies {
        let mut out = FileDependencies::default();
        let app = self.ctx.app;

        for include in &facts.includes {
            if let Resolution::Resolved(path) = self.includes.resolve_include(app, src, include) {
                out.hdrs.add(path);
            }
        }

        for include in &facts.include_libs {
            match self
                .includes
                .resolve_include_lib(app, self.ctx.config, src, include)
            {
                Resolution::Resolved(LibInclude::Header(path)) => {
                    out.hdrs.add(path);
                }
                Resolution::Resolved(LibInclude::Dependency(dep)) => {
                    out.deps.add(dep);
                }
                _ => {}
            }
        }

        let own_output = self.mode.output(src);
        for module in facts.modules.sorted() {
            match resolve_module(&self.ctx, module, |other| self.mode.sibling_artifact(other)) {
                Resolution::Resolved(ModuleTarget::Sibling(beam)) => {
                    if beam == own_output {
                        continue;
                    }
                    debug!(src, module = %module, beam = %beam, "module");
                    out.beam.add(beam);
                }
                Resolution::Resolved(ModuleTarget::App(dep)) => {
                    debug!(src, module = %module, app = %dep, "module");
                    out.deps.add(dep);
                }
                other => {
                    debug!(src, module = %module, outcome = ?other, "ignoring module");
                }
            }
        }

        for module in facts.calls.sorted() {
            match self.mode {
                ResolveMode::TestDir => match resolve_test_call(&self.ctx, src, module) {
                    Resolution::Resolved(CallTarget::RuntimeArtifact(beam)) => {
                        debug!(src, call = %module, beam = %beam, "runtime call");
                        out.runtime_beam.add(beam);
                    }
                    Resolution::Resolved(CallTarget::RuntimeApp(dep)) => {
                        debug!(src, call = %module, app = %dep, "runtime call");
                        out.runtime_deps.add(dep);
                    }
                    other => {
                        debug!(src, call = %module, outcome = ?other, "ignoring call");
                    }
                },
                ResolveMode::Production | ResolveMode::TestBuild => {
                    match resolve_call(&self.ctx, module) {
                        Resolution::Resolved(dep) => {
                            debug!(src, call = %module, app = %dep, "call");
                            out.app_deps.add(dep);
                        }
                        other => {
                            debug!(src, call = %module, outcome = ?other, "ignoring call");
                        }
                    }
                }
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Application;
    use crate::config::ResolverConfig;
    use crate::index::ModuleIndex;

    fn facts(
        includes: &[&str],
        include_libs: &[&str],
        modules: &[&str],
        calls: &[&str],
    ) -> SourceFacts {
        SourceFacts {
            includes: includes.iter().map(|s| s.to_string()).collect(),
            include_libs: include_libs.iter().map(|s| s.to_string()).collect(),
            modules: modules.iter().map(|s| s.to_string()).collect(),
            calls: calls.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn shop() -> Application {
        let mut app = Application::new("shop");
        for path in [
            "src/shop.erl",
            "src/shop_cart.erl",
            "src/shop_int.hrl",
            "include/shop.hrl",
            "test/shop_SUITE.erl",
            "test/helper.erl",
            "test/shop_tests.erl",
            "test/suite.hrl",
        ] {
            app.add_file(path);
        }
        app
    }

    fn index() -> ModuleIndex {
        let mut index = ModuleIndex::new();
        index.insert("cowboy", vec!["cowboy".to_string(), "cowboy_req".to_string()]);
        index.insert("kernel", vec!["gen_tcp".to_string(), "logger".to_string()]);
        index.insert("ranch", vec!["ranch".to_string()]);
        index
    }

    fn ignoring_kernel() -> ResolverConfig {
        let mut config = ResolverConfig::default();
        config.ignored_deps.insert("kernel".to_string());
        config
    }

    #[test]
    fn test_production_file() {
        let app = shop();
        let config = ignoring_kernel();
        let index = index();
        let resolver = FileResolver::new(ResolverContext::new(&app, &config, &index), ResolveMode::Production);

        let deps = resolver.resolve(
            "src/shop.erl",
            &facts(
                &["shop_int.hrl", "missing.hrl"],
                &["shop/include/shop.hrl", "ranch/include/ranch.hrl", "kernel/include/logger.hrl"],
                &["shop_cart", "cowboy_req"],
                &["cowboy", "gen_tcp", "shop_cart", "lists"],
            ),
        );

        assert_eq!(deps.hdrs.values(), vec!["include/shop.hrl", "src/shop_int.hrl"]);
        assert_eq!(deps.beam.values(), vec!["ebin/shop_cart.beam"]);
        assert_eq!(deps.deps.values(), vec!["cowboy", "ranch"]);
        assert_eq!(deps.app_deps.values(), vec!["cowboy"]);
        assert!(deps.runtime_beam.is_empty());
        assert!(deps.runtime_deps.is_empty());
    }

    #[test]
    fn test_sibling_and_cross_app_are_disjoint() {
        let app = shop();
        let config = ResolverConfig::default();
        // Index claims shop_cart belongs elsewhere; the local source wins
        let mut index = index();
        index.insert("other", vec!["shop_cart".to_string()]);
        let resolver = FileResolver::new(ResolverContext::new(&app, &config, &index), ResolveMode::Production);

        let deps = resolver.resolve("src/shop.erl", &facts(&[], &[], &["shop_cart"], &[]));
        assert_eq!(deps.beam.values(), vec!["ebin/shop_cart.beam"]);
        assert!(deps.deps.is_empty());
    }

    #[test]
    fn test_never_depends_on_itself() {
        let app = shop();
        let config = ResolverConfig::default();
        let index = ModuleIndex::self_only(&app);
        let resolver = FileResolver::new(ResolverContext::new(&app, &config, &index), ResolveMode::Production);

        let deps = resolver.resolve("src/shop.erl", &facts(&[], &["shop/src/shop.erl"], &["shop"], &["shop"]));
        assert!(deps.beam.is_empty());
        assert!(deps.deps.is_empty());
        assert!(deps.app_deps.is_empty());
        assert!(deps.hdrs.is_empty());
    }

    #[test]
    fn test_test_build_uses_test_artifacts() {
        let app = shop();
        let config = ResolverConfig::default();
        let index = index();
        let resolver = FileResolver::new(ResolverContext::new(&app, &config, &index), ResolveMode::TestBuild);

        let deps = resolver.resolve("src/shop.erl", &facts(&[], &[], &["shop_cart"], &["ranch"]));
        assert_eq!(deps.beam.values(), vec!["test/shop_cart.beam"]);
        assert_eq!(deps.app_deps.values(), vec!["ranch"]);
    }

    #[test]
    fn test_test_dir_file() {
        let app = shop();
        let config = ignoring_kernel();
        let index = index();
        let resolver = FileResolver::new(ResolverContext::new(&app, &config, &index), ResolveMode::TestDir);

        let deps = resolver.resolve(
            "test/shop_SUITE.erl",
            &facts(
                &["suite.hrl", "shop.hrl"],
                &["shop/include/shop.hrl", "common_test/include/ct.hrl"],
                &["shop_cart"],
                &["helper", "shop_SUITE", "cowboy", "gen_tcp", "shop"],
            ),
        );

        assert_eq!(deps.hdrs.values(), vec!["include/shop.hrl", "test/suite.hrl"]);
        assert_eq!(deps.beam.values(), vec!["test/shop_cart.beam"]);
        assert_eq!(deps.deps.values(), vec!["common_test"]);
        assert_eq!(deps.runtime_beam.values(), vec!["test/helper.beam"]);
        assert_eq!(deps.runtime_deps.values(), vec!["cowboy"]);
        assert!(deps.app_deps.is_empty());
    }

    #[test]
    fn test_resolution_is_repeatable() {
        let app = shop();
        let config = ignoring_kernel();
        let index = index();
        let resolver = FileResolver::new(ResolverContext::new(&app, &config, &index), ResolveMode::Production);
        let input = facts(&["shop_int.hrl"], &["ranch/include/r.hrl"], &["shop_cart"], &["cowboy"]);

        assert_eq!(resolver.resolve("src/shop.erl", &input), resolver.resolve("src/shop.erl", &input));
    }
}
