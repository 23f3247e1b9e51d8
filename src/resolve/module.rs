//! Module and call resolution

use super::{Resolution, ResolverContext};
use crate::app::naming;

/// What a referenced module turned into
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleTarget {
    /// Output artifact of a source in the same application
    Sibling(String),
    /// Another application
    App(String),
}

/// What a call from a test-directory source turned into
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallTarget {
    /// Another test-directory artifact, needed only to run
    RuntimeArtifact(String),
    /// Another application, needed only to run
    RuntimeApp(String),
}

/// Owning application of a module: explicit mappings first, then the index
pub fn owner<'a>(ctx: &ResolverContext<'a>, module: &str) -> Option<&'a str> {
    ctx.config
        .mapping(module)
        .or_else(|| ctx.index.find(module))
}

/// Resolves a module referenced by `-behaviour` or a parse transform.
/// `artifact` maps a sibling source to the artifact the referencing unit
/// depends on.
pub fn resolve_module(
    ctx: &ResolverContext<'_>,
    module: &str,
    artifact: impl Fn(&str) -> String,
) -> Resolution<ModuleTarget> {
    if let Some(src) = ctx.app.source_for_module(module) {
        return Resolution::Resolved(ModuleTarget::Sibling(artifact(src.as_str())));
    }

    if let Some(app) = ctx.config.mapping(module) {
        // Explicit mappings are taken as written
        if app == ctx.app.name {
            return Resolution::SelfOwned;
        }
        return Resolution::Resolved(ModuleTarget::App(app.to_string()));
    }

    match ctx.index.find(module) {
        Some(app) => ctx.classify_owner(app).map(ModuleTarget::App),
        None => Resolution::Unresolved,
    }
}

/// Resolves a called module to the application that must be available
pub fn resolve_call(ctx: &ResolverContext<'_>, module: &str) -> Resolution<String> {
    match owner(ctx, module) {
        Some(app) => ctx.classify_owner(app),
        None => Resolution::Unresolved,
    }
}

/// Resolves a call made from the test-directory source `from`. Other
/// test-directory modules become runtime artifacts; everything else is
/// resolved like a production call and becomes a runtime application.
pub fn resolve_test_call(
    ctx: &ResolverContext<'_>,
    from: &str,
    module: &str,
) -> Resolution<CallTarget> {
    if let Some(src) = ctx.app.test_source_for_module(module) {
        if src == from {
            return Resolution::SelfOwned;
        }
        return Resolution::Resolved(CallTarget::RuntimeArtifact(naming::test_dir_beam_file(src)));
    }
    resolve_call(ctx, module).map(CallTarget::RuntimeApp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Application;
    use crate::config::ResolverConfig;
    use crate::index::ModuleIndex;

    fn fixture() -> (Application, ResolverConfig, ModuleIndex) {
        let mut app = Application::new("shop");
        for path in [
            "src/shop.erl",
            "src/shop_cart.erl",
            "test/shop_SUITE.erl",
            "test/helper.erl",
        ] {
            app.add_file(path);
        }

        let mut config = ResolverConfig::default();
        config.ignored_deps.insert("kernel".to_string());
        config
            .module_mappings
            .insert("ssl_cipher".to_string(), "ssl".to_string());

        let mut index = ModuleIndex::new();
        index.insert("cowboy", vec!["cowboy".to_string(), "cowboy_req".to_string()]);
        index.insert("kernel", vec!["gen_tcp".to_string()]);
        index.insert("shop", vec!["shop".to_string(), "shop_cart".to_string()]);
        (app, config, index)
    }

    #[test]
    fn test_module_prefers_sibling() {
        let (app, config, index) = fixture();
        let ctx = ResolverContext::new(&app, &config, &index);
        assert_eq!(
            resolve_module(&ctx, "shop_cart", naming::beam_file),
            Resolution::Resolved(ModuleTarget::Sibling("ebin/shop_cart.beam".to_string()))
        );
        assert_eq!(
            resolve_module(&ctx, "shop_cart", naming::test_beam_file),
            Resolution::Resolved(ModuleTarget::Sibling("test/shop_cart.beam".to_string()))
        );
    }

    #[test]
    fn test_module_mapping_then_index() {
        let (app, config, index) = fixture();
        let ctx = ResolverContext::new(&app, &config, &index);
        assert_eq!(
            resolve_module(&ctx, "ssl_cipher", naming::beam_file),
            Resolution::Resolved(ModuleTarget::App("ssl".to_string()))
        );
        assert_eq!(
            resolve_module(&ctx, "cowboy_req", naming::beam_file),
            Resolution::Resolved(ModuleTarget::App("cowboy".to_string()))
        );
        assert_eq!(
            resolve_module(&ctx, "gen_tcp", naming::beam_file),
            Resolution::Ignored("kernel".to_string())
        );
        assert_eq!(resolve_module(&ctx, "gen_server", naming::beam_file), Resolution::Unresolved);
    }

    #[test]
    fn test_call_elides_self_and_ignored() {
        let (app, config, index) = fixture();
        let ctx = ResolverContext::new(&app, &config, &index);
        assert_eq!(resolve_call(&ctx, "shop_cart"), Resolution::SelfOwned);
        assert_eq!(resolve_call(&ctx, "gen_tcp"), Resolution::Ignored("kernel".to_string()));
        assert_eq!(resolve_call(&ctx, "cowboy"), Resolution::Resolved("cowboy".to_string()));
        assert_eq!(resolve_call(&ctx, "ssl_cipher"), Resolution::Resolved("ssl".to_string()));
        assert_eq!(resolve_call(&ctx, "lists"), Resolution::Unresolved);
    }

    #[test]
    fn test_call_mapping_overrides_index() {
        let (app, mut config, index) = fixture();
        config
            .module_mappings
            .insert("cowboy_req".to_string(), "cowlib".to_string());
        let ctx = ResolverContext::new(&app, &config, &index);
        assert_eq!(resolve_call(&ctx, "cowboy_req"), Resolution::Resolved("cowlib".to_string()));
    }

    #[test]
    fn test_test_call_to_helper_is_runtime_artifact() {
        let (app, config, index) = fixture();
        let ctx = ResolverContext::new(&app, &config, &index);
        assert_eq!(
            resolve_test_call(&ctx, "test/shop_SUITE.erl", "helper"),
            Resolution::Resolved(CallTarget::RuntimeArtifact("test/helper.beam".to_string()))
        );
        assert_eq!(
            resolve_test_call(&ctx, "test/shop_SUITE.erl", "cowboy"),
            Resolution::Resolved(CallTarget::RuntimeApp("cowboy".to_string()))
        );
        assert_eq!(
            resolve_test_call(&ctx, "test/shop_SUITE.erl", "shop_SUITE"),
            Resolution::SelfOwned
        );
    }
}
