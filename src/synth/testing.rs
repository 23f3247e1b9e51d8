//! Test aggregation: the bulk unit-test run and per-suite descriptors

use super::descriptor::{local, CompilationUnit, SuiteDescriptor, UnitTestDescriptor, TEST_ERLANG_APP};
use crate::app::{naming, Application};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Matches test-directory modules to the production module they test.
///
/// Every production module starts unmatched. A non-suite test module named
/// `<module>_tests` is attached to `<module>` when that is a production
/// module; any other non-suite test module stands on its own.
pub fn unit_test_matches(app: &Application) -> BTreeMap<String, Option<String>> {
    let mut matches: BTreeMap<String, Option<String>> =
        app.modules().into_iter().map(|m| (m, None)).collect();
    let production: Vec<String> = matches.keys().cloned().collect();

    for test_src in app.test_srcs.sorted() {
        let module = naming::module_name(test_src);
        if naming::is_suite(module) {
            continue;
        }
        let label = local(&naming::unit_name_for_test_src(&naming::test_dir_beam_file(test_src)));
        match naming::tested_module(module).filter(|m| production.iter().any(|p| p == m)) {
            Some(tested) => {
                debug!(test = module, module = tested, "matched unit tests");
                matches.insert(tested.to_string(), Some(label));
            }
            None => {
                matches.insert(module.to_string(), Some(label));
            }
        }
    }
    matches
}

pub fn unit_test_descriptor(app: &Application) -> UnitTestDescriptor {
    let modules = unit_test_matches(app);
    let mut compiled_suites: Vec<String> = modules.values().flatten().cloned().collect();
    compiled_suites.sort();
    compiled_suites.dedup();
    UnitTestDescriptor {
        name: "eunit".to_string(),
        target: local(TEST_ERLANG_APP),
        compiled_suites,
        modules,
    }
}

/// One descriptor per `_SUITE` module, wired to its compiled unit
pub fn suite_descriptors(app: &Application, test_dir_units: &[CompilationUnit]) -> Vec<SuiteDescriptor> {
    let mut suites = Vec::new();
    for test_src in app.test_srcs.sorted() {
        let module = naming::module_name(test_src);
        if !naming::is_suite(module) {
            continue;
        }
        let Some(unit) = test_dir_units.iter().find(|u| &u.src == test_src) else {
            warn!(suite = module, "No compiled unit for suite");
            continue;
        };

        let mut compiled_suites = vec![local(&unit.name)];
        compiled_suites.extend(unit.runtime_beam.values());

        let mut deps = vec![local(TEST_ERLANG_APP)];
        deps.extend(unit.runtime_deps.values());

        suites.push(SuiteDescriptor {
            name: module.to_string(),
            compiled_suites,
            data: vec![naming::suite_data_glob(module)],
            deps,
        });
    }
    suites
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::ResolveMode;
    use crate::util::OrderedSet;

    fn app(paths: &[&str]) -> Application {
        let mut app = Application::new("shop");
        for path in paths {
            app.add_file(path);
        }
        app
    }

    #[test]
    fn test_tests_module_attaches_to_production_module() {
        let app = app(&["src/shop.erl", "src/shop_cart.erl", "test/shop_tests.erl"]);
        let matches = unit_test_matches(&app);

        assert_eq!(matches.len(), 2);
        assert_eq!(matches["shop"].as_deref(), Some(":test_shop_tests_beam"));
        assert_eq!(matches["shop_cart"], None);
        assert!(!matches.contains_key("shop_tests"));
    }

    #[test]
    fn test_unmatched_test_modules_stand_alone() {
        let app = app(&[
            "src/shop.erl",
            "test/orphan_tests.erl",
            "test/helper.erl",
            "test/shop_SUITE.erl",
        ]);
        let matches = unit_test_matches(&app);

        assert_eq!(matches["orphan_tests"].as_deref(), Some(":test_orphan_tests_beam"));
        assert_eq!(matches["helper"].as_deref(), Some(":test_helper_beam"));
        assert!(!matches.contains_key("shop_SUITE"));

        let eunit = unit_test_descriptor(&app);
        assert_eq!(eunit.target, ":test_erlang_app");
        assert_eq!(
            eunit.compiled_suites,
            vec![":test_helper_beam", ":test_orphan_tests_beam"]
        );
    }

    #[test]
    fn test_suite_descriptor() {
        let app = app(&["src/shop.erl", "test/shop_SUITE.erl", "test/helper.erl"]);
        let unit = CompilationUnit {
            name: "shop_SUITE_beam_files".to_string(),
            mode: ResolveMode::TestDir,
            app_name: None,
            src: "test/shop_SUITE.erl".to_string(),
            out: "test/shop_SUITE.beam".to_string(),
            erlc_opts: "//:test_erlc_opts".to_string(),
            hdrs: OrderedSet::new(),
            beam: OrderedSet::new(),
            deps: OrderedSet::new(),
            runtime_beam: ["test/helper.beam".to_string()].into_iter().collect(),
            runtime_deps: ["cowboy".to_string()].into_iter().collect(),
            testonly: true,
        };

        let suites = suite_descriptors(&app, &[unit]);
        assert_eq!(suites.len(), 1);
        let suite = &suites[0];
        assert_eq!(suite.name, "shop_SUITE");
        assert_eq!(suite.compiled_suites, vec![":shop_SUITE_beam_files", "test/helper.beam"]);
        assert_eq!(suite.data, vec!["test/shop_SUITE_data/**/*"]);
        assert_eq!(suite.deps, vec![":test_erlang_app", "cowboy"]);
    }
}
