//! Compilation-unit synthesis
//!
//! The [`Synthesizer`] parses every source of an application, resolves its
//! dependencies and assembles the [`BuildPlan`]. Production sources are
//! compiled twice, once with the normal options and once with the test
//! options; test-directory sources once with the test options.

pub mod descriptor;
pub mod testing;

pub use descriptor::{
    AppDescriptor, BuildPlan, CheckDescriptor, CheckKind, CompilationUnit, ErlcOptsDescriptor,
    FileGroup, SuiteDescriptor, UnitTestDescriptor,
};

use crate::app::{naming, Application};
use crate::config::ResolverConfig;
use crate::error::GenerateError;
use crate::index::ModuleIndex;
use crate::parser::{macros, ParseError, SourceParser};
use crate::resolve::{FileResolver, ResolveMode, ResolverContext};
use crate::util::OrderedSet;
use descriptor::{
    local, root, BASE_PLT, BEAM_FILES, ERLANG_APP, ERLC_OPTS, TEST_BEAM_FILES, TEST_DIR_BEAM_FILES,
    TEST_ERLANG_APP, TEST_ERLC_OPTS,
};
use tracing::{debug, info};

pub struct Synthesizer<'a> {
    parser: &'a dyn SourceParser,
    config: &'a ResolverConfig,
    index: &'a ModuleIndex,
}

impl<'a> Synthesizer<'a> {
    pub fn new(parser: &'a dyn SourceParser, config: &'a ResolverConfig, index: &'a ModuleIndex) -> Self {
        Self {
            parser,
            config,
            index,
        }
    }

    /// Compiles every source of `mode` and returns the units together with
    /// the applications reached through calls
    fn compile_units(
        &self,
        app: &Application,
        mode: ResolveMode,
    ) -> Result<(Vec<CompilationUnit>, OrderedSet<String>), ParseError> {
        let (srcs, opts, opts_label) = match mode {
            ResolveMode::Production => (&app.srcs, &app.erlc_opts, ERLC_OPTS),
            ResolveMode::TestBuild => (&app.srcs, &app.test_erlc_opts, TEST_ERLC_OPTS),
            ResolveMode::TestDir => (&app.test_srcs, &app.test_erlc_opts, TEST_ERLC_OPTS),
        };
        let macros = macros(opts);
        let resolver = FileResolver::new(ResolverContext::new(app, self.config, self.index), mode);

        let mut units = Vec::new();
        let mut app_deps = OrderedSet::new();
        for src in srcs.sorted() {
            debug!(src = %src, mode = ?mode, "Parsing");
            let facts = self.parser.parse(src, &macros)?;
            let deps = resolver.resolve(src, &facts);
            app_deps.extend(deps.app_deps.iter().cloned());

            let out = mode.output(src);
            let name = match mode {
                ResolveMode::TestDir => naming::unit_name_for_test_src(&out),
                _ => naming::unit_name(&out),
            };
            units.push(CompilationUnit {
                name,
                mode,
                app_name: (mode != ResolveMode::TestDir).then(|| app.name.clone()),
                src: src.clone(),
                out,
                erlc_opts: root(opts_label),
                hdrs: deps.hdrs,
                beam: deps.beam,
                deps: deps.deps,
                runtime_beam: deps.runtime_beam,
                runtime_deps: deps.runtime_deps,
                testonly: mode != ResolveMode::Production,
            });
        }
        Ok((units, app_deps))
    }

    /// Production units; call-derived applications are added to `app.deps`
    pub fn beam_files(&self, app: &mut Application) -> Result<Vec<CompilationUnit>, ParseError> {
        let (units, app_deps) = self.compile_units(app, ResolveMode::Production)?;
        app.deps.extend(app_deps);
        Ok(units)
    }

    /// Production sources compiled with the test options
    pub fn test_beam_files(&self, app: &mut Application) -> Result<Vec<CompilationUnit>, ParseError> {
        let (units, app_deps) = self.compile_units(app, ResolveMode::TestBuild)?;
        app.deps.extend(app_deps);
        Ok(units)
    }

    pub fn test_dir_beam_files(&self, app: &Application) -> Result<Vec<CompilationUnit>, ParseError> {
        let (units, _) = self.compile_units(app, ResolveMode::TestDir)?;
        Ok(units)
    }

    pub fn generate(&self, app: &mut Application) -> Result<BuildPlan, GenerateError> {
        let units = self.beam_files(app)?;
        let test_units = self.test_beam_files(app)?;
        let test_dir_units = self.test_dir_beam_files(app)?;

        let mut groups = vec![
            FileGroup::new(BEAM_FILES, outputs(&units)),
            FileGroup::new(TEST_BEAM_FILES, outputs(&test_units)).testonly(),
            FileGroup::new(TEST_DIR_BEAM_FILES, outputs(&test_dir_units)).testonly(),
        ];
        groups.extend(source_groups(app));

        let eunit = (!app.srcs.is_empty() || !app.test_srcs.is_empty())
            .then(|| testing::unit_test_descriptor(app));
        let suites = testing::suite_descriptors(app, &test_dir_units);

        let plan = BuildPlan {
            app_name: app.name.clone(),
            erlc_opts: vec![
                ErlcOptsDescriptor::new(ERLC_OPTS, &app.erlc_opts),
                ErlcOptsDescriptor::new(TEST_ERLC_OPTS, &app.test_erlc_opts),
            ],
            units,
            test_units,
            test_dir_units,
            groups,
            erlang_app: app_descriptor(app),
            test_erlang_app: test_app_descriptor(app),
            eunit,
            suites,
            checks: checks(),
        };

        info!(
            app = %plan.app_name,
            units = plan.unit_count(),
            suites = plan.suites.len(),
            deps = app.deps.len(),
            "Generated build plan"
        );
        Ok(plan)
    }
}

fn outputs(units: &[CompilationUnit]) -> Vec<String> {
    units
        .iter()
        .map(|u| u.out.clone())
        .collect::<OrderedSet<_>>()
        .values()
}

/// File groups over the classified sources
pub fn source_groups(app: &Application) -> Vec<FileGroup> {
    vec![
        FileGroup::new("srcs", app.srcs.union(&app.app_srcs).values()),
        FileGroup::new("private_hdrs", app.private_hdrs.values()),
        FileGroup::new("public_hdrs", app.public_hdrs.values()),
        FileGroup::new("priv", app.priv_files.values()),
        FileGroup::new("licenses", app.license_files.values()),
        FileGroup::new(
            "public_and_private_hdrs",
            vec![local("private_hdrs"), local("public_hdrs")],
        ),
        FileGroup::new(
            "all_srcs",
            vec![local("srcs"), local("public_and_private_hdrs")],
        ),
    ]
}

pub fn app_descriptor(app: &Application) -> AppDescriptor {
    AppDescriptor {
        name: ERLANG_APP.to_string(),
        app_name: app.name.clone(),
        app_version: app.version.clone(),
        app_description: app.description.clone(),
        extra_apps: app.extra_apps.values(),
        beam_files: vec![local(BEAM_FILES)],
        hdrs: if app.public_hdrs.is_empty() {
            Vec::new()
        } else {
            vec![local("public_hdrs")]
        },
        srcs: vec![local("all_srcs")],
        extra_license_files: app.license_files.values(),
        deps: app.deps.values(),
        testonly: false,
    }
}

/// Like [`app_descriptor`], over the test-compiled artifacts and all headers
pub fn test_app_descriptor(app: &Application) -> AppDescriptor {
    let has_hdrs = !app.public_hdrs.is_empty() || !app.private_hdrs.is_empty();
    AppDescriptor {
        name: TEST_ERLANG_APP.to_string(),
        beam_files: vec![local(TEST_BEAM_FILES)],
        hdrs: if has_hdrs {
            vec![local("public_and_private_hdrs")]
        } else {
            Vec::new()
        },
        testonly: true,
        ..app_descriptor(app)
    }
}

pub fn checks() -> Vec<CheckDescriptor> {
    vec![
        CheckDescriptor {
            kind: CheckKind::Xref,
            name: "xref".to_string(),
            target: local(ERLANG_APP),
            plt: None,
        },
        CheckDescriptor {
            kind: CheckKind::Plt,
            name: "deps_plt".to_string(),
            target: local(ERLANG_APP),
            plt: Some(BASE_PLT.to_string()),
        },
        CheckDescriptor {
            kind: CheckKind::Dialyze,
            name: "dialyze".to_string(),
            target: local(ERLANG_APP),
            plt: Some(local("deps_plt")),
        },
    ]
}
