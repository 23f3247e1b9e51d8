//! Descriptors handed to serialization
//!
//! Labels follow the build description convention: `:name` refers to a
//! descriptor in the same package, `//:name` to one at the repository root.

use crate::resolve::ResolveMode;
use crate::util::OrderedSet;
use serde::Serialize;
use std::collections::BTreeMap;

pub const ERLC_OPTS: &str = "erlc_opts";
pub const TEST_ERLC_OPTS: &str = "test_erlc_opts";
pub const BEAM_FILES: &str = "beam_files";
pub const TEST_BEAM_FILES: &str = "test_beam_files";
pub const TEST_DIR_BEAM_FILES: &str = "test_dir_beam_files";
pub const ERLANG_APP: &str = "erlang_app";
pub const TEST_ERLANG_APP: &str = "test_erlang_app";
pub const BASE_PLT: &str = "//:base_plt";

pub fn local(name: &str) -> String {
    format!(":{}", name)
}

pub fn root(name: &str) -> String {
    format!("//:{}", name)
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// One compiled source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompilationUnit {
    pub name: String,
    pub mode: ResolveMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
    pub src: String,
    pub out: String,
    /// Label of the option group the unit compiles with
    pub erlc_opts: String,
    #[serde(skip_serializing_if = "OrderedSet::is_empty")]
    pub hdrs: OrderedSet<String>,
    #[serde(skip_serializing_if = "OrderedSet::is_empty")]
    pub beam: OrderedSet<String>,
    #[serde(skip_serializing_if = "OrderedSet::is_empty")]
    pub deps: OrderedSet<String>,
    #[serde(skip_serializing_if = "OrderedSet::is_empty")]
    pub runtime_beam: OrderedSet<String>,
    #[serde(skip_serializing_if = "OrderedSet::is_empty")]
    pub runtime_deps: OrderedSet<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub testonly: bool,
}

/// A named collection of files or labels
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileGroup {
    pub name: String,
    pub srcs: Vec<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub testonly: bool,
}

impl FileGroup {
    pub fn new(name: &str, srcs: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            srcs,
            testonly: false,
        }
    }

    pub fn testonly(mut self) -> Self {
        self.testonly = true;
        self
    }
}

/// Compiler options, with a debug variant and a deterministic default
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErlcOptsDescriptor {
    pub name: String,
    pub debug: Vec<String>,
    pub default: Vec<String>,
}

impl ErlcOptsDescriptor {
    pub fn new(name: &str, opts: &OrderedSet<String>) -> Self {
        let mut default = opts.clone();
        default.add("+deterministic".to_string());
        Self {
            name: name.to_string(),
            debug: opts.values(),
            default: default.values(),
        }
    }
}

/// The packaged application
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppDescriptor {
    pub name: String,
    pub app_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_apps: Vec<String>,
    pub beam_files: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hdrs: Vec<String>,
    pub srcs: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_license_files: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub deps: Vec<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub testonly: bool,
}

/// Bulk unit-test run over the test application
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitTestDescriptor {
    pub name: String,
    pub target: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub compiled_suites: Vec<String>,
    /// Test module -> label of its compiled test module, `None` when the
    /// module is tested from its own artifact only
    pub modules: BTreeMap<String, Option<String>>,
}

/// One common-test suite
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuiteDescriptor {
    pub name: String,
    pub compiled_suites: Vec<String>,
    pub data: Vec<String>,
    pub deps: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    Xref,
    Plt,
    Dialyze,
}

/// Static analysis over the packaged application
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckDescriptor {
    pub kind: CheckKind,
    pub name: String,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plt: Option<String>,
}

/// Everything generated for one application
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildPlan {
    pub app_name: String,
    pub erlc_opts: Vec<ErlcOptsDescriptor>,
    pub units: Vec<CompilationUnit>,
    pub test_units: Vec<CompilationUnit>,
    pub test_dir_units: Vec<CompilationUnit>,
    pub groups: Vec<FileGroup>,
    pub erlang_app: AppDescriptor,
    pub test_erlang_app: AppDescriptor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eunit: Option<UnitTestDescriptor>,
    pub suites: Vec<SuiteDescriptor>,
    pub checks: Vec<CheckDescriptor>,
}

impl BuildPlan {
    pub fn group(&self, name: &str) -> Option<&FileGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn unit(&self, name: &str) -> Option<&CompilationUnit> {
        self.units
            .iter()
            .chain(&self.test_units)
            .chain(&self.test_dir_units)
            .find(|u| u.name == name)
    }

    pub fn suite(&self, name: &str) -> Option<&SuiteDescriptor> {
        self.suites.iter().find(|s| s.name == name)
    }

    pub fn unit_count(&self) -> usize {
        self.units.len() + self.test_units.len() + self.test_dir_units.len()
    }
}
