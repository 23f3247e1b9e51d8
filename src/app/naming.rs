//! Module, artifact and unit naming conventions

use crate::util::paths;

pub const SUITE_SUFFIX: &str = "_SUITE";
pub const UNIT_TEST_SUFFIX: &str = "_tests";

/// Module name of a source or artifact path: `src/foo.erl` -> `foo`
pub fn module_name(src: &str) -> &str {
    let base = paths::base(src);
    base.strip_suffix(".erl")
        .or_else(|| base.strip_suffix(".beam"))
        .unwrap_or(base)
}

/// Production artifact: `src/foo.erl` -> `ebin/foo.beam`
pub fn beam_file(src: &str) -> String {
    format!("ebin/{}.beam", module_name(src))
}

/// Artifact of a production source compiled with test options:
/// `src/foo.erl` -> `test/foo.beam`
pub fn test_beam_file(src: &str) -> String {
    format!("test/{}.beam", module_name(src))
}

/// Artifact of a test-directory source, kept next to the source:
/// `test/foo_SUITE.erl` -> `test/foo_SUITE.beam`
pub fn test_dir_beam_file(src: &str) -> String {
    let stem = src.strip_suffix(".erl").unwrap_or(src);
    format!("{}.beam", stem)
}

/// Unit name for an output path: `ebin/foo.beam` -> `ebin_foo_beam`
pub fn unit_name(path: &str) -> String {
    path.replace(['/', '.'], "_")
}

/// Unit name for a test-directory artifact; suites get a stable
/// `<module>_beam_files` name so suite descriptors can find them
pub fn unit_name_for_test_src(out: &str) -> String {
    let module = module_name(out);
    if is_suite(module) {
        format!("{}_beam_files", module)
    } else {
        unit_name(out)
    }
}

pub fn is_suite(module: &str) -> bool {
    module.ends_with(SUITE_SUFFIX)
}

/// The production module a unit-test module is named after, if any:
/// `shop_tests` -> `shop`
pub fn tested_module(module: &str) -> Option<&str> {
    module
        .strip_suffix(UNIT_TEST_SUFFIX)
        .filter(|prefix| !prefix.is_empty())
}

/// Colocated data directory glob for a suite
pub fn suite_data_glob(module: &str) -> String {
    format!("test/{}_data/**/*", module)
}
