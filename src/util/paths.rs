//! Package-relative path helpers
//!
//! Paths inside an application are plain `/`-separated strings relative to
//! the application root, the same shape the build description uses.

/// Lexically normalizes a relative path: drops `.` segments and empty
/// segments and folds `..` into its parent where possible.
pub fn clean(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

pub fn join(base: &str, path: &str) -> String {
    clean(&format!("{}/{}", base, path))
}

/// Directory part of a relative path, `.` for top-level files
pub fn dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => ".",
    }
}

pub fn base(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean() {
        assert_eq!(clean("src/./foo.hrl"), "src/foo.hrl");
        assert_eq!(clean("src/../include/foo.hrl"), "include/foo.hrl");
        assert_eq!(clean("../lib/x.hrl"), "../lib/x.hrl");
        assert_eq!(clean("a//b"), "a/b");
        assert_eq!(clean("./"), ".");
    }

    #[test]
    fn test_join_relative_to_dir() {
        assert_eq!(join(dir("src/foo.erl"), "foo.hrl"), "src/foo.hrl");
        assert_eq!(join(dir("foo.erl"), "foo.hrl"), "foo.hrl");
        assert_eq!(join("test", "../include/x.hrl"), "include/x.hrl");
    }

    #[test]
    fn test_base() {
        assert_eq!(base("test/foo_SUITE.erl"), "foo_SUITE.erl");
        assert_eq!(base("rebar.config"), "rebar.config");
    }
}
