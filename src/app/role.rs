//! File role classification by path convention

use serde::Serialize;
use std::fmt;

/// Role a file plays inside an application, decided from its
/// package-relative path alone
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileRole {
    /// `src/*.erl`
    Source,
    /// `src/*.hrl`
    PrivateHeader,
    /// `include/*.hrl`
    PublicHeader,
    /// `ebin/*.app`
    AppDescriptor,
    /// `src/*.app.src`
    AppSource,
    /// `test/*.erl`
    TestSource,
    /// `test/*.hrl`
    TestHeader,
    /// anything under `priv/`
    Resource,
    /// top-level `LICENSE*`
    License,
}

impl FileRole {
    /// Classifies a package-relative path, `None` for files that play no role
    pub fn classify(path: &str) -> Option<FileRole> {
        if let Some(rest) = path.strip_prefix("ebin/") {
            // .appup files are not tracked
            return rest.ends_with(".app").then_some(FileRole::AppDescriptor);
        }
        if path.starts_with("src/") {
            if path.ends_with(".erl") {
                return Some(FileRole::Source);
            }
            if path.ends_with(".hrl") {
                return Some(FileRole::PrivateHeader);
            }
            if path.ends_with(".app.src") {
                return Some(FileRole::AppSource);
            }
            return None;
        }
        if path.starts_with("include/") {
            return path.ends_with(".hrl").then_some(FileRole::PublicHeader);
        }
        if path.starts_with("test/") {
            if path.ends_with(".erl") {
                return Some(FileRole::TestSource);
            }
            if path.ends_with(".hrl") {
                return Some(FileRole::TestHeader);
            }
            return None;
        }
        if path.starts_with("priv/") {
            return Some(FileRole::Resource);
        }
        if path.starts_with("LICENSE") {
            return Some(FileRole::License);
        }
        None
    }

    pub fn is_header(&self) -> bool {
        matches!(
            self,
            FileRole::PrivateHeader | FileRole::PublicHeader | FileRole::TestHeader
        )
    }
}

impl fmt::Display for FileRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileRole::Source => "source",
            FileRole::PrivateHeader => "private_header",
            FileRole::PublicHeader => "public_header",
            FileRole::AppDescriptor => "app_descriptor",
            FileRole::AppSource => "app_source",
            FileRole::TestSource => "test_source",
            FileRole::TestHeader => "test_header",
            FileRole::Resource => "resource",
            FileRole::License => "license",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    #[parameterized(
        source = { "src/foo.erl", Some(FileRole::Source) },
        nested_source = { "src/sub/foo.erl", Some(FileRole::Source) },
        private_header = { "src/foo.hrl", Some(FileRole::PrivateHeader) },
        app_source = { "src/foo.app.src", Some(FileRole::AppSource) },
        public_header = { "include/foo.hrl", Some(FileRole::PublicHeader) },
        include_other = { "include/foo.txt", None },
        app_descriptor = { "ebin/foo.app", Some(FileRole::AppDescriptor) },
        appup = { "ebin/foo.appup", None },
        test_source = { "test/foo_SUITE.erl", Some(FileRole::TestSource) },
        test_header = { "test/foo.hrl", Some(FileRole::TestHeader) },
        test_data = { "test/foo_SUITE_data/config.json", None },
        resource = { "priv/schema.sql", Some(FileRole::Resource) },
        license = { "LICENSE-APACHE2", Some(FileRole::License) },
        readme = { "README.md", None },
        src_other = { "src/foo.yrl", None },
    )]
    fn test_classify(path: &str, expected: Option<FileRole>) {
        assert_eq!(FileRole::classify(path), expected);
    }

    #[test]
    fn test_is_header() {
        assert!(FileRole::PublicHeader.is_header());
        assert!(FileRole::TestHeader.is_header());
        assert!(!FileRole::Source.is_header());
    }
}
