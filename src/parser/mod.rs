//! Source fact extraction
//!
//! Resolution never reads source text itself. It consumes a [`SourceFacts`]
//! record per file, produced by a [`SourceParser`] for a given set of
//! preprocessor macros. [`ErlAttrParser`] is the bundled implementation.

mod erl;

pub use erl::ErlAttrParser;

use crate::util::OrderedSet;
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

/// Macro definitions in effect while parsing: name -> optional value
pub type Macros = BTreeMap<String, Option<String>>;

/// Syntactic facts about one source file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceFacts {
    /// `-include("...")` references, in source order
    pub includes: Vec<String>,
    /// `-include_lib("...")` references, in source order
    pub include_libs: Vec<String>,
    /// Modules referenced without being called: behaviours, parse transforms
    pub modules: OrderedSet<String>,
    /// Modules with at least one remote call or import
    pub calls: OrderedSet<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Failed to read {path:?}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("{path:?}:{line}: unterminated {what}")]
    Unterminated {
        path: PathBuf,
        line: usize,
        what: &'static str,
    },

    #[error("{path:?}:{line}: -{directive} without matching -ifdef/-ifndef")]
    UnbalancedConditional {
        path: PathBuf,
        line: usize,
        directive: String,
    },
}

/// Turns a file into its fact record
pub trait SourceParser: Send + Sync {
    fn parse(&self, path: &str, macros: &Macros) -> Result<SourceFacts, ParseError>;
}

/// Macros defined by compiler options: `-DNAME` and `-DNAME=VALUE`
pub fn macros<'a>(opts: impl IntoIterator<Item = &'a String>) -> Macros {
    let mut result = Macros::new();
    for opt in opts {
        if let Some(def) = opt.strip_prefix("-D") {
            match def.split_once('=') {
                Some((name, value)) => result.insert(name.to_string(), Some(value.to_string())),
                None => result.insert(def.to_string(), None),
            };
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macros_from_opts() {
        let opts = vec![
            "+debug_info".to_string(),
            "-DTEST=1".to_string(),
            "-DNO_TLS".to_string(),
        ];
        let macros = macros(&opts);
        assert_eq!(macros.len(), 2);
        assert_eq!(macros.get("TEST"), Some(&Some("1".to_string())));
        assert_eq!(macros.get("NO_TLS"), Some(&None));
    }

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::Unterminated {
            path: PathBuf::from("src/a.erl"),
            line: 3,
            what: "string",
        };
        assert_eq!(err.to_string(), "\"src/a.erl\":3: unterminated string");
    }
}
