//! Application metadata read from `src/<name>.app.src`

use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppMetadata {
    pub name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
}

struct Patterns {
    name: Regex,
    vsn: Regex,
    description: Regex,
}

fn string_property(key: &str) -> Regex {
    Regex::new(&format!(r#"\{{\s*{}\s*,\s*"((?:[^"\\]|\\.)*)"\s*\}}"#, key)).expect("valid regex")
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        name: Regex::new(r"\{\s*application\s*,\s*'?([a-z][A-Za-z0-9_@]*)'?").expect("valid regex"),
        vsn: string_property("vsn"),
        description: string_property("description"),
    })
}

fn first_capture(re: &Regex, content: &str) -> Option<String> {
    re.captures(content)?.get(1).map(|m| m.as_str().to_string())
}

impl AppMetadata {
    /// Extracts name, `vsn` and `description` from an application resource
    /// term. Unknown or dynamic values (e.g. `{vsn, git}`) are left unset.
    pub fn parse(content: &str) -> Self {
        let patterns = patterns();
        Self {
            name: first_capture(&patterns.name, content),
            version: first_capture(&patterns.vsn, content),
            description: first_capture(&patterns.description, content),
        }
    }
}
