//! Attribute and remote-call extraction for Erlang sources
//!
//! This is a scanner, not a full parser: the file is split into forms at
//! each terminating `.`, comments are dropped, and string contents are
//! blanked before remote calls are matched. Conditional compilation
//! directives are evaluated against the macro set so that, for example,
//! `-ifdef(TEST).` sections only contribute facts when `TEST` is defined.

use super::{Macros, ParseError, SourceFacts, SourceParser};
use crate::fs::FileSystem;
use anyhow::Result;
use regex::Regex;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::trace;

const ATOM: &str = r"'(?:[^'\\]|\\.)+'|[a-z][A-Za-z0-9_@]*";

struct Patterns {
    attribute: Regex,
    atom: Regex,
    string: Regex,
    remote_call: Regex,
    fun_ref: Regex,
    parse_transform: Regex,
}

impl Patterns {
    fn new() -> Result<Self> {
        Ok(Self {
            attribute: Regex::new(r"(?s)^-\s*([a-z_]+)\s*(.*)$")?,
            atom: Regex::new(&format!(r"^\s*({})", ATOM))?,
            string: Regex::new(r#""((?:[^"\\]|\\.)*)""#)?,
            remote_call: Regex::new(&format!(r"({})\s*:\s*({})\s*\(", ATOM, ATOM))?,
            fun_ref: Regex::new(&format!(r"\bfun\s+({})\s*:\s*({})\s*/", ATOM, ATOM))?,
            parse_transform: Regex::new(&format!(r"parse_transform\s*,\s*({})", ATOM))?,
        })
    }
}

/// One top-level form. `text` has comments removed, `code` additionally
/// has string literal contents removed.
#[derive(Debug)]
struct Form {
    text: String,
    code: String,
    line: usize,
}

#[derive(Debug, Clone, Copy)]
struct Branch {
    parent_active: bool,
    taken: bool,
    active: bool,
}

pub struct ErlAttrParser {
    fs: Arc<dyn FileSystem>,
    root: PathBuf,
    patterns: Patterns,
}

impl ErlAttrParser {
    /// Parser reading package-relative paths below `root`
    pub fn new(fs: Arc<dyn FileSystem>, root: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            fs,
            root: root.into(),
            patterns: Patterns::new()?,
        })
    }

    /// Extracts facts from already-loaded source text
    pub fn parse_source(
        &self,
        path: &Path,
        source: &str,
        macros: &Macros,
    ) -> Result<SourceFacts, ParseError> {
        let forms = split_forms(path, source)?;
        let mut facts = SourceFacts::default();
        let mut defined: BTreeSet<String> = macros.keys().cloned().collect();
        let mut branches: Vec<Branch> = Vec::new();

        for form in forms {
            let active = branches.last().map_or(true, |b| b.active);
            let text = form.text.trim();

            let Some(caps) = self.patterns.attribute.captures(text) else {
                if active {
                    self.collect_calls(&form.code, &mut facts);
                }
                continue;
            };
            let name = caps.get(1).map_or("", |m| m.as_str());
            let rest = caps.get(2).map_or("", |m| m.as_str().trim());
            let args = rest
                .strip_prefix('(')
                .and_then(|r| r.strip_suffix(')'))
                .unwrap_or(rest);

            match name {
                "ifdef" | "ifndef" => {
                    let is_defined =
                        macro_name(args).is_some_and(|macro_name| defined.contains(&macro_name));
                    let cond = if name == "ifdef" { is_defined } else { !is_defined };
                    branches.push(Branch {
                        parent_active: active,
                        taken: cond,
                        active: active && cond,
                    });
                }
                // Expressions are not evaluated; assume the branch is live
                "if" => branches.push(Branch {
                    parent_active: active,
                    taken: true,
                    active,
                }),
                "elif" | "else" => {
                    let branch = branches.last_mut().ok_or_else(|| {
                        ParseError::UnbalancedConditional {
                            path: path.to_path_buf(),
                            line: form.line,
                            directive: name.to_string(),
                        }
                    })?;
                    branch.active = branch.parent_active && !branch.taken;
                    branch.taken = true;
                }
                "endif" => {
                    if branches.pop().is_none() {
                        return Err(ParseError::UnbalancedConditional {
                            path: path.to_path_buf(),
                            line: form.line,
                            directive: name.to_string(),
                        });
                    }
                }
                _ if !active => {}
                "include" => facts.includes.extend(self.first_string(args)),
                "include_lib" => facts.include_libs.extend(self.first_string(args)),
                "behaviour" | "behavior" => {
                    if let Some(module) = self.first_atom(args) {
                        facts.modules.add(module);
                    }
                }
                "compile" => {
                    for caps in self.patterns.parse_transform.captures_iter(args) {
                        if let Some(m) = caps.get(1) {
                            facts.modules.add(unquote(m.as_str()));
                        }
                    }
                }
                "import" => {
                    if let Some(module) = self.first_atom(args) {
                        facts.calls.add(module);
                    }
                }
                "define" => {
                    if let Some(macro_name) = macro_name(args) {
                        defined.insert(macro_name);
                    }
                    self.collect_calls(&form.code, &mut facts);
                }
                "undef" => {
                    if let Some(macro_name) = macro_name(args) {
                        defined.remove(&macro_name);
                    }
                }
                _ => {}
            }
        }

        if !branches.is_empty() {
            return Err(ParseError::Unterminated {
                path: path.to_path_buf(),
                line: source.lines().count(),
                what: "conditional block",
            });
        }

        trace!(
            path = %path.display(),
            includes = facts.includes.len(),
            include_libs = facts.include_libs.len(),
            modules = facts.modules.len(),
            calls = facts.calls.len(),
            "Parsed source"
        );
        Ok(facts)
    }

    fn collect_calls(&self, code: &str, facts: &mut SourceFacts) {
        for caps in self.patterns.remote_call.captures_iter(code) {
            let (Some(whole), Some(module)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            // the module atom must start a token: `Xmod:f(` or `?MOD:f(` are not calls
            let preceded_by_ident = code[..whole.start()]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_alphanumeric() || matches!(c, '_' | '@' | '?' | '#' | '.'));
            if !preceded_by_ident {
                facts.calls.add(unquote(module.as_str()));
            }
        }
        for caps in self.patterns.fun_ref.captures_iter(code) {
            if let Some(module) = caps.get(1) {
                facts.calls.add(unquote(module.as_str()));
            }
        }
    }

    fn first_atom(&self, args: &str) -> Option<String> {
        self.patterns
            .atom
            .captures(args)
            .and_then(|caps| caps.get(1))
            .map(|m| unquote(m.as_str()))
    }

    fn first_string(&self, args: &str) -> Option<String> {
        self.patterns
            .string
            .captures(args)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }
}

impl SourceParser for ErlAttrParser {
    fn parse(&self, path: &str, macros: &Macros) -> Result<SourceFacts, ParseError> {
        let full_path = self.root.join(path);
        let source = self
            .fs
            .read_to_string(&full_path)
            .map_err(|e| ParseError::Read {
                path: PathBuf::from(path),
                reason: format!("{:#}", e),
            })?;
        self.parse_source(Path::new(path), &source, macros)
    }
}

fn unquote(atom: &str) -> String {
    atom.strip_prefix('\'')
        .and_then(|a| a.strip_suffix('\''))
        .unwrap_or(atom)
        .to_string()
}

fn macro_name(args: &str) -> Option<String> {
    let name: String = args
        .trim_start()
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == '@')
        .collect();
    (!name.is_empty()).then_some(name)
}

fn split_forms(path: &Path, source: &str) -> Result<Vec<Form>, ParseError> {
    let mut forms = Vec::new();
    let mut text = String::new();
    let mut code = String::new();
    let mut form_line = 0;
    let mut line = 1;
    let mut quote: Option<(char, usize)> = None;
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\n' {
            line += 1;
        }

        if let Some((q, _)) = quote {
            text.push(c);
            if q == '\'' {
                code.push(c);
            }
            if c == '\\' {
                if let Some(escaped) = chars.next() {
                    if escaped == '\n' {
                        line += 1;
                    }
                    text.push(escaped);
                    if q == '\'' {
                        code.push(escaped);
                    }
                }
            } else if c == q {
                if q == '"' {
                    code.push('"');
                }
                quote = None;
            }
            continue;
        }

        if text.trim().is_empty() && !c.is_whitespace() {
            form_line = line;
        }

        match c {
            '%' => {
                while let Some(&next) = chars.peek() {
                    if next == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            '$' => {
                text.push(c);
                code.push(c);
                if let Some(literal) = chars.next() {
                    if literal == '\n' {
                        line += 1;
                    }
                    text.push(literal);
                    code.push(literal);
                    if literal == '\\' {
                        if let Some(escaped) = chars.next() {
                            text.push(escaped);
                            code.push(escaped);
                        }
                    }
                }
            }
            '"' | '\'' => {
                quote = Some((c, line));
                text.push(c);
                code.push(c);
            }
            '.' if chars.peek().map_or(true, |n| n.is_whitespace() || *n == '%') => {
                forms.push(Form {
                    text: std::mem::take(&mut text),
                    code: std::mem::take(&mut code),
                    line: form_line,
                });
            }
            _ => {
                text.push(c);
                code.push(c);
            }
        }
    }

    if let Some((q, start)) = quote {
        return Err(ParseError::Unterminated {
            path: path.to_path_buf(),
            line: start,
            what: if q == '"' { "string" } else { "quoted atom" },
        });
    }

    if !text.trim().is_empty() {
        forms.push(Form {
            text,
            code,
            line: form_line,
        });
    }

    Ok(forms)
}
