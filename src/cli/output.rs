//! Output formatting for multiple formats
//!
//! Build plans and classifications can be written as JSON, YAML or a
//! human-readable summary.
//!
//! # Example
//!
//! ```ignore
//! use beamgraph::cli::output::{OutputFormat, OutputFormatter};
//!
//! let formatter = OutputFormatter::new(OutputFormat::Json);
//! let output = formatter.format_plan(&plan)?;
//! println!("{}", output);
//! ```

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::app::{Application, FileRole};
use crate::synth::{BuildPlan, CompilationUnit};

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format (human-friendly, version-control friendly)
    Yaml,
    /// Human-readable formatted text
    Human,
}

/// Files of an application grouped by role
#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    pub app_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub files: BTreeMap<FileRole, Vec<String>>,
}

impl Classification {
    pub fn from_app(app: &Application) -> Self {
        let roles = [
            FileRole::Source,
            FileRole::PrivateHeader,
            FileRole::PublicHeader,
            FileRole::AppDescriptor,
            FileRole::AppSource,
            FileRole::TestSource,
            FileRole::TestHeader,
            FileRole::Resource,
            FileRole::License,
        ];
        let files = roles
            .into_iter()
            .filter(|role| !app.files(*role).is_empty())
            .map(|role| (role, app.files(role).values()))
            .collect();
        Self {
            app_name: app.name.clone(),
            version: app.version.clone(),
            files,
        }
    }
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_plan(&self, plan: &BuildPlan) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(plan).context("Failed to serialize build plan to JSON")
            }
            OutputFormat::Yaml => {
                serde_yaml::to_string(plan).context("Failed to serialize build plan to YAML")
            }
            OutputFormat::Human => Ok(self.format_plan_human(plan)),
        }
    }

    pub fn format_classification(&self, classification: &Classification) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(classification)
                .context("Failed to serialize classification to JSON"),
            OutputFormat::Yaml => serde_yaml::to_string(classification)
                .context("Failed to serialize classification to YAML"),
            OutputFormat::Human => Ok(self.format_classification_human(classification)),
        }
    }

    // Human-readable formatting methods

    fn format_plan_human(&self, plan: &BuildPlan) -> String {
        let mut output = String::new();
        let app = &plan.erlang_app;

        let _ = writeln!(output, "\u{2713} Build Plan: {}", plan.app_name);
        let _ = writeln!(output, "{}\n", RULE);
        if let Some(version) = &app.app_version {
            let _ = writeln!(output, "Version:      {}", version);
        }
        if let Some(description) = &app.app_description {
            let _ = writeln!(output, "Description:  {}", description);
        }
        let _ = writeln!(
            output,
            "Dependencies: {}",
            if app.deps.is_empty() {
                "(none)".to_string()
            } else {
                app.deps.join(", ")
            }
        );
        if !app.extra_apps.is_empty() {
            let _ = writeln!(output, "Extra apps:   {}", app.extra_apps.join(", "));
        }
        output.push('\n');

        write_units(&mut output, "Modules", &plan.units);
        write_units(&mut output, "Test modules", &plan.test_dir_units);

        if !plan.suites.is_empty() {
            output.push_str("Suites:\n");
            for suite in &plan.suites {
                let _ = writeln!(output, "\u{251C}\u{2500} {}  deps: {}", suite.name, suite.deps.join(", "));
            }
            output.push('\n');
        }

        if let Some(eunit) = &plan.eunit {
            let matched: Vec<String> = eunit
                .modules
                .iter()
                .filter_map(|(module, label)| label.as_ref().map(|l| format!("{} <- {}", module, l)))
                .collect();
            if !matched.is_empty() {
                output.push_str("Unit tests:\n");
                for line in matched {
                    let _ = writeln!(output, "\u{251C}\u{2500} {}", line);
                }
                output.push('\n');
            }
        }

        let _ = writeln!(
            output,
            "{} compilation units ({} production, {} test build, {} test directory)",
            plan.unit_count(),
            plan.units.len(),
            plan.test_units.len(),
            plan.test_dir_units.len()
        );
        output
    }

    fn format_classification_human(&self, classification: &Classification) -> String {
        let mut output = String::new();
        let _ = writeln!(output, "Application: {}", classification.app_name);
        let _ = writeln!(output, "{}\n", RULE);
        for (role, files) in &classification.files {
            let _ = writeln!(output, "{} ({}):", role, files.len());
            for (i, file) in files.iter().enumerate() {
                let connector = if i == files.len() - 1 { "\u{2514}" } else { "\u{251C}" };
                let _ = writeln!(output, "{}\u{2500} {}", connector, file);
            }
            output.push('\n');
        }
        output
    }
}

fn write_units(output: &mut String, title: &str, units: &[CompilationUnit]) {
    if units.is_empty() {
        return;
    }
    let _ = writeln!(output, "{}:", title);
    for unit in units {
        let _ = writeln!(output, "\u{251C}\u{2500} {} -> {}", unit.src, unit.out);
        for (label, set) in [
            ("hdrs", &unit.hdrs),
            ("beam", &unit.beam),
            ("deps", &unit.deps),
            ("runtime_beam", &unit.runtime_beam),
            ("runtime_deps", &unit.runtime_deps),
        ] {
            if !set.is_empty() {
                let _ = writeln!(output, "\u{2502}    {}: {}", label, set.values().join(", "));
            }
        }
    }
    output.push('\n');
}
