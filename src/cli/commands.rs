use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Build dependency graph synthesis for Erlang/OTP applications
#[derive(Parser, Debug)]
#[command(
    name = "beamgraph",
    about = "Build dependency graph synthesis for Erlang/OTP applications",
    version,
    author,
    long_about = "beamgraph reads the sources of an Erlang/OTP application and emits one \
                  compilation unit per source file, with explicit edges to the headers, \
                  sibling modules and other applications it depends on."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(
        short = 'v',
        long,
        global = true,
        help = "Increase verbosity (debug logging)"
    )]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Generate the build plan for an application",
        long_about = "Parses every source of the application, resolves its includes, module \
                      references and calls, and prints the resulting build plan.\n\n\
                      Examples:\n  \
                      beamgraph generate\n  \
                      beamgraph generate apps/shop --index moduleindex.yaml\n  \
                      beamgraph generate --format json --output plan.json"
    )]
    Generate(GenerateArgs),

    #[command(
        about = "Show how application files are classified",
        long_about = "Lists every file of the application together with the role it plays \
                      (source, private header, public header, test source, ...).\n\n\
                      Examples:\n  \
                      beamgraph classify\n  \
                      beamgraph classify apps/shop --format yaml"
    )]
    Classify(ClassifyArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct GenerateArgs {
    #[arg(
        value_name = "APP_DIR",
        help = "Path to the application (defaults to current directory)"
    )]
    pub app_dir: Option<PathBuf>,

    #[arg(
        short = 'n',
        long,
        value_name = "NAME",
        help = "Application name (defaults to the directory name)"
    )]
    pub name: Option<String>,

    #[arg(
        short = 'i',
        long,
        value_name = "PATH",
        help = "Module index file (overrides BEAMGRAPH_MODULE_INDEX)"
    )]
    pub index: Option<PathBuf>,

    #[arg(
        short = 'c',
        long,
        value_name = "PATH",
        help = "Config file (defaults to <APP_DIR>/beamgraph.yaml)"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write output to file instead of stdout"
    )]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct ClassifyArgs {
    #[arg(
        value_name = "APP_DIR",
        help = "Path to the application (defaults to current directory)"
    )]
    pub app_dir: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}
