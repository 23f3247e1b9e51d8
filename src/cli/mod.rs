pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{ClassifyArgs, CliArgs, Commands, GenerateArgs, OutputFormatArg};
pub use output::{Classification, OutputFormat, OutputFormatter};
