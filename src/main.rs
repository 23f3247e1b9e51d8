use beamgraph::cli::commands::{CliArgs, Commands};
use beamgraph::cli::handlers::{handle_classify, handle_generate};
use beamgraph::util::logging::{init_logging, LoggingConfig};
use beamgraph::VERSION;

use clap::Parser;
use tracing::debug;

fn main() {
    let args = CliArgs::parse();

    let logging = match LoggingConfig::from_env().with_flags(
        args.log_level.as_deref(),
        args.verbose,
        args.quiet,
    ) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    init_logging(logging);

    debug!("beamgraph v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Generate(generate_args) => handle_generate(generate_args),
        Commands::Classify(classify_args) => handle_classify(classify_args),
    };

    std::process::exit(exit_code);
}
