use clap::Parser;
use securefs_build_cli::args::Cli;
use securefs_build_cli::config::{self, ConfigMerger};
use securefs_build_core::adapters::{ProcessRunner, SystemHostEnv};
use securefs_build_core::error::TOOL_FAILURE_EXIT;
use securefs_build_core::pipeline::{BuildOutcome, run_build};
use securefs_build_core::{BuildError, BuildResult};
use std::io::IsTerminal;
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .without_time()
        .init();

    // Parse errors are invalid arguments; --help and --version are not errors.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { TOOL_FAILURE_EXIT } else { 0 };
            if let Err(io) = e.print() {
                error!("write usage: {io}");
            }
            return ExitCode::from(code);
        }
    };

    match real_main(cli) {
        Ok(outcome) => {
            println!(
                "Build succeeds. Please copy the binary somewhere in your PATH: {}",
                outcome.binary
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn real_main(cli: Cli) -> BuildResult<BuildOutcome> {
    let source_dir = securefs_build_cli::source_dir();

    let file_config = config::load_or_default(cli.config.as_deref(), &source_dir)
        .map_err(|e| BuildError::invalid_argument(format!("{e:#}")))?;
    let options = ConfigMerger::new(file_config).merge_cli(&cli);
    debug!(?options, source_dir = %source_dir, "merged options");

    let config = options.resolve(source_dir)?;
    run_build(&config, &SystemHostEnv, &ProcessRunner)
}
