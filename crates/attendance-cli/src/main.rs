use std::io::IsTerminal;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod error;
mod resolve_cmd;
mod run_cmd;
mod shared;
mod storage;

use cli::{Cli, Commands};
use error::{CliError, OutputFormat, output_format_hint, parse_output_format, render_error};
use resolve_cmd::run_resolve;
use run_cmd::run_job;

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();
}

// JSON errors are the only output on stderr.
fn report(err: &CliError, output_format: OutputFormat) -> ExitCode {
    match output_format {
        OutputFormat::Json => debug!(kind = ?err.kind(), status = ?err.status(), "{}", err),
        OutputFormat::Text => error!(kind = ?err.kind(), status = ?err.status(), "{}", err),
    }
    render_error(err, output_format)
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run(args) => match run_job(args) {
            Ok(code) => code,
            Err(err) => report(&err, OutputFormat::Text),
        },
        Commands::Resolve(args) => {
            let fallback = output_format_hint(&args.output_format);
            let output_format = match parse_output_format(&args.output_format) {
                Ok(format) => format,
                Err(err) => return report(&err, fallback),
            };

            match run_resolve(args, output_format) {
                Ok(code) => code,
                Err(err) => report(&err, output_format),
            }
        }
    }
}
