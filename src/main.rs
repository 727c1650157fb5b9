use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod diff;
mod error;
mod fetch;
mod format;
mod model;
mod output;
mod overrides;
mod render;
mod version;
mod workflow;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = cli::RootArgs::parse();
    let result = match args.command {
        cli::Command::Generate(args) => workflow::run_generate(args),
        cli::Command::Normalize(args) => workflow::run_normalize(args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Fatal errors are reported on stdout with the full chain.
            println!("{err:?}");
            ExitCode::FAILURE
        }
    }
}
