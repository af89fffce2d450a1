use std::process::ExitCode;

use clap::Parser;

use engram::commands::{self, Commands};
use engram::output::{print_json, ErrorResponse};
use engram::{Config, MemoryService};

/// engram - a semantic memory store for AI agents
#[derive(Parser)]
#[command(name = "engram", version, about, long_about = None)]
struct Cli {
    /// Emit machine-readable JSON output
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            if cli.json {
                print_json(&ErrorResponse {
                    error: e.to_string(),
                });
            } else {
                eprintln!("Error: {e}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode, engram::Error> {
    let config = Config::load()?;
    config.ensure_directories()?;
    let service = MemoryService::new(&config)?;
    commands::execute(&cli.command, &service, cli.json)
}
