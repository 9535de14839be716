use std::process;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod domain;
mod error;
mod services;
mod store;

use cli::Cli;
use domain::models::{ErrorBody, JsonErr};
use error::StoreError;
use store::StoreClient;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    if let Err(e) = run(&cli) {
        report_error(cli.json, &e);
        process::exit(exit_code(&e));
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let client = StoreClient::new(
        &cli.storeurl,
        cli.username.clone(),
        cli.password.clone(),
        Duration::from_secs(cli.timeout),
    )?;
    commands::handle_runtime_commands(cli, &client)
}

/// Errors go to stderr as one line, or to stdout as the JSON error
/// envelope when `--json` asked for machine-readable output.
fn report_error(json: bool, err: &anyhow::Error) {
    if json {
        let envelope = JsonErr {
            ok: false,
            error: ErrorBody {
                code: error_code(err),
                message: format!("{err:#}"),
            },
        };
        match serde_json::to_string_pretty(&envelope) {
            Ok(out) => println!("{out}"),
            Err(_) => eprintln!("Error: {err:#}"),
        }
    } else {
        eprintln!("Error: {err:#}");
    }
}

fn error_code(err: &anyhow::Error) -> &'static str {
    err.downcast_ref::<StoreError>()
        .map(StoreError::code)
        .unwrap_or("ERROR")
}

fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<StoreError>()
        .map(StoreError::exit_code)
        .unwrap_or(1)
}

fn init_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => EnvFilter::new("chrisstoreclient=warn"),
        1 => EnvFilter::new("chrisstoreclient=info"),
        2 => EnvFilter::new("chrisstoreclient=debug"),
        _ => EnvFilter::new("chrisstoreclient=trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
