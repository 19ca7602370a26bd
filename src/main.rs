#![deny(
    unused_import_braces,
    unused_lifetimes,
    unreachable_pub,
    trivial_numeric_casts,
    missing_debug_implementations,
    missing_copy_implementations,
    deprecated_in_future,
    meta_variable_misuse,
    non_ascii_idents,
    rust_2018_compatibility,
    rust_2018_idioms,
    future_incompatible,
    nonstandard_style,
    clippy::all
)]
#![warn(variant_size_differences, let_underscore_drop)]

//! # insta-analyzer
//!
//! Fetches instagram profiles, videos, and comments and prints them as json.

pub mod cli_options;
pub mod client_data;
pub mod commands;
pub mod config;
pub mod logger;
pub mod setup;

use crate::{
    cli_options::CliOptions,
    client_data::ClientData,
    commands::{
        ErrorOutput,
        InvalidArguments,
    },
    config::Config,
};
use anyhow::Context as _;
use std::process::ExitCode;
use tokio::runtime::Builder as RuntimeBuilder;
use tracing::{
    debug,
    error,
};
use tracing_appender::non_blocking::WorkerGuard;

/// Data from the setup step
struct SetupData {
    tokio_rt: tokio::runtime::Runtime,
    config: Config,
    worker_guard: Option<WorkerGuard>,
}

/// Pre-main setup
fn setup(cli_options: &CliOptions) -> anyhow::Result<SetupData> {
    let config_path = setup::resolve_config_path(cli_options.config.as_deref());
    let config = setup::load_config(config_path.as_deref()).context("failed to load config")?;

    let worker_guard = logger::setup(&config).context("failed to initialize logger")?;

    let tokio_rt = RuntimeBuilder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start tokio runtime")?;

    Ok(SetupData {
        tokio_rt,
        config,
        worker_guard,
    })
}

/// Report a failure that has no fetch result as json.
fn print_error(error: &'static str, message: impl Into<String>) {
    if let Err(e) = commands::print_json(&ErrorOutput::new(error, message)) {
        eprintln!("{e:?}");
    }
}

fn main() -> ExitCode {
    // This line MUST run first.
    // Invalid options are reported before anything is set up.
    let cli_options = match CliOptions::parse_env() {
        Ok(cli_options) => cli_options,
        Err(early_exit) => {
            return match early_exit.status {
                Ok(()) => {
                    println!("{}", early_exit.output);
                    ExitCode::SUCCESS
                }
                Err(()) => {
                    print_error("InvalidArguments", early_exit.output.trim());
                    ExitCode::FAILURE
                }
            };
        }
    };

    let setup_data = match setup(&cli_options) {
        Ok(setup_data) => setup_data,
        Err(e) => {
            eprintln!("{e:?}");
            print_error("SetupFailed", format!("{e:#}"));
            return ExitCode::FAILURE;
        }
    };

    real_main(cli_options, setup_data)
}

/// The actual entry point
fn real_main(cli_options: CliOptions, setup_data: SetupData) -> ExitCode {
    let SetupData {
        tokio_rt,
        config,
        worker_guard,
    } = setup_data;

    let ret = tokio_rt.block_on(async_main(cli_options, config));
    drop(tokio_rt);

    let exit_code = match ret {
        Ok(()) => {
            debug!("done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e:?}");
            let kind = if e.is::<InvalidArguments>() {
                "InvalidArguments"
            } else {
                "InternalError"
            };
            print_error(kind, format!("{e:#}"));
            ExitCode::FAILURE
        }
    };

    // Logging no longer reliable past this point
    drop(worker_guard);

    exit_code
}

/// The async entry
async fn async_main(cli_options: CliOptions, config: Config) -> anyhow::Result<()> {
    let client_data = ClientData::init(config, cli_options.account)
        .context("client data initialization failed")?;

    commands::exec(&client_data, cli_options.subcommand).await
}
