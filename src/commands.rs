pub mod comments;
pub mod export_session;
pub mod import_session;
pub mod profile;

use crate::client_data::ClientData;
use anyhow::Context;
use insta::FetchError;
use serde::Serialize;
use std::io::Write;
use tracing::warn;

#[derive(Debug, argh::FromArgs)]
#[argh(subcommand)]
pub enum SubCommand {
    Profile(self::profile::Options),
    Comments(self::comments::Options),
    ImportSession(self::import_session::Options),
    ExportSession(self::export_session::Options),
}

/// The arguments were valid syntax, but unusable.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct InvalidArguments(pub String);

/// A failure that is not tied to a single resource
#[derive(Debug, Serialize)]
pub struct ErrorOutput {
    pub error: &'static str,
    pub message: String,
}

impl ErrorOutput {
    pub fn new(error: &'static str, message: impl Into<String>) -> Self {
        Self {
            error,
            message: message.into(),
        }
    }
}

/// Run a subcommand
pub async fn exec(client_data: &ClientData, subcommand: SubCommand) -> anyhow::Result<()> {
    match subcommand {
        SubCommand::Profile(options) => self::profile::exec(client_data, options).await,
        SubCommand::Comments(options) => self::comments::exec(client_data, options).await,
        SubCommand::ImportSession(options) => {
            self::import_session::exec(client_data, options).await
        }
        SubCommand::ExportSession(options) => {
            self::export_session::exec(client_data, options).await
        }
    }
}

/// Get the account or fail with [`InvalidArguments`].
fn require_account(client_data: &ClientData) -> anyhow::Result<&str> {
    client_data.account().ok_or_else(|| {
        InvalidArguments(
            "no account, pass `--account` or set `account` in the config".to_string(),
        )
        .into()
    })
}

/// Write a value to the stdout as a single line of json.
pub fn print_json<T>(value: &T) -> anyhow::Result<()>
where
    T: Serialize + ?Sized,
{
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    serde_json::to_writer(&mut lock, value).context("failed to serialize output")?;
    lock.write_all(b"\n").context("failed to write output")?;
    lock.flush().context("failed to flush output")?;

    Ok(())
}

/// Print a fetch result.
///
/// Fetch failures are results too, so they go to the stdout.
fn print_result<T>(result: &Result<T, FetchError>) -> anyhow::Result<()>
where
    T: Serialize,
{
    match result {
        Ok(value) => print_json(value),
        Err(error) => {
            warn!("{error}");
            print_json(error)
        }
    }
}
