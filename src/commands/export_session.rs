use super::{
    print_json,
    require_account,
    ErrorOutput,
};
use crate::client_data::ClientData;
use anyhow::Context;
use insta::SESSION_ENV_VAR;
use serde::Serialize;

#[derive(Debug, Clone, Copy, argh::FromArgs)]
#[argh(
    subcommand,
    name = "export-session",
    description = "print the saved session, encoded for the INSTAGRAM_SESSION variable"
)]
pub struct Options {}

#[derive(Debug, Serialize)]
struct ExportOutput<'a> {
    account: &'a str,
    variable: &'static str,
    value: String,
}

pub async fn exec(client_data: &ClientData, _options: Options) -> anyhow::Result<()> {
    let account = require_account(client_data)?;

    let session_store = client_data.session_store.clone();
    let owned_account = account.to_string();
    let result = tokio::task::spawn_blocking(move || session_store.export_env(&owned_account))
        .await
        .context("failed to join export task")?;

    match result {
        Ok(value) => print_json(&ExportOutput {
            account,
            variable: SESSION_ENV_VAR,
            value,
        }),
        Err(error) => print_json(&ErrorOutput::new(
            error.kind().as_str(),
            format!("failed to export the session for `{account}`: {error}"),
        )),
    }
}
