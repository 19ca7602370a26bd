use super::{
    print_json,
    require_account,
    ErrorOutput,
};
use crate::client_data::ClientData;
use anyhow::Context;
use insta::{
    validate_session,
    Browser,
    Client,
    CookieSource,
    Error,
    Session,
    SessionSource,
};
use serde::Serialize;
use std::path::PathBuf;
use tokio::runtime::Handle;
use tracing::{
    info,
    warn,
};

#[derive(Debug, argh::FromArgs)]
#[argh(
    subcommand,
    name = "import-session",
    description = "import a logged in session from a browser"
)]
pub struct Options {
    #[argh(
        option,
        long = "browser",
        description = "a browser to try, may be repeated to set the order"
    )]
    pub browsers: Vec<Browser>,
}

#[derive(Debug, Serialize)]
struct ImportOutput<'a> {
    account: &'a str,
    browser: String,
    path: PathBuf,
}

pub async fn exec(client_data: &ClientData, options: Options) -> anyhow::Result<()> {
    let account = require_account(client_data)?;
    let probe_account = client_data
        .probe_account()
        .unwrap_or(account)
        .to_string();
    let timeout = client_data.request_timeout();

    let browsers = if options.browsers.is_empty() {
        client_data.config.browsers().to_vec()
    } else {
        options.browsers
    };
    info!(
        "trying {}",
        browsers
            .iter()
            .map(|browser| browser.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    let sources: Vec<Box<dyn CookieSource>> = browsers
        .into_iter()
        .map(|browser| Box::new(browser) as Box<dyn CookieSource>)
        .collect();

    let session_store = client_data.session_store.clone();
    let owned_account = account.to_string();
    let handle = Handle::current();

    // The runtime thread keeps driving io while this blocks on validation.
    let result = tokio::task::spawn_blocking(move || {
        session_store
            .import(&owned_account, &sources, |credentials| {
                let client = match Session::new(credentials.clone())
                    .and_then(|session| Client::with_session(session, timeout))
                {
                    Ok(client) => client,
                    Err(error) => {
                        warn!("session is unusable: {error}");
                        return false;
                    }
                };

                handle.block_on(validate_session(&client, &probe_account))
            })
            .map(|session| (session, session_store.session_path(&owned_account)))
    })
    .await
    .context("failed to join import task")?;

    match result {
        Ok((session, path)) => {
            let browser = match session.source {
                SessionSource::Browser(name) => name,
                source => source.to_string(),
            };
            print_json(&ImportOutput {
                account,
                browser,
                path,
            })
        }
        Err(Error::NoSessionAvailable) => print_json(&ErrorOutput::new(
            Error::NoSessionAvailable.kind().as_str(),
            "no browser had a valid instagram session",
        )),
        Err(error) => print_json(&ErrorOutput::new(
            error.kind().as_str(),
            format!("failed to import a session: {error}"),
        )),
    }
}
