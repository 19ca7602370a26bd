use crate::config::Config;
use anyhow::Context;
use insta::{
    AcquiredSession,
    Client,
    Session,
    SessionStore,
};
use std::time::Duration;
use tracing::{
    info,
    warn,
};

/// The [`ClientData`].
#[derive(Debug)]
pub struct ClientData {
    /// The loaded config
    pub config: Config,

    /// The session store
    pub session_store: SessionStore,
}

impl ClientData {
    /// Init the client data.
    ///
    /// An `account` passed on the command line overrides the config.
    pub fn init(mut config: Config, account: Option<String>) -> anyhow::Result<Self> {
        if account.is_some() {
            config.account = account;
        }

        let session_dir = match config.session_dir.as_ref() {
            Some(session_dir) => session_dir.clone().into_std_path_buf(),
            None => SessionStore::default_dir().context("failed to locate the session dir")?,
        };
        let session_store = SessionStore::new(session_dir);

        Ok(Self {
            config,
            session_store,
        })
    }

    /// The account whose session is used
    pub fn account(&self) -> Option<&str> {
        self.config.account()
    }

    /// The account probed when validating a session
    pub fn probe_account(&self) -> Option<&str> {
        self.config.probe_account()
    }

    /// The per-request timeout
    pub fn request_timeout(&self) -> Duration {
        self.config.request_timeout()
    }

    /// Try to load a stored session for the account.
    ///
    /// Browsers are never opened here.
    pub async fn acquire_session(&self) -> anyhow::Result<Option<AcquiredSession>> {
        let account = match self.account() {
            Some(account) => account.to_string(),
            None => {
                info!("no account configured, continuing without a session");
                return Ok(None);
            }
        };

        let session_store = self.session_store.clone();
        let result = tokio::task::spawn_blocking(move || session_store.acquire(&account, &[]))
            .await
            .context("failed to join session task")?;

        match result {
            Ok(session) => {
                info!("using session from {}", session.source);
                Ok(Some(session))
            }
            Err(error) => {
                info!("continuing without a session: {error}");
                Ok(None)
            }
        }
    }

    /// Make an api client, logged in if a session is available.
    pub async fn client(&self) -> anyhow::Result<Client> {
        let timeout = self.request_timeout();

        if let Some(acquired) = self.acquire_session().await? {
            match Session::new(acquired.credentials) {
                Ok(session) => {
                    return Client::with_session(session, timeout)
                        .context("failed to build logged in client");
                }
                Err(error) => {
                    warn!("session from {} is unusable: {error}", acquired.source);
                }
            }
        }

        Client::new(timeout).context("failed to build client")
    }
}
