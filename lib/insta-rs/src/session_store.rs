use crate::{
    CookieSource,
    CredentialSet,
    Error,
    COOKIE_DOMAIN,
    SESSION_ENV_VAR,
};
use base64::{
    engine::general_purpose,
    Engine as _,
};
use directories_next::ProjectDirs;
use std::{
    io::Write,
    path::{
        Path,
        PathBuf,
    },
};
use tracing::{
    debug,
    info,
    warn,
};

/// Where a session came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionSource {
    /// A persisted session file
    File(PathBuf),

    /// The `INSTAGRAM_SESSION` environment variable
    Environment,

    /// A browser cookie store, by source name
    Browser(String),
}

impl std::fmt::Display for SessionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "file `{}`", path.display()),
            Self::Environment => write!(f, "environment variable `{SESSION_ENV_VAR}`"),
            Self::Browser(name) => write!(f, "browser `{name}`"),
        }
    }
}

/// A complete credential set and where it came from
#[derive(Debug, Clone)]
pub struct AcquiredSession {
    pub credentials: CredentialSet,
    pub source: SessionSource,
}

/// Loads and persists credential sets.
///
/// Resolution order is the session file, then the environment, then browsers.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
    env_session: Option<String>,
}

impl SessionStore {
    /// Make a store rooted at `dir`.
    ///
    /// The environment session is read once, here.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            env_session: std::env::var(SESSION_ENV_VAR).ok(),
        }
    }

    /// Replace the environment session.
    pub fn with_env_session(mut self, env_session: Option<String>) -> Self {
        self.env_session = env_session;
        self
    }

    /// The default session dir for this platform.
    pub fn default_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "insta-analyzer").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// The dir session files live in
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The session file path for an account
    pub fn session_path(&self, account: &str) -> PathBuf {
        let account = account.replace(['/', '\\'], "_");
        self.dir.join(format!("session-{account}.json"))
    }

    /// Load the session file for an account.
    ///
    /// # Errors
    /// Fails with [`Error::NoSessionAvailable`] if the file is missing.
    /// Also fails if it is unreadable, unparsable, or incomplete.
    pub fn load_file(&self, account: &str) -> Result<CredentialSet, Error> {
        let data = match std::fs::read(self.session_path(account)) {
            Ok(data) => data,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::NoSessionAvailable);
            }
            Err(error) => return Err(error.into()),
        };
        let credentials = CredentialSet::from_json_slice(&data)?;
        credentials.ensure_complete()?;

        Ok(credentials)
    }

    /// Load the session from the environment.
    ///
    /// # Errors
    /// Fails with [`Error::NoSessionAvailable`] if the variable is unset.
    pub fn load_env(&self) -> Result<CredentialSet, Error> {
        let encoded = self
            .env_session
            .as_deref()
            .map(str::trim)
            .filter(|encoded| !encoded.is_empty())
            .ok_or(Error::NoSessionAvailable)?;

        let data = general_purpose::STANDARD.decode(encoded)?;
        let credentials = CredentialSet::from_json_slice(&data)?;
        credentials.ensure_complete()?;

        Ok(credentials)
    }

    /// Persist a credential set for an account, returning the file path.
    ///
    /// The file is written to a temporary path and renamed into place.
    pub fn save(&self, account: &str, credentials: &CredentialSet) -> Result<PathBuf, Error> {
        std::fs::create_dir_all(&self.dir)?;

        let path = self.session_path(account);
        let tmp_path = path.with_extension("json.part");

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let result = (|| -> Result<(), Error> {
            let mut file = options.open(&tmp_path)?;
            file.write_all(&credentials.to_json_vec()?)?;
            file.sync_all()?;
            std::fs::rename(&tmp_path, &path)?;
            Ok(())
        })();

        if let Err(error) = result {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(error);
        }

        Ok(path)
    }

    /// Encode the stored session for an account as an `INSTAGRAM_SESSION` value.
    pub fn export_env(&self, account: &str) -> Result<String, Error> {
        let credentials = self.load_file(account)?;
        Ok(general_purpose::STANDARD.encode(credentials.to_json_vec()?))
    }

    /// Get a complete credential set for an account.
    ///
    /// Tries the session file, the environment, and then each cookie source in order.
    /// A session taken from a cookie source is saved.
    ///
    /// # Errors
    /// Returns [`Error::NoSessionAvailable`] if every source failed.
    pub fn acquire(
        &self,
        account: &str,
        sources: &[Box<dyn CookieSource>],
    ) -> Result<AcquiredSession, Error> {
        let path = self.session_path(account);
        match self.load_file(account) {
            Ok(credentials) => {
                return Ok(AcquiredSession {
                    credentials,
                    source: SessionSource::File(path),
                });
            }
            Err(Error::NoSessionAvailable) => {
                debug!("no session file at `{}`", path.display());
            }
            Err(error) => {
                warn!("failed to load session file `{}`: {error}", path.display());
            }
        }

        match self.load_env() {
            Ok(credentials) => {
                return Ok(AcquiredSession {
                    credentials,
                    source: SessionSource::Environment,
                });
            }
            Err(Error::NoSessionAvailable) => {
                debug!("`{SESSION_ENV_VAR}` is not set");
            }
            Err(error) => {
                warn!("failed to load session from `{SESSION_ENV_VAR}`: {error}");
            }
        }

        self.import(account, sources, |_| true)
    }

    /// Import a session for an account from the first cookie source that yields one.
    ///
    /// A source counts only if its credentials are complete and `accept` returns `true` for them.
    /// The accepted session is saved.
    ///
    /// # Errors
    /// Returns [`Error::NoSessionAvailable`] if every source failed,
    /// or the save error if the accepted session could not be saved.
    pub fn import<F>(
        &self,
        account: &str,
        sources: &[Box<dyn CookieSource>],
        mut accept: F,
    ) -> Result<AcquiredSession, Error>
    where
        F: FnMut(&CredentialSet) -> bool,
    {
        for source in sources {
            let credentials = match source
                .extract(COOKIE_DOMAIN)
                .and_then(|credentials| credentials.ensure_complete().map(|()| credentials))
            {
                Ok(credentials) => credentials,
                Err(error) => {
                    warn!("failed to import session from {}: {error}", source.name());
                    continue;
                }
            };

            if !accept(&credentials) {
                warn!("session from {} was rejected", source.name());
                continue;
            }

            let path = self.save(account, &credentials)?;
            info!(
                "saved session from {} to `{}`",
                source.name(),
                path.display()
            );

            return Ok(AcquiredSession {
                credentials,
                source: SessionSource::Browser(source.name().to_string()),
            });
        }

        Err(Error::NoSessionAvailable)
    }
}
