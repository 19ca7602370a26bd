use crate::config::{
    Config,
    Severity,
};
use anyhow::{
    ensure,
    Context,
};
use camino::{
    Utf8Path,
    Utf8PathBuf,
};

/// Find the config file to load.
///
/// An explicit path is always used.
/// Otherwise, the platform config file is used if it exists.
pub(crate) fn resolve_config_path(explicit: Option<&Utf8Path>) -> Option<Utf8PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    Config::default_path()
        .filter(|path| path.exists())
        .and_then(|path| Utf8PathBuf::from_path_buf(path).ok())
}

/// Load a config.
///
/// This prints to the stderr directly.
/// It is intended to be called BEFORE the loggers are set up.
pub(crate) fn load_config(path: Option<&Utf8Path>) -> anyhow::Result<Config> {
    let mut config = match path {
        Some(path) => {
            eprintln!("loading `{path}`...");
            Config::load_from_path(path).with_context(|| format!("failed to load `{path}`"))?
        }
        None => Config::default(),
    };

    let errors = config.validate();
    let mut error_count = 0;
    for e in errors {
        match e.severity() {
            Severity::Warn => {
                eprintln!("validation warning: {}", e.error());
            }
            Severity::Error => {
                eprintln!("validation error: {}", e.error());
                error_count += 1;
            }
        }
    }

    ensure!(
        error_count == 0,
        "validation failed with {error_count} errors."
    );

    Ok(config)
}
