//! Parse and load user configuration.

use std::{fs, path::Path};

use ron::{Options, extensions::Extensions};
use tracing::debug;

use crate::{Config, Error, resolve_config_path};

/// Load the effective configuration.
///
/// An explicit path must exist; without one, `~/.overlay/config.ron` is used
/// when present and built-in defaults otherwise.
pub fn load(explicit: Option<&Path>) -> Result<Config, Error> {
    match resolve_config_path(explicit)? {
        Some(path) => load_from_path(&path),
        None => {
            debug!("no config file found; using defaults");
            Ok(Config::default())
        }
    }
}

/// Load and validate a RON config file at `path`.
pub fn load_from_path(path: &Path) -> Result<Config, Error> {
    let source = fs::read_to_string(path).map_err(|e| Error::read(path, &e))?;
    let cfg = load_from_str(&source, Some(path))?;
    debug!(path = %path.display(), actions = cfg.actions.len(), "config loaded");
    Ok(cfg)
}

/// Parse and validate RON `source`. `path` is only used for error reporting.
pub fn load_from_str(source: &str, path: Option<&Path>) -> Result<Config, Error> {
    let cfg: Config = if source.trim().is_empty() {
        Config::default()
    } else {
        Options::default()
            .with_default_extension(Extensions::IMPLICIT_SOME)
            .from_str(source)
            .map_err(|e| Error::parse(&e, source, path))?
    };
    cfg.check().map_err(|p| {
        Error::validation(p.message, Some(source), p.needle.as_deref(), path)
    })?;
    Ok(cfg)
}
