// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{ProgloadError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::ProgloadError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.loader, raw.watcher))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_extension(&cfg.loader.extension)?;
    validate_program_dir(cfg)?;
    validate_watcher(cfg)?;
    Ok(())
}

/// Check a program-file suffix.
///
/// Suffixes are compared against `Path::extension()`, which never contains a
/// dot or a separator, so such values could never match a file.
pub fn validate_extension(ext: &str) -> Result<()> {
    if ext.is_empty() {
        return Err(ProgloadError::ConfigError(
            "[loader].extension must not be empty".to_string(),
        ));
    }
    if ext.starts_with('.') {
        return Err(ProgloadError::ConfigError(format!(
            "[loader].extension must be given without a leading dot (got {ext:?})"
        )));
    }
    if ext.contains(['.', '/', '\\']) {
        return Err(ProgloadError::ConfigError(format!(
            "[loader].extension must be a single suffix (got {ext:?})"
        )));
    }
    Ok(())
}

fn validate_program_dir(cfg: &RawConfigFile) -> Result<()> {
    if cfg.loader.program_dir.as_os_str().is_empty() {
        return Err(ProgloadError::ConfigError(
            "[loader].program_dir must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_watcher(cfg: &RawConfigFile) -> Result<()> {
    if cfg.watcher.poll_interval_ms == 0 {
        return Err(ProgloadError::ConfigError(
            "[watcher].poll_interval_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}
