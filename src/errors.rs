// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ZonewatchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Template error: {0}")]
    TemplateError(String),

    #[error("Exceeded startup timeout of {waited:?} waiting for {path:?} to appear")]
    StartupTimeout { path: PathBuf, waited: Duration },

    #[error("Cannot watch path: {0}")]
    WatchError(#[from] notify::Error),

    #[error("Supervision of the name server ended: {0}")]
    SupervisionEnded(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ZonewatchError>;
