// src/config/loader.rs

use std::path::Path;

use crate::config::model::{RawZoneConfig, ZoneConfig};
use crate::errors::{Result, ZonewatchError};
use crate::fs::FileSystem;

/// Load a zone description from a given path and return the raw `RawZoneConfig`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<RawZoneConfig> {
    let path = path.as_ref();
    let contents = fs.read_to_string(path).map_err(|e| {
        ZonewatchError::ConfigError(format!("cannot read config file {:?}: {e:#}", path))
    })?;

    let config: RawZoneConfig = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a zone description from path and run validation.
///
/// This is the entry point the rest of the application uses; the result is
/// consumed once by the template renderer at startup.
pub fn load_and_validate(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<ZoneConfig> {
    let raw_config = load_from_path(fs, &path)?;
    let config = ZoneConfig::try_from(raw_config)?;
    Ok(config)
}
