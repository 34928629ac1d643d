// src/config/validate.rs

use std::collections::HashSet;

use crate::config::model::{RawZoneConfig, ZoneConfig, ZoneKind};
use crate::errors::{Result, ZonewatchError};

impl TryFrom<RawZoneConfig> for ZoneConfig {
    type Error = crate::errors::ZonewatchError;

    fn try_from(raw: RawZoneConfig) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ZoneConfig::new_unchecked(raw.vars, raw.zone))
    }
}

fn validate_raw_config(cfg: &RawZoneConfig) -> Result<()> {
    ensure_has_zones(cfg)?;
    validate_zone_names(cfg)?;
    validate_zone_kinds(cfg)?;
    Ok(())
}

fn ensure_has_zones(cfg: &RawZoneConfig) -> Result<()> {
    if cfg.zone.is_empty() {
        return Err(ZonewatchError::ConfigError(
            "config must contain at least one [[zone]] entry".to_string(),
        ));
    }
    Ok(())
}

fn validate_zone_names(cfg: &RawZoneConfig) -> Result<()> {
    let mut seen = HashSet::new();
    for zone in cfg.zone.iter() {
        let name = zone.name.trim();
        if name.is_empty() {
            return Err(ZonewatchError::ConfigError(
                "zone entry has an empty `name`".to_string(),
            ));
        }
        // DNS names are case-insensitive.
        if !seen.insert(name.trim_end_matches('.').to_lowercase()) {
            return Err(ZonewatchError::ConfigError(format!(
                "zone '{}' is declared more than once",
                name
            )));
        }
    }
    Ok(())
}

fn validate_zone_kinds(cfg: &RawZoneConfig) -> Result<()> {
    for zone in cfg.zone.iter() {
        match zone.kind {
            ZoneKind::Master if zone.file.as_deref().is_none_or(str::is_empty) => {
                return Err(ZonewatchError::ConfigError(format!(
                    "master zone '{}' needs a `file`",
                    zone.name
                )));
            }
            ZoneKind::Slave if zone.masters.is_empty() => {
                return Err(ZonewatchError::ConfigError(format!(
                    "slave zone '{}' needs at least one entry in `masters`",
                    zone.name
                )));
            }
            _ => {}
        }
    }
    Ok(())
}
