#![allow(dead_code)]

use zonewatch::config::{RawZoneConfig, ZoneConfig, ZoneEntry, ZoneKind};

/// Builder for `ZoneConfig` to simplify test setup.
pub struct ZoneConfigBuilder {
    config: RawZoneConfig,
}

impl ZoneConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: RawZoneConfig::default(),
        }
    }

    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.config.vars.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_zone(mut self, zone: ZoneEntry) -> Self {
        self.config.zone.push(zone);
        self
    }

    pub fn build(self) -> ZoneConfig {
        ZoneConfig::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ZoneConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for a single `ZoneEntry`.
pub struct ZoneEntryBuilder {
    zone: ZoneEntry,
}

impl ZoneEntryBuilder {
    /// A master zone served from `masterzones/<name>.zone`.
    pub fn master(name: &str) -> Self {
        Self {
            zone: ZoneEntry {
                name: name.to_string(),
                file: Some(format!("masterzones/{name}.zone")),
                kind: ZoneKind::Master,
                masters: vec![],
                allow_transfer: vec![],
                also_notify: vec![],
            },
        }
    }

    /// A slave zone transferred from `master`.
    pub fn slave(name: &str, master: &str) -> Self {
        Self {
            zone: ZoneEntry {
                name: name.to_string(),
                file: None,
                kind: ZoneKind::Slave,
                masters: vec![master.to_string()],
                allow_transfer: vec![],
                also_notify: vec![],
            },
        }
    }

    pub fn allow_transfer(mut self, addr: &str) -> Self {
        self.zone.allow_transfer.push(addr.to_string());
        self
    }

    pub fn also_notify(mut self, addr: &str) -> Self {
        self.zone.also_notify.push(addr.to_string());
        self
    }

    pub fn build(self) -> ZoneEntry {
        self.zone
    }
}
