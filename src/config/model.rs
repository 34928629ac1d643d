// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

/// Zone description as read from a TOML file.
///
/// ```toml
/// [vars]
/// directory = "/var/cache/bind"
///
/// [[zone]]
/// name = "example.com"
/// file = "masterzones/example.com.zone"
/// kind = "master"
/// allow_transfer = ["192.0.2.2"]
///
/// [[zone]]
/// name = "example.net"
/// kind = "slave"
/// masters = ["192.0.2.1"]
/// ```
///
/// This is the raw, unvalidated shape. Use [`ZoneConfig`] (via
/// `TryFrom<RawZoneConfig>`) everywhere else.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawZoneConfig {
    /// Free-form string variables available to the template as `{{ key }}`.
    #[serde(default)]
    pub vars: BTreeMap<String, String>,

    /// All zones from `[[zone]]`, in file order.
    #[serde(default)]
    pub zone: Vec<ZoneEntry>,
}

/// Validated zone description.
///
/// Only constructible through validation, so holders can rely on unique
/// names and complete master/slave entries.
#[derive(Debug, Clone)]
pub struct ZoneConfig {
    pub vars: BTreeMap<String, String>,
    pub zones: Vec<ZoneEntry>,
}

impl ZoneConfig {
    pub(crate) fn new_unchecked(vars: BTreeMap<String, String>, zones: Vec<ZoneEntry>) -> Self {
        Self { vars, zones }
    }
}

/// Whether BIND is authoritative for the zone or transfers it in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ZoneKind {
    #[default]
    Master,
    Slave,
}

impl ZoneKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ZoneKind::Master => "master",
            ZoneKind::Slave => "slave",
        }
    }
}

/// One `[[zone]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ZoneEntry {
    /// Zone origin, e.g. `"example.com"`.
    pub name: String,

    /// Zone file path as named should see it. Required for master zones.
    #[serde(default)]
    pub file: Option<String>,

    #[serde(default)]
    pub kind: ZoneKind,

    /// Primary servers to transfer from (slave zones only).
    #[serde(default)]
    pub masters: Vec<String>,

    #[serde(default)]
    pub allow_transfer: Vec<String>,

    #[serde(default)]
    pub also_notify: Vec<String>,
}
