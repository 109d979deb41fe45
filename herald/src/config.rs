//! Gateway configuration.
//!
//! Loaded once at startup from a TOML file. Every section carries defaults,
//! so an empty file yields a working gateway writing to stock paths.

use std::path::{Path, PathBuf};
use std::time::Duration;

use herald_common::{
    audit::AuditConfig,
    options::{self, Options, keys},
};
use herald_notify::{DsnConfig, NotificationSettings};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{delegate::HostResources, error::InitError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Registered name of the delivery delegate to run
    #[serde(default = "default_delegate")]
    pub delegate: String,

    /// Host resources handed to the delegate at initialization
    #[serde(default)]
    pub resources: HostResources,

    /// Milliseconds to hold a dispatched notification before sending it.
    ///
    /// Accepts an integer or a string; anything unparseable reads as zero.
    /// Absent here, the option registry is consulted instead.
    #[serde(default, deserialize_with = "lenient_millis")]
    pub dispatched_delay: Option<u64>,

    /// Directory notifications are spooled to for the outbound MTA
    #[serde(default = "default_outbound_spool")]
    pub outbound_spool: PathBuf,

    /// Disposition notification settings
    #[serde(default)]
    pub notification: NotificationSettings,

    /// Failure notification settings
    #[serde(default)]
    pub dsn: DsnConfig,

    /// Audit logging settings
    #[serde(default)]
    pub audit: AuditConfig,

    /// Host-defined option overrides, installed into the option registry
    #[serde(default)]
    pub options: Options,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            delegate: default_delegate(),
            resources: HostResources::default(),
            dispatched_delay: None,
            outbound_spool: default_outbound_spool(),
            notification: NotificationSettings::default(),
            dsn: DsnConfig::default(),
            audit: AuditConfig::default(),
            options: Options::default(),
        }
    }
}

fn default_delegate() -> String {
    "maildir".to_string()
}

fn default_outbound_spool() -> PathBuf {
    PathBuf::from("/var/spool/herald/outbound")
}

/// Accept `4`, `"4"`, or `" 4 "`; map anything else to zero rather than
/// failing the whole configuration load.
fn lenient_millis<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient {
        Integer(i64),
        Text(String),
    }

    let value = Option::<Lenient>::deserialize(deserializer)?;
    Ok(value.map(|value| match value {
        Lenient::Integer(millis) => u64::try_from(millis).unwrap_or(0),
        Lenient::Text(text) => text.trim().parse().unwrap_or(0),
    }))
}

impl GatewayConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// [`InitError::Io`] when the file cannot be read, [`InitError::Config`]
    /// when it fails to parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InitError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    /// The dispatched-notification delay to honor: the configured value,
    /// falling back to the option registry, falling back to zero.
    #[must_use]
    pub fn effective_dispatched_delay(&self) -> Duration {
        let millis = self
            .dispatched_delay
            .unwrap_or_else(|| options::global().integer_or(keys::DISPATCHED_DELAY, 0));
        Duration::from_millis(millis)
    }
}
