// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bridge configuration: the device/trait map and registry settings.
//!
//! The configuration lives in a YAML file that is loaded into an immutable
//! [`Snapshot`]. Reloading happens through [`ConfigCache`], which only
//! rereads the file when its modification time changes.
//!
//! # File Layout
//!
//! ```yaml
//! openhab: http://openhab.local:8080
//! timeout: 5
//! devices:
//!   lamp:
//!     type: LIGHT
//!     name: Lamp
//!     room: Living Room
//!     attributes:
//!       colorModel: hsv
//!     traits:
//!       OnOff: Lamp_Power
//!       Brightness: Lamp_Dimmer
//!       ColorSetting: Lamp_Color
//!   heating:
//!     type: THERMOSTAT
//!     name: Heating
//!     traits:
//!       TemperatureSetting:
//!         TempItem: Heating_Setpoint
//!         ModeItem: Heating_Mode
//!         ModeMap:
//!           heat: HEAT_ON
//!           off: HEAT_OFF
//! ```

mod cache;

pub use cache::ConfigCache;

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::traits::{DeviceTrait, TraitKind};
use crate::types::ModeMap;

/// Free-form capability metadata attached to a device.
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// Raw layout of the configuration file.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(alias = "registry")]
    openhab: Option<String>,
    #[serde(default)]
    timeout: Option<f64>,
    #[serde(rename = "agentUserId", default)]
    agent_user_id: Option<String>,
    devices: Option<BTreeMap<String, Device>>,
}

/// Immutable, point-in-time view of the configuration file.
///
/// A snapshot is never mutated once built; a changed file produces a new
/// snapshot.
///
/// # Examples
///
/// ```
/// use std::time::SystemTime;
/// use assistant_bridge::config::Snapshot;
///
/// let yaml = "openhab: http://openhab:8080/\ndevices:\n  fan:\n    type: FAN\n    name: Fan\n    traits:\n      FanSpeed: Fan_Speed\n";
/// let snapshot = Snapshot::from_yaml("config.yaml", SystemTime::UNIX_EPOCH, yaml).unwrap();
/// assert_eq!(snapshot.registry_url(), "http://openhab:8080");
/// assert_eq!(snapshot.device("fan").unwrap().name, "Fan");
/// ```
#[derive(Debug, Clone)]
pub struct Snapshot {
    source: PathBuf,
    modified: SystemTime,
    registry_url: String,
    timeout: Duration,
    agent_user_id: String,
    devices: BTreeMap<String, Device>,
}

impl Snapshot {
    /// Default registry call timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Default agent user id reported in SYNC replies.
    pub const DEFAULT_AGENT_USER_ID: &'static str = "12345";

    /// Loads a snapshot from a YAML file.
    ///
    /// The modification stamp is read from the same open handle as the
    /// content.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read or parsed, or if a
    /// required key is missing.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut file = File::open(path)?;
        let modified = file.metadata()?.modified()?;
        let mut content = String::new();
        file.read_to_string(&mut content)?;

        tracing::debug!(path = %path.display(), "Loaded configuration file");

        Self::from_yaml(path, modified, &content)
    }

    /// Builds a snapshot from YAML text.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the text is malformed or a required key is
    /// missing.
    pub fn from_yaml(
        source: impl Into<PathBuf>,
        modified: SystemTime,
        yaml: &str,
    ) -> Result<Self, ConfigError> {
        let file: ConfigFile = serde_yaml::from_str(yaml)?;

        let registry_url = file.openhab.ok_or(ConfigError::MissingKey("openhab"))?;
        let host = registry_url
            .split_once("://")
            .map_or(registry_url.as_str(), |(_, rest)| rest)
            .trim_matches('/');
        if host.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "openhab",
                message: format!("registry URL {registry_url:?} has no host"),
            });
        }
        let registry_url = registry_url.trim_end_matches('/').to_string();
        let mut devices = file.devices.ok_or(ConfigError::MissingKey("devices"))?;
        for (id, device) in &mut devices {
            device.id.clone_from(id);
        }

        let timeout = match file.timeout {
            Some(secs) => Duration::try_from_secs_f64(secs).map_err(|e| {
                ConfigError::InvalidValue {
                    key: "timeout",
                    message: e.to_string(),
                }
            })?,
            None => Self::DEFAULT_TIMEOUT,
        };

        Ok(Self {
            source: source.into(),
            modified,
            registry_url,
            timeout,
            agent_user_id: file
                .agent_user_id
                .unwrap_or_else(|| Self::DEFAULT_AGENT_USER_ID.to_string()),
            devices,
        })
    }

    /// Returns where this snapshot was loaded from.
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Returns the modification stamp of the source at load time.
    #[must_use]
    pub fn modified(&self) -> SystemTime {
        self.modified
    }

    /// Returns the registry base URL without a trailing slash.
    #[must_use]
    pub fn registry_url(&self) -> &str {
        &self.registry_url
    }

    /// Returns the registry call timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the agent user id reported in SYNC replies.
    #[must_use]
    pub fn agent_user_id(&self) -> &str {
        &self.agent_user_id
    }

    /// Returns all devices keyed by id.
    #[must_use]
    pub fn devices(&self) -> &BTreeMap<String, Device> {
        &self.devices
    }

    /// Looks up a device by id.
    #[must_use]
    pub fn device(&self, id: &str) -> Option<&Device> {
        self.devices.get(id)
    }

    /// Returns `true` if this snapshot was loaded from `source` at `modified`.
    #[must_use]
    pub fn is_current(&self, source: &Path, modified: SystemTime) -> bool {
        self.source == source && self.modified == modified
    }
}

/// A user-defined device exposed to the assistant.
#[derive(Debug, Clone, Deserialize)]
pub struct Device {
    /// Device identifier, equal to its key in the device map.
    #[serde(skip)]
    pub id: String,

    /// Display name.
    pub name: String,

    /// Device type, e.g. `LIGHT` or `THERMOSTAT`.
    #[serde(rename = "type")]
    pub category: String,

    /// Optional room hint.
    #[serde(default)]
    pub room: Option<String>,

    /// Optional capability metadata, passed through to SYNC verbatim.
    #[serde(default)]
    pub attributes: Option<Attributes>,

    /// Trait name to item binding.
    #[serde(default)]
    pub traits: BTreeMap<String, TraitBinding>,
}

impl Device {
    /// Returns the configured traits in their typed form.
    pub fn device_traits(&self) -> impl Iterator<Item = DeviceTrait<'_>> {
        self.traits
            .iter()
            .map(|(name, binding)| DeviceTrait::new(name, binding))
    }

    /// Returns the item bound to a single-item trait.
    #[must_use]
    pub fn item(&self, kind: TraitKind) -> Option<&str> {
        match self.traits.get(kind.name())? {
            TraitBinding::Item(item) => Some(item.as_str()),
            TraitBinding::Temperature(_) => None,
        }
    }

    /// Returns the `TemperatureSetting` binding.
    #[must_use]
    pub fn temperature_setting(&self) -> Option<&TemperatureBinding> {
        match self.traits.get(TraitKind::TemperatureSetting.name())? {
            TraitBinding::Temperature(binding) => Some(binding),
            TraitBinding::Item(_) => None,
        }
    }
}

/// How a trait is bound to registry items.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TraitBinding {
    /// A single item, used by the simple traits.
    Item(String),
    /// The compound `TemperatureSetting` binding.
    Temperature(TemperatureBinding),
}

/// Items and vocabulary of a `TemperatureSetting` trait.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TemperatureBinding {
    /// Item holding the setpoint.
    #[serde(rename = "TempItem", default)]
    pub temp_item: Option<String>,

    /// Item holding the thermostat mode.
    #[serde(rename = "ModeItem", default)]
    pub mode_item: Option<String>,

    /// Protocol mode to registry value translation.
    #[serde(rename = "ModeMap", default)]
    pub mode_map: Option<ModeMap>,
}

impl TemperatureBinding {
    /// Translates a protocol mode into the value written to the mode item.
    #[must_use]
    pub fn registry_mode<'a>(&'a self, mode: &'a str) -> &'a str {
        match &self.mode_map {
            Some(map) => map.to_registry(mode),
            None => mode,
        }
    }

    /// Translates a mode item state into the protocol mode.
    #[must_use]
    pub fn protocol_mode<'a>(&'a self, state: &'a str) -> &'a str {
        match &self.mode_map {
            Some(map) => map.to_protocol(state),
            None => state,
        }
    }
}
