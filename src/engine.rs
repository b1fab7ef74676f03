// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Trait translation engine.
//!
//! The [`Engine`] answers the three device operations of the assistant
//! protocol for one request: it borrows a configuration [`Snapshot`] and an
//! [`ItemRegistry`] and keeps no state of its own.
//!
//! # Examples
//!
//! ```no_run
//! use std::time::SystemTime;
//! use assistant_bridge::config::Snapshot;
//! use assistant_bridge::engine::Engine;
//! use assistant_bridge::registry::HttpRegistry;
//!
//! # async fn example() -> assistant_bridge::Result<()> {
//! let snapshot = Snapshot::load("config.yaml")?;
//! let registry = HttpRegistry::from_snapshot(&snapshot)?;
//! let engine = Engine::new(&snapshot, &registry);
//!
//! let states = engine.query(&["lamp"]).await?;
//! let result = engine
//!     .execute("lamp", "action.devices.commands.OnOff", &serde_json::json!({"on": true}))
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;

use serde_json::Value;

use crate::command::{ColorParams, Command};
use crate::config::{Device, Snapshot, TemperatureBinding};
use crate::error::{CommandError, RegistryError, Result};
use crate::registry::ItemRegistry;
use crate::state::DeviceStates;
use crate::sync::{SyncDevice, enumerate};
use crate::traits::{ColorCapability, ColorModel, TraitKind, index_items, parse_setpoint};
use crate::types::{HsvColor, RgbColor};

/// Translates assistant operations into registry reads and writes.
#[derive(Debug)]
pub struct Engine<'a, R> {
    snapshot: &'a Snapshot,
    registry: &'a R,
}

impl<'a, R: ItemRegistry> Engine<'a, R> {
    /// Creates an engine over a snapshot and a registry.
    #[must_use]
    pub fn new(snapshot: &'a Snapshot, registry: &'a R) -> Self {
        Self { snapshot, registry }
    }

    /// Returns the snapshot this engine reads devices from.
    #[must_use]
    pub fn snapshot(&self) -> &'a Snapshot {
        self.snapshot
    }

    /// Describes every configured device. No registry calls are made.
    #[must_use]
    pub fn enumerate(&self) -> Vec<SyncDevice> {
        enumerate(self.snapshot)
    }

    /// Reports the current state of the requested devices.
    ///
    /// Unknown ids are left out of the result. When at least one id is
    /// known, all items are fetched in a single registry call.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError` if the item list cannot be fetched.
    pub async fn query<S: AsRef<str>>(
        &self,
        ids: &[S],
    ) -> std::result::Result<BTreeMap<String, DeviceStates>, RegistryError> {
        let devices: Vec<&Device> = ids
            .iter()
            .filter_map(|id| {
                let id: &str = id.as_ref();
                let device = self.snapshot.device(id);
                if device.is_none() {
                    tracing::debug!(device = id, "Skipping unknown device");
                }
                device
            })
            .collect();

        if devices.is_empty() {
            return Ok(BTreeMap::new());
        }

        let items = self.registry.fetch_all().await?;
        let index = index_items(&items);

        tracing::debug!(
            devices = devices.len(),
            items = items.len(),
            "Decoding device states"
        );

        Ok(devices
            .into_iter()
            .map(|device| {
                let color = ColorCapability::from_attributes(device.attributes.as_ref());
                let mut states = DeviceStates::online();
                for device_trait in device.device_traits() {
                    device_trait.decode(&index, &color, &mut states);
                }
                (device.id.clone(), states)
            })
            .collect())
    }

    /// Applies one command to one device and reports the resulting state.
    ///
    /// An unknown device yields `{online: true}` without any registry call.
    /// Writes are not rolled back when a later read fails.
    ///
    /// # Errors
    ///
    /// Returns `Error::Command` if the command is unknown, malformed or not
    /// applicable to the device, and `Error::Registry` if a registry call
    /// fails.
    pub async fn execute(&self, id: &str, command: &str, params: &Value) -> Result<DeviceStates> {
        let Some(device) = self.snapshot.device(id) else {
            tracing::debug!(device = id, command, "Ignoring command for unknown device");
            return Ok(DeviceStates::online());
        };

        let command = Command::parse(command, params)?;

        tracing::debug!(device = id, command = command.name(), "Executing command");

        let mut states = DeviceStates::online();
        match command {
            Command::OnOff { on } => {
                let item = required_item(device, TraitKind::OnOff)?;
                self.registry
                    .write(item, if on { "ON" } else { "OFF" })
                    .await?;
                states.set_on(on);
            }
            Command::BrightnessAbsolute { brightness } => {
                let item = required_item(device, TraitKind::Brightness)?;
                self.registry.write(item, &brightness.to_string()).await?;
                states.set_brightness(brightness);
            }
            Command::ColorAbsolute { color } => {
                self.set_color(device, &color, &mut states).await?;
            }
            Command::ThermostatSetMode { mode } => {
                let binding = temperature_binding(device)?;
                let item = binding
                    .mode_item
                    .as_deref()
                    .ok_or(CommandError::MissingTrait(TraitKind::TemperatureSetting.name()))?;
                self.registry
                    .write(item, binding.registry_mode(&mode))
                    .await?;

                if let Some(temp_item) = binding.temp_item.as_deref() {
                    let current = self.registry.fetch_one(temp_item).await?;
                    if let Some(setpoint) = current.state.as_deref().and_then(parse_setpoint) {
                        states.set_thermostat_temperature_setpoint(setpoint);
                    }
                }
                states.set_thermostat_mode(mode);
            }
            Command::ThermostatTemperatureSetpoint { setpoint } => {
                let binding = temperature_binding(device)?;
                let item = binding
                    .temp_item
                    .as_deref()
                    .ok_or(CommandError::MissingTrait(TraitKind::TemperatureSetting.name()))?;
                let whole = truncate_setpoint(setpoint);
                self.registry.write(item, &whole.to_string()).await?;
                states.set_thermostat_temperature_setpoint(whole.into());

                if let Some(mode_item) = binding.mode_item.as_deref() {
                    let current = self.registry.fetch_one(mode_item).await?;
                    if let Some(state) = current.state.as_deref() {
                        states.set_thermostat_mode(binding.protocol_mode(state));
                    }
                }
            }
            Command::SetFanSpeed { fan_speed } => {
                let item = required_item(device, TraitKind::FanSpeed)?;
                self.registry.write(item, &fan_speed).await?;
                states.set_current_fan_speed_setting(fan_speed);
            }
        }

        Ok(states)
    }

    async fn set_color(
        &self,
        device: &Device,
        color: &ColorParams,
        states: &mut DeviceStates,
    ) -> Result<()> {
        if device.attributes.is_none() {
            return Err(CommandError::AttributesNotSet.into());
        }
        let caps = ColorCapability::from_attributes(device.attributes.as_ref());
        let item = required_item(device, TraitKind::ColorSetting)?;

        if let Some(kelvin) = color.temperature
            && caps.has_temperature_range()
        {
            self.registry.write(item, &kelvin.to_string()).await?;
            states.set_temperature_k(kelvin);
        } else if let Some(hsv) = color.spectrum_hsv
            && caps.model() == Some(ColorModel::Hsv)
        {
            let value = hsv.to_state();
            self.registry.write(item, &value).await?;
            // Report what the registry received, at its precision.
            states.set_spectrum_hsv(value.parse::<HsvColor>().unwrap_or(hsv));
        } else if let Some(packed) = color.spectrum_rgb
            && caps.model() == Some(ColorModel::Rgb)
        {
            let rgb = RgbColor::from_packed(packed);
            self.registry.write(item, &rgb.to_state()).await?;
            states.set_spectrum_rgb(rgb);
        } else {
            return Err(CommandError::UnsupportedColorType.into());
        }

        Ok(())
    }
}

fn required_item(device: &Device, kind: TraitKind) -> std::result::Result<&str, CommandError> {
    device
        .item(kind)
        .ok_or(CommandError::MissingTrait(kind.name()))
}

fn temperature_binding(device: &Device) -> std::result::Result<&TemperatureBinding, CommandError> {
    device
        .temperature_setting()
        .ok_or(CommandError::MissingTrait(TraitKind::TemperatureSetting.name()))
}

/// Drops the fractional part of a setpoint, saturating at the `i32` range.
#[allow(clippy::cast_possible_truncation)]
fn truncate_setpoint(setpoint: f64) -> i32 {
    setpoint.trunc() as i32
}
