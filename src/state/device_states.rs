// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-device state record.

use serde::{Deserialize, Serialize};

use crate::types::{Brightness, HsvColor, RgbColor};

/// State of one device in the shape the assistant expects.
///
/// Every record is `online`. All other fields are optional and left out of
/// the serialized form when unknown.
///
/// # Examples
///
/// ```
/// use assistant_bridge::state::DeviceStates;
///
/// let mut states = DeviceStates::online();
/// states.set_on(true);
/// assert_eq!(
///     serde_json::to_value(&states).unwrap(),
///     serde_json::json!({"online": true, "on": true})
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStates {
    online: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    on: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    brightness: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    color: Option<ColorState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    current_fan_speed_setting: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thermostat_temperature_setpoint: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thermostat_mode: Option<String>,
}

/// The `color` block of a state record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorState {
    /// Color temperature in Kelvin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_k: Option<u32>,
    /// Packed `0xRRGGBB` color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spectrum_rgb: Option<u32>,
    /// HSV color with fractional saturation and value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spectrum_hsv: Option<HsvColor>,
}

impl DeviceStates {
    /// Creates a record holding only `online: true`.
    #[must_use]
    pub fn online() -> Self {
        Self {
            online: true,
            on: None,
            brightness: None,
            color: None,
            current_fan_speed_setting: None,
            thermostat_temperature_setpoint: None,
            thermostat_mode: None,
        }
    }

    /// Returns `true` if only `online` is set.
    #[must_use]
    pub fn is_bare(&self) -> bool {
        *self == Self::online()
    }

    /// Returns the online marker.
    #[must_use]
    pub fn is_online(&self) -> bool {
        self.online
    }

    // ========== OnOff ==========

    /// Returns the on/off state.
    #[must_use]
    pub fn on(&self) -> Option<bool> {
        self.on
    }

    /// Sets the on/off state.
    pub fn set_on(&mut self, on: bool) {
        self.on = Some(on);
    }

    // ========== Brightness ==========

    /// Returns the brightness.
    #[must_use]
    pub fn brightness(&self) -> Option<u32> {
        self.brightness
    }

    /// Sets the brightness to an exact value.
    pub fn set_brightness(&mut self, brightness: u32) {
        self.brightness = Some(brightness);
    }

    /// Sets a decoded brightness.
    pub fn set_decoded_brightness(&mut self, brightness: Brightness) {
        self.brightness = Some(brightness.value());
    }

    // ========== ColorSetting ==========

    /// Returns the color block.
    #[must_use]
    pub fn color(&self) -> Option<&ColorState> {
        self.color.as_ref()
    }

    /// Sets the color temperature in Kelvin.
    pub fn set_temperature_k(&mut self, kelvin: u32) {
        self.color.get_or_insert_with(ColorState::default).temperature_k = Some(kelvin);
    }

    /// Sets the RGB color.
    pub fn set_spectrum_rgb(&mut self, color: RgbColor) {
        self.color.get_or_insert_with(ColorState::default).spectrum_rgb = Some(color.packed());
    }

    /// Sets the HSV color.
    pub fn set_spectrum_hsv(&mut self, color: HsvColor) {
        self.color.get_or_insert_with(ColorState::default).spectrum_hsv = Some(color);
    }

    // ========== FanSpeed ==========

    /// Returns the fan speed setting.
    #[must_use]
    pub fn current_fan_speed_setting(&self) -> Option<&str> {
        self.current_fan_speed_setting.as_deref()
    }

    /// Sets the fan speed setting.
    pub fn set_current_fan_speed_setting(&mut self, speed: impl Into<String>) {
        self.current_fan_speed_setting = Some(speed.into());
    }

    // ========== TemperatureSetting ==========

    /// Returns the thermostat setpoint.
    #[must_use]
    pub fn thermostat_temperature_setpoint(&self) -> Option<f64> {
        self.thermostat_temperature_setpoint
    }

    /// Sets the thermostat setpoint.
    pub fn set_thermostat_temperature_setpoint(&mut self, setpoint: f64) {
        self.thermostat_temperature_setpoint = Some(setpoint);
    }

    /// Returns the thermostat mode.
    #[must_use]
    pub fn thermostat_mode(&self) -> Option<&str> {
        self.thermostat_mode.as_deref()
    }

    /// Sets the thermostat mode.
    pub fn set_thermostat_mode(&mut self, mode: impl Into<String>) {
        self.thermostat_mode = Some(mode.into());
    }
}

impl Default for DeviceStates {
    fn default() -> Self {
        Self::online()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn bare_record() {
        let states = DeviceStates::online();
        assert!(states.is_bare());
        assert!(states.is_online());
        assert_eq!(serde_json::to_value(&states).unwrap(), json!({"online": true}));
    }

    #[test]
    fn color_fields_share_one_block() {
        let mut states = DeviceStates::online();
        states.set_temperature_k(2700);
        states.set_spectrum_rgb(RgbColor::new(255, 0, 128));
        assert_eq!(
            serde_json::to_value(&states).unwrap(),
            json!({"online": true, "color": {"temperatureK": 2700, "spectrumRgb": 16_712_320}})
        );
    }

    #[test]
    fn protocol_field_names() {
        let mut states = DeviceStates::online();
        states.set_brightness(40);
        states.set_current_fan_speed_setting("S2");
        states.set_thermostat_temperature_setpoint(21.0);
        states.set_thermostat_mode("heat");
        states.set_spectrum_hsv(HsvColor::new(120.0, 0.5, 0.75));
        assert!(!states.is_bare());
        assert_eq!(
            serde_json::to_value(&states).unwrap(),
            json!({
                "online": true,
                "brightness": 40,
                "color": {"spectrumHsv": {"hue": 120.0, "saturation": 0.5, "value": 0.75}},
                "currentFanSpeedSetting": "S2",
                "thermostatTemperatureSetpoint": 21.0,
                "thermostatMode": "heat"
            })
        );
    }

    #[test]
    fn decoded_brightness() {
        let mut states = DeviceStates::online();
        states.set_decoded_brightness(Brightness::clamped(0));
        assert_eq!(states.brightness(), Some(1));
    }

    #[test]
    fn deserializes_from_json() {
        let states: DeviceStates =
            serde_json::from_value(json!({"online": true, "on": false})).unwrap();
        assert_eq!(states.on(), Some(false));
        assert!(states.color().is_none());
    }
}
