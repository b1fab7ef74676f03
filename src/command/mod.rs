// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Assistant command definitions.
//!
//! An EXECUTE request carries a command name and a JSON parameter object.
//! [`Command::parse`] turns the pair into a typed command.
//!
//! # Available Commands
//!
//! | Command | Parameters | Trait |
//! |---------|------------|-------|
//! | `OnOff` | `on` | `OnOff` |
//! | `BrightnessAbsolute` | `brightness` | `Brightness` |
//! | `ColorAbsolute` | `color` | `ColorSetting` |
//! | `ThermostatSetMode` | `thermostatMode` | `TemperatureSetting` |
//! | `ThermostatTemperatureSetpoint` | `thermostatTemperatureSetpoint` | `TemperatureSetting` |
//! | `SetFanSpeed` | `fanSpeed` | `FanSpeed` |
//!
//! # Examples
//!
//! ```
//! use assistant_bridge::command::Command;
//!
//! let params = serde_json::json!({"on": true});
//! let command = Command::parse("action.devices.commands.OnOff", &params).unwrap();
//! assert_eq!(command, Command::OnOff { on: true });
//! ```

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::CommandError;
use crate::types::HsvColor;

/// A typed assistant command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Turn a device on or off.
    OnOff {
        /// Requested power state.
        on: bool,
    },
    /// Set an absolute brightness.
    BrightnessAbsolute {
        /// Requested brightness.
        brightness: u32,
    },
    /// Set a color temperature or spectrum color.
    ColorAbsolute {
        /// Requested color.
        color: ColorParams,
    },
    /// Change the thermostat mode.
    ThermostatSetMode {
        /// Requested protocol mode, e.g. `heat`.
        mode: String,
    },
    /// Change the thermostat setpoint.
    ThermostatTemperatureSetpoint {
        /// Requested setpoint in degrees.
        setpoint: f64,
    },
    /// Change the fan speed.
    SetFanSpeed {
        /// Requested speed name.
        fan_speed: String,
    },
}

/// The `color` parameter of `ColorAbsolute`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ColorParams {
    /// Optional color name given by the user.
    #[serde(default)]
    pub name: Option<String>,

    /// Color temperature in Kelvin.
    #[serde(default, alias = "temperatureK")]
    pub temperature: Option<u32>,

    /// Packed `0xRRGGBB` color.
    #[serde(default, rename = "spectrumRGB", alias = "spectrumRgb")]
    pub spectrum_rgb: Option<u32>,

    /// HSV color with fractional saturation and value.
    #[serde(default, rename = "spectrumHSV", alias = "spectrumHsv")]
    pub spectrum_hsv: Option<HsvColor>,
}

#[derive(Deserialize)]
struct OnOffParams {
    on: bool,
}

#[derive(Deserialize)]
struct BrightnessParams {
    brightness: u32,
}

#[derive(Deserialize)]
struct ColorAbsoluteParams {
    color: ColorParams,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThermostatModeParams {
    thermostat_mode: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetpointParams {
    thermostat_temperature_setpoint: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FanSpeedParams {
    fan_speed: String,
}

impl Command {
    /// `action.devices.commands.OnOff`
    pub const ON_OFF: &'static str = "action.devices.commands.OnOff";
    /// `action.devices.commands.BrightnessAbsolute`
    pub const BRIGHTNESS_ABSOLUTE: &'static str = "action.devices.commands.BrightnessAbsolute";
    /// `action.devices.commands.ColorAbsolute`
    pub const COLOR_ABSOLUTE: &'static str = "action.devices.commands.ColorAbsolute";
    /// `action.devices.commands.ThermostatSetMode`
    pub const THERMOSTAT_SET_MODE: &'static str = "action.devices.commands.ThermostatSetMode";
    /// `action.devices.commands.ThermostatTemperatureSetpoint`
    pub const THERMOSTAT_TEMPERATURE_SETPOINT: &'static str =
        "action.devices.commands.ThermostatTemperatureSetpoint";
    /// `action.devices.commands.SetFanSpeed`
    pub const SET_FAN_SPEED: &'static str = "action.devices.commands.SetFanSpeed";

    /// Parses a command from its protocol name and parameters.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::UnsupportedCommand` for unknown names and
    /// `CommandError::InvalidParams` when the parameters do not match.
    pub fn parse(name: &str, params: &Value) -> Result<Self, CommandError> {
        match name {
            Self::ON_OFF => {
                let p: OnOffParams = parse_params(name, params)?;
                Ok(Self::OnOff { on: p.on })
            }
            Self::BRIGHTNESS_ABSOLUTE => {
                let p: BrightnessParams = parse_params(name, params)?;
                Ok(Self::BrightnessAbsolute {
                    brightness: p.brightness,
                })
            }
            Self::COLOR_ABSOLUTE => {
                let p: ColorAbsoluteParams = parse_params(name, params)?;
                Ok(Self::ColorAbsolute { color: p.color })
            }
            Self::THERMOSTAT_SET_MODE => {
                let p: ThermostatModeParams = parse_params(name, params)?;
                Ok(Self::ThermostatSetMode {
                    mode: p.thermostat_mode,
                })
            }
            Self::THERMOSTAT_TEMPERATURE_SETPOINT => {
                let p: SetpointParams = parse_params(name, params)?;
                Ok(Self::ThermostatTemperatureSetpoint {
                    setpoint: p.thermostat_temperature_setpoint,
                })
            }
            Self::SET_FAN_SPEED => {
                let p: FanSpeedParams = parse_params(name, params)?;
                Ok(Self::SetFanSpeed {
                    fan_speed: p.fan_speed,
                })
            }
            _ => Err(CommandError::UnsupportedCommand(name.to_string())),
        }
    }

    /// Returns the protocol name of this command.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::OnOff { .. } => Self::ON_OFF,
            Self::BrightnessAbsolute { .. } => Self::BRIGHTNESS_ABSOLUTE,
            Self::ColorAbsolute { .. } => Self::COLOR_ABSOLUTE,
            Self::ThermostatSetMode { .. } => Self::THERMOSTAT_SET_MODE,
            Self::ThermostatTemperatureSetpoint { .. } => Self::THERMOSTAT_TEMPERATURE_SETPOINT,
            Self::SetFanSpeed { .. } => Self::SET_FAN_SPEED,
        }
    }
}

fn parse_params<T: DeserializeOwned>(name: &str, params: &Value) -> Result<T, CommandError> {
    T::deserialize(params).map_err(|e| CommandError::InvalidParams {
        command: name.to_string(),
        message: e.to_string(),
    })
}
