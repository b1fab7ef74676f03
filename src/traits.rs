// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device traits and their state decoding rules.
//!
//! A device declares its traits in the configuration as a name plus a
//! binding. [`DeviceTrait`] turns each pair into a closed set of variants,
//! each carrying its own binding data and knowing how to decode registry
//! items into a [`DeviceStates`] record.
//!
//! Decoding never fails: missing items or malformed states leave the
//! corresponding fields unset.

use std::collections::HashMap;

use crate::config::{Attributes, TemperatureBinding, TraitBinding};
use crate::registry::Item;
use crate::state::DeviceStates;
use crate::types::{Brightness, HsvColor, RgbColor};

/// Registry items indexed by name.
pub type ItemIndex<'a> = HashMap<&'a str, &'a Item>;

/// Builds an [`ItemIndex`] over a list of items.
#[must_use]
pub fn index_items(items: &[Item]) -> ItemIndex<'_> {
    items.iter().map(|item| (item.name.as_str(), item)).collect()
}

/// Prefix of trait identifiers in the assistant protocol.
pub const PROTOCOL_TRAIT_PREFIX: &str = "action.devices.traits.";

/// Returns the protocol identifier of a trait name.
///
/// # Examples
///
/// ```
/// assert_eq!(
///     assistant_bridge::traits::protocol_trait("OnOff"),
///     "action.devices.traits.OnOff"
/// );
/// ```
#[must_use]
pub fn protocol_trait(name: &str) -> String {
    format!("{PROTOCOL_TRAIT_PREFIX}{name}")
}

/// The traits the bridge knows how to translate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraitKind {
    /// Power on/off.
    OnOff,
    /// Brightness level.
    Brightness,
    /// Color temperature, RGB or HSV color.
    ColorSetting,
    /// Named fan speed.
    FanSpeed,
    /// Thermostat setpoint and mode.
    TemperatureSetting,
}

impl TraitKind {
    /// All known trait kinds.
    pub const ALL: [Self; 5] = [
        Self::OnOff,
        Self::Brightness,
        Self::ColorSetting,
        Self::FanSpeed,
        Self::TemperatureSetting,
    ];

    /// Returns the configuration name of this trait.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::OnOff => "OnOff",
            Self::Brightness => "Brightness",
            Self::ColorSetting => "ColorSetting",
            Self::FanSpeed => "FanSpeed",
            Self::TemperatureSetting => "TemperatureSetting",
        }
    }

    /// Looks up a trait kind by its case-sensitive configuration name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

/// A configured trait with its binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceTrait<'a> {
    /// `OnOff` bound to a switch item.
    OnOff(&'a str),
    /// `Brightness` bound to a dimmer item.
    Brightness(&'a str),
    /// `ColorSetting` bound to a color or number item.
    ColorSetting(&'a str),
    /// `FanSpeed` bound to a string or number item.
    FanSpeed(&'a str),
    /// `TemperatureSetting` with its compound binding.
    TemperatureSetting(&'a TemperatureBinding),
    /// A trait outside the known vocabulary, or bound with the wrong shape.
    ///
    /// It is still enumerated but never queried or executed.
    Other(&'a str),
}

impl<'a> DeviceTrait<'a> {
    /// Builds a trait from its configured name and binding.
    #[must_use]
    pub fn new(name: &'a str, binding: &'a TraitBinding) -> Self {
        match (TraitKind::from_name(name), binding) {
            (Some(TraitKind::OnOff), TraitBinding::Item(item)) => Self::OnOff(item),
            (Some(TraitKind::Brightness), TraitBinding::Item(item)) => Self::Brightness(item),
            (Some(TraitKind::ColorSetting), TraitBinding::Item(item)) => Self::ColorSetting(item),
            (Some(TraitKind::FanSpeed), TraitBinding::Item(item)) => Self::FanSpeed(item),
            (Some(TraitKind::TemperatureSetting), TraitBinding::Temperature(binding)) => {
                Self::TemperatureSetting(binding)
            }
            _ => Self::Other(name),
        }
    }

    /// Returns the trait kind, or `None` for [`DeviceTrait::Other`].
    #[must_use]
    pub fn kind(&self) -> Option<TraitKind> {
        match self {
            Self::OnOff(_) => Some(TraitKind::OnOff),
            Self::Brightness(_) => Some(TraitKind::Brightness),
            Self::ColorSetting(_) => Some(TraitKind::ColorSetting),
            Self::FanSpeed(_) => Some(TraitKind::FanSpeed),
            Self::TemperatureSetting(_) => Some(TraitKind::TemperatureSetting),
            Self::Other(_) => None,
        }
    }

    /// Decodes this trait's items into `states`.
    pub fn decode(
        &self,
        items: &ItemIndex<'_>,
        color: &ColorCapability,
        states: &mut DeviceStates,
    ) {
        match *self {
            Self::OnOff(item) => {
                if let Some(state) = item_state(items, item) {
                    states.set_on(state.eq_ignore_ascii_case("on"));
                }
            }
            Self::Brightness(item) => {
                if let Some(brightness) = item_state(items, item).and_then(Brightness::from_state) {
                    states.set_decoded_brightness(brightness);
                }
            }
            Self::ColorSetting(item) => {
                if let Some(found) = items.get(item) {
                    color.decode(found, states);
                }
            }
            Self::FanSpeed(item) => {
                if let Some(state) = item_state(items, item) {
                    states.set_current_fan_speed_setting(state);
                }
            }
            Self::TemperatureSetting(binding) => {
                if let Some(setpoint) = binding
                    .temp_item
                    .as_deref()
                    .and_then(|item| item_state(items, item))
                    .and_then(parse_setpoint)
                {
                    states.set_thermostat_temperature_setpoint(setpoint);
                }
                if let Some(mode) = binding
                    .mode_item
                    .as_deref()
                    .and_then(|item| item_state(items, item))
                {
                    states.set_thermostat_mode(binding.protocol_mode(mode));
                }
            }
            Self::Other(_) => {}
        }
    }
}

fn item_state<'a>(items: &ItemIndex<'a>, name: &str) -> Option<&'a str> {
    items
        .get(name)
        .copied()
        .and_then(|item| item.state.as_deref())
}

/// Parses a setpoint state.
///
/// openHAB quantity states carry a unit suffix (`21.5 °C`); only the
/// leading number is used.
#[must_use]
pub fn parse_setpoint(state: &str) -> Option<f64> {
    state
        .split_whitespace()
        .next()?
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Color model declared in a device's `colorModel` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorModel {
    /// `rgb`: packed 24-bit spectrum.
    Rgb,
    /// `hsv`: hue, saturation, value.
    Hsv,
}

/// Color features a device declares through its attributes.
///
/// # Examples
///
/// ```
/// use assistant_bridge::traits::{ColorCapability, ColorModel};
///
/// let attributes = serde_json::json!({
///     "colorModel": "hsv",
///     "colorTemperatureRange": {"temperatureMinK": 2000, "temperatureMaxK": 6500}
/// });
/// let caps = ColorCapability::from_attributes(attributes.as_object());
/// assert_eq!(caps.model(), Some(ColorModel::Hsv));
/// assert!(caps.has_temperature_range());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColorCapability {
    model: Option<ColorModel>,
    temperature_range: bool,
}

impl ColorCapability {
    /// Item type carrying a structured color.
    pub const COLOR_ITEM_TYPE: &'static str = "Color";

    /// Reads the capability from a device's attributes block.
    #[must_use]
    pub fn from_attributes(attributes: Option<&Attributes>) -> Self {
        let Some(attributes) = attributes else {
            return Self::default();
        };

        let model = match attributes.get("colorModel").and_then(|v| v.as_str()) {
            Some("rgb") => Some(ColorModel::Rgb),
            Some("hsv") => Some(ColorModel::Hsv),
            _ => None,
        };
        let temperature_range = attributes
            .get("colorTemperatureRange")
            .is_some_and(|range| !range.is_null());

        Self {
            model,
            temperature_range,
        }
    }

    /// Returns the declared color model.
    #[must_use]
    pub fn model(&self) -> Option<ColorModel> {
        self.model
    }

    /// Returns `true` if a color temperature range is declared.
    #[must_use]
    pub fn has_temperature_range(&self) -> bool {
        self.temperature_range
    }

    /// Decodes a `ColorSetting` item.
    ///
    /// Temperature wins when a range is declared and the state is numeric;
    /// otherwise the declared color model decides. Any other combination
    /// leaves the color unset.
    pub fn decode(&self, item: &Item, states: &mut DeviceStates) {
        let Some(state) = item.state.as_deref() else {
            return;
        };

        if self.temperature_range
            && let Some(kelvin) = parse_kelvin(state)
        {
            states.set_temperature_k(kelvin);
            return;
        }

        match self.model {
            Some(ColorModel::Rgb) if item.kind == Self::COLOR_ITEM_TYPE => {
                if let Ok(color) = state.parse::<RgbColor>() {
                    states.set_spectrum_rgb(color);
                }
            }
            Some(ColorModel::Hsv) => {
                if let Ok(color) = state.parse::<HsvColor>() {
                    states.set_spectrum_hsv(color);
                }
            }
            _ => {}
        }
    }
}

/// Parses a color temperature state such as `2700`, `2700.0` or `2700 K`.
///
/// The fractional part is dropped; negative or out-of-range values are
/// rejected.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_kelvin(state: &str) -> Option<u32> {
    parse_setpoint(state)
        .filter(|kelvin| (0.0..=f64::from(u32::MAX)).contains(kelvin))
        .map(|kelvin| kelvin.trunc() as u32)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::ModeMap;

    fn caps(attributes: &serde_json::Value) -> ColorCapability {
        ColorCapability::from_attributes(attributes.as_object())
    }

    fn decode_one(
        device_trait: DeviceTrait<'_>,
        items: &[Item],
        color: &ColorCapability,
    ) -> DeviceStates {
        let index = index_items(items);
        let mut states = DeviceStates::online();
        device_trait.decode(&index, color, &mut states);
        states
    }

    #[test]
    fn kind_names_round_trip() {
        for kind in TraitKind::ALL {
            assert_eq!(TraitKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(TraitKind::from_name("onoff"), None);
    }

    #[test]
    fn wrong_binding_shape_is_other() {
        let binding = TraitBinding::Temperature(TemperatureBinding::default());
        assert_eq!(DeviceTrait::new("OnOff", &binding), DeviceTrait::Other("OnOff"));

        let binding = TraitBinding::Item("Scene".to_string());
        assert_eq!(DeviceTrait::new("Scene", &binding), DeviceTrait::Other("Scene"));
        assert_eq!(DeviceTrait::new("Scene", &binding).kind(), None);
    }

    #[test]
    fn on_off_is_case_insensitive() {
        let color = ColorCapability::default();
        let on = decode_one(DeviceTrait::OnOff("P"), &[Item::new("P", "Switch", "on")], &color);
        assert_eq!(on.on(), Some(true));
        let off = decode_one(DeviceTrait::OnOff("P"), &[Item::new("P", "Switch", "OFF")], &color);
        assert_eq!(off.on(), Some(false));
    }

    #[test]
    fn on_off_without_state_is_omitted() {
        let item = Item {
            name: "P".to_string(),
            kind: "Switch".to_string(),
            state: None,
        };
        let states = decode_one(DeviceTrait::OnOff("P"), &[item], &ColorCapability::default());
        assert!(states.is_bare());
    }

    #[test]
    fn brightness_decoding() {
        let color = ColorCapability::default();
        let decode = |state: &str| {
            decode_one(
                DeviceTrait::Brightness("D"),
                &[Item::new("D", "Dimmer", state)],
                &color,
            )
            .brightness()
        };
        assert_eq!(decode("0"), Some(1));
        assert_eq!(decode("55"), Some(55));
        assert_eq!(decode("-3"), None);
        assert_eq!(decode("bright"), None);
    }

    #[test]
    fn missing_item_is_omitted() {
        let states = decode_one(
            DeviceTrait::FanSpeed("Fan"),
            &[Item::new("Other", "String", "S1")],
            &ColorCapability::default(),
        );
        assert!(states.is_bare());
    }

    #[test]
    fn fan_speed_is_verbatim() {
        let states = decode_one(
            DeviceTrait::FanSpeed("Fan"),
            &[Item::new("Fan", "String", "speed_high")],
            &ColorCapability::default(),
        );
        assert_eq!(states.current_fan_speed_setting(), Some("speed_high"));
    }

    #[test]
    fn color_rgb_requires_color_item() {
        let rgb = caps(&json!({"colorModel": "rgb"}));
        let states = decode_one(
            DeviceTrait::ColorSetting("C"),
            &[Item::new("C", "Color", "255,0,128")],
            &rgb,
        );
        assert_eq!(states.color().unwrap().spectrum_rgb, Some(16_712_320));

        let states = decode_one(
            DeviceTrait::ColorSetting("C"),
            &[Item::new("C", "String", "255,0,128")],
            &rgb,
        );
        assert!(states.color().is_none());
    }

    #[test]
    fn color_hsv_scaling() {
        let hsv = caps(&json!({"colorModel": "hsv"}));
        let states = decode_one(
            DeviceTrait::ColorSetting("C"),
            &[Item::new("C", "Color", "120,50,75")],
            &hsv,
        );
        assert_eq!(
            states.color().unwrap().spectrum_hsv,
            Some(HsvColor::new(120.0, 0.5, 0.75))
        );
    }

    #[test]
    fn color_temperature_wins_for_numeric_state() {
        let both = caps(&json!({
            "colorModel": "hsv",
            "colorTemperatureRange": {"temperatureMinK": 2000, "temperatureMaxK": 6500}
        }));
        let states = decode_one(
            DeviceTrait::ColorSetting("C"),
            &[Item::new("C", "Number", "2700")],
            &both,
        );
        assert_eq!(states.color().unwrap().temperature_k, Some(2700));
        assert!(states.color().unwrap().spectrum_hsv.is_none());

        let states = decode_one(
            DeviceTrait::ColorSetting("C"),
            &[Item::new("C", "Color", "10,20,30")],
            &both,
        );
        assert!(states.color().unwrap().temperature_k.is_none());
        assert!(states.color().unwrap().spectrum_hsv.is_some());
    }

    #[test]
    fn color_without_capability_is_skipped() {
        let states = decode_one(
            DeviceTrait::ColorSetting("C"),
            &[Item::new("C", "Color", "1,2,3")],
            &ColorCapability::default(),
        );
        assert!(states.is_bare());

        let unknown = caps(&json!({"colorModel": "xyz"}));
        assert_eq!(unknown.model(), None);
    }

    #[test]
    fn malformed_color_is_skipped() {
        let hsv = caps(&json!({"colorModel": "hsv"}));
        let states = decode_one(
            DeviceTrait::ColorSetting("C"),
            &[Item::new("C", "Color", "NULL")],
            &hsv,
        );
        assert!(states.is_bare());
    }

    #[test]
    fn temperature_setting_decoding() {
        let binding = TemperatureBinding {
            temp_item: Some("T".to_string()),
            mode_item: Some("M".to_string()),
            mode_map: Some([("heat", "HEAT_ON")].into_iter().collect::<ModeMap>()),
        };
        let items = [
            Item::new("T", "Number", "21.5 °C"),
            Item::new("M", "String", "HEAT_ON"),
        ];
        let states = decode_one(
            DeviceTrait::TemperatureSetting(&binding),
            &items,
            &ColorCapability::default(),
        );
        assert_eq!(states.thermostat_temperature_setpoint(), Some(21.5));
        assert_eq!(states.thermostat_mode(), Some("heat"));
    }

    #[test]
    fn temperature_setting_unmapped_mode_and_bad_setpoint() {
        let binding = TemperatureBinding {
            temp_item: Some("T".to_string()),
            mode_item: Some("M".to_string()),
            mode_map: Some([("heat", "HEAT_ON")].into_iter().collect::<ModeMap>()),
        };
        let items = [
            Item::new("T", "Number", "UNDEF"),
            Item::new("M", "String", "ECO"),
        ];
        let states = decode_one(
            DeviceTrait::TemperatureSetting(&binding),
            &items,
            &ColorCapability::default(),
        );
        assert_eq!(states.thermostat_temperature_setpoint(), None);
        assert_eq!(states.thermostat_mode(), Some("ECO"));
    }

    #[test]
    fn kelvin_parsing() {
        assert_eq!(parse_kelvin("2700"), Some(2700));
        assert_eq!(parse_kelvin("2700.0"), Some(2700));
        assert_eq!(parse_kelvin("2700.9 K"), Some(2700));
        assert_eq!(parse_kelvin("-5"), None);
        assert_eq!(parse_kelvin("10,20,30"), None);
        assert_eq!(parse_kelvin("NULL"), None);
    }

    #[test]
    fn color_temperature_with_unit_suffix() {
        let ranged = caps(&json!({"colorTemperatureRange": {"temperatureMinK": 2000}}));
        let states = decode_one(
            DeviceTrait::ColorSetting("C"),
            &[Item::new("C", "Number:Temperature", "4000.0 K")],
            &ranged,
        );
        assert_eq!(states.color().unwrap().temperature_k, Some(4000));
    }

    #[test]
    fn setpoint_parsing() {
        assert_eq!(parse_setpoint("20"), Some(20.0));
        assert_eq!(parse_setpoint("19.5 °C"), Some(19.5));
        assert_eq!(parse_setpoint("NaN"), None);
        assert_eq!(parse_setpoint(""), None);
    }

    #[test]
    fn protocol_trait_ids() {
        assert_eq!(
            protocol_trait("TemperatureSetting"),
            "action.devices.traits.TemperatureSetting"
        );
    }
}
