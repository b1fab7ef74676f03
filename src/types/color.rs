// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Color types for the `ColorSetting` trait.
//!
//! The registry stores colors as three comma-separated components. The
//! assistant protocol expects either a packed 24-bit RGB integer or an HSV
//! triple whose saturation and value are fractions in `[0, 1]`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Splits a registry color state into exactly three trimmed components.
fn components(state: &str) -> Result<[&str; 3], ValueError> {
    let mut parts = state.split(',').map(str::trim);
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(a), Some(b), Some(c), None) => Ok([a, b, c]),
        _ => Err(ValueError::InvalidComponents(state.to_string())),
    }
}

/// RGB color with 8-bit channels.
///
/// # Examples
///
/// ```
/// use assistant_bridge::types::RgbColor;
///
/// let color: RgbColor = "255,0,128".parse().unwrap();
/// assert_eq!(color.packed(), 0xFF_00_80);
/// assert_eq!(RgbColor::from_packed(16_712_320).to_state(), "255,0,128");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RgbColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl RgbColor {
    /// Creates a new RGB color.
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Unpacks a `0xRRGGBB` integer. Bits above the low 24 are ignored.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_packed(value: u32) -> Self {
        Self {
            red: ((value >> 16) & 0xFF) as u8,
            green: ((value >> 8) & 0xFF) as u8,
            blue: (value & 0xFF) as u8,
        }
    }

    /// Packs the color as `0xRRGGBB`.
    #[must_use]
    #[allow(clippy::cast_lossless)]
    pub const fn packed(&self) -> u32 {
        (self.red as u32) << 16 | (self.green as u32) << 8 | self.blue as u32
    }

    /// Returns the red component.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Returns the green component.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Returns the blue component.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }

    /// Returns the color in the registry's `r,g,b` format.
    #[must_use]
    pub fn to_state(&self) -> String {
        format!("{},{},{}", self.red, self.green, self.blue)
    }
}

impl FromStr for RgbColor {
    type Err = ValueError;

    /// Parses `r,g,b`. Each component is masked to its low 8 bits.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [r, g, b] = components(s)?;
        let channel = |part: &str| -> Result<u8, ValueError> {
            let value: i64 = part
                .parse()
                .map_err(|_| ValueError::InvalidNumber(part.to_string()))?;
            Ok((value & 0xFF) as u8)
        };
        Ok(Self::new(channel(r)?, channel(g)?, channel(b)?))
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }
}

/// HSV color as the assistant protocol sees it.
///
/// Hue is in degrees; saturation and value are fractions. The registry
/// stores saturation and value as percentages, so parsing divides them by
/// 100 and [`HsvColor::to_state`] multiplies them back.
///
/// # Examples
///
/// ```
/// use assistant_bridge::types::HsvColor;
///
/// let color: HsvColor = "120,50,75".parse().unwrap();
/// assert_eq!(color.hue(), 120.0);
/// assert_eq!(color.saturation(), 0.5);
/// assert_eq!(color.value(), 0.75);
/// assert_eq!(color.to_state(), "120.0,50.0,75.0");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HsvColor {
    hue: f64,
    saturation: f64,
    value: f64,
}

impl HsvColor {
    /// Creates a color from a hue in degrees and fractional saturation/value.
    #[must_use]
    pub const fn new(hue: f64, saturation: f64, value: f64) -> Self {
        Self {
            hue,
            saturation,
            value,
        }
    }

    /// Returns the hue in degrees.
    #[must_use]
    pub const fn hue(&self) -> f64 {
        self.hue
    }

    /// Returns the saturation as a fraction.
    #[must_use]
    pub const fn saturation(&self) -> f64 {
        self.saturation
    }

    /// Returns the value (brightness) as a fraction.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// Returns the color in the registry's `h,s%,v%` format.
    #[must_use]
    pub fn to_state(&self) -> String {
        format!(
            "{:.1},{:.1},{:.1}",
            self.hue,
            self.saturation * 100.0,
            self.value * 100.0
        )
    }
}

impl FromStr for HsvColor {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [h, sat, val] = components(s)?;
        let number = |part: &str| -> Result<f64, ValueError> {
            part.parse()
                .map_err(|_| ValueError::InvalidNumber(part.to_string()))
        };
        Ok(Self::new(
            number(h)?,
            number(sat)? / 100.0,
            number(val)? / 100.0,
        ))
    }
}
