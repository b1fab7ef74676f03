// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types exchanged between the registry and the assistant.
//!
//! Registry items carry plain strings; these types own the conversions
//! between those strings and the values the assistant protocol expects.
//!
//! # Types
//!
//! - [`Brightness`] - Brightness level, never reported below 1
//! - [`RgbColor`] - `r,g,b` state packed into a `0xRRGGBB` integer
//! - [`HsvColor`] - `h,s%,v%` state with fractional saturation and value
//! - [`ModeMap`] - Thermostat mode vocabulary translation

mod brightness;
mod color;
mod mode_map;

pub use brightness::Brightness;
pub use color::{HsvColor, RgbColor};
pub use mode_map::ModeMap;
