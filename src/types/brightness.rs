// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Brightness type for the `Brightness` trait.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Brightness level as reported to the assistant.
///
/// A light that reports a brightness is on, so a registry state of `0` is
/// reported as `1`.
///
/// # Examples
///
/// ```
/// use assistant_bridge::types::Brightness;
///
/// assert_eq!(Brightness::from_state("55").unwrap().value(), 55);
/// assert_eq!(Brightness::from_state("0").unwrap().value(), 1);
/// assert!(Brightness::from_state("-3").is_none());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Brightness(u32);

impl Brightness {
    /// Lowest brightness ever reported.
    pub const MIN: Self = Self(1);

    /// Creates a brightness value, raising `0` to [`Brightness::MIN`].
    #[must_use]
    pub const fn clamped(value: u32) -> Self {
        if value < Self::MIN.0 {
            Self::MIN
        } else {
            Self(value)
        }
    }

    /// Decodes a registry state.
    ///
    /// Only plain non-negative integer strings are accepted.
    #[must_use]
    pub fn from_state(state: &str) -> Option<Self> {
        if state.is_empty() || !state.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        state.parse().ok().map(Self::clamped)
    }

    /// Returns the brightness value.
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Brightness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}
