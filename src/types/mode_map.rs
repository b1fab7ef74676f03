// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Thermostat mode vocabulary translation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Translation table between assistant thermostat modes and registry values.
///
/// Keys are protocol modes (`heat`, `cool`, `off`, ...), values are what the
/// registry item expects. Lookups in either direction fall back to the input
/// unchanged when no entry matches.
///
/// # Examples
///
/// ```
/// use assistant_bridge::types::ModeMap;
///
/// let map: ModeMap = [("heat", "HEAT_ON")].into_iter().collect();
/// assert_eq!(map.to_registry("heat"), "HEAT_ON");
/// assert_eq!(map.to_registry("eco"), "eco");
/// assert_eq!(map.to_protocol("HEAT_ON"), "heat");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModeMap(BTreeMap<String, String>);

impl ModeMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the registry value for a protocol mode, if mapped.
    #[must_use]
    pub fn registry_value(&self, mode: &str) -> Option<&str> {
        self.0.get(mode).map(String::as_str)
    }

    /// Returns the protocol mode for a registry value, if mapped.
    ///
    /// When several modes map to the same value the first in key order wins.
    #[must_use]
    pub fn protocol_mode(&self, value: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(_, v)| v.as_str() == value)
            .map(|(k, _)| k.as_str())
    }

    /// Translates a protocol mode for writing, falling back to the mode itself.
    #[must_use]
    pub fn to_registry<'a>(&'a self, mode: &'a str) -> &'a str {
        self.registry_value(mode).unwrap_or(mode)
    }

    /// Translates a registry value for reporting, falling back to the value itself.
    #[must_use]
    pub fn to_protocol<'a>(&'a self, value: &'a str) -> &'a str {
        self.protocol_mode(value).unwrap_or(value)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ModeMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
