// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Access to the home-automation item registry.
//!
//! The translation engine talks to the registry through the
//! [`ItemRegistry`] trait. [`HttpRegistry`] implements it against the
//! openHAB REST API.

mod http;

pub use http::{HttpRegistry, RegistryConfig};

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

/// An addressable, typed, stateful registry item.
///
/// # Examples
///
/// ```
/// use assistant_bridge::registry::Item;
///
/// let json = r#"{"name": "Lamp_Power", "type": "Switch", "state": "ON", "link": "http://x"}"#;
/// let item: Item = serde_json::from_str(json).unwrap();
/// assert_eq!(item.kind, "Switch");
/// assert_eq!(item.state.as_deref(), Some("ON"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Unique item name.
    pub name: String,

    /// Item type, e.g. `Switch`, `Dimmer`, `Color`.
    #[serde(rename = "type", default)]
    pub kind: String,

    /// Current state, absent for items that never received one.
    #[serde(default)]
    pub state: Option<String>,
}

impl Item {
    /// Creates an item with a state.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            state: Some(state.into()),
        }
    }
}

/// Operations the translation engine needs from the item registry.
#[allow(async_fn_in_trait)]
pub trait ItemRegistry {
    /// Fetches every item in one call.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError` on transport failure, timeout or non-success
    /// status.
    async fn fetch_all(&self) -> Result<Vec<Item>, RegistryError>;

    /// Fetches a single item.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError` on transport failure, timeout or non-success
    /// status.
    async fn fetch_one(&self, name: &str) -> Result<Item, RegistryError>;

    /// Sends a new value to an item.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError` on transport failure, timeout or non-success
    /// status.
    async fn write(&self, name: &str, value: &str) -> Result<(), RegistryError>;
}
