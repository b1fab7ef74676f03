// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! SYNC device descriptions.
//!
//! Enumeration is computed from the configuration alone and never touches
//! the item registry.

use serde::Serialize;

use crate::config::{Attributes, Device, Snapshot};
use crate::traits::protocol_trait;

/// Prefix of device type identifiers in the assistant protocol.
pub const PROTOCOL_TYPE_PREFIX: &str = "action.devices.types.";

/// A device as announced in a SYNC reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncDevice {
    /// Device id.
    pub id: String,
    /// Protocol device type, e.g. `action.devices.types.LIGHT`.
    #[serde(rename = "type")]
    pub device_type: String,
    /// Display name.
    pub name: DeviceName,
    /// Protocol trait identifiers.
    pub traits: Vec<String>,
    /// Always `false`; state is only reported on request.
    pub will_report_state: bool,
    /// Room the device is in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_hint: Option<String>,
    /// Attributes copied verbatim from the configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
    /// Static hardware description.
    pub device_info: DeviceInfo,
}

/// The `name` block of a SYNC device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceName {
    /// Display name.
    pub name: String,
}

/// The `deviceInfo` block of a SYNC device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    /// Reported manufacturer.
    pub manufacturer: String,
    /// Reported model, the configured device type.
    pub model: String,
    /// Reported hardware version.
    pub hw_version: String,
    /// Reported software version.
    pub sw_version: String,
}

impl DeviceInfo {
    /// Manufacturer reported for every device.
    pub const MANUFACTURER: &'static str = env!("CARGO_PKG_NAME");
    /// Hardware version reported for every device.
    pub const HW_VERSION: &'static str = "1";
    /// Software version reported for every device.
    pub const SW_VERSION: &'static str = env!("CARGO_PKG_VERSION");

    fn for_model(model: &str) -> Self {
        Self {
            manufacturer: Self::MANUFACTURER.to_string(),
            model: model.to_string(),
            hw_version: Self::HW_VERSION.to_string(),
            sw_version: Self::SW_VERSION.to_string(),
        }
    }
}

impl From<&Device> for SyncDevice {
    fn from(device: &Device) -> Self {
        Self {
            id: device.id.clone(),
            device_type: format!("{PROTOCOL_TYPE_PREFIX}{}", device.category),
            name: DeviceName {
                name: device.name.clone(),
            },
            traits: device.traits.keys().map(String::as_str).map(protocol_trait).collect(),
            will_report_state: false,
            room_hint: device.room.clone(),
            attributes: device.attributes.clone(),
            device_info: DeviceInfo::for_model(&device.category),
        }
    }
}

/// Describes every configured device, in device id order.
#[must_use]
pub fn enumerate(snapshot: &Snapshot) -> Vec<SyncDevice> {
    snapshot.devices().values().map(SyncDevice::from).collect()
}
