// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state records returned by QUERY and EXECUTE.
//!
//! # Examples
//!
//! ```
//! use assistant_bridge::state::DeviceStates;
//!
//! let mut states = DeviceStates::online();
//! states.set_thermostat_mode("heat");
//! assert_eq!(states.thermostat_mode(), Some("heat"));
//! ```

mod device_states;

pub use device_states::{ColorState, DeviceStates};
