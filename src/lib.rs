// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Assistant Bridge - expose openHAB items as smart-home assistant devices.
//!
//! This library translates assistant fulfillment requests (SYNC, QUERY,
//! EXECUTE, DISCONNECT) into reads and writes against the openHAB item REST
//! API. Devices and their trait bindings are declared in a YAML file.
//!
//! # Supported Traits
//!
//! - **OnOff**: switch items, `ON`/`OFF`
//! - **Brightness**: dimmer items, integer percentage
//! - **ColorSetting**: color temperature, packed RGB or HSV
//! - **FanSpeed**: named speed, written verbatim
//! - **TemperatureSetting**: setpoint and mode, with an optional mode map
//!
//! # Quick Start
//!
//! ## Handling a Fulfillment Request
//!
//! ```no_run
//! use assistant_bridge::{Bridge, FulfillmentRequest};
//!
//! #[tokio::main]
//! async fn main() -> assistant_bridge::Result<()> {
//!     let bridge = Bridge::from_env();
//!
//!     let body = r#"{"requestId": "1", "inputs": [{"intent": "action.devices.SYNC"}]}"#;
//!     let request: FulfillmentRequest =
//!         serde_json::from_str(body).map_err(|e| assistant_bridge::Error::Request(e.to_string()))?;
//!
//!     let response = bridge.handle(&request).await?;
//!     println!("{response:?}");
//!     Ok(())
//! }
//! ```
//!
//! ## Using the Engine Directly
//!
//! ```no_run
//! use assistant_bridge::{Engine, HttpRegistry, Snapshot};
//!
//! #[tokio::main]
//! async fn main() -> assistant_bridge::Result<()> {
//!     let snapshot = Snapshot::load("config.yaml")?;
//!     let registry = HttpRegistry::from_snapshot(&snapshot)?;
//!     let engine = Engine::new(&snapshot, &registry);
//!
//!     for device in engine.enumerate() {
//!         println!("{} ({})", device.name.name, device.device_type);
//!     }
//!
//!     let states = engine.query(&["lamp"]).await?;
//!     println!("{states:?}");
//!     Ok(())
//! }
//! ```

pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod fulfillment;
pub mod registry;
pub mod state;
pub mod sync;
pub mod traits;
pub mod types;

pub use command::{ColorParams, Command};
pub use config::{ConfigCache, Device, Snapshot, TemperatureBinding, TraitBinding};
pub use engine::Engine;
pub use error::{CommandError, ConfigError, Error, RegistryError, Result, ValueError};
pub use fulfillment::{Bridge, FulfillmentRequest, FulfillmentResponse};
pub use registry::{HttpRegistry, Item, ItemRegistry, RegistryConfig};
pub use state::{ColorState, DeviceStates};
pub use sync::SyncDevice;
pub use traits::{ColorCapability, ColorModel, DeviceTrait, TraitKind};
pub use types::{Brightness, HsvColor, ModeMap, RgbColor};
