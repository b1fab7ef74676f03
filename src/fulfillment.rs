// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fulfillment request dispatch.
//!
//! A [`Bridge`] takes a decoded fulfillment request, loads the current
//! configuration through a [`ConfigCache`], and routes the first input's
//! intent to the [`Engine`]. Transport and authentication are left to the
//! caller.
//!
//! # Intents
//!
//! | Intent | Payload | Reply payload |
//! |--------|---------|---------------|
//! | `action.devices.SYNC` | none | `agentUserId`, `devices` |
//! | `action.devices.QUERY` | `devices: [{id}]` | `devices: {id: states}` |
//! | `action.devices.EXECUTE` | `commands: [{devices, execution}]` | `commands: [result]` |
//! | `action.devices.DISCONNECT` | none | empty object |
//!
//! # Examples
//!
//! ```no_run
//! use assistant_bridge::fulfillment::{Bridge, FulfillmentRequest};
//!
//! # async fn example() -> assistant_bridge::Result<()> {
//! let bridge = Bridge::new("config.yaml");
//! let request: FulfillmentRequest = serde_json::from_str(
//!     r#"{"requestId": "1", "inputs": [{"intent": "action.devices.SYNC"}]}"#,
//! ).expect("valid request");
//! let response = bridge.handle(&request).await?;
//! println!("{}", serde_json::to_string(&response).expect("serializable"));
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{ConfigCache, Snapshot};
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::registry::{HttpRegistry, ItemRegistry};
use crate::state::DeviceStates;
use crate::sync::{SyncDevice, enumerate};

/// Environment variable holding the configuration path.
pub const CONFIG_ENV: &str = "ASSISTANT_BRIDGE_CONFIG";

/// Configuration path used when [`CONFIG_ENV`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

// ============================================================================
// Requests
// ============================================================================

/// Intents understood by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Describe all devices.
    Sync,
    /// Report device states.
    Query,
    /// Apply commands to devices.
    Execute,
    /// Account unlinked.
    Disconnect,
}

impl Intent {
    /// Returns the protocol name of this intent.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sync => "action.devices.SYNC",
            Self::Query => "action.devices.QUERY",
            Self::Execute => "action.devices.EXECUTE",
            Self::Disconnect => "action.devices.DISCONNECT",
        }
    }

    /// Looks up an intent by its protocol name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        [Self::Sync, Self::Query, Self::Execute, Self::Disconnect]
            .into_iter()
            .find(|intent| intent.name() == name)
    }
}

/// A fulfillment request as posted by the assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentRequest {
    /// Opaque id echoed in the reply.
    pub request_id: String,
    /// Request inputs; only the first one is handled.
    #[serde(default)]
    pub inputs: Vec<RequestInput>,
}

/// One input of a fulfillment request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestInput {
    /// Protocol intent name.
    pub intent: String,
    /// Intent-specific payload.
    #[serde(default)]
    pub payload: Value,
}

/// Payload of a QUERY input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryPayload {
    /// Devices to report.
    pub devices: Vec<DeviceRef>,
}

/// Reference to a device by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRef {
    /// Device id.
    pub id: String,
}

/// Payload of an EXECUTE input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutePayload {
    /// Command groups.
    pub commands: Vec<ExecuteCommand>,
}

/// A group of executions applied to a set of devices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteCommand {
    /// Target devices.
    pub devices: Vec<DeviceRef>,
    /// Commands applied to every target, in order.
    pub execution: Vec<Execution>,
}

/// A single command with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    /// Protocol command name.
    pub command: String,
    /// Command parameters.
    #[serde(default)]
    pub params: Value,
}

// ============================================================================
// Responses
// ============================================================================

/// A fulfillment reply.
///
/// DISCONNECT replies leave both fields unset and serialize to `{}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentResponse {
    /// Echo of the request id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Intent-specific reply.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<ResponsePayload>,
}

/// Intent-specific reply payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponsePayload {
    /// SYNC reply.
    Sync {
        /// Account id.
        #[serde(rename = "agentUserId")]
        agent_user_id: String,
        /// Device descriptions.
        devices: Vec<SyncDevice>,
    },
    /// QUERY reply.
    Query {
        /// States keyed by device id.
        devices: BTreeMap<String, DeviceStates>,
    },
    /// EXECUTE reply.
    Execute {
        /// One result per device and command.
        commands: Vec<CommandResult>,
    },
}

/// Outcome of one command on one device.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult {
    /// The device id, as a one-element list.
    pub ids: Vec<String>,
    /// Whether the command succeeded.
    pub status: CommandStatus,
    /// Resulting state on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub states: Option<DeviceStates>,
    /// Protocol error code on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// Human-readable failure description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_string: Option<String>,
}

/// Status of a [`CommandResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CommandStatus {
    /// The command was applied.
    Success,
    /// The command failed for this device.
    Error,
}

impl CommandResult {
    /// Creates a successful result.
    #[must_use]
    pub fn success(id: impl Into<String>, states: DeviceStates) -> Self {
        Self {
            ids: vec![id.into()],
            status: CommandStatus::Success,
            states: Some(states),
            error_code: None,
            debug_string: None,
        }
    }

    /// Creates a failed result from an error.
    #[must_use]
    pub fn error(id: impl Into<String>, error: &Error) -> Self {
        Self {
            ids: vec![id.into()],
            status: CommandStatus::Error,
            states: None,
            error_code: Some(error.error_code().to_string()),
            debug_string: Some(error.to_string()),
        }
    }
}

// ============================================================================
// Bridge
// ============================================================================

/// Dispatches fulfillment requests against a configuration file.
///
/// Each request reads the configuration through the cache, so edits to the
/// file take effect on the next request.
#[derive(Debug, Clone)]
pub struct Bridge<'c> {
    config_path: PathBuf,
    cache: &'c ConfigCache,
}

impl Bridge<'static> {
    /// Creates a bridge backed by the process-wide configuration cache.
    #[must_use]
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self::with_cache(config_path, ConfigCache::global())
    }

    /// Creates a bridge for the path in `ASSISTANT_BRIDGE_CONFIG`, or
    /// `config.yaml` when it is unset.
    #[must_use]
    pub fn from_env() -> Self {
        let path = std::env::var_os(CONFIG_ENV)
            .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
        Self::new(path)
    }
}

impl<'c> Bridge<'c> {
    /// Creates a bridge backed by a caller-owned cache.
    #[must_use]
    pub fn with_cache(config_path: impl Into<PathBuf>, cache: &'c ConfigCache) -> Self {
        Self {
            config_path: config_path.into(),
            cache,
        }
    }

    /// Returns the configuration path.
    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Returns the current configuration snapshot.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the file cannot be loaded.
    pub fn snapshot(&self) -> Result<Arc<Snapshot>> {
        Ok(self.cache.snapshot(&self.config_path)?)
    }

    /// Handles one fulfillment request.
    ///
    /// Only the first input is considered; a request without inputs gets a
    /// reply carrying just the request id.
    ///
    /// # Errors
    ///
    /// Returns `Error::Request` for an unknown intent or malformed payload,
    /// `Error::Config` if the configuration cannot be loaded, and
    /// `Error::Registry` if a QUERY cannot fetch items. EXECUTE failures are
    /// reported per device inside the reply.
    pub async fn handle(&self, request: &FulfillmentRequest) -> Result<FulfillmentResponse> {
        let Some(input) = request.inputs.first() else {
            return Ok(FulfillmentResponse {
                request_id: Some(request.request_id.clone()),
                payload: None,
            });
        };

        let intent = Intent::from_name(&input.intent)
            .ok_or_else(|| Error::Request(format!("unknown intent: {}", input.intent)))?;

        tracing::debug!(
            request_id = %request.request_id,
            intent = intent.name(),
            "Handling fulfillment request"
        );

        let payload = match intent {
            Intent::Disconnect => return Ok(FulfillmentResponse::default()),
            Intent::Sync => {
                let snapshot = self.snapshot()?;
                ResponsePayload::Sync {
                    agent_user_id: snapshot.agent_user_id().to_string(),
                    devices: enumerate(&snapshot),
                }
            }
            Intent::Query => {
                let payload: QueryPayload = parse_payload(&input.payload)?;
                let snapshot = self.snapshot()?;
                query(&snapshot, &payload).await?
            }
            Intent::Execute => {
                let payload: ExecutePayload = parse_payload(&input.payload)?;
                let snapshot = self.snapshot()?;
                execute(&snapshot, &payload).await
            }
        };

        Ok(FulfillmentResponse {
            request_id: Some(request.request_id.clone()),
            payload: Some(payload),
        })
    }
}

fn parse_payload<T: DeserializeOwned>(payload: &Value) -> Result<T> {
    T::deserialize(payload).map_err(|e| Error::Request(e.to_string()))
}

async fn query(snapshot: &Snapshot, payload: &QueryPayload) -> Result<ResponsePayload> {
    let registry = HttpRegistry::from_snapshot(snapshot)?;
    let engine = Engine::new(snapshot, &registry);
    let ids: Vec<&str> = payload.devices.iter().map(|d| d.id.as_str()).collect();

    Ok(ResponsePayload::Query {
        devices: engine.query(ids.as_slice()).await?,
    })
}

async fn execute(snapshot: &Snapshot, payload: &ExecutePayload) -> ResponsePayload {
    let registry = HttpRegistry::from_snapshot(snapshot).map_err(Error::from);
    execute_with(snapshot, registry.as_ref(), payload).await
}

/// Runs every execution against every target device.
///
/// A registry that could not be set up fails only the known devices; unknown
/// devices still report `{online: true}`.
async fn execute_with<R: ItemRegistry>(
    snapshot: &Snapshot,
    registry: std::result::Result<&R, &Error>,
    payload: &ExecutePayload,
) -> ResponsePayload {
    let mut results = Vec::new();

    for command in &payload.commands {
        for execution in &command.execution {
            for device in &command.devices {
                let outcome = match registry {
                    Ok(registry) => {
                        Engine::new(snapshot, registry)
                            .execute(&device.id, &execution.command, &execution.params)
                            .await
                    }
                    Err(_) if snapshot.device(&device.id).is_none() => Ok(DeviceStates::online()),
                    Err(e) => {
                        results.push(failed(&device.id, &execution.command, e));
                        continue;
                    }
                };
                results.push(match outcome {
                    Ok(states) => CommandResult::success(&device.id, states),
                    Err(e) => failed(&device.id, &execution.command, &e),
                });
            }
        }
    }

    ResponsePayload::Execute { commands: results }
}

fn failed(id: &str, command: &str, error: &Error) -> CommandResult {
    tracing::warn!(device = id, command, error = %error, "Command failed");
    CommandResult::error(id, error)
}
