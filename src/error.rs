// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the bridge.
//!
//! Errors are split by where they originate: loading the configuration
//! file, talking to the item registry, or interpreting an assistant command.
//! Each family maps to an assistant error code through [`Error::error_code`].

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// The configuration file could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A call to the item registry failed.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// An assistant command could not be applied to a device.
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// A fulfillment request payload does not have the expected shape.
    #[error("malformed request: {0}")]
    Request(String),
}

impl Error {
    /// Returns the assistant protocol error code for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use assistant_bridge::error::{CommandError, Error};
    ///
    /// let err: Error = CommandError::UnsupportedColorType.into();
    /// assert_eq!(err.error_code(), "notSupported");
    /// ```
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "hardError",
            Self::Registry(_) => "transientError",
            Self::Command(err) => err.error_code(),
            Self::Request(_) => "protocolError",
        }
    }
}

/// Errors raised while loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file is missing or unreadable.
    #[error("cannot read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid YAML or does not match the expected layout.
    #[error("malformed configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A required top-level key is absent.
    #[error("missing required key: {0}")]
    MissingKey(&'static str),

    /// A key is present but its value is unusable.
    #[error("invalid value for {key}: {message}")]
    InvalidValue {
        /// The offending key.
        key: &'static str,
        /// Description of the problem.
        message: String,
    },
}

/// Errors raised by the item registry client.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Transport failure or timeout.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The registry answered with a non-success status.
    #[error("HTTP {status} - {reason}")]
    Status {
        /// Numeric HTTP status.
        status: u16,
        /// Canonical reason phrase.
        reason: String,
    },

    /// The response body is not the expected JSON.
    #[error("invalid registry response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The configured base URL is unusable.
    #[error("invalid registry URL: {0}")]
    InvalidUrl(String),
}

/// Errors scoped to one command on one device.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The command name is not part of the supported vocabulary.
    #[error("unsupported command: {0}")]
    UnsupportedCommand(String),

    /// The color payload does not match the device's color capability.
    #[error("unsupported color type")]
    UnsupportedColorType,

    /// The device has no attributes block.
    #[error("attributes not set")]
    AttributesNotSet,

    /// The device does not bind the trait the command needs.
    #[error("device has no {0} binding")]
    MissingTrait(&'static str),

    /// The command parameters are malformed.
    #[error("invalid parameters for {command}: {message}")]
    InvalidParams {
        /// The command that was being parsed.
        command: String,
        /// Description of the problem.
        message: String,
    },
}

impl CommandError {
    /// Returns the assistant protocol error code for this error.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedCommand(_) => "functionNotSupported",
            Self::UnsupportedColorType | Self::AttributesNotSet | Self::MissingTrait(_) => {
                "notSupported"
            }
            Self::InvalidParams { .. } => "protocolError",
        }
    }
}

/// Errors raised when a registry state string cannot be turned into a value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// The state does not hold exactly three comma-separated components.
    #[error("expected three comma-separated components, got {0:?}")]
    InvalidComponents(String),

    /// A component is not a number.
    #[error("invalid number: {0:?}")]
    InvalidNumber(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_error_display() {
        assert_eq!(
            CommandError::AttributesNotSet.to_string(),
            "attributes not set"
        );
        assert_eq!(
            CommandError::UnsupportedCommand("action.devices.commands.Dock".to_string())
                .to_string(),
            "unsupported command: action.devices.commands.Dock"
        );
    }

    #[test]
    fn registry_status_display() {
        let err = RegistryError::Status {
            status: 404,
            reason: "Not Found".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 404 - Not Found");
    }

    #[test]
    fn error_from_command_error() {
        let err: Error = CommandError::MissingTrait("OnOff").into();
        assert!(matches!(
            err,
            Error::Command(CommandError::MissingTrait("OnOff"))
        ));
    }

    #[test]
    fn error_codes() {
        let unsupported: Error =
            CommandError::UnsupportedCommand("x".to_string()).into();
        assert_eq!(unsupported.error_code(), "functionNotSupported");

        let missing: Error = ConfigError::MissingKey("devices").into();
        assert_eq!(missing.error_code(), "hardError");

        let status: Error = RegistryError::Status {
            status: 500,
            reason: "Internal Server Error".to_string(),
        }
        .into();
        assert_eq!(status.error_code(), "transientError");
    }
}
