//! Errors raised by SCM extension operations.
//!
//! Every operation returns [`ProtocolError`]. Transport failures pass through
//! unchanged; decode and encode failures keep their structured detail so
//! callers can tell which payload, key and rule were involved.

use thiserror::Error;

use crate::extension::ScmOperation;
use crate::transport::TransportError;
use crate::version::{ProtocolVersion, VersionSet};
use crate::wire::{DecodeError, EncodeError};

/// Errors arising from SCM extension operations.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The plugin is not known to the version catalogue.
    #[error("SCM plugin '{plugin_id}' is not registered")]
    PluginNotFound {
        /// Plugin that was looked up.
        plugin_id: String,
    },

    /// The plugin and server share no protocol version.
    #[error(
        "SCM plugin '{plugin_id}' supports versions [{plugin_versions}] but the server supports [{server_versions}]"
    )]
    NoCompatibleVersion {
        /// Plugin that was resolved.
        plugin_id: String,
        /// Versions the plugin declared.
        plugin_versions: VersionSet,
        /// Versions the server offered.
        server_versions: VersionSet,
    },

    /// The negotiated version has no such operation.
    #[error("operation '{operation}' is not available to plugin '{plugin_id}' on protocol {version}")]
    UnsupportedOperation {
        /// Plugin that was called.
        plugin_id: String,
        /// Operation that was requested.
        operation: ScmOperation,
        /// Version that was negotiated.
        version: ProtocolVersion,
    },

    /// The plugin response broke the wire contract.
    #[error("SCM plugin '{plugin_id}' returned a malformed response: {source}")]
    MalformedPluginResponse {
        /// Plugin that answered.
        plugin_id: String,
        /// What was wrong with the response.
        #[source]
        source: Box<DecodeError>,
    },

    /// The request could not be encoded.
    #[error("failed to build request for SCM plugin '{plugin_id}': {source}")]
    EncodeRequest {
        /// Plugin the request was meant for.
        plugin_id: String,
        /// Why encoding failed.
        #[source]
        source: EncodeError,
    },

    /// The descriptor offered to the registry is invalid.
    #[error("invalid plugin descriptor: {message}")]
    InvalidDescriptor {
        /// Description of the problem.
        message: String,
    },

    /// The transport failed; passed through unchanged.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ProtocolError {
    /// Wraps a decode failure for `plugin_id`.
    pub(crate) fn malformed(plugin_id: &str, error: DecodeError) -> Self {
        Self::MalformedPluginResponse {
            plugin_id: plugin_id.to_owned(),
            source: Box::new(error),
        }
    }

    /// Wraps an encode failure for `plugin_id`.
    pub(crate) fn encode(plugin_id: &str, error: EncodeError) -> Self {
        Self::EncodeRequest {
            plugin_id: plugin_id.to_owned(),
            source: error,
        }
    }
}
