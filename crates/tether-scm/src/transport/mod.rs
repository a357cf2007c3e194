//! The seam between the protocol core and the plugin host.
//!
//! The core never talks to plugin processes itself. It builds a
//! [`TransportRequest`] naming the plugin, extension, protocol version and
//! operation, hands it to a [`PluginTransport`], and decodes whatever body
//! comes back.

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;

use crate::version::ProtocolVersion;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// A request addressed to one plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    plugin_id: String,
    extension: String,
    version: ProtocolVersion,
    operation: &'static str,
    body: Option<String>,
}

impl TransportRequest {
    /// Creates a request.
    #[must_use]
    pub fn new(
        plugin_id: impl Into<String>,
        extension: impl Into<String>,
        version: ProtocolVersion,
        operation: &'static str,
        body: Option<String>,
    ) -> Self {
        Self {
            plugin_id: plugin_id.into(),
            extension: extension.into(),
            version,
            operation,
            body,
        }
    }

    /// Returns the target plugin.
    #[must_use]
    pub const fn plugin_id(&self) -> &str {
        self.plugin_id.as_str()
    }

    /// Returns the extension name, normally `scm`.
    #[must_use]
    pub const fn extension(&self) -> &str {
        self.extension.as_str()
    }

    /// Returns the negotiated protocol version.
    #[must_use]
    pub const fn version(&self) -> ProtocolVersion {
        self.version
    }

    /// Returns the wire operation name.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        self.operation
    }

    /// Returns the JSON body, if the operation sends one.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }
}

/// A plugin's reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportResponse {
    body: Option<String>,
    headers: BTreeMap<String, String>,
}

impl TransportResponse {
    /// A response carrying `body`.
    #[must_use]
    pub fn with_body(body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            headers: BTreeMap::new(),
        }
    }

    /// A response with no body.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Adds a response header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Returns the body, if any.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Returns the response headers.
    #[must_use]
    pub const fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Consumes the response, returning the body.
    #[must_use]
    pub fn into_body(self) -> Option<String> {
        self.body
    }
}

/// Failures reported by a transport.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The plugin is not running or cannot be reached.
    #[error("plugin '{plugin_id}' is unavailable")]
    Unavailable {
        /// Plugin that was addressed.
        plugin_id: String,
    },

    /// The plugin answered with a non-success status code.
    #[error("plugin '{plugin_id}' answered '{operation}' with status {status}")]
    Status {
        /// Plugin that answered.
        plugin_id: String,
        /// Wire operation name.
        operation: String,
        /// Status code returned.
        status: u16,
    },

    /// The plugin host reported a failure.
    #[error("plugin '{plugin_id}' failed: {message}")]
    Failed {
        /// Plugin that was addressed.
        plugin_id: String,
        /// Human-readable description.
        message: String,
    },

    /// An I/O error occurred while talking to the plugin.
    #[error("I/O error communicating with plugin '{plugin_id}': {source}")]
    Io {
        /// Plugin that was addressed.
        plugin_id: String,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },
}

/// Delivers requests to plugins.
///
/// Implementations must be safe to call from several threads; the core
/// shares one transport across all operations.
pub trait PluginTransport {
    /// Sends `request` and waits for the reply.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the plugin cannot be reached or
    /// reports a failure.
    fn submit(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError>;
}

impl<T: PluginTransport + ?Sized> PluginTransport for Arc<T> {
    fn submit(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError> {
        (**self).submit(request)
    }
}

impl<T: PluginTransport + ?Sized> PluginTransport for &T {
    fn submit(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError> {
        (**self).submit(request)
    }
}
