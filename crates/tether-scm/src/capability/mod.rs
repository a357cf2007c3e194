//! Webhook capabilities advertised by plugins.
//!
//! Plugins speaking protocol 2.0 can declare which webhook providers and
//! event types they react to. Older plugins cannot declare anything, which
//! [`CapabilityDiscovery::Unsupported`] keeps distinct from "declared
//! nothing".

use crate::version::ProtocolVersion;

/// Event types a plugin handles for one webhook provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookSupport {
    provider: String,
    events: Vec<String>,
}

impl WebhookSupport {
    /// Creates a provider entry.
    #[must_use]
    pub fn new<E: Into<String>>(provider: impl Into<String>, events: impl IntoIterator<Item = E>) -> Self {
        Self {
            provider: provider.into(),
            events: events.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the provider name, such as `github`.
    #[must_use]
    pub const fn provider(&self) -> &str {
        self.provider.as_str()
    }

    /// Returns the supported event types.
    #[must_use]
    pub const fn events(&self) -> &[String] {
        self.events.as_slice()
    }

    fn handles(&self, provider: &str, event: &str) -> bool {
        self.provider == provider && self.events.iter().any(|candidate| candidate == event)
    }
}

/// Everything a plugin declared it supports.
///
/// # Example
///
/// ```
/// use tether_scm::{Capabilities, WebhookSupport};
///
/// let capabilities =
///     Capabilities::new(vec![WebhookSupport::new("github", ["pull", "push"])]);
/// assert!(capabilities.supports_webhook("github", "pull"));
/// assert!(!capabilities.supports_webhook("GitHub", "pull"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    supported_webhooks: Vec<WebhookSupport>,
}

impl Capabilities {
    /// Creates capabilities from provider entries.
    #[must_use]
    pub const fn new(supported_webhooks: Vec<WebhookSupport>) -> Self {
        Self { supported_webhooks }
    }

    /// Returns the provider entries.
    #[must_use]
    pub const fn supported_webhooks(&self) -> &[WebhookSupport] {
        self.supported_webhooks.as_slice()
    }

    /// Returns `true` when nothing is supported.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.supported_webhooks.is_empty()
    }

    /// Returns whether `(provider, event)` is supported.
    ///
    /// Both names match exactly and case-sensitively.
    #[must_use]
    pub fn supports_webhook(&self, provider: &str, event: &str) -> bool {
        self.supported_webhooks
            .iter()
            .any(|support| support.handles(provider, event))
    }
}

/// Result of asking a plugin for its capabilities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityDiscovery {
    /// The negotiated protocol has no capabilities operation.
    Unsupported {
        /// Version that was negotiated.
        version: ProtocolVersion,
    },
    /// The plugin answered with these capabilities.
    Declared(Capabilities),
}

impl CapabilityDiscovery {
    /// Returns `true` when the plugin could answer.
    #[must_use]
    pub const fn is_supported(&self) -> bool {
        matches!(self, Self::Declared(_))
    }

    /// Collapses the discovery into capabilities, treating an unsupported
    /// query as empty.
    #[must_use]
    pub fn into_capabilities(self) -> Capabilities {
        match self {
            Self::Unsupported { .. } => Capabilities::default(),
            Self::Declared(capabilities) => capabilities,
        }
    }
}
