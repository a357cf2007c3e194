//! Versioned protocol core for source-control plugins.
//!
//! The `tether-scm` crate lets a build server talk to SCM plugins that may
//! speak different revisions of the same JSON request/response protocol.
//! Callers use one facade, [`ScmExtension`], which negotiates the protocol
//! version with each plugin on every call and routes the request to the
//! matching [`VersionedExtension`].
//!
//! # Architecture
//!
//! - [`wire`] encodes requests and strictly decodes responses.
//! - [`transport`] is the seam to the plugin host: the core builds a
//!   [`TransportRequest`] and a [`PluginTransport`] delivers it.
//! - [`registry`] records each plugin's declared versions and, once built,
//!   its [`ScmPluginInfo`].
//! - [`poller`] chooses between full and incremental polls and maps webhook
//!   answers back onto materials.
//!
//! Protocol 1.0 offers configuration, validation, polling and checkout.
//! Protocol 2.0 adds capability discovery and webhook-driven updates.

pub mod capability;
pub mod error;
pub mod extension;
pub mod model;
pub mod plugin_info;
pub mod poller;
pub mod registry;
pub mod settings;
pub mod transport;
pub mod version;
pub mod wire;

#[cfg(test)]
mod tests;

pub use self::capability::{Capabilities, CapabilityDiscovery, WebhookSupport};
pub use self::error::ProtocolError;
pub use self::extension::{ScmExtension, ScmOperation, VersionedExtension};
pub use self::model::{
    CheckResult, CheckStatus, Material, MaterialData, ModifiedAction, ModifiedFile, PollResult,
    Property, PropertyConfiguration, Revision, ScmView, ValidationError, ValidationOutcome,
};
pub use self::plugin_info::{PluginInfoBuilder, ScmPluginInfo};
pub use self::poller::{PollRequest, RevisionPoller};
pub use self::registry::{PluginDescriptor, PluginRecord, PluginRegistry, VersionCatalog};
pub use self::settings::ExtensionSettings;
pub use self::transport::{PluginTransport, TransportError, TransportRequest, TransportResponse};
pub use self::version::{ProtocolVersion, SERVER_VERSIONS, VersionParseError, negotiate};
pub use self::wire::{DecodeError, EncodeError, WebhookEvent};
