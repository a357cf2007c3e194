//! The SCM extension facade.
//!
//! [`ScmExtension`] is the single entry point for talking to SCM plugins. On
//! every call it reads the plugin's declared versions from the
//! [`VersionCatalog`], negotiates the highest version shared with the server,
//! and routes the call to the matching [`VersionedExtension`]. Nothing about
//! the resolution is cached, so a plugin re-registered with different
//! versions is picked up on its next call.

mod operation;
mod versioned;

use tracing::debug;

pub use self::operation::{ScmOperation, operation_table};
pub use self::versioned::VersionedExtension;
use self::versioned::PluginCall;
use crate::capability::CapabilityDiscovery;
use crate::error::ProtocolError;
use crate::model::{
    CheckResult, MaterialData, PollResult, PropertyConfiguration, Revision, ScmView,
    ValidationOutcome,
};
use crate::registry::VersionCatalog;
use crate::settings::ExtensionSettings;
use crate::transport::PluginTransport;
use crate::version::{ProtocolVersion, SERVER_VERSIONS, VersionSet, negotiate};
use crate::wire::WebhookEvent;

const RESOLVE_TARGET: &str = "tether_scm::resolve";

/// Version-resolving facade over SCM plugins.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use tether_scm::{
///     PluginDescriptor, PluginRegistry, PluginTransport, ProtocolVersion, ScmExtension,
///     TransportError, TransportRequest, TransportResponse,
/// };
///
/// struct ViewOnly;
///
/// impl PluginTransport for ViewOnly {
///     fn submit(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError> {
///         assert_eq!(request.operation(), "scm-view");
///         assert_eq!(request.version(), ProtocolVersion::V2);
///         Ok(TransportResponse::with_body(r#"{"displayValue":"Git","template":"<div/>"}"#))
///     }
/// }
///
/// let registry = Arc::new(PluginRegistry::new());
/// registry
///     .register(PluginDescriptor::new("git", vec![ProtocolVersion::V1, ProtocolVersion::V2]))
///     .expect("register");
///
/// let extension = ScmExtension::new(ViewOnly, Arc::clone(&registry));
/// let view = extension.get_view("git").expect("view");
/// assert_eq!(view.display_value(), "Git");
/// ```
#[derive(Debug)]
pub struct ScmExtension<T, C> {
    transport: T,
    catalog: C,
    settings: ExtensionSettings,
}

impl<T, C> ScmExtension<T, C>
where
    T: PluginTransport,
    C: VersionCatalog,
{
    /// Creates a facade with default settings.
    #[must_use]
    pub fn new(transport: T, catalog: C) -> Self {
        Self {
            transport,
            catalog,
            settings: ExtensionSettings::default(),
        }
    }

    /// Replaces the settings.
    #[must_use]
    pub fn with_settings(mut self, settings: ExtensionSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Returns the active settings.
    #[must_use]
    pub const fn settings(&self) -> &ExtensionSettings {
        &self.settings
    }

    /// Returns the transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the versions this server offers after applying the ceiling.
    #[must_use]
    pub fn server_versions(&self) -> Vec<ProtocolVersion> {
        self.settings.offered_versions(SERVER_VERSIONS)
    }

    /// Negotiates the protocol version for `plugin_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::PluginNotFound`] for unknown plugins and
    /// [`ProtocolError::NoCompatibleVersion`] when no version is shared.
    pub fn resolve(&self, plugin_id: &str) -> Result<ProtocolVersion, ProtocolError> {
        self.implementation(plugin_id)
            .map(VersionedExtension::version)
    }

    /// Fetches the plugin's configuration schema.
    ///
    /// # Errors
    ///
    /// Returns a resolution, transport or decode failure.
    pub fn get_configuration(&self, plugin_id: &str) -> Result<PropertyConfiguration, ProtocolError> {
        self.implementation(plugin_id)?
            .get_configuration(&self.call(plugin_id))
    }

    /// Fetches the plugin's configuration form.
    ///
    /// # Errors
    ///
    /// Returns a resolution, transport or decode failure.
    pub fn get_view(&self, plugin_id: &str) -> Result<ScmView, ProtocolError> {
        self.implementation(plugin_id)?
            .get_view(&self.call(plugin_id))
    }

    /// Asks the plugin to validate a configuration.
    ///
    /// # Errors
    ///
    /// Returns a resolution, encode, transport or decode failure.
    pub fn validate_configuration(
        &self,
        plugin_id: &str,
        configuration: &PropertyConfiguration,
    ) -> Result<ValidationOutcome, ProtocolError> {
        self.implementation(plugin_id)?
            .validate_configuration(&self.call(plugin_id), configuration)
    }

    /// Asks the plugin whether it can reach the configured repository.
    ///
    /// # Errors
    ///
    /// Returns a resolution, encode, transport or decode failure.
    pub fn check_connection(
        &self,
        plugin_id: &str,
        configuration: &PropertyConfiguration,
    ) -> Result<CheckResult, ProtocolError> {
        self.implementation(plugin_id)?
            .check_connection(&self.call(plugin_id), configuration)
    }

    /// Fetches the newest revision.
    ///
    /// # Errors
    ///
    /// Returns a resolution, encode, transport or decode failure.
    pub fn get_latest_revision(
        &self,
        plugin_id: &str,
        configuration: &PropertyConfiguration,
        material_data: &MaterialData,
        flyweight_folder: &str,
    ) -> Result<PollResult, ProtocolError> {
        self.implementation(plugin_id)?.get_latest_revision(
            &self.call(plugin_id),
            configuration,
            material_data,
            flyweight_folder,
        )
    }

    /// Fetches revisions made after `previous_revision`.
    ///
    /// # Errors
    ///
    /// Returns a resolution, encode, transport or decode failure.
    pub fn get_revisions_since(
        &self,
        plugin_id: &str,
        configuration: &PropertyConfiguration,
        material_data: &MaterialData,
        flyweight_folder: &str,
        previous_revision: &Revision,
    ) -> Result<PollResult, ProtocolError> {
        self.implementation(plugin_id)?.get_revisions_since(
            &self.call(plugin_id),
            configuration,
            material_data,
            flyweight_folder,
            previous_revision,
        )
    }

    /// Asks the plugin to check out `revision` into `destination_folder`.
    ///
    /// # Errors
    ///
    /// Returns a resolution, encode, transport or decode failure.
    pub fn checkout(
        &self,
        plugin_id: &str,
        configuration: &PropertyConfiguration,
        destination_folder: &str,
        revision: &Revision,
    ) -> Result<CheckResult, ProtocolError> {
        self.implementation(plugin_id)?.checkout(
            &self.call(plugin_id),
            configuration,
            destination_folder,
            revision,
        )
    }

    /// Asks the plugin what it supports.
    ///
    /// On protocol 1.0 this does not contact the plugin and returns
    /// [`CapabilityDiscovery::Unsupported`].
    ///
    /// # Errors
    ///
    /// Returns a resolution, transport or decode failure.
    pub fn get_capabilities(&self, plugin_id: &str) -> Result<CapabilityDiscovery, ProtocolError> {
        self.implementation(plugin_id)?
            .get_capabilities(&self.call(plugin_id))
    }

    /// Asks the plugin which of `configurations` a webhook event concerns.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::UnsupportedOperation`] on protocol 1.0, or a
    /// resolution, encode, transport or decode failure.
    pub fn should_react_to_webhook(
        &self,
        plugin_id: &str,
        event: &WebhookEvent,
        configurations: &[PropertyConfiguration],
    ) -> Result<Vec<PropertyConfiguration>, ProtocolError> {
        self.implementation(plugin_id)?
            .should_update(&self.call(plugin_id), event, configurations)
    }

    fn implementation(&self, plugin_id: &str) -> Result<VersionedExtension, ProtocolError> {
        let declared = self.catalog.declared_versions(plugin_id).ok_or_else(|| {
            ProtocolError::PluginNotFound {
                plugin_id: plugin_id.to_owned(),
            }
        })?;
        let offered = self.server_versions();
        let no_match = || ProtocolError::NoCompatibleVersion {
            plugin_id: plugin_id.to_owned(),
            plugin_versions: VersionSet::from(declared.clone()),
            server_versions: VersionSet::from(offered.clone()),
        };
        let version = negotiate(&offered, &declared).ok_or_else(no_match)?;
        debug!(
            target: RESOLVE_TARGET,
            plugin = plugin_id,
            version = %version,
            "resolved SCM protocol version"
        );
        VersionedExtension::for_version(version).ok_or_else(no_match)
    }

    fn call<'a>(&'a self, plugin_id: &'a str) -> PluginCall<'a, T> {
        PluginCall {
            transport: &self.transport,
            plugin_id,
            extension: self.settings.extension_name(),
        }
    }
}

#[cfg(test)]
mod tests;
