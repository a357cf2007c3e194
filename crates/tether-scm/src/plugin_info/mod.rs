//! Plugin info assembled when a plugin is loaded.
//!
//! [`PluginInfoBuilder`] asks a freshly registered plugin for its
//! configuration schema, view and capabilities and bundles the answers into
//! a [`ScmPluginInfo`], which the registry publishes for later lookups such
//! as webhook capability checks.

use tracing::info;

use crate::capability::Capabilities;
use crate::error::ProtocolError;
use crate::extension::ScmExtension;
use crate::model::PropertyConfiguration;
use crate::registry::{PluginRegistry, VersionCatalog};
use crate::transport::PluginTransport;

const PLUGIN_INFO_TARGET: &str = "tether_scm::plugin_info";

/// What the server knows about a loaded SCM plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScmPluginInfo {
    plugin_id: String,
    display_name: String,
    template: String,
    configuration: PropertyConfiguration,
    capabilities: Capabilities,
}

impl ScmPluginInfo {
    /// Creates plugin info.
    #[must_use]
    pub fn new(
        plugin_id: impl Into<String>,
        display_name: impl Into<String>,
        template: impl Into<String>,
        configuration: PropertyConfiguration,
        capabilities: Capabilities,
    ) -> Self {
        Self {
            plugin_id: plugin_id.into(),
            display_name: display_name.into(),
            template: template.into(),
            configuration,
            capabilities,
        }
    }

    /// Returns the plugin identifier.
    #[must_use]
    pub const fn plugin_id(&self) -> &str {
        self.plugin_id.as_str()
    }

    /// Returns the name shown for the plugin.
    #[must_use]
    pub const fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the configuration form template.
    #[must_use]
    pub const fn template(&self) -> &str {
        self.template.as_str()
    }

    /// Returns the configuration schema.
    #[must_use]
    pub const fn configuration(&self) -> &PropertyConfiguration {
        &self.configuration
    }

    /// Returns the declared capabilities, empty for protocol 1.0 plugins.
    #[must_use]
    pub const fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }
}

/// Builds [`ScmPluginInfo`] by querying a plugin through the facade.
#[derive(Debug)]
pub struct PluginInfoBuilder<'a, T, C> {
    extension: &'a ScmExtension<T, C>,
}

impl<'a, T, C> PluginInfoBuilder<'a, T, C>
where
    T: PluginTransport,
    C: VersionCatalog,
{
    /// Creates a builder over `extension`.
    #[must_use]
    pub const fn new(extension: &'a ScmExtension<T, C>) -> Self {
        Self { extension }
    }

    /// Queries configuration, view and capabilities.
    ///
    /// # Errors
    ///
    /// Returns the first failing query's error.
    pub fn build(&self, plugin_id: &str) -> Result<ScmPluginInfo, ProtocolError> {
        let configuration = self.extension.get_configuration(plugin_id)?;
        let (display_name, template) = self.extension.get_view(plugin_id)?.into_parts();
        let capabilities = self
            .extension
            .get_capabilities(plugin_id)?
            .into_capabilities();
        info!(
            target: PLUGIN_INFO_TARGET,
            plugin = plugin_id,
            properties = configuration.len(),
            webhook_providers = capabilities.supported_webhooks().len(),
            "built SCM plugin info"
        );
        Ok(ScmPluginInfo::new(
            plugin_id,
            display_name,
            template,
            configuration,
            capabilities,
        ))
    }

    /// Builds the info and publishes it to `registry`.
    ///
    /// # Errors
    ///
    /// Returns a query failure, or [`ProtocolError::PluginNotFound`] if the
    /// plugin left the registry meanwhile.
    pub fn publish(&self, plugin_id: &str, registry: &PluginRegistry) -> Result<(), ProtocolError> {
        registry.publish_info(self.build(plugin_id)?)
    }
}
