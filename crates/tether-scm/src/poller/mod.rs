//! Revision polling and webhook-driven material selection.
//!
//! A material with no checkpoint is polled in full (`latest-revision`); once
//! a checkpoint exists, only revisions after it are requested
//! (`latest-revisions-since`). Webhook events are forwarded to the plugin
//! only when it published support for the event, and the plugin's answer is
//! mapped back onto the caller's materials.

use tracing::debug;

use crate::error::ProtocolError;
use crate::extension::ScmExtension;
use crate::model::{Material, MaterialData, PollResult, PropertyConfiguration, Revision};
use crate::registry::{PluginRegistry, VersionCatalog};
use crate::transport::PluginTransport;
use crate::wire::WebhookEvent;

const POLLER_TARGET: &str = "tether_scm::poller";

/// Inputs to one poll of one material.
#[derive(Debug, Clone, Copy)]
pub struct PollRequest<'a> {
    configuration: &'a PropertyConfiguration,
    material_data: &'a MaterialData,
    flyweight_folder: &'a str,
    checkpoint: Option<&'a Revision>,
}

impl<'a> PollRequest<'a> {
    /// Creates a request for a material that has never been polled.
    #[must_use]
    pub const fn new(
        configuration: &'a PropertyConfiguration,
        material_data: &'a MaterialData,
        flyweight_folder: &'a str,
    ) -> Self {
        Self {
            configuration,
            material_data,
            flyweight_folder,
            checkpoint: None,
        }
    }

    /// Sets the last revision already seen.
    #[must_use]
    pub const fn with_checkpoint(mut self, checkpoint: &'a Revision) -> Self {
        self.checkpoint = Some(checkpoint);
        self
    }

    /// Returns the checkpoint, if any.
    #[must_use]
    pub const fn checkpoint(&self) -> Option<&'a Revision> {
        self.checkpoint
    }
}

/// Drives polling and webhook selection for one plugin host.
#[derive(Debug)]
pub struct RevisionPoller<'a, T, C> {
    extension: &'a ScmExtension<T, C>,
    registry: &'a PluginRegistry,
}

impl<'a, T, C> RevisionPoller<'a, T, C>
where
    T: PluginTransport,
    C: VersionCatalog,
{
    /// Creates a poller. `registry` supplies published capabilities.
    #[must_use]
    pub const fn new(extension: &'a ScmExtension<T, C>, registry: &'a PluginRegistry) -> Self {
        Self {
            extension,
            registry,
        }
    }

    /// Polls one material.
    ///
    /// Without a checkpoint the result carries the latest revision. With one
    /// it carries the revisions after it, empty when the plugin reports
    /// nothing new.
    ///
    /// # Errors
    ///
    /// Returns any facade error unchanged.
    pub fn poll(&self, plugin_id: &str, request: &PollRequest<'_>) -> Result<PollResult, ProtocolError> {
        match request.checkpoint {
            None => {
                debug!(target: POLLER_TARGET, plugin = plugin_id, "full poll");
                self.extension.get_latest_revision(
                    plugin_id,
                    request.configuration,
                    request.material_data,
                    request.flyweight_folder,
                )
            }
            Some(checkpoint) => {
                debug!(
                    target: POLLER_TARGET,
                    plugin = plugin_id,
                    checkpoint = checkpoint.id(),
                    "incremental poll"
                );
                self.extension
                    .get_revisions_since(
                        plugin_id,
                        request.configuration,
                        request.material_data,
                        request.flyweight_folder,
                        checkpoint,
                    )
                    .map(PollResult::with_revision_list)
            }
        }
    }

    /// Returns the materials a webhook event should trigger, in the order
    /// given.
    ///
    /// The plugin is not contacted when it has not published support for the
    /// event's provider and type. Configurations the plugin returns that
    /// match none of `materials` are ignored.
    ///
    /// # Errors
    ///
    /// Returns any facade error unchanged.
    pub fn materials_to_update(
        &self,
        plugin_id: &str,
        event: &WebhookEvent,
        materials: &[Material],
    ) -> Result<Vec<Material>, ProtocolError> {
        if materials.is_empty() {
            return Ok(Vec::new());
        }
        if !self
            .registry
            .supports_webhook(plugin_id, event.provider(), event.event_type())
        {
            debug!(
                target: POLLER_TARGET,
                plugin = plugin_id,
                provider = event.provider(),
                event = event.event_type(),
                "plugin does not handle webhook event"
            );
            return Ok(Vec::new());
        }

        let configurations: Vec<PropertyConfiguration> = materials
            .iter()
            .map(|material| material.configuration().clone())
            .collect();
        let selected = self
            .extension
            .should_react_to_webhook(plugin_id, event, &configurations)?;
        let identities: Vec<_> = selected.iter().map(PropertyConfiguration::identity).collect();

        let matched: Vec<Material> = materials
            .iter()
            .filter(|material| identities.contains(&material.configuration().identity()))
            .cloned()
            .collect();
        debug!(
            target: POLLER_TARGET,
            plugin = plugin_id,
            returned = selected.len(),
            matched = matched.len(),
            "webhook selected materials"
        );
        Ok(matched)
    }
}
