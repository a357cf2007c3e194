//! Protocol implementations, one variant per supported version.
//!
//! Both variants share the codec; they differ in which operations exist.
//! Version 1.0 has no capabilities or webhook operations: capability
//! discovery degrades to [`CapabilityDiscovery::Unsupported`] and webhook
//! queries fail with [`ProtocolError::UnsupportedOperation`].

use tracing::{debug, warn};

use super::operation::{ScmOperation, operation_table};
use crate::capability::CapabilityDiscovery;
use crate::error::ProtocolError;
use crate::model::{
    CheckResult, MaterialData, PollResult, PropertyConfiguration, Revision, ScmView,
    ValidationOutcome,
};
use crate::transport::{PluginTransport, TransportRequest};
use crate::version::ProtocolVersion;
use crate::wire::{self, EncodeError, WebhookEvent};

const EXTENSION_TARGET: &str = "tether_scm::extension";

/// Addressing shared by every request of one facade call.
pub(crate) struct PluginCall<'a, T> {
    pub(crate) transport: &'a T,
    pub(crate) plugin_id: &'a str,
    pub(crate) extension: &'a str,
}

/// The protocol implementation selected by version negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionedExtension {
    /// Protocol 1.0.
    V1,
    /// Protocol 2.0.
    V2,
}

impl VersionedExtension {
    /// Selects the implementation for a negotiated version.
    #[must_use]
    pub const fn for_version(version: ProtocolVersion) -> Option<Self> {
        match (version.major(), version.minor()) {
            (1, 0) => Some(Self::V1),
            (2, 0) => Some(Self::V2),
            _ => None,
        }
    }

    /// Returns the version this implementation speaks.
    #[must_use]
    pub const fn version(self) -> ProtocolVersion {
        match self {
            Self::V1 => ProtocolVersion::V1,
            Self::V2 => ProtocolVersion::V2,
        }
    }

    /// Returns the wire name of `operation`, or `None` if this version lacks
    /// it.
    #[must_use]
    pub fn operation_name(self, operation: ScmOperation) -> Option<&'static str> {
        operation_table(self.version())?
            .contains(&operation)
            .then_some(operation.name())
    }

    pub(crate) fn get_configuration<T: PluginTransport>(
        self,
        call: &PluginCall<'_, T>,
    ) -> Result<PropertyConfiguration, ProtocolError> {
        let body = self.exchange(call, ScmOperation::GetConfiguration, || Ok(None))?;
        wire::decode_configuration(body.as_deref())
            .map_err(|error| ProtocolError::malformed(call.plugin_id, error))
    }

    pub(crate) fn get_view<T: PluginTransport>(
        self,
        call: &PluginCall<'_, T>,
    ) -> Result<ScmView, ProtocolError> {
        let body = self.exchange(call, ScmOperation::GetView, || Ok(None))?;
        wire::decode_view(body.as_deref())
            .map_err(|error| ProtocolError::malformed(call.plugin_id, error))
    }

    pub(crate) fn validate_configuration<T: PluginTransport>(
        self,
        call: &PluginCall<'_, T>,
        configuration: &PropertyConfiguration,
    ) -> Result<ValidationOutcome, ProtocolError> {
        let body = self.exchange(call, ScmOperation::ValidateConfiguration, || {
            wire::encode_configuration_request(configuration).map(Some)
        })?;
        wire::decode_validation(body.as_deref())
            .map_err(|error| ProtocolError::malformed(call.plugin_id, error))
    }

    pub(crate) fn check_connection<T: PluginTransport>(
        self,
        call: &PluginCall<'_, T>,
        configuration: &PropertyConfiguration,
    ) -> Result<CheckResult, ProtocolError> {
        let body = self.exchange(call, ScmOperation::CheckConnection, || {
            wire::encode_configuration_request(configuration).map(Some)
        })?;
        wire::decode_check_result(body.as_deref())
            .map_err(|error| ProtocolError::malformed(call.plugin_id, error))
    }

    pub(crate) fn get_latest_revision<T: PluginTransport>(
        self,
        call: &PluginCall<'_, T>,
        configuration: &PropertyConfiguration,
        material_data: &MaterialData,
        flyweight_folder: &str,
    ) -> Result<PollResult, ProtocolError> {
        let body = self.exchange(call, ScmOperation::LatestRevision, || {
            wire::encode_latest_revision_request(configuration, material_data, flyweight_folder)
                .map(Some)
        })?;
        wire::decode_latest_revision(body.as_deref())
            .map_err(|error| ProtocolError::malformed(call.plugin_id, error))
    }

    pub(crate) fn get_revisions_since<T: PluginTransport>(
        self,
        call: &PluginCall<'_, T>,
        configuration: &PropertyConfiguration,
        material_data: &MaterialData,
        flyweight_folder: &str,
        previous_revision: &Revision,
    ) -> Result<PollResult, ProtocolError> {
        let body = self.exchange(call, ScmOperation::LatestRevisionsSince, || {
            wire::encode_revisions_since_request(
                configuration,
                material_data,
                flyweight_folder,
                previous_revision,
            )
            .map(Some)
        })?;
        wire::decode_revisions_since(body.as_deref())
            .map_err(|error| ProtocolError::malformed(call.plugin_id, error))
    }

    pub(crate) fn checkout<T: PluginTransport>(
        self,
        call: &PluginCall<'_, T>,
        configuration: &PropertyConfiguration,
        destination_folder: &str,
        revision: &Revision,
    ) -> Result<CheckResult, ProtocolError> {
        let body = self.exchange(call, ScmOperation::Checkout, || {
            wire::encode_checkout_request(configuration, destination_folder, revision).map(Some)
        })?;
        wire::decode_check_result(body.as_deref())
            .map_err(|error| ProtocolError::malformed(call.plugin_id, error))
    }

    pub(crate) fn get_capabilities<T: PluginTransport>(
        self,
        call: &PluginCall<'_, T>,
    ) -> Result<CapabilityDiscovery, ProtocolError> {
        match self {
            Self::V1 => {
                warn!(
                    target: EXTENSION_TARGET,
                    plugin = call.plugin_id,
                    version = %self.version(),
                    "SCM plugin protocol cannot declare capabilities; assuming none"
                );
                Ok(CapabilityDiscovery::Unsupported {
                    version: self.version(),
                })
            }
            Self::V2 => {
                let body = self.exchange(call, ScmOperation::GetCapabilities, || Ok(None))?;
                wire::decode_capabilities(body.as_deref())
                    .map(CapabilityDiscovery::Declared)
                    .map_err(|error| ProtocolError::malformed(call.plugin_id, error))
            }
        }
    }

    pub(crate) fn should_update<T: PluginTransport>(
        self,
        call: &PluginCall<'_, T>,
        event: &WebhookEvent,
        configurations: &[PropertyConfiguration],
    ) -> Result<Vec<PropertyConfiguration>, ProtocolError> {
        let body = self.exchange(call, ScmOperation::ShouldUpdate, || {
            wire::encode_should_update_request(event, configurations).map(Some)
        })?;
        wire::decode_should_update(body.as_deref())
            .map_err(|error| ProtocolError::malformed(call.plugin_id, error))
    }

    /// Checks the operation exists, builds the body and submits it.
    ///
    /// The body is only built once the operation is known to exist.
    fn exchange<T, F>(
        self,
        call: &PluginCall<'_, T>,
        operation: ScmOperation,
        body: F,
    ) -> Result<Option<String>, ProtocolError>
    where
        T: PluginTransport,
        F: FnOnce() -> Result<Option<String>, EncodeError>,
    {
        let name = self.operation_name(operation).ok_or_else(|| {
            ProtocolError::UnsupportedOperation {
                plugin_id: call.plugin_id.to_owned(),
                operation,
                version: self.version(),
            }
        })?;
        let payload = body().map_err(|error| ProtocolError::encode(call.plugin_id, error))?;
        let request = TransportRequest::new(
            call.plugin_id,
            call.extension,
            self.version(),
            name,
            payload,
        );
        debug!(
            target: EXTENSION_TARGET,
            plugin = call.plugin_id,
            operation = name,
            version = %self.version(),
            "submitting SCM plugin request"
        );
        let response = call.transport.submit(&request)?;
        Ok(response.into_body())
    }
}
