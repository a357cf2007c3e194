//! Request encoding.
//!
//! Request bodies are plain `serde` structs whose field order fixes the key
//! order on the wire. Configurations are checked for unresolved secret
//! references before anything is serialised.

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::error::EncodeError;
use super::timestamp::format_timestamp;
use crate::model::{MaterialData, PropertyConfiguration, Revision};

/// Prefix of a secret reference that has not been substituted yet.
pub const SECRET_PLACEHOLDER_PREFIX: &str = "{{SECRET:[";

/// Webhook event details forwarded to `should-update`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookEvent {
    provider: String,
    event_type: String,
    payload: String,
}

impl WebhookEvent {
    /// Creates an event.
    #[must_use]
    pub fn new(
        provider: impl Into<String>,
        event_type: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            event_type: event_type.into(),
            payload: payload.into(),
        }
    }

    /// Returns the provider name.
    #[must_use]
    pub const fn provider(&self) -> &str {
        self.provider.as_str()
    }

    /// Returns the event type.
    #[must_use]
    pub const fn event_type(&self) -> &str {
        self.event_type.as_str()
    }

    /// Returns the raw event payload.
    #[must_use]
    pub const fn payload(&self) -> &str {
        self.payload.as_str()
    }
}

// ---------------------------------------------------------------------------
// Encoders
// ---------------------------------------------------------------------------

/// Encodes the body shared by `validate-scm-configuration` and
/// `check-scm-connection`.
///
/// # Errors
///
/// Returns [`EncodeError::UnresolvedSecret`] for placeholder values and
/// [`EncodeError::Serialize`] if serialisation fails.
pub fn encode_configuration_request(
    configuration: &PropertyConfiguration,
) -> Result<String, EncodeError> {
    to_json(&ConfigurationRequest {
        configuration: ConfigurationPayload::resolved(configuration)?,
    })
}

/// Encodes a `latest-revision` request.
///
/// # Errors
///
/// As for [`encode_configuration_request`].
pub fn encode_latest_revision_request(
    configuration: &PropertyConfiguration,
    material_data: &MaterialData,
    flyweight_folder: &str,
) -> Result<String, EncodeError> {
    to_json(&LatestRevisionRequest {
        configuration: ConfigurationPayload::resolved(configuration)?,
        material_data,
        flyweight_folder,
    })
}

/// Encodes a `latest-revisions-since` request.
///
/// # Errors
///
/// As for [`encode_configuration_request`], plus
/// [`EncodeError::Timestamp`] when the checkpoint cannot be formatted.
pub fn encode_revisions_since_request(
    configuration: &PropertyConfiguration,
    material_data: &MaterialData,
    flyweight_folder: &str,
    previous_revision: &Revision,
) -> Result<String, EncodeError> {
    to_json(&RevisionsSinceRequest {
        configuration: ConfigurationPayload::resolved(configuration)?,
        material_data,
        flyweight_folder,
        previous_revision: RevisionPayload::try_from(previous_revision)?,
    })
}

/// Encodes a `checkout` request.
///
/// # Errors
///
/// As for [`encode_revisions_since_request`].
pub fn encode_checkout_request(
    configuration: &PropertyConfiguration,
    destination_folder: &str,
    revision: &Revision,
) -> Result<String, EncodeError> {
    to_json(&CheckoutRequest {
        configuration: ConfigurationPayload::resolved(configuration)?,
        destination_folder,
        revision: RevisionPayload::try_from(revision)?,
    })
}

/// Encodes a `should-update` request carrying every candidate configuration.
///
/// # Errors
///
/// As for [`encode_configuration_request`].
pub fn encode_should_update_request(
    event: &WebhookEvent,
    configurations: &[PropertyConfiguration],
) -> Result<String, EncodeError> {
    to_json(&ShouldUpdateRequest {
        provider: event.provider(),
        event_type: event.event_type(),
        event_payload: event.payload(),
        configurations: configurations
            .iter()
            .map(ConfigurationPayload::resolved)
            .collect::<Result<_, _>>()?,
    })
}

fn to_json<T: Serialize>(request: &T) -> Result<String, EncodeError> {
    serde_json::to_string(request).map_err(EncodeError::Serialize)
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

/// `{"key":{"value":"..."}, ...}` in insertion order.
struct ConfigurationPayload<'a>(&'a PropertyConfiguration);

impl<'a> ConfigurationPayload<'a> {
    fn resolved(configuration: &'a PropertyConfiguration) -> Result<Self, EncodeError> {
        if let Some(unresolved) = configuration
            .iter()
            .find(|property| property.value().contains(SECRET_PLACEHOLDER_PREFIX))
        {
            return Err(EncodeError::UnresolvedSecret {
                key: unresolved.key().to_owned(),
            });
        }
        Ok(Self(configuration))
    }
}

impl Serialize for ConfigurationPayload<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for property in self.0 {
            map.serialize_entry(
                property.key(),
                &ValueEntry {
                    value: property.value(),
                },
            )?;
        }
        map.end()
    }
}

#[derive(serde::Serialize)]
struct ValueEntry<'a> {
    value: &'a str,
}

#[derive(serde::Serialize)]
struct RevisionPayload<'a> {
    revision: &'a str,
    timestamp: String,
    data: &'a MaterialData,
}

impl<'a> TryFrom<&'a Revision> for RevisionPayload<'a> {
    type Error = EncodeError;

    fn try_from(revision: &'a Revision) -> Result<Self, Self::Error> {
        Ok(Self {
            revision: revision.id(),
            timestamp: format_timestamp(revision.timestamp()).map_err(EncodeError::Timestamp)?,
            data: revision.data(),
        })
    }
}

#[derive(serde::Serialize)]
struct ConfigurationRequest<'a> {
    #[serde(rename = "scm-configuration")]
    configuration: ConfigurationPayload<'a>,
}

#[derive(serde::Serialize)]
struct LatestRevisionRequest<'a> {
    #[serde(rename = "scm-configuration")]
    configuration: ConfigurationPayload<'a>,
    #[serde(rename = "scm-data")]
    material_data: &'a MaterialData,
    #[serde(rename = "flyweight-folder")]
    flyweight_folder: &'a str,
}

#[derive(serde::Serialize)]
struct RevisionsSinceRequest<'a> {
    #[serde(rename = "scm-configuration")]
    configuration: ConfigurationPayload<'a>,
    #[serde(rename = "scm-data")]
    material_data: &'a MaterialData,
    #[serde(rename = "flyweight-folder")]
    flyweight_folder: &'a str,
    #[serde(rename = "previous-revision")]
    previous_revision: RevisionPayload<'a>,
}

#[derive(serde::Serialize)]
struct CheckoutRequest<'a> {
    #[serde(rename = "scm-configuration")]
    configuration: ConfigurationPayload<'a>,
    #[serde(rename = "destination-folder")]
    destination_folder: &'a str,
    revision: RevisionPayload<'a>,
}

#[derive(serde::Serialize)]
struct ShouldUpdateRequest<'a> {
    provider: &'a str,
    event_type: &'a str,
    event_payload: &'a str,
    #[serde(rename = "scm-configurations")]
    configurations: Vec<ConfigurationPayload<'a>>,
}
