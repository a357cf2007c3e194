//! Strict decoding of plugin responses into domain values.
//!
//! Bodies are parsed into an order-preserving [`Node`] tree first so that
//! every rule (mandatory keys, value types, closed sets, duplicate keys) can
//! be reported with the payload, key and field it concerns.

use serde::Deserialize;

use super::error::{Constraint, DecodeError, PayloadKind, Shape};
use super::node::{Fields, Node, repeated_key};
use super::timestamp::parse_timestamp;
use crate::capability::{Capabilities, WebhookSupport};
use crate::model::{
    CheckResult, CheckStatus, MaterialData, ModifiedAction, ModifiedFile, PollResult, Property,
    PropertyConfiguration, Revision, ScmView, ValidationError, ValidationOutcome,
};

const STATUS_NAMES: &[&str] = &["success", "failure"];

// ---------------------------------------------------------------------------
// Public decoders
// ---------------------------------------------------------------------------

/// Decodes a `scm-configuration` response.
///
/// # Errors
///
/// Fails on an empty body, a non-map body, a blank or repeated key, or an
/// option with the wrong type.
pub fn decode_configuration(body: Option<&str>) -> Result<PropertyConfiguration, DecodeError> {
    let payload = PayloadKind::ScmConfiguration;
    match parse_required(body, payload)? {
        Node::Map(entries) => configuration_from_entries(entries),
        _ => Err(shape_error(payload, Shape::Map)),
    }
}

/// Decodes a `scm-view` response.
///
/// # Errors
///
/// Fails unless both `displayValue` and `template` are non-blank strings.
pub fn decode_view(body: Option<&str>) -> Result<ScmView, DecodeError> {
    let payload = PayloadKind::ScmView;
    let Node::Map(entries) = parse_required(body, payload)? else {
        return Err(shape_error(payload, Shape::Map));
    };
    let mut fields = Fields::new(payload, entries)?;
    let display_value = required_string(&mut fields, payload, "displayValue")?;
    let template = required_string(&mut fields, payload, "template")?;
    Ok(ScmView::new(display_value, template))
}

/// Decodes a `validate-scm-configuration` response.
///
/// An empty body means the configuration is valid.
///
/// # Errors
///
/// Fails when the body is not a list of maps, an entry lacks a `message`, or
/// an entry has non-string `key` or `message` values.
pub fn decode_validation(body: Option<&str>) -> Result<ValidationOutcome, DecodeError> {
    let payload = PayloadKind::ValidationResult;
    let Some(node) = parse(body, payload)? else {
        return Ok(ValidationOutcome::success());
    };
    let Node::List(items) = node else {
        return Err(shape_error(payload, Shape::ListOfMaps));
    };
    items
        .into_iter()
        .map(validation_error_from_node)
        .collect::<Result<Vec<_>, _>>()
        .map(ValidationOutcome::with_errors)
}

/// Decodes a `check-scm-connection` or `checkout` response.
///
/// # Errors
///
/// Fails on an empty body, a missing or unknown `status`, or `messages`
/// that is not a list of strings.
pub fn decode_check_result(body: Option<&str>) -> Result<CheckResult, DecodeError> {
    let payload = PayloadKind::CheckResult;
    let Node::Map(entries) = parse_required(body, payload)? else {
        return Err(shape_error(payload, Shape::Map));
    };
    let mut fields = Fields::new(payload, entries)?;
    let status = match fields.take("status") {
        Some(Node::String(status)) => match status.as_str() {
            "success" => CheckStatus::Success,
            "failure" => CheckStatus::Failure,
            _ => {
                return Err(
                    DecodeError::new(payload, Constraint::OneOf(STATUS_NAMES)).with_field("status")
                );
            }
        },
        Some(_) => return Err(shape_error(payload, Shape::String).with_field("status")),
        None => return Err(DecodeError::new(payload, Constraint::Required).with_field("status")),
    };
    let messages = match fields.take("messages") {
        None => Vec::new(),
        Some(Node::List(items)) => items
            .into_iter()
            .map(|item| match item {
                Node::String(message) => Ok(message),
                _ => Err(shape_error(payload, Shape::ListOfStrings).with_field("messages")),
            })
            .collect::<Result<_, _>>()?,
        Some(_) => return Err(shape_error(payload, Shape::ListOfStrings).with_field("messages")),
    };
    Ok(CheckResult::new(status, messages))
}

/// Decodes a `latest-revision` response.
///
/// # Errors
///
/// Fails on an empty body or a missing `revision`, as well as on any
/// malformed revision or `scm-data`.
pub fn decode_latest_revision(body: Option<&str>) -> Result<PollResult, DecodeError> {
    let payload = PayloadKind::LatestRevision;
    let Node::Map(entries) = parse_required(body, payload)? else {
        return Err(shape_error(payload, Shape::Map));
    };
    let mut fields = Fields::new(payload, entries)?;
    let revision = match fields.take("revision") {
        Some(node) => revision_from_node(node)?,
        None => {
            return Err(DecodeError::new(payload, Constraint::Required).with_field("revision"));
        }
    };
    let material_data = material_data_from(fields.take("scm-data"))?;
    Ok(PollResult::latest(revision, material_data))
}

/// Decodes a `latest-revisions-since` response.
///
/// An empty body means nothing changed: no revisions and no material data.
///
/// # Errors
///
/// Fails when `revisions` is not a list of maps or any entry or `scm-data`
/// is malformed.
pub fn decode_revisions_since(body: Option<&str>) -> Result<PollResult, DecodeError> {
    let payload = PayloadKind::RevisionsSince;
    let Some(node) = parse(body, payload)? else {
        return Ok(PollResult::default());
    };
    let Node::Map(entries) = node else {
        return Err(shape_error(payload, Shape::Map));
    };
    let mut fields = Fields::new(payload, entries)?;
    let revisions = match fields.take("revisions") {
        None => None,
        Some(Node::List(items)) => Some(
            items
                .into_iter()
                .map(revision_from_node)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Some(_) => return Err(shape_error(payload, Shape::ListOfMaps).with_field("revisions")),
    };
    let material_data = material_data_from(fields.take("scm-data"))?;
    Ok(PollResult::since(revisions, material_data))
}

/// Decodes a `get-capabilities` response.
///
/// An empty body declares no capabilities.
///
/// # Errors
///
/// Fails when the body does not match `{"supported_webhooks":[...]}`.
pub fn decode_capabilities(body: Option<&str>) -> Result<Capabilities, DecodeError> {
    let Some(raw) = content(body) else {
        return Ok(Capabilities::default());
    };
    let declared: Option<CapabilitiesDto> = serde_json::from_str(raw).map_err(|error| {
        DecodeError::new(PayloadKind::Capabilities, Constraint::Schema(error.to_string()))
    })?;
    Ok(declared.map(Capabilities::from).unwrap_or_default())
}

/// Decodes a `should-update` response into the configurations the plugin
/// selected.
///
/// # Errors
///
/// Fails on an empty body, a body that is not a list of maps, or any entry
/// that is not a valid configuration.
pub fn decode_should_update(body: Option<&str>) -> Result<Vec<PropertyConfiguration>, DecodeError> {
    let payload = PayloadKind::ShouldUpdate;
    let Node::List(items) = parse_required(body, payload)? else {
        return Err(shape_error(payload, Shape::ListOfMaps));
    };
    items
        .into_iter()
        .map(|item| match item {
            Node::Map(entries) => configuration_from_entries(entries),
            _ => Err(shape_error(payload, Shape::ListOfMaps)),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Body handling
// ---------------------------------------------------------------------------

fn content(body: Option<&str>) -> Option<&str> {
    body.filter(|raw| !raw.trim().is_empty())
}

/// Parses a body, mapping blank bodies and a JSON `null` to `None`.
fn parse(body: Option<&str>, payload: PayloadKind) -> Result<Option<Node>, DecodeError> {
    let Some(raw) = content(body) else {
        return Ok(None);
    };
    let node: Node = serde_json::from_str(raw)
        .map_err(|error| DecodeError::new(payload, Constraint::InvalidJson(error.to_string())))?;
    Ok((!node.is_null()).then_some(node))
}

fn parse_required(body: Option<&str>, payload: PayloadKind) -> Result<Node, DecodeError> {
    parse(body, payload)?.ok_or_else(|| DecodeError::new(payload, Constraint::EmptyBody))
}

const fn shape_error(payload: PayloadKind, shape: Shape) -> DecodeError {
    DecodeError::new(payload, Constraint::ExpectedShape(shape))
}

fn required_string(
    fields: &mut Fields,
    payload: PayloadKind,
    field: &'static str,
) -> Result<String, DecodeError> {
    match fields.take(field) {
        Some(Node::String(value)) if !value.trim().is_empty() => Ok(value),
        Some(Node::String(_)) | None => {
            Err(DecodeError::new(payload, Constraint::Required).with_field(field))
        }
        Some(_) => Err(shape_error(payload, Shape::String).with_field(field)),
    }
}

fn optional_string(
    fields: &mut Fields,
    payload: PayloadKind,
    field: &'static str,
) -> Result<Option<String>, DecodeError> {
    match fields.take(field) {
        None => Ok(None),
        Some(Node::String(value)) => Ok(Some(value)),
        Some(_) => Err(shape_error(payload, Shape::String).with_field(field)),
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

fn configuration_from_entries(
    entries: Vec<(String, Node)>,
) -> Result<PropertyConfiguration, DecodeError> {
    let payload = PayloadKind::ScmConfiguration;
    let mut configuration = PropertyConfiguration::new();
    for (key, node) in entries {
        if key.trim().is_empty() {
            return Err(DecodeError::new(payload, Constraint::EmptyKey));
        }
        if configuration.contains_key(&key) {
            return Err(DecodeError::new(payload, Constraint::DuplicateKey).with_key(key));
        }
        configuration.insert(property_from_node(key, node)?);
    }
    Ok(configuration)
}

fn property_from_node(key: String, node: Node) -> Result<Property, DecodeError> {
    let Node::Map(entries) = node else {
        return Err(shape_error(PayloadKind::ScmConfiguration, Shape::Map).with_key(key));
    };
    let mut options = Fields::new(PayloadKind::ScmConfiguration, entries)?;
    let value = property_option(&mut options, &key, "value", as_string, Shape::String)?;
    let default_value =
        property_option(&mut options, &key, "default-value", as_string, Shape::String)?;
    let required = property_option(&mut options, &key, "required", as_bool, Shape::Boolean)?;
    let secure = property_option(&mut options, &key, "secure", as_bool, Shape::Boolean)?;
    let part_of_identity =
        property_option(&mut options, &key, "part-of-identity", as_bool, Shape::Boolean)?;
    let display_name =
        property_option(&mut options, &key, "display-name", as_string, Shape::String)?;
    let display_order =
        property_option(&mut options, &key, "display-order", as_i32, Shape::Integer)?;

    Ok(Property::new(key, value.or(default_value).unwrap_or_default())
        .with_required(required.unwrap_or(false))
        .with_secure(secure.unwrap_or(false))
        .with_part_of_identity(part_of_identity.unwrap_or(false))
        .with_display_name(display_name.unwrap_or_default())
        .with_display_order(display_order.unwrap_or(0)))
}

/// Reads one property option. Absent is `None`; present with the wrong type
/// (including `null`) is an error.
fn property_option<T>(
    options: &mut Fields,
    key: &str,
    field: &'static str,
    convert: fn(Node) -> Option<T>,
    shape: Shape,
) -> Result<Option<T>, DecodeError> {
    options
        .take_raw(field)
        .map(|node| {
            convert(node).ok_or_else(|| {
                shape_error(PayloadKind::ScmConfiguration, shape)
                    .with_key(key)
                    .with_field(field)
            })
        })
        .transpose()
}

fn as_string(node: Node) -> Option<String> {
    match node {
        Node::String(value) => Some(value),
        _ => None,
    }
}

fn as_bool(node: Node) -> Option<bool> {
    match node {
        Node::Bool(value) => Some(value),
        _ => None,
    }
}

fn as_i32(node: Node) -> Option<i32> {
    match node {
        Node::Number(number) => number.as_i64().and_then(|value| i32::try_from(value).ok()),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validation_error_from_node(node: Node) -> Result<ValidationError, DecodeError> {
    let payload = PayloadKind::ValidationResult;
    let Node::Map(entries) = node else {
        return Err(shape_error(payload, Shape::ListOfMaps));
    };
    let mut fields = Fields::new(payload, entries)?;
    let key = optional_string(&mut fields, payload, "key")?.unwrap_or_default();
    let message = optional_string(&mut fields, payload, "message")?
        .ok_or_else(|| DecodeError::new(payload, Constraint::Required).with_field("message"))?;
    Ok(ValidationError::for_field(key, message))
}

// ---------------------------------------------------------------------------
// Revisions
// ---------------------------------------------------------------------------

fn revision_from_node(node: Node) -> Result<Revision, DecodeError> {
    let payload = PayloadKind::Revision;
    let Node::Map(entries) = node else {
        return Err(shape_error(payload, Shape::Map));
    };
    let mut fields = Fields::new(payload, entries)?;
    let id = required_string(&mut fields, payload, "revision")?;
    let timestamp = match fields.take("timestamp") {
        Some(Node::String(raw)) => parse_timestamp(&raw),
        _ => None,
    }
    .ok_or_else(|| DecodeError::new(payload, Constraint::TimestampFormat).with_field("timestamp"))?;
    let author = optional_string(&mut fields, payload, "user")?;
    let comment = optional_string(&mut fields, payload, "revisionComment")?;
    let data = match fields.take("data") {
        None => MaterialData::new(),
        Some(Node::Map(entries)) => string_map(entries, PayloadKind::RevisionData)?,
        Some(_) => return Err(shape_error(payload, Shape::Map).with_field("data")),
    };
    let modified_files = match fields.take("modifiedFiles") {
        None => Vec::new(),
        Some(Node::List(items)) => items
            .into_iter()
            .map(modified_file_from_node)
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err(shape_error(payload, Shape::ListOfMaps).with_field("modifiedFiles")),
    };

    let mut revision = Revision::new(id, timestamp)
        .with_data(data)
        .with_modified_files(modified_files);
    if let Some(name) = author {
        revision = revision.with_author(name);
    }
    if let Some(text) = comment {
        revision = revision.with_comment(text);
    }
    Ok(revision)
}

fn modified_file_from_node(node: Node) -> Result<ModifiedFile, DecodeError> {
    let payload = PayloadKind::ModifiedFile;
    let Node::Map(entries) = node else {
        return Err(shape_error(payload, Shape::Map));
    };
    let mut fields = Fields::new(payload, entries)?;
    let path = required_string(&mut fields, payload, "fileName")?;
    let action = match fields.take("action") {
        Some(Node::String(name)) => ModifiedAction::from_wire(&name),
        Some(_) => return Err(shape_error(payload, Shape::String).with_field("action")),
        None => None,
    }
    .ok_or_else(|| {
        DecodeError::new(payload, Constraint::OneOf(ModifiedAction::NAMES)).with_field("action")
    })?;
    Ok(ModifiedFile::new(path, action))
}

fn material_data_from(node: Option<Node>) -> Result<Option<MaterialData>, DecodeError> {
    match node {
        None => Ok(None),
        Some(Node::Map(entries)) => string_map(entries, PayloadKind::ScmData).map(Some),
        Some(_) => Err(shape_error(PayloadKind::ScmData, Shape::Map)),
    }
}

fn string_map(entries: Vec<(String, Node)>, payload: PayloadKind) -> Result<MaterialData, DecodeError> {
    if let Some(key) = repeated_key(&entries) {
        return Err(DecodeError::new(payload, Constraint::DuplicateKey).with_key(key));
    }
    entries
        .into_iter()
        .map(|(key, node)| match node {
            Node::String(value) => Ok((key, value)),
            _ => Err(shape_error(payload, Shape::String).with_key(key)),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Capabilities
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CapabilitiesDto {
    #[serde(default)]
    supported_webhooks: Vec<WebhookSupportDto>,
}

#[derive(Debug, Deserialize)]
struct WebhookSupportDto {
    provider: String,
    #[serde(default)]
    events: Vec<String>,
}

impl From<CapabilitiesDto> for Capabilities {
    fn from(dto: CapabilitiesDto) -> Self {
        Self::new(
            dto.supported_webhooks
                .into_iter()
                .map(|support| WebhookSupport::new(support.provider, support.events))
                .collect(),
        )
    }
}
