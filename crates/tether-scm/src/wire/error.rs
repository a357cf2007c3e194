//! Codec failures.

use std::fmt;

use thiserror::Error;

/// Which payload a decode failure was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    /// Configuration map from `scm-configuration` or `should-update`.
    ScmConfiguration,
    /// View from `scm-view`.
    ScmView,
    /// Error list from `validate-scm-configuration`.
    ValidationResult,
    /// Status from `check-scm-connection` or `checkout`.
    CheckResult,
    /// Envelope of a `latest-revision` response.
    LatestRevision,
    /// Envelope of a `latest-revisions-since` response.
    RevisionsSince,
    /// A revision object.
    Revision,
    /// The `data` map of a revision.
    RevisionData,
    /// An entry of a revision's `modifiedFiles`.
    ModifiedFile,
    /// The `scm-data` map of a polling response.
    ScmData,
    /// Capabilities from `get-capabilities`.
    Capabilities,
    /// Configuration list from `should-update`.
    ShouldUpdate,
}

impl PayloadKind {
    /// Returns the label used in diagnostics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ScmConfiguration => "SCM configuration",
            Self::ScmView => "SCM view",
            Self::ValidationResult => "validation result",
            Self::CheckResult => "check result",
            Self::LatestRevision => "latest revision response",
            Self::RevisionsSince => "revisions response",
            Self::Revision => "SCM revision",
            Self::RevisionData => "SCM revision data",
            Self::ModifiedFile => "modified file",
            Self::ScmData => "SCM data",
            Self::Capabilities => "capabilities",
            Self::ShouldUpdate => "should-update response",
        }
    }
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A JSON type a value was expected to have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// A JSON object.
    Map,
    /// A JSON array.
    List,
    /// A JSON array of objects.
    ListOfMaps,
    /// A JSON array of strings.
    ListOfStrings,
    /// `true` or `false`.
    Boolean,
    /// A JSON string.
    String,
    /// A whole number within `i32`.
    Integer,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Map => "map",
            Self::List => "list",
            Self::ListOfMaps => "list of map",
            Self::ListOfStrings => "list of string",
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::Integer => "integer",
        })
    }
}

/// The rule a payload broke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// The body was absent or blank where content is mandatory.
    EmptyBody,
    /// The body is not JSON.
    InvalidJson(String),
    /// A value had the wrong JSON type.
    ExpectedShape(Shape),
    /// A mandatory value was absent or blank.
    Required,
    /// A map key was blank.
    EmptyKey,
    /// A map key appeared twice.
    DuplicateKey,
    /// A timestamp did not match the protocol format.
    TimestampFormat,
    /// A string was outside its closed set.
    OneOf(&'static [&'static str]),
    /// A structured payload did not match its schema.
    Schema(String),
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyBody => f.write_str("response body cannot be empty"),
            Self::InvalidJson(detail) => write!(f, "is not valid JSON ({detail})"),
            Self::ExpectedShape(shape) => write!(f, "should be of type {shape}"),
            Self::Required => f.write_str("is required and cannot be empty"),
            Self::EmptyKey => f.write_str("key cannot be empty"),
            Self::DuplicateKey => f.write_str("is declared more than once"),
            Self::TimestampFormat => write!(
                f,
                "should be of type string with format {} and cannot be empty",
                super::timestamp::TIMESTAMP_PATTERN
            ),
            Self::OneOf(allowed) => write!(f, "can only be one of {{{}}}", allowed.join(", ")),
            Self::Schema(detail) => write!(f, "does not match the expected structure ({detail})"),
        }
    }
}

/// A plugin response that breaks the wire contract.
///
/// Renders as, for example,
/// `SCM configuration: 'secure' property for key 'url' should be of type boolean`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    payload: PayloadKind,
    key: Option<String>,
    field: Option<&'static str>,
    constraint: Constraint,
}

impl DecodeError {
    /// Creates an error for the payload as a whole.
    #[must_use]
    pub const fn new(payload: PayloadKind, constraint: Constraint) -> Self {
        Self {
            payload,
            key: None,
            field: None,
            constraint,
        }
    }

    /// Attaches the map key the failure was found under.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Attaches the field the failure was found in.
    #[must_use]
    pub const fn with_field(mut self, field: &'static str) -> Self {
        self.field = Some(field);
        self
    }

    /// Returns the payload kind.
    #[must_use]
    pub const fn payload(&self) -> PayloadKind {
        self.payload
    }

    /// Returns the offending map key, when there is one.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Returns the offending field, when there is one.
    #[must_use]
    pub const fn field(&self) -> Option<&'static str> {
        self.field
    }

    /// Returns the broken rule.
    #[must_use]
    pub const fn constraint(&self) -> &Constraint {
        &self.constraint
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.payload)?;
        match (self.key.as_deref(), self.field) {
            (Some(key), Some(field)) => write!(f, ": '{field}' property for key '{key}'")?,
            (Some(key), None) => write!(f, ": key '{key}'")?,
            (None, Some(field)) => write!(f, ": '{field}'")?,
            (None, None) => {}
        }
        write!(f, " {}", self.constraint)
    }
}

impl std::error::Error for DecodeError {}

/// A request that could not be encoded.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// A configuration value still holds a secret placeholder.
    #[error("configuration key '{key}' holds an unresolved secret reference")]
    UnresolvedSecret {
        /// Key whose value is unresolved.
        key: String,
    },

    /// A timestamp could not be rendered.
    #[error("failed to format revision timestamp: {0}")]
    Timestamp(#[source] time::error::Format),

    /// JSON serialisation failed.
    #[error("failed to serialise plugin request: {0}")]
    Serialize(#[source] serde_json::Error),
}
