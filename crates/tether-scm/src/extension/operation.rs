//! Logical SCM operations and their wire names per protocol version.

use std::fmt;

use crate::version::ProtocolVersion;

/// An operation the server can ask an SCM plugin to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScmOperation {
    /// Fetch the configuration schema.
    GetConfiguration,
    /// Fetch the configuration form.
    GetView,
    /// Validate a configuration.
    ValidateConfiguration,
    /// Check connectivity for a configuration.
    CheckConnection,
    /// Fetch the newest revision.
    LatestRevision,
    /// Fetch revisions after a checkpoint.
    LatestRevisionsSince,
    /// Check out a revision.
    Checkout,
    /// Fetch declared capabilities.
    GetCapabilities,
    /// Ask which configurations a webhook event concerns.
    ShouldUpdate,
}

impl ScmOperation {
    /// Every operation, in protocol order.
    pub const ALL: [Self; 9] = [
        Self::GetConfiguration,
        Self::GetView,
        Self::ValidateConfiguration,
        Self::CheckConnection,
        Self::LatestRevision,
        Self::LatestRevisionsSince,
        Self::Checkout,
        Self::GetCapabilities,
        Self::ShouldUpdate,
    ];

    /// Returns the canonical wire name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::GetConfiguration => "scm-configuration",
            Self::GetView => "scm-view",
            Self::ValidateConfiguration => "validate-scm-configuration",
            Self::CheckConnection => "check-scm-connection",
            Self::LatestRevision => "latest-revision",
            Self::LatestRevisionsSince => "latest-revisions-since",
            Self::Checkout => "checkout",
            Self::GetCapabilities => "get-capabilities",
            Self::ShouldUpdate => "should-update",
        }
    }
}

impl fmt::Display for ScmOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const V1_OPERATIONS: &[ScmOperation] = &[
    ScmOperation::GetConfiguration,
    ScmOperation::GetView,
    ScmOperation::ValidateConfiguration,
    ScmOperation::CheckConnection,
    ScmOperation::LatestRevision,
    ScmOperation::LatestRevisionsSince,
    ScmOperation::Checkout,
];

/// Returns the operations `version` offers, or `None` for versions this
/// server does not implement.
///
/// Wire names always come from [`ScmOperation::name`].
#[must_use]
pub const fn operation_table(version: ProtocolVersion) -> Option<&'static [ScmOperation]> {
    match (version.major(), version.minor()) {
        (1, 0) => Some(V1_OPERATIONS),
        (2, 0) => Some(&ScmOperation::ALL),
        _ => None,
    }
}
