//! Materials tracked by the server.

use super::PropertyConfiguration;

/// A source-control location the server polls, identified by its
/// configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Material {
    id: String,
    configuration: PropertyConfiguration,
}

impl Material {
    /// Creates a material.
    #[must_use]
    pub fn new(id: impl Into<String>, configuration: PropertyConfiguration) -> Self {
        Self {
            id: id.into(),
            configuration,
        }
    }

    /// Returns the server-side material identifier.
    #[must_use]
    pub const fn id(&self) -> &str {
        self.id.as_str()
    }

    /// Returns the plugin configuration for this material.
    #[must_use]
    pub const fn configuration(&self) -> &PropertyConfiguration {
        &self.configuration
    }
}
