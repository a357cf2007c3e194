//! Runtime settings for the extension facade.

use tether_config::Config;

use crate::version::{ProtocolVersion, VersionParseError};

/// Extension name used when nothing else is configured.
pub const DEFAULT_EXTENSION_NAME: &str = "scm";

/// Settings derived from [`Config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionSettings {
    extension_name: String,
    version_ceiling: Option<ProtocolVersion>,
}

impl Default for ExtensionSettings {
    fn default() -> Self {
        Self {
            extension_name: DEFAULT_EXTENSION_NAME.to_owned(),
            version_ceiling: None,
        }
    }
}

impl ExtensionSettings {
    /// Creates settings.
    #[must_use]
    pub fn new(extension_name: impl Into<String>, version_ceiling: Option<ProtocolVersion>) -> Self {
        Self {
            extension_name: extension_name.into(),
            version_ceiling,
        }
    }

    /// Returns the extension name sent with each request.
    #[must_use]
    pub const fn extension_name(&self) -> &str {
        self.extension_name.as_str()
    }

    /// Returns the highest version the server may negotiate.
    #[must_use]
    pub const fn version_ceiling(&self) -> Option<ProtocolVersion> {
        self.version_ceiling
    }

    /// Returns the offered versions after applying the ceiling.
    #[must_use]
    pub fn offered_versions(&self, server: &[ProtocolVersion]) -> Vec<ProtocolVersion> {
        server
            .iter()
            .copied()
            .filter(|version| self.version_ceiling.is_none_or(|ceiling| *version <= ceiling))
            .collect()
    }
}

impl TryFrom<&Config> for ExtensionSettings {
    type Error = VersionParseError;

    fn try_from(config: &Config) -> Result<Self, Self::Error> {
        let version_ceiling = config
            .max_protocol_version()
            .map(str::parse::<ProtocolVersion>)
            .transpose()?;
        Ok(Self::new(config.extension_name(), version_ceiling))
    }
}
