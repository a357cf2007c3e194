//! Shared configuration for services embedding the Tether SCM protocol core.
//!
//! Configuration is layered by `ortho_config`: built-in defaults, then
//! configuration files (`--config-path` or `TETHER_CONFIG_PATH`), then
//! `TETHER_*` environment variables, then command-line flags. The resulting
//! [`Config`] carries the logging setup consumed by [`telemetry::initialise`]
//! and the protocol knobs consumed by `tether-scm`.

mod defaults;
mod logging;
pub mod telemetry;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_EXTENSION_NAME, DEFAULT_LOG_FILTER, default_extension_name_string,
    default_log_filter, default_log_filter_string, default_log_format,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Configuration shared by every component that talks to SCM plugins.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "TETHER")]
pub struct Config {
    /// Tracing filter expression, for example `info` or `tether_scm=debug`.
    #[ortho_config(default = default_log_filter_string())]
    log_filter: String,
    /// Output format for structured logs.
    #[ortho_config(default = default_log_format())]
    log_format: LogFormat,
    /// Extension name sent to the transport with every plugin request.
    #[ortho_config(default = default_extension_name_string())]
    extension_name: String,
    /// Highest protocol revision the server may negotiate, such as `1.0`.
    max_protocol_version: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            extension_name: default_extension_name_string(),
            max_protocol_version: None,
        }
    }
}

impl Config {
    /// Returns the tracing filter expression.
    #[must_use]
    pub const fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Returns the log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Returns the extension name used on the wire.
    #[must_use]
    pub const fn extension_name(&self) -> &str {
        self.extension_name.as_str()
    }

    /// Returns the configured protocol ceiling, when one is set.
    #[must_use]
    pub fn max_protocol_version(&self) -> Option<&str> {
        self.max_protocol_version.as_deref()
    }

    /// Overrides the protocol ceiling.
    #[must_use]
    pub fn with_max_protocol_version(mut self, version: impl Into<String>) -> Self {
        self.max_protocol_version = Some(version.into());
        self
    }

    /// Overrides the extension name.
    #[must_use]
    pub fn with_extension_name(mut self, name: impl Into<String>) -> Self {
        self.extension_name = name.into();
        self
    }
}
