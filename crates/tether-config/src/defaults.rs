use crate::logging::LogFormat;

/// Default log filter expression used by embedding services.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Extension name SCM plugins register under.
pub const DEFAULT_EXTENSION_NAME: &str = "scm";

/// Default log filter expression used by embedding services.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Owned extension name used where allocation is required.
#[must_use]
pub fn default_extension_name_string() -> String {
    DEFAULT_EXTENSION_NAME.to_owned()
}
