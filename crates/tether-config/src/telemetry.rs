//! Tracing setup for hosts of the SCM protocol core.
//!
//! [`subscriber`] builds a formatter from a [`Config`] without touching global
//! state. [`initialise`] installs it once per process.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::{EnvFilter, fmt};

use crate::{Config, LogFormat};

static INSTALLED: OnceCell<()> = OnceCell::new();

/// Boxed subscriber produced from configuration.
pub type BoxedSubscriber = Box<dyn Subscriber + Send + Sync>;

/// Proof that the global subscriber is in place.
#[derive(Debug, Default, Clone, Copy)]
pub struct TelemetryHandle;

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The configured filter expression does not parse.
    #[error("invalid log filter '{expression}': {message}")]
    Filter {
        /// Expression taken from the configuration.
        expression: String,
        /// Parser diagnostic.
        message: String,
    },
    /// Another global subscriber was installed first.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(#[from] SetGlobalDefaultError),
}

/// Installs the configured subscriber as the global default.
///
/// Only the first successful call installs anything; later calls return a
/// handle straight away, whatever configuration they pass.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] when the filter does not parse and
/// [`TelemetryError::Subscriber`] when a subscriber was installed elsewhere.
///
/// # Examples
///
/// ```rust,no_run
/// use tether_config::{Config, telemetry};
///
/// # fn main() -> Result<(), telemetry::TelemetryError> {
/// let _handle = telemetry::initialise(&Config::default())?;
/// tracing::info!(target: "tether_scm::extension", "ready");
/// # Ok(())
/// # }
/// ```
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    INSTALLED.get_or_try_init(|| {
        let subscriber = subscriber(config)?;
        tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::from)
    })?;
    Ok(TelemetryHandle)
}

/// Builds the subscriber described by `config`.
///
/// Events go to stderr with their target and level, stamped in RFC 3339 UTC.
/// Colour is only used when stderr is a terminal.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] when the filter does not parse.
pub fn subscriber(config: &Config) -> Result<BoxedSubscriber, TelemetryError> {
    let filter = filter_for(config)?;
    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_thread_names(false)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_timer(fmt::time::UtcTime::rfc_3339());

    Ok(match config.log_format() {
        LogFormat::Json => Box::new(builder.json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder.compact().finish()),
    })
}

/// Parses the configured filter expression.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] when the expression is invalid.
pub fn filter_for(config: &Config) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(config.log_filter()).map_err(|error| TelemetryError::Filter {
        expression: config.log_filter().to_owned(),
        message: error.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use ortho_config::OrthoConfig;
    use rstest::rstest;

    use super::*;

    fn config_with(args: &[&str]) -> Config {
        let argv = std::iter::once("tether").chain(args.iter().copied());
        Config::load_from_iter(argv.map(std::ffi::OsString::from)).expect("load config")
    }

    #[test]
    fn malformed_filter_names_the_expression() {
        let config = config_with(&["--log-filter", "tether_scm=notalevel"]);
        let error = filter_for(&config).expect_err("filter must fail");
        match error {
            TelemetryError::Filter { expression, .. } => {
                assert_eq!(expression, "tether_scm=notalevel");
            }
            TelemetryError::Subscriber(other) => panic!("unexpected error: {other}"),
        }
    }

    #[rstest]
    #[case::json("json")]
    #[case::compact("compact")]
    fn builds_a_scoped_subscriber_for_each_format(#[case] format: &str) {
        let config = config_with(&["--log-format", format, "--log-filter", "tether_scm=debug"]);
        let built = subscriber(&config).expect("build subscriber");
        tracing::subscriber::with_default(built, || {
            tracing::debug!(target: "tether_scm::extension", plugin = "git", "scoped event");
        });
    }

    #[test]
    fn initialise_is_idempotent() {
        let config = Config::default();
        assert!(initialise(&config).is_ok());
        assert!(initialise(&config).is_ok());
    }
}
