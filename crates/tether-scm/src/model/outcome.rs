//! Results of validation, connection checks, checkout and view lookups.

/// A single validation problem reported by a plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    field: String,
    message: String,
}

impl ValidationError {
    /// Creates an error attached to a configuration key.
    #[must_use]
    pub fn for_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates an error not attached to any key.
    #[must_use]
    pub fn general(message: impl Into<String>) -> Self {
        Self::for_field(String::new(), message)
    }

    /// Returns the configuration key, empty for general errors.
    #[must_use]
    pub const fn field(&self) -> &str {
        self.field.as_str()
    }

    /// Returns the error message.
    #[must_use]
    pub const fn message(&self) -> &str {
        self.message.as_str()
    }
}

/// Outcome of validating a configuration. Successful exactly when it holds
/// no errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationOutcome {
    errors: Vec<ValidationError>,
}

impl ValidationOutcome {
    /// A successful outcome.
    #[must_use]
    pub const fn success() -> Self {
        Self { errors: Vec::new() }
    }

    /// An outcome carrying the given errors.
    #[must_use]
    pub const fn with_errors(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }

    /// Returns `true` when no errors were reported.
    #[must_use]
    pub const fn is_successful(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the reported errors.
    #[must_use]
    pub const fn errors(&self) -> &[ValidationError] {
        self.errors.as_slice()
    }
}

/// Status half of a [`CheckResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    /// The plugin completed the operation.
    Success,
    /// The plugin could not complete the operation.
    Failure,
}

/// Outcome of a connection check or checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    status: CheckStatus,
    messages: Vec<String>,
}

impl CheckResult {
    /// Creates a result.
    #[must_use]
    pub const fn new(status: CheckStatus, messages: Vec<String>) -> Self {
        Self { status, messages }
    }

    /// A successful result with messages.
    #[must_use]
    pub const fn success(messages: Vec<String>) -> Self {
        Self::new(CheckStatus::Success, messages)
    }

    /// A failed result with messages.
    #[must_use]
    pub const fn failure(messages: Vec<String>) -> Self {
        Self::new(CheckStatus::Failure, messages)
    }

    /// Returns the status.
    #[must_use]
    pub const fn status(&self) -> CheckStatus {
        self.status
    }

    /// Returns `true` for [`CheckStatus::Success`].
    #[must_use]
    pub const fn is_successful(&self) -> bool {
        matches!(self.status, CheckStatus::Success)
    }

    /// Returns the plugin messages.
    #[must_use]
    pub const fn messages(&self) -> &[String] {
        self.messages.as_slice()
    }

    /// Joins the messages for display, separated by `", "`.
    #[must_use]
    pub fn messages_for_display(&self) -> String {
        self.messages.join(", ")
    }
}

/// Display metadata for a plugin's configuration form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScmView {
    display_value: String,
    template: String,
}

impl ScmView {
    /// Creates a view.
    #[must_use]
    pub fn new(display_value: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            display_value: display_value.into(),
            template: template.into(),
        }
    }

    /// Returns the name shown for the plugin.
    #[must_use]
    pub const fn display_value(&self) -> &str {
        self.display_value.as_str()
    }

    /// Returns the configuration form template.
    #[must_use]
    pub const fn template(&self) -> &str {
        self.template.as_str()
    }

    /// Splits the view into its display value and template.
    #[must_use]
    pub fn into_parts(self) -> (String, String) {
        (self.display_value, self.template)
    }
}
