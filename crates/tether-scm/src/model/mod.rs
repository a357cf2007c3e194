//! Domain values exchanged with SCM plugins.
//!
//! These types are protocol-neutral: they carry no wire keys and know nothing
//! about versions. The [`crate::wire`] module maps them to and from JSON.

mod material;
mod outcome;
mod property;
mod revision;

pub use self::material::Material;
pub use self::outcome::{CheckResult, CheckStatus, ScmView, ValidationError, ValidationOutcome};
pub use self::property::{Property, PropertyConfiguration};
pub use self::revision::{MaterialData, ModifiedAction, ModifiedFile, PollResult, Revision};

#[cfg(test)]
mod tests;
