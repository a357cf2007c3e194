//! Protocol revisions and version negotiation.
//!
//! Every SCM plugin declares the wire-protocol revisions it speaks. The
//! server implements a fixed set of revisions ([`SERVER_VERSIONS`]) and, for
//! each call, picks the highest revision both sides share. Absence of overlap
//! is a hard failure; there is never more than one answer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One wire-format revision of the SCM extension protocol.
///
/// Versions order by major then minor number, so `2.0 > 1.5 > 1.0`.
///
/// # Example
///
/// ```
/// use tether_scm::ProtocolVersion;
///
/// let version: ProtocolVersion = "2.0".parse().expect("valid version");
/// assert_eq!(version, ProtocolVersion::V2);
/// assert!(ProtocolVersion::V1 < version);
/// assert_eq!(version.to_string(), "2.0");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProtocolVersion {
    major: u16,
    minor: u16,
}

impl ProtocolVersion {
    /// Revision 1.0: configuration, validation, polling and checkout only.
    pub const V1: Self = Self::new(1, 0);

    /// Revision 2.0: adds capability discovery and webhook-driven updates.
    pub const V2: Self = Self::new(2, 0);

    /// Creates a version from its components.
    #[must_use]
    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }

    /// Returns the major version number.
    #[must_use]
    pub const fn major(self) -> u16 {
        self.major
    }

    /// Returns the minor version number.
    #[must_use]
    pub const fn minor(self) -> u16 {
        self.minor
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// A version string that is not of the form `major[.minor]`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{input}' is not a protocol version (expected 'major.minor')")]
pub struct VersionParseError {
    input: String,
}

impl VersionParseError {
    /// Returns the rejected input.
    #[must_use]
    pub const fn input(&self) -> &str {
        self.input.as_str()
    }
}

impl FromStr for ProtocolVersion {
    type Err = VersionParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = || VersionParseError {
            input: input.to_owned(),
        };
        let trimmed = input.trim();
        let (major, minor) = trimmed.split_once('.').unwrap_or((trimmed, "0"));
        let major_number = major.parse::<u16>().map_err(|_| invalid())?;
        let minor_number = minor.parse::<u16>().map_err(|_| invalid())?;
        Ok(Self::new(major_number, minor_number))
    }
}

impl TryFrom<String> for ProtocolVersion {
    type Error = VersionParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ProtocolVersion> for String {
    fn from(version: ProtocolVersion) -> Self {
        version.to_string()
    }
}

/// Revisions implemented by this server, oldest first.
pub const SERVER_VERSIONS: &[ProtocolVersion] = &[ProtocolVersion::V1, ProtocolVersion::V2];

/// Picks the highest revision present in both sets.
///
/// Returns `None` when the sets are disjoint.
///
/// # Example
///
/// ```
/// use tether_scm::{ProtocolVersion, negotiate};
///
/// let plugin = [ProtocolVersion::V1, ProtocolVersion::V2];
/// assert_eq!(negotiate(&[ProtocolVersion::V1], &plugin), Some(ProtocolVersion::V1));
/// assert_eq!(negotiate(&[ProtocolVersion::V2], &[ProtocolVersion::V1]), None);
/// ```
#[must_use]
pub fn negotiate(server: &[ProtocolVersion], plugin: &[ProtocolVersion]) -> Option<ProtocolVersion> {
    server
        .iter()
        .copied()
        .filter(|version| plugin.contains(version))
        .max()
}

/// An ordered list of versions rendered as `1.0, 2.0` in diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionSet(Vec<ProtocolVersion>);

impl VersionSet {
    /// Returns the versions in declaration order.
    #[must_use]
    pub fn as_slice(&self) -> &[ProtocolVersion] {
        &self.0
    }
}

impl From<Vec<ProtocolVersion>> for VersionSet {
    fn from(versions: Vec<ProtocolVersion>) -> Self {
        Self(versions)
    }
}

impl From<&[ProtocolVersion]> for VersionSet {
    fn from(versions: &[ProtocolVersion]) -> Self {
        Self(versions.to_vec())
    }
}

impl fmt::Display for VersionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for version in &self.0 {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{version}")?;
            first = false;
        }
        Ok(())
    }
}
