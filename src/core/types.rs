//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`Ordinal`] - Position of a patch in the series
//! - [`BranchName`] - Validated Git branch name
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs.
//!
//! # Examples
//!
//! ```
//! use ply::core::types::{BranchName, Ordinal};
//!
//! let ordinal = Ordinal::new(4);
//! assert_eq!(ordinal.next(), Ordinal::new(5));
//! assert_eq!(ordinal.padded(), "0004");
//!
//! let branch = BranchName::new("0004-fix-build").unwrap();
//! assert_eq!(branch.as_str(), "0004-fix-build");
//! assert!(BranchName::new("invalid..name").is_err());
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),

    #[error("invalid ordinal: {0}")]
    InvalidOrdinal(String),
}

/// The position of a patch in a series.
///
/// Ordinal `0` never names a patch; it is the head value of a tree with
/// nothing applied yet. Patches are numbered from `1`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Ordinal(u32);

impl Ordinal {
    /// The head value of a freshly initialized tree.
    pub const ZERO: Ordinal = Ordinal(0);

    /// The first patch of any series.
    pub const FIRST: Ordinal = Ordinal(1);

    /// Create an ordinal from a raw value.
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    pub const fn get(self) -> u32 {
        self.0
    }

    /// The ordinal immediately after this one.
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Fixed-width form used in generated names (`0005`).
    pub fn padded(self) -> String {
        format!("{:04}", self.0)
    }
}

impl fmt::Display for Ordinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Ordinal {
    type Err = TypeError;

    /// Parse a decimal ordinal. Leading zeros are accepted, signs are not.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TypeError::InvalidOrdinal(s.to_string()));
        }
        s.parse::<u32>()
            .map(Self)
            .map_err(|_| TypeError::InvalidOrdinal(s.to_string()))
    }
}

impl From<u32> for Ordinal {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// A validated Git branch name.
///
/// Enforces the subset of `git check-ref-format` rules that matter for
/// branches created by ply:
/// - Cannot be empty or exactly `@`
/// - Cannot start with `.` or `-`, or end with `.lock` or `/`
/// - Cannot contain `..`, `@{`, `//`, ASCII control characters,
///   spaces, or any of `~^:\?*[`
///
/// # Example
///
/// ```
/// use ply::core::types::BranchName;
///
/// assert!(BranchName::new("0003-add-logging").is_ok());
/// assert!(BranchName::new("").is_err());
/// assert!(BranchName::new("has space").is_err());
/// assert!(BranchName::new("-leading-dash").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchName(String);

impl BranchName {
    /// Create a new validated branch name.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    fn validate(name: &str) -> Result<(), TypeError> {
        let reject = |why: &str| Err(TypeError::InvalidBranchName(format!("'{name}': {why}")));

        if name.is_empty() {
            return reject("cannot be empty");
        }
        if name == "@" {
            return reject("'@' is reserved");
        }
        if name.starts_with('.') || name.starts_with('-') {
            return reject("cannot start with '.' or '-'");
        }
        if name.ends_with(".lock") || name.ends_with('/') {
            return reject("cannot end with '.lock' or '/'");
        }
        for seq in ["..", "@{", "//"] {
            if name.contains(seq) {
                return reject(&format!("cannot contain '{seq}'"));
            }
        }

        const INVALID_CHARS: [char; 8] = [' ', '~', '^', ':', '\\', '?', '*', '['];
        if let Some(c) = name
            .chars()
            .find(|c| INVALID_CHARS.contains(c) || c.is_ascii_control())
        {
            return reject(&format!("cannot contain {c:?}"));
        }

        if name
            .split('/')
            .any(|component| component.starts_with('.') || component.ends_with(".lock"))
        {
            return reject("path component cannot start with '.' or end with '.lock'");
        }

        Ok(())
    }

    /// Get the branch name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BranchName {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BranchName> for String {
    fn from(value: BranchName) -> Self {
        value.0
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod ordinal {
        use super::*;

        #[test]
        fn parses_padded_and_plain() {
            assert_eq!("0005".parse::<Ordinal>().unwrap(), Ordinal::new(5));
            assert_eq!("12".parse::<Ordinal>().unwrap(), Ordinal::new(12));
            assert_eq!("0".parse::<Ordinal>().unwrap(), Ordinal::ZERO);
        }

        #[test]
        fn rejects_non_numeric() {
            assert!("".parse::<Ordinal>().is_err());
            assert!("abc".parse::<Ordinal>().is_err());
            assert!("+3".parse::<Ordinal>().is_err());
            assert!("-3".parse::<Ordinal>().is_err());
            assert!("1a".parse::<Ordinal>().is_err());
        }

        #[test]
        fn rejects_overflow() {
            assert!("99999999999".parse::<Ordinal>().is_err());
        }

        #[test]
        fn padded_is_four_wide() {
            assert_eq!(Ordinal::new(5).padded(), "0005");
            assert_eq!(Ordinal::new(12345).padded(), "12345");
        }

        #[test]
        fn next_and_ordering() {
            assert_eq!(Ordinal::ZERO.next(), Ordinal::FIRST);
            assert!(Ordinal::new(2) < Ordinal::new(10));
            assert_eq!(Ordinal::ZERO.get(), 0);
        }

        #[test]
        fn serde_is_transparent() {
            let json = serde_json::to_string(&Ordinal::new(7)).unwrap();
            assert_eq!(json, "7");
        }
    }

    mod branch_name {
        use super::*;

        #[test]
        fn accepts_patch_branch_names() {
            assert!(BranchName::new("0001-initial").is_ok());
            assert!(BranchName::new("feature/0002-thing").is_ok());
        }

        #[test]
        fn rejects_invalid() {
            for bad in [
                "",
                "@",
                ".hidden",
                "-dash",
                "x.lock",
                "x/",
                "a..b",
                "a@{b",
                "a//b",
                "a b",
                "a~b",
                "a:b",
                "a/.b",
            ] {
                assert!(BranchName::new(bad).is_err(), "{bad:?} should be rejected");
            }
        }

        #[test]
        fn serde_roundtrip_validates() {
            let parsed: Result<BranchName, _> = serde_json::from_str("\"a..b\"");
            assert!(parsed.is_err());
        }
    }
}
