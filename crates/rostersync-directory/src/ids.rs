//! Strongly Typed Identifiers
//!
//! Newtype wrappers for the identifiers used against the target directory.
//! `UserId` is validated on construction: the directory issues opaque numeric
//! identifiers, so anything that is not a pure digit string (a display name
//! leaking out of a roster column, for example) is rejected before it can
//! enter any membership set.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Error returned when a string is not a valid user identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseUserIdError {
    /// The rejected input value.
    pub value: String,
}

impl Display for ParseUserIdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid user id '{}': must be all digits", self.value)
    }
}

impl std::error::Error for ParseUserIdError {}

/// Opaque numeric identifier of a person in the target directory.
///
/// Construction goes through [`FromStr`], which enforces the digit-only
/// invariant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = ParseUserIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(ParseUserIdError {
                value: s.to_string(),
            })
        }
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Macro to define an unvalidated string identifier type.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an identifier from a raw string.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

define_id! {
    /// Identifier of an organizational unit (one community or workspace)
    /// within which a single target group is reconciled.
    ScopeId
}

define_id! {
    /// Identifier of an access-control group within a scope.
    GroupId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_accepts_digits() {
        let id: UserId = "123456789".parse().unwrap();
        assert_eq!(id.as_str(), "123456789");
    }

    #[test]
    fn user_id_trims_whitespace() {
        let id: UserId = "  42  ".parse().unwrap();
        assert_eq!(id.as_str(), "42");
    }

    #[test]
    fn user_id_rejects_names_and_empty() {
        assert!("alice".parse::<UserId>().is_err());
        assert!("123abc".parse::<UserId>().is_err());
        assert!("".parse::<UserId>().is_err());
        assert!("12 34".parse::<UserId>().is_err());
    }

    #[test]
    fn user_id_orders_lexicographically() {
        let a: UserId = "123".parse().unwrap();
        let b: UserId = "456".parse().unwrap();
        assert!(a < b);
    }

    #[test]
    fn scope_and_group_ids_display_raw_value() {
        assert_eq!(ScopeId::new("scope-1").to_string(), "scope-1");
        assert_eq!(GroupId::from("role-9").as_str(), "role-9");
    }
}
