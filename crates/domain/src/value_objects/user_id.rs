//! User identifier value object

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Identifier of the signed-in user that owns search history
///
/// Identity providers hand out opaque string ids, so no particular format is
/// assumed beyond being non-empty and free of surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Maximum accepted length
    pub const MAX_LEN: usize = 128;

    /// Parse a user ID from a string
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidUserId` for empty or oversized ids.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidUserId("must not be empty".to_string()));
        }
        if trimmed.len() > Self::MAX_LEN {
            return Err(DomainError::InvalidUserId(format!(
                "must be at most {} bytes",
                Self::MAX_LEN
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Get the id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for UserId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_is_trimmed() {
        let id = UserId::parse("  uid-42 ").unwrap();
        assert_eq!(id.as_str(), "uid-42");
    }

    #[test]
    fn empty_user_id_rejected() {
        assert!(UserId::parse("").is_err());
        assert!(UserId::parse("   ").is_err());
    }

    #[test]
    fn oversized_user_id_rejected() {
        let long = "x".repeat(UserId::MAX_LEN + 1);
        assert!(UserId::parse(&long).is_err());
    }

    #[test]
    fn user_id_serde_validates() {
        let id: UserId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(id.to_string(), "abc");
        assert!(serde_json::from_str::<UserId>("\"\"").is_err());
    }
}
