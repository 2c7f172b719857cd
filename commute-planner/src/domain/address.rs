//! Origin addresses.

use std::fmt;

use super::{DomainError, Location};

/// A non-empty, trimmed address string.
///
/// # Examples
///
/// ```
/// use commute_planner::domain::Address;
///
/// let home = Address::parse("  123 Main St ").unwrap();
/// assert_eq!(home.as_str(), "123 Main St");
/// assert!(Address::parse("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address(String);

impl Address {
    /// Parse an address, trimming surrounding whitespace.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(DomainError::EmptyAddress);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The address as a routable location.
    pub fn location(&self) -> Location {
        Location::Address(self.0.clone())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
