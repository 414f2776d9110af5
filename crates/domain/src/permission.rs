use std::fmt::{Display, Formatter};
use std::str::FromStr;

use clearance_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

const SEGMENT_COUNT: usize = 3;

/// A concrete permission string of the form `domain.function.action`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(String);

impl Permission {
    /// Parses and validates a concrete permission.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        validate_segments(&value, false)?;
        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for Permission {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl FromStr for Permission {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::new(value)
    }
}

/// A permission pattern; any segment may be the wildcard `*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionPattern(String);

impl PermissionPattern {
    /// Parses and validates a permission pattern.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        validate_segments(&value, true)?;
        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns whether this pattern covers the target permission.
    ///
    /// Both sides are validated to exactly three segments, so the match is a
    /// positional comparison where `*` covers any segment.
    #[must_use]
    pub fn matches(&self, target: &Permission) -> bool {
        self.0
            .split('.')
            .zip(target.as_str().split('.'))
            .all(|(pattern_segment, target_segment)| {
                pattern_segment == "*" || pattern_segment == target_segment
            })
    }
}

impl Display for PermissionPattern {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl FromStr for PermissionPattern {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::new(value)
    }
}

/// Returns whether any pattern in the list covers the target permission.
#[must_use]
pub fn permission_matches(patterns: &[PermissionPattern], target: &Permission) -> bool {
    patterns.iter().any(|pattern| pattern.matches(target))
}

fn validate_segments(value: &str, allow_wildcard: bool) -> AppResult<()> {
    let segments: Vec<&str> = value.split('.').collect();
    if segments.len() != SEGMENT_COUNT {
        return Err(AppError::Validation(format!(
            "permission '{value}' must have exactly {SEGMENT_COUNT} dot-separated segments"
        )));
    }

    for segment in segments {
        if segment == "*" {
            if allow_wildcard {
                continue;
            }
            return Err(AppError::Validation(format!(
                "permission '{value}' must not contain wildcard segments"
            )));
        }
        if segment.is_empty() || !segment.chars().all(|ch| ch.is_ascii_lowercase()) {
            return Err(AppError::Validation(format!(
                "permission segment '{segment}' must be one or more lowercase letters"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Permission, PermissionPattern, permission_matches};

    fn permission(value: &str) -> Permission {
        Permission::new(value).unwrap_or_else(|_| unreachable!())
    }

    fn pattern(value: &str) -> PermissionPattern {
        PermissionPattern::new(value).unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn permission_accepts_three_lowercase_segments() {
        assert!(Permission::new("devices.read.own").is_ok());
    }

    #[test]
    fn permission_rejects_wrong_segment_count() {
        assert!(Permission::new("devices.read").is_err());
        assert!(Permission::new("devices.read.own.extra").is_err());
    }

    #[test]
    fn permission_rejects_invalid_characters() {
        assert!(Permission::new("Devices.read.own").is_err());
        assert!(Permission::new("devices..own").is_err());
        assert!(Permission::new("devices.read1.own").is_err());
    }

    #[test]
    fn permission_rejects_wildcard_segments() {
        assert!(Permission::new("devices.*.own").is_err());
    }

    #[test]
    fn pattern_accepts_wildcard_segments() {
        assert!(PermissionPattern::new("devices.*.*").is_ok());
        assert!(PermissionPattern::new("*.*.*").is_ok());
    }

    #[test]
    fn pattern_matches_exact_permission() {
        assert!(pattern("devices.read.own").matches(&permission("devices.read.own")));
        assert!(!pattern("devices.read.own").matches(&permission("devices.read.any")));
    }

    #[test]
    fn pattern_wildcard_covers_any_segment() {
        assert!(pattern("devices.*.*").matches(&permission("devices.delete.any")));
        assert!(pattern("*.read.*").matches(&permission("assets.read.own")));
        assert!(!pattern("devices.*.own").matches(&permission("devices.read.any")));
    }

    #[test]
    fn permission_matches_requires_any_pattern() {
        let patterns = vec![pattern("assets.*.*"), pattern("devices.read.*")];
        assert!(permission_matches(&patterns, &permission("devices.read.own")));
        assert!(!permission_matches(&patterns, &permission("devices.delete.own")));
        assert!(!permission_matches(&[], &permission("devices.read.own")));
    }
}
