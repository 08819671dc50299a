use crate::{UuidError, UuidResult};
use std::path::{Path, PathBuf};
use std::{fmt, str::FromStr};

/// Re-exported for convenience.
pub use ::uuid::Uuid;

/// Canonical identifier (32 lowercase hex characters, no hyphens).
///
/// # Construction
/// - [`UniqueId::new`] generates a fresh identifier (the `ID.unique()` of the platform).
/// - [`UniqueId::parse`] validates an externally supplied identifier, for example a path
///   segment in a REST request. Hyphenated or uppercase forms are rejected rather than
///   normalised.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UniqueId(Uuid);

impl Default for UniqueId {
    fn default() -> Self {
        Self::new()
    }
}

impl UniqueId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Validates and parses an identifier that must already be canonical.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::InvalidInput`] if `input` is not 32 lowercase hex characters.
    pub fn parse(input: &str) -> UuidResult<Self> {
        if !Self::is_canonical(input) {
            return Err(UuidError::InvalidInput(format!(
                "identifier must be 32 lowercase hex characters without hyphens, got: '{}'",
                input
            )));
        }

        Uuid::parse_str(input)
            .map(Self)
            .map_err(|e| UuidError::InvalidInput(e.to_string()))
    }

    pub fn uuid(&self) -> Uuid {
        self.0
    }

    /// Purely syntactic check for the canonical form.
    pub fn is_canonical(input: &str) -> bool {
        input.len() == 32
            && input
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }

    /// Returns `parent_dir/<s1>/<s2>/<id>` where `s1`/`s2` are the first two hex pairs.
    pub fn sharded_path(&self, parent_dir: &Path) -> PathBuf {
        let canonical = self.0.simple().to_string();
        let s1 = &canonical[0..2];
        let s2 = &canonical[2..4];
        parent_dir.join(s1).join(s2).join(&canonical)
    }
}

impl fmt::Display for UniqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for UniqueId {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UniqueId::parse(s)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for UniqueId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for UniqueId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        UniqueId::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_canonical() {
        let id = UniqueId::new();
        assert!(UniqueId::is_canonical(&id.to_string()));
    }

    #[test]
    fn test_parse_rejects_hyphenated_and_uppercase() {
        assert!(UniqueId::parse("550e8400-e29b-41d4-a716-446655440000").is_err());
        assert!(UniqueId::parse("550E8400E29B41D4A716446655440000").is_err());
        assert!(UniqueId::parse("550e8400").is_err());
    }

    #[test]
    fn test_parse_round_trips_display() {
        let id = UniqueId::parse("550e8400e29b41d4a716446655440000").unwrap();
        assert_eq!(id.to_string(), "550e8400e29b41d4a716446655440000");
    }

    #[test]
    fn test_sharded_path() {
        let id = UniqueId::parse("550e8400e29b41d4a716446655440000").unwrap();
        let path = id.sharded_path(Path::new("bucket"));
        assert_eq!(
            path,
            Path::new("bucket/55/0e/550e8400e29b41d4a716446655440000")
        );
    }

    #[test]
    fn test_serde_uses_canonical_string() {
        let id = UniqueId::parse("abcd123456789012abcd123456789012").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"abcd123456789012abcd123456789012\"");
        let back: UniqueId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
