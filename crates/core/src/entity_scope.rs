//! Organizational scoping for content records.
//!
//! Every scoped content table carries an `entity_type` column holding one of
//! the three organizations the site publishes for. The column is plain
//! `TEXT` in the database; this enum is the typed view used by request DTOs
//! and list filters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The organization a content record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    /// The temple.
    Pura,
    /// The foundation.
    Yayasan,
    /// The school.
    Pasraman,
}

impl EntityType {
    /// All scopes, in display order.
    pub const ALL: [EntityType; 3] = [Self::Pura, Self::Yayasan, Self::Pasraman];

    /// Database / wire value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pura => "pura",
            Self::Yayasan => "yayasan",
            Self::Pasraman => "pasraman",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pura" => Ok(Self::Pura),
            "yayasan" => Ok(Self::Yayasan),
            "pasraman" => Ok(Self::Pasraman),
            other => Err(CoreError::Validation(format!(
                "Invalid entity_type '{other}'. Must be one of: pura, yayasan, pasraman"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_scope() {
        for scope in EntityType::ALL {
            assert_eq!(scope.as_str().parse::<EntityType>().unwrap(), scope);
        }
    }

    #[test]
    fn rejects_unknown_scope() {
        let err = "church".parse::<EntityType>().unwrap_err();
        assert!(matches!(err, CoreError::Validation(msg) if msg.contains("church")));
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&EntityType::Pasraman).unwrap();
        assert_eq!(json, "\"pasraman\"");
        let parsed: EntityType = serde_json::from_str("\"yayasan\"").unwrap();
        assert_eq!(parsed, EntityType::Yayasan);
    }
}
