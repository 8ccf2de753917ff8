//! Errors raised while building a reference table.

/// A malformed or inconsistent entity dataset.
///
/// These only occur while a table is being built. A resolver never sees
/// them: a table that exists is a table that validated.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("entity dataset is empty")]
    EmptyDataset,

    #[error("entity name is empty")]
    EmptyName,

    #[error("invalid entity name: {name:?}")]
    InvalidName { name: String },

    #[error("entity {name:?} has an empty replacement")]
    EmptyReplacement { name: String },

    #[error("entity {name:?} expands to {count} characters (at most 2 allowed)")]
    ReplacementTooLong { name: String, count: usize },

    #[error("entity {name:?} is defined twice with different replacements")]
    ConflictingDuplicate { name: String },

    #[error("legacy entity {name:?} is as long as the longest name; the character after it is out of reach")]
    LegacyNameAtBound { name: String },

    #[error("entity {name:?}: codepoints do not match characters")]
    CodepointMismatch { name: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, TableError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_name_display() {
        let e = TableError::InvalidName {
            name: "a-b;".into(),
        };
        assert_eq!(format!("{e}"), "invalid entity name: \"a-b;\"");
    }

    #[test]
    fn too_long_display() {
        let e = TableError::ReplacementTooLong {
            name: "foo;".into(),
            count: 3,
        };
        assert_eq!(
            format!("{e}"),
            "entity \"foo;\" expands to 3 characters (at most 2 allowed)"
        );
    }

    #[test]
    fn legacy_at_bound_display() {
        let e = TableError::LegacyNameAtBound { name: "abc".into() };
        assert!(format!("{e}").starts_with("legacy entity \"abc\" is as long as"));
    }

    #[test]
    fn json_error_from_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let e: TableError = json_err.into();
        assert!(format!("{e}").contains("JSON error"));
    }
}
