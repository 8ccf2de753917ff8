//! Reader for the WHATWG `entities.json` dataset.
//!
//! The file maps `"&name;"` keys to `{"codepoints": [...], "characters": "..."}`.
//! See <https://html.spec.whatwg.org/entities.json>.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::{Result, TableError};

#[derive(Debug, Deserialize)]
struct RawEntity {
    codepoints: Vec<u32>,
    characters: String,
}

/// Parse the dataset into `(key, characters)` pairs, sorted by key.
///
/// Keys keep their leading `&`; [`ReferenceTable::build`] strips it.
///
/// [`ReferenceTable::build`]: crate::ReferenceTable::build
pub fn parse_entities_json(json: &str) -> Result<Vec<(String, String)>> {
    let raw: BTreeMap<String, RawEntity> = serde_json::from_str(json)?;
    let mut pairs = Vec::with_capacity(raw.len());
    for (name, entity) in raw {
        let from_codepoints: Option<String> = entity
            .codepoints
            .iter()
            .map(|&cp| char::from_u32(cp))
            .collect();
        if from_codepoints.as_deref() != Some(entity.characters.as_str()) {
            return Err(TableError::CodepointMismatch { name });
        }
        pairs.push((name, entity.characters));
    }
    log::debug!("parsed {} entities from JSON dataset", pairs.len());
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_whatwg_shape() {
        let json = r#"{
            "&amp;": { "codepoints": [38], "characters": "&" },
            "&Afr;": { "codepoints": [120068], "characters": "𝔄" },
            "&amp": { "codepoints": [38], "characters": "&" }
        }"#;
        let pairs = parse_entities_json(json).unwrap();
        assert_eq!(
            pairs,
            vec![
                ("&Afr;".to_string(), "\u{1D504}".to_string()),
                ("&amp".to_string(), "&".to_string()),
                ("&amp;".to_string(), "&".to_string()),
            ]
        );
    }

    #[test]
    fn rejects_codepoint_mismatch() {
        let json = r#"{ "&lt;": { "codepoints": [62], "characters": "<" } }"#;
        assert!(matches!(
            parse_entities_json(json),
            Err(TableError::CodepointMismatch { name }) if name == "&lt;"
        ));
    }

    #[test]
    fn rejects_surrogate_codepoint() {
        let json = r#"{ "&x;": { "codepoints": [55349], "characters": "x" } }"#;
        assert!(matches!(
            parse_entities_json(json),
            Err(TableError::CodepointMismatch { .. })
        ));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            parse_entities_json("[1, 2]"),
            Err(TableError::Json(_))
        ));
        assert!(matches!(
            parse_entities_json(r#"{ "&a;": { "characters": "a" } }"#),
            Err(TableError::Json(_))
        ));
    }

    #[test]
    fn bundled_dataset_parses() {
        let json = include_str!("../data/entities.json");
        let pairs = parse_entities_json(json).unwrap();
        assert_eq!(pairs.len(), 2231);
    }
}
