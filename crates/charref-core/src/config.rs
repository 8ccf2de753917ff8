//! Resolver configuration from TOML.
//!
//! ```toml
//! missing_semicolon = "accept"   # or "reject"
//! context = "text"               # or "attribute"
//! dataset = "entities.json"      # optional; defaults to the built-in table
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use charref_table::ReferenceTable;

use crate::error::{CharRefError, Result};
use crate::resolver::{Context, MissingSemicolon, Resolver};

/// Settings for building a table and a resolver over it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ResolverConfig {
    /// Policy for names that exist only with a trailing `;`.
    #[serde(default)]
    pub missing_semicolon: MissingSemicolon,
    /// Default context for whole-input decoding.
    #[serde(default)]
    pub context: Context,
    /// WHATWG `entities.json` file to load instead of the built-in table.
    #[serde(default)]
    pub dataset: Option<PathBuf>,
}

/// The table a configuration selects.
#[derive(Debug)]
pub enum TableSource {
    Builtin(&'static ReferenceTable),
    Loaded(ReferenceTable),
}

impl TableSource {
    pub fn table(&self) -> &ReferenceTable {
        match self {
            Self::Builtin(table) => table,
            Self::Loaded(table) => table,
        }
    }
}

impl ResolverConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        if config
            .dataset
            .as_ref()
            .is_some_and(|p| p.as_os_str().is_empty())
        {
            return Err(CharRefError::Config("dataset path is empty".into()));
        }
        Ok(config)
    }

    /// Load a configuration file. A relative `dataset` path is taken
    /// relative to the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml(&text)?;
        if let Some(dataset) = config.dataset.take() {
            let base = path.parent().unwrap_or(Path::new(""));
            config.dataset = Some(base.join(dataset));
        }
        log::debug!("loaded resolver config from {}: {config:?}", path.display());
        Ok(config)
    }

    /// Build (or fetch) the table this configuration names.
    pub fn load_table(&self) -> Result<TableSource> {
        match &self.dataset {
            None => Ok(TableSource::Builtin(ReferenceTable::html5())),
            Some(path) => {
                let json = std::fs::read_to_string(path)?;
                let table = ReferenceTable::from_json(&json)?;
                log::info!("loaded {} entities from {}", table.len(), path.display());
                Ok(TableSource::Loaded(table))
            },
        }
    }

    /// A resolver over `table` with this configuration's policy.
    pub fn resolver<'t>(&self, table: &'t ReferenceTable) -> Resolver<'t> {
        Resolver::new(table).with_missing_semicolon(self.missing_semicolon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::Resolution;

    #[test]
    fn empty_toml_is_default() {
        let config = ResolverConfig::from_toml("").unwrap();
        assert_eq!(config, ResolverConfig::default());
        assert_eq!(config.missing_semicolon, MissingSemicolon::Accept);
        assert_eq!(config.context, Context::Text);
        assert!(config.dataset.is_none());
    }

    #[test]
    fn parses_all_fields() {
        let config = ResolverConfig::from_toml(
            r#"
            missing_semicolon = "reject"
            context = "attribute"
            dataset = "data/entities.json"
            "#,
        )
        .unwrap();
        assert_eq!(config.missing_semicolon, MissingSemicolon::Reject);
        assert_eq!(config.context, Context::AttributeValue);
        assert_eq!(config.dataset, Some(PathBuf::from("data/entities.json")));
    }

    #[test]
    fn context_alias() {
        let config = ResolverConfig::from_toml(r#"context = "attribute_value""#).unwrap();
        assert_eq!(config.context, Context::AttributeValue);
    }

    #[test]
    fn rejects_unknown_policy() {
        let err = ResolverConfig::from_toml(r#"missing_semicolon = "maybe""#).unwrap_err();
        assert!(matches!(err, CharRefError::TomlParse(_)));
    }

    #[test]
    fn rejects_empty_dataset_path() {
        let err = ResolverConfig::from_toml(r#"dataset = """#).unwrap_err();
        assert!(matches!(err, CharRefError::Config(_)));
    }

    #[test]
    fn builtin_table_by_default() {
        let source = ResolverConfig::default().load_table().unwrap();
        assert!(matches!(source, TableSource::Builtin(_)));
        assert_eq!(source.table().len(), 2231);
    }

    #[test]
    fn load_resolves_dataset_relative_to_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("mini.json"),
            r#"{ "&hi;": { "codepoints": [72, 105], "characters": "Hi" } }"#,
        )
        .unwrap();
        let config_path = dir.path().join("charref.toml");
        std::fs::write(
            &config_path,
            "missing_semicolon = \"accept\"\ndataset = \"mini.json\"\n",
        )
        .unwrap();

        let config = ResolverConfig::load(&config_path).unwrap();
        assert_eq!(config.dataset, Some(dir.path().join("mini.json")));

        let source = config.load_table().unwrap();
        let table = source.table();
        assert_eq!(table.len(), 1);
        let resolver = config.resolver(table);
        assert!(matches!(
            resolver.resolve("hi".chars(), Context::Text),
            Resolution::Matched { consumed: 2, .. }
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ResolverConfig::load(Path::new("/nonexistent/charref.toml")).unwrap_err();
        assert!(matches!(err, CharRefError::Io(_)));
    }

    #[test]
    fn malformed_dataset_is_table_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{}").unwrap();
        let config = ResolverConfig {
            dataset: Some(path),
            ..Default::default()
        };
        assert!(matches!(config.load_table(), Err(CharRefError::Table(_))));
    }
}
