//! Error types for charref.

use std::io;

use charref_table::TableError;

/// Errors produced while setting up resolution: loading configuration or
/// building a table. Resolution itself never fails.
#[derive(Debug, thiserror::Error)]
pub enum CharRefError {
    #[error("entity table error: {0}")]
    Table(#[from] TableError),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, CharRefError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let e = CharRefError::Config("missing key".into());
        assert_eq!(format!("{e}"), "config error: missing key");
    }

    #[test]
    fn table_error_from_conversion() {
        let e: CharRefError = TableError::EmptyDataset.into();
        assert_eq!(format!("{e}"), "entity table error: entity dataset is empty");
    }

    #[test]
    fn io_error_from_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let e: CharRefError = io_err.into();
        let msg = format!("{e}");
        assert!(msg.contains("I/O error"));
        assert!(msg.contains("gone"));
    }

    #[test]
    fn toml_error_from_conversion() {
        let toml_err = toml::from_str::<toml::Value>("this is [[[not valid toml").unwrap_err();
        let e: CharRefError = toml_err.into();
        assert!(format!("{e}").contains("TOML parse error"));
    }
}
