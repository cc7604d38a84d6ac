// ⚠️ Error taxonomy for feed ingestion, registry scanning and export

use thiserror::Error;

/// Result type for every library operation
pub type Result<T> = std::result::Result<T, FeedError>;

#[derive(Error, Debug)]
pub enum FeedError {
    /// Identity field (or `BasePrice`) absent. Aborts the whole document.
    #[error("{entity} is missing required field '{field}'")]
    MissingRequiredField {
        entity: &'static str,
        field: &'static str,
    },

    /// Field present but unusable for a numeric derivation
    #[error("{entity} field '{field}' has invalid value '{value}'")]
    InvalidField {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    /// Document is not a feed at all (wrong root element)
    #[error("Invalid feed document: {0}")]
    InvalidDocument(String),

    /// Registry entry that doesn't fit `<client>-<type>-<YYYY>-<MM>-<DD>.<ext>`
    #[error("Malformed snapshot filename: {0}")]
    MalformedFilename(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl FeedError {
    pub fn missing(entity: &'static str, field: &'static str) -> Self {
        FeedError::MissingRequiredField { entity, field }
    }

    pub fn invalid(entity: &'static str, field: &'static str, value: impl Into<String>) -> Self {
        FeedError::InvalidField {
            entity,
            field,
            value: value.into(),
        }
    }

    /// True for "nothing there" outcomes callers are expected to handle
    pub fn is_not_found(&self) -> bool {
        matches!(self, FeedError::NotFound(_))
    }
}
