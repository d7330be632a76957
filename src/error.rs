//! Error types for the evolutionary search engine.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::ga::ConfigError;

/// Any error the library can report.
///
/// Both variants are configuration errors: they are raised before the first
/// generation runs and are never retried.
#[derive(Debug, Error)]
pub enum Error {
    /// The item catalog is malformed or could not be loaded.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
    /// The engine configuration is out of range.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_carries_source() {
        let err = Error::from(CatalogError::LengthMismatch {
            values: 3,
            weights: 2,
        });
        let message = err.to_string();
        assert!(message.starts_with("catalog error"));
        assert!(message.contains('3'));
        assert!(message.contains('2'));
    }

    #[test]
    fn test_config_error_converts() {
        let err: Error = ConfigError::ZeroPopulation.into();
        assert!(matches!(err, Error::Config(ConfigError::ZeroPopulation)));
    }
}
