//! Controller configuration.

use serde::{Deserialize, Serialize};

/// Defaults a controller falls back to when an operation names no target.
///
/// Deserializable from any serde format; missing keys stay unset.
///
/// ```rust,ignore
/// let config: ControllerConfig = serde_json::from_str(r#"{
///     "default_repository": "Product",
///     "default_data_store": "doctrine_mongodb"
/// }"#)?;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Repository used when an operation names none.
    pub default_repository: Option<String>,
    /// Data store used when an operation names none.
    pub default_data_store: Option<String>,
}

impl ControllerConfig {
    /// A configuration with both defaults set.
    pub fn new(repository: impl Into<String>, data_store: impl Into<String>) -> Self {
        Self {
            default_repository: Some(repository.into()),
            default_data_store: Some(data_store.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_stay_unset() {
        let config: ControllerConfig =
            serde_json::from_str(r#"{ "default_repository": "Product" }"#).unwrap();
        assert_eq!(config.default_repository.as_deref(), Some("Product"));
        assert_eq!(config.default_data_store, None);

        let config: ControllerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ControllerConfig::default());
    }
}
