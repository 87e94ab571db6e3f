//! Grant manager configuration.

use maestro_core::{Role, MAESTRO_KEY_ATTRIBUTE};
use serde::Deserialize;

use crate::error::{MaestroError, Result};

/// Configuration for the grant manager.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MaestroConfig {
    /// Name of the user attribute holding the grant key.
    pub meta_key: String,

    /// Role a user is demoted to when their grant is revoked.
    pub demotion_role: Role,

    /// Whether reads delete stored empty keys.
    pub heal_empty_keys: bool,
}

impl Default for MaestroConfig {
    fn default() -> Self {
        Self {
            meta_key: MAESTRO_KEY_ATTRIBUTE.to_string(),
            demotion_role: Role::subscriber(),
            heal_empty_keys: true,
        }
    }
}

impl MaestroConfig {
    /// Check the configuration for values the manager cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.meta_key.trim().is_empty() {
            return Err(MaestroError::Config("meta_key must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MaestroConfig::default();
        assert_eq!(config.meta_key, "bh_maestro_key");
        assert_eq!(config.demotion_role, Role::subscriber());
        assert!(config.heal_empty_keys);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_deserialize() {
        let config: MaestroConfig =
            serde_json::from_str(r#"{ "demotion_role": "contributor" }"#).unwrap();
        assert_eq!(config.meta_key, "bh_maestro_key");
        assert_eq!(config.demotion_role.as_str(), "contributor");
    }

    #[test]
    fn test_invalid_values() {
        assert!(serde_json::from_str::<MaestroConfig>(r#"{ "demotion_role": "" }"#).is_err());

        let config = MaestroConfig {
            meta_key: "  ".into(),
            ..MaestroConfig::default()
        };
        assert!(matches!(config.validate(), Err(MaestroError::Config(_))));
    }
}
