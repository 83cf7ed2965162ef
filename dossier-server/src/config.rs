//! Server configuration sourced from environment variables.
//!
//! Three variables, all optional:
//!
//! | Variable           | Default          | Meaning                          |
//! |--------------------|------------------|----------------------------------|
//! | `DOSSIER_BIND`     | `127.0.0.1:4000` | Listen address                   |
//! | `DOSSIER_DATA_DIR` | `./data`         | Root of schemas and record files |
//! | `DOSSIER_APP_ID`   | `dossier`        | Application half of the tenant   |

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Runtime configuration for the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    /// Root directory holding `directories/` schemas and `tenants/` records.
    pub data_dir: PathBuf,
    /// Combined with a directory id to derive each tenant scope.
    pub app_id: String,
}

impl ServerConfig {
    /// Read configuration from the environment, falling back to
    /// local-development defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        let bind = std::env::var("DOSSIER_BIND")
            .unwrap_or_else(|_| "127.0.0.1:4000".to_string())
            .parse()
            .with_context(|| "parse DOSSIER_BIND")?;
        let data_dir = std::env::var("DOSSIER_DATA_DIR")
            .unwrap_or_else(|_| "./data".to_string())
            .into();
        let app_id = std::env::var("DOSSIER_APP_ID").unwrap_or_else(|_| "dossier".to_string());
        Ok(Self {
            bind,
            data_dir,
            app_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        std::env::remove_var("DOSSIER_BIND");
        std::env::remove_var("DOSSIER_DATA_DIR");
        std::env::remove_var("DOSSIER_APP_ID");
    }

    #[test]
    #[serial]
    fn defaults_apply_when_env_is_empty() {
        clear_env();

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.bind.to_string(), "127.0.0.1:4000");
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.app_id, "dossier");
    }

    #[test]
    #[serial]
    fn env_overrides_are_read() {
        clear_env();
        std::env::set_var("DOSSIER_BIND", "0.0.0.0:9090");
        std::env::set_var("DOSSIER_DATA_DIR", "/var/lib/dossier");
        std::env::set_var("DOSSIER_APP_ID", "crm");

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.bind.to_string(), "0.0.0.0:9090");
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/dossier"));
        assert_eq!(config.app_id, "crm");

        clear_env();
    }

    #[test]
    #[serial]
    fn unparseable_bind_is_an_error() {
        clear_env();
        std::env::set_var("DOSSIER_BIND", "not-an-address");

        let result = ServerConfig::from_env();
        assert!(result.is_err());

        clear_env();
    }
}
