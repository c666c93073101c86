use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use catalog_core::EngineConfig;
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

/// Server settings, loadable from TOML.
///
/// ```toml
/// bind_addr = "0.0.0.0:8000"
/// data_path = "/var/lib/catalog/catalog.json"
/// seed_demo_data = true
///
/// [engine]
/// atomic_cascades = true
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// JSON snapshot backing the store. `None` keeps everything in memory.
    pub data_path: Option<PathBuf>,
    /// Insert the demo categories and parts on startup (once per store).
    pub seed_demo_data: bool,
    /// Origins allowed to call the API from a browser. Empty disables CORS.
    pub allowed_origins: Vec<String>,
    pub engine: EngineConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 8000)),
            data_path: None,
            seed_demo_data: false,
            allowed_origins: Vec::new(),
            engine: EngineConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(source: &str) -> ServerResult<Self> {
        toml::from_str(source).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = ServerConfig::default();
        assert_eq!(c.bind_addr, "127.0.0.1:8000".parse::<SocketAddr>().unwrap());
        assert!(c.data_path.is_none());
        assert!(!c.seed_demo_data);
        assert_eq!(c.engine, EngineConfig::default());
    }

    #[test]
    fn parse_partial_toml() {
        let c = ServerConfig::from_toml_str(
            r#"
            seed_demo_data = true
            data_path = "catalog.json"

            [engine]
            atomic_cascades = true
            "#,
        )
        .unwrap();
        assert!(c.seed_demo_data);
        assert_eq!(c.data_path, Some(PathBuf::from("catalog.json")));
        assert!(c.engine.atomic_cascades);
        assert!(!c.engine.rename_cascades_to_parts);
        assert_eq!(c.bind_addr, ServerConfig::default().bind_addr);
    }

    #[test]
    fn bad_toml_is_a_config_error() {
        let err = ServerConfig::from_toml_str("bind_addr = 5").unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.toml");
        std::fs::write(&path, "bind_addr = \"0.0.0.0:9000\"\n").unwrap();
        let c = ServerConfig::load(&path).unwrap();
        assert_eq!(c.bind_addr.port(), 9000);
        assert!(ServerConfig::load(dir.path().join("missing.toml")).is_err());
    }
}
