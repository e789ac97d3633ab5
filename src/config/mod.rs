// Configuration module entry point
// Loads application configuration and holds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::Config;

/// Default config file name (without extension)
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// The file is optional; without it the built-in defaults apply.
    /// The process environment is never consulted.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8000)?
            .set_default("storage.root", ".")?
            .set_default("storage.raw_dir", "public/results/model-results")?
            .set_default("storage.parsed_dir", "public/results/parsed")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("performance.shutdown_grace", 5)?
            .set_default("http.server_name", "eval-store/0.1")?
            .set_default("http.enable_cors", true)?
            .set_default("http.max_body_size", 67_108_864)? // 64MB
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load_from("does-not-exist/config").unwrap();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 8000);
        assert!(cfg.http.enable_cors);
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert_eq!(
            cfg.storage.raw_path(),
            PathBuf::from("./public/results/model-results")
        );
        assert_eq!(
            cfg.storage.parsed_path(),
            PathBuf::from("./public/results/parsed")
        );
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[server]\nport = 9100\n\n[storage]\nroot = \"/srv/evals\"\n\n[logging]\naccess_log_format = \"json\"\n",
        )
        .unwrap();

        let stem = dir.path().join("custom");
        let cfg = Config::load_from(stem.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 9100);
        assert_eq!(cfg.logging.access_log_format, "json");
        assert_eq!(
            cfg.storage.parsed_path(),
            PathBuf::from("/srv/evals/public/results/parsed")
        );
        // untouched sections keep their defaults
        assert_eq!(cfg.performance.read_timeout, 30);
    }

    #[test]
    fn test_environment_is_ignored() {
        std::env::set_var("EVALSTORE_SERVER__PORT", "9999");
        std::env::set_var("EVALSTORE_STORAGE__ROOT", "/tmp/elsewhere");
        let cfg = Config::load_from("does-not-exist/config").unwrap();
        std::env::remove_var("EVALSTORE_SERVER__PORT");
        std::env::remove_var("EVALSTORE_STORAGE__ROOT");

        assert_eq!(cfg.server.port, 8000);
        assert_eq!(cfg.storage.root, PathBuf::from("."));
    }

    #[test]
    fn test_socket_addr() {
        let cfg = Config::load_from("does-not-exist/config").unwrap();
        let addr = cfg.get_socket_addr().unwrap();
        assert_eq!(addr.port(), 8000);
    }

    #[test]
    fn test_storage_section_from_toml() {
        let storage: types::StorageConfig = toml::from_str(
            "root = \"/data\"\nraw_dir = \"raw\"\nparsed_dir = \"/abs/parsed\"\n",
        )
        .unwrap();
        assert_eq!(storage.raw_path(), PathBuf::from("/data/raw"));
        // absolute directories ignore the root
        assert_eq!(storage.parsed_path(), PathBuf::from("/abs/parsed"));
    }
}
