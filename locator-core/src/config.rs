use figment::{Figment, providers::{Env, Format, Yaml}};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocatorConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auspost: AusPostConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_addr")]
    pub addr: String,
    /// Allow cross-origin requests from any origin.
    #[serde(default = "default_true")]
    pub cors: bool,
}

/// Australia Post postcode search API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AusPostConfig {
    #[serde(default = "default_auspost_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
}

/// Interaction logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_backend")]
    pub backend: LogBackendKind,
    #[serde(default)]
    pub elasticsearch: ElasticsearchConfig,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogBackendKind {
    Elasticsearch,
    /// In-process index; contents are lost on restart.
    Memory,
    /// Logging disabled; every write reports failure.
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElasticsearchConfig {
    /// Base URL of the cluster. Empty disables logging.
    #[serde(default = "default_es_node")]
    pub node: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_es_index")]
    pub index: String,
    /// Skip TLS certificate verification (self-signed dev clusters).
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

// ── Defaults ──────────────────────────────────────────────────

fn default_addr() -> String { "0.0.0.0:3000".into() }
fn default_true() -> bool { true }
fn default_auspost_base_url() -> String { "https://api.auspost.com.au".into() }
fn default_backend() -> LogBackendKind { LogBackendKind::Elasticsearch }
fn default_es_node() -> String { "http://localhost:9200".into() }
fn default_es_index() -> String { "aus-address-locator-logs".into() }

// ── Impls ─────────────────────────────────────────────────────

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            cors: true,
        }
    }
}

impl Default for AusPostConfig {
    fn default() -> Self {
        Self {
            base_url: default_auspost_base_url(),
            api_key: String::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            elasticsearch: ElasticsearchConfig::default(),
        }
    }
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        Self {
            node: default_es_node(),
            api_key: String::new(),
            index: default_es_index(),
            accept_invalid_certs: false,
        }
    }
}

impl LocatorConfig {
    /// Load configuration from a YAML file + `LOCATOR_` env overrides.
    ///
    /// Nested keys are separated by `__`, e.g. `LOCATOR_AUSPOST__API_KEY`.
    /// A missing file contributes nothing.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let config: LocatorConfig = Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed("LOCATOR_").split("__"))
            .extract()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_server_config_has_expected_values() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.addr, "0.0.0.0:3000");
        assert!(cfg.cors);
    }

    #[test]
    fn default_auspost_points_at_public_api() {
        let cfg = AusPostConfig::default();
        assert_eq!(cfg.base_url, "https://api.auspost.com.au");
        assert!(cfg.api_key.is_empty());
    }

    #[test]
    fn default_logging_targets_local_elasticsearch() {
        let cfg = LoggingConfig::default();
        assert_eq!(cfg.backend, LogBackendKind::Elasticsearch);
        assert_eq!(cfg.elasticsearch.node, "http://localhost:9200");
        assert_eq!(cfg.elasticsearch.index, "aus-address-locator-logs");
        assert!(!cfg.elasticsearch.accept_invalid_certs);
    }

    #[test]
    fn backend_kind_serializes_to_lowercase() {
        assert_eq!(serde_json::to_string(&LogBackendKind::Memory).unwrap(), "\"memory\"");
        assert_eq!(
            serde_json::from_str::<LogBackendKind>("\"none\"").unwrap(),
            LogBackendKind::None
        );
    }

    #[test]
    fn load_from_nonexistent_file_uses_defaults() {
        let cfg = LocatorConfig::load(Path::new("/nonexistent/locator.yaml")).unwrap();
        assert_eq!(cfg.server.addr, "0.0.0.0:3000");
    }

    #[test]
    fn load_from_valid_yaml_overrides_defaults() {
        let yaml = r#"
server:
  addr: "127.0.0.1:8080"
auspost:
  api_key: "secret"
logging:
  backend: memory
  elasticsearch:
    index: "custom-logs"
"#;
        let mut tmpfile = tempfile::NamedTempFile::new().unwrap();
        write!(tmpfile, "{yaml}").unwrap();
        let cfg = LocatorConfig::load(tmpfile.path()).unwrap();
        assert_eq!(cfg.server.addr, "127.0.0.1:8080");
        assert!(cfg.server.cors);
        assert_eq!(cfg.auspost.api_key, "secret");
        assert_eq!(cfg.auspost.base_url, "https://api.auspost.com.au");
        assert_eq!(cfg.logging.backend, LogBackendKind::Memory);
        assert_eq!(cfg.logging.elasticsearch.index, "custom-logs");
        assert_eq!(cfg.logging.elasticsearch.node, "http://localhost:9200");
    }

    #[test]
    fn load_rejects_unknown_backend() {
        let mut tmpfile = tempfile::NamedTempFile::new().unwrap();
        write!(tmpfile, "logging:\n  backend: mongo\n").unwrap();
        assert!(LocatorConfig::load(tmpfile.path()).is_err());
    }
}
