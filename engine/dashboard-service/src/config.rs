//! Service configuration management

use anyhow::{Context, Result};
use league_analytics::SparseSamplePolicy;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use yahoo_fetcher::YahooConfig;

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub server: ServerConfig,

    /// Yahoo API and OAuth settings
    pub yahoo: YahooConfig,

    pub logging: LoggingConfig,

    pub stats: StatsConfig,

    pub session: SessionConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty, compact)
    pub format: String,
}

/// Season statistics settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Handling of teams with fewer than two weekly scores
    pub sparse_sample_policy: SparseSamplePolicy,
}

/// Browser session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Mark the session cookie `Secure` (serve over HTTPS)
    pub secure_cookies: bool,

    /// Idle sessions older than this are dropped
    pub max_age_secs: u64,

    pub prune_interval_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".to_string(), port: 5000 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "pretty".to_string() }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { secure_cookies: false, max_age_secs: 24 * 60 * 60, prune_interval_secs: 300 }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self.host.parse().with_context(|| format!("Invalid host address '{}'", self.host))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Load configuration: defaults, then the optional TOML file, then environment variables
pub fn load_config(path: Option<&Path>) -> Result<DashboardConfig> {
    let mut config = match path {
        Some(path) => {
            tracing::debug!("Loading configuration from file: {:?}", path);
            load_from_file(path)?
        }
        None => DashboardConfig::default(),
    };

    load_from_env(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config)?;

    Ok(config)
}

/// Load configuration from a TOML file
fn load_from_file(path: &Path) -> Result<DashboardConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    toml::from_str(&contents).with_context(|| format!("Failed to parse config file {}", path.display()))
}

/// Override with environment variables
fn load_from_env<F>(config: &mut DashboardConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup("DASHBOARD_HOST") {
        config.server.host = host;
    }

    if let Some(port) = lookup("DASHBOARD_PORT") {
        config.server.port = port.parse::<u16>().with_context(|| format!("Invalid DASHBOARD_PORT '{port}'"))?;
    }

    if let Some(level) = lookup("DASHBOARD_LOG_LEVEL") {
        config.logging.level = level;
    }

    if let Some(format) = lookup("DASHBOARD_LOG_FORMAT") {
        config.logging.format = format;
    }

    if let Some(policy) = lookup("DASHBOARD_SPARSE_SAMPLE_POLICY") {
        config.stats.sparse_sample_policy = policy.parse::<SparseSamplePolicy>().map_err(anyhow::Error::msg)?;
    }

    if let Some(secure) = lookup("DASHBOARD_SECURE_COOKIES") {
        config.session.secure_cookies = secure
            .parse::<bool>()
            .with_context(|| format!("Invalid DASHBOARD_SECURE_COOKIES '{secure}'"))?;
    }

    config.yahoo.apply_overrides(&lookup)?;

    Ok(())
}

/// Validate configuration
fn validate_config(config: &DashboardConfig) -> Result<()> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.logging.level.as_str()) {
        return Err(anyhow::anyhow!("Invalid log level: {}", config.logging.level));
    }

    let valid_formats = ["json", "pretty", "compact"];
    if !valid_formats.contains(&config.logging.format.as_str()) {
        return Err(anyhow::anyhow!("Invalid log format: {}", config.logging.format));
    }

    if config.server.port == 0 {
        return Err(anyhow::anyhow!("Server port must be greater than 0"));
    }
    config.server.socket_addr()?;

    if config.session.max_age_secs == 0 || config.session.prune_interval_secs == 0 {
        return Err(anyhow::anyhow!("Session max age and prune interval must be greater than 0"));
    }

    config.yahoo.validate().context("Invalid Yahoo configuration")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    const CREDENTIALS: [(&str, &str); 2] = [("YAHOO_CLIENT_ID", "id"), ("YAHOO_CLIENT_SECRET", "secret")];

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.stats.sparse_sample_policy, SparseSamplePolicy::Undefined);
        assert!(!config.session.secure_cookies);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = DashboardConfig::default();
        let mut pairs = CREDENTIALS.to_vec();
        pairs.extend([
            ("DASHBOARD_PORT", "8088"),
            ("DASHBOARD_LOG_FORMAT", "json"),
            ("DASHBOARD_SPARSE_SAMPLE_POLICY", "omit"),
            ("DASHBOARD_SECURE_COOKIES", "true"),
        ]);
        load_from_env(&mut config, env(&pairs)).unwrap();

        assert_eq!(config.server.port, 8088);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.stats.sparse_sample_policy, SparseSamplePolicy::Omit);
        assert!(config.session.secure_cookies);
        assert_eq!(config.yahoo.oauth.client_id, "id");
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_bad_env_values_are_rejected() {
        let mut config = DashboardConfig::default();
        assert!(load_from_env(&mut config, env(&[("DASHBOARD_PORT", "http")])).is_err());
        assert!(load_from_env(&mut config, env(&[("DASHBOARD_SPARSE_SAMPLE_POLICY", "drop")])).is_err());
    }

    #[test]
    fn test_unparsable_secure_cookies_is_rejected() {
        let mut config = DashboardConfig::default();
        let err = load_from_env(&mut config, env(&[("DASHBOARD_SECURE_COOKIES", "yes")])).unwrap_err();
        assert!(err.to_string().contains("DASHBOARD_SECURE_COOKIES"));
        assert!(!config.session.secure_cookies);
    }

    #[test]
    fn test_validation() {
        let mut config = DashboardConfig::default();
        load_from_env(&mut config, env(&CREDENTIALS)).unwrap();
        assert!(validate_config(&config).is_ok());

        let mut bad_level = config.clone();
        bad_level.logging.level = "loud".into();
        assert!(validate_config(&bad_level).is_err());

        let mut bad_host = config.clone();
        bad_host.server.host = "not-an-ip".into();
        assert!(validate_config(&bad_host).is_err());

        let mut no_secret = config;
        no_secret.yahoo.oauth.client_secret.clear();
        assert!(validate_config(&no_secret).is_err());
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[server]
host = "0.0.0.0"
port = 9000

[stats]
sparse_sample_policy = "omit"

[yahoo]
game_key = "449"

[yahoo.oauth]
client_id = "from-file"
"#
        )
        .unwrap();

        let config = load_from_file(file.path()).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.stats.sparse_sample_policy, SparseSamplePolicy::Omit);
        assert_eq!(config.yahoo.game_key, "449");
        assert_eq!(config.yahoo.oauth.client_id, "from-file");
        // Untouched sections keep their defaults
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.yahoo.oauth.token_url, "https://api.login.yahoo.com/oauth2/get_token");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_from_file(&dir.path().join("absent.toml")).is_err());
    }
}
