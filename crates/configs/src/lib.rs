use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4) }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
    /// Apply pending migrations when the server starts.
    #[serde(default = "default_auto_migrate")]
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
            auto_migrate: default_auto_migrate(),
        }
    }
}

fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }
fn default_auto_migrate() -> bool { true }

/// `$CONFIG_PATH`, defaulting to `config.toml`.
pub fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

/// `Ok(None)` only when the file does not exist.
pub fn read_optional(path: &str) -> Result<Option<AppConfig>> {
    match load_from_file(path) {
        Ok(cfg) => Ok(Some(cfg)),
        Err(e) if is_missing_file(&e) => Ok(None),
        Err(e) => Err(e.context(format!("invalid config file {}", path))),
    }
}

fn is_missing_file(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>().is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound)
}

impl AppConfig {
    /// Config file if present, otherwise defaults filled from the environment.
    /// A file that exists but does not parse is an error.
    pub fn load_or_env() -> Result<Self> {
        let mut cfg = read_optional(&config_path())?
            .unwrap_or_else(|| AppConfig { server: ServerConfig::from_env(), database: DatabaseConfig::default() });
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.database.normalize_from_env();
        self.database.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(host) = std::env::var("SERVER_HOST") {
            cfg.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            cfg.port = port;
        }
        if let Some(w) = std::env::var("TOKIO_WORKER_THREADS").ok().and_then(|v| v.parse::<usize>().ok()) {
            cfg.worker_threads = Some(w);
        }
        cfg
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn normalize_from_env(&mut self) {
        if self.url.trim().is_empty() {
            if let Ok(url) = std::env::var("DATABASE_URL") {
                self.url = url;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set it in config.toml or DATABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://")) {
            return Err(anyhow!("database.url must start with postgresql:// or postgres://"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_file() {
        let cfg = parse(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000
            worker_threads = 2

            [database]
            url = "postgres://u:p@localhost:5432/catalog"
            max_connections = 20
            auto_migrate = false
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.bind_addr(), "0.0.0.0:9000");
        assert_eq!(cfg.server.worker_threads, Some(2));
        assert_eq!(cfg.database.max_connections, 20);
        assert_eq!(cfg.database.min_connections, 2);
        assert!(!cfg.database.auto_migrate);
        assert!(cfg.database.validate().is_ok());
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let cfg = parse("").unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.database.acquire_timeout_secs, 30);
        assert!(cfg.database.auto_migrate);
    }

    #[test]
    fn malformed_file_is_an_error_not_a_fallback() {
        let path = std::env::temp_dir().join(format!("catalog-config-{}-malformed.toml", std::process::id()));
        std::fs::write(&path, "[server]\nport = \"not-a-number\"\n").unwrap();
        let res = read_optional(path.to_str().unwrap());
        std::fs::remove_file(&path).ok();
        let err = res.unwrap_err();
        assert!(err.to_string().starts_with("invalid config file"), "{err:#}");
    }

    #[test]
    fn missing_file_reads_as_none() {
        let path = std::env::temp_dir().join(format!("catalog-config-{}-absent.toml", std::process::id()));
        assert!(read_optional(path.to_str().unwrap()).unwrap().is_none());
    }

    #[test]
    fn rejects_non_postgres_url() {
        let db = DatabaseConfig { url: "mysql://localhost/db".into(), ..DatabaseConfig::default() };
        assert!(db.validate().is_err());
    }

    #[test]
    fn rejects_pool_smaller_than_minimum() {
        let db = DatabaseConfig {
            url: "postgres://localhost/db".into(),
            min_connections: 5,
            max_connections: 2,
            ..DatabaseConfig::default()
        };
        assert!(db.validate().is_err());
    }

    #[test]
    fn zero_port_is_rejected_and_zero_threads_reset() {
        let mut s = ServerConfig { host: " ".into(), port: 0, worker_threads: Some(0) };
        assert!(s.normalize().is_err());
        s.port = 8081;
        s.normalize().unwrap();
        assert_eq!(s.host, "127.0.0.1");
        assert_eq!(s.worker_threads, Some(4));
    }
}
