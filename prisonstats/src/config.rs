//! Runtime configuration read from the environment.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

pub const DEFAULT_DB_PATH: &str = "database.db";
pub const DEFAULT_STATIC_DIR: &str = "static";
pub const DEFAULT_SOURCE: &str = "coding-test.pdf";

/// Username and password accepted by the HTTP API.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub static_dir: PathBuf,
    pub source: PathBuf,
    /// Only `serve` needs these, so their absence is not a startup error here.
    pub credentials: Option<Credentials>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupError {
    pub code: &'static str,
    pub message: String,
}

impl std::fmt::Display for StartupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for StartupError {}

impl Config {
    /// Load from the process environment, after applying a `.env` file if
    /// one is present.
    pub fn load() -> Result<Self, StartupError> {
        dotenv::dotenv().ok();
        let kv: HashMap<String, String> = std::env::vars().collect();
        Self::from_kv(&kv)
    }

    pub fn from_kv(kv: &HashMap<String, String>) -> Result<Self, StartupError> {
        let bind_addr = parse_socket_addr(
            kv.get("PRISONSTATS_BIND_ADDR"),
            SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8000),
            "PRISONSTATS_BIND_ADDR",
        )?;

        let username = optional_nonempty(kv, "API_USERNAME");
        let password = optional_nonempty(kv, "API_PASSWORD");
        let credentials = match (username, password) {
            (Some(username), Some(password)) => Some(Credentials { username, password }),
            (None, None) => None,
            _ => {
                return Err(StartupError {
                    code: "ERR_INVALID_CONFIG",
                    message: "API_USERNAME and API_PASSWORD must be set together".to_string(),
                })
            }
        };

        Ok(Self {
            db_path: path_or(kv, "PRISONSTATS_DB_PATH", DEFAULT_DB_PATH),
            bind_addr,
            static_dir: path_or(kv, "PRISONSTATS_STATIC_DIR", DEFAULT_STATIC_DIR),
            source: path_or(kv, "PRISONSTATS_SOURCE", DEFAULT_SOURCE),
            credentials,
        })
    }

    /// Credentials, or the startup error `serve` reports without them.
    pub fn require_credentials(&self) -> Result<&Credentials, StartupError> {
        self.credentials.as_ref().ok_or_else(|| StartupError {
            code: "ERR_MISSING_CONFIG",
            message: "missing required config keys API_USERNAME and API_PASSWORD".to_string(),
        })
    }
}

fn optional_nonempty(kv: &HashMap<String, String>, key: &'static str) -> Option<String> {
    kv.get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn path_or(kv: &HashMap<String, String>, key: &'static str, default: &str) -> PathBuf {
    PathBuf::from(optional_nonempty(kv, key).unwrap_or_else(|| default.to_string()))
}

fn parse_socket_addr(
    value: Option<&String>,
    default: SocketAddr,
    key: &'static str,
) -> Result<SocketAddr, StartupError> {
    match value {
        None => Ok(default),
        Some(v) if v.trim().is_empty() => Ok(default),
        Some(v) => v.trim().parse::<SocketAddr>().map_err(|_| StartupError {
            code: "ERR_INVALID_CONFIG",
            message: format!("{} must be a valid host:port socket address", key),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_kv(&HashMap::new()).unwrap();
        assert_eq!(config.db_path, PathBuf::from("database.db"));
        assert_eq!(config.bind_addr, "127.0.0.1:8000".parse().unwrap());
        assert_eq!(config.static_dir, PathBuf::from("static"));
        assert_eq!(config.source, PathBuf::from("coding-test.pdf"));
        assert!(config.credentials.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_kv(&env(&[
            ("PRISONSTATS_DB_PATH", "/tmp/p.db"),
            ("PRISONSTATS_BIND_ADDR", "0.0.0.0:9000"),
            ("PRISONSTATS_STATIC_DIR", "web"),
            ("PRISONSTATS_SOURCE", "data.pdf"),
            ("API_USERNAME", "admin"),
            ("API_PASSWORD", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/tmp/p.db"));
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.static_dir, PathBuf::from("web"));
        assert_eq!(config.source, PathBuf::from("data.pdf"));
        let credentials = config.require_credentials().unwrap();
        assert_eq!(credentials.username, "admin");
        assert_eq!(credentials.password, "secret");
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = Config::from_kv(&env(&[
            ("PRISONSTATS_DB_PATH", "  "),
            ("PRISONSTATS_BIND_ADDR", ""),
        ]))
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("database.db"));
        assert_eq!(config.bind_addr.port(), 8000);
    }

    #[test]
    fn test_invalid_bind_addr_fails() {
        let err = Config::from_kv(&env(&[("PRISONSTATS_BIND_ADDR", "not-an-addr")])).unwrap_err();
        assert_eq!(err.code, "ERR_INVALID_CONFIG");
        assert!(err.message.contains("PRISONSTATS_BIND_ADDR"));
    }

    #[test]
    fn test_half_configured_credentials_fail() {
        let err = Config::from_kv(&env(&[("API_USERNAME", "admin")])).unwrap_err();
        assert_eq!(err.code, "ERR_INVALID_CONFIG");
    }

    #[test]
    fn test_missing_credentials_only_fail_when_required() {
        let config = Config::from_kv(&HashMap::new()).unwrap();
        let err = config.require_credentials().unwrap_err();
        assert_eq!(err.code, "ERR_MISSING_CONFIG");
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let credentials = Credentials {
            username: "admin".to_string(),
            password: "secret".to_string(),
        };
        let text = format!("{:?}", credentials);
        assert!(text.contains("admin"));
        assert!(!text.contains("secret"));
    }
}
