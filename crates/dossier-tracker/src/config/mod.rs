use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_GOOGLE_SCOPES: [&str; 5] = [
    "https://www.googleapis.com/auth/calendar",
    "https://www.googleapis.com/auth/calendar.events",
    "https://www.googleapis.com/auth/gmail.readonly",
    "https://www.googleapis.com/auth/gmail.compose",
    "https://www.googleapis.com/auth/gmail.modify",
];

const DEV_JWT_SECRET: &str = "dossiertracker-dev-secret";

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub auth: AuthConfig,
    pub google: Option<GoogleConfig>,
    pub smtp: Option<SmtpConfig>,
    pub reminders: ReminderConfig,
    pub catalog_seed_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "4000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            auth: AuthConfig::from_env(environment)?,
            google: GoogleConfig::from_env(),
            smtp: SmtpConfig::from_env()?,
            reminders: ReminderConfig::from_env()?,
            catalog_seed_path: non_empty_var("CATALOG_SEED_PATH").map(PathBuf::from),
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Access token signing and password hashing.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl: chrono::Duration,
    pub bcrypt_cost: u32,
}

impl AuthConfig {
    fn from_env(environment: AppEnvironment) -> Result<Self, ConfigError> {
        let jwt_secret = match non_empty_var("JWT_SECRET") {
            Some(secret) => secret,
            None if environment == AppEnvironment::Production => {
                return Err(ConfigError::MissingVar("JWT_SECRET"))
            }
            None => DEV_JWT_SECRET.to_string(),
        };

        let ttl_hours = parse_var::<i64>("JWT_TTL_HOURS", 168)?;
        if ttl_hours <= 0 {
            return Err(ConfigError::InvalidNumber("JWT_TTL_HOURS"));
        }

        let bcrypt_cost = parse_var::<u32>("BCRYPT_COST", 10)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::InvalidNumber("BCRYPT_COST"));
        }

        Ok(Self {
            jwt_secret,
            token_ttl: chrono::Duration::hours(ttl_hours),
            bcrypt_cost,
        })
    }
}

/// OAuth client registration used for Calendar and Gmail access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
}

impl GoogleConfig {
    fn from_env() -> Option<Self> {
        let client_id = non_empty_var("GOOGLE_CLIENT_ID")?;
        let client_secret = non_empty_var("GOOGLE_CLIENT_SECRET")?;
        let redirect_uri = non_empty_var("GOOGLE_REDIRECT_URI")?;
        let scopes = match non_empty_var("GOOGLE_SCOPES") {
            Some(raw) => raw.split_whitespace().map(str::to_string).collect(),
            None => default_google_scopes(),
        };

        Some(Self {
            client_id,
            client_secret,
            redirect_uri,
            scopes,
        })
    }
}

pub fn default_google_scopes() -> Vec<String> {
    DEFAULT_GOOGLE_SCOPES.iter().map(|s| s.to_string()).collect()
}

/// Outbound mail relay used when a user has no Gmail connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
}

impl SmtpConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let (Some(host), Some(port), Some(from)) = (
            non_empty_var("SMTP_HOST"),
            non_empty_var("SMTP_PORT"),
            non_empty_var("SMTP_FROM"),
        ) else {
            return Ok(None);
        };

        let port = port
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidNumber("SMTP_PORT"))?;
        if port == 0 {
            return Ok(None);
        }

        Ok(Some(Self {
            host,
            port,
            username: non_empty_var("SMTP_USER"),
            password: non_empty_var("SMTP_PASS"),
            from,
        }))
    }
}

/// Polling cadence of the reminder dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderConfig {
    pub enabled: bool,
    pub poll_interval: Duration,
    pub batch_size: usize,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval: Duration::from_secs(60),
            batch_size: 50,
        }
    }
}

impl ReminderConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let enabled = match non_empty_var("REMINDER_DISPATCH_ENABLED") {
            Some(raw) => match raw.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => return Err(ConfigError::InvalidFlag("REMINDER_DISPATCH_ENABLED")),
            },
            None => true,
        };

        let poll_seconds = parse_var::<u64>("REMINDER_POLL_SECONDS", 60)?;
        let batch_size = parse_var::<usize>("REMINDER_BATCH_SIZE", 50)?;
        if poll_seconds == 0 {
            return Err(ConfigError::InvalidNumber("REMINDER_POLL_SECONDS"));
        }
        if batch_size == 0 {
            return Err(ConfigError::InvalidNumber("REMINDER_BATCH_SIZE"));
        }

        Ok(Self {
            enabled,
            poll_interval: Duration::from_secs(poll_seconds),
            batch_size,
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match non_empty_var(name) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber(name)),
        None => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    MissingVar(&'static str),
    InvalidNumber(&'static str),
    InvalidFlag(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::MissingVar(name) => write!(f, "{name} must be set in production"),
            ConfigError::InvalidNumber(name) => write!(f, "{name} is not a valid value"),
            ConfigError::InvalidFlag(name) => write!(f, "{name} must be true or false"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for name in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "JWT_SECRET",
            "JWT_TTL_HOURS",
            "BCRYPT_COST",
            "GOOGLE_CLIENT_ID",
            "GOOGLE_CLIENT_SECRET",
            "GOOGLE_REDIRECT_URI",
            "GOOGLE_SCOPES",
            "SMTP_HOST",
            "SMTP_PORT",
            "SMTP_USER",
            "SMTP_PASS",
            "SMTP_FROM",
            "REMINDER_POLL_SECONDS",
            "REMINDER_BATCH_SIZE",
            "REMINDER_DISPATCH_ENABLED",
            "CATALOG_SEED_PATH",
        ] {
            env::remove_var(name);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.auth.jwt_secret, DEV_JWT_SECRET);
        assert_eq!(config.auth.bcrypt_cost, 10);
        assert!(config.google.is_none());
        assert!(config.smtp.is_none());
        assert_eq!(config.reminders, ReminderConfig::default());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 4000));
    }

    #[test]
    fn production_requires_jwt_secret() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ENV", "production");
        let err = AppConfig::load().expect_err("secret required");
        assert!(matches!(err, ConfigError::MissingVar("JWT_SECRET")));
        reset_env();
    }

    #[test]
    fn google_requires_all_three_credentials() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("GOOGLE_CLIENT_ID", "client");
        env::set_var("GOOGLE_CLIENT_SECRET", "secret");
        assert!(AppConfig::load().expect("loads").google.is_none());

        env::set_var("GOOGLE_REDIRECT_URI", "http://localhost/google/callback");
        env::set_var("GOOGLE_SCOPES", "scope-a  scope-b");
        let google = AppConfig::load().expect("loads").google.expect("enabled");
        assert_eq!(google.scopes, vec!["scope-a", "scope-b"]);
        reset_env();
    }

    #[test]
    fn smtp_and_reminder_settings_parse() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("SMTP_HOST", "smtp.example.com");
        env::set_var("SMTP_PORT", "2525");
        env::set_var("SMTP_FROM", "no-reply@example.com");
        env::set_var("REMINDER_POLL_SECONDS", "30");
        env::set_var("REMINDER_DISPATCH_ENABLED", "off");
        let config = AppConfig::load().expect("loads");
        let smtp = config.smtp.expect("smtp enabled");
        assert_eq!(smtp.port, 2525);
        assert!(smtp.username.is_none());
        assert_eq!(config.reminders.poll_interval, Duration::from_secs(30));
        assert!(!config.reminders.enabled);

        env::set_var("REMINDER_BATCH_SIZE", "0");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidNumber("REMINDER_BATCH_SIZE"))
        ));
        reset_env();
    }
}
