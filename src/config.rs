/*
 * Responsibility
 * - 環境変数からの設定読み込み (PORT, APP_ENV, リクエスト timeout, Auth 設定)
 * - 設定値のバリデーション (不足・不正なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::services::auth::signature::SigningAlgorithm;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Everything the authorization gate needs.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub issuer: String,
    pub audience: String,
    pub algorithm: SigningAlgorithm,
    pub jwks_url: Url,
    pub jwks_cache_ttl: Duration,
    pub jwks_fetch_timeout: Duration,
    // Plain http for the key-discovery URL (local identity provider / tests)
    pub jwks_allow_http: bool,
    pub leeway_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub request_timeout: Duration,
    pub auth: AuthSettings,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the process environment in production).
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match get("PORT") {
            Some(s) => s.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = get("APP_ENV")
            .map(|v| AppEnv::parse(&v))
            .unwrap_or(AppEnv::Development);

        let request_timeout = Duration::from_secs(seconds(&get, "REQUEST_TIMEOUT_SECONDS", 30)?);
        if request_timeout.is_zero() {
            return Err(ConfigError::Invalid("REQUEST_TIMEOUT_SECONDS"));
        }

        let auth = AuthSettings::from_lookup(&get)?;

        Ok(Self {
            addr,
            app_env,
            request_timeout,
            auth,
        })
    }
}

impl AuthSettings {
    fn from_lookup<F>(get: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let domain = get("AUTH_DOMAIN")
            .map(|d| d.trim().trim_end_matches('/').to_string())
            .filter(|d| !d.is_empty())
            .ok_or(ConfigError::Missing("AUTH_DOMAIN"))?;

        let audience = get("AUTH_AUDIENCE")
            .filter(|a| !a.trim().is_empty())
            .ok_or(ConfigError::Missing("AUTH_AUDIENCE"))?;

        let issuer = get("AUTH_ISSUER").unwrap_or_else(|| format!("https://{}/", domain));

        let algorithm = match get("AUTH_ALGORITHM") {
            Some(alg) => alg
                .parse::<SigningAlgorithm>()
                .map_err(|_| ConfigError::Invalid("AUTH_ALGORITHM"))?,
            None => SigningAlgorithm::default(),
        };

        let jwks_allow_http = match get("AUTH_JWKS_ALLOW_HTTP") {
            Some(v) => parse_bool(&v).ok_or(ConfigError::Invalid("AUTH_JWKS_ALLOW_HTTP"))?,
            None => false,
        };

        let jwks_url = get("AUTH_JWKS_URL")
            .unwrap_or_else(|| format!("https://{}/.well-known/jwks.json", domain));
        let jwks_url = Url::parse(&jwks_url).map_err(|_| ConfigError::Invalid("AUTH_JWKS_URL"))?;
        match jwks_url.scheme() {
            "https" => {}
            "http" if jwks_allow_http => {}
            _ => return Err(ConfigError::Invalid("AUTH_JWKS_URL")),
        }

        let jwks_cache_ttl = Duration::from_secs(seconds(
            get,
            "AUTH_JWKS_CACHE_TTL_SECONDS",
            600, // 10 min
        )?);
        let jwks_fetch_timeout =
            Duration::from_secs(seconds(get, "AUTH_JWKS_FETCH_TIMEOUT_SECONDS", 5)?);
        if jwks_fetch_timeout.is_zero() {
            return Err(ConfigError::Invalid("AUTH_JWKS_FETCH_TIMEOUT_SECONDS"));
        }

        let leeway_seconds = seconds(get, "ACCESS_TOKEN_LEEWAY_SECONDS", 0)?;

        Ok(Self {
            issuer,
            audience,
            algorithm,
            jwks_url,
            jwks_cache_ttl,
            jwks_fetch_timeout,
            jwks_allow_http,
            leeway_seconds,
        })
    }
}

fn seconds<F>(get: &F, key: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
