use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use tracing::warn;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub server_addr: String,
    pub api_prefix: String,

    // Sessions
    pub session_cookie: String,
    /// Idle expiry in seconds, 0 keeps sessions until logout or restart
    pub session_ttl_secs: u64,

    // Rate limiting, 0 disables the limiter
    pub rate_login_per_min: u32,

    // Bootstrap
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
    pub seed_demo_data: bool,
}

fn var_or<T: FromStr>(key: &str, default: T) -> T {
    parse_or(key, env::var(key).ok().as_deref(), default)
}

/// Unset keeps the default silently; a set value that does not parse keeps it with a warning.
fn parse_or<T: FromStr>(key: &str, raw: Option<&str>, default: T) -> T {
    let Some(raw) = raw else {
        return default;
    };

    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            warn!(key, value = raw, "Unparsable config value, using the default");
            default
        }
    }
}

fn var_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:8000".to_string()),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://school.db".to_string()),
            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),

            session_cookie: env::var("SESSION_COOKIE_NAME")
                .unwrap_or_else(|_| "session".to_string()),
            session_ttl_secs: var_or("SESSION_TTL_SECS", 0),

            rate_login_per_min: var_or("RATE_LOGIN_PER_MIN", 60),

            admin_username: var_opt("ADMIN_USERNAME"),
            admin_password: var_opt("ADMIN_PASSWORD"),
            seed_demo_data: var_or("SEED_DEMO_DATA", false),
        }
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            server_addr: "127.0.0.1:0".to_string(),
            api_prefix: "/api".to_string(),
            session_cookie: "session".to_string(),
            session_ttl_secs: 0,
            rate_login_per_min: 0,
            admin_username: None,
            admin_password: None,
            seed_demo_data: false,
        }
    }
}
