/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Upper bound on concurrently open editor sessions (default: `1000`).
    pub max_editor_sessions: usize,
    /// Seconds without activity before an editor session is evicted
    /// (default: `1800`).
    pub session_idle_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
            cors_origins: vec!["http://localhost:5173".into()],
            request_timeout_secs: 30,
            max_editor_sessions: 1000,
            session_idle_timeout_secs: 1800,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                 |
    /// |-----------------------------|-------------------------|
    /// | `HOST`                      | `0.0.0.0`               |
    /// | `PORT`                      | `3000`                  |
    /// | `CORS_ORIGINS`              | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`      | `30`                    |
    /// | `MAX_EDITOR_SESSIONS`       | `1000`                  |
    /// | `SESSION_IDLE_TIMEOUT_SECS` | `1800`                  |
    ///
    /// Returns a message naming the variable when a value does not parse.
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();

        let host = std::env::var("HOST").unwrap_or(defaults.host);

        let port = parse_env("PORT", defaults.port)?;

        let cors_origins = match std::env::var("CORS_ORIGINS") {
            Ok(raw) => parse_origins(&raw),
            Err(_) => defaults.cors_origins,
        };

        let request_timeout_secs =
            parse_env("REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs)?;

        let max_editor_sessions =
            parse_env("MAX_EDITOR_SESSIONS", defaults.max_editor_sessions)?;

        let session_idle_timeout_secs =
            parse_env("SESSION_IDLE_TIMEOUT_SECS", defaults.session_idle_timeout_secs)?;

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            max_editor_sessions,
            session_idle_timeout_secs,
        })
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T, String> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| format!("{name} must be a valid {}", std::any::type_name::<T>())),
        Err(_) => Ok(default),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
