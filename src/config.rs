use std::env;

#[derive(Debug, Clone)]
pub enum Deployment {
    Local,
    Dev,
    Stage,
    Prod,
}

impl Deployment {
    #[must_use]
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Self::Dev,
            "stage" | "staging" => Self::Stage,
            "prod" | "production" => Self::Prod,
            _ => Self::Local,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // Database (the logger's SQLite file)
    pub database_url: String,

    // API settings
    pub api_host: String,
    pub api_port: u16,

    // Requests slower than this are answered with 408
    pub request_timeout_seconds: u64,

    // HS256 secret for upload tokens; uploads are open when unset
    pub log_token: Option<String>,

    // Sessions (sort order persistence)
    pub session_idle_seconds: u64,
    pub session_max_entries: u64,

    // Plot canvas defaults
    pub plot_width: f64,
    pub plot_height: f64,
    pub plot_padding_x: f64,
    pub plot_padding_y: f64,

    // Application metadata
    pub deployment: Deployment,
}

fn var_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables (and `.env`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the plot canvas is too small for its
    /// padding.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = Self {
            // Database
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://logger_data.db?mode=rwc".to_string()),

            // API settings
            api_host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            api_port: var_or("API_PORT", 8001),

            request_timeout_seconds: var_or("REQUEST_TIMEOUT_SECONDS", 30),
            log_token: env::var("LOG_TOKEN").ok().filter(|t| !t.trim().is_empty()),

            // Sessions
            session_idle_seconds: var_or("SESSION_IDLE_SECONDS", 1800), // 30 minutes
            session_max_entries: var_or("SESSION_MAX_ENTRIES", 10_000),

            // Plot canvas
            plot_width: var_or("PLOT_WIDTH", 800.0),
            plot_height: var_or("PLOT_HEIGHT", 480.0),
            plot_padding_x: var_or("PLOT_PADDING_X", 10.0),
            plot_padding_y: var_or("PLOT_PADDING_Y", 10.0),

            // Application metadata
            deployment: Deployment::from_str(
                &env::var("DEPLOYMENT").unwrap_or_else(|_| "local".to_string()),
            ),
        };

        if config.plot_width <= 2.0 * config.plot_padding_x {
            return Err(ConfigError::Invalid("PLOT_WIDTH must exceed twice PLOT_PADDING_X"));
        }
        if config.plot_height <= 2.0 * config.plot_padding_y {
            return Err(ConfigError::Invalid("PLOT_HEIGHT must exceed twice PLOT_PADDING_Y"));
        }

        Ok(config)
    }

    /// Configuration for tests and embedding: in-memory database, defaults
    /// everywhere else.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            api_host: "127.0.0.1".to_string(),
            api_port: 0,
            request_timeout_seconds: 30,
            log_token: None,
            session_idle_seconds: 1800,
            session_max_entries: 1000,
            plot_width: 800.0,
            plot_height: 480.0,
            plot_padding_x: 10.0,
            plot_padding_y: 10.0,
            deployment: Deployment::Local,
        }
    }

    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}
