use anyhow::Context;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Base URL of the cell map backend
    pub cellmap_backend_url: String,
    /// Model sent when a request names none
    pub ai_default_model: String,
    /// Pause after growing the grid for an AI fill
    pub ai_settle: Duration,
    /// Initial grid size of a new session
    pub grid_rows: usize,
    pub grid_cols: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            cellmap_backend_url: "http://localhost:8000".to_string(),
            ai_default_model: "mistralai/devstral-small:free".to_string(),
            ai_settle: Duration::from_millis(100),
            grid_rows: 30,
            grid_cols: 30,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT", defaults.port)?,
            cellmap_backend_url: env::var("CELLMAP_BACKEND_URL")
                .unwrap_or(defaults.cellmap_backend_url),
            ai_default_model: env::var("AI_DEFAULT_MODEL").unwrap_or(defaults.ai_default_model),
            ai_settle: Duration::from_millis(parse_var(
                "AI_SETTLE_MS",
                defaults.ai_settle.as_millis() as u64,
            )?),
            grid_rows: parse_var("GRID_ROWS", defaults.grid_rows)?,
            grid_cols: parse_var("GRID_COLS", defaults.grid_cols)?,
        })
    }
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {}: {:?}", name, value)),
        Err(_) => Ok(default),
    }
}
