//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `BOOKSLOT_DB_PATH`: Database file path
//! - `BOOKSLOT_DB_POOL_SIZE`: Connection pool size
//! - `BOOKSLOT_BIND_ADDR`: HTTP listen address, e.g. `127.0.0.1:8080`
//! - `BOOKSLOT_WORKDAY_START` / `BOOKSLOT_WORKDAY_END`: Working-hours window (`HH:MM`)
//! - `BOOKSLOT_TIMEZONE`: IANA timezone of the working-hours window
//! - `BOOKSLOT_SLOT_STEP_MINUTES`: Optional slot stepping override
//! - `BOOKSLOT_CALENDAR_CLIENT_ID` / `BOOKSLOT_CALENDAR_CLIENT_SECRET`: OAuth client
//! - `BOOKSLOT_CALENDAR_REDIRECT_URI`: OAuth redirect URI
//! - `BOOKSLOT_CALENDAR_API_BASE_URL`: Provider REST base URL
//! - `BOOKSLOT_CALENDAR_AUTH_BASE_URL`: Provider OAuth base URL
//! - `BOOKSLOT_STATE_SECRET`: Secret signing the OAuth state tokens
//!
//! ## File Locations
//! The loader probes `./config.{json,toml}` and `./bookslot.{json,toml}`,
//! then parent directories, then paths relative to the executable.

use std::path::{Path, PathBuf};

use bookslot_domain::{
    BookingConfig, BookslotError, CalendarConfig, Config, DatabaseConfig, Result, ServerConfig,
};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `BookslotError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "environment incomplete, trying config file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// All required environment variables must be present. Returns an error
/// if any are missing.
pub fn load_from_env() -> Result<Config> {
    let db_path = env_var("BOOKSLOT_DB_PATH")?;
    let db_pool_size = env_var("BOOKSLOT_DB_POOL_SIZE").and_then(|s| {
        s.parse::<u32>().map_err(|e| BookslotError::Config(format!("invalid pool size: {e}")))
    })?;
    let bind_addr = env_var("BOOKSLOT_BIND_ADDR")?;

    let workday_start = env_var("BOOKSLOT_WORKDAY_START")?;
    let workday_end = env_var("BOOKSLOT_WORKDAY_END")?;
    let timezone = env_var("BOOKSLOT_TIMEZONE")?;
    let slot_step_minutes = match std::env::var("BOOKSLOT_SLOT_STEP_MINUTES") {
        Ok(s) => Some(s.parse::<i64>().map_err(|e| {
            BookslotError::Config(format!("invalid slot step: {e}"))
        })?),
        Err(_) => None,
    };

    let config = Config {
        database: DatabaseConfig { path: db_path, pool_size: db_pool_size },
        server: ServerConfig { bind_addr },
        booking: BookingConfig { workday_start, workday_end, timezone, slot_step_minutes },
        calendar: CalendarConfig {
            client_id: env_var("BOOKSLOT_CALENDAR_CLIENT_ID")?,
            client_secret: env_var("BOOKSLOT_CALENDAR_CLIENT_SECRET")?,
            redirect_uri: env_var("BOOKSLOT_CALENDAR_REDIRECT_URI")?,
            api_base_url: env_var("BOOKSLOT_CALENDAR_API_BASE_URL")?,
            auth_base_url: env_var("BOOKSLOT_CALENDAR_AUTH_BASE_URL")?,
            state_secret: env_var("BOOKSLOT_STATE_SECRET")?,
        },
    };

    // Fail fast on values that only blow up at request time.
    config.booking.workday_window()?;
    config.booking.tz()?;

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(BookslotError::Config(format!(
                    "config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            BookslotError::Config("no config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| BookslotError::Config(format!("failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.booking.workday_window()?;
    config.booking.tz()?;
    Ok(config)
}

fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| BookslotError::Config(format!("invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| BookslotError::Config(format!("invalid JSON format: {e}"))),
        _ => Err(BookslotError::Config(format!("unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files, returning the first hit.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(vec![
            cwd.join("config.json"),
            cwd.join("config.toml"),
            cwd.join("bookslot.json"),
            cwd.join("bookslot.toml"),
            cwd.join("../config.json"),
            cwd.join("../config.toml"),
        ]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(vec![
                exe_dir.join("config.json"),
                exe_dir.join("config.toml"),
                exe_dir.join("bookslot.json"),
                exe_dir.join("bookslot.toml"),
            ]);
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| BookslotError::Config(format!("missing required environment variable: {key}")))
}
