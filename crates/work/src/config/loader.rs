//! Configuration loader
//!
//! Loads [`WorkConfig`] from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `WECOM_CORP_ID`: Corp id (required)
//! - `WECOM_CORP_SECRET`: App secret (required)
//! - `WECOM_AGENT_ID`: Agent id
//! - `WECOM_QYAPI_DOMAIN`: Enterprise API domain
//! - `WECOM_OPEN_QYAPI_DOMAIN`: Web login domain
//! - `WECOM_OPEN_API_DOMAIN`: OAuth redirect domain
//! - `WECOM_REQUEST_TIMEOUT_SECS`: HTTP timeout in seconds
//! - `WECOM_TOKEN_MARGIN_SECS`: Seconds subtracted from token lifetimes
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./wecom.toml` or `./wecom.json` (current working directory)
//! 2. `./config.toml` or `./config.json` (current working directory)
//! 3. The same names relative to the executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::WorkConfig;
use crate::error::{WorkError, WorkResult};

const CONFIG_FILE_NAMES: &[&str] = &["wecom.toml", "wecom.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `WorkError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing
pub fn load() -> WorkResult<WorkConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// `WECOM_CORP_ID` and `WECOM_CORP_SECRET` must be present; every other
/// variable falls back to its default.
///
/// # Errors
/// Returns `WorkError::Config` if required variables are missing, a numeric
/// variable does not parse, or the result fails validation.
pub fn load_from_env() -> WorkResult<WorkConfig> {
    let mut config = WorkConfig::new(env_var("WECOM_CORP_ID")?, env_var("WECOM_CORP_SECRET")?);

    config.agent_id = env_parse::<i64>("WECOM_AGENT_ID")?;
    if let Some(domain) = env_opt("WECOM_QYAPI_DOMAIN") {
        config.qyapi_domain = domain;
    }
    if let Some(domain) = env_opt("WECOM_OPEN_QYAPI_DOMAIN") {
        config.open_qyapi_domain = domain;
    }
    if let Some(domain) = env_opt("WECOM_OPEN_API_DOMAIN") {
        config.open_api_domain = domain;
    }
    if let Some(secs) = env_parse::<u64>("WECOM_REQUEST_TIMEOUT_SECS")? {
        config.request_timeout_secs = secs;
    }
    if let Some(secs) = env_parse::<u64>("WECOM_TOKEN_MARGIN_SECS")? {
        config.token_margin_secs = secs;
    }

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `WorkError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> WorkResult<WorkConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(WorkError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            WorkError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| WorkError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `WorkError::Config` if format is invalid or parsing fails.
pub fn parse_config(contents: &str, path: &Path) -> WorkResult<WorkConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| WorkError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| WorkError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(WorkError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe the standard paths for a configuration file
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(CONFIG_FILE_NAMES.iter().map(|name| cwd.join(name)));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(CONFIG_FILE_NAMES.iter().map(|name| exe_dir.join(name)));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> WorkResult<String> {
    std::env::var(key)
        .map_err(|_| WorkError::Config(format!("Missing required environment variable: {key}")))
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Parse an optional numeric environment variable
fn env_parse<T>(key: &str) -> WorkResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| WorkError::Config(format!("Invalid {key}: {e}")))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use tempfile::NamedTempFile;

    use super::*;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const ALL_VARS: &[&str] = &[
        "WECOM_CORP_ID",
        "WECOM_CORP_SECRET",
        "WECOM_AGENT_ID",
        "WECOM_QYAPI_DOMAIN",
        "WECOM_OPEN_QYAPI_DOMAIN",
        "WECOM_OPEN_API_DOMAIN",
        "WECOM_REQUEST_TIMEOUT_SECS",
        "WECOM_TOKEN_MARGIN_SECS",
    ];

    fn clear_env() {
        for key in ALL_VARS {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_load_from_env_all_vars_set() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("WECOM_CORP_ID", "ww-env");
        std::env::set_var("WECOM_CORP_SECRET", "env-secret");
        std::env::set_var("WECOM_AGENT_ID", "1000002");
        std::env::set_var("WECOM_QYAPI_DOMAIN", "http://127.0.0.1:9000");
        std::env::set_var("WECOM_REQUEST_TIMEOUT_SECS", "5");
        std::env::set_var("WECOM_TOKEN_MARGIN_SECS", "600");

        let result = load_from_env();
        clear_env();

        let config = result.expect("config from env");
        assert_eq!(config.corp_id, "ww-env");
        assert_eq!(config.corp_secret, "env-secret");
        assert_eq!(config.agent_id, Some(1_000_002));
        assert_eq!(config.qyapi_domain, "http://127.0.0.1:9000");
        assert_eq!(config.open_api_domain, super::super::DEFAULT_OPEN_API_DOMAIN);
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.token_margin_secs, 600);
    }

    #[test]
    fn test_load_from_env_missing_var() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var("WECOM_CORP_ID", "ww-env");

        let result = load_from_env();
        clear_env();

        let err = result.unwrap_err();
        assert_eq!(
            err,
            WorkError::Config("Missing required environment variable: WECOM_CORP_SECRET".into())
        );
    }

    #[test]
    fn test_load_from_env_invalid_number() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var("WECOM_CORP_ID", "ww-env");
        std::env::set_var("WECOM_CORP_SECRET", "env-secret");
        std::env::set_var("WECOM_AGENT_ID", "not-a-number");

        let result = load_from_env();
        clear_env();

        assert!(matches!(result, Err(WorkError::Config(message)) if message.contains("WECOM_AGENT_ID")));
    }

    #[test]
    fn test_load_from_file_toml() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
corp_id = "ww-file"
corp_secret = "file-secret"
agent_id = 1000005
token_margin_secs = 900
"#
        )
        .unwrap();

        let config = load_from_file(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.corp_id, "ww-file");
        assert_eq!(config.agent_id, Some(1_000_005));
        assert_eq!(config.token_margin_secs, 900);
        assert_eq!(config.qyapi_domain, super::super::DEFAULT_QYAPI_DOMAIN);
    }

    #[test]
    fn test_load_from_file_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"corp_id": "ww-json", "corp_secret": "json-secret"}}"#).unwrap();

        let config = load_from_file(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.corp_id, "ww-json");
        assert_eq!(config.agent_id, None);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_load_from_file_rejects_invalid_config() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"corp_id": "", "corp_secret": "s"}}"#).unwrap();

        let err = load_from_file(Some(file.path().to_path_buf())).unwrap_err();
        assert_eq!(err, WorkError::Config("corp_id must not be empty".into()));
    }

    #[test]
    fn test_load_from_file_not_found() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/wecom.toml")));
        assert!(matches!(result, Err(WorkError::Config(message)) if message.contains("not found")));
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().with_extension("yaml");
        let err = parse_config("corp_id: ww", &path).unwrap_err();
        assert_eq!(err, WorkError::Config("Unsupported config format: yaml".into()));
    }

    #[test]
    fn test_parse_config_invalid_toml() {
        let err = parse_config("corp_id = ", Path::new("wecom.toml")).unwrap_err();
        assert!(matches!(err, WorkError::Config(message) if message.starts_with("Invalid TOML")));
    }
}
