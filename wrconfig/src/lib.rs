//! # WebRotor configuration
//!
//! Configuration management for WebRotor:
//! - Loading configuration from a YAML file
//! - Merging with the embedded default configuration
//! - Environment variable overrides (`WEBROTOR_CONFIG__…`)
//! - Type-safe getters and setters for configuration values
//! - Thread-safe singleton access, plus explicit `Arc<Config>` handles
//! - In-place reload, driven by the config-file watcher
//!
//! ## Usage
//!
//! ```no_run
//! use wrconfig::get_config;
//!
//! let config = get_config();
//! let port = config.get_http_port();
//! let playlist = config.get_program_file();
//! ```

use anyhow::{anyhow, Result};
use dirs::home_dir;
use lazy_static::lazy_static;
use serde_yaml::{Mapping, Number, Value};
use std::{
    env, fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tracing::info;

mod watcher;
pub use watcher::watch_config;

// Embedded default configuration
const DEFAULT_CONFIG: &str = include_str!("webrotor.yaml");

lazy_static! {
    static ref CONFIG: Arc<Config> =
        Arc::new(Config::load_config("").expect("Failed to load WebRotor configuration"));
}

const ENV_CONFIG_DIR: &str = "WEBROTOR_CONFIG";
const ENV_PREFIX: &str = "WEBROTOR_CONFIG__";

const DEFAULT_HTTP_PORT: u16 = 8080;
const DEFAULT_PROGRAM_FILE: &str = "programs.csv";
const DEFAULT_LOG_MIN_LEVEL: &str = "INFO";

/// Macro to generate getter/setter for bool values with default
macro_rules! impl_bool_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> bool {
            match self.get_value($path) {
                Ok(Value::Bool(b)) => b,
                _ => $default,
            }
        }

        pub fn $setter(&self, value: bool) -> Result<()> {
            self.set_value($path, Value::Bool(value))
        }
    };
}

/// Macro to generate getter/setter for string values with default
macro_rules! impl_string_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> String {
            match self.get_value($path) {
                Ok(Value::String(s)) if !s.is_empty() => s,
                _ => $default.to_string(),
            }
        }

        pub fn $setter(&self, value: String) -> Result<()> {
            self.set_value($path, Value::String(value))
        }
    };
}

/// Configuration manager for WebRotor
///
/// Holds the merged YAML value tree behind a mutex so concurrent
/// readers (scheduler, HTTP handlers, watcher) always observe a
/// complete configuration, and so a `reload()` swaps it atomically.
#[derive(Debug)]
pub struct Config {
    config_dir: String,
    path: String,
    data: Mutex<Value>,
}

impl Clone for Config {
    fn clone(&self) -> Self {
        let data = self.data.lock().unwrap().clone();
        Self {
            config_dir: self.config_dir.clone(),
            path: self.path.clone(),
            data: Mutex::new(data),
        }
    }
}

impl Config {
    /// Finds a config directory by trying different locations in order
    fn find_config_dir(directory: &str) -> String {
        // 1. Provided directory
        if !directory.is_empty() {
            return directory.to_string();
        }

        // 2. Environment variable
        if let Ok(env_path) = env::var(ENV_CONFIG_DIR) {
            info!(env_var = ENV_CONFIG_DIR, path = %env_path, "Trying to load config from env");
            return env_path;
        }

        // 3. Current directory
        if Path::new(".webrotor").exists() {
            return ".webrotor".to_string();
        }

        // 4. Home directory
        if let Some(home) = home_dir() {
            let home_config = home.join(".webrotor");
            if home_config.exists() {
                return home_config.to_string_lossy().to_string();
            }
        }

        ".webrotor".to_string()
    }

    /// Validates and prepares a config directory
    fn validate_config_dir(path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        if !path.is_dir() {
            return Err(anyhow!("Config path is not a directory"));
        }

        // Write/read permission check
        let test_file = path.join(".write_test");
        fs::write(&test_file, b"test")?;
        fs::remove_file(&test_file)?;
        fs::read_dir(path)?;

        Ok(())
    }

    /// Determines and validates the configuration directory
    ///
    /// Search order: the `directory` argument, then `$WEBROTOR_CONFIG`,
    /// then `.webrotor` in the current directory, then `~/.webrotor`.
    /// The directory is created if missing.
    pub fn config_dir(directory: &str) -> Result<String> {
        let dir_path = Self::find_config_dir(directory);
        Self::validate_config_dir(Path::new(&dir_path))?;
        Ok(dir_path)
    }

    /// Reads `config.yaml` at `path` (when present), merges it over the
    /// embedded defaults, lowercases keys and applies env overrides.
    fn read_merged(path: &str) -> Result<Value> {
        let mut default_value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;

        let yaml_data = if let Ok(data) = fs::read(path) {
            info!(config_file = %path, "Loaded config file");
            data
        } else {
            info!(config_file = %path, "Config file not found, using default embedded config");
            DEFAULT_CONFIG.as_bytes().to_vec()
        };

        let external_value: Value = serde_yaml::from_slice(&yaml_data)?;
        merge_yaml(&mut default_value, &external_value);
        let mut config_value = Self::lower_keys_value(default_value);

        Self::apply_env_overrides(&mut config_value);
        Ok(config_value)
    }

    /// Loads the configuration from the specified directory (or from
    /// the default search locations when `directory` is empty).
    pub fn load_config(directory: &str) -> Result<Self> {
        let config_dir = Self::config_dir(directory)?;
        info!(config_dir = %config_dir, "Using config directory");

        let config_file_path = Path::new(&config_dir).join("config.yaml");
        let path = config_file_path.to_string_lossy().to_string();

        let config_value = Self::read_merged(&path)?;

        Ok(Config {
            config_dir,
            path,
            data: Mutex::new(config_value),
        })
    }

    /// Re-reads the config file and replaces the in-memory tree.
    ///
    /// Every `Arc<Config>` holder observes the new values on its next
    /// getter call.
    pub fn reload(&self) -> Result<()> {
        let fresh = Self::read_merged(&self.path)?;
        *self.data.lock().unwrap() = fresh;
        info!(config_file = %self.path, "Configuration reloaded");
        Ok(())
    }

    /// Path of the external config file (whether or not it exists yet).
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Saves the current configuration to the config.yaml file
    pub fn save(&self) -> Result<()> {
        let data = self.data.lock().unwrap();
        let yaml = serde_yaml::to_string(&*data)?;
        fs::write(&self.path, yaml)?;
        Ok(())
    }

    /// Sets a configuration value at the specified path and saves it
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        let mut data = self.data.lock().unwrap();
        Self::set_value_internal(&mut data, path, value)?;
        drop(data);
        self.save()?;
        Ok(())
    }

    fn set_value_internal(data: &mut Value, path: &[&str], value: Value) -> Result<()> {
        if path.is_empty() {
            *data = value;
            return Ok(());
        }
        if let Value::Mapping(map) = data {
            let key = path[0].to_lowercase();
            let key_value = Value::String(key);
            if path.len() == 1 {
                map.insert(key_value, value);
            } else {
                let entry = map
                    .entry(key_value)
                    .or_insert(Value::Mapping(Mapping::new()));
                Self::set_value_internal(entry, &path[1..], value)?;
            }
            Ok(())
        } else {
            Err(anyhow!("Current node is not a map"))
        }
    }

    /// Gets a configuration value at the specified path
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        let data = self.data.lock().unwrap();
        Self::get_value_internal(&data, path)
    }

    fn get_value_internal(data: &Value, path: &[&str]) -> Result<Value> {
        let mut current = data;
        for (i, key) in path.iter().enumerate() {
            if let Value::Mapping(map) = current {
                let key = key.to_lowercase();
                if let Some(next) = map.get(&Value::String(key)) {
                    current = next;
                } else {
                    return Err(anyhow!("Path {} does not exist", path[..=i].join(".")));
                }
            } else {
                return Err(anyhow!("Path {} is not a Config", path[..i].join(".")));
            }
        }
        Ok(current.clone())
    }

    fn apply_env_overrides(config: &mut Value) {
        for (key, value) in env::vars() {
            if key.starts_with(ENV_PREFIX) {
                let key_path = key
                    .trim_start_matches(ENV_PREFIX)
                    .split("__")
                    .collect::<Vec<_>>();
                let yaml_value = Self::convert_env_value(&value);
                let _ = Self::set_value_internal(config, &key_path, yaml_value);
            }
        }
    }

    fn convert_env_value(value: &str) -> Value {
        if let Ok(parsed) = serde_yaml::from_str::<Value>(value) {
            return parsed;
        }
        Value::String(value.to_string())
    }

    fn lower_keys_value(value: Value) -> Value {
        match value {
            Value::Mapping(map) => {
                let mut new_map = Mapping::new();
                for (k, v) in map {
                    if let Value::String(s) = k {
                        new_map.insert(Value::String(s.to_lowercase()), Self::lower_keys_value(v));
                    } else {
                        new_map.insert(k, Self::lower_keys_value(v));
                    }
                }
                Value::Mapping(new_map)
            }
            Value::Sequence(seq) => {
                Value::Sequence(seq.into_iter().map(Self::lower_keys_value).collect())
            }
            _ => value,
        }
    }

    /// Resolves a possibly-relative path against the config directory.
    fn resolve_path(&self, path: &str) -> PathBuf {
        let p = Path::new(path);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            Path::new(&self.config_dir).join(p)
        }
    }

    /// Path of the playlist CSV, resolved against the config directory.
    pub fn get_program_file(&self) -> PathBuf {
        let configured = match self.get_value(&["program_file"]) {
            Ok(Value::String(s)) if !s.is_empty() => s,
            _ => DEFAULT_PROGRAM_FILE.to_string(),
        };
        self.resolve_path(&configured)
    }

    pub fn set_program_file(&self, path: String) -> Result<()> {
        self.set_value(&["program_file"], Value::String(path))
    }

    /// HTTP port of the control surface.
    pub fn get_http_port(&self) -> u16 {
        match self.get_value(&["http_port"]) {
            Ok(Value::Number(n)) => n
                .as_u64()
                .or_else(|| n.as_i64().and_then(|v| u64::try_from(v).ok()))
                .map(|v| v as u16)
                .unwrap_or(DEFAULT_HTTP_PORT),
            Ok(Value::String(s)) => s.parse().unwrap_or_else(|_| {
                tracing::warn!(port = %s, "Invalid http_port, using default {}", DEFAULT_HTTP_PORT);
                DEFAULT_HTTP_PORT
            }),
            _ => DEFAULT_HTTP_PORT,
        }
    }

    pub fn set_http_port(&self, port: u16) -> Result<()> {
        self.set_value(&["http_port"], Value::Number(Number::from(port)))
    }

    impl_bool_config!(get_api_enabled, set_api_enabled, &["apienabled"], false);
    impl_bool_config!(get_interactive, set_interactive, &["interactive"], false);
    impl_bool_config!(get_tls_enabled, set_tls_enabled, &["tlsenabled"], false);
    impl_bool_config!(
        get_timer_overlay,
        set_timer_overlay,
        &["timeroverlay"],
        false
    );

    impl_string_config!(get_driver, set_driver, &["driver"], "remote");
    impl_string_config!(
        get_log_min_level,
        set_log_min_level,
        &["logger", "min_level"],
        DEFAULT_LOG_MIN_LEVEL
    );

    /// Address (`host:port`) of the controlled browser. Required: an
    /// unset or empty value is a startup error.
    pub fn get_browser_address(&self) -> Result<String> {
        match self.get_value(&["browser_address"]) {
            Ok(Value::String(s)) if !s.is_empty() => Ok(s),
            _ => Err(anyhow!(
                "browser_address must be set via config or the {}BROWSER_ADDRESS environment variable",
                ENV_PREFIX
            )),
        }
    }

    pub fn set_browser_address(&self, address: String) -> Result<()> {
        self.set_value(&["browser_address"], Value::String(address))
    }

    /// TLS certificate path, resolved against the config directory.
    pub fn get_tls_cert_path(&self) -> PathBuf {
        let configured = match self.get_value(&["tls_cert"]) {
            Ok(Value::String(s)) if !s.is_empty() => s,
            _ => "server.crt".to_string(),
        };
        self.resolve_path(&configured)
    }

    /// TLS key path, resolved against the config directory.
    pub fn get_tls_key_path(&self) -> PathBuf {
        let configured = match self.get_value(&["tls_key"]) {
            Ok(Value::String(s)) if !s.is_empty() => s,
            _ => "server.key".to_string(),
        };
        self.resolve_path(&configured)
    }
}

/// Returns the global configuration instance
///
/// Lazily loaded on first access; panics (and thus exits non-zero) when
/// the configuration cannot be loaded at all.
pub fn get_config() -> Arc<Config> {
    CONFIG.clone()
}

/// Merges external YAML configuration into default configuration
///
/// Mappings merge key by key; scalars and sequences from `external`
/// replace the default wholesale.
fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (d, e) => *d = e.clone(),
    }
}
