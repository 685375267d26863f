//! # Client configuration
//!
//! Configuration is layered the same way for every deployment:
//!
//! 1. embedded defaults (`hipay.yaml`)
//! 2. `config.yaml` from the configuration directory, deep-merged
//! 3. environment overrides `PMOHIPAY_CONFIG__HIPAY__<KEY>=value`
//!
//! The configuration directory is, in order: the explicit argument, the
//! `PMOHIPAY_CONFIG` variable, `./.pmohipay`, `~/.pmohipay`. Nothing is ever written.
//!
//! ```no_run
//! use pmohipay::{HipayClient, HipayConfig};
//!
//! let config = HipayConfig::load("")?;
//! let client = HipayClient::from_config(&config)?;
//! # Ok::<(), pmohipay::Error>(())
//! ```

use crate::error::{Error, Result};
use dirs::home_dir;
use serde::{Deserialize, Deserializer};
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};
use tracing::{debug, info};

const DEFAULT_CONFIG: &str = include_str!("hipay.yaml");

const ENV_CONFIG_DIR: &str = "PMOHIPAY_CONFIG";
const ENV_PREFIX: &str = "PMOHIPAY_CONFIG__";
const CONFIG_DIR_NAME: &str = ".pmohipay";
const CONFIG_FILE: &str = "config.yaml";
const SECTION: &str = "hipay";

/// Settings of a [`HipayClient`](crate::HipayClient)
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct HipayConfig {
    /// `production`, `stage` or an http(s) URL
    #[serde(deserialize_with = "scalar_string")]
    pub environment: String,

    #[serde(deserialize_with = "scalar_string")]
    pub login: String,

    #[serde(deserialize_with = "scalar_string")]
    pub password: String,

    #[serde(default, deserialize_with = "optional_scalar_string")]
    pub sub_account_login: Option<String>,

    #[serde(default, deserialize_with = "optional_scalar_string")]
    pub sub_account_id: Option<String>,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default, deserialize_with = "optional_scalar_string")]
    pub user_agent: Option<String>,
}

fn default_timeout_ms() -> u64 {
    30_000
}

impl std::fmt::Debug for HipayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HipayConfig")
            .field("environment", &self.environment)
            .field("login", &self.login)
            .field("password", &"***")
            .field("sub_account_login", &self.sub_account_login)
            .field("sub_account_id", &self.sub_account_id)
            .field("timeout_ms", &self.timeout_ms)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl HipayConfig {
    /// Load from a configuration directory (empty string: search the usual places)
    pub fn load(directory: &str) -> Result<Self> {
        let dir = find_config_dir(directory);
        Self::load_with_env(dir.as_deref(), env::vars())
    }

    /// Load from an optional directory with an explicit set of environment variables
    pub fn load_with_env<I>(directory: Option<&Path>, vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut config: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;

        if let Some(dir) = directory {
            let path = dir.join(CONFIG_FILE);
            if path.is_file() {
                info!(config_file=%path.display(), "Loaded config file");
                let external: Value = serde_yaml::from_str(&fs::read_to_string(&path)?)?;
                merge_yaml(&mut config, &lower_keys_value(external));
            } else {
                info!(config_file=%path.display(), "Config file not found, using embedded defaults");
            }
        }

        let mut config = lower_keys_value(config);
        apply_env_overrides(&mut config, vars);

        section(&config)
    }

    /// Load from a YAML string holding a `hipay` section, without any override
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let mut config: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;
        let external: Value = serde_yaml::from_str(yaml)?;
        merge_yaml(&mut config, &lower_keys_value(external));
        section(&config)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Configuration directory, if any of the candidates applies
pub fn find_config_dir(directory: &str) -> Option<PathBuf> {
    if !directory.is_empty() {
        return Some(PathBuf::from(directory));
    }

    if let Ok(env_path) = env::var(ENV_CONFIG_DIR) {
        info!(env_var = ENV_CONFIG_DIR, path = %env_path, "Trying to load config from env");
        return Some(PathBuf::from(env_path));
    }

    let local = Path::new(CONFIG_DIR_NAME);
    if local.is_dir() {
        return Some(local.to_path_buf());
    }

    home_dir()
        .map(|home| home.join(CONFIG_DIR_NAME))
        .filter(|path| path.is_dir())
}

fn section(config: &Value) -> Result<HipayConfig> {
    let section = config
        .get(SECTION)
        .cloned()
        .ok_or_else(|| Error::config(format!("missing `{SECTION}` section")))?;
    Ok(serde_yaml::from_value(section)?)
}

fn apply_env_overrides<I>(config: &mut Value, vars: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    for (key, value) in vars {
        if let Some(path) = key.strip_prefix(ENV_PREFIX) {
            let key_path: Vec<String> = path.split("__").map(str::to_lowercase).collect();
            debug!(key = %key, "Applying environment override");
            let value = convert_env_value(lookup(config, &key_path), value);
            set_value(config, &key_path, value);
        }
    }
}

fn set_value(data: &mut Value, path: &[String], value: Value) {
    let Some((head, rest)) = path.split_first() else {
        *data = value;
        return;
    };
    if !matches!(data, Value::Mapping(_)) {
        *data = Value::Mapping(Mapping::new());
    }
    if let Value::Mapping(map) = data {
        let entry = map
            .entry(Value::String(head.clone()))
            .or_insert(Value::Mapping(Mapping::new()));
        set_value(entry, rest, value);
    }
}

fn lookup<'a>(data: &'a Value, path: &[String]) -> Option<&'a Value> {
    path.iter().try_fold(data, |node, key| node.get(key.as_str()))
}

/// Only keys whose current value is a number or a boolean are coerced;
/// everything else keeps the raw text
fn convert_env_value(current: Option<&Value>, value: String) -> Value {
    match current {
        Some(Value::Number(_) | Value::Bool(_)) => serde_yaml::from_str::<Value>(&value)
            .ok()
            .filter(|parsed| matches!(parsed, Value::Number(_) | Value::Bool(_)))
            .unwrap_or(Value::String(value)),
        _ => Value::String(value),
    }
}

fn lower_keys_value(value: Value) -> Value {
    match value {
        Value::Mapping(map) => {
            let mut new_map = Mapping::new();
            for (k, v) in map {
                let key = match k {
                    Value::String(s) => Value::String(s.to_lowercase()),
                    other => other,
                };
                new_map.insert(key, lower_keys_value(v));
            }
            Value::Mapping(new_map)
        }
        Value::Sequence(seq) => Value::Sequence(seq.into_iter().map(lower_keys_value).collect()),
        _ => value,
    }
}

/// Deep merge: mappings are merged, everything else is replaced
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

/// Numeric logins and ids are common; accept any scalar as a string
fn scalar_string<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    optional_scalar_string(deserializer).map(Option::unwrap_or_default)
}

fn optional_scalar_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        other => Err(serde::de::Error::custom(format!(
            "expected a scalar, got {other:?}"
        ))),
    }
}
