//! # Configuration
//!
//! Plugin configuration as supplied by the host (a JSON object), plus the
//! on-disk `.memoria/config.json` loader.
//!
//! ## Keys
//!
//! | key                           | default              |
//! |-------------------------------|----------------------|
//! | `apiKey`                      | `$MEMORIA_API_KEY`   |
//! | `containerTag`                | `memoria_<hostname>` |
//! | `autoRecall` / `autoCapture`  | `true`               |
//! | `maxRecallResults`            | `10`                 |
//! | `profileFrequency`            | `50`                 |
//! | `captureMode`                 | `all`                |
//! | `debug`                       | `false`              |

use crate::error::ConfigError;
use crate::memory::identity::sanitize_key;
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Environment variable consulted when no `apiKey` is configured
pub const API_KEY_ENV: &str = "MEMORIA_API_KEY";

/// Environment variable overriding the runtime directory
pub const RUNTIME_PATH_ENV: &str = "MEMORIA_RUNTIME_PATH";

const ALLOWED_KEYS: &[&str] = &[
    "apiKey",
    "containerTag",
    "autoRecall",
    "autoCapture",
    "maxRecallResults",
    "profileFrequency",
    "captureMode",
    "debug",
    "enableCustomContainerTags",
    "customContainers",
    "customContainerInstructions",
];

static ENV_REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").expect("static pattern"));

/// What the capture hook stores
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    /// Conversation text with injected context removed and short lines dropped
    #[default]
    All,
    /// Conversation text exactly as exchanged
    Everything,
}

/// Additional container the agent may route memories to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomContainer {
    pub tag: String,
    pub description: String,
}

/// Resolved plugin configuration
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MemoryConfig {
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub container_tag: String,
    pub auto_recall: bool,
    pub auto_capture: bool,
    pub max_recall_results: usize,
    pub profile_frequency: usize,
    pub capture_mode: CaptureMode,
    pub debug: bool,
    pub enable_custom_container_tags: bool,
    pub custom_containers: Vec<CustomContainer>,
    pub custom_container_instructions: String,
}

/// Raw shape of the host-supplied object; every key optional
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RawConfig {
    api_key: Option<String>,
    container_tag: Option<String>,
    auto_recall: Option<bool>,
    auto_capture: Option<bool>,
    max_recall_results: Option<usize>,
    profile_frequency: Option<usize>,
    capture_mode: Option<String>,
    debug: Option<bool>,
    enable_custom_container_tags: Option<bool>,
    custom_containers: Option<Vec<Value>>,
    custom_container_instructions: Option<Value>,
}

impl MemoryConfig {
    /// Parse host configuration using the process environment
    pub fn parse(raw: &Value) -> Result<Self, ConfigError> {
        Self::parse_with_env(raw, |name| std::env::var(name).ok())
    }

    /// Parse host configuration with an explicit environment lookup.
    ///
    /// Anything other than a JSON object is treated as an empty config.
    pub fn parse_with_env<F>(raw: &Value, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let empty = serde_json::Map::new();
        let obj = raw.as_object().unwrap_or(&empty);

        let unknown: Vec<&str> = obj
            .keys()
            .map(String::as_str)
            .filter(|k| !ALLOWED_KEYS.contains(k))
            .collect();
        if !unknown.is_empty() {
            return Err(ConfigError::UnknownKeys(unknown.join(", ")));
        }

        let cfg: RawConfig = serde_json::from_value(Value::Object(obj.clone()))?;

        let api_key = match cfg.api_key.filter(|k| !k.is_empty()) {
            Some(key) => resolve_env_vars(&key, &env).ok(),
            None => env(API_KEY_ENV).filter(|k| !k.is_empty()),
        };

        let container_tag = match cfg.container_tag.filter(|t| !t.is_empty()) {
            Some(tag) => sanitize_key(&tag),
            None => default_container_tag(&host_name(&env)),
        };

        let custom_containers = cfg
            .custom_containers
            .unwrap_or_default()
            .iter()
            .filter_map(|entry| {
                let tag = entry.get("tag")?.as_str()?;
                let description = entry.get("description")?.as_str()?;
                Some(CustomContainer {
                    tag: sanitize_key(tag),
                    description: description.to_string(),
                })
            })
            .collect();

        Ok(Self {
            api_key,
            container_tag,
            auto_recall: cfg.auto_recall.unwrap_or(true),
            auto_capture: cfg.auto_capture.unwrap_or(true),
            max_recall_results: cfg.max_recall_results.unwrap_or(10),
            profile_frequency: cfg.profile_frequency.unwrap_or(50),
            capture_mode: match cfg.capture_mode.as_deref() {
                Some("everything") => CaptureMode::Everything,
                _ => CaptureMode::All,
            },
            debug: cfg.debug.unwrap_or(false),
            enable_custom_container_tags: cfg.enable_custom_container_tags.unwrap_or(false),
            custom_containers,
            custom_container_instructions: cfg
                .custom_container_instructions
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default(),
        })
    }

    /// Load `config.json` from the runtime directory; a missing file yields
    /// the defaults.
    pub async fn load() -> Result<Self> {
        Self::load_from(&runtime_path()).await
    }

    /// Load `config.json` from an explicit runtime directory
    pub async fn load_from(dir: &Path) -> Result<Self> {
        let path = dir.join("config.json");
        let raw = if tokio::fs::metadata(&path).await.is_ok() {
            let content = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read config: {:?}", path))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config: {:?}", path))?
        } else {
            Value::Null
        };

        Self::parse(&raw).with_context(|| format!("Invalid config: {:?}", path))
    }

    /// Whether an API key is available
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Profile frequency safe for modulo arithmetic
    pub fn effective_profile_frequency(&self) -> usize {
        self.profile_frequency.max(1)
    }

    /// Non-fatal warnings about recall tuning values
    pub fn validate_recall_config(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if !(1..=50).contains(&self.max_recall_results) {
            warnings.push(format!(
                "maxRecallResults should be between 1 and 50 (got {})",
                self.max_recall_results
            ));
        }
        if !(1..=500).contains(&self.profile_frequency) {
            warnings.push(format!(
                "profileFrequency should be between 1 and 500 (got {})",
                self.profile_frequency
            ));
        }
        warnings
    }

    /// API key with the middle hidden, for status output
    pub fn redacted_api_key(&self) -> Option<String> {
        self.api_key.as_ref().map(|key| {
            let chars: Vec<char> = key.chars().collect();
            if chars.len() <= 10 {
                "***".to_string()
            } else {
                let head: String = chars[..6].iter().collect();
                let tail: String = chars[chars.len() - 4..].iter().collect();
                format!("{}…{}", head, tail)
            }
        })
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        // an empty object never trips the unknown-key check
        Self::parse_with_env(&Value::Null, |_| None).unwrap_or_else(|_| Self {
            api_key: None,
            container_tag: default_container_tag("localhost"),
            auto_recall: true,
            auto_capture: true,
            max_recall_results: 10,
            profile_frequency: 50,
            capture_mode: CaptureMode::All,
            debug: false,
            enable_custom_container_tags: false,
            custom_containers: Vec::new(),
            custom_container_instructions: String::new(),
        })
    }
}

/// Replace `${VAR}` references with environment values
pub fn resolve_env_vars<F>(value: &str, env: F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut resolved = String::with_capacity(value.len());
    let mut last = 0;
    for caps in ENV_REFERENCE.captures_iter(value) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let var = env(name.as_str())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(name.as_str().to_string()))?;
        resolved.push_str(&value[last..whole.start()]);
        resolved.push_str(&var);
        last = whole.end();
    }
    resolved.push_str(&value[last..]);
    Ok(resolved)
}

/// Container tag used when none is configured
pub fn default_container_tag(host: &str) -> String {
    sanitize_key(&format!("memoria_{}", host))
}

fn host_name<F>(env: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    env("HOSTNAME")
        .or_else(|| std::fs::read_to_string("/etc/hostname").ok())
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}

/// Runtime directory (`.memoria` under the working directory)
pub fn runtime_path() -> PathBuf {
    if let Ok(path) = std::env::var(RUNTIME_PATH_ENV) {
        return PathBuf::from(path);
    }

    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".memoria")
}
