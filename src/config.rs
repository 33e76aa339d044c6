//! Configuration for stepgen.
//!
//! Configuration sources (highest priority first):
//! 1. Command-line flags
//! 2. Environment variables (LLM_MODEL, LLM_API_ENDPOINT, LLM_API_KEY),
//!    after loading a `.env` file if one exists
//! 3. Config file (`stepgen.yaml` in the working directory, or `--config`)
//! 4. Defaults
//!
//! Settings are resolved once in `main` and passed by reference; nothing
//! below the CLI reads the environment.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

pub const DEFAULT_MODEL: &str = "gpt-4-turbo";
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_CONFIG_FILE: &str = "stepgen.yaml";

pub const ENV_MODEL: &str = "LLM_MODEL";
pub const ENV_ENDPOINT: &str = "LLM_API_ENDPOINT";
pub const ENV_API_KEY: &str = "LLM_API_KEY";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LlmConfig {
    pub model: Option<String>,
    pub endpoint: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub request_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    /// Directory holding the prompt files
    pub prompts: Option<String>,
    /// Root for the generated application files
    pub output: Option<String>,
    /// Directory the auxiliary config files are written to
    pub auxiliary: Option<String>,
}

impl ConfigFile {
    /// Load and parse a config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse config YAML")
    }
}

/// Values given explicitly on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    pub prompts_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

/// Fully resolved settings for one process
#[derive(Clone)]
pub struct Settings {
    pub model: String,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub request_timeout: Duration,
    pub prompts_dir: PathBuf,
    pub output_dir: PathBuf,
    pub auxiliary_dir: PathBuf,
    /// Path to config file (if one was used)
    pub config_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            temperature: 0.2,
            max_tokens: 4000,
            request_timeout: Duration::from_secs(300),
            prompts_dir: PathBuf::from("prompts"),
            output_dir: PathBuf::from("generated"),
            auxiliary_dir: PathBuf::from("."),
            config_file: None,
        }
    }
}

// Keep the key out of logs and `config` output.
impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.masked_api_key())
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("request_timeout", &self.request_timeout)
            .field("prompts_dir", &self.prompts_dir)
            .field("output_dir", &self.output_dir)
            .field("auxiliary_dir", &self.auxiliary_dir)
            .field("config_file", &self.config_file)
            .finish()
    }
}

impl Settings {
    /// Load settings from every source.
    ///
    /// `config_path` forces a specific config file; otherwise
    /// `stepgen.yaml` is used when present in the working directory.
    pub fn load(overrides: Overrides, config_path: Option<&Path>) -> Result<Self> {
        // A missing .env file is fine
        let _ = dotenvy::dotenv();

        let (file, used_path) = match config_path {
            Some(path) => (Some(ConfigFile::from_file(path)?), Some(path.to_path_buf())),
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    (Some(ConfigFile::from_file(&default_path)?), Some(default_path))
                } else {
                    (None, None)
                }
            }
        };

        let mut settings = Self::resolve(overrides, file, |key| std::env::var(key).ok());
        settings.config_file = used_path;
        Ok(settings)
    }

    /// Merge the sources in priority order
    pub fn resolve<F>(overrides: Overrides, file: Option<ConfigFile>, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let file = file.unwrap_or_default();
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let model = overrides
            .model
            .or_else(|| env(ENV_MODEL))
            .or(file.llm.model)
            .unwrap_or(defaults.model);

        let endpoint = overrides
            .endpoint
            .or_else(|| env(ENV_ENDPOINT))
            .or(file.llm.endpoint)
            .unwrap_or(defaults.endpoint);

        let api_key = overrides.api_key.or_else(|| env(ENV_API_KEY));

        let prompts_dir = overrides
            .prompts_dir
            .or_else(|| file.paths.prompts.map(PathBuf::from))
            .unwrap_or(defaults.prompts_dir);

        let output_dir = overrides
            .output_dir
            .or_else(|| file.paths.output.map(PathBuf::from))
            .unwrap_or(defaults.output_dir);

        let auxiliary_dir = file
            .paths
            .auxiliary
            .map(PathBuf::from)
            .unwrap_or(defaults.auxiliary_dir);

        Self {
            model,
            endpoint,
            api_key,
            temperature: file.llm.temperature.unwrap_or(defaults.temperature),
            max_tokens: file.llm.max_tokens.unwrap_or(defaults.max_tokens),
            request_timeout: file
                .llm
                .request_timeout_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            prompts_dir,
            output_dir,
            auxiliary_dir,
            config_file: None,
        }
    }

    /// API key with everything but the last four characters hidden
    pub fn masked_api_key(&self) -> String {
        match &self.api_key {
            None => "<not set>".to_string(),
            Some(key) => match key.char_indices().rev().nth(3) {
                Some((idx, _)) if idx > 0 => format!("****{}", &key[idx..]),
                _ => "****".to_string(),
            },
        }
    }
}
