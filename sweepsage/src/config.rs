//! Application configuration, read from a single toml file.
//!
//! Relative paths in the file are resolved against the project root. That is the directory above
//! the one holding the config file (`<root>/config/sweepsage.toml`), unless `SWEEPSAGE_HOME` is
//! set.
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "config/sweepsage.toml";
pub const HOME_ENV: &str = "SWEEPSAGE_HOME";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub models: ModelsConfig,
    pub store: StoreConfig,
    pub prompts: PromptsConfig,
    pub agent: AgentConfig,
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(skip)]
    root: PathBuf,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EmbeddingProvider {
    #[default]
    Dashscope,
    Ollama,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelsConfig {
    pub chat_model_name: String,
    pub embedding_model_name: String,
    /// Embedding model served by ollama, used when `embedding_provider` is `ollama`
    #[serde(default)]
    pub local_embedding_model_name: Option<String>,
    #[serde(default)]
    pub embedding_provider: EmbeddingProvider,
    #[serde(default)]
    pub dashscope_api_base: Option<String>,
    #[serde(default)]
    pub ollama_api_base: Option<String>,
}

impl ModelsConfig {
    /// The embedding model for the configured provider
    pub fn active_embedding_model(&self) -> &str {
        match self.embedding_provider {
            EmbeddingProvider::Ollama => self
                .local_embedding_model_name
                .as_deref()
                .unwrap_or(&self.embedding_model_name),
            EmbeddingProvider::Dashscope => &self.embedding_model_name,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub collection_name: String,
    pub persist_directory: PathBuf,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    #[serde(default = "default_separators")]
    pub separators: Vec<String>,
    #[serde(default = "default_k")]
    pub k: usize,
    pub data_path: PathBuf,
    pub allow_knowledge_file_type: Vec<String>,
    #[serde(default = "default_ledger_path")]
    pub ledger_path: PathBuf,
    #[serde(default = "default_embed_batch_size")]
    pub embed_batch_size: usize,
}

/// Keys are optional so a missing one surfaces as a prompt error naming the key
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromptsConfig {
    pub main_prompt_path: Option<PathBuf>,
    pub rag_summarize_prompt_path: Option<PathBuf>,
    pub report_prompt_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    pub external_data_path: PathBuf,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_console_level")]
    pub console_level: String,
    #[serde(default = "default_file_level")]
    pub file_level: String,
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            console_level: default_console_level(),
            file_level: default_file_level(),
            log_dir: default_log_dir(),
        }
    }
}

fn default_separators() -> Vec<String> {
    sweepsage_indexing::chunker::default_separators()
}

fn default_k() -> usize {
    3
}

fn default_ledger_path() -> PathBuf {
    PathBuf::from("store/md5_hex_store")
}

fn default_embed_batch_size() -> usize {
    10
}

fn default_max_iterations() -> usize {
    10
}

fn default_console_level() -> String {
    "info".to_string()
}

fn default_file_level() -> String {
    "debug".to_string()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

impl Config {
    /// Loads the config file at `path`.
    ///
    /// # Errors
    ///
    /// Fails if the file does not exist, cannot be read, or misses a required key.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs_err::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let home = std::env::var_os(HOME_ENV).map(PathBuf::from);
        let root = project_root(path, home);

        Self::from_toml_str(&content, root).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parses a config with relative paths resolved against `root`
    ///
    /// # Errors
    ///
    /// Fails on invalid toml or a missing required key.
    pub fn from_toml_str(content: &str, root: impl Into<PathBuf>) -> Result<Self, toml::de::Error> {
        let mut config: Config = toml::from_str(content)?;
        config.root = root.into();
        Ok(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a configured path against the project root. Absolute paths are kept.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

/// The project root for a config file, preferring an explicit home directory
pub fn project_root(config_path: &Path, home: Option<PathBuf>) -> PathBuf {
    if let Some(home) = home.filter(|home| !home.as_os_str().is_empty()) {
        return home;
    }

    let config_path = std::path::absolute(config_path).unwrap_or_else(|_| config_path.to_path_buf());
    config_path
        .parent()
        .and_then(Path::parent)
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}
