//! Environment-driven configuration for the toolkit.
//!
//! Every option has a default except the remote credentials. Values are read through a
//! lookup function so tests can build a [`Config`] from a plain map; the binary calls
//! [`Config::from_env`] once after loading `.env` and passes the result down explicitly.

use crate::chunking::DEFAULT_CHUNK_SIZE;
use crate::record::DEFAULT_PREVIEW_CHARS;
use crate::selector::SelectionRules;
use std::collections::BTreeSet;
use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// File extensions indexed when `INDEX_EXTENSIONS` is unset.
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "cs", "ts", "js", "html", "css", "scss", "json", "sql", "md", "txt",
];

/// Directory names (or `/`-joined segment runs) skipped when `INDEX_IGNORE_DIRS` is unset.
pub const DEFAULT_IGNORED_DIRS: &[&str] = &[
    "node_modules",
    "bin",
    "obj",
    ".git",
    ".vs",
    "wwwroot/lib",
    "ClientApp/.angular",
    "dist",
];

const DEFAULT_MAX_FILE_BYTES: u64 = 100 * 1024;
const DEFAULT_BATCH_SIZE: usize = 100;
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";
const DEFAULT_EMBEDDING_DIMENSION: usize = 1536;
const DEFAULT_EMBEDDING_MAX_RETRIES: usize = 2;
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";
const DEFAULT_INDEX_NAME: &str = "sms-codebase";
const DEFAULT_PINECONE_ENVIRONMENT: &str = "us-east-1-aws";
const DEFAULT_CONTROLLER_URL: &str = "https://api.pinecone.io";

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
    /// A remote service credential is unset or still holds a placeholder.
    #[error(
        "{0} not set! Create a .env file containing `{0}=your_key_here` or export it before running"
    )]
    MissingCredential(String),
}

/// Supported embedding backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmbeddingProvider {
    /// Hosted OpenAI embeddings API (or any compatible endpoint).
    OpenAI,
    /// Local Ollama runtime.
    Ollama,
}

impl std::str::FromStr for EmbeddingProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "ollama" => Ok(Self::Ollama),
            _ => Err(()),
        }
    }
}

/// Serverless placement of a newly created index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placement {
    /// Cloud provider (`aws`, `gcp`, `azure`).
    pub cloud: String,
    /// Provider region, e.g. `us-east-1`.
    pub region: String,
}

impl Placement {
    /// Parse a legacy `<region>-<cloud>` environment string such as `us-east-1-aws`.
    ///
    /// Strings without a recognised cloud suffix are treated as an AWS region.
    pub fn parse(environment: &str) -> Self {
        let trimmed = environment.trim();
        for cloud in ["aws", "gcp", "azure"] {
            if let Some(region) = trimmed.strip_suffix(&format!("-{cloud}")) {
                return Self {
                    cloud: cloud.to_string(),
                    region: region.to_string(),
                };
            }
        }
        Self {
            cloud: "aws".to_string(),
            region: trimmed.to_string(),
        }
    }
}

/// Credentials required before the indexer may contact remote services.
#[derive(Clone, Debug)]
pub struct Credentials {
    /// Pinecone API key.
    pub pinecone_api_key: String,
    /// OpenAI API key; `None` when the embedding provider does not need one.
    pub openai_api_key: Option<String>,
}

/// Runtime configuration shared by the toolkit commands.
#[derive(Clone, Debug)]
pub struct Config {
    /// Directory walked by the indexer.
    pub root: PathBuf,
    /// Allowed file extensions, lowercase and without the leading dot.
    pub extensions: BTreeSet<String>,
    /// Ignored directory names; entries may span several segments (`wwwroot/lib`).
    pub ignored_dirs: BTreeSet<String>,
    /// Files larger than this many bytes are skipped.
    pub max_file_bytes: u64,
    /// Character threshold used by the line chunker.
    pub chunk_size: usize,
    /// Number of records sent per upsert request.
    pub batch_size: usize,
    /// Maximum characters of chunk text copied into record metadata.
    pub preview_chars: usize,
    /// Embedding backend.
    pub embedding_provider: EmbeddingProvider,
    /// Embedding model identifier passed to the provider.
    pub embedding_model: String,
    /// Dimensionality of the produced vectors.
    pub embedding_dimension: usize,
    /// Retries attempted for transient embedding failures.
    pub embedding_max_retries: usize,
    /// OpenAI API key, if present.
    pub openai_api_key: Option<String>,
    /// Base URL of the OpenAI-compatible API.
    pub openai_base_url: String,
    /// Base URL of the Ollama runtime.
    pub ollama_url: String,
    /// Pinecone API key, if present.
    pub pinecone_api_key: Option<String>,
    /// Name of the Pinecone index receiving the vectors.
    pub index_name: String,
    /// Placement used when the index has to be created.
    pub placement: Placement,
    /// Pinecone control-plane base URL.
    pub pinecone_controller_url: String,
}

impl Config {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup, validating along the way.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let config = Self {
            root: get("INDEX_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            extensions: get("INDEX_EXTENSIONS")
                .map(|value| parse_list(&value))
                .unwrap_or_else(|| DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect())
                .into_iter()
                .map(|ext| normalize_extension(&ext))
                .collect(),
            ignored_dirs: get("INDEX_IGNORE_DIRS")
                .map(|value| parse_list(&value))
                .unwrap_or_else(|| {
                    DEFAULT_IGNORED_DIRS
                        .iter()
                        .map(|dir| dir.to_string())
                        .collect()
                }),
            max_file_bytes: parse_or(&get, "INDEX_MAX_FILE_BYTES", DEFAULT_MAX_FILE_BYTES)?,
            chunk_size: parse_or(&get, "INDEX_CHUNK_SIZE", DEFAULT_CHUNK_SIZE)?,
            batch_size: parse_or(&get, "INDEX_BATCH_SIZE", DEFAULT_BATCH_SIZE)?,
            preview_chars: parse_or(&get, "INDEX_PREVIEW_CHARS", DEFAULT_PREVIEW_CHARS)?,
            embedding_provider: match get("EMBEDDING_PROVIDER") {
                Some(value) => value
                    .parse()
                    .map_err(|()| ConfigError::InvalidValue("EMBEDDING_PROVIDER".to_string()))?,
                None => EmbeddingProvider::OpenAI,
            },
            embedding_model: get("EMBEDDING_MODEL")
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            embedding_dimension: parse_or(
                &get,
                "EMBEDDING_DIMENSION",
                DEFAULT_EMBEDDING_DIMENSION,
            )?,
            embedding_max_retries: parse_or(
                &get,
                "EMBEDDING_MAX_RETRIES",
                DEFAULT_EMBEDDING_MAX_RETRIES,
            )?,
            openai_api_key: get("OPENAI_API_KEY").filter(|value| !is_placeholder(value)),
            openai_base_url: get("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            ollama_url: get("OLLAMA_URL").unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
            pinecone_api_key: get("PINECONE_API_KEY").filter(|value| !is_placeholder(value)),
            index_name: get("PINECONE_INDEX_NAME")
                .unwrap_or_else(|| DEFAULT_INDEX_NAME.to_string()),
            placement: Placement::parse(
                &get("PINECONE_ENVIRONMENT")
                    .unwrap_or_else(|| DEFAULT_PINECONE_ENVIRONMENT.to_string()),
            ),
            pinecone_controller_url: get("PINECONE_CONTROLLER_URL")
                .unwrap_or_else(|| DEFAULT_CONTROLLER_URL.to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::InvalidValue("INDEX_CHUNK_SIZE".into()));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidValue("INDEX_BATCH_SIZE".into()));
        }
        if self.embedding_dimension == 0 {
            return Err(ConfigError::InvalidValue("EMBEDDING_DIMENSION".into()));
        }
        if self.index_name.trim().is_empty() {
            return Err(ConfigError::MissingVariable("PINECONE_INDEX_NAME".into()));
        }
        Ok(())
    }

    /// Return the remote credentials, failing on the first one that is missing.
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        let pinecone_api_key = self
            .pinecone_api_key
            .clone()
            .ok_or_else(|| ConfigError::MissingCredential("PINECONE_API_KEY".into()))?;
        let openai_api_key = match self.embedding_provider {
            EmbeddingProvider::OpenAI => Some(
                self.openai_api_key
                    .clone()
                    .ok_or_else(|| ConfigError::MissingCredential("OPENAI_API_KEY".into()))?,
            ),
            EmbeddingProvider::Ollama => None,
        };
        Ok(Credentials {
            pinecone_api_key,
            openai_api_key,
        })
    }

    /// Selection predicates derived from this configuration.
    pub fn selection_rules(&self) -> SelectionRules {
        SelectionRules::new(
            self.extensions.iter().cloned(),
            self.ignored_dirs.iter().cloned(),
            self.max_file_bytes,
        )
    }
}

fn parse_or<G, T>(get: &G, key: &str, default: T) -> Result<T, ConfigError>
where
    G: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match get(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

fn parse_list(value: &str) -> BTreeSet<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Lowercase an extension and drop any leading dot.
pub(crate) fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

fn is_placeholder(value: &str) -> bool {
    value.trim().starts_with("YOUR_")
}
