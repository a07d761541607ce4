use anyhow::{anyhow, Context, Result};
use std::env;
use std::path::PathBuf;

use crate::types::LLMProvider;

const MIB: u64 = 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub upload: UploadConfig,
    pub llm: LLMConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Directory staged uploads are written to before extraction
    pub dir: PathBuf,
    pub max_file_size: u64,
}

impl UploadConfig {
    /// Whole megabytes, for user-facing messages
    pub fn max_file_size_mb(&self) -> u64 {
        self.max_file_size / MIB
    }
}

#[derive(Debug, Clone)]
pub struct LLMConfig {
    pub provider: LLMProvider,
    pub model: String,
    pub api_key: String,
    pub base_url: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let provider_name = var("LLM_PROVIDER", "openai");
        let provider = LLMProvider::parse(&provider_name)
            .ok_or_else(|| anyhow!("Unsupported LLM_PROVIDER: {}", provider_name))?;

        let provider_key_var = match provider {
            LLMProvider::OpenAI => "OPENAI_API_KEY",
            LLMProvider::OpenRouter => "OPENROUTER_API_KEY",
            LLMProvider::Groq => "GROQ_API_KEY",
            LLMProvider::GLM => "GLM_API_KEY",
            LLMProvider::Anthropic => "ANTHROPIC_API_KEY",
        };
        let default_model = match provider {
            LLMProvider::Anthropic => "claude-3-5-haiku-latest",
            LLMProvider::GLM => "glm-4.7",
            _ => "gpt-4o-mini",
        };

        let max_file_size_mb: u64 = var("MAX_FILE_SIZE_MB", "10")
            .parse()
            .context("MAX_FILE_SIZE_MB must be a whole number")?;

        Ok(Self {
            server: ServerConfig {
                port: var("PORT", "8000").parse().context("PORT must be a port number")?,
                host: var("HOST", "0.0.0.0"),
                cors_allowed_origins: var("ALLOWED_ORIGINS", "*")
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            },
            upload: UploadConfig {
                dir: lookup("UPLOAD_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| env::temp_dir().join("cag_uploads")),
                max_file_size: max_file_size_mb * MIB,
            },
            llm: LLMConfig {
                provider,
                model: var("LLM_MODEL", default_model),
                api_key: lookup("LLM_API_KEY")
                    .or_else(|| lookup(provider_key_var))
                    .unwrap_or_default(),
                base_url: lookup("LLM_BASE_URL").filter(|s| !s.is_empty()),
                max_tokens: var("LLM_MAX_TOKENS", "1024")
                    .parse()
                    .context("LLM_MAX_TOKENS must be a whole number")?,
                temperature: var("LLM_TEMPERATURE", "0.2")
                    .parse()
                    .context("LLM_TEMPERATURE must be a number")?,
            },
            logging: LoggingConfig {
                dir: lookup("LOG_DIR").filter(|s| !s.is_empty()).map(PathBuf::from),
            },
        })
    }
}
