use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::git::{BackendKind, DEFAULT_MAX_TRANSCRIPT_CHARS};

pub const DEFAULT_MODEL: &str = "google/gemini-2.5-flash-lite";
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MAX_TOKENS: i64 = 200;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct LlmConfig {
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub max_tokens: Option<i64>,
}

impl LlmConfig {
    pub fn get_model(&self) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string())
    }

    pub fn get_base_url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    pub fn get_max_tokens(&self) -> i64 {
        self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub debug: Option<bool>,
    pub backend: Option<BackendKind>,
    pub no_color: Option<bool>,
    pub dry_run: Option<bool>,
    pub max_transcript_chars: Option<usize>,
    pub llm: Option<LlmConfig>,
}

impl Config {
    pub fn load() -> color_eyre::eyre::Result<Self> {
        let config_path = Self::get_config_path();

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn get_backend(&self) -> BackendKind {
        self.backend.unwrap_or_default()
    }

    pub fn get_max_transcript_chars(&self) -> usize {
        self.max_transcript_chars
            .unwrap_or(DEFAULT_MAX_TRANSCRIPT_CHARS)
    }

    fn get_config_path() -> PathBuf {
        config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gitsync")
            .join("config.json")
    }

    /// CLI arguments win over values from the config file.
    pub fn merge_with_args(&self, args: &Args) -> Self {
        let llm_config = self.llm.clone().unwrap_or_default();
        Self {
            debug: if args.debug { Some(true) } else { self.debug },
            backend: args.backend.or(self.backend),
            no_color: if args.no_color {
                Some(true)
            } else {
                self.no_color
            },
            dry_run: if args.dry_run {
                Some(true)
            } else {
                self.dry_run
            },
            max_transcript_chars: args.max_transcript_chars.or(self.max_transcript_chars),
            llm: Some(LlmConfig {
                model: args.llm_model.clone().or(llm_config.model),
                api_key: args.llm_api_key.clone().or(llm_config.api_key),
                base_url: args.llm_base_url.clone().or(llm_config.base_url),
                max_tokens: llm_config.max_tokens,
            }),
        }
    }
}

#[derive(Debug, Clone, clap::Parser)]
#[command(about = "Generate a commit message for the working copy and commit it")]
pub struct Args {
    #[arg(short, long, help = "Print version information and exit")]
    pub version: bool,

    #[arg(short, long, help = "Enable debug logging")]
    pub debug: bool,

    #[arg(long, help = "Repository backend to use (git2 or cli)")]
    pub backend: Option<BackendKind>,

    #[arg(short = 'C', long, help = "Run as if started in this directory")]
    pub repo: Option<PathBuf>,

    #[arg(long, help = "Show the generated message without committing")]
    pub dry_run: bool,

    #[arg(long, help = "Disable colored output")]
    pub no_color: bool,

    #[arg(long, help = "Maximum transcript length sent to the model (default: 8000)")]
    pub max_transcript_chars: Option<usize>,

    #[arg(long, help = "Model used to write the commit message")]
    pub llm_model: Option<String>,

    #[arg(long, help = "API key for the LLM provider")]
    pub llm_api_key: Option<String>,

    #[arg(long, help = "Base URL for the LLM provider")]
    pub llm_base_url: Option<String>,
}
