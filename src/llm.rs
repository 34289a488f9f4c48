use crate::config::LlmConfig;
use crate::git::CanonicalChange;

use log::debug;
use openai_api_rs::v1::api::OpenAIClient;
use openai_api_rs::v1::chat_completion::{self, ChatCompletionMessage, ChatCompletionRequest};
use std::env;
use std::time::Duration;

const API_KEY_VARS: [&str; 2] = ["OPENROUTER_API_KEY", "OPENAI_API_KEY"];

#[derive(Debug, Clone)]
pub struct CommitMessage {
    pub content: String,
    pub execution_time: Duration,
}

impl CommitMessage {
    /// Status line shown once the message is ready.
    pub fn status_line(&self) -> String {
        format!(
            "Commit message generated in {:.1}s",
            self.execution_time.as_secs_f64()
        )
    }
}

pub struct LlmClient {
    client: OpenAIClient,
    config: LlmConfig,
}

impl std::fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmClient")
            .field("model", &self.config.get_model())
            .field("base_url", &self.config.get_base_url())
            .finish()
    }
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> Result<Self, String> {
        let api_key = resolve_api_key(&config).ok_or_else(|| {
            "OPENROUTER_API_KEY environment variable not set. Set it, or provide an API key in the config file."
                .to_string()
        })?;

        let client = OpenAIClient::builder()
            .with_api_key(api_key)
            .with_endpoint(config.get_base_url())
            .build()
            .map_err(|e| e.to_string())?;

        Ok(Self { client, config })
    }

    /// Ask the model for a commit message describing `transcript`.
    pub async fn generate_commit_message(
        &mut self,
        transcript: &str,
        change_summary: &str,
    ) -> Result<CommitMessage, String> {
        let start_time = tokio::time::Instant::now();

        let messages = vec![ChatCompletionMessage {
            role: chat_completion::MessageRole::user,
            content: chat_completion::Content::Text(build_prompt(transcript, change_summary)),
            name: None,
            tool_calls: None,
            tool_call_id: None,
        }];

        let content = self.make_llm_request(messages).await?;
        let execution_time = start_time.elapsed();
        debug!("Commit message generated in {execution_time:?}");

        Ok(CommitMessage {
            content: content.trim().to_string(),
            execution_time,
        })
    }

    async fn make_llm_request(&mut self, messages: Vec<ChatCompletionMessage>) -> Result<String, String> {
        let req = ChatCompletionRequest::new(self.config.get_model(), messages)
            .max_tokens(self.config.get_max_tokens());

        match self.client.chat_completion(req).await {
            Ok(response) => {
                if let Some(choice) = response.choices.first() {
                    let content = choice.message.content.clone().unwrap_or_default();
                    Ok(content)
                } else {
                    Err("No response from LLM".to_string())
                }
            }
            Err(e) => Err(format!("LLM request failed: {e}")),
        }
    }
}

fn resolve_api_key(config: &LlmConfig) -> Option<String> {
    config.api_key.clone().or_else(|| {
        API_KEY_VARS
            .iter()
            .find_map(|var| env::var(var).ok().filter(|key| !key.is_empty()))
    })
}

/// One line per change, in display order.
pub fn summarize_changes(changes: &[CanonicalChange]) -> String {
    changes
        .iter()
        .map(CanonicalChange::summary_line)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn build_prompt(transcript: &str, change_summary: &str) -> String {
    format!(
        "Generate a concise git commit message for the following changes.
Follow conventional commit format (e.g., feat:, fix:, docs:, refactor:, etc.).
Keep the first line under 72 characters. Add a brief body if needed.
Only output the commit message, nothing else.

Changed files:
{change_summary}

Changes:
{transcript}"
    )
}
