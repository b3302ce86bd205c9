//! Questions about the dataset, answered by a hosted language model
//!
//! Sends the full resident collection plus a free-text question to the
//! Anthropic Messages API and hands back whatever text comes out. The answer
//! is opaque: nothing here checks it against the data.

use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::population::Resident;

/// Environment variables checked for the API key, in order.
pub const API_KEY_VARS: [&str; 2] = ["ANTHROPIC_API_KEY", "REACT_APP_ANTHROPIC_API_KEY"];

/// Configuration for the question service
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AskConfig {
    /// Base URL of the API (e.g., "https://api.anthropic.com")
    pub base_url: String,
    pub model: String,
    /// Maximum tokens in the answer
    pub max_tokens: u32,
    /// Value of the `anthropic-version` header
    pub api_version: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Never written to or read from config files; see [`AskConfig::with_env_key`].
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for AskConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.anthropic.com".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 1000,
            api_version: "2023-06-01".to_string(),
            timeout_secs: 120,
            api_key: None,
        }
    }
}

impl AskConfig {
    /// Fill `api_key` from the first non-blank variable in [`API_KEY_VARS`].
    pub fn with_env_key(mut self) -> Self {
        self.api_key = API_KEY_VARS
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|key| !key.trim().is_empty());
        self
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: String,
    pub content: String,
}

#[derive(Serialize, Debug)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Deserialize, Debug)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize, Debug)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Errors that can occur while asking a question
#[derive(Debug, Error)]
pub enum AskError {
    #[error("question is empty")]
    BlankQuestion,

    #[error("no API key set (expected {var})", var = API_KEY_VARS[0])]
    MissingApiKey,

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error: status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("failed to serialize residents: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("empty response from model")]
    EmptyResponse,
}

/// The analyst prompt: dataset first, then the question.
pub fn build_prompt(residents: &[Resident], question: &str) -> Result<String, AskError> {
    let resident_data = serde_json::to_string_pretty(residents)?;

    Ok(format!(
        r#"You are analyzing synthetic demographic data for Toronto Beaches residents (FSAs M4E and M4L).

Here is the complete resident dataset:
{}

User question: {}

Provide a clear, concise answer based on the data. Include specific numbers and insights. Format your response in a natural, conversational way."#,
        resident_data,
        question.trim()
    ))
}

/// Join the text blocks of a Messages API response body.
fn parse_answer(body: &str) -> Result<String, AskError> {
    let response: MessagesResponse =
        serde_json::from_str(body).map_err(|e| AskError::Parse(e.to_string()))?;

    let answer = response
        .content
        .into_iter()
        .filter(|block| block.kind == "text")
        .filter_map(|block| block.text)
        .collect::<Vec<_>>()
        .join("\n");

    if answer.trim().is_empty() {
        Err(AskError::EmptyResponse)
    } else {
        Ok(answer)
    }
}

/// What the user sees in place of an answer when a question fails.
pub fn fallback_message(error: &AskError) -> String {
    format!(
        "Error: {}\n\nNote: To enable AI-powered queries, set your Anthropic API key in {}. \
         The synthetic data is available for manual exploration in the dashboard.",
        error, API_KEY_VARS[0]
    )
}

/// Blocking client for the question service
#[derive(Clone)]
pub struct AskClient {
    config: AskConfig,
    client: reqwest::blocking::Client,
}

impl AskClient {
    pub fn new(config: AskConfig) -> Result<Self, AskError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    /// Ask one question about `residents`. Blocks until the service answers.
    pub fn ask(&self, residents: &[Resident], question: &str) -> Result<String, AskError> {
        if question.trim().is_empty() {
            return Err(AskError::BlankQuestion);
        }
        let api_key = self.config.api_key.as_deref().ok_or(AskError::MissingApiKey)?;

        let request = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            messages: vec![Message {
                role: "user".to_string(),
                content: build_prompt(residents, question)?,
            }],
        };

        let url = format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'));
        tracing::info!(%url, residents = residents.len(), "sending question");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", self.config.api_version.as_str())
            .json(&request)
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "question service returned an error");
            return Err(AskError::Api {
                status: status.as_u16(),
                body,
            });
        }

        parse_answer(&body)
    }

    /// Run [`AskClient::ask`] on a worker thread. The receiver yields exactly
    /// one result; the caller polls it without blocking.
    pub fn spawn_question(
        &self,
        residents: Arc<[Resident]>,
        question: String,
    ) -> Receiver<Result<String, AskError>> {
        let (tx, rx) = mpsc::channel();
        let client = self.clone();

        thread::spawn(move || {
            let result = client.ask(&residents, &question);
            if let Err(e) = &result {
                tracing::warn!(error = %e, "question failed");
            }
            // The dashboard may have quit already; nobody is left to tell.
            let _ = tx.send(result);
        });

        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::population::{generate, Vocabulary};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn residents(count: usize) -> Vec<Resident> {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        generate(count, &Vocabulary::default(), &mut rng)
    }

    fn keyless_client() -> AskClient {
        let config = AskConfig {
            api_key: None,
            ..Default::default()
        };
        AskClient::new(config).unwrap()
    }

    #[test]
    fn test_prompt_carries_dataset_and_question() {
        let residents = residents(5);
        let prompt = build_prompt(&residents, "  How many people have children?  ").unwrap();

        assert!(prompt.contains("User question: How many people have children?\n"));
        assert!(prompt.contains("FSAs M4E and M4L"));
        for resident in &residents {
            assert!(prompt.contains(&format!("\"firstName\": \"{}\"", resident.first_name)));
            assert!(prompt.contains(&resident.address));
        }
    }

    #[test]
    fn test_request_shape() {
        let request = MessagesRequest {
            model: "some-model",
            max_tokens: 1000,
            messages: vec![Message {
                role: "user".to_string(),
                content: "hi".to_string(),
            }],
        };
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "some-model");
        assert_eq!(json["max_tokens"], 1000);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hi");
    }

    #[test]
    fn test_answer_joins_text_blocks() {
        let body = r#"{
            "id": "msg_1",
            "content": [
                {"type": "text", "text": "About 40% have children."},
                {"type": "tool_use", "id": "t1", "name": "x", "input": {}},
                {"type": "text", "text": "Most live in M4E."}
            ]
        }"#;

        assert_eq!(
            parse_answer(body).unwrap(),
            "About 40% have children.\nMost live in M4E."
        );
    }

    #[test]
    fn test_answer_without_text_is_empty() {
        assert!(matches!(
            parse_answer(r#"{"content": []}"#),
            Err(AskError::EmptyResponse)
        ));
        assert!(matches!(parse_answer("not json"), Err(AskError::Parse(_))));
    }

    #[test]
    fn test_blank_question_never_sends() {
        let client = keyless_client();
        assert!(matches!(
            client.ask(&residents(3), "   "),
            Err(AskError::BlankQuestion)
        ));
    }

    #[test]
    fn test_missing_key_never_sends() {
        let client = keyless_client();
        assert!(matches!(
            client.ask(&residents(3), "What is the average age?"),
            Err(AskError::MissingApiKey)
        ));
    }

    #[test]
    fn test_background_question_reports_back() {
        let client = keyless_client();
        let rx = client.spawn_question(residents(3).into(), "Who cycles?".to_string());
        let result = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(matches!(result, Err(AskError::MissingApiKey)));
    }

    #[test]
    fn test_fallback_mentions_key_variable() {
        let message = fallback_message(&AskError::MissingApiKey);
        assert!(message.starts_with("Error: no API key set"));
        assert!(message.contains("ANTHROPIC_API_KEY"));
    }

    #[test]
    fn test_config_never_serializes_key() {
        let config = AskConfig {
            api_key: Some("secret".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));

        let parsed: AskConfig = serde_json::from_str(r#"{"max_tokens": 200}"#).unwrap();
        assert_eq!(parsed.max_tokens, 200);
        assert_eq!(parsed.model, "claude-sonnet-4-20250514");
        assert!(parsed.api_key.is_none());
    }
}
