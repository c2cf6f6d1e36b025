//! Structured field extraction backed by a chat-completion language model.
//!
//! The model is asked to turn a free-text task into a fixed JSON object. Its
//! answer is trusted only as far as it parses: any transport problem, non-2xx
//! status or off-schema body is reported as an [`ExtractionError`] and the
//! caller decides what to fall back to.

use crate::error::ExtractionError;
use crate::models::Category;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Fields returned by the extraction service, verbatim.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExtractedTask {
    pub content: String,
    /// Absolute timestamp as text; validated by the caller
    #[serde(default)]
    pub due_date: Option<String>,
    pub category: Category,
    pub priority: i64,
    #[serde(default)]
    pub estimated_duration: Option<u32>,
    #[serde(default)]
    pub date_analysis: Option<String>,
    #[serde(default)]
    pub category_analysis: Option<String>,
    #[serde(default)]
    pub priority_analysis: Option<String>,
}

#[async_trait]
pub trait ExtractionService: Send + Sync {
    /// Extract structured fields from `raw_text`, reasoning about dates
    /// relative to `now`.
    async fn extract(
        &self,
        raw_text: &str,
        now: DateTime<FixedOffset>,
    ) -> Result<ExtractedTask, ExtractionError>;
}

/// Connection settings for an OpenAI-compatible chat completion endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Bearer token; extraction is disabled when absent
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Whole-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Sent as `HTTP-Referer`, which OpenRouter uses for app attribution
    #[serde(default = "default_referer")]
    pub referer: String,
}

fn default_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_model() -> String {
    "mistralai/mistral-7b-instruct".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_referer() -> String {
    "http://localhost:5000".to_string()
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            referer: default_referer(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Extraction through the OpenRouter chat completions API
pub struct OpenRouterExtractor {
    config: ExtractionConfig,
    http: reqwest::Client,
}

impl OpenRouterExtractor {
    pub fn new(config: ExtractionConfig) -> Result<Self, ExtractionError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(ExtractionError::Transport)?;
        Ok(Self { config, http })
    }
}

#[async_trait]
impl ExtractionService for OpenRouterExtractor {
    async fn extract(
        &self,
        raw_text: &str,
        now: DateTime<FixedOffset>,
    ) -> Result<ExtractedTask, ExtractionError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ExtractionError::NotConfigured("no API key set".to_string()))?;

        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: build_prompt(raw_text, now),
                },
            ],
            temperature: self.config.temperature,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .header("HTTP-Referer", &self.config.referer)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ExtractionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        debug!("Raw extraction response: {}", body);
        parse_completion(&body)
    }
}

/// Pull the extracted task out of a chat completion response body.
pub fn parse_completion(body: &str) -> Result<ExtractedTask, ExtractionError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| ExtractionError::MalformedResponse(format!("completion envelope: {}", e)))?;

    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| ExtractionError::MalformedResponse("no message content".to_string()))?;

    let json_str = extract_json(&content);
    serde_json::from_str(json_str).map_err(|e| {
        ExtractionError::MalformedResponse(format!("{}: {}", e, json_str))
    })
}

/// Extract JSON from a reply that may be wrapped in a markdown code block
fn extract_json(reply: &str) -> &str {
    let trimmed = reply.trim();

    if let Some(start) = trimmed.find("```") {
        let after_start = &trimmed[start + 3..];
        let json_start = if after_start.starts_with("json") {
            after_start.find('\n').map(|i| i + 1).unwrap_or(after_start.len())
        } else if after_start.starts_with('\n') {
            1
        } else {
            0
        };
        let content = &after_start[json_start..];
        if let Some(end) = content.find("```") {
            return content[..end].trim();
        }
    }

    trimmed
}

fn build_prompt(raw_text: &str, now: DateTime<FixedOffset>) -> String {
    format!(
        r#"Parse the following task and extract structured information.
Task: "{raw_text}"
Current date and time: {now} ({weekday})

Return a JSON object with exactly these fields:
- content: the main task description, without any date or time wording
- due_date: the absolute due date and time in ISO 8601 format (YYYY-MM-DDTHH:MM:SS), resolved relative to the current date and time, or null if the task has no due date. Never return a duration.
- category: one of [{categories}]
- priority: 1 (low) to 3 (high) based on urgency
- estimated_duration: estimated minutes to complete, as an integer, or null
- date_analysis: one sentence explaining how the due date was derived
- category_analysis: one sentence explaining the category
- priority_analysis: one sentence explaining the priority

Only return the JSON, no other text."#,
        now = now.to_rfc3339(),
        weekday = now.format("%A"),
        categories = Category::KNOWN.join(", "),
    )
}

const SYSTEM_PROMPT: &str = "You are a task parsing assistant. You extract structured data from natural language task descriptions and reply with JSON only.";

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn completion(content: &str) -> String {
        serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        })
        .to_string()
    }

    #[test]
    fn test_extract_json_plain() {
        let input = r#"{"content": "buy milk"}"#;
        assert_eq!(extract_json(input), input);
    }

    #[test]
    fn test_extract_json_code_block() {
        let input = "```json\n{\"content\": \"buy milk\"}\n```";
        assert_eq!(extract_json(input), r#"{"content": "buy milk"}"#);
    }

    #[test]
    fn test_extract_json_code_block_no_label() {
        let input = "Here you go:\n```\n{\"content\": \"buy milk\"}\n```";
        assert_eq!(extract_json(input), r#"{"content": "buy milk"}"#);
    }

    #[test]
    fn test_parse_completion_full_schema() {
        let body = completion(
            r#"{"content": "Dentist appointment", "due_date": "2024-03-02T09:00:00",
                "category": "Health", "priority": 2, "estimated_duration": 60,
                "date_analysis": "tomorrow at 9am"}"#,
        );
        let task = parse_completion(&body).unwrap();
        assert_eq!(task.content, "Dentist appointment");
        assert_eq!(task.due_date.as_deref(), Some("2024-03-02T09:00:00"));
        assert_eq!(task.category, Category::Health);
        assert_eq!(task.priority, 2);
        assert_eq!(task.estimated_duration, Some(60));
        assert_eq!(task.date_analysis.as_deref(), Some("tomorrow at 9am"));
        assert_eq!(task.priority_analysis, None);
    }

    #[test]
    fn test_parse_completion_passes_values_through() {
        let body = completion(
            r#"{"content": "Plan offsite", "due_date": null, "category": "Work", "priority": 7}"#,
        );
        let task = parse_completion(&body).unwrap();
        assert_eq!(task.category, Category::Unrecognized("Work".to_string()));
        assert_eq!(task.priority, 7);
        assert_eq!(task.due_date, None);
        assert_eq!(task.estimated_duration, None);
    }

    #[test]
    fn test_parse_completion_rejects_off_schema_reply() {
        let missing_priority = completion(r#"{"content": "x", "category": "Health"}"#);
        assert!(matches!(
            parse_completion(&missing_priority),
            Err(ExtractionError::MalformedResponse(_))
        ));

        let prose = completion("Sure! The task is to buy milk.");
        assert!(matches!(
            parse_completion(&prose),
            Err(ExtractionError::MalformedResponse(_))
        ));

        assert!(matches!(
            parse_completion("not json at all"),
            Err(ExtractionError::MalformedResponse(_))
        ));

        assert!(matches!(
            parse_completion(r#"{"choices": []}"#),
            Err(ExtractionError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_prompt_carries_text_and_reference_instant() {
        let now = FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 1, 10, 30, 0)
            .unwrap();
        let prompt = build_prompt("call mom tomorrow", now);
        assert!(prompt.contains("call mom tomorrow"));
        assert!(prompt.contains("2024-03-01T10:30:00+01:00"));
        assert!(prompt.contains("Friday"));
        assert!(prompt.contains("Business, Shopping, Health, Personal, Other"));
    }

    #[tokio::test]
    async fn test_missing_api_key_is_not_configured() {
        let extractor = OpenRouterExtractor::new(ExtractionConfig::default()).unwrap();
        let now = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 1, 10, 30, 0)
            .unwrap();
        let result = extractor.extract("buy milk", now).await;
        assert!(matches!(result, Err(ExtractionError::NotConfigured(_))));
    }
}
