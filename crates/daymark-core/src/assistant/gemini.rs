//! Google Gemini `generateContent` client.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{Local, NaiveDateTime, TimeDelta};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, warn};
use url::Url;

use super::postprocess::items_from_reply;
use super::ScheduleAssistant;
use crate::error::AssistantError;
use crate::schedule::{Category, ScheduleItem, ScheduleItemData};
use crate::storage::{keys, AssistantConfig, KvStore};

pub struct GeminiAssistant {
    http_client: Client,
    endpoint: Url,
    api_key: String,
}

impl GeminiAssistant {
    /// # Errors
    /// Empty key, bad base URL, or an HTTP client that cannot be built.
    pub fn new(api_key: impl Into<String>, config: &AssistantConfig) -> Result<Self, AssistantError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(AssistantError::MissingCredential);
        }

        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let endpoint = Url::parse(&base)?.join(&format!("models/{}:generateContent", config.model))?;

        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            endpoint,
            api_key,
        })
    }

    /// Build from the API key saved in the kv store.
    ///
    /// # Errors
    /// [`AssistantError::MissingCredential`] when no key is saved.
    pub fn from_store<S: KvStore + ?Sized>(
        store: &S,
        config: &AssistantConfig,
    ) -> Result<Self, AssistantError> {
        let key = store
            .get(keys::ASSISTANT_API_KEY)
            .map_err(|e| {
                warn!(error = %e, "could not read assistant API key");
                AssistantError::MissingCredential
            })?
            .ok_or(AssistantError::MissingCredential)?;
        Self::new(key, config)
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn generate(&self, body: Value) -> Result<String, AssistantError> {
        debug!(endpoint = %self.endpoint, "calling assistant");
        let resp = self
            .http_client
            .post(self.endpoint.clone())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "assistant request rejected");
            return Err(AssistantError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = resp.json().await?;
        reply_text(&payload)
    }
}

/// Concatenated text parts of the first candidate.
fn reply_text(payload: &Value) -> Result<String, AssistantError> {
    let parts = payload["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| AssistantError::Malformed("response has no candidate content".into()))?;
    let text: String = parts
        .iter()
        .filter_map(|p| p["text"].as_str())
        .collect();
    if text.trim().is_empty() {
        return Err(AssistantError::Malformed("response text is empty".into()));
    }
    Ok(text)
}

fn schedule_json(schedule: &[ScheduleItem]) -> String {
    serde_json::to_string(schedule).unwrap_or_else(|_| "[]".to_string())
}

fn item_schema() -> Value {
    let categories: Vec<&str> = Category::ALL.iter().map(Category::as_str).collect();
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "title": { "type": "STRING", "description": "One specific activity, e.g. 'Team stand-up'." },
                "description": { "type": "STRING", "description": "One sentence about the activity." },
                "date": { "type": "STRING", "description": "YYYY-MM-DD" },
                "time": { "type": "STRING", "description": "Start time as HH:mm (24h). Omit for all-day items." },
                "endTime": {
                    "type": "STRING",
                    "nullable": true,
                    "description": "End time as HH:mm (24h). Null unless a range or duration was given."
                },
                "category": { "type": "STRING", "enum": categories }
            },
            "required": ["title", "date", "endTime"]
        }
    })
}

fn parse_instruction(now: NaiveDateTime, schedule: &[ScheduleItem]) -> String {
    let today = now.date();
    let tomorrow = today + TimeDelta::days(1);
    format!(
        "You turn requests into schedule items.\n\
         Today is {today}, the time is {time}, tomorrow is {tomorrow}.\n\
         Split multi-part plans into one item per activity.\n\
         Times are HH:mm in 24-hour format. Omit `time` for all-day items.\n\
         Set `endTime` only when a range or duration is stated, otherwise null.\n\
         Vague times: morning 09:00, afternoon 14:00, evening 19:00.\n\
         When asked to use free time, pick a slot away from existing items.\n\
         Category is one of work, personal, health, fitness, shopping, social, finance, travel, study; default personal.\n\
         Dates are YYYY-MM-DD. Always return a JSON array.\n\
         Current schedule: {schedule}",
        time = now.format("%H:%M"),
        schedule = schedule_json(schedule),
    )
}

fn question_instruction(now: NaiveDateTime) -> String {
    format!(
        "You answer questions about the user's schedule using only the schedule given.\n\
         Today is {today}, the time is {time}.\n\
         Answer in short, friendly plain text. No Markdown, no JSON, no code.",
        today = now.date(),
        time = now.format("%H:%M"),
    )
}

#[async_trait]
impl ScheduleAssistant for GeminiAssistant {
    async fn parse_schedule_from_text(
        &self,
        prompt: &str,
        schedule: &[ScheduleItem],
    ) -> Result<Vec<ScheduleItemData>, AssistantError> {
        let now = Local::now().naive_local();
        let body = json!({
            "systemInstruction": { "parts": [{ "text": parse_instruction(now, schedule) }] },
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": item_schema(),
                "thinkingConfig": { "thinkingBudget": 0 }
            }
        });
        let reply = self.generate(body).await?;
        items_from_reply(&reply)
    }

    async fn answer_schedule_question(
        &self,
        prompt: &str,
        schedule: &[ScheduleItem],
    ) -> Result<String, AssistantError> {
        let now = Local::now().naive_local();
        let question = format!(
            "Based on the following schedule, please answer my question.\n\n\
             My schedule:\n{}\n\nMy question: \"{prompt}\"",
            schedule_json(schedule),
        );
        let body = json!({
            "systemInstruction": { "parts": [{ "text": question_instruction(now) }] },
            "contents": [{ "role": "user", "parts": [{ "text": question }] }],
            "generationConfig": { "thinkingConfig": { "thinkingBudget": 0 } }
        });
        let reply = self.generate(body).await?;
        Ok(reply.trim().to_string())
    }
}
