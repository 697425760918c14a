//! OpenAI-compatible chat completions. The same client talks to the
//! extraction model (Groq) and the prompt model (OpenAI); only the endpoint,
//! key and service label differ.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::json;

use crate::config::ModelSettings;
use crate::error::PipelineError;
use crate::logw;

const RAW_SNIPPET_CHARS: usize = 800;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub settings: ModelSettings,
    pub messages: Vec<ChatMessage>,
    /// Ask the provider for a JSON object reply.
    pub json_output: bool,
    /// End-user tag forwarded to the provider.
    pub user: Option<String>,
}

impl ChatRequest {
    pub fn new(settings: ModelSettings, system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            settings,
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
            json_output: false,
            user: None,
        }
    }

    pub fn json_output(mut self) -> Self {
        self.json_output = true;
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    fn body(&self) -> serde_json::Value {
        let mut body = json!({
            "model": self.settings.model,
            "temperature": self.settings.temperature,
            "messages": self.messages,
        });
        if self.json_output {
            body["response_format"] = json!({"type": "json_object"});
        }
        if let Some(user) = &self.user {
            body["user"] = json!(user);
        }
        body
    }
}

/// One chat completion round trip; returns the assistant message content.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<String, PipelineError>;
}

#[derive(Debug, Clone)]
pub struct ChatClient {
    client: Client,
    endpoint: String,
    api_key: String,
    service: &'static str,
}

impl ChatClient {
    pub fn new(
        client: Client,
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        service: &'static str,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            service,
        }
    }
}

#[async_trait]
impl ChatModel for ChatClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String, PipelineError> {
        tracing::debug!(
            service = self.service,
            model = %request.settings.model,
            "chat completion request"
        );

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request.body())
            .send()
            .await?;

        let status = resp.status();
        let raw = resp.text().await?;

        if !status.is_success() {
            logw(format!("{} HTTP {}", self.service, status.as_u16()));
            log_error_object(self.service, &raw);
            if !raw.is_empty() {
                logw(format!("{} raw body: {}", self.service, snippet(&raw)));
            }
            return Err(PipelineError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.endpoint.clone(),
            });
        }

        extract_message_content(self.service, &raw)
    }
}

fn snippet(raw: &str) -> String {
    raw.chars().take(RAW_SNIPPET_CHARS).collect()
}

fn log_error_object(service: &str, raw: &str) {
    let Ok(root) = serde_json::from_str::<serde_json::Value>(raw) else {
        return;
    };
    let Some(err) = root.get("error") else {
        return;
    };
    if let Some(msg) = err.get("message").and_then(|v| v.as_str()) {
        logw(format!("{} error message: {}", service, msg));
    }
    if let Some(typ) = err.get("type").and_then(|v| v.as_str()) {
        logw(format!("{} error type: {}", service, typ));
    }
    if let Some(code) = err.get("code").and_then(|v| v.as_str()) {
        logw(format!("{} error code: {}", service, code));
    }
}

/// Pulls `choices[0].message.content` out of a chat completion body. A null
/// content yields an empty string; an `error` object is surfaced as-is.
pub fn extract_message_content(service: &str, raw: &str) -> Result<String, PipelineError> {
    let root: serde_json::Value =
        serde_json::from_str(raw).map_err(|source| PipelineError::Decode {
            context: format!("{service} chat completion"),
            source,
        })?;

    if let Some(err) = root.get("error") {
        log_error_object(service, raw);
        let message = err
            .get("message")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown error")
            .to_string();
        return Err(PipelineError::Provider {
            service: service.to_string(),
            message,
        });
    }

    let message = root
        .get("choices")
        .and_then(|v| v.as_array())
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .ok_or_else(|| {
            logw(format!("{} raw body: {}", service, snippet(raw)));
            PipelineError::Provider {
                service: service.to_string(),
                message: "response carried no choices".to_string(),
            }
        })?;

    Ok(message
        .get("content")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> ModelSettings {
        ModelSettings {
            model: "gpt-4-0125-preview".into(),
            temperature: 0.9,
        }
    }

    #[test]
    fn body_carries_model_and_messages() {
        let body = ChatRequest::new(settings(), "sys", "hello").body();
        assert_eq!(body["model"], "gpt-4-0125-preview");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hello");
        assert!(body.get("response_format").is_none());
        assert!(body.get("user").is_none());
    }

    #[test]
    fn json_output_and_user_are_opt_in() {
        let body = ChatRequest::new(settings(), "sys", "hello")
            .json_output()
            .with_user("business_Hamilton's")
            .body();
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["user"], "business_Hamilton's");
    }

    #[test]
    fn content_is_read_from_first_choice() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"a golden hour pour"}}]}"#;
        assert_eq!(
            extract_message_content("openai", raw).expect("content"),
            "a golden hour pour"
        );
    }

    #[test]
    fn null_content_reads_as_empty() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#;
        assert_eq!(extract_message_content("groq", raw).expect("content"), "");
    }

    #[test]
    fn error_object_becomes_provider_error() {
        let raw = r#"{"error":{"message":"model overloaded","type":"server_error"}}"#;
        match extract_message_content("openai", raw) {
            Err(PipelineError::Provider { service, message }) => {
                assert_eq!(service, "openai");
                assert_eq!(message, "model overloaded");
            }
            other => panic!("expected provider error, got {other:?}"),
        }
    }

    #[test]
    fn missing_choices_is_an_error() {
        assert!(matches!(
            extract_message_content("openai", r#"{"choices":[]}"#),
            Err(PipelineError::Provider { .. })
        ));
        assert!(matches!(
            extract_message_content("openai", "not json"),
            Err(PipelineError::Decode { .. })
        ));
    }
}
