//! Chat completion client
//!
//! Sends the system instruction and the assembled prompt to an
//! OpenAI-compatible `/chat/completions` endpoint and returns the text of the
//! first choice.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompletionError {
  #[error("request to the completion provider failed: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("completion provider returned {status}: {message}")]
  Provider { status: u16, message: String },

  #[error("unexpected completion response: {0}")]
  Malformed(String),
}

/// Generates text for a system instruction and a user prompt
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionClient: Send + Sync {
  async fn complete(&self, system: &str, prompt: &str) -> Result<String, CompletionError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
  model: &'a str,
  messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
  role: &'a str,
  content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
  #[serde(default)]
  choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
  message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
  content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
  error: ProviderErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorDetail {
  message: String,
}

/// OpenAI chat completions over HTTPS
pub struct OpenAiClient {
  client: Client,
  api_key: String,
  base_url: String,
  model: String,
}

impl OpenAiClient {
  pub fn new(
    api_key: impl Into<String>,
    base_url: impl Into<String>,
    model: impl Into<String>,
  ) -> Self {
    Self {
      client: Client::new(),
      api_key: api_key.into(),
      base_url: base_url.into().trim_end_matches('/').to_string(),
      model: model.into(),
    }
  }

  pub fn model(&self) -> &str {
    &self.model
  }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
  async fn complete(&self, system: &str, prompt: &str) -> Result<String, CompletionError> {
    let request = ChatRequest {
      model: &self.model,
      messages: [
        ChatMessage { role: "system", content: system },
        ChatMessage { role: "user", content: prompt },
      ],
    };

    let url = format!("{}/chat/completions", self.base_url);
    tracing::debug!(model = %self.model, prompt_len = prompt.len(), "Requesting completion");

    let response = self.client.post(&url).bearer_auth(&self.api_key).json(&request).send().await?;

    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
      return Err(CompletionError::Provider {
        status: status.as_u16(),
        message: provider_message(&body),
      });
    }

    let parsed: ChatResponse =
      serde_json::from_str(&body).map_err(|e| CompletionError::Malformed(e.to_string()))?;

    parsed
      .choices
      .into_iter()
      .next()
      .ok_or_else(|| CompletionError::Malformed("response contained no choices".to_string()))?
      .message
      .content
      .ok_or_else(|| CompletionError::Malformed("first choice has no content".to_string()))
  }
}

/// The provider's `error.message`, or the raw body when it has none
fn provider_message(body: &str) -> String {
  match serde_json::from_str::<ProviderErrorBody>(body) {
    Ok(parsed) => parsed.error.message,
    Err(_) if body.trim().is_empty() => "empty response body".to_string(),
    Err(_) => body.trim().to_string(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use mockito::{Matcher, Server};

  fn client_for(server: &Server) -> OpenAiClient {
    OpenAiClient::new("sk-test", server.url(), "gpt-3.5-turbo")
  }

  #[tokio::test]
  async fn test_complete_returns_first_choice() {
    let mut server = Server::new_async().await;
    let mock = server
      .mock("POST", "/chat/completions")
      .match_header("authorization", "Bearer sk-test")
      .match_body(Matcher::PartialJson(serde_json::json!({
        "model": "gpt-3.5-turbo",
        "messages": [
          {"role": "system", "content": "sistema"},
          {"role": "user", "content": "Clase sobre animales"}
        ]
      })))
      .with_status(200)
      .with_header("content-type", "application/json")
      .with_body(r#"{"choices": [{"message": {"role": "assistant", "content": "Lesson plan"}}]}"#)
      .create_async()
      .await;

    let text = client_for(&server).complete("sistema", "Clase sobre animales").await.unwrap();

    assert_eq!(text, "Lesson plan");
    mock.assert_async().await;
  }

  #[tokio::test]
  async fn test_provider_error_message_is_surfaced() {
    let mut server = Server::new_async().await;
    let _mock = server
      .mock("POST", "/chat/completions")
      .with_status(401)
      .with_header("content-type", "application/json")
      .with_body(
        r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#,
      )
      .create_async()
      .await;

    let err = client_for(&server).complete("s", "p").await.unwrap_err();

    match err {
      CompletionError::Provider { status, message } => {
        assert_eq!(status, 401);
        assert_eq!(message, "Incorrect API key provided");
      }
      other => panic!("expected provider error, got {other:?}"),
    }
  }

  #[tokio::test]
  async fn test_non_json_error_body_kept_raw() {
    let mut server = Server::new_async().await;
    let _mock = server
      .mock("POST", "/chat/completions")
      .with_status(503)
      .with_body("upstream unavailable")
      .create_async()
      .await;

    let err = client_for(&server).complete("s", "p").await.unwrap_err();
    assert!(err.to_string().contains("503"));
    assert!(err.to_string().contains("upstream unavailable"));
  }

  #[tokio::test]
  async fn test_malformed_body() {
    let mut server = Server::new_async().await;
    let _mock = server
      .mock("POST", "/chat/completions")
      .with_status(200)
      .with_body("not json")
      .create_async()
      .await;

    let err = client_for(&server).complete("s", "p").await.unwrap_err();
    assert!(matches!(err, CompletionError::Malformed(_)));
  }

  #[tokio::test]
  async fn test_no_choices_is_malformed() {
    let mut server = Server::new_async().await;
    let _mock = server
      .mock("POST", "/chat/completions")
      .with_status(200)
      .with_body(r#"{"choices": []}"#)
      .create_async()
      .await;

    let err = client_for(&server).complete("s", "p").await.unwrap_err();
    assert!(matches!(err, CompletionError::Malformed(_)));
  }

  #[tokio::test]
  async fn test_unreachable_provider_is_transport_error() {
    let client = OpenAiClient::new("sk-test", "http://127.0.0.1:1", "gpt-3.5-turbo");
    let err = client.complete("s", "p").await.unwrap_err();
    assert!(matches!(err, CompletionError::Transport(_)));
  }

  #[test]
  fn test_base_url_trailing_slash_trimmed() {
    let client = OpenAiClient::new("k", "https://api.example.com/v1/", "m");
    assert_eq!(client.base_url, "https://api.example.com/v1");
    assert_eq!(client.model(), "m");
  }
}
