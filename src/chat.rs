use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::config::ChatConfig;
use crate::error::ChartError;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// One user's running conversation, seeded with the astrologer persona and
/// the chart context. Sessions are independent values; nothing is shared
/// between them.
#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    /// Starts a session whose system message combines the persona with a
    /// textual summary of the chart under discussion.
    pub fn with_persona(persona: &str, chart_summary: &str) -> Self {
        ChatSession {
            messages: vec![ChatMessage {
                role: ChatRole::System,
                content: format!("{persona}\n\nThe user's natal chart:\n{chart_summary}"),
            }],
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage {
            role: ChatRole::User,
            content: content.into(),
        });
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage {
            role: ChatRole::Assistant,
            content: content.into(),
        });
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: String,
}

/// Blocking client for an OpenAI-compatible chat completions endpoint.
pub struct ChatClient {
    client: Client,
    config: ChatConfig,
}

impl ChatClient {
    pub fn new(config: ChatConfig) -> Result<Self, ChartError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(ChatClient { client, config })
    }

    /// Sends the user's message in the context of the session and records
    /// both it and the reply in the session history. The session is only
    /// mutated on success, so a failed call can simply be retried.
    pub fn complete(
        &self,
        session: &mut ChatSession,
        user_input: &str,
    ) -> Result<String, ChartError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| ChartError::Chat("no API key configured".to_string()))?;

        let mut messages = session.messages().to_vec();
        messages.push(ChatMessage {
            role: ChatRole::User,
            content: user_input.to_string(),
        });
        let request = CompletionRequest {
            model: &self.config.model,
            messages: &messages,
        };

        let response: CompletionResponse = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .json(&request)
            .send()?
            .error_for_status()?
            .json()?;

        let reply = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| ChartError::Chat("empty completion response".to_string()))?;

        session.push_user(user_input);
        session.push_assistant(reply.clone());
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_keeps_turn_order() {
        let mut session = ChatSession::with_persona("persona", "Sun in Capricorn");
        session.push_user("what does my sun sign mean?");
        session.push_assistant("warmth and ambition");
        session.push_user("and my moon?");

        let roles: Vec<ChatRole> = session.messages().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                ChatRole::System,
                ChatRole::User,
                ChatRole::Assistant,
                ChatRole::User
            ]
        );
        assert!(session.messages()[0].content.contains("Sun in Capricorn"));
    }

    #[test]
    fn roles_serialize_lowercase() {
        let message = ChatMessage {
            role: ChatRole::Assistant,
            content: "hi".into(),
        };
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["role"], "assistant");
    }

    #[test]
    fn request_has_expected_shape() {
        let session = ChatSession::with_persona("p", "c");
        let request = CompletionRequest {
            model: "openai/gpt-4o-mini",
            messages: session.messages(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "openai/gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "system");
    }

    #[test]
    fn missing_api_key_is_rejected_before_any_request() {
        let client = ChatClient::new(ChatConfig::default()).unwrap();
        let mut session = ChatSession::with_persona("p", "c");
        let err = client.complete(&mut session, "hello").unwrap_err();
        assert!(matches!(err, ChartError::Chat(_)));
        // the failed turn must not pollute the history
        assert_eq!(session.messages().len(), 1);
    }

    #[test]
    fn transport_failure_leaves_history_untouched() {
        // Unroutable endpoint; the refused connection must not leave the
        // user turn stranded in the session.
        let config = ChatConfig {
            api_url: "http://127.0.0.1:1/v1/chat/completions".into(),
            api_key: Some("test-key".into()),
            ..ChatConfig::default()
        };
        let client = ChatClient::new(config).unwrap();
        let mut session = ChatSession::with_persona("p", "c");
        let err = client.complete(&mut session, "hello").unwrap_err();
        assert!(matches!(err, ChartError::Network(_)));
        assert_eq!(session.messages().len(), 1);
    }

    #[test]
    fn completion_response_parses() {
        let body = r#"{
            "choices": [
                {"message": {"role": "assistant", "content": "Your Sun is in Capricorn."}}
            ]
        }"#;
        let response: CompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            response.choices[0].message.content,
            "Your Sun is in Capricorn."
        );
    }
}
