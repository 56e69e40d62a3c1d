//! OpenAI-compatible streaming adapter — works with OpenAI, Azure
//! OpenAI, Ollama, vLLM, and any endpoint that follows the OpenAI chat
//! completions contract (spec §4.6).

use std::time::Duration;

use chat_domain::config::GenerativeConfig;
use chat_domain::{BoxStream, Error, Result, StreamEvent, TurnRecord, TurnRole};
use serde_json::{json, Value};

use crate::sse::sse_response_stream;
use crate::traits::GenerativeClient;
use crate::util::from_reqwest;

pub struct OpenAiCompatClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    temperature: f64,
    max_tokens: u32,
}

impl OpenAiCompatClient {
    pub fn new(cfg: &GenerativeConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        let api_key = std::env::var(&cfg.api_key_env).ok();

        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_owned(),
            api_key,
            model: cfg.model.clone(),
            temperature: cfg.temperature,
            max_tokens: cfg.max_tokens,
        })
    }

    fn build_body(&self, messages: Vec<Value>) -> Value {
        json!({
            "model": self.model,
            "messages": messages,
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
            "stream": true,
        })
    }
}

fn role_str(role: TurnRole) -> &'static str {
    match role {
        TurnRole::User => "user",
        TurnRole::Assistant => "assistant",
    }
}

/// Builds the wire message list: system prompt, prior transcript, the
/// context block folded into a synthetic system message (so the model
/// sees it as instruction, not as something the user said), then the
/// current utterance.
fn build_messages(
    system_prompt: &str,
    transcript: &[TurnRecord],
    context_block: &str,
    user_utterance: &str,
) -> Vec<Value> {
    let mut messages = vec![json!({"role": "system", "content": system_prompt})];

    for turn in transcript {
        messages.push(json!({"role": role_str(turn.role), "content": turn.content}));
    }

    if !context_block.is_empty() {
        messages.push(json!({"role": "system", "content": context_block}));
    }

    messages.push(json!({"role": "user", "content": user_utterance}));
    messages
}

fn parse_sse_data(data: &str) -> Vec<Result<StreamEvent>> {
    if data.trim() == "[DONE]" {
        return vec![Ok(StreamEvent::Done {
            finish_reason: Some("stop".into()),
        })];
    }

    let v: Value = match serde_json::from_str(data) {
        Ok(v) => v,
        Err(e) => return vec![Err(Error::Generative(format!("malformed SSE payload: {e}")))],
    };

    let choice = match v.get("choices").and_then(|c| c.as_array()).and_then(|a| a.first()) {
        Some(c) => c,
        None => return Vec::new(),
    };

    if let Some(fr) = choice.get("finish_reason").and_then(|f| f.as_str()) {
        return vec![Ok(StreamEvent::Done {
            finish_reason: Some(fr.to_owned()),
        })];
    }

    let delta = choice.get("delta").unwrap_or(&Value::Null);
    if let Some(text) = delta.get("content").and_then(|v| v.as_str()) {
        if !text.is_empty() {
            return vec![Ok(StreamEvent::Token { text: text.to_owned() })];
        }
    }

    Vec::new()
}

#[async_trait::async_trait]
impl GenerativeClient for OpenAiCompatClient {
    async fn stream(
        &self,
        system_prompt: &str,
        transcript: &[TurnRecord],
        context_block: &str,
        user_utterance: &str,
    ) -> Result<BoxStream<'static, Result<StreamEvent>>> {
        let messages = build_messages(system_prompt, transcript, context_block, user_utterance);
        let body = self.build_body(messages);
        let url = format!("{}/chat/completions", self.base_url);

        let mut request = self.http.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        tracing::debug!(url = %url, model = %self.model, "generative stream request");

        let response = request.send().await.map_err(from_reqwest)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Generative(format!("{status}: {body}")));
        }

        Ok(sse_response_stream(response, parse_sse_data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn done_sentinel_parses_to_done_event() {
        let events = parse_sse_data("[DONE]");
        assert!(matches!(events[0], Ok(StreamEvent::Done { .. })));
    }

    #[test]
    fn content_delta_parses_to_token() {
        let data = r#"{"choices":[{"delta":{"content":"hello"}}]}"#;
        let events = parse_sse_data(data);
        match &events[0] {
            Ok(StreamEvent::Token { text }) => assert_eq!(text, "hello"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn finish_reason_parses_to_done() {
        let data = r#"{"choices":[{"delta":{},"finish_reason":"stop"}]}"#;
        let events = parse_sse_data(data);
        assert!(matches!(&events[0], Ok(StreamEvent::Done { finish_reason: Some(r) }) if r == "stop"));
    }

    #[test]
    fn transcript_and_context_are_ordered_before_user_utterance() {
        let transcript = vec![TurnRecord {
            session_id: "s1".to_owned(),
            role: TurnRole::User,
            content: "earlier question".to_owned(),
            created_at: Utc::now(),
        }];
        let messages = build_messages("system", &transcript, "context here", "current question");
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[3]["content"], "current question");
        assert_eq!(messages[3]["role"], "user");
    }

    #[test]
    fn empty_context_block_is_omitted() {
        let messages = build_messages("system", &[], "", "hi");
        assert_eq!(messages.len(), 2);
    }
}
