use crate::traits::{LlmClient, LlmResponse};
use async_trait::async_trait;
use prep_common::{PrepError, Result};
use prep_http::{HttpClient, HttpError};
use serde::{Deserialize, Serialize};

const COHERE_API_BASE: &str = "https://api.cohere.com/v2/";

/// Cohere v2 chat client.
///
/// Requires a valid API key and internet access.
pub struct CohereClient {
    client: HttpClient,
    api_key: String,
    model: String,
    default_temperature: Option<f32>,
}

#[derive(Serialize)]
struct ChatApiRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatApiResponse {
    pub id: String,
    pub finish_reason: Option<String>,
    pub message: AssistantMessage,
    #[serde(default)]
    pub usage: Option<ChatUsage>,
}

/// The assistant turn in the response
#[derive(Debug, Deserialize)]
pub struct AssistantMessage {
    pub role: String,
    #[serde(default)]
    pub content: Vec<AssistantContent>,
}

/// One part of the assistant message `content`
#[derive(Debug, Deserialize)]
pub struct AssistantContent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatUsage {
    #[serde(default)]
    pub billed_units: Option<BilledUnits>,
}

#[derive(Debug, Deserialize)]
pub struct BilledUnits {
    pub input_tokens: Option<f64>,
    pub output_tokens: Option<f64>,
}

impl CohereClient {
    /// Create a new client for the given API key and model.
    pub fn new(api_key: String, model: String) -> Result<Self> {
        let client = HttpClient::new(COHERE_API_BASE)
            .map_err(|e| PrepError::Llm(format!("HttpClient init failed: {e}")))?;

        Ok(Self {
            client,
            api_key,
            model,
            default_temperature: None,
        })
    }

    /// Point the client at a different endpoint (gateways, mock servers).
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        self.client = HttpClient::new(base_url)
            .map_err(|e| PrepError::Llm(format!("HttpClient init failed: {e}")))?;
        Ok(self)
    }

    /// Temperature applied when a call does not specify one.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.default_temperature = Some(temperature);
        self
    }
}

#[async_trait]
impl LlmClient for CohereClient {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse> {
        let mut messages = Vec::with_capacity(2);
        if let Some(sys) = system_prompt {
            messages.push(ChatMessage {
                role: "system",
                content: sys.to_string(),
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt.to_string(),
        });

        let req = ChatApiRequest {
            model: self.model.clone(),
            messages,
            temperature: temperature.or(self.default_temperature),
            max_tokens,
        };

        tracing::debug!(model=%self.model, prompt_len=prompt.len(), "cohere.chat.start");

        let resp: ChatApiResponse = self
            .client
            .post_json("chat", Some(&self.api_key), &req)
            .await
            .map_err(http_to_prep)?;

        let text = resp
            .message
            .content
            .iter()
            .find(|c| c.kind == "text")
            .map(|c| c.text.clone())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(PrepError::Llm(format!(
                "No text content in chat response (finish_reason: {:?})",
                resp.finish_reason
            )));
        }

        let tokens_used = resp.usage.and_then(|u| u.billed_units).map(|b| {
            (b.input_tokens.unwrap_or(0.0) + b.output_tokens.unwrap_or(0.0)) as u32
        });

        Ok(LlmResponse {
            text,
            model: Some(self.model.clone()),
            tokens_used,
        })
    }

    async fn health_check(&self) -> Result<bool> {
        let test_prompt = "Respond with just 'OK'";

        match self.generate(test_prompt, None, Some(5), Some(0.1)).await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!("Cohere health check failed: {}", e);
                Ok(false)
            }
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn http_to_prep(e: HttpError) -> PrepError {
    match &e {
        HttpError::Api { status, .. } => match status.as_u16() {
            429 => PrepError::Llm("Rate limit exceeded".to_string()),
            401 => PrepError::Llm("Invalid API key".to_string()),
            403 => PrepError::Llm("API access forbidden".to_string()),
            _ => PrepError::Llm(format!("{e}")),
        },
        _ => PrepError::Llm(format!("{e}")),
    }
}
