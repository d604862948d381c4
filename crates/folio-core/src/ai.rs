//! Chat-completion client for the editor's AI actions.
//!
//! Every operation sends one `(system prompt, user text)` pair to the
//! completion endpoint and returns an [`AiResponse`]. Failures never surface as
//! `Err`: the cause is logged and the response carries the uniform
//! [`FAILURE_MESSAGE`] instead. There is no retry and no timeout override.
//!
//! The HTTP call sits behind [`ChatTransport`] so callers can swap in another
//! transport.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::config::AiConfig;
use crate::error::{AiError, AiResult};
use crate::style::ContentLength;

/// Error text reported for any failed completion.
pub const FAILURE_MESSAGE: &str = "Failed to process text";

const GRAMMAR_PROMPT: &str = "Fix any grammar errors in the following text while preserving its meaning and any markdown formatting:";

const TRANSLATE_PROMPT: &str = "Translate the following text to English if it's not already in English, preserving any markdown formatting:";

/// Generated text, or the reason there is none.
///
/// Check [`AiResponse::error`] before using `text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiResponse {
    /// Generated text; empty on failure.
    pub text: String,
    /// Failure message, if the request failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AiResponse {
    fn success(text: String) -> Self {
        Self { text, error: None }
    }

    fn failure() -> Self {
        Self {
            text: String::new(),
            error: Some(FAILURE_MESSAGE.to_string()),
        }
    }

    /// Whether the request succeeded.
    pub const fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Convert into a `Result`, yielding the text or the failure message.
    pub fn into_result(self) -> Result<String, String> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.text),
        }
    }
}

/// One chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// `system` or `user`.
    pub role: String,
    /// Message body.
    pub content: String,
}

/// Request body sent to the completion endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model name.
    pub model: String,
    /// System message followed by the user message.
    pub messages: Vec<ChatMessage>,
}

impl ChatRequest {
    fn new(model: &str, system: String, user: &str) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system,
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
        }
    }

    /// Content of the system message.
    pub fn system_prompt(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == "system")
            .map(|m| m.content.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Sends a completion request and returns the first choice's content.
pub trait ChatTransport: Send + Sync {
    /// Perform one request.
    fn complete(&self, request: &ChatRequest) -> impl Future<Output = AiResult<String>> + Send;
}

/// [`ChatTransport`] over HTTPS with a bearer credential.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpTransport {
    /// Create a transport for `endpoint`.
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key,
        }
    }
}

impl ChatTransport for HttpTransport {
    async fn complete(&self, request: &ChatRequest) -> AiResult<String> {
        let mut builder = self.client.post(&self.endpoint).json(request);
        if let Some(ref key) = self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AiError::Status(status.as_u16()));
        }

        let completion: ChatCompletion = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(AiError::EmptyChoices)
    }
}

/// High-level AI actions used by the editor.
#[derive(Debug, Clone)]
pub struct AiClient<T = HttpTransport> {
    transport: T,
    model: String,
}

impl AiClient<HttpTransport> {
    /// Build an HTTP client from configuration.
    pub fn from_config(config: &AiConfig) -> Self {
        Self::new(
            HttpTransport::new(config.endpoint.clone(), config.api_key.clone()),
            config.model.clone(),
        )
    }
}

impl<T: ChatTransport> AiClient<T> {
    /// Wrap a transport.
    pub fn new(transport: T, model: impl Into<String>) -> Self {
        Self {
            transport,
            model: model.into(),
        }
    }

    /// Correct grammar while keeping meaning and markdown.
    #[tracing::instrument(skip_all, fields(text_len = text.len()))]
    pub async fn fix_grammar(&self, text: &str) -> AiResponse {
        self.call(GRAMMAR_PROMPT.to_string(), text).await
    }

    /// Rewrite `text` following a caller-supplied style prompt.
    #[tracing::instrument(skip_all, fields(text_len = text.len()))]
    pub async fn expand_text(&self, text: &str, style_prompt: &str) -> AiResponse {
        self.call(expand_prompt(text, style_prompt), text).await
    }

    /// Translate to English unless already English.
    #[tracing::instrument(skip_all, fields(text_len = text.len()))]
    pub async fn translate_to_english(&self, text: &str) -> AiResponse {
        self.call(TRANSLATE_PROMPT.to_string(), text).await
    }

    /// Draft an SEO-structured article about `title`.
    #[tracing::instrument(skip(self), fields(target_words = length.target_words()))]
    pub async fn generate_seo_content(&self, title: &str, length: ContentLength) -> AiResponse {
        self.call(seo_prompt(title, length), title).await
    }

    async fn call(&self, system: String, user: &str) -> AiResponse {
        let request = ChatRequest::new(&self.model, system, user);
        match self.transport.complete(&request).await {
            Ok(text) => {
                tracing::debug!(response_len = text.len(), "completion received");
                AiResponse::success(text)
            }
            Err(e) => {
                tracing::error!(error = %e, "AI API error");
                AiResponse::failure()
            }
        }
    }
}

/// System prompt for [`AiClient::expand_text`].
pub fn expand_prompt(text: &str, style_prompt: &str) -> String {
    format!(
        "{style_prompt}\n\n\
         Original text:\n\
         {text}\n\n\
         Additional instructions:\n\
         - Maintain proper markdown formatting\n\
         - Use appropriate heading levels (h1, h2, h3)\n\
         - Include bold and italic text for emphasis\n\
         - Add bullet points and numbered lists where appropriate\n\
         - Optimize for readability and engagement\n\
         - Keep the tone consistent with the selected style"
    )
}

/// System prompt for [`AiClient::generate_seo_content`].
pub fn seo_prompt(title: &str, length: ContentLength) -> String {
    let words = length.target_words();
    format!(
        "Generate SEO-friendly markdown content about \"{title}\" that is EXACTLY {words} words long (±10 words).\n\n\
         Required Structure:\n\
         1. Title (H1)\n\
         2. Brief meta description (100-155 characters)\n\
         3. Table of Contents\n\
         4. Introduction (10% of content)\n\
         5. Main sections with H2 and H3 headings (75% of content)\n\
         6. Conclusion (15% of content)\n\n\
         Requirements:\n\
         - MUST be exactly {words} words (±10 words)\n\
         - Use proper markdown formatting\n\
         - Include relevant keywords naturally\n\
         - Use bullet points and numbered lists\n\
         - Add bold and italic emphasis\n\
         - Maintain consistent heading hierarchy\n\
         - Optimize for featured snippets\n\
         - Include relevant statistics or data points\n\n\
         Note: The word count is critical - ensure the output is {words} words (±10 words)."
    )
}
