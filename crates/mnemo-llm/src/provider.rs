//! Provider selection and HTTP-backed chat models.
//!
//! Credentials come from environment variables; the configured provider is
//! used when its key is present, otherwise the first provider with a key is
//! selected with a warning. No usable provider is the one construction-time
//! fatal condition in the system.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{info, warn};

use mnemo_core::config::LlmConfig;
use mnemo_core::error::{MnemoError, Result};
use mnemo_core::message::{ChatMessage, Role};

use crate::model::ChatModel;

/// Supported hosted generation providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Anthropic,
    Google,
}

impl Provider {
    /// All providers, in fallback priority order.
    pub const ALL: [Provider; 3] = [Provider::OpenAi, Provider::Anthropic, Provider::Google];

    /// Configuration name of the provider.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Google => "google",
        }
    }

    /// Environment variable holding the provider's API key.
    pub fn env_key(&self) -> &'static str {
        match self {
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
            Provider::Google => "GOOGLE_API_KEY",
        }
    }

    /// Default model when the config does not name one.
    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::OpenAi => "gpt-4o",
            Provider::Anthropic => "claude-opus-5",
            Provider::Google => "gemini-1.5-pro",
        }
    }

    /// Parse a configured provider name.
    pub fn parse(name: &str) -> Option<Provider> {
        match name.to_lowercase().as_str() {
            "openai" => Some(Provider::OpenAi),
            "anthropic" => Some(Provider::Anthropic),
            "google" => Some(Provider::Google),
            _ => None,
        }
    }

    fn credentials(&self) -> Option<String> {
        std::env::var(self.env_key()).ok().filter(|k| !k.is_empty())
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Providers with credentials available in the environment.
pub fn available_providers() -> Vec<Provider> {
    Provider::ALL
        .into_iter()
        .filter(|p| p.credentials().is_some())
        .collect()
}

/// Build the chat model for the given configuration.
///
/// Falls back to another credentialed provider when the configured one has
/// no key. Fails if no provider has credentials at all.
pub fn build_model(config: &LlmConfig) -> Result<Box<dyn ChatModel>> {
    let requested = match config.provider.as_deref() {
        Some(name) => Some(Provider::parse(name).ok_or_else(|| {
            MnemoError::Config(format!("unsupported LLM provider: {}", name))
        })?),
        None => None,
    };

    let provider = match requested {
        Some(p) if p.credentials().is_some() => p,
        other => {
            let available = available_providers();
            let fallback = available.first().copied().ok_or_else(|| {
                MnemoError::Config(
                    "no usable generation provider: set OPENAI_API_KEY, \
                     ANTHROPIC_API_KEY, or GOOGLE_API_KEY"
                        .to_string(),
                )
            })?;
            if let Some(p) = other {
                warn!("No API key for {}, using {} instead", p, fallback);
            }
            fallback
        }
    };

    let api_key = provider
        .credentials()
        .ok_or_else(|| MnemoError::Config(format!("missing API key for {}", provider)))?;
    let model = config
        .model
        .clone()
        .unwrap_or_else(|| provider.default_model().to_string());

    info!("Using {} model {}", provider, model);

    Ok(Box::new(HttpChatModel {
        client: reqwest::Client::new(),
        provider,
        api_key,
        model,
        temperature: config.temperature,
    }))
}

/// Chat model reaching a hosted provider over HTTPS.
struct HttpChatModel {
    client: reqwest::Client,
    provider: Provider,
    api_key: String,
    model: String,
    temperature: f32,
}

impl HttpChatModel {
    async fn post(&self, url: &str, body: Value, auth: Auth<'_>) -> Result<Value> {
        let mut request = self.client.post(url).json(&body);
        request = match auth {
            Auth::Bearer(key) => request.bearer_auth(key),
            Auth::Header(name, value) => request.header(name, value),
            Auth::None => request,
        };
        if matches!(self.provider, Provider::Anthropic) {
            request = request.header("anthropic-version", "2023-06-01");
        }

        let response = request
            .send()
            .await
            .map_err(|e| MnemoError::Generation(format!("request failed: {}", e)))?;
        let status = response.status();
        let payload: Value = response
            .json()
            .await
            .map_err(|e| MnemoError::Generation(format!("invalid response body: {}", e)))?;

        if !status.is_success() {
            return Err(MnemoError::Generation(format!(
                "{} returned {}: {}",
                self.provider, status, payload
            )));
        }
        Ok(payload)
    }

    async fn generate_openai(&self, messages: &[ChatMessage]) -> Result<String> {
        let body = json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": messages
                .iter()
                .map(|m| json!({"role": m.role.as_str(), "content": m.content}))
                .collect::<Vec<_>>(),
        });
        let payload = self
            .post(
                "https://api.openai.com/v1/chat/completions",
                body,
                Auth::Bearer(&self.api_key),
            )
            .await?;
        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| MnemoError::Generation("empty completion".to_string()))
    }

    async fn generate_anthropic(&self, messages: &[ChatMessage]) -> Result<String> {
        // The messages endpoint takes system text as a top-level field.
        let system: Vec<&str> = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect();
        let turns: Vec<Value> = messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| json!({"role": m.role.as_str(), "content": m.content}))
            .collect();

        let mut body = json!({
            "model": self.model,
            "max_tokens": 4096,
            "messages": turns,
        });
        if !system.is_empty() {
            body["system"] = json!(system.join("\n\n"));
        }

        let payload = self
            .post(
                "https://api.anthropic.com/v1/messages",
                body,
                Auth::Header("x-api-key", &self.api_key),
            )
            .await?;
        let text = payload["content"]
            .as_array()
            .and_then(|blocks| {
                blocks
                    .iter()
                    .find(|b| b["type"] == "text")
                    .and_then(|b| b["text"].as_str())
            })
            .map(str::to_string);
        text.ok_or_else(|| MnemoError::Generation("empty completion".to_string()))
    }

    async fn generate_google(&self, messages: &[ChatMessage]) -> Result<String> {
        let contents: Vec<Value> = messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| {
                let role = match m.role {
                    Role::Assistant => "model",
                    _ => "user",
                };
                json!({"role": role, "parts": [{"text": m.content}]})
            })
            .collect();

        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, self.api_key
        );
        let payload = self
            .post(&url, json!({"contents": contents}), Auth::None)
            .await?;
        payload["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| MnemoError::Generation("empty completion".to_string()))
    }
}

enum Auth<'a> {
    Bearer(&'a str),
    Header(&'static str, &'a str),
    None,
}

#[async_trait]
impl ChatModel for HttpChatModel {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String> {
        if messages.is_empty() {
            return Err(MnemoError::Generation("empty message history".to_string()));
        }
        match self.provider {
            Provider::OpenAi => self.generate_openai(messages).await,
            Provider::Anthropic => self.generate_anthropic(messages).await,
            Provider::Google => self.generate_google(messages).await,
        }
    }

    fn describe(&self) -> String {
        format!("{}/{}", self.provider, self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parse() {
        assert_eq!(Provider::parse("openai"), Some(Provider::OpenAi));
        assert_eq!(Provider::parse("Anthropic"), Some(Provider::Anthropic));
        assert_eq!(Provider::parse("GOOGLE"), Some(Provider::Google));
        assert_eq!(Provider::parse("mistral"), None);
    }

    #[test]
    fn test_provider_names_roundtrip() {
        for provider in Provider::ALL {
            assert_eq!(Provider::parse(provider.as_str()), Some(provider));
        }
    }

    #[test]
    fn test_provider_env_keys() {
        assert_eq!(Provider::OpenAi.env_key(), "OPENAI_API_KEY");
        assert_eq!(Provider::Anthropic.env_key(), "ANTHROPIC_API_KEY");
        assert_eq!(Provider::Google.env_key(), "GOOGLE_API_KEY");
    }

    #[test]
    fn test_provider_default_models_nonempty() {
        for provider in Provider::ALL {
            assert!(!provider.default_model().is_empty());
        }
    }

    #[test]
    fn test_build_model_unknown_provider_errors() {
        let config = LlmConfig {
            provider: Some("nonsense".to_string()),
            model: None,
            temperature: 0.7,
        };
        let result = build_model(&config);
        assert!(result.is_err());
        assert!(result
            .err()
            .unwrap()
            .to_string()
            .contains("unsupported LLM provider"));
    }

    #[test]
    fn test_provider_display() {
        assert_eq!(format!("{}", Provider::Anthropic), "anthropic");
    }
}
