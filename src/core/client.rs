//! Translation service client

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::core::config::TranslatorConfig;
use crate::core::errors::{Result, TranslationError};
use crate::core::models::{TranslationRequest, TranslationResult};

/// A service that turns one piece of text into its translation.
///
/// Implementations make a single attempt per call. Length limits are the
/// caller's concern; see [`crate::core::chunked::ChunkedTranslator`].
#[async_trait]
pub trait TextTranslator: Send + Sync {
    /// Translate a single request
    async fn translate(&self, request: &TranslationRequest) -> Result<TranslationResult>;
}

/// Client for Google's public web translation endpoint
#[derive(Debug, Clone)]
pub struct GoogleTranslator {
    client: reqwest::Client,
    endpoint: String,
}

impl GoogleTranslator {
    /// Create a new client
    pub fn new(config: &TranslatorConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| TranslationError::ConfigError {
                message: e.to_string(),
            })?;

        let mut builder = reqwest::Client::builder()
            .pool_idle_timeout(Some(Duration::from_secs(30)))
            .pool_max_idle_per_host(10);

        if let Some(timeout_ms) = config.timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: config.api_endpoint.clone(),
        })
    }
}

#[async_trait]
impl TextTranslator for GoogleTranslator {
    async fn translate(&self, request: &TranslationRequest) -> Result<TranslationResult> {
        debug!(
            "Sending {} chars ({} -> {})",
            request.text.chars().count(),
            request.source_lang,
            request.target_lang
        );

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", request.source_lang.as_str()),
                ("tl", request.target_lang.as_str()),
                ("dt", "t"),
                ("q", request.text.as_str()),
            ])
            .send()
            .await
            .map_err(|e| TranslationError::NetworkError {
                message: e.to_string(),
            })?;

        let status = response.status();

        if status.is_success() {
            let json: serde_json::Value = response
                .json()
                .await
                .map_err(|e| TranslationError::InvalidResponseError {
                    message: e.to_string(),
                })?;

            parse_response(&json)
        } else {
            let status_code = status.as_u16();
            let error_text = response.text().await.unwrap_or_default();

            if status_code == 429 {
                return Err(TranslationError::RateLimitError);
            }

            Err(TranslationError::ApiError {
                status: status_code,
                message: error_text,
            })
        }
    }
}

/// Extract the translation from a `translate_a/single` response.
///
/// The body looks like `[[["Ciao","Hello",...],...],null,"en",...]`: one entry
/// per sentence, translated text first.
fn parse_response(json: &serde_json::Value) -> Result<TranslationResult> {
    let sentences = json
        .get(0)
        .and_then(|s| s.as_array())
        .ok_or_else(|| TranslationError::InvalidResponseError {
            message: "No translation in response".to_string(),
        })?;

    let translation: String = sentences
        .iter()
        .filter_map(|sentence| sentence.get(0).and_then(|t| t.as_str()))
        .collect();

    let detected_source_lang = json
        .get(2)
        .and_then(|l| l.as_str())
        .map(|s| s.to_string());

    Ok(TranslationResult {
        translation,
        detected_source_lang,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translator_creation() {
        let translator = GoogleTranslator::new(&TranslatorConfig::default());
        assert!(translator.is_ok());
    }

    #[test]
    fn test_translator_rejects_invalid_config() {
        let config = TranslatorConfig {
            api_endpoint: String::new(),
            ..Default::default()
        };
        match GoogleTranslator::new(&config) {
            Err(TranslationError::ConfigError { message }) => {
                assert_eq!(message, "API endpoint is required");
            }
            other => panic!("expected a configuration error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_parse_response_joins_sentences() {
        let json = serde_json::json!([
            [
                ["Ciao. ", "Hello. ", null, null, 10],
                ["Come stai?", "How are you?", null, null, 10]
            ],
            null,
            "en"
        ]);

        let result = parse_response(&json).unwrap();
        assert_eq!(result.translation, "Ciao. Come stai?");
        assert_eq!(result.detected_source_lang.as_deref(), Some("en"));
    }

    #[test]
    fn test_parse_response_rejects_unexpected_shape() {
        let json = serde_json::json!({ "error": "nope" });
        assert!(matches!(
            parse_response(&json),
            Err(TranslationError::InvalidResponseError { .. })
        ));
    }
}
