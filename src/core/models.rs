//! Core data models for translation

use serde::{Deserialize, Serialize};

/// Source language value that asks the service to detect the language
pub const AUTO_LANG: &str = "auto";

/// Translation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub text: String,
    pub source_lang: String,
    pub target_lang: String,
}

impl TranslationRequest {
    pub fn new(text: impl Into<String>, target_lang: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source_lang: AUTO_LANG.to_string(),
            target_lang: target_lang.into(),
        }
    }

    pub fn with_source_lang(mut self, source_lang: impl Into<String>) -> Self {
        self.source_lang = source_lang.into();
        self
    }
}

/// Translation result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationResult {
    pub translation: String,
    pub detected_source_lang: Option<String>,
}

impl TranslationResult {
    pub fn new(translation: impl Into<String>) -> Self {
        Self {
            translation: translation.into(),
            detected_source_lang: None,
        }
    }
}

/// Counters collected by the chunked translator over one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkStats {
    /// Calls sent to the translation service
    pub service_calls: usize,
    /// Lookups answered from the cache
    pub cache_hits: usize,
    /// Texts that had to be split into segments
    pub chunked_texts: usize,
    /// Segments whose translation failed and were left out
    pub dropped_segments: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults_to_auto_source() {
        let request = TranslationRequest::new("Hello", "it");
        assert_eq!(request.source_lang, AUTO_LANG);
        assert_eq!(request.target_lang, "it");

        let request = request.with_source_lang("en");
        assert_eq!(request.source_lang, "en");
    }
}
