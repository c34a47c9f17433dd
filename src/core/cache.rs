//! Per-run translation memo

use std::collections::HashMap;

/// Exact-match cache from source text to its translation.
///
/// Lives for one run only. A given source string reaches the service at most
/// once per target language, so repeated texts always come back byte-identical.
#[derive(Debug, Default)]
pub struct TranslationCache {
    entries: HashMap<(String, String), String>,
}

impl TranslationCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a translation
    pub fn get(&self, target_lang: &str, text: &str) -> Option<&str> {
        let key = (target_lang.to_string(), text.to_string());
        self.entries.get(&key).map(String::as_str)
    }

    /// Store a translation
    pub fn insert(
        &mut self,
        target_lang: impl Into<String>,
        text: impl Into<String>,
        translated: impl Into<String>,
    ) {
        self.entries
            .insert((target_lang.into(), text.into()), translated.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
