//! Length-aware translation with memoization
//!
//! Texts up to the service limit go out in one call. Longer texts are cut into
//! fixed-size segments, translated concurrently on a short-lived bounded pool,
//! and stitched back together in their original order.

use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::core::cache::TranslationCache;
use crate::core::client::TextTranslator;
use crate::core::config::TranslatorConfig;
use crate::core::errors::{Result, TranslationError};
use crate::core::models::{ChunkStats, TranslationRequest};

/// Split `text` into contiguous pieces of at most `max_chars` characters.
///
/// Cuts fall on character boundaries only, never on words or sentences.
pub fn split_into_segments(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut count = 0;

    for ch in text.chars() {
        if count == max_chars {
            segments.push(std::mem::take(&mut current));
            count = 0;
        }
        current.push(ch);
        count += 1;
    }

    if !current.is_empty() {
        segments.push(current);
    }

    segments
}

/// Translator front-end owning the per-run cache
pub struct ChunkedTranslator {
    translator: Arc<dyn TextTranslator>,
    cache: TranslationCache,
    source_lang: String,
    max_chunk_chars: usize,
    pool_size: usize,
    stats: ChunkStats,
    failures: Vec<String>,
}

impl ChunkedTranslator {
    /// Create a new chunked translator
    pub fn new(translator: Arc<dyn TextTranslator>, config: &TranslatorConfig) -> Self {
        Self {
            translator,
            cache: TranslationCache::new(),
            source_lang: config.source_lang.clone(),
            max_chunk_chars: config.max_chunk_chars,
            pool_size: config.worker_pool_size(),
            stats: ChunkStats::default(),
            failures: Vec::new(),
        }
    }

    /// Translate `text` (trimmed) into `target_lang`.
    ///
    /// A failed segment of a long text is logged and contributes nothing; only
    /// a failed single-call translation is returned as an error.
    pub async fn translate(&mut self, text: &str, target_lang: &str) -> Result<String> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(String::new());
        }

        if let Some(cached) = self.cache.get(target_lang, text) {
            self.stats.cache_hits += 1;
            return Ok(cached.to_string());
        }

        let translated = if text.chars().count() <= self.max_chunk_chars {
            self.stats.service_calls += 1;
            let request = TranslationRequest::new(text, target_lang)
                .with_source_lang(self.source_lang.as_str());
            self.translator.translate(&request).await?.translation
        } else {
            self.translate_segments(text, target_lang).await
        };

        self.cache.insert(target_lang, text, translated.as_str());
        Ok(translated)
    }

    /// Translate a long text segment by segment on a bounded pool
    async fn translate_segments(&mut self, text: &str, target_lang: &str) -> String {
        let segments = split_into_segments(text, self.max_chunk_chars);
        let total = segments.len();
        debug!(
            "Splitting {} chars into {} segments ({} workers)",
            text.chars().count(),
            total,
            self.pool_size
        );

        self.stats.chunked_texts += 1;
        self.stats.service_calls += total;

        let semaphore = Arc::new(Semaphore::new(self.pool_size.max(1)));
        let mut tasks = JoinSet::new();

        for (index, segment) in segments.into_iter().enumerate() {
            let translator = Arc::clone(&self.translator);
            let semaphore = Arc::clone(&semaphore);
            let request = TranslationRequest::new(segment, target_lang)
                .with_source_lang(self.source_lang.as_str());

            tasks.spawn(async move {
                let _permit = semaphore.acquire().await;
                (index, translator.translate(&request).await)
            });
        }

        let mut parts: Vec<(usize, String)> = Vec::with_capacity(total);

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, Ok(result))) => parts.push((index, result.translation)),
                Ok((index, Err(e))) => {
                    let err = TranslationError::SegmentTranslationError {
                        index,
                        message: e.to_string(),
                    };
                    self.stats.dropped_segments += 1;
                    warn!("{}", err);
                    self.failures.push(err.to_string());
                }
                Err(e) => {
                    self.stats.dropped_segments += 1;
                    warn!("Segment task failed: {}", e);
                    self.failures.push(e.to_string());
                }
            }
        }

        // Completion order is arbitrary.
        parts.sort_by_key(|(index, _)| *index);
        parts.into_iter().map(|(_, part)| part).collect()
    }

    pub fn stats(&self) -> ChunkStats {
        self.stats
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    /// Drain the messages of segments dropped since the last call
    pub fn take_failures(&mut self) -> Vec<String> {
        std::mem::take(&mut self.failures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::ScriptedTranslator;

    fn chunked(translator: Arc<ScriptedTranslator>) -> ChunkedTranslator {
        ChunkedTranslator::new(translator, &TranslatorConfig::default())
    }

    #[test]
    fn test_split_preserves_text() {
        let text = "x".repeat(9001);
        let segments = split_into_segments(&text, 4000);

        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].chars().count(), 4000);
        assert_eq!(segments[1].chars().count(), 4000);
        assert_eq!(segments[2].chars().count(), 1001);
        assert_eq!(segments.concat(), text);
    }

    #[test]
    fn test_split_exact_multiple() {
        let text = "y".repeat(8000);
        let segments = split_into_segments(&text, 4000);
        assert_eq!(segments.len(), 2);
    }

    #[test]
    fn test_split_counts_characters_not_bytes() {
        let text = "è".repeat(5);
        let segments = split_into_segments(&text, 2);

        assert_eq!(segments, vec!["èè", "èè", "è"]);
    }

    #[tokio::test]
    async fn test_short_text_single_call() {
        let mock = Arc::new(ScriptedTranslator::new());
        let mut translator = chunked(mock.clone());

        let result = translator.translate("  Hello  ", "it").await.unwrap();
        assert_eq!(result, "HELLO");
        assert_eq!(mock.calls(), vec!["Hello".to_string()]);
    }

    #[tokio::test]
    async fn test_repeated_text_hits_cache() {
        let mock = Arc::new(ScriptedTranslator::new());
        let mut translator = chunked(mock.clone());

        let first = translator.translate("Hello", "it").await.unwrap();
        let second = translator.translate("Hello", "it").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(mock.call_count("Hello"), 1);
        assert_eq!(translator.stats().cache_hits, 1);
        assert_eq!(translator.stats().service_calls, 1);
    }

    #[tokio::test]
    async fn test_text_at_limit_is_not_split() {
        let mock = Arc::new(ScriptedTranslator::new());
        let mut translator = chunked(mock.clone());

        let text = "a".repeat(4000);
        translator.translate(&text, "it").await.unwrap();

        assert_eq!(mock.calls().len(), 1);
        assert_eq!(translator.stats().chunked_texts, 0);
    }

    #[tokio::test]
    async fn test_long_text_reassembled_in_order() {
        let first = "a".repeat(4000);
        let second = "b".repeat(4000);
        let third = "c".repeat(10);
        let text = format!("{}{}{}", first, second, third);

        // The first segment finishes last.
        let mock = Arc::new(ScriptedTranslator::new().delayed(first.clone(), 50));
        let mut translator = chunked(mock.clone());

        let result = translator.translate(&text, "it").await.unwrap();

        assert_eq!(result, text.to_uppercase());
        assert_eq!(mock.calls().len(), 3);
        assert_eq!(translator.stats().chunked_texts, 1);
    }

    #[tokio::test]
    async fn test_failed_segment_is_dropped() {
        let first = "a".repeat(4000);
        let second = "b".repeat(4000);
        let third = "c".repeat(10);
        let text = format!("{}{}{}", first, second, third);

        let mock = Arc::new(ScriptedTranslator::new().failing_on(second.clone()));
        let mut translator = chunked(mock);

        let result = translator.translate(&text, "it").await.unwrap();

        assert_eq!(result, format!("{}{}", first.to_uppercase(), third.to_uppercase()));
        assert_eq!(translator.stats().dropped_segments, 1);

        let failures = translator.take_failures();
        assert_eq!(failures.len(), 1);
        assert!(failures[0].starts_with("Segment 1 failed"));
        assert!(translator.take_failures().is_empty());
    }

    #[tokio::test]
    async fn test_lossy_result_is_cached() {
        let first = "a".repeat(4000);
        let second = "b".repeat(4000);
        let text = format!("{}{}", first, second);

        let mock = Arc::new(ScriptedTranslator::new().failing_on(second.clone()));
        let mut translator = chunked(mock.clone());

        let lossy = translator.translate(&text, "it").await.unwrap();
        let calls = mock.calls().len();
        let again = translator.translate(&text, "it").await.unwrap();

        assert_eq!(again, lossy);
        assert_eq!(again, first.to_uppercase());
        assert_eq!(mock.calls().len(), calls);
        assert_eq!(translator.stats().cache_hits, 1);
        assert_eq!(translator.stats().dropped_segments, 1);
    }

    #[tokio::test]
    async fn test_segments_bounded_by_pool_size() {
        let config = TranslatorConfig {
            max_chunk_chars: 10,
            workers_per_cpu: 1,
            ..Default::default()
        };
        let pool_size = config.worker_pool_size();
        let segments = pool_size + 3;
        let text = "x".repeat(10 * segments);

        let mock = Arc::new(ScriptedTranslator::new().with_latency(20));
        let mut translator = ChunkedTranslator::new(mock.clone(), &config);

        let result = translator.translate(&text, "it").await.unwrap();

        assert_eq!(result, text.to_uppercase());
        assert_eq!(mock.calls().len(), segments);
        assert!(mock.peak_in_flight() >= 1);
        assert!(mock.peak_in_flight() <= pool_size);
    }

    #[tokio::test]
    async fn test_short_text_failure_is_returned() {
        let mock = Arc::new(ScriptedTranslator::new().failing_on("Hello"));
        let mut translator = chunked(mock);

        let result = translator.translate("Hello", "it").await;
        assert!(matches!(result, Err(TranslationError::NetworkError { .. })));
        assert!(translator.cache().is_empty());
    }
}
