//! In-memory translator for unit tests

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::core::client::TextTranslator;
use crate::core::errors::{Result, TranslationError};
use crate::core::interrupt::InterruptFlag;
use crate::core::models::{TranslationRequest, TranslationResult};

/// Upper-cases every text and records what it was asked to translate.
#[derive(Debug, Default)]
pub struct ScriptedTranslator {
    calls: Mutex<Vec<String>>,
    failing: HashSet<String>,
    delays: HashMap<String, u64>,
    latency: Option<u64>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    interrupt_on: Option<(String, InterruptFlag)>,
}

impl ScriptedTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail whenever `text` is requested
    pub fn failing_on(mut self, text: impl Into<String>) -> Self {
        self.failing.insert(text.into());
        self
    }

    /// Sleep before answering `text`
    pub fn delayed(mut self, text: impl Into<String>, millis: u64) -> Self {
        self.delays.insert(text.into(), millis);
        self
    }

    /// Sleep before answering any text without its own delay
    pub fn with_latency(mut self, millis: u64) -> Self {
        self.latency = Some(millis);
        self
    }

    /// Raise `flag` while translating `text`
    pub fn interrupting_on(mut self, text: impl Into<String>, flag: InterruptFlag) -> Self {
        self.interrupt_on = Some((text.into(), flag));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, text: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == text).count()
    }

    /// Most requests that were ever being answered at the same time
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    async fn answer(&self, request: &TranslationRequest) -> Result<TranslationResult> {
        let delay = self.delays.get(&request.text).copied().or(self.latency);
        if let Some(millis) = delay {
            tokio::time::sleep(Duration::from_millis(millis)).await;
        }

        if let Some((text, flag)) = &self.interrupt_on {
            if *text == request.text {
                flag.raise();
            }
        }

        if self.failing.contains(&request.text) {
            return Err(TranslationError::NetworkError {
                message: "scripted failure".to_string(),
            });
        }

        Ok(TranslationResult::new(request.text.to_uppercase()))
    }
}

#[async_trait]
impl TextTranslator for ScriptedTranslator {
    async fn translate(&self, request: &TranslationRequest) -> Result<TranslationResult> {
        self.calls.lock().unwrap().push(request.text.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        let result = self.answer(request).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        result
    }
}
