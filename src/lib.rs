//! XML Translator - machine translation for XML documents
//!
//! This library walks an XML tree and replaces element text and attribute
//! values with their translations, splitting long texts to fit the service
//! limit and memoizing repeated strings within a run.

#![forbid(unsafe_code)]

pub mod cli;
pub mod core;
pub mod processors;

// Re-export key types for convenience
pub use crate::core::{
    chunked::ChunkedTranslator,
    client::{GoogleTranslator, TextTranslator},
    config::TranslatorConfig,
    errors::TranslationError,
    interrupt::InterruptFlag,
    models::{TranslationRequest, TranslationResult},
};

pub use crate::processors::{
    tree::{Document, Element},
    walker::{TreeWalker, WalkOutcome},
    xml::XmlProcessor,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
