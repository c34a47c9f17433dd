//! Depth-first translation of an element tree

use tracing::{debug, info};

use crate::core::chunked::ChunkedTranslator;
use crate::core::errors::{Result, TranslationError};
use crate::core::interrupt::InterruptFlag;
use crate::core::progress::ProgressTracker;
use crate::processors::tree::Element;

/// How a walk ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkOutcome {
    /// Every unit of the tree was visited
    Completed { translated: usize },
    /// The interrupt flag was seen at a checkpoint
    Interrupted { translated: usize },
}

impl WalkOutcome {
    pub fn translated(&self) -> usize {
        match self {
            WalkOutcome::Completed { translated } | WalkOutcome::Interrupted { translated } => {
                *translated
            }
        }
    }

    pub fn is_interrupted(&self) -> bool {
        matches!(self, WalkOutcome::Interrupted { .. })
    }
}

enum Frame {
    /// Translate the element at this child-index path, then schedule its children
    Visit(Vec<usize>),
    /// The subtree opened by the matching `Visit` is done
    Checkpoint,
}

/// Replaces element text and attribute values in place.
///
/// Pre-order: an element's text first, then its attributes in document order,
/// then its children. The interrupt flag is checked each time a subtree has
/// been finished; once it is seen the walk stops and leaves the rest of the
/// tree untouched. Tree shape is never changed.
pub struct TreeWalker<'a> {
    translator: &'a mut ChunkedTranslator,
    interrupt: InterruptFlag,
    progress: ProgressTracker,
}

impl<'a> TreeWalker<'a> {
    pub fn new(
        translator: &'a mut ChunkedTranslator,
        interrupt: InterruptFlag,
        progress: ProgressTracker,
    ) -> Self {
        Self {
            translator,
            interrupt,
            progress,
        }
    }

    /// Translate `root` and everything below it into `target_lang`.
    ///
    /// Errors are wrapped in [`TranslationError::WalkError`]; whatever was
    /// translated before the failure stays in the tree.
    pub async fn walk(&mut self, root: &mut Element, target_lang: &str) -> Result<WalkOutcome> {
        let mut stack = vec![Frame::Visit(Vec::new())];

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Visit(path) => {
                    let element = root.descendant_mut(&path).ok_or_else(|| {
                        TranslationError::walk(TranslationError::InternalError(format!(
                            "no element at path {:?}",
                            path
                        )))
                    })?;

                    self.translate_element(element, target_lang)
                        .await
                        .map_err(TranslationError::walk)?;

                    stack.push(Frame::Checkpoint);
                    for index in (0..element.children.len()).rev() {
                        let mut child = path.clone();
                        child.push(index);
                        stack.push(Frame::Visit(child));
                    }
                }
                Frame::Checkpoint => {
                    if self.interrupt.is_raised() {
                        info!(
                            "Stopping after {} of {} units",
                            self.progress.processed(),
                            self.progress.total()
                        );
                        self.progress.finish("Interrupted");
                        return Ok(WalkOutcome::Interrupted {
                            translated: self.progress.processed(),
                        });
                    }
                }
            }
        }

        self.progress.finish("Completed");
        Ok(WalkOutcome::Completed {
            translated: self.progress.processed(),
        })
    }

    /// Units translated so far
    pub fn processed(&self) -> usize {
        self.progress.processed()
    }

    async fn translate_element(&mut self, element: &mut Element, target_lang: &str) -> Result<()> {
        if let Some(text) = element.translatable_text().map(str::to_string) {
            debug!("Translating text of <{}>", element.name);
            let translated = self.translator.translate(&text, target_lang).await;
            self.report_dropped_segments();
            element.text = Some(translated?);
            self.progress.record();
        }

        for index in element.translatable_attributes() {
            let (key, value) = &element.attributes[index];
            debug!("Translating attribute {}=\"..\" of <{}>", key, element.name);
            let value = value.trim().to_string();
            let translated = self.translator.translate(&value, target_lang).await;
            self.report_dropped_segments();
            element.attributes[index].1 = translated?;
            self.progress.record();
        }

        Ok(())
    }

    fn report_dropped_segments(&mut self) {
        for failure in self.translator.take_failures() {
            self.progress
                .eprintln(format!("Error while translating a segment: {}", failure));
        }
    }
}
