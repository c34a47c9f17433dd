//! XML file processor: load, translate, save, report

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::core::chunked::ChunkedTranslator;
use crate::core::client::{GoogleTranslator, TextTranslator};
use crate::core::config::TranslatorConfig;
use crate::core::errors::{Result, TranslationError};
use crate::core::interrupt::InterruptFlag;
use crate::core::models::ChunkStats;
use crate::core::progress::ProgressTracker;
use crate::processors::tree::Document;
use crate::processors::walker::{TreeWalker, WalkOutcome};

/// Sibling path for the translated file: `name.xml` becomes `name<suffix>.xml`
pub fn output_path(original: &Path, suffix: &str) -> PathBuf {
    let stem = original
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let file_name = match original.extension() {
        Some(ext) => format!("{}{}.{}", stem, suffix, ext.to_string_lossy()),
        None => format!("{}{}", stem, suffix),
    };

    original.with_file_name(file_name)
}

/// Read and parse an XML file in whatever encoding its declaration names
pub async fn load_document(path: &Path) -> Result<Document> {
    let content = tokio::fs::read(path)
        .await
        .map_err(|e| TranslationError::FileError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

    Document::parse_bytes(&content).map_err(|e| match e {
        TranslationError::ParseError { message, .. } => TranslationError::ParseError {
            path: path.display().to_string(),
            message,
        },
        other => other,
    })
}

/// Write `document` next to `original`, replacing any existing file
pub async fn save_document(document: &Document, original: &Path, suffix: &str) -> Result<PathBuf> {
    let output = output_path(original, suffix);
    let xml = document.to_xml_string()?;

    tokio::fs::write(&output, xml)
        .await
        .map_err(|e| TranslationError::WriteError {
            path: output.display().to_string(),
            message: e.to_string(),
        })?;

    println!("Translated file saved as: {}", output.display());
    Ok(output)
}

/// Summary of one translated file
#[derive(Debug, Clone)]
pub struct FileReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub total_units: usize,
    pub translated_units: usize,
    pub interrupted: bool,
    /// Set when the walk stopped on an error; the output holds what was done
    pub error: Option<String>,
}

/// Translates XML files, sharing one cache across every file of a run
pub struct XmlProcessor {
    translator: ChunkedTranslator,
    config: TranslatorConfig,
    interrupt: InterruptFlag,
    show_progress: bool,
}

impl XmlProcessor {
    /// Create a new XML processor
    pub fn new(
        translator: Arc<dyn TextTranslator>,
        config: TranslatorConfig,
        interrupt: InterruptFlag,
    ) -> Self {
        Self {
            translator: ChunkedTranslator::new(translator, &config),
            config,
            interrupt,
            show_progress: true,
        }
    }

    /// Create a processor backed by the Google client
    pub fn from_config(config: TranslatorConfig, interrupt: InterruptFlag) -> Result<Self> {
        let translator = GoogleTranslator::new(&config)?;
        Ok(Self::new(Arc::new(translator), config, interrupt))
    }

    /// Draw a progress bar while walking (on by default)
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Find XML files in a directory
    pub fn find_xml_files(&self, dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(TranslationError::FileError {
                path: dir.display().to_string(),
                message: "Not a directory".to_string(),
            });
        }

        let max_depth = if recursive { usize::MAX } else { 1 };
        let suffix = self.config.output_suffix.as_str();

        let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|entry| entry.into_path())
            .filter(|path| path.is_file() && is_xml_file(path))
            // Skip outputs of earlier runs
            .filter(|path| {
                path.file_stem()
                    .map(|stem| !stem.to_string_lossy().ends_with(suffix))
                    .unwrap_or(true)
            })
            .collect();

        files.sort();
        Ok(files)
    }

    /// Count translatable units without translating anything
    pub async fn count_file(&self, input: &Path) -> Result<usize> {
        let document = load_document(input).await?;
        Ok(document.count_units())
    }

    /// Translate one file and always leave the output behind.
    ///
    /// A parse error returns early with nothing written. Any failure while
    /// walking is reported in [`FileReport::error`] after the partial tree is
    /// saved; a write failure is returned as an error.
    pub async fn translate_file(&mut self, input: &Path, target_lang: &str) -> Result<FileReport> {
        info!("Translating {} into {}", input.display(), target_lang);

        let mut document = load_document(input).await?;
        let total_units = document.count_units();
        debug!("{} translatable units", total_units);

        let progress = if self.show_progress {
            ProgressTracker::new(total_units)
        } else {
            ProgressTracker::hidden(total_units)
        };

        let (outcome, processed) = {
            let mut walker =
                TreeWalker::new(&mut self.translator, self.interrupt.clone(), progress);
            let outcome = walker.walk(&mut document.root, target_lang).await;
            (outcome, walker.processed())
        };

        let (translated_units, interrupted, error) = match outcome {
            Ok(WalkOutcome::Completed { translated }) => (translated, false, None),
            Ok(WalkOutcome::Interrupted { translated }) => {
                warn!("Interrupted; saving partial translation");
                (translated, true, None)
            }
            Err(e) => {
                warn!("Translation stopped: {}", e);
                eprintln!("Error during translation: {}", e);
                (processed, false, Some(e.to_string()))
            }
        };

        let output = save_document(&document, input, &self.config.output_suffix).await?;

        Ok(FileReport {
            input: input.to_path_buf(),
            output,
            total_units,
            translated_units,
            interrupted,
            error,
        })
    }

    pub fn stats(&self) -> ChunkStats {
        self.translator.stats()
    }
}

/// Check if file is XML
fn is_xml_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("xml"))
        .unwrap_or(false)
}
