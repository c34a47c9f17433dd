//! CLI command definitions and handlers

use clap::Subcommand;
use indicatif::HumanDuration;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

use crate::core::config::TranslatorConfig;
use crate::core::errors::TranslationError;
use crate::core::interrupt::{install_ctrl_c_handler, InterruptFlag};
use crate::processors::xml::{FileReport, XmlProcessor};

/// Input used when no command is given
pub const DEFAULT_INPUT: &str = "file.xml";

/// Commands for XML Translator
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Translate an XML file, or every XML file in a directory
    Translate {
        /// Input file or directory
        #[arg(default_value = DEFAULT_INPUT)]
        path: PathBuf,

        /// Source language (auto-detect if not specified)
        #[arg(long)]
        source_lang: Option<String>,

        /// Target language (default: TARGET_LANG or it)
        #[arg(short, long)]
        target_lang: Option<String>,

        /// Recursively translate subdirectories
        #[arg(short, long)]
        recursive: bool,
    },

    /// Count translatable text units without translating
    Count {
        /// Input file or directory
        #[arg(default_value = DEFAULT_INPUT)]
        path: PathBuf,

        /// Recursively scan subdirectories
        #[arg(short, long)]
        recursive: bool,
    },
}

/// Handle translate command
pub async fn handle_translate(
    config: TranslatorConfig,
    path: PathBuf,
    source_lang: Option<String>,
    target_lang: Option<String>,
    recursive: bool,
) -> anyhow::Result<()> {
    let start_time = Instant::now();

    let mut config = config;
    if let Some(source_lang) = source_lang {
        config.source_lang = source_lang;
    }
    if let Some(target_lang) = target_lang {
        config.target_lang = target_lang;
    }
    config.validate()?;

    let target_lang = config.target_lang.clone();

    info!("Starting XML translation");
    info!("Input: {}", path.display());
    info!("Target language: {}", target_lang);

    let interrupt = InterruptFlag::new();
    let listener = install_ctrl_c_handler(interrupt.clone());

    let mut processor = XmlProcessor::from_config(config, interrupt.clone())?;
    let files = collect_inputs(&processor, &path, recursive)?;

    let (reports, failures) =
        translate_all(&mut processor, &files, &target_lang, &interrupt).await;

    listener.abort();

    let stats = processor.stats();
    let duration = start_time.elapsed();
    info!(
        "Completed: {} files, {} service calls, {} cache hits in {:?}",
        reports.len(),
        stats.service_calls,
        stats.cache_hits,
        duration
    );

    print_summary(&reports, &failures);
    println!("   Cache hits: {}", stats.cache_hits);
    if stats.dropped_segments > 0 {
        println!("   Dropped segments: {}", stats.dropped_segments);
    }
    println!("   Time: {}", HumanDuration(duration));

    if !failures.is_empty() {
        anyhow::bail!("{} of {} files could not be translated", failures.len(), files.len());
    }

    Ok(())
}

/// Translate `files` in order until done or interrupted.
///
/// A file that cannot be read, parsed or written is recorded with its error
/// and the batch moves on to the next one.
pub async fn translate_all(
    processor: &mut XmlProcessor,
    files: &[PathBuf],
    target_lang: &str,
    interrupt: &InterruptFlag,
) -> (Vec<FileReport>, Vec<(PathBuf, TranslationError)>) {
    let mut reports = Vec::new();
    let mut failures = Vec::new();

    for file in files {
        if interrupt.is_raised() {
            break;
        }
        match processor.translate_file(file, target_lang).await {
            Ok(report) => {
                println!("Process completed and file saved.");
                reports.push(report);
            }
            Err(e) => {
                warn!("Skipping {}: {}", file.display(), e);
                eprintln!("❌ {}", e);
                failures.push((file.clone(), e));
            }
        }
    }

    (reports, failures)
}

/// Handle count command
pub async fn handle_count(
    config: TranslatorConfig,
    path: PathBuf,
    recursive: bool,
) -> anyhow::Result<()> {
    let processor = XmlProcessor::from_config(config, InterruptFlag::new())?;
    let files = collect_inputs(&processor, &path, recursive)?;

    let mut total = 0;
    for file in files {
        let units = processor.count_file(&file).await?;
        println!("{}: {} units", file.display(), units);
        total += units;
    }

    println!("Total: {} units", total);
    Ok(())
}

fn collect_inputs(
    processor: &XmlProcessor,
    path: &Path,
    recursive: bool,
) -> anyhow::Result<Vec<PathBuf>> {
    let files = if path.is_dir() {
        processor.find_xml_files(path, recursive)?
    } else {
        vec![path.to_path_buf()]
    };

    if files.is_empty() {
        anyhow::bail!("No XML files found in {}", path.display());
    }

    Ok(files)
}

fn print_summary(reports: &[FileReport], failures: &[(PathBuf, TranslationError)]) {
    let interrupted = reports.iter().any(|r| r.interrupted);
    let failed = reports.iter().filter(|r| r.error.is_some()).count() + failures.len();

    if interrupted {
        println!("\n⚠️  Translation interrupted, partial output saved.");
    } else {
        println!("\n✅ Translation completed!");
    }

    for report in reports {
        println!(
            "   {} -> {} ({}/{} units)",
            report.input.display(),
            report.output.display(),
            report.translated_units,
            report.total_units
        );
        if let Some(error) = &report.error {
            println!("      stopped early: {}", error);
        }
    }

    for (file, error) in failures {
        println!("   {} not translated: {}", file.display(), error);
    }

    if failed > 0 {
        println!("   Failed: {}", failed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::ScriptedTranslator;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_batch_continues_past_broken_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a_broken.xml"), "<root><a></root>").unwrap();
        std::fs::write(dir.path().join("b_good.xml"), "<root>Hello</root>").unwrap();

        let interrupt = InterruptFlag::new();
        let mock = Arc::new(ScriptedTranslator::new());
        let mut processor = XmlProcessor::new(mock, TranslatorConfig::default(), interrupt.clone())
            .with_progress(false);
        let files = processor.find_xml_files(dir.path(), false).unwrap();
        assert_eq!(files.len(), 2);

        let (reports, failures) = translate_all(&mut processor, &files, "it", &interrupt).await;

        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, dir.path().join("a_broken.xml"));
        assert!(matches!(failures[0].1, TranslationError::ParseError { .. }));
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].translated_units, 1);
        assert!(!dir.path().join("a_broken_translated.xml").exists());
        let written = std::fs::read_to_string(dir.path().join("b_good_translated.xml")).unwrap();
        assert!(written.contains("<root>HELLO</root>"));
    }

    #[tokio::test]
    async fn test_batch_stops_when_interrupted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.xml"), "<root>One</root>").unwrap();
        std::fs::write(dir.path().join("b.xml"), "<root>Two</root>").unwrap();

        let interrupt = InterruptFlag::new();
        let mock = Arc::new(ScriptedTranslator::new().interrupting_on("One", interrupt.clone()));
        let mut processor =
            XmlProcessor::new(mock.clone(), TranslatorConfig::default(), interrupt.clone())
                .with_progress(false);
        let files = processor.find_xml_files(dir.path(), false).unwrap();

        let (reports, failures) = translate_all(&mut processor, &files, "it", &interrupt).await;

        assert!(failures.is_empty());
        assert_eq!(reports.len(), 1);
        assert!(reports[0].interrupted);
        assert_eq!(mock.call_count("Two"), 0);
        assert!(!dir.path().join("b_translated.xml").exists());
    }
}
