use crate::config::ExportConfig;
use crate::csv::render_csv;
use crate::error::{AppError, Result};
use crate::extract::{ExtractOptions, Extraction, Extractor};
use crate::summary::ExtractionSummary;
use log;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExportOptions {
    pub extract: ExtractOptions,
    /// Refuse to produce a CSV when no modules or no questions were found.
    pub strict: bool,
}

impl From<&ExportConfig> for ExportOptions {
    fn from(config: &ExportConfig) -> Self {
        Self {
            extract: ExtractOptions::from(config),
            strict: config.strict,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportReport {
    pub extraction: Extraction,
    pub csv: String,
    pub summary: ExtractionSummary,
}

pub fn read_source(path: &Path) -> Result<String> {
    log::debug!("Reading question source: {}", path.display());
    fs::read_to_string(path).map_err(|e| AppError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Extracts, checks and renders one source text. Does not touch the filesystem.
pub fn build_report(
    source_text: &str,
    source_label: &str,
    options: &ExportOptions,
) -> Result<ExportReport> {
    let extraction = Extractor::new(options.extract).extract(source_text);

    if extraction.modules.is_empty() || extraction.questions.is_empty() {
        let detail = format!(
            "{} modules and {} questions found in {}",
            extraction.modules.len(),
            extraction.questions.len(),
            source_label
        );
        if options.strict {
            return Err(AppError::EmptyExtraction(detail));
        }
        log::warn!("{}; the export will contain only the header row.", detail);
    }

    let csv = render_csv(&extraction.questions);
    let summary = ExtractionSummary::from_extraction(&extraction, source_label);
    Ok(ExportReport {
        extraction,
        csv,
        summary,
    })
}

/// Overwrites `path` with the CSV, creating parent directories as needed.
pub fn write_csv(path: &Path, csv: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| AppError::DirCreation {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    fs::write(path, csv).map_err(|e| AppError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;
    log::info!("Wrote {} bytes to {}", csv.len(), path.display());
    Ok(())
}

/// Full export: read the source, build the report and, if given, write the CSV.
pub fn export_questions(
    source_path: &Path,
    output_path: Option<&Path>,
    options: &ExportOptions,
) -> Result<ExportReport> {
    let source_text = read_source(source_path)?;
    let mut report = build_report(&source_text, &source_path.display().to_string(), options)?;
    if let Some(path) = output_path {
        write_csv(path, &report.csv)?;
        report.summary = report.summary.with_output(path.display().to_string());
    }
    Ok(report)
}
