use crate::extract::Extraction;
use crate::model::{GROUP_ORDER, ReviewMode, SkipReason, SkippedCandidate};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

/// Informational run summary printed after an export.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionSummary {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    pub modules_found: usize,
    pub total_questions: usize,
    pub by_review_mode: IndexMap<String, usize>,
    pub by_group: IndexMap<String, usize>,
    /// Keyed "CODE - Name", in export row order.
    pub by_module: IndexMap<String, usize>,
    pub skipped: Vec<SkippedCandidate>,
    pub generated_at: DateTime<Utc>,
}

impl ExtractionSummary {
    pub fn from_extraction(extraction: &Extraction, source: impl Into<String>) -> Self {
        let mut by_review_mode: IndexMap<String, usize> = [ReviewMode::PulseCheck, ReviewMode::DeepDive]
            .iter()
            .map(|mode| (mode.label().to_string(), 0))
            .collect();
        let mut by_group: IndexMap<String, usize> = GROUP_ORDER
            .iter()
            .map(|group| (group.label().to_string(), 0))
            .collect();
        let mut by_module: IndexMap<String, usize> = IndexMap::new();

        for record in &extraction.questions {
            *by_review_mode
                .entry(record.review_mode.label().to_string())
                .or_default() += 1;
            *by_group.entry(record.group.label().to_string()).or_default() += 1;
            *by_module.entry(record.module_key()).or_default() += 1;
        }

        Self {
            source: source.into(),
            output: None,
            modules_found: extraction.modules.len(),
            total_questions: extraction.questions.len(),
            by_review_mode,
            by_group,
            by_module,
            skipped: extraction.skipped.clone(),
            generated_at: Utc::now(),
        }
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn orphaned_count(&self) -> usize {
        self.skipped
            .iter()
            .filter(|s| s.reason == SkipReason::Orphaned)
            .count()
    }

    pub fn rejected_count(&self) -> usize {
        self.skipped.len() - self.orphaned_count()
    }

    /// Plain-text rendition used when colours and tables are not wanted.
    pub fn to_text(&self) -> String {
        let mut lines = vec![
            format!("Source: {}", self.source),
            format!("Modules found: {}", self.modules_found),
            format!("Total questions: {}", self.total_questions),
        ];
        if let Some(output) = &self.output {
            lines.push(format!("Output: {}", output));
        }
        lines.push("By review mode:".to_string());
        lines.extend(
            self.by_review_mode
                .iter()
                .map(|(mode, count)| format!("  {}: {}", mode, count)),
        );
        lines.push("By group:".to_string());
        lines.extend(
            self.by_group
                .iter()
                .map(|(group, count)| format!("  {}: {}", group, count)),
        );
        lines.push("By module:".to_string());
        lines.extend(
            self.by_module
                .iter()
                .map(|(module, count)| format!("  {}: {}", module, count)),
        );
        if !self.skipped.is_empty() {
            lines.push(format!(
                "Skipped: {} ({} incomplete, {} before any module)",
                self.skipped.len(),
                self.rejected_count(),
                self.orphaned_count()
            ));
        }
        lines.join("\n")
    }
}
