use crate::config::ExportConfig;
use crate::model::{
    ModulePosition, QuestionBlock, QuestionRecord, ReviewMode, SkipReason, SkippedCandidate,
};
use crate::scan::{self, BraceMatching, RawQuestion};
use log;

pub const DEFAULT_WINDOW_SIZE: usize = 3000;
pub const DEFAULT_HELP_TEXT_LIMIT: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    pub window_size: usize,
    pub help_text_limit: usize,
    pub brace_matching: BraceMatching,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            help_text_limit: DEFAULT_HELP_TEXT_LIMIT,
            brace_matching: BraceMatching::default(),
        }
    }
}

impl From<&ExportConfig> for ExtractOptions {
    fn from(config: &ExportConfig) -> Self {
        Self {
            window_size: config.window_size,
            help_text_limit: config.help_text_limit,
            brace_matching: config.brace_matching,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub modules: Vec<ModulePosition>,
    /// Sorted by group display order, then module code.
    pub questions: Vec<QuestionRecord>,
    pub skipped: Vec<SkippedCandidate>,
}

#[derive(Debug, Clone, Default)]
pub struct Extractor {
    options: ExtractOptions,
}

impl Extractor {
    pub fn new(options: ExtractOptions) -> Self {
        Self { options }
    }

    pub fn extract(&self, source: &str) -> Extraction {
        let modules = scan::scan_modules(source);
        let mut skipped = Vec::new();

        let mut blocks = Vec::new();
        for (position, candidate_id) in scan::scan_question_starts(source) {
            match self.parse_candidate(source, position) {
                Ok(block) => blocks.push(block),
                Err(reason) => {
                    let line = scan::line_of(source, position);
                    log::warn!(
                        "Skipping question {} (line {}): {}",
                        candidate_id,
                        line,
                        reason
                    );
                    skipped.push(SkippedCandidate {
                        question_id: Some(candidate_id),
                        position,
                        line,
                        reason,
                    });
                }
            }
        }
        log::debug!(
            "{} question blocks accepted, {} rejected.",
            blocks.len(),
            skipped.len()
        );

        let (mut questions, orphans) = assign_modules(blocks, &modules);
        for orphan in orphans {
            let line = scan::line_of(source, orphan.position);
            log::warn!(
                "Question {} (line {}) appears before any module and was dropped.",
                orphan.id,
                line
            );
            skipped.push(SkippedCandidate {
                question_id: Some(orphan.id),
                position: orphan.position,
                line,
                reason: SkipReason::Orphaned,
            });
        }

        sort_records(&mut questions);
        log::info!(
            "Extracted {} questions across {} modules.",
            questions.len(),
            modules.len()
        );

        Extraction {
            modules,
            questions,
            skipped,
        }
    }

    fn parse_candidate(&self, source: &str, position: usize) -> Result<QuestionBlock, SkipReason> {
        let block = scan::block_at(
            source,
            position,
            self.options.window_size,
            self.options.brace_matching,
        );
        parse_question_block(block, position, self.options.help_text_limit)
    }
}

/// Builds a question from one literal body, or names the required fields it lacks.
pub fn parse_question_block(
    block: &str,
    position: usize,
    help_text_limit: usize,
) -> Result<QuestionBlock, SkipReason> {
    let raw = RawQuestion::capture(block);
    match (raw.id, raw.text, raw.review_mode, raw.impact_level) {
        (Some(id), Some(text), Some(review_mode), Some(impact_level)) => Ok(QuestionBlock {
            id: id.to_string(),
            text: scan::clean_text(text),
            help_text: raw
                .help_text
                .map(|help| scan::clean_text(&scan::truncate_chars(help, help_text_limit)))
                .unwrap_or_default(),
            review_mode: ReviewMode::from_source_value(review_mode),
            impact_level: impact_level.to_string(),
            position,
        }),
        _ => Err(SkipReason::MissingFields(raw.missing_fields())),
    }
}

/// Attaches each question to the nearest module that starts before it.
///
/// `modules` must be in source order. Questions preceding every module are
/// returned separately.
pub fn assign_modules(
    blocks: Vec<QuestionBlock>,
    modules: &[ModulePosition],
) -> (Vec<QuestionRecord>, Vec<QuestionBlock>) {
    let mut records = Vec::with_capacity(blocks.len());
    let mut orphans = Vec::new();
    for block in blocks {
        let preceding = modules.partition_point(|m| m.position < block.position);
        match preceding.checked_sub(1).map(|idx| &modules[idx]) {
            Some(module) => {
                log::trace!("Question {} belongs to module {}.", block.id, module.code);
                records.push(QuestionRecord::new(block, module));
            }
            None => orphans.push(block),
        }
    }
    (records, orphans)
}

/// Stable sort: group display order, then module code; source order otherwise.
pub fn sort_records(records: &mut [QuestionRecord]) {
    records.sort_by(|a, b| {
        a.group
            .cmp(&b.group)
            .then_with(|| a.module_code.cmp(&b.module_code))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModuleGroup;

    fn module(code: &str, group: ModuleGroup, position: usize) -> ModulePosition {
        ModulePosition {
            id: code.to_lowercase(),
            code: code.to_string(),
            name: format!("Module {}", code),
            group,
            position,
        }
    }

    fn block(id: &str, position: usize) -> QuestionBlock {
        QuestionBlock {
            id: id.to_string(),
            text: "Question?".to_string(),
            help_text: String::new(),
            review_mode: ReviewMode::DeepDive,
            impact_level: "medium".to_string(),
            position,
        }
    }

    #[test]
    fn assigns_nearest_preceding_module() {
        let modules = vec![
            module("1.1", ModuleGroup::BeforeArrival, 10),
            module("1.2", ModuleGroup::BeforeArrival, 100),
        ];
        let (records, orphans) = assign_modules(
            vec![block("A-1", 50), block("A-2", 150), block("A-3", 100)],
            &modules,
        );
        assert!(orphans.is_empty());
        let codes: Vec<&str> = records.iter().map(|r| r.module_code.as_str()).collect();
        // A question at exactly a module's offset belongs to the previous module.
        assert_eq!(codes, ["1.1", "1.2", "1.1"]);
    }

    #[test]
    fn questions_before_first_module_are_orphans() {
        let modules = vec![module("1.1", ModuleGroup::BeforeArrival, 10)];
        let (records, orphans) = assign_modules(vec![block("A-1", 5)], &modules);
        assert!(records.is_empty());
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].id, "A-1");
    }

    #[test]
    fn sort_is_stable_within_module() {
        let modules = vec![
            module("4.1", ModuleGroup::ServiceSupport, 0),
            module("1.2", ModuleGroup::BeforeArrival, 10),
            module("1.1", ModuleGroup::BeforeArrival, 20),
        ];
        let (mut records, _) = assign_modules(
            vec![
                block("S-1", 5),
                block("B-2", 15),
                block("B-3", 16),
                block("B-1", 25),
            ],
            &modules,
        );
        sort_records(&mut records);
        let ids: Vec<&str> = records.iter().map(|r| r.question_id.as_str()).collect();
        assert_eq!(ids, ["B-1", "B-2", "B-3", "S-1"]);
    }

    #[test]
    fn module_codes_compare_as_strings() {
        let modules = vec![
            module("10.1", ModuleGroup::GettingIn, 0),
            module("9.1", ModuleGroup::GettingIn, 10),
        ];
        let (mut records, _) =
            assign_modules(vec![block("G-9", 15), block("G-10", 5)], &modules);
        sort_records(&mut records);
        let codes: Vec<&str> = records.iter().map(|r| r.module_code.as_str()).collect();
        assert_eq!(codes, ["10.1", "9.1"]);
    }

    #[test]
    fn help_text_is_optional_and_truncated() {
        let long_help = "x".repeat(20);
        let body = format!(
            "id: 'D-1', text: 'Text', helpText: '{}', reviewMode: 'pulse-check', impactLevel: 'low'",
            long_help
        );
        let parsed = parse_question_block(&body, 0, 8).unwrap();
        assert_eq!(parsed.help_text, "xxxxxxxx");
        assert_eq!(parsed.review_mode, ReviewMode::PulseCheck);

        let without_help =
            parse_question_block("id: 'D-2', text: 'T', reviewMode: 'x', impactLevel: 'y'", 0, 8)
                .unwrap();
        assert_eq!(without_help.help_text, "");
    }

    #[test]
    fn help_text_is_truncated_before_unescaping() {
        let escaped_breaks = r"\n".repeat(300);
        let body = format!(
            "id: 'D-4', text: 'T', helpText: '{}', reviewMode: 'deep-dive', impactLevel: 'low'",
            escaped_breaks
        );
        let parsed = parse_question_block(&body, 0, 500).unwrap();
        assert_eq!(parsed.help_text, " ".repeat(250));

        let split_escape = parse_question_block(
            r"id: 'D-5', text: 'T', helpText: 'ab\'cd', reviewMode: 'x', impactLevel: 'y'",
            0,
            3,
        )
        .unwrap();
        assert_eq!(split_escape.help_text, "ab\\");
    }

    #[test]
    fn missing_review_mode_is_reported() {
        let err = parse_question_block("id: 'D-3', text: 'T', impactLevel: 'high'", 0, 500)
            .unwrap_err();
        assert_eq!(err, SkipReason::MissingFields(vec!["reviewMode"]));
    }

    #[test]
    fn extract_runs_the_whole_pipeline() {
        let source = r"
        { id: 'intro', code: '1.1', name: 'Intro', description: 'd', group: 'before-arrival',
          questions: [
            { id: 'BA-1', text: 'First', reviewMode: 'pulse-check', impactLevel: 'high' },
            { id: 'BA-2', text: 'Broken', impactLevel: 'high' },
          ] }";
        let extraction = Extractor::default().extract(source);
        assert_eq!(extraction.modules.len(), 1);
        assert_eq!(extraction.questions.len(), 1);
        assert_eq!(extraction.questions[0].question_id, "BA-1");
        assert_eq!(extraction.skipped.len(), 1);
        assert_eq!(extraction.skipped[0].question_id.as_deref(), Some("BA-2"));
        assert_eq!(extraction.skipped[0].line, 5);
    }
}
