//! End-to-end checks of the question export against crafted source files.

use compass_export_core::{
    AppError, BraceMatching, CSV_HEADER, Config, ExportOptions, ExtractOptions, Extractor,
    ModuleGroup, SkipReason, build_report, export_questions,
};
use std::fs;
use tempfile::TempDir;

const FIXTURE: &str = include_str!("fixtures/access_modules.ts");

fn header_line() -> String {
    CSV_HEADER.join(",")
}

fn data_rows(csv: &str) -> Vec<&str> {
    csv.lines().skip(1).collect()
}

fn export_fixture() -> compass_export_core::ExportReport {
    build_report(FIXTURE, "access_modules.ts", &ExportOptions::default())
        .expect("fixture exports cleanly")
}

#[test]
fn every_complete_question_becomes_one_row() {
    let report = export_fixture();
    let lines: Vec<&str> = report.csv.lines().collect();
    assert_eq!(lines[0], header_line());
    assert_eq!(lines.len(), 1 + 6);
    assert_eq!(report.extraction.modules.len(), 5);
}

#[test]
fn questions_are_attributed_to_their_module() {
    let report = export_fixture();
    let attribution: Vec<(&str, &str)> = report
        .extraction
        .questions
        .iter()
        .map(|q| (q.question_id.as_str(), q.module_code.as_str()))
        .collect();
    assert_eq!(
        attribution,
        [
            ("BA-1-1-1", "1.1"),
            ("BA-1-2-1", "1.2"),
            ("BA-1-2-2", "1.2"),
            ("GI-2-1-1", "2.1"),
            ("DV-3-1-1", "3.1"),
            ("SS-4-2-1", "4.2"),
        ]
    );
}

#[test]
fn rows_follow_group_order_then_module_code() {
    let report = export_fixture();
    let groups: Vec<&ModuleGroup> = report.extraction.questions.iter().map(|q| &q.group).collect();
    let mut sorted = groups.clone();
    sorted.sort();
    assert_eq!(groups, sorted);

    let first_columns: Vec<&str> = data_rows(&report.csv)
        .iter()
        .map(|row| row.split(',').next().unwrap_or_default())
        .collect();
    assert_eq!(
        first_columns,
        [
            "Before Arrival",
            "Before Arrival",
            "Before Arrival",
            "Getting In",
            "During Visit",
            "Service & Support"
        ]
    );
}

#[test]
fn escapes_are_cleaned_in_text_and_help_text() {
    let report = export_fixture();
    let staff = report
        .extraction
        .questions
        .iter()
        .find(|q| q.question_id == "SS-4-2-1")
        .unwrap();
    assert_eq!(
        staff.help_text,
        "Training should cover 'hidden' disability, communication and assistance animals."
    );

    let getting_here = report
        .extraction
        .questions
        .iter()
        .find(|q| q.question_id == "BA-1-2-1")
        .unwrap();
    assert_eq!(
        getting_here.help_text,
        "List step-free routes. Include photos where you can."
    );
}

#[test]
fn fields_with_commas_and_quotes_are_quoted() {
    let report = export_fixture();
    let rows = data_rows(&report.csv);
    assert!(rows.contains(
        &"Before Arrival,1.2,Getting here,BA-1-2-1,Pulse Check,medium,\"Does your website describe reception, lifts, and ramps?\",List step-free routes. Include photos where you can."
    ));
    assert!(rows.contains(
        &"Before Arrival,1.2,Getting here,BA-1-2-2,Deep Dive,high,\"Is the \"\"accessible entrance\"\" signposted from the car park?\","
    ));
}

#[test]
fn question_without_review_mode_is_skipped() {
    let report = export_fixture();
    assert!(!report.csv.contains("BA-1-2-3"));
    let skipped = report
        .extraction
        .skipped
        .iter()
        .find(|s| s.question_id.as_deref() == Some("BA-1-2-3"))
        .expect("incomplete question is reported");
    assert_eq!(skipped.reason, SkipReason::MissingFields(vec!["reviewMode"]));
}

#[test]
fn question_before_first_module_is_dropped() {
    let report = export_fixture();
    assert!(!report.csv.contains("DR-0-1"));
    let orphan = report
        .extraction
        .skipped
        .iter()
        .find(|s| s.question_id.as_deref() == Some("DR-0-1"))
        .expect("orphan is reported");
    assert_eq!(orphan.reason, SkipReason::Orphaned);
    assert_eq!(orphan.line, 6);
    assert_eq!(report.summary.orphaned_count(), 1);
}

#[test]
fn empty_source_exports_header_only() {
    for source in ["", "export const accessModules = [];"] {
        let report = build_report(source, "empty.ts", &ExportOptions::default()).unwrap();
        assert_eq!(report.csv, header_line());
        assert_eq!(report.summary.total_questions, 0);
    }
}

#[test]
fn strict_mode_rejects_an_empty_export() {
    let options = ExportOptions {
        strict: true,
        ..ExportOptions::default()
    };
    let err = build_report("const nothing = {};", "empty.ts", &options).unwrap_err();
    assert!(matches!(err, AppError::EmptyExtraction(_)));
}

#[test]
fn naive_brace_matching_truncates_blocks_with_braces_in_strings() {
    let source = r"{ id: 'entrance', code: '2.1', name: 'Entrance', description: 'd', group: 'getting-in',
        questions: [
          { id: 'GI-1', text: 'Is the door marked with a } symbol?', reviewMode: 'deep-dive', impactLevel: 'high' },
        ] }";
    let aware = Extractor::default().extract(source);
    assert_eq!(aware.questions.len(), 1);
    assert_eq!(aware.questions[0].question_text, "Is the door marked with a } symbol?");

    let naive = Extractor::new(ExtractOptions {
        brace_matching: BraceMatching::Naive,
        ..ExtractOptions::default()
    })
    .extract(source);
    assert!(naive.questions.is_empty());
    assert_eq!(
        naive.skipped[0].reason,
        SkipReason::MissingFields(vec!["text", "reviewMode", "impactLevel"])
    );
}

#[test]
fn export_writes_csv_and_overwrites_previous_output() {
    let dir = TempDir::new().unwrap();
    let source_path = dir.path().join("src/data/accessModules.ts");
    fs::create_dir_all(source_path.parent().unwrap()).unwrap();
    fs::write(&source_path, FIXTURE).unwrap();

    let output_path = dir.path().join("exports/nested/questions.csv");
    let report = export_questions(&source_path, Some(output_path.as_path()), &ExportOptions::default())
        .unwrap();
    let written = fs::read_to_string(&output_path).unwrap();
    assert_eq!(written, report.csv);
    assert_eq!(
        report.summary.output.as_deref(),
        Some(output_path.display().to_string().as_str())
    );

    fs::write(&source_path, "").unwrap();
    export_questions(&source_path, Some(output_path.as_path()), &ExportOptions::default()).unwrap();
    assert_eq!(fs::read_to_string(&output_path).unwrap(), header_line());
}

#[test]
fn missing_source_is_a_read_error() {
    let dir = TempDir::new().unwrap();
    let err = export_questions(
        &dir.path().join("nope.ts"),
        None,
        &ExportOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, AppError::FileRead { .. }));
}

#[test]
fn config_values_flow_into_export_options() {
    let config = Config::from_toml_str(
        "[export]\nwindow_size = 40\nhelp_text_limit = 10\nbrace_matching = \"naive\"\nstrict = true",
    )
    .unwrap();
    let options = ExportOptions::from(&config.export);
    assert!(options.strict);
    assert_eq!(options.extract.window_size, 40);
    assert_eq!(options.extract.help_text_limit, 10);
    assert_eq!(options.extract.brace_matching, BraceMatching::Naive);
}
