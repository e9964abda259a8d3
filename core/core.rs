pub mod config;
pub mod csv;
pub mod error;
pub mod export;
pub mod extract;
pub mod model;
pub mod output_formats;
pub mod scan;
pub mod summary;

pub use config::{Config, ExportConfig, SourceConfig, WatchConfig};
pub use csv::{CSV_HEADER, escape_field, render_csv};
pub use error::{AppError, Result};
pub use export::{ExportOptions, ExportReport, build_report, export_questions, read_source, write_csv};
pub use extract::{ExtractOptions, Extraction, Extractor};
pub use model::{
    ModuleGroup, ModulePosition, QuestionBlock, QuestionRecord, ReviewMode, SkipReason,
    SkippedCandidate,
};
pub use output_formats::SummaryFormat;
pub use scan::BraceMatching;
pub use summary::ExtractionSummary;
