use anyhow::{Context, Result};
use colored::*;
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Table, presets::UTF8_FULL};
use std::io::{self, Write};
use std::path::Path;
use compass_export_core::{
    ExtractionSummary, QuestionRecord, SkippedCandidate, SummaryFormat, csv::record_fields,
    output_formats,
};

use crate::cli_args::FormatOutputOpts;

/// Path relative to the project root when possible, for friendlier messages.
pub fn display_path(project_root: &Path, path: &Path) -> String {
    pathdiff::diff_paths(path, project_root)
        .filter(|p| !p.starts_with(".."))
        .unwrap_or_else(|| path.to_path_buf())
        .display()
        .to_string()
}

pub fn summary_format(format_opts: &FormatOutputOpts) -> Result<SummaryFormat> {
    match format_opts.format.as_deref() {
        Some(name) => Ok(name.parse::<SummaryFormat>()?),
        None => Ok(SummaryFormat::Text),
    }
}

pub fn print_summary(summary: &ExtractionSummary, format_opts: &FormatOutputOpts) -> Result<()> {
    match summary_format(format_opts)? {
        SummaryFormat::Text if colored::control::SHOULD_COLORIZE.should_colorize() => {
            print_summary_pretty(summary);
            Ok(())
        }
        SummaryFormat::Text => write_to_stdout(&summary.to_text()),
        SummaryFormat::Json => {
            let content = output_formats::serialize_to_json(summary, !format_opts.compact)?;
            write_to_stdout(&content)
        }
        SummaryFormat::Yaml => {
            let content = output_formats::serialize_to_yaml(summary)?;
            write_to_stdout(&content)
        }
    }
}

/// Asks before replacing `path`. Quiet mode never overwrites.
pub fn confirm_overwrite(path: &Path, what: &str, quiet: bool) -> Result<bool> {
    if !path.exists() {
        return Ok(true);
    }
    if quiet {
        anyhow::bail!(
            "{} '{}' exists. Overwrite prevented in quiet mode.",
            what,
            path.display()
        );
    }
    print!(
        "{} {} already exists at '{}'. Overwrite? [{}/{}] ",
        "⚠️".yellow(),
        what,
        path.display().to_string().cyan(),
        "y".green(),
        "N".red()
    );
    io::stdout().flush().context("Failed to flush stdout")?;
    let mut response = String::new();
    io::stdin()
        .read_line(&mut response)
        .context("Failed to read user input")?;
    let confirmed = response.trim().eq_ignore_ascii_case("y");
    if !confirmed {
        println!("Save cancelled.");
    }
    Ok(confirmed)
}

pub fn write_to_stdout(content: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(content.as_bytes())
        .context("Failed to write to stdout")?;
    if !content.ends_with('\n') {
        handle
            .write_all(b"\n")
            .context("Failed to write newline to stdout")?;
    }
    handle.flush().context("Failed to flush stdout")?;
    Ok(())
}

fn print_summary_pretty(summary: &ExtractionSummary) {
    println!();
    println!("{}", " Question Export Summary ".green().bold().underline());
    println!("{:<20} {}", "Source:".green(), summary.source.cyan());
    if let Some(output) = &summary.output {
        println!("{:<20} {}", "Output:".green(), output.blue());
    }
    println!(
        "{:<20} {}",
        "Modules found:".green(),
        summary.modules_found.to_string().cyan()
    );
    println!(
        "{:<20} {}",
        "Total questions:".green(),
        summary.total_questions.to_string().cyan()
    );
    for (mode, count) in &summary.by_review_mode {
        println!(
            "{:<20} {}",
            format!("  {}:", mode).green(),
            count.to_string().cyan()
        );
    }

    println!("\n{}", " By Group ".green().bold().underline());
    for (group, count) in &summary.by_group {
        let count = if *count == 0 {
            count.to_string().dimmed()
        } else {
            count.to_string().cyan()
        };
        println!("{:<20} {}", format!("  {}:", group).green(), count);
    }

    if summary.by_module.is_empty() {
        println!("\n{}", "(No questions extracted)".yellow());
    } else {
        println!("\n{}", " By Module ".green().bold().underline());
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![
            Cell::new("Module").fg(Color::Green),
            Cell::new("Questions").fg(Color::Green),
        ]);
        for (module, count) in &summary.by_module {
            table.add_row(vec![
                Cell::new(module).fg(Color::Cyan),
                Cell::new(count).set_alignment(CellAlignment::Right),
            ]);
        }
        println!("{table}");
    }

    if !summary.skipped.is_empty() {
        println!(
            "\n{} {} candidate(s) skipped ({} incomplete, {} before any module).",
            "⚠️".yellow(),
            summary.skipped.len(),
            summary.rejected_count(),
            summary.orphaned_count()
        );
    }
    println!();
}

pub fn print_rows_table(records: &[QuestionRecord]) {
    if records.is_empty() {
        return;
    }
    println!("{}", " Rows ".green().bold().underline());
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        ["Group", "Module", "Question ID", "Review Mode", "Impact", "Question"]
            .into_iter()
            .map(|h| Cell::new(h).fg(Color::Green)),
    );
    for record in records {
        let fields = record_fields(record);
        table.add_row(vec![
            Cell::new(fields[0]),
            Cell::new(fields[1]).fg(Color::Cyan),
            Cell::new(fields[3]),
            Cell::new(fields[4]),
            Cell::new(fields[5]).fg(Color::DarkGrey),
            Cell::new(fields[6]),
        ]);
    }
    println!("{table}");
    println!();
}

pub fn print_skipped_table(skipped: &[SkippedCandidate]) {
    if skipped.is_empty() {
        println!("{}", "(No candidates skipped)".yellow());
        return;
    }
    println!("{}", " Skipped Candidates ".yellow().bold().underline());
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Line").fg(Color::Yellow),
        Cell::new("Question ID").fg(Color::Yellow),
        Cell::new("Reason").fg(Color::Yellow),
    ]);
    for candidate in skipped {
        table.add_row(vec![
            Cell::new(candidate.line).set_alignment(CellAlignment::Right),
            Cell::new(candidate.question_id.as_deref().unwrap_or("?")),
            Cell::new(&candidate.reason),
        ]);
    }
    println!("{table}");
    println!();
}
