use crate::cli_args::SummaryArgs;
use crate::load_config_for_command;
use crate::output;
use anyhow::{Context, Result};
use log;
use compass_export_core::{self as core, Config, ExportOptions, SummaryFormat};

pub fn handle_summary_command(args: SummaryArgs, quiet: bool) -> Result<()> {
    let project_root = Config::determine_project_root(args.project_config.project_root.as_ref())
        .context("Failed to determine project root")?;
    log::info!("Project root determined: {}", project_root.display());

    let config = load_config_for_command(
        &project_root,
        &args.project_config,
        Some(&args.extraction),
        None,
        None,
    )
    .context("Failed to load configuration for summary command")?;

    let source_path = config.resolve_source_path(&project_root);
    let mut report =
        core::export_questions(&source_path, None, &ExportOptions::from(&config.export))
            .with_context(|| format!("Question extraction from {} failed", source_path.display()))?;
    report.summary.source = output::display_path(&project_root, &source_path);
    log::debug!("Dry run complete; nothing written.");

    if quiet {
        return Ok(());
    }

    output::print_summary(&report.summary, &args.format_output)?;

    let is_text = output::summary_format(&args.format_output)? == SummaryFormat::Text;
    if is_text && args.rows {
        output::print_rows_table(&report.extraction.questions);
    }
    if is_text && args.skipped {
        output::print_skipped_table(&report.summary.skipped);
    }
    Ok(())
}
