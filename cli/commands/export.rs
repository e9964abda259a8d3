use crate::cli_args::ExportArgs;
use crate::load_config_for_command;
use crate::output;
use anyhow::{Context, Result};
use log;
use std::path::{Path, PathBuf};
use compass_export_core::{self as core, Config, ExportOptions, ExportReport};

/// Where the rendered CSV goes.
#[derive(Debug, Clone)]
pub enum ExportTarget {
    File(PathBuf),
    Stdout,
}

pub fn handle_export_command(args: ExportArgs, quiet: bool) -> Result<()> {
    let project_root = Config::determine_project_root(args.project_config.project_root.as_ref())
        .context("Failed to determine project root")?;
    log::info!("Project root determined: {}", project_root.display());

    let config = load_config_for_command(
        &project_root,
        &args.project_config,
        Some(&args.extraction),
        args.output.as_ref(),
        None,
    )
    .context("Failed to load configuration")?;

    let target = if args.stdout {
        ExportTarget::Stdout
    } else {
        ExportTarget::File(config.resolve_output_path(&project_root))
    };

    let report = trigger_export(&project_root, &config, &target)?;

    // With --stdout the CSV itself is the output; the summary would corrupt it.
    if !quiet && matches!(target, ExportTarget::File(_)) {
        output::print_summary(&report.summary, &args.format_output)?;
    }
    Ok(())
}

/// Runs one export with the given config. Shared with watch mode.
pub fn trigger_export(
    project_root: &Path,
    config: &Config,
    target: &ExportTarget,
) -> Result<ExportReport> {
    let source_path = config.resolve_source_path(project_root);
    let output_path = match target {
        ExportTarget::File(path) => Some(path.as_path()),
        ExportTarget::Stdout => None,
    };
    log::info!(
        "Exporting questions from {}",
        output::display_path(project_root, &source_path)
    );

    let mut report = core::export_questions(
        &source_path,
        output_path,
        &ExportOptions::from(&config.export),
    )
    .with_context(|| format!("Question export from {} failed", source_path.display()))?;

    report.summary.source = output::display_path(project_root, &source_path);
    match output_path {
        Some(path) => report.summary.output = Some(output::display_path(project_root, path)),
        None => output::write_to_stdout(&report.csv)?,
    }
    Ok(report)
}
