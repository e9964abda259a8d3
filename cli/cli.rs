mod cli_args;
mod commands;
mod output;
mod watch;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use colored::*;
use log;
use std::path::{Path, PathBuf};
use std::process;

use cli_args::{Cli, Commands, ExtractionOpts, ProjectConfigOpts};
use compass_export_core::{AppError, BraceMatching, Config};

fn main() {
    let cli_args = Cli::parse();

    setup_logging(cli_args.quiet, cli_args.verbose);

    let quiet = cli_args.quiet;
    let verbose = cli_args.verbose;

    log::debug!("CLI args parsed: {:?}", cli_args);

    let exit_code = match run_app(cli_args, quiet, verbose) {
        Ok(_) => {
            log::info!("Application finished successfully.");
            0
        }
        Err(e) => {
            let exit_code = exit_code_for(&e);

            // Config and argument errors are shown even in quiet mode.
            if !quiet || exit_code == 1 || exit_code == 5 {
                eprintln!("{} {:#}", "Error:".red().bold(), e);
            } else {
                log::error!("Application failed: {:#}", e);
            }

            exit_code
        }
    };
    log::debug!("Exiting with code {}", exit_code);
    process::exit(exit_code);
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<AppError>() {
        Some(AppError::Config(_)) => 1,
        Some(AppError::TomlParse(_)) => 1,
        Some(AppError::TomlSerialize(_)) => 1,
        Some(AppError::Io(_)) => 2,
        Some(AppError::FileRead { .. }) => 2,
        Some(AppError::FileWrite { .. }) => 2,
        Some(AppError::DirCreation { .. }) => 2,
        Some(AppError::EmptyExtraction(_)) => 3,
        Some(AppError::InvalidArgument(_)) => 5,
        Some(AppError::DurationParse(_)) => 5,
        Some(AppError::JsonSerialize(_)) => 6,
        Some(AppError::YamlError(_)) => 6,
        Some(_) => 1,
        None => 1,
    }
}

fn setup_logging(quiet: bool, verbose: u8) {
    let log_level = if quiet {
        log::LevelFilter::Off
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();
    log::trace!("Logger initialized with level: {:?}", log_level);
}

fn run_app(cli: Cli, quiet: bool, verbose: u8) -> Result<()> {
    match cli.command {
        None => {
            Cli::command().print_help()?;
        }
        Some(command) => match command {
            Commands::Export(args) => {
                log::debug!("Executing 'export' command...");
                commands::export::handle_export_command(args, quiet)?;
            }
            Commands::Summary(args) => {
                log::debug!("Executing 'summary' command...");
                commands::summary::handle_summary_command(args, quiet)?;
            }
            Commands::Watch(args) => {
                log::debug!("Executing 'watch' command...");
                watch::run_watch_mode(args, quiet, verbose)?;
            }
            Commands::Config(args) => {
                log::debug!("Executing 'config' command...");
                commands::config::handle_config_command(&args, quiet)?;
            }
            Commands::Completion(args) => {
                log::debug!("Executing 'completion' command...");
                commands::completion::handle_completion_command(&args, quiet)?;
            }
        },
    }
    Ok(())
}

fn apply_extraction_overrides(mut config: Config, opts: &ExtractionOpts) -> Config {
    log::trace!("Applying extraction CLI overrides to config...");

    if let Some(source) = &opts.source {
        config.source.path = source.clone();
    }
    if let Some(window_size) = opts.window_size {
        config.export.window_size = window_size;
    }
    if let Some(limit) = opts.help_text_limit {
        config.export.help_text_limit = limit;
    }
    if opts.naive_braces {
        config.export.brace_matching = BraceMatching::Naive;
    }
    if opts.quote_aware_braces {
        config.export.brace_matching = BraceMatching::QuoteAware;
    }
    if opts.strict {
        config.export.strict = true;
    }

    log::trace!("Config after CLI overrides: {:?}", config);
    config
}

/// Loads the config file (if any) and layers CLI overrides on top.
pub fn load_config_for_command(
    project_root: &Path,
    project_opts: &ProjectConfigOpts,
    extraction_opts: Option<&ExtractionOpts>,
    output_override: Option<&PathBuf>,
    watch_delay: Option<&String>,
) -> Result<Config> {
    let config_path = Config::resolve_config_path(
        project_root,
        project_opts.config_file.as_ref(),
        project_opts.disable_config_file,
    )
    .context("Failed to resolve configuration path")?;

    let mut config = match &config_path {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(opts) = extraction_opts {
        config = apply_extraction_overrides(config, opts);
    }
    if let Some(output) = output_override {
        config.export.output_path = output.clone();
    }
    if let Some(delay) = watch_delay {
        config.watch.delay = delay.clone();
    }

    config.validate().context("Invalid configuration")?;

    config.general.project_name = Some(config.get_effective_project_name(project_root));

    Ok(config)
}
