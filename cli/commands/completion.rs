use anyhow::{Context, Result};
use clap::CommandFactory;
use clap_complete::{Shell, generate};
use colored::*;
use std::fs::{self, File};
use std::io;
use std::path::PathBuf;
use compass_export_core::AppError;

use crate::cli_args::{Cli, CompletionArgs};
use crate::output;

/// Conventional per-user completion file for `shell`.
fn completion_file(shell: Shell, bin_name: &str) -> Result<PathBuf> {
    let location = match shell {
        Shell::Fish => dirs::config_dir()
            .map(|p| p.join("fish").join("completions").join(format!("{bin_name}.fish"))),
        Shell::Bash => dirs::data_local_dir().map(|p| {
            p.join("bash-completion")
                .join("completions")
                .join(bin_name)
        }),
        Shell::Zsh => dirs::data_local_dir()
            .map(|p| p.join("zsh").join("site-functions").join(format!("_{bin_name}"))),
        other => {
            return Err(AppError::InvalidArgument(format!(
                "No default completion location for {other}; print to stdout instead."
            ))
            .into());
        }
    };
    location.context("Could not determine the user data directory")
}

pub fn handle_completion_command(args: &CompletionArgs, quiet: bool) -> Result<()> {
    let mut command = Cli::command();
    let bin_name = command.get_name().to_string();

    if !args.save {
        generate(args.shell, &mut command, bin_name, &mut io::stdout());
        return Ok(());
    }

    let save_path = completion_file(args.shell, &bin_name)?;
    if !output::confirm_overwrite(&save_path, "Completion file", quiet)? {
        return Ok(());
    }
    if let Some(dir) = save_path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }
    let mut file = File::create(&save_path)
        .with_context(|| format!("Failed to create file {}", save_path.display()))?;
    generate(args.shell, &mut command, bin_name, &mut file);

    if !quiet {
        println!(
            "{} {} completions saved to: {}",
            "✅".green(),
            args.shell.to_string().cyan(),
            save_path.display().to_string().blue()
        );
    }
    Ok(())
}
