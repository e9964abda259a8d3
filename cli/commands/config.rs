use crate::cli_args::ConfigArgs;
use crate::load_config_for_command;
use crate::output;
use anyhow::{Context, Result};
use colored::*;
use std::fs;
use std::io::{self, Write};
use compass_export_core::Config;

pub fn handle_config_command(args: &ConfigArgs, quiet: bool) -> Result<()> {
    let project_root = Config::determine_project_root(args.project_config.project_root.as_ref())
        .context("Failed to determine project root for config command")?;

    let config = if args.effective {
        load_config_for_command(&project_root, &args.project_config, None, None, None)
            .context("Failed to load configuration")?
    } else {
        Config::default()
    };
    let content = config
        .to_toml_string()
        .context("Failed to serialize configuration")?;

    if !args.save {
        print!("{}", content);
        io::stdout().flush().context("Failed to flush stdout")?;
        return Ok(());
    }

    let save_path = Config::default_config_path(&project_root);
    if !output::confirm_overwrite(&save_path, "Config file", quiet)? {
        return Ok(());
    }

    if let Some(parent) = save_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(&save_path, content)
        .with_context(|| format!("Failed to write config file {}", save_path.display()))?;

    if !quiet {
        println!(
            "{} Configuration saved to: {}",
            "✅".green(),
            save_path.display().to_string().blue()
        );
    }
    Ok(())
}
