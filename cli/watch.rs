use crate::cli_args::WatchArgs;
use crate::commands::export::{ExportTarget, trigger_export};
use crate::load_config_for_command;
use crate::output::display_path;
use anyhow::{Context, Result};
use colored::*;
use log;
use notify::{ErrorKind, RecommendedWatcher};
use notify_debouncer_mini::{DebounceEventResult, DebouncedEvent, Debouncer, new_debouncer};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use compass_export_core::Config;

/// Files whose changes trigger a re-export.
struct WatchTargets {
    source: PathBuf,
    /// The config file in use, or the default location while none exists yet.
    config: Option<PathBuf>,
}

impl WatchTargets {
    fn resolve(project_root: &Path, config: &Config, args: &WatchArgs) -> Result<Self> {
        let opts = &args.project_config;
        let config_path =
            Config::resolve_config_path(project_root, opts.config_file.as_ref(), opts.disable_config_file)?
                .or_else(|| {
                    (!opts.disable_config_file).then(|| Config::default_config_path(project_root))
                });
        Ok(Self {
            source: canonical_or_self(&config.resolve_source_path(project_root)),
            config: config_path.as_deref().map(canonical_or_self),
        })
    }

    /// Editors often replace files on save, so directories are watched. A
    /// directory that does not exist yet is covered by its nearest existing ancestor.
    fn directories(&self) -> HashSet<PathBuf> {
        std::iter::once(&self.source)
            .chain(self.config.iter())
            .filter_map(|p| p.ancestors().skip(1).find(|dir| dir.is_dir()))
            .map(Path::to_path_buf)
            .collect()
    }

    fn touches_source(&self, events: &[DebouncedEvent]) -> bool {
        events.iter().any(|e| same_file(&e.path, &self.source))
    }

    /// True for events on the config file or on its directory.
    fn touches_config(&self, events: &[DebouncedEvent]) -> bool {
        self.config.as_ref().is_some_and(|config| {
            events.iter().any(|e| {
                same_file(&e.path, config) || config.parent().is_some_and(|dir| dir == e.path)
            })
        })
    }
}

fn canonical_or_self(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

fn same_file(event_path: &Path, target: &Path) -> bool {
    event_path == target || canonical_or_self(event_path) == target
}

fn sync_watches(
    watcher: &mut Debouncer<RecommendedWatcher>,
    wanted: HashSet<PathBuf>,
    watched: &mut HashSet<PathBuf>,
    quiet: bool,
) {
    for path in watched.difference(&wanted).cloned().collect::<Vec<_>>() {
        match watcher.watcher().unwatch(&path) {
            Ok(_) => log::trace!("Unwatched: {}", path.display()),
            Err(e) => match e.kind {
                ErrorKind::WatchNotFound => {
                    log::trace!("Watch not found for {}, removing.", path.display())
                }
                _ => log::warn!("Failed to unwatch {}: {}", path.display(), e),
            },
        }
        watched.remove(&path);
    }

    for path in wanted {
        if watched.contains(&path) {
            continue;
        }
        if !path.exists() {
            log::warn!("Skipping watch for non-existent path: {}", path.display());
            continue;
        }
        match watcher
            .watcher()
            .watch(&path, notify::RecursiveMode::NonRecursive)
        {
            Ok(_) => {
                log::debug!("Watching: {}", path.display());
                watched.insert(path);
            }
            Err(e) => {
                if !quiet {
                    eprintln!("{} Failed to watch {}: {}", "⚠️".yellow(), path.display(), e);
                }
                log::warn!("Failed to watch {}: {}", path.display(), e);
            }
        }
    }
}

fn run_export(project_root: &Path, config: &Config, quiet: bool, verbose: u8, what: &str) {
    let target = ExportTarget::File(config.resolve_output_path(project_root));
    match trigger_export(project_root, config, &target) {
        Ok(report) => {
            if !quiet {
                println!(
                    "{} {} complete: {} questions written to {}",
                    "✅".green(),
                    what,
                    report.summary.total_questions.to_string().cyan(),
                    report
                        .summary
                        .output
                        .as_deref()
                        .unwrap_or_default()
                        .blue()
                );
                if verbose > 0 && !report.summary.skipped.is_empty() {
                    println!(
                        "   {} candidate(s) skipped.",
                        report.summary.skipped.len().to_string().yellow()
                    );
                }
            }
        }
        Err(e) => {
            if !quiet {
                eprintln!("{} {:#}\n", format!("⚠️ Error during {}:", what).yellow(), e);
            }
            log::error!("{} failed: {:#}", what, e);
        }
    }
}

pub fn run_watch_mode(watch_args: WatchArgs, quiet: bool, verbose: u8) -> Result<()> {
    let project_root =
        Config::determine_project_root(watch_args.project_config.project_root.as_ref())
            .context("Failed to determine project root for watch mode")?;

    let load = || {
        load_config_for_command(
            &project_root,
            &watch_args.project_config,
            Some(&watch_args.extraction),
            watch_args.output.as_ref(),
            watch_args.watch_delay.as_ref(),
        )
    };

    let mut config = load().context("Failed to load initial configuration for watch mode")?;
    let mut targets = WatchTargets::resolve(&project_root, &config, &watch_args)?;

    if !quiet {
        println!(
            "👀 Watching '{}' for changes. Press Ctrl+C to exit.",
            display_path(&project_root, &targets.source)
        );
    }

    run_export(&project_root, &config, quiet, verbose, "Initial export");

    let (tx, rx) = mpsc::channel::<DebounceEventResult>();
    let mut delay = config
        .get_watch_delay()
        .context("Invalid watch delay duration")?;
    let mut debouncer = new_debouncer(delay, tx.clone())
        .map_err(|e| anyhow::anyhow!("Failed to create debouncer: {}", e))?;
    let mut watched_dirs = HashSet::new();
    sync_watches(&mut debouncer, targets.directories(), &mut watched_dirs, quiet);

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                for event in &events {
                    log::trace!("Debounced event: {:?}", event);
                }

                if targets.touches_config(&events) {
                    if !quiet && verbose > 0 {
                        eprintln!("{}", "🔄 Config changed. Reloading configuration...".blue());
                    }
                    let reloaded = match load() {
                        Ok(reloaded) => reloaded,
                        Err(e) => {
                            if !quiet {
                                eprintln!("{} {:#}\n", "⚠️ Error reloading config:".yellow(), e);
                            }
                            continue;
                        }
                    };
                    config = reloaded;
                    match WatchTargets::resolve(&project_root, &config, &watch_args) {
                        Ok(resolved) => targets = resolved,
                        Err(e) => log::warn!("Keeping previous watch targets: {:#}", e),
                    }

                    match config.get_watch_delay() {
                        Ok(new_delay) if new_delay != delay => {
                            match new_debouncer(new_delay, tx.clone()) {
                                Ok(rebuilt) => {
                                    log::info!("Watch delay changed from {:?} to {:?}.", delay, new_delay);
                                    debouncer = rebuilt;
                                    delay = new_delay;
                                    watched_dirs.clear();
                                }
                                Err(e) => log::warn!("Keeping previous debouncer: {}", e),
                            }
                        }
                        Ok(_) => {}
                        Err(e) => log::warn!("Keeping watch delay {:?}: {:#}", delay, e),
                    }
                    sync_watches(&mut debouncer, targets.directories(), &mut watched_dirs, quiet);
                    run_export(&project_root, &config, quiet, verbose, "Re-export");
                } else if targets.touches_source(&events) {
                    if !quiet && verbose > 0 {
                        eprintln!("{}", "🔄 Source changed. Re-exporting...".blue());
                    }
                    run_export(&project_root, &config, quiet, verbose, "Re-export");
                } else {
                    log::trace!("Ignoring {} unrelated event(s).", events.len());
                }
            }
            Ok(Err(error)) => {
                if !quiet {
                    eprintln!("{} {:#}\n", "⚠️ Watch error:".yellow(), error);
                }
                log::error!("Notify error received: {:?}", error);
            }
            Err(e) => {
                eprintln!("{} {:#}\n", "⛔ Watcher channel error:".red(), e);
                break Ok(());
            }
        }
    }
}
