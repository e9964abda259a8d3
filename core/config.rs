use crate::error::{AppError, Result};
use crate::extract::{DEFAULT_HELP_TEXT_LIMIT, DEFAULT_WINDOW_SIZE};
use crate::scan::BraceMatching;
use log;
use parse_duration::parse;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_DIR: &str = ".compass";
pub const DEFAULT_CONFIG_FILENAME: &str = "compass-export.toml";
pub const DEFAULT_SOURCE_PATH: &str = "src/data/accessModules.ts";
pub const DEFAULT_OUTPUT_PATH: &str = "exports/questions.csv";
pub const DEFAULT_WATCH_DELAY: &str = "300ms";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub watch: WatchConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    #[serde(default)]
    pub project_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    #[serde(default = "default_source_path")]
    pub path: PathBuf,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ExportConfig {
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    #[serde(default = "default_help_text_limit")]
    pub help_text_limit: usize,
    #[serde(default)]
    pub brace_matching: BraceMatching,
    #[serde(default = "default_false")]
    pub strict: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct WatchConfig {
    #[serde(default = "default_watch_delay_string")]
    pub delay: String,
}

fn default_false() -> bool {
    false
}
fn default_source_path() -> PathBuf {
    PathBuf::from(DEFAULT_SOURCE_PATH)
}
fn default_output_path() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_PATH)
}
fn default_window_size() -> usize {
    DEFAULT_WINDOW_SIZE
}
fn default_help_text_limit() -> usize {
    DEFAULT_HELP_TEXT_LIMIT
}
fn default_watch_delay_string() -> String {
    DEFAULT_WATCH_DELAY.to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: default_source_path(),
        }
    }
}
impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_path: default_output_path(),
            window_size: default_window_size(),
            help_text_limit: default_help_text_limit(),
            brace_matching: BraceMatching::default(),
            strict: default_false(),
        }
    }
}
impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            delay: default_watch_delay_string(),
        }
    }
}

impl Config {
    pub fn determine_project_root(cli_project_root: Option<&PathBuf>) -> Result<PathBuf> {
        let path_str_opt = cli_project_root
            .map(|p| p.to_string_lossy().to_string())
            .or_else(|| env::var("PROJECT_ROOT").ok().filter(|s| !s.is_empty()));

        let path_to_resolve = match path_str_opt {
            Some(p_str) => PathBuf::from(shellexpand::tilde(&p_str).as_ref()),
            None => env::current_dir().map_err(AppError::Io)?,
        };

        path_to_resolve.canonicalize().map_err(|e| {
            AppError::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to canonicalize project root '{}': {}",
                    path_to_resolve.display(),
                    e
                ),
            ))
        })
    }

    /// Locates the config file. A value that looks like a path is used as is;
    /// a bare name is looked up inside the default config directory.
    pub fn resolve_config_path(
        project_root: &Path,
        cli_config_file: Option<&String>,
        cli_disable_config: bool,
    ) -> Result<Option<PathBuf>> {
        if cli_disable_config {
            log::debug!("Config file loading disabled via CLI flag.");
            return Ok(None);
        }

        let path_to_check = match cli_config_file {
            Some(p_str) => {
                let mut path = PathBuf::from(shellexpand::tilde(p_str).as_ref());
                let looks_like_path = path.is_absolute()
                    || path.components().count() > 1
                    || p_str.contains(['/', '\\']);

                if looks_like_path {
                    if !path.exists() && path.extension().is_none() {
                        path.set_extension("toml");
                    }
                    if !path.exists() {
                        return Err(AppError::Config(format!(
                            "Specified config file not found at path: {}",
                            path.display()
                        )));
                    }
                    log::debug!("Using specified config file path: {}", path.display());
                    Some(path)
                } else {
                    let filename = if path.extension().is_none_or(|e| e != "toml") {
                        format!("{}.toml", path.to_string_lossy())
                    } else {
                        path.to_string_lossy().to_string()
                    };
                    let config_dir = project_root.join(DEFAULT_CONFIG_DIR);
                    let full_path = config_dir.join(filename);
                    if !full_path.exists() {
                        return Err(AppError::Config(format!(
                            "Specified config file '{}' not found in default directory: {}",
                            path.display(),
                            config_dir.display()
                        )));
                    }
                    log::debug!(
                        "Using specified config filename in default directory: {}",
                        full_path.display()
                    );
                    Some(full_path)
                }
            }
            None => {
                let default_path = Self::default_config_path(project_root);
                if default_path.exists() {
                    log::debug!("Using default config file path: {}", default_path.display());
                    Some(default_path)
                } else {
                    log::debug!(
                        "No config file specified and default not found at: {}",
                        default_path.display()
                    );
                    None
                }
            }
        };
        Ok(path_to_check)
    }

    pub fn default_config_path(project_root: &Path) -> PathBuf {
        project_root
            .join(DEFAULT_CONFIG_DIR)
            .join(DEFAULT_CONFIG_FILENAME)
    }

    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        log::info!("Loading configuration from: {}", config_path.display());
        let toml_content = fs::read_to_string(config_path).map_err(|e| AppError::FileRead {
            path: config_path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&toml_content).map_err(|e| match e {
            AppError::TomlParse(msg) => AppError::TomlParse(format!(
                "Error parsing config file '{}': {}. Check TOML syntax and structure.",
                config_path.display(),
                msg
            )),
            other => other,
        })
    }

    pub fn from_toml_str(toml_content: &str) -> Result<Self> {
        let config = toml::from_str::<Config>(toml_content)
            .map_err(|e| AppError::TomlParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.export.window_size == 0 {
            return Err(AppError::InvalidArgument(
                "export.window_size must be greater than 0".to_string(),
            ));
        }
        if self.export.help_text_limit == 0 {
            return Err(AppError::InvalidArgument(
                "export.help_text_limit must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn get_watch_delay(&self) -> Result<Duration> {
        parse(&self.watch.delay).map_err(|e| {
            AppError::DurationParse(format!(
                "Invalid watch delay duration '{}': {}. Use format like '500ms', '2s'.",
                self.watch.delay, e
            ))
        })
    }

    pub fn resolve_source_path(&self, project_root: &Path) -> PathBuf {
        resolve_against(project_root, &self.source.path)
    }

    pub fn resolve_output_path(&self, project_root: &Path) -> PathBuf {
        resolve_against(project_root, &self.export.output_path)
    }

    pub fn get_effective_project_name(&self, project_root: &Path) -> String {
        self.general.project_name.clone().unwrap_or_else(|| {
            project_root
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "UnknownProject".to_string())
        })
    }
}

fn resolve_against(project_root: &Path, path: &Path) -> PathBuf {
    let expanded = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).as_ref());
    if expanded.is_absolute() {
        expanded
    } else {
        project_root.join(expanded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.export.window_size, 3000);
        assert_eq!(config.export.help_text_limit, 500);
        assert_eq!(config.export.brace_matching, BraceMatching::QuoteAware);
        assert!(!config.export.strict);
    }

    #[test]
    fn parses_all_sections() {
        let config = Config::from_toml_str(
            r#"
            [general]
            project_name = "compass"

            [source]
            path = "data/modules.ts"

            [export]
            output_path = "out/q.csv"
            window_size = 1200
            help_text_limit = 80
            brace_matching = "naive"
            strict = true

            [watch]
            delay = "2s"
            "#,
        )
        .unwrap();
        assert_eq!(config.general.project_name.as_deref(), Some("compass"));
        assert_eq!(config.source.path, PathBuf::from("data/modules.ts"));
        assert_eq!(config.export.window_size, 1200);
        assert_eq!(config.export.brace_matching, BraceMatching::Naive);
        assert!(config.export.strict);
        assert_eq!(config.get_watch_delay().unwrap(), Duration::from_secs(2));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = Config::from_toml_str("[export]\nformat = \"json\"").unwrap_err();
        assert!(matches!(err, AppError::TomlParse(_)));
    }

    #[test]
    fn zero_window_is_invalid() {
        let err = Config::from_toml_str("[export]\nwindow_size = 0").unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let text = Config::default().to_toml_string().unwrap();
        assert_eq!(Config::from_toml_str(&text).unwrap(), Config::default());
    }

    #[test]
    fn relative_paths_resolve_against_project_root() {
        let config = Config::default();
        let root = Path::new("/srv/compass");
        assert_eq!(
            config.resolve_source_path(root),
            root.join(DEFAULT_SOURCE_PATH)
        );
        let mut absolute = Config::default();
        absolute.export.output_path = PathBuf::from("/tmp/questions.csv");
        assert_eq!(
            absolute.resolve_output_path(root),
            PathBuf::from("/tmp/questions.csv")
        );
    }

    #[test]
    fn resolves_default_and_named_config_files() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        assert_eq!(Config::resolve_config_path(root, None, false).unwrap(), None);

        let config_dir = root.join(DEFAULT_CONFIG_DIR);
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(config_dir.join(DEFAULT_CONFIG_FILENAME), "").unwrap();
        fs::write(config_dir.join("staging.toml"), "").unwrap();

        assert_eq!(
            Config::resolve_config_path(root, None, false).unwrap(),
            Some(Config::default_config_path(root))
        );
        assert_eq!(
            Config::resolve_config_path(root, Some(&"staging".to_string()), false).unwrap(),
            Some(config_dir.join("staging.toml"))
        );
        assert_eq!(Config::resolve_config_path(root, None, true).unwrap(), None);
        assert!(Config::resolve_config_path(root, Some(&"missing".to_string()), false).is_err());
    }
}
