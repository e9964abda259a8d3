use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Args, Debug, Clone, Default)]
pub struct ProjectConfigOpts {
    #[arg(
        long,
        help = "Specify the Access Compass project directory (default: current dir).",
        help_heading = "Project Setup",
        value_name = "PATH"
    )]
    pub project_root: Option<PathBuf>,

    #[arg(
        long,
        help = "Specify path/filename of the TOML config file (default: .compass/compass-export.toml).",
        value_name = "CONFIG_FILE",
        conflicts_with = "disable_config_file",
        help_heading = "Project Setup"
    )]
    pub config_file: Option<String>,

    #[arg(
        long,
        help = "Disable loading any TOML config file.",
        conflicts_with = "config_file",
        help_heading = "Project Setup"
    )]
    pub disable_config_file: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ExtractionOpts {
    #[arg(
        long,
        value_name = "PATH",
        help = "TypeScript file holding the module and question literals.",
        help_heading = "Extraction"
    )]
    pub source: Option<PathBuf>,

    #[arg(
        long,
        value_name = "CHARS",
        help = "Characters searched forward for the end of a question literal [default: 3000].",
        help_heading = "Extraction"
    )]
    pub window_size: Option<usize>,

    #[arg(
        long,
        value_name = "CHARS",
        help = "Maximum length of exported helper text [default: 500].",
        help_heading = "Extraction"
    )]
    pub help_text_limit: Option<usize>,

    #[arg(
        long,
        help = "Count every brace, even inside string literals.",
        overrides_with = "quote_aware_braces",
        help_heading = "Extraction"
    )]
    pub naive_braces: bool,

    #[arg(
        long,
        help = "Ignore braces inside strings and comments [default].",
        overrides_with = "naive_braces",
        help_heading = "Extraction"
    )]
    pub quote_aware_braces: bool,

    #[arg(
        long,
        help = "Fail instead of writing a header-only CSV when nothing is extracted.",
        help_heading = "Extraction"
    )]
    pub strict: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FormatOutputOpts {
    #[arg(short = 'f', long, help = "Set the summary format.", value_name = "FORMAT", value_parser = ["text", "json", "yaml"], help_heading = "Output Formatting")]
    pub format: Option<String>,

    #[arg(
        long,
        help = "Emit compact JSON instead of pretty-printed JSON.",
        help_heading = "Output Formatting"
    )]
    pub compact: bool,
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Export Access Compass self-assessment questions to CSV.",
    long_about = "compass-export scans the Access Compass module definitions, attributes each question \nto its module and writes a sorted CSV of every question with a run summary.",
    help_template = "{about-section}\nUsage: {usage}\n\n{all-args}{after-help}",
    after_help = "EXAMPLES:\n  compass-export export\n  compass-export export --source src/data/accessModules.ts --output questions.csv\n  compass-export summary --rows\n  compass-export watch",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true, help = "Increase message verbosity (-v, -vv).")]
    pub verbose: u8,

    #[arg(
        short,
        long,
        global = true,
        help = "Silence informational messages and warnings."
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    #[command(visible_alias = "e", about = "Extract questions and write the CSV export.")]
    Export(ExportArgs),

    #[command(
        visible_alias = "s",
        about = "Extract questions and show the summary without writing anything."
    )]
    Summary(SummaryArgs),

    #[command(
        visible_alias = "w",
        about = "Re-export whenever the source file or config changes."
    )]
    Watch(WatchArgs),

    #[command(about = "Show or save the default configuration file.")]
    Config(ConfigArgs),

    #[command(about = "Generate or save shell completion scripts.")]
    Completion(CompletionArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,
    #[clap(flatten)]
    pub extraction: ExtractionOpts,
    #[clap(flatten)]
    pub format_output: FormatOutputOpts,

    #[arg(
        short = 'o',
        long,
        value_name = "PATH",
        help = "Where to write the CSV (overrides config).",
        help_heading = "Output Control",
        conflicts_with = "stdout"
    )]
    pub output: Option<PathBuf>,

    #[arg(
        long,
        help = "Write the CSV to standard output instead of a file.",
        help_heading = "Output Control"
    )]
    pub stdout: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SummaryArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,
    #[clap(flatten)]
    pub extraction: ExtractionOpts,
    #[clap(flatten)]
    pub format_output: FormatOutputOpts,

    #[arg(long, help = "Also list the extracted rows (text format only).")]
    pub rows: bool,

    #[arg(long, help = "Also list rejected and orphaned candidates (text format only).")]
    pub skipped: bool,
}

#[derive(Args, Debug, Clone)]
pub struct WatchArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,
    #[clap(flatten)]
    pub extraction: ExtractionOpts,

    #[arg(
        short = 'o',
        long,
        value_name = "PATH",
        help = "Where to write the CSV (overrides config)."
    )]
    pub output: Option<PathBuf>,

    #[arg(
        long,
        value_name = "DELAY_STRING",
        help = "Set debounce delay for watch mode [default: 300ms]"
    )]
    pub watch_delay: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,

    #[arg(
        long,
        help = "Show the effective configuration instead of the defaults."
    )]
    pub effective: bool,

    #[arg(
        long,
        help = "Save default config structure to default path (prompts overwrite)."
    )]
    pub save: bool,
}

#[derive(Args, Debug, Clone)]
pub struct CompletionArgs {
    #[arg(
        long,
        value_name = "SHELL",
        default_value = "fish",
        help = "Shell to generate completions for."
    )]
    pub shell: Shell,
    #[arg(
        long,
        help = "Save completion script to its per-user location (prompts overwrite)."
    )]
    pub save: bool,
}
