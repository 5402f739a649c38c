//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums. No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use kiln_core::domain::WriteStrategy;

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "kiln",
    bin_name = "kiln",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "\u{1f525} Multi-project source generation",
    long_about = "Kiln collects annotated symbols from every project in a source tree, \
                  runs generator plugins over them, and writes the generated code back \
                  next to each project.",
    after_help = "EXAMPLES:\n\
        \x20 kiln generate\n\
        \x20 kiln generate ./repo --strategy single --exclude Tests\n\
        \x20 kiln generate --output-format json > report.json\n\
        \x20 kiln clean ./repo",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Collect symbols and run every plugin over the source tree.
    #[command(
        visible_alias = "gen",
        about = "Generate code for every discovered project",
        after_help = "EXAMPLES:\n\
            \x20 kiln generate\n\
            \x20 kiln generate ./repo --strategy separate --extension txt\n\
            \x20 kiln generate --exclude Internal --exclude Tests --fail-fast\n\
            \x20 kiln generate --plugin tag-index --no-annotations"
    )]
    Generate(GenerateArgs),

    /// Remove everything a previous run generated.
    #[command(
        about = "Delete generated output",
        after_help = "EXAMPLES:\n\
            \x20 kiln clean\n\
            \x20 kiln clean ./repo --strategy single"
    )]
    Clean(CleanArgs),

    /// Initialise a Kiln configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 kiln init           # user config directory\n\
            \x20 kiln init --local   # .kiln.toml in the current directory"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 kiln completions bash > ~/.local/share/bash-completion/completions/kiln\n\
            \x20 kiln completions zsh  > ~/.zfunc/_kiln\n\
            \x20 kiln completions fish > ~/.config/fish/completions/kiln.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect the effective configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 kiln config get output.strategy\n\
            \x20 kiln config list\n\
            \x20 kiln config path"
    )]
    Config(ConfigCommands),
}

// ── shared tree arguments ─────────────────────────────────────────────────────

/// Where the source tree is and how its output is laid out. Unset flags fall
/// back to the configuration.
#[derive(Debug, Clone, Default, Args)]
pub struct TreeArgs {
    /// Root of the source tree.
    #[arg(value_name = "ROOT", default_value = ".", help = "Root of the source tree")]
    pub root: PathBuf,

    #[arg(
        short = 's',
        long = "strategy",
        value_enum,
        value_name = "STRATEGY",
        help = "How generated files are laid out"
    )]
    pub strategy: Option<Strategy>,

    #[arg(
        long = "suffix",
        value_name = "NAME",
        help = "Generated directory and namespace suffix [default: Generated]"
    )]
    pub suffix: Option<String>,

    #[arg(
        short = 'e',
        long = "extension",
        value_name = "EXT",
        help = "Extension of generated files, without the dot [default: cs]"
    )]
    pub extension: Option<String>,

    #[arg(
        long = "manifest-name",
        value_name = "FILE",
        help = "Symbol manifest file name [default: kiln.symbols.json]"
    )]
    pub manifest_name: Option<String>,

    #[arg(
        long = "max-depth",
        value_name = "N",
        help = "Deepest directory level searched for projects"
    )]
    pub max_depth: Option<usize>,
}

// ── generate ──────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub tree: TreeArgs,

    /// Namespace whose types are never collected. Repeatable.
    #[arg(
        short = 'x',
        long = "exclude",
        value_name = "NAMESPACE",
        help = "Exclude a namespace from collection (repeatable)"
    )]
    pub exclude: Vec<String>,

    /// Plugin to run. Repeatable; defaults to the configured list.
    #[arg(
        short = 'p',
        long = "plugin",
        value_name = "NAME",
        help = "Run only this plugin (repeatable)"
    )]
    pub plugins: Vec<String>,

    #[arg(long = "fail-fast", help = "Stop after the first phase that fails")]
    pub fail_fast: bool,

    #[arg(
        long = "no-annotations",
        help = "Do not write plugin annotations into the common project"
    )]
    pub no_annotations: bool,
}

// ── clean ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CleanArgs {
    #[command(flatten)]
    pub tree: TreeArgs,
}

// ── init ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Write `.kiln.toml` in the current directory.
    #[arg(
        long = "local",
        help = "Create local configuration in current directory"
    )]
    pub local: bool,

    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `output.strategy`.
        key: String,
    },
    /// Print the effective configuration.
    List,
    /// Print the path to the user configuration file.
    Path,
}

// ── value enums ───────────────────────────────────────────────────────────────

/// Output layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum Strategy {
    /// Every project into one file under the root.
    Single,
    /// One file per project.
    #[value(alias = "project")]
    PerProject,
    /// One file per generated unit.
    Separate,
}

impl From<Strategy> for WriteStrategy {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Single => Self::Single,
            Strategy::PerProject => Self::PerProject,
            Strategy::Separate => Self::Separate,
        }
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────
