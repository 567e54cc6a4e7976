//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums. No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, LogFormat, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "archc",
    bin_name = "archc",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Architectural compiler: classify a domain model, generate its infrastructure",
    long_about = "archc reads a source model (JSON facts about classes, interfaces, \
                  enums and records), classifies it into aggregates, entities, value \
                  objects and ports, validates the architecture, and runs generator \
                  plugins over the result.",
    after_help = "EXAMPLES:\n\
        \x20 archc compile model.json --out build/generated\n\
        \x20 archc compile model/ --options archc.toml --dry-run\n\
        \x20 archc classify model.json --explain\n\
        \x20 archc completions bash > /usr/share/bash-completion/completions/archc",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the full pipeline and write artifacts.
    #[command(
        visible_alias = "c",
        about = "Compile a source model",
        after_help = "EXAMPLES:\n\
            \x20 archc compile model.json\n\
            \x20 archc compile model/ --out generated --manifest archc-plugins.toml\n\
            \x20 archc compile model.json --dry-run --output-format json"
    )]
    Compile(CompileArgs),

    /// Analyze only and print the classification.
    #[command(
        about = "Classify a source model without generating",
        after_help = "EXAMPLES:\n\
            \x20 archc classify model.json\n\
            \x20 archc classify model.json --explain"
    )]
    Classify(ClassifyArgs),

    /// List the plugins that would run.
    #[command(visible_alias = "ls", about = "List available plugins")]
    Plugins(PluginsArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 archc completions bash > ~/.local/share/bash-completion/completions/archc\n\
            \x20 archc completions zsh  > ~/.zfunc/_archc\n\
            \x20 archc completions fish > ~/.config/fish/completions/archc.fish"
    )]
    Completions(CompletionsArgs),
}

// ── compile ───────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompileArgs {
    /// A JSON model file, or a directory whose `.json` files are read as
    /// successive rounds.
    #[arg(value_name = "MODEL", help = "Source model file or directory")]
    pub model: PathBuf,

    /// Output root; overrides `generation.output_dir`.
    #[arg(short = 'o', long = "out", value_name = "DIR", help = "Output directory")]
    pub out: Option<PathBuf>,

    #[arg(long = "options", value_name = "FILE", help = "Plugin options file (TOML)")]
    pub options: Option<PathBuf>,

    #[arg(long = "manifest", value_name = "FILE", help = "Plugin manifest (TOML)")]
    pub manifest: Option<PathBuf>,

    /// Run every phase, merging against files on disk, without writing.
    #[arg(long = "dry-run", help = "Show what would be written without writing")]
    pub dry_run: bool,

    /// Generate even when validation reports errors.
    #[arg(long = "lenient", help = "Do not skip generation on validation errors")]
    pub lenient: bool,
}

// ── classify ──────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ClassifyArgs {
    #[arg(value_name = "MODEL", help = "Source model file or directory")]
    pub model: PathBuf,

    /// Print the evidence trail behind every decision.
    #[arg(long = "explain", help = "Show evidence trails")]
    pub explain: bool,
}

// ── plugins ───────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PluginsArgs {
    /// Restrict the list to what a manifest enables.
    #[arg(long = "manifest", value_name = "FILE", help = "Plugin manifest (TOML)")]
    pub manifest: Option<PathBuf>,
}

// ── completions ───────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── tests ─────────────────────────────────────────────────────────────────────
