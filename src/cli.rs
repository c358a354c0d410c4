//! CLI definitions for docsift
//!
//! This module contains the clap CLI structure definitions, separated from main.rs
//! so they can be accessed by xtask for documentation generation (man pages, markdown).

use std::path::PathBuf;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell as CompletionShell;

use crate::config::ReportFormat;

/// Build clap styles for consistent CLI appearance.
///
/// - Green: headers, usage, command names
/// - White: descriptions, placeholders (renders as light gray on dark terminals)
pub fn build_cli_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Green.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::White.on_default())
        .valid(AnsiColor::White.on_default())
        .invalid(AnsiColor::Red.on_default())
        .error(AnsiColor::Red.on_default() | Effects::BOLD)
}

#[derive(Parser)]
#[command(name = "docsift")]
#[command(about = "[ docsift ] - scan folders of PDFs for prioritised keyword patterns")]
#[command(
    long_about = "docsift - scan folders of PDF documents for prioritised keyword patterns.

Every page of every PDF is searched with the configured regex patterns. Each
hit is reported with the text around it, its page and its priority tier.
Pages the primary text extractor cannot read are retried with a fallback
extractor; anything that still fails is listed in the report.

QUICK START:
    docsift scan pdfs/                 Scan a folder with the built-in tiers
    docsift patterns                   Show the active tiers and patterns
    docsift patterns test \"...\"        Try the patterns on a piece of text
    docsift config init                Write the default config to edit

Configuration is read from --config, ./docsift.toml or ~/.config/docsift/config.toml."
)]
#[command(version)]
#[command(styles = build_cli_styles())]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan a folder of PDF documents
    #[command(long_about = "Scan every PDF in a folder and write the findings report.

Documents are processed in file-name order. Unreadable or timed-out
documents are recorded and the scan continues. Reports are written to
the output directory even when nothing was found or the scan was
interrupted.

EXIT CODES:
    0      every document was processed
    2      some documents could not be read or timed out
    130    the scan was cancelled (Ctrl+C)

EXAMPLES:
    docsift scan                          Scan ./pdfs
    docsift scan minutes/ --recursive     Include sub-folders as collections
    docsift scan minutes/ -j 0            One worker per CPU
    docsift scan minutes/ --window 150 --format summary")]
    Scan(ScanArgs),

    /// List and try the configured patterns
    #[command(long_about = "Validate the configured priority tiers and list their patterns.

Tiers are shown in rank order; rank 1 is the highest priority.

EXAMPLES:
    docsift patterns
    docsift patterns --config strict.toml
    docsift patterns test \"The ethics training was postponed\"")]
    Patterns(PatternsArgs),

    /// Configuration management
    #[command(
        subcommand,
        long_about = "View and create the docsift configuration file.

Configuration is looked up in ./docsift.toml, then
~/.config/docsift/config.toml. Built-in defaults apply when neither exists.

EXAMPLES:
    docsift config show          Display the effective configuration
    docsift config init          Write the defaults to the user config file
    docsift config path          Print the user config file path"
    )]
    Config(ConfigCommands),

    /// Generate shell completions
    #[command(long_about = "Print a shell completion script to stdout.

EXAMPLES:
    docsift completions bash > ~/.local/share/bash-completion/completions/docsift
    docsift completions zsh > ~/.zfunc/_docsift")]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Folder containing the PDF documents
    #[arg(default_value = "pdfs")]
    pub folder: PathBuf,

    /// Config file (default: ./docsift.toml or the user config)
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Directory for report files
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Documents processed at once (0 = one per CPU)
    #[arg(long, short = 'j')]
    pub concurrency: Option<usize>,

    /// Characters of context captured on each side of a match
    #[arg(long, short)]
    pub window: Option<usize>,

    /// Per-document extraction timeout in seconds (0 = none)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Descend into sub-folders
    #[arg(long, short)]
    pub recursive: bool,

    /// Report formats to write
    #[arg(long, short, value_enum)]
    pub format: Option<FormatChoice>,

    /// Suppress progress output
    #[arg(long, short)]
    pub quiet: bool,
}

#[derive(Args, Debug, Clone)]
pub struct PatternsArgs {
    /// Config file (default: ./docsift.toml or the user config)
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<PatternsCommands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum PatternsCommands {
    /// Run the patterns over a piece of text
    Test {
        /// Text to search
        text: String,

        /// Characters of context captured on each side of a match
        #[arg(long, short)]
        window: Option<usize>,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show {
        /// Config file (default: ./docsift.toml or the user config)
        #[arg(long, short)]
        config: Option<PathBuf>,
    },
    /// Write the default configuration to the user config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the user config file path
    Path,
}

/// Report formats selectable on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatChoice {
    Json,
    Summary,
    All,
}

impl FormatChoice {
    pub fn formats(&self) -> Vec<ReportFormat> {
        match self {
            FormatChoice::Json => vec![ReportFormat::Json],
            FormatChoice::Summary => vec![ReportFormat::Summary],
            FormatChoice::All => vec![ReportFormat::Json, ReportFormat::Summary],
        }
    }
}
