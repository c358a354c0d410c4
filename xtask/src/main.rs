//! xtask - Build tasks for docsift
//!
//! Run with: cargo xtask <command>
//!
//! Commands:
//! - gen-docs: Generate man pages and COMMANDS.md from the CLI definitions

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Arg, Command, CommandFactory, Parser, Subcommand};

use docsift::cli::Cli;

const BIN_NAME: &str = "docsift";

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build tasks for docsift")]
struct Xtask {
    #[command(subcommand)]
    command: XtaskCommand,
}

#[derive(Subcommand)]
enum XtaskCommand {
    /// Generate documentation from CLI definitions
    #[command(name = "gen-docs")]
    GenDocs {
        /// Output directory (default: docs/)
        #[arg(long, short, default_value = "docs")]
        output: PathBuf,

        /// Generate man pages only
        #[arg(long)]
        man: bool,

        /// Generate COMMANDS.md only
        #[arg(long)]
        markdown: bool,
    },
}

fn main() -> Result<()> {
    match Xtask::parse().command {
        XtaskCommand::GenDocs {
            output,
            man,
            markdown,
        } => {
            let gen_all = !man && !markdown;
            if gen_all || man {
                generate_man_pages(&output)?;
            }
            if gen_all || markdown {
                generate_markdown(&output)?;
            }
        }
    }
    Ok(())
}

/// Visible subcommands of `cmd`.
fn visible(cmd: &Command) -> impl Iterator<Item = &Command> {
    cmd.get_subcommands().filter(|c| !c.is_hide_set())
}

/// Render one man page per command, recursing into nested subcommands.
fn write_man_tree(cmd: &Command, stem: &str, dir: &Path) -> Result<()> {
    let mut buffer = Vec::new();
    clap_mangen::Man::new(cmd.clone()).render(&mut buffer)?;
    let path = dir.join(format!("{}.1", stem));
    fs::write(&path, buffer).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Generated: {}", path.display());

    for sub in visible(cmd) {
        write_man_tree(sub, &format!("{}-{}", stem, sub.get_name()), dir)?;
    }
    Ok(())
}

fn generate_man_pages(output: &Path) -> Result<()> {
    let man_dir = output.join("man");
    fs::create_dir_all(&man_dir).context("Failed to create man directory")?;
    write_man_tree(&Cli::command(), BIN_NAME, &man_dir)?;
    println!("Man pages generated in {}", man_dir.display());
    Ok(())
}

/// `-s, --long` style flag text; `None` for positionals.
fn flag_text(arg: &Arg) -> Option<String> {
    let long = arg.get_long().map(|l| format!("--{}", l));
    let short = arg.get_short().map(|s| format!("-{}", s));
    match (short, long) {
        (Some(s), Some(l)) => Some(format!("{}, {}", s, l)),
        (Some(s), None) => Some(s),
        (None, Some(l)) => Some(l),
        (None, None) => None,
    }
}

fn is_builtin(arg: &Arg) -> bool {
    matches!(arg.get_id().as_str(), "help" | "version")
}

fn push_arguments(md: &mut String, cmd: &Command) {
    let args: Vec<&Arg> = cmd.get_arguments().filter(|a| !is_builtin(a)).collect();

    let positional: Vec<_> = args.iter().filter(|a| a.is_positional()).collect();
    if !positional.is_empty() {
        md.push_str("**Arguments**\n\n");
        for arg in positional {
            let help = arg.get_help().map(|h| h.to_string()).unwrap_or_default();
            let _ = writeln!(md, "- `<{}>`: {}", arg.get_id().as_str().to_uppercase(), help);
        }
        md.push('\n');
    }

    let options: Vec<_> = args.iter().filter_map(|a| flag_text(a).map(|f| (f, a))).collect();
    if !options.is_empty() {
        md.push_str("**Options**\n\n");
        for (flag, arg) in options {
            let help = arg.get_help().map(|h| h.to_string()).unwrap_or_default();
            let _ = writeln!(md, "- `{}`: {}", flag, help);
        }
        md.push('\n');
    }
}

fn push_command(md: &mut String, cmd: &Command, path: &str, depth: usize) {
    let _ = writeln!(md, "{} {}\n", "#".repeat(depth), path);
    if let Some(about) = cmd.get_about() {
        let _ = writeln!(md, "{}\n", about);
    }
    push_arguments(md, cmd);
    if let Some(long_about) = cmd.get_long_about() {
        let _ = writeln!(md, "```\n{}\n```\n", long_about);
    }
    for sub in visible(cmd) {
        push_command(md, sub, &format!("{} {}", path, sub.get_name()), depth + 1);
    }
}

fn generate_markdown(output: &Path) -> Result<()> {
    fs::create_dir_all(output).context("Failed to create output directory")?;
    let cmd = Cli::command();

    let mut md = String::from("# docsift Command Reference\n\n");
    md.push_str("This document is auto-generated from the CLI definitions.\n\n");
    for sub in visible(&cmd) {
        let _ = writeln!(md, "- [{}](#{}-{})", sub.get_name(), BIN_NAME, sub.get_name());
    }
    md.push_str("\n---\n\n");

    if let Some(about) = cmd.get_about() {
        let _ = writeln!(md, "{}\n", about);
    }
    for sub in visible(&cmd) {
        push_command(&mut md, sub, &format!("{} {}", BIN_NAME, sub.get_name()), 2);
        md.push_str("---\n\n");
    }
    md.push_str("*Generated by `cargo xtask gen-docs`*\n");

    let path = output.join("COMMANDS.md");
    fs::write(&path, md)?;
    println!("Generated: {}", path.display());
    Ok(())
}
