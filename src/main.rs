//! docsift - CLI entry point

mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use docsift::cli::{Cli, Commands, ConfigCommands};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins; otherwise each `-v` raises the level from `warn`.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("docsift={}", default_level)));

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(filter)
        .try_init();
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Scan(args) => commands::scan::handle(&args),
        Commands::Patterns(args) => commands::patterns::handle(&args).map(|_| 0),
        Commands::Config(cmd) => {
            match cmd {
                ConfigCommands::Show { config } => {
                    commands::config::handle_show(config.as_deref())?
                }
                ConfigCommands::Init { force } => commands::config::handle_init(force)?,
                ConfigCommands::Path => commands::config::handle_path()?,
            }
            Ok(0)
        }
        Commands::Completions { shell } => commands::completions::handle::<Cli>(shell).map(|_| 0),
    }
}
