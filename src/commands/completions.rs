//! Completions command handler

use anyhow::Result;
use clap::CommandFactory;
use clap_complete::{generate, Shell as CompletionShell};
use std::io::{self, Write};

/// Print the completion script for `shell` to stdout.
#[cfg(not(tarpaulin_include))]
pub fn handle<C: CommandFactory>(shell: CompletionShell) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_completions::<C>(shell, &mut out);
    out.flush()?;
    Ok(())
}

/// Generate the completion script into `out`.
pub fn write_completions<C: CommandFactory>(shell: CompletionShell, out: &mut dyn Write) {
    let mut cmd = C::command();
    generate(shell, &mut cmd, "docsift", out);
}
