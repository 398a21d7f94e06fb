//! `tokens` command: list the token ids of a freshly built snapshot.

use std::io::{self, Write};

use anyhow::{Context, Result};

use crate::commands::SourceArgs;
use crate::output::{render_tokens, OutputFormat};
use crate::terminal::ColorPalette;

pub fn handle_tokens(source: &SourceArgs, format: OutputFormat) -> Result<()> {
    let (refresher, _) = source.load()?;
    let snapshot = refresher.store().current();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    render_tokens(
        &mut out,
        format,
        &ColorPalette::detect(),
        snapshot.version(),
        &snapshot.token_ids(),
    )
    .context("failed to write token list")?;
    out.flush()?;
    Ok(())
}
