//! `refresh` command: run one refresh and report what it would publish.

use std::io::{self, Write};

use anyhow::{Context, Result};

use crate::commands::SourceArgs;
use crate::output::{render_refresh, OutputFormat};
use crate::terminal::ColorPalette;

pub fn handle_refresh(source: &SourceArgs, format: OutputFormat) -> Result<()> {
    let (refresher, outcome) = source.load()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    render_refresh(
        &mut out,
        format,
        &ColorPalette::detect(),
        refresher.provider_name(),
        &outcome,
    )
    .context("failed to write refresh outcome")?;
    out.flush()?;
    Ok(())
}
