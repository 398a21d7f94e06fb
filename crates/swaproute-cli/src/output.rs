//! Output formatting for command results.
//!
//! Every renderer writes to a caller-supplied [`Write`] so commands print to
//! stdout while tests render into a buffer.

use std::io::{self, Write};

use clap::ValueEnum;
use serde::Serialize;

use swaproute_lib::{RefreshOutcome, RoutePlan, TokenId};

use crate::terminal::{format_weight, ColorPalette};

/// Output format selected with `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

#[derive(Serialize)]
struct TokensJson<'a> {
    version: u64,
    tokens: &'a [TokenId],
}

#[derive(Serialize)]
struct RouteJson<'a> {
    version: u64,
    route: Vec<&'a str>,
    hops: usize,
    total_weight: f64,
}

/// Render the token ids of snapshot `version`.
pub fn render_tokens<W: Write>(
    out: &mut W,
    format: OutputFormat,
    palette: &ColorPalette,
    version: u64,
    tokens: &[TokenId],
) -> io::Result<()> {
    match format {
        OutputFormat::Json => write_json(out, &TokensJson { version, tokens }),
        OutputFormat::Text => {
            writeln!(
                out,
                "{}Tokens{} {}(snapshot v{}){}",
                palette.bold, palette.reset, palette.gray, version, palette.reset
            )?;
            for id in tokens {
                writeln!(out, "  {}{}{}", palette.cyan, id, palette.reset)?;
            }
            Ok(())
        }
    }
}

/// Render a planned route.
pub fn render_route<W: Write>(
    out: &mut W,
    format: OutputFormat,
    palette: &ColorPalette,
    plan: &RoutePlan,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => write_json(
            out,
            &RouteJson {
                version: plan.version,
                route: plan.steps.iter().map(|t| t.id.as_str()).collect(),
                hops: plan.hop_count(),
                total_weight: plan.total_weight,
            },
        ),
        OutputFormat::Text => {
            writeln!(
                out,
                "{}Route{} {} -> {} {}({} hops, snapshot v{}){}",
                palette.bold,
                palette.reset,
                plan.from,
                plan.to,
                palette.gray,
                plan.hop_count(),
                plan.version,
                palette.reset
            )?;
            for (index, token) in plan.steps.iter().enumerate() {
                writeln!(
                    out,
                    "  {:>2}. {}{}{} {}({}){}",
                    index + 1,
                    palette.cyan,
                    token.id,
                    palette.reset,
                    palette.gray,
                    token.symbol,
                    palette.reset
                )?;
            }
            writeln!(
                out,
                "Total weight: {}{}{}",
                palette.green,
                format_weight(plan.total_weight),
                palette.reset
            )
        }
    }
}

/// Render the result of a one-shot refresh.
pub fn render_refresh<W: Write>(
    out: &mut W,
    format: OutputFormat,
    palette: &ColorPalette,
    provider: &str,
    outcome: &RefreshOutcome,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => write_json(out, outcome),
        OutputFormat::Text => writeln!(
            out,
            "Refreshed from {}{}{}: snapshot v{} with {} tokens and {} edges {}in {}ms{}",
            palette.orange,
            provider,
            palette.reset,
            outcome.version,
            outcome.tokens,
            outcome.edges,
            palette.gray,
            outcome.elapsed.as_millis(),
            palette.reset
        ),
    }
}

fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)
}
