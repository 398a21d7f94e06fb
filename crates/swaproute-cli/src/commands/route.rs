//! `route` command: compute the best route between two tokens.

use std::io::{self, Write};

use anyhow::{Context, Result};

use swaproute_lib::{plan_route, Error as RouteError, RouteRequest, TokenId};

use crate::commands::SourceArgs;
use crate::output::{render_route, OutputFormat};
use crate::terminal::ColorPalette;

/// Arguments for the route command.
#[derive(Debug, Clone)]
pub struct RouteCommandArgs {
    /// Token to sell.
    pub from: String,
    /// Token to buy.
    pub to: String,
}

impl RouteCommandArgs {
    pub fn to_request(&self) -> RouteRequest {
        RouteRequest::new(self.from.as_str(), self.to.as_str())
    }
}

pub fn handle_route(
    source: &SourceArgs,
    args: &RouteCommandArgs,
    format: OutputFormat,
) -> Result<()> {
    let (refresher, _) = source.load()?;
    let snapshot = refresher.store().current();

    let plan = plan_route(&snapshot, &args.to_request()).map_err(handle_route_failure)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    render_route(&mut out, format, &ColorPalette::detect(), &plan)
        .context("failed to write route")?;
    out.flush()?;
    Ok(())
}

fn handle_route_failure(err: RouteError) -> anyhow::Error {
    match err {
        RouteError::UnknownToken { id, suggestions } => {
            anyhow::anyhow!(format_unknown_token_message(&id, &suggestions))
        }
        RouteError::RouteNotFound { from, to } => {
            anyhow::anyhow!(format_route_not_found_message(&from, &to))
        }
        other => anyhow::Error::new(other),
    }
}

fn format_unknown_token_message(id: &TokenId, suggestions: &[String]) -> String {
    let mut message = format!("Unknown token '{}'.", id);
    match suggestions {
        [] => message.push_str(" Run `swaproute tokens` to list tracked tokens."),
        [only] => message.push_str(&format!(" Did you mean '{only}'?")),
        many => {
            let joined = many
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ");
            message.push_str(&format!(" Did you mean one of: {}?", joined));
        }
    }
    message
}

fn format_route_not_found_message(from: &TokenId, to: &TokenId) -> String {
    format!(
        "No route found between {} and {}. Try a different edge file (--edges-file) \
         or track more tokens (--ids).",
        from, to
    )
}
