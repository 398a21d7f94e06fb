use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use swaproute_cli::commands::refresh::handle_refresh;
use swaproute_cli::commands::route::{handle_route, RouteCommandArgs};
use swaproute_cli::commands::tokens::handle_tokens;
use swaproute_cli::commands::SourceArgs;
use swaproute_cli::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(author, version, about = "Best-route queries over a token swap graph")]
struct Cli {
    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(flatten)]
    source: SourceArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch market data once and list the tracked token ids.
    Tokens,
    /// Compute the best route between two token ids.
    Route {
        /// Token to sell.
        #[arg(long = "from")]
        from: String,
        /// Token to buy.
        #[arg(long = "to")]
        to: String,
    },
    /// Fetch market data once and report the snapshot it would publish.
    Refresh,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Tokens => handle_tokens(&cli.source, cli.format),
        Command::Route { from, to } => {
            handle_route(&cli.source, &RouteCommandArgs { from, to }, cli.format)
        }
        Command::Refresh => handle_refresh(&cli.source, cli.format),
    }
}

/// Log to stderr so stdout stays parseable with `--format json`.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
