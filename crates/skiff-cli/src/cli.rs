//! Argument parsing and command dispatch for the skiff console.

use clap::{Args, Parser, Subcommand, ValueEnum};
use reqwest::Url;

use crate::client::{AppContext, CliResult, build_http_client, init_logging, random_string};
use crate::commands::{routes, tail, torrents, watch};
use skiff_sync::DaemonClient;

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_API_URL: &str = "http://127.0.0.1:4444";

/// Parses CLI arguments, executes the requested command, and returns the
/// process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    init_logging();
    let trace_id = random_string(16);
    tracing::debug!(%trace_id, "dispatching command");

    match dispatch(cli, &trace_id).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

async fn dispatch(cli: Cli, trace_id: &str) -> CliResult<()> {
    let http = build_http_client(cli.timeout, trace_id)?;
    let ctx = AppContext {
        daemon: DaemonClient::new(http, cli.api_url),
        output: cli.output,
    };

    match cli.command {
        Command::Ls => routes::handle_route_list(&ctx).await,
        Command::Route(route) => match route {
            RouteCommand::Add(args) => routes::handle_route_add(&ctx, args).await,
            RouteCommand::Rm(args) => routes::handle_route_remove(&ctx, args).await,
        },
        Command::Interval(interval) => match interval {
            IntervalCommand::Get => routes::handle_interval_get(&ctx).await,
            IntervalCommand::Set(args) => routes::handle_interval_set(&ctx, args).await,
        },
        Command::Torrents(args) => torrents::handle_torrent_page(&ctx, args).await,
        Command::Status(args) => torrents::handle_torrent_status(&ctx, args).await,
        Command::Files(args) => torrents::handle_torrent_files(&ctx, args).await,
        Command::Add(args) => torrents::handle_torrent_add(&ctx, args).await,
        Command::Rm(args) => torrents::handle_torrent_remove(&ctx, args).await,
        Command::Blacklist(args) => torrents::handle_torrent_blacklist(&ctx, args).await,
        Command::Watch(args) => watch::handle_watch(&ctx, args).await,
        Command::Tail(args) => tail::handle_tail(&ctx, args).await,
    }
}

#[derive(Parser)]
#[command(name = "skiff", about = "Console client for a skiff file-serving daemon")]
struct Cli {
    #[arg(
        long,
        global = true,
        env = "SKIFF_API_URL",
        value_parser = parse_url,
        default_value = DEFAULT_API_URL
    )]
    api_url: Url,
    #[arg(
        long,
        global = true,
        env = "SKIFF_HTTP_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    timeout: u64,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    output: OutputFormat,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List routes exposed by the daemon.
    Ls,
    #[command(subcommand)]
    Route(RouteCommand),
    #[command(subcommand)]
    Interval(IntervalCommand),
    /// Show one page of a route's torrents.
    Torrents(TorrentPageArgs),
    /// Show details for a single torrent.
    Status(TorrentRefArgs),
    /// List the files inside a torrent.
    Files(TorrentRefArgs),
    /// Attach a magnet URI or upload a .torrent file to a route.
    Add(TorrentAddArgs),
    /// Remove a torrent from a route.
    Rm(TorrentRefArgs),
    /// Blacklist a torrent and request a replacement.
    Blacklist(TorrentRefArgs),
    /// Follow routes and torrents as a live view.
    Watch(WatchArgs),
    /// Follow the daemon's structured log.
    Tail(TailArgs),
}

#[derive(Subcommand)]
pub(crate) enum RouteCommand {
    /// Create a route.
    Add(RouteNameArgs),
    /// Delete a route.
    Rm(RouteNameArgs),
}

#[derive(Subcommand)]
pub(crate) enum IntervalCommand {
    /// Print the configured watch interval.
    Get,
    /// Persist a new watch interval.
    Set(IntervalSetArgs),
}

#[derive(Args)]
pub(crate) struct RouteNameArgs {
    #[arg(help = "Route name")]
    pub(crate) name: String,
}

#[derive(Args)]
pub(crate) struct IntervalSetArgs {
    #[arg(help = "Interval between refresh cycles, in seconds")]
    pub(crate) seconds: u32,
}

#[derive(Args)]
pub(crate) struct TorrentPageArgs {
    #[arg(help = "Route name")]
    pub(crate) route: String,
    #[arg(long, default_value_t = 1, help = "1-based page number")]
    pub(crate) page: u32,
}

#[derive(Args)]
pub(crate) struct TorrentRefArgs {
    #[arg(help = "Route name")]
    pub(crate) route: String,
    #[arg(help = "Torrent info hash")]
    pub(crate) hash: String,
}

#[derive(Args)]
pub(crate) struct TorrentAddArgs {
    #[arg(help = "Route name")]
    pub(crate) route: String,
    #[arg(help = "Magnet URI or path to a .torrent file")]
    pub(crate) source: String,
}

#[derive(Args)]
pub(crate) struct WatchArgs {
    #[arg(long, help = "Render a single cycle and exit")]
    pub(crate) once: bool,
}

#[derive(Args)]
pub(crate) struct TailArgs {
    #[arg(
        long,
        default_value_t = 2,
        help = "Seconds between polls when streaming is unavailable"
    )]
    pub(crate) poll_interval_secs: u64,
}

#[derive(Copy, Clone, Debug, Default, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

fn parse_url(input: &str) -> Result<Url, String> {
    input
        .parse::<Url>()
        .map_err(|err| format!("invalid URL '{input}': {err}"))
}
