pub mod container;
pub mod logger;
pub mod mcp;
pub mod reaper;

use clap::{Parser, Subcommand};
use logger::setup_logger;
use std::{path::PathBuf, process};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Container runtime
    #[arg(short, long, default_value = "docker")]
    runtime: String,
    /// Log level
    #[arg(
        short,
        long,
        default_value = "info",
        env = "LOG_LVL",
        help = "Log Levels: info, debug, warning, error, trace, critical"
    )]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Stop running containers started from the MCP browser-automation image
    Reap,
    /// Spawn each configured MCP server and run the initialize handshake
    Check {
        /// Path to the host tool's MCP configuration file
        #[arg(short, long, default_value = ".cursor/mcp.json")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let args = Args::parse();

    setup_logger(args.log_level);
    let log = slog_scope::logger();

    match args.command.unwrap_or(Command::Reap) {
        // The host invoking us from its exit hook must never see cleanup as
        // fatal, so this path always exits 0.
        Command::Reap => match container::create_runtime(&args.runtime) {
            Ok(runtime) => reaper::reap(runtime.as_ref()).await,
            Err(e) => {
                slog::debug!(log, "Container runtime unavailable, nothing to reap";
                    "runtime" => &args.runtime,
                    "err" => e.to_string()
                );
            }
        },
        Command::Check { config } => match mcp::check_servers(&config).await {
            Ok(summary) => {
                for result in &summary.results {
                    slog::info!(log, "Server check finished";
                        "server" => &result.name,
                        "passed" => result.passed,
                        "tools_listed" => result.tools_listed,
                        "resources_listed" => result.resources_listed,
                        "detail" => &result.detail
                    );
                }
                if !summary.all_passed() {
                    process::exit(1);
                }
            }
            Err(e) => {
                slog::error!(log, "Failed to check MCP servers"; "err" => e.to_string());
                process::exit(1);
            }
        },
    }
}
