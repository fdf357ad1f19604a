// src/mcp/mod.rs
pub mod config;
pub mod probe;

use std::path::Path;

use config::McpConfigError;
use probe::ProbeReport;

#[derive(Debug, Default)]
pub struct CheckSummary {
    pub results: Vec<ProbeReport>,
}

impl CheckSummary {
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }
}

/// Probe every server configured in the host tool's MCP config file.
///
/// Servers are checked one at a time; a failing server never aborts the run,
/// it just shows up as a failed entry in the summary.
pub async fn check_servers(path: &Path) -> Result<CheckSummary, McpConfigError> {
    let cfg = config::load_config(path)?;
    let log = slog_scope::logger();

    if cfg.mcp_servers.is_empty() {
        slog::info!(log, "No MCP servers configured"; "path" => path.display().to_string());
        return Ok(CheckSummary::default());
    }

    slog::info!(log, "Checking MCP servers";
        "path" => path.display().to_string(),
        "count" => cfg.mcp_servers.len()
    );

    let mut summary = CheckSummary::default();
    for (name, server) in &cfg.mcp_servers {
        if !server.is_stdio() {
            slog::warn!(log, "Skipping unsupported server transport";
                "server" => name,
                "transport" => server.transport.as_deref().unwrap_or("<unset>")
            );
            summary
                .results
                .push(ProbeReport::failed(name, "unsupported transport"));
            continue;
        }

        summary.results.push(probe::probe_server(name, server).await);
    }

    Ok(summary)
}
