// src/reaper.rs
use crate::container::{ContainerRuntime, MCP_BROWSER_IMAGE};

/// Best-effort stop of every running container started from the MCP browser
/// image. Runs as a cleanup hook when the host tool session ends, to release
/// the user-data directory those containers hold locked.
///
/// Never returns an error: an unreachable daemon, an empty result, or a stop
/// request that fails (container already gone) all degrade silently. The
/// caller's exit code is the contract, not this function's output.
pub async fn reap(runtime: &dyn ContainerRuntime) {
    let log = slog_scope::logger();

    let containers = match runtime.list_by_ancestor(MCP_BROWSER_IMAGE).await {
        Ok(containers) => containers,
        Err(e) => {
            slog::debug!(log, "Container query failed, nothing to reap";
                "image" => MCP_BROWSER_IMAGE,
                "err" => e.to_string()
            );
            return;
        }
    };

    if containers.is_empty() {
        return;
    }

    for container in containers {
        match runtime.stop(&container.id).await {
            Ok(()) => {
                slog::info!(log, "Stopped container";
                    "id" => &container.id,
                    "name" => &container.name
                );
            }
            Err(e) => {
                // Races with the container's own lifecycle are expected here
                slog::debug!(log, "Stop request failed";
                    "id" => &container.id,
                    "err" => e.to_string()
                );
            }
        }
    }
}
