// src/mcp/probe.rs
use anyhow::{anyhow, Context, Result};
use serde_json::{json, Value};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};
use tokio::time::timeout;

use super::config::{expand_arg, ServerConfig};

pub const PROTOCOL_VERSION: &str = "2024-11-05";

const STARTUP_GRACE: Duration = Duration::from_millis(1000);
const RESPONSE_TIMEOUT: Duration = Duration::from_secs(5);
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug)]
pub struct ProbeReport {
    pub name: String,
    pub passed: bool,
    pub detail: String,
    pub tools_listed: bool,
    pub resources_listed: bool,
}

impl ProbeReport {
    pub fn failed(name: &str, detail: &str) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            detail: detail.to_string(),
            tools_listed: false,
            resources_listed: false,
        }
    }
}

pub fn rpc_request(id: u64, method: &str, params: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
        "params": params,
    })
}

pub fn rpc_notification(method: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "method": method,
    })
}

pub fn initialize_params() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {},
        "clientInfo": {
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
        },
    })
}

/// A spawned stdio MCP server under test. Messages are newline-delimited
/// JSON-RPC 2.0 on the child's stdin/stdout.
pub struct ServerProbe {
    child: Child,
    stdout: BufReader<ChildStdout>,
    next_id: u64,
}

impl ServerProbe {
    pub async fn spawn(config: &ServerConfig) -> Result<Self> {
        let command = config
            .command
            .as_deref()
            .ok_or_else(|| anyhow!("no command specified"))?;
        let args: Vec<String> = config.args.iter().map(|arg| expand_arg(arg)).collect();

        let mut child = Command::new(command)
            .args(&args)
            .envs(&config.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to spawn '{}'", command))?;

        // Give the server a moment to come up, then catch ones that died on
        // startup so we can surface their stderr instead of a write error.
        tokio::time::sleep(STARTUP_GRACE).await;
        if let Some(status) = child.try_wait()? {
            let stderr = Self::drain_stderr(&mut child).await;
            return Err(anyhow!(
                "process exited immediately with {}: {}",
                status,
                stderr.trim()
            ));
        }

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("child stdout not captured"))?;

        Ok(Self {
            child,
            stdout: BufReader::new(stdout),
            next_id: 1,
        })
    }

    async fn drain_stderr(child: &mut Child) -> String {
        let mut buf = String::new();
        if let Some(mut stderr) = child.stderr.take() {
            let _ = timeout(RESPONSE_TIMEOUT, stderr.read_to_string(&mut buf)).await;
        }
        buf
    }

    pub async fn request(&mut self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id;
        self.next_id += 1;
        self.send(rpc_request(id, method, params)).await?;
        self.read_response().await
    }

    pub async fn notify(&mut self, method: &str) -> Result<()> {
        self.send(rpc_notification(method)).await
    }

    async fn send(&mut self, message: Value) -> Result<()> {
        let stdin = self
            .child
            .stdin
            .as_mut()
            .ok_or_else(|| anyhow!("child stdin closed"))?;
        let mut line = message.to_string();
        line.push('\n');
        stdin.write_all(line.as_bytes()).await?;
        stdin.flush().await?;
        Ok(())
    }

    async fn read_response(&mut self) -> Result<Value> {
        let mut line = String::new();
        let read = timeout(RESPONSE_TIMEOUT, self.stdout.read_line(&mut line))
            .await
            .map_err(|_| anyhow!("timed out waiting for response"))??;
        if read == 0 {
            return Err(anyhow!("server closed stdout"));
        }
        Ok(serde_json::from_str(line.trim())?)
    }

    /// Closing stdin asks a stdio server to exit; kill it if it lingers.
    pub async fn shutdown(mut self) {
        self.child.stdin.take();
        if timeout(SHUTDOWN_TIMEOUT, self.child.wait()).await.is_err() {
            let _ = self.child.start_kill();
            let _ = self.child.wait().await;
        }
    }
}

/// Spawn one configured server and drive it through the initialize handshake
/// plus `tools/list` and `resources/list`. A server passes when it answers
/// the initialize request; the list calls are recorded but not required.
pub async fn probe_server(name: &str, config: &ServerConfig) -> ProbeReport {
    let log = slog_scope::logger();
    slog::info!(log, "Probing MCP server";
        "server" => name,
        "command" => config.command.as_deref().unwrap_or("<unset>")
    );

    let mut probe = match ServerProbe::spawn(config).await {
        Ok(probe) => probe,
        Err(e) => return ProbeReport::failed(name, &e.to_string()),
    };

    let initialized = probe.request("initialize", initialize_params()).await;

    let report = match initialized {
        Ok(_) => {
            let _ = probe.notify("notifications/initialized").await;

            let tools_listed = probe.request("tools/list", json!({})).await.is_ok();
            let resources_listed = probe.request("resources/list", json!({})).await.is_ok();

            ProbeReport {
                name: name.to_string(),
                passed: true,
                detail: "initialize handshake completed".to_string(),
                tools_listed,
                resources_listed,
            }
        }
        Err(e) => ProbeReport::failed(name, &format!("no response to initialize: {}", e)),
    };

    probe.shutdown().await;
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn quiet_logs() {
        slog_scope::set_global_logger(slog::Logger::root(slog::Discard, slog::o!()))
            .cancel_reset();
    }

    fn stdio_server(command: &str, args: &[&str]) -> ServerConfig {
        ServerConfig {
            transport: Some("stdio".to_string()),
            command: Some(command.to_string()),
            args: args.iter().map(|a| a.to_string()).collect(),
            env: HashMap::new(),
        }
    }

    #[test]
    fn request_encoding_matches_the_wire_format() {
        let request = rpc_request(1, "initialize", initialize_params());
        assert_eq!(request["jsonrpc"], "2.0");
        assert_eq!(request["id"], 1);
        assert_eq!(request["method"], "initialize");
        assert_eq!(request["params"]["protocolVersion"], PROTOCOL_VERSION);
        assert!(request["params"]["clientInfo"]["name"].is_string());

        let notification = rpc_notification("notifications/initialized");
        assert!(notification.get("id").is_none());
    }

    #[tokio::test]
    async fn missing_binary_fails_the_probe() {
        quiet_logs();
        let config = stdio_server("definitely-not-a-real-mcp-server", &[]);
        let report = probe_server("ghost", &config).await;
        assert!(!report.passed);
        assert!(report.detail.contains("failed to spawn"));
    }

    #[tokio::test]
    async fn immediate_exit_fails_the_probe() {
        quiet_logs();
        let config = stdio_server("false", &[]);
        let report = probe_server("flaky", &config).await;
        assert!(!report.passed);
        assert!(report.detail.contains("exited immediately"));
    }

    #[tokio::test]
    async fn unresponsive_server_fails_without_hanging() {
        quiet_logs();
        // reads stdin forever, never answers
        let config = stdio_server("sh", &["-c", "while read line; do :; done"]);
        let report = probe_server("mute", &config).await;
        assert!(!report.passed);
        assert!(report.detail.contains("no response to initialize"));
    }

    #[tokio::test]
    async fn responsive_server_passes() {
        quiet_logs();
        let config = stdio_server(
            "sh",
            &[
                "-c",
                r#"while read line; do echo '{"jsonrpc":"2.0","id":0,"result":{}}'; done"#,
            ],
        );
        let report = probe_server("echoer", &config).await;
        assert!(report.passed, "detail: {}", report.detail);
        assert!(report.tools_listed);
        assert!(report.resources_listed);
    }
}
