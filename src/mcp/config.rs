// src/mcp/config.rs
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum McpConfigError {
    #[error("MCP config file not found at {0}")]
    NotFound(String),
    #[error("Invalid JSON in config file: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Deserialize, Clone)]
pub struct McpConfig {
    #[serde(rename = "mcpServers", default)]
    pub mcp_servers: BTreeMap<String, ServerConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(rename = "type")]
    pub transport: Option<String>,
    pub command: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: HashMap<String, String>,
}

impl ServerConfig {
    pub fn is_stdio(&self) -> bool {
        self.transport.as_deref() == Some("stdio")
    }
}

pub fn load_config(path: &Path) -> Result<McpConfig, McpConfigError> {
    if !path.exists() {
        return Err(McpConfigError::NotFound(path.display().to_string()));
    }
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Expand `~` and environment variables in a command argument. Unset
/// variables are left as-is rather than failing the whole server check.
pub fn expand_arg(arg: &str) -> String {
    shellexpand::full(arg)
        .map(|expanded| expanded.into_owned())
        .unwrap_or_else(|_| arg.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "mcpServers": {
            "browser": {
                "type": "stdio",
                "command": "docker",
                "args": ["run", "-i", "--rm", "mcr.microsoft.com/playwright/mcp"],
                "env": {"DISPLAY": ":0"}
            },
            "files": {
                "type": "stdio",
                "command": "npx",
                "args": ["-y", "@modelcontextprotocol/server-filesystem", "~/projects"]
            },
            "remote": {
                "type": "sse"
            }
        }
    }"#;

    #[test]
    fn parses_the_host_tool_config_shape() {
        let cfg: McpConfig = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(cfg.mcp_servers.len(), 3);

        let browser = &cfg.mcp_servers["browser"];
        assert!(browser.is_stdio());
        assert_eq!(browser.command.as_deref(), Some("docker"));
        assert_eq!(browser.args.len(), 4);
        assert_eq!(browser.env["DISPLAY"], ":0");

        let files = &cfg.mcp_servers["files"];
        assert!(files.env.is_empty());

        assert!(!cfg.mcp_servers["remote"].is_stdio());
    }

    #[test]
    fn missing_servers_key_means_empty_map() {
        let cfg: McpConfig = serde_json::from_str("{}").unwrap();
        assert!(cfg.mcp_servers.is_empty());
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(&dir.path().join("mcp.json")).unwrap_err();
        assert!(matches!(err, McpConfigError::NotFound(_)));
    }

    #[test]
    fn load_reports_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mcp.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"{ not json").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, McpConfigError::InvalidJson(_)));
    }

    #[test]
    fn expands_tilde_and_env_vars() {
        let home = std::env::var("HOME").unwrap();
        assert_eq!(expand_arg("~/projects"), format!("{}/projects", home));
        assert_eq!(expand_arg("$HOME/projects"), format!("{}/projects", home));
        // plain args pass through untouched
        assert_eq!(expand_arg("--rm"), "--rm");
    }
}
