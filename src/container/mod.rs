// src/container/mod.rs
mod runtimes;

pub use runtimes::*;

use docker::DockerRuntime;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Image the MCP browser-automation containers are started from.
pub const MCP_BROWSER_IMAGE: &str = "mcr.microsoft.com/playwright/mcp";

/// One container as reported by a runtime query. Transient; lives only for
/// the duration of a single invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerInfo {
    pub id: String,
    pub name: String,
    pub image: String,
    pub state: String,
}

#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Running containers whose originating image matches `image`.
    async fn list_by_ancestor(&self, image: &str) -> Result<Vec<ContainerInfo>>;

    /// Ask the runtime to stop one container by identifier.
    async fn stop(&self, id: &str) -> Result<()>;
}

pub fn create_runtime(runtime: &str) -> Result<Arc<dyn ContainerRuntime>> {
    match runtime {
        "docker" => Ok(Arc::new(DockerRuntime::new()?)),
        _ => Err(anyhow!("Unsupported runtime: {}", runtime)),
    }
}
