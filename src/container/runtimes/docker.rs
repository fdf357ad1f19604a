// src/container/runtimes/docker.rs
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use bollard::container::ListContainersOptions;
use bollard::Docker;
use std::collections::HashMap;

use crate::container::{ContainerInfo, ContainerRuntime};

#[derive(Debug, Clone)]
pub struct DockerRuntime {
    client: Docker,
}

impl DockerRuntime {
    pub fn new() -> Result<Self> {
        let client = Docker::connect_with_local_defaults()
            .map_err(|e| anyhow!("Failed to connect to Docker: {:?}", e))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn list_by_ancestor(&self, image: &str) -> Result<Vec<ContainerInfo>> {
        let mut filters = HashMap::new();
        filters.insert("ancestor".to_string(), vec![image.to_string()]);

        let containers = self
            .client
            .list_containers(Some(ListContainersOptions {
                all: false, // running containers only
                filters,
                ..Default::default()
            }))
            .await?;

        slog::debug!(slog_scope::logger(), "Found containers";
            "image" => image,
            "count" => containers.len()
        );

        Ok(containers
            .into_iter()
            .map(|c| ContainerInfo {
                id: c.id.unwrap_or_default(),
                name: c
                    .names
                    .unwrap_or_default()
                    .into_iter()
                    .map(|name| name.trim_start_matches('/').to_string())
                    .next()
                    .unwrap_or_default(),
                image: c.image.unwrap_or_default(),
                state: c.state.unwrap_or_default(),
            })
            .collect())
    }

    async fn stop(&self, id: &str) -> Result<()> {
        self.client
            .stop_container(id, None)
            .await
            .map_err(|e| anyhow!("Failed to stop container {}: {:?}", id, e))?;
        Ok(())
    }
}
