//! Testing infrastructure for the admin backend
//!
//! [`memory`] provides an in-memory data source that evaluates queries
//! directly and is used by unit and handler tests. [`TestEnvironment`]
//! spins up an ephemeral SurrealDB container for integration tests that
//! talk to a real database over HTTP.
//!
//! The container is started when the environment is created and removed
//! when it goes out of scope.

pub mod fixtures;
pub mod memory;

pub use memory::{InMemoryConnector, InMemoryDataSource, InMemoryStore, UnreachableConnector};

use anyhow::{Context, Result};
use shared::datasource::ConnectionSettings;
use std::time::Duration;
use testcontainers::{
    core::IntoContainerPort,
    runners::AsyncRunner,
    ContainerAsync, GenericImage, ImageExt,
};

const SURREAL_IMAGE: &str = "surrealdb/surrealdb";
const SURREAL_TAG: &str = "v1.2.1";
const SURREAL_USER: &str = "root";
const SURREAL_PASS: &str = "test_password";

/// Test environment with a SurrealDB container
pub struct TestEnvironment {
    surreal_url: String,
    // Keeps the container alive; dropping it stops and removes the container
    _surreal: Option<ContainerAsync<GenericImage>>,
}

impl TestEnvironment {
    /// Starts an in-memory SurrealDB container.
    ///
    /// Set `USE_TESTCONTAINERS=false` and `SURREAL_URL` to run against an
    /// existing server instead.
    pub async fn new() -> Result<Self> {
        let use_testcontainers = std::env::var("USE_TESTCONTAINERS")
            .unwrap_or_else(|_| "true".to_string())
            .parse::<bool>()
            .unwrap_or(true);

        if !use_testcontainers {
            return Ok(Self::from_env_vars());
        }

        let surreal = GenericImage::new(SURREAL_IMAGE, SURREAL_TAG)
            .with_exposed_port(8000.tcp())
            .with_cmd([
                "start",
                "--user",
                SURREAL_USER,
                "--pass",
                SURREAL_PASS,
                "memory",
            ])
            .start()
            .await
            .context("Failed to start SurrealDB container")?;

        let port = surreal
            .get_host_port_ipv4(8000.tcp())
            .await
            .context("Failed to get SurrealDB container port")?;
        let surreal_url = format!("http://localhost:{}", port);

        log::info!("Started SurrealDB container at {}", surreal_url);

        Ok(Self {
            surreal_url,
            _surreal: Some(surreal),
        })
    }

    fn from_env_vars() -> Self {
        let surreal_url = std::env::var("SURREAL_URL")
            .unwrap_or_else(|_| "http://localhost:8000".to_string());

        log::info!("Using existing SurrealDB at {}", surreal_url);

        Self { surreal_url, _surreal: None }
    }

    pub fn surreal_url(&self) -> &str {
        &self.surreal_url
    }

    /// Connection settings for a fresh namespace/database pair
    pub fn settings(&self, database: &str) -> ConnectionSettings {
        ConnectionSettings {
            url: self.surreal_url.clone(),
            namespace: "test".to_string(),
            database: database.to_string(),
            username: std::env::var("SURREAL_USERNAME").unwrap_or_else(|_| SURREAL_USER.to_string()),
            password: std::env::var("SURREAL_PASSWORD").unwrap_or_else(|_| SURREAL_PASS.to_string()),
        }
    }

    /// Polls the health endpoint until the server answers
    pub async fn wait_for_ready(&self) -> Result<()> {
        let client = reqwest::Client::new();
        let health = format!("{}/health", self.surreal_url);

        for attempt in 0..20u64 {
            match client.get(&health).send().await {
                Ok(response) if response.status().is_success() => return Ok(()),
                Ok(response) => log::warn!(
                    "SurrealDB not ready (attempt {}): status {}",
                    attempt + 1,
                    response.status()
                ),
                Err(e) => log::warn!("SurrealDB not ready (attempt {}): {}", attempt + 1, e),
            }
            tokio::time::sleep(Duration::from_millis(250 * (attempt + 1))).await;
        }

        Err(anyhow::anyhow!("SurrealDB at {} did not become ready", self.surreal_url))
    }
}
