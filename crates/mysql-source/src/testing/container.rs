//! Throwaway MySQL server in Docker for integration tests

use anyhow::{Context, Result};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use sync_core::Config;
use tracing::{debug, info};

const IMAGE: &str = "mysql:8.0";
const ROOT_PASSWORD: &str = "testpass";
const DATABASE: &str = "shop";

pub struct MySQLContainer {
    pub container_name: String,
    pub host_port: u16,
}

impl MySQLContainer {
    pub fn new(container_name: &str, host_port: u16) -> Self {
        Self {
            container_name: container_name.to_string(),
            host_port,
        }
    }

    /// Connection configuration for the server inside the container.
    pub fn config(&self) -> Config {
        Config {
            hostname: "127.0.0.1".to_string(),
            port: self.host_port,
            username: "root".to_string(),
            password: ROOT_PASSWORD.to_string(),
            database: DATABASE.to_string(),
            options: Vec::new(),
        }
    }

    /// Start the container, replacing any leftover one with the same name.
    pub fn start(&self) -> Result<()> {
        info!("Starting MySQL container: {}", self.container_name);
        self.remove_quietly();

        let output = Command::new("docker")
            .args([
                "run",
                "--name",
                &self.container_name,
                "-e",
                &format!("MYSQL_ROOT_PASSWORD={ROOT_PASSWORD}"),
                "-e",
                &format!("MYSQL_DATABASE={DATABASE}"),
                "-p",
                &format!("{}:3306", self.host_port),
                "-d",
                IMAGE,
            ])
            .output()
            .context("Failed to start Docker container")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("Failed to start container: {stderr}");
        }

        let container_id = String::from_utf8_lossy(&output.stdout).trim().to_string();
        info!("Started container: {}", container_id);
        Ok(())
    }

    /// Poll until the server accepts connections.
    pub async fn wait_until_ready(&self, timeout_secs: u64) -> Result<()> {
        let start = Instant::now();
        let timeout = Duration::from_secs(timeout_secs);
        let config = self.config();

        while start.elapsed() < timeout {
            match crate::client::connect(&config).await {
                Ok(conn) => {
                    let _ = conn.disconnect().await;
                    info!("MySQL is ready after {:?}", start.elapsed());
                    return Ok(());
                }
                Err(e) => {
                    debug!("Connection attempt failed: {}", e);
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }

        anyhow::bail!(
            "MySQL did not become ready within {timeout_secs} seconds\n{}",
            self.logs().unwrap_or_default()
        )
    }

    pub fn logs(&self) -> Result<String> {
        let output = Command::new("docker")
            .args(["logs", &self.container_name])
            .output()
            .context("Failed to get container logs")?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        Ok(format!("STDOUT:\n{stdout}\n\nSTDERR:\n{stderr}"))
    }

    pub fn stop(&self) {
        info!("Stopping container: {}", self.container_name);
        self.remove_quietly();
    }

    fn remove_quietly(&self) {
        let name = self.container_name.as_str();
        for args in [["stop", name], ["rm", name]] {
            let _ = Command::new("docker")
                .args(args)
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status();
        }
    }
}

impl Drop for MySQLContainer {
    fn drop(&mut self) {
        self.stop();
    }
}
