//! Application configuration

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

use crate::application::services::{ArtifactFormat, RetentionMode};
use crate::infrastructure::publishers::PublisherBackend;

/// Application configuration loaded from environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Export pipeline configuration
    pub export: ExportConfig,

    /// Message broker configuration
    pub broker: BrokerConfig,

    /// Demo simulation driver configuration
    pub simulation: SimulationConfig,
}

/// Snapshot export configuration
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Canonical artifact path (overwrite mode)
    pub output_path: PathBuf,
    /// Keep every cycle (history) instead of only the latest (overwrite)
    pub keep_history: bool,
    /// Export interval in simulated seconds
    pub interval_secs: u64,
    /// Line format of the canonical artifact
    pub artifact_format: ArtifactFormat,
}

impl ExportConfig {
    pub fn retention_mode(&self) -> RetentionMode {
        RetentionMode::from_keep_history(self.keep_history)
    }
}

/// Message broker configuration
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    /// Publisher backend: "memory" or "kafka"
    pub backend: PublisherBackend,
    /// Broker endpoint address
    pub bootstrap_servers: String,
    /// Destination topic
    pub topic: String,
    /// How long to wait for a publish acknowledgement (milliseconds)
    pub publish_timeout_ms: u64,
    /// Max records in flight per cycle
    pub publish_concurrency: usize,
}

/// Demo world driver configuration
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub agent_count: usize,
    pub grid_rows: i32,
    pub grid_cols: i32,
    /// Simulated milliseconds per iteration
    pub step_millis: i64,
    /// Wall-clock milliseconds between iterations
    pub tick_millis: u64,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_source(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_source<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let output_path = lookup("EXPORT_OUTPUT_PATH")
            .unwrap_or_else(|| "./data/snapshot.jsonl".to_string());
        if output_path.trim().is_empty() {
            bail!("EXPORT_OUTPUT_PATH must not be empty");
        }

        let interval_secs: u64 = parse_or(&lookup, "EXPORT_INTERVAL_SECS", 5)
            .context("EXPORT_INTERVAL_SECS must be a whole number of seconds")?;
        if interval_secs == 0 {
            bail!("EXPORT_INTERVAL_SECS must be greater than zero");
        }

        let publish_concurrency: usize = parse_or(&lookup, "BROKER_PUBLISH_CONCURRENCY", 4)
            .context("BROKER_PUBLISH_CONCURRENCY must be a positive integer")?;
        if publish_concurrency == 0 {
            bail!("BROKER_PUBLISH_CONCURRENCY must be greater than zero");
        }

        Ok(Self {
            export: ExportConfig {
                output_path: PathBuf::from(output_path),
                keep_history: parse_or(&lookup, "EXPORT_KEEP_HISTORY", true)
                    .context("EXPORT_KEEP_HISTORY must be true or false")?,
                interval_secs,
                artifact_format: parse_or(&lookup, "EXPORT_ARTIFACT_FORMAT", ArtifactFormat::JsonLines)
                    .context("EXPORT_ARTIFACT_FORMAT must be jsonl or csv")?,
            },

            broker: BrokerConfig {
                backend: parse_or(&lookup, "BROKER_BACKEND", PublisherBackend::Memory)
                    .context("BROKER_BACKEND must be memory or kafka")?,
                bootstrap_servers: lookup("BROKER_BOOTSTRAP_SERVERS")
                    .unwrap_or_else(|| "localhost:9092".to_string()),
                topic: lookup("BROKER_TOPIC")
                    .unwrap_or_else(|| "simulation-snapshots".to_string()),
                publish_timeout_ms: parse_or(&lookup, "BROKER_PUBLISH_TIMEOUT_MS", 5000)
                    .context("BROKER_PUBLISH_TIMEOUT_MS must be a number of milliseconds")?,
                publish_concurrency,
            },

            simulation: SimulationConfig {
                agent_count: parse_or(&lookup, "SIM_AGENT_COUNT", 10)
                    .context("SIM_AGENT_COUNT must be a number")?,
                grid_rows: parse_or(&lookup, "SIM_GRID_ROWS", 100)
                    .context("SIM_GRID_ROWS must be a number")?,
                grid_cols: parse_or(&lookup, "SIM_GRID_COLS", 100)
                    .context("SIM_GRID_COLS must be a number")?,
                step_millis: parse_or(&lookup, "SIM_STEP_MILLIS", 1000)
                    .context("SIM_STEP_MILLIS must be a number")?,
                tick_millis: parse_or(&lookup, "SIM_TICK_MILLIS", 100)
                    .context("SIM_TICK_MILLIS must be a number")?,
            },
        })
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{}: invalid value {:?}: {}", key, raw, e)),
        _ => Ok(default),
    }
}
