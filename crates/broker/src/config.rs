// path: crates/broker/src/config.rs
use serde::Deserialize;
use std::path::PathBuf;

use termlist_core::request::DEFAULT_MAX_PER_SHARD;

#[derive(Debug, Clone, Deserialize)]
pub struct BrokerConfig {
    pub addr: String,
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    /// Кап на партицию, если клиент не прислал `max_per_shard`.
    #[serde(default = "default_max_per_shard")]
    pub max_per_shard: i64,
    /// Дедлайн фан-аута по умолчанию; None: ждём всех.
    #[serde(default)]
    pub deadline_ms: Option<u64>,
    /// Корень для относительных путей партиций.
    #[serde(default)]
    pub partitions_root: Option<PathBuf>,
}

fn default_parallelism() -> usize {
    4
}
fn default_max_per_shard() -> i64 {
    DEFAULT_MAX_PER_SHARD
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8080".into(),
            parallelism: default_parallelism(),
            max_per_shard: default_max_per_shard(),
            deadline_ms: None,
            partitions_root: None,
        }
    }
}

impl BrokerConfig {
    pub fn from_env() -> Self {
        let addr = std::env::var("TL_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into());
        let parallelism = std::env::var("TL_PARALLELISM")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(default_parallelism());
        let max_per_shard = std::env::var("TL_MAX_PER_SHARD")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(default_max_per_shard());
        let deadline_ms = std::env::var("TL_DEADLINE_MS")
            .ok()
            .and_then(|s| s.parse().ok());
        let partitions_root = std::env::var("TL_PARTITIONS_ROOT").ok().map(PathBuf::from);

        Self {
            addr,
            parallelism,
            max_per_shard,
            deadline_ms,
            partitions_root,
        }
    }
}
