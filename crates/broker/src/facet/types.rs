use serde::{Deserialize, Serialize};
use std::time::Duration;

use termlist_core::{FacetResult, FacetSpec};

// --- ВХОД ---

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FacetLimits {
    pub parallelism: Option<usize>,
    pub deadline_ms: Option<u64>,
}

impl FacetLimits {
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }
}

/// Тело `POST /facet`: сам фасет + какие партиции опрашивать.
#[derive(Debug, Clone, Deserialize)]
pub struct FacetHttpRequest {
    #[serde(flatten)]
    pub facet: FacetSpec,
    /// Каталоги партиций (какие опрашивать: решает вызывающий).
    #[serde(default)]
    pub partitions: Vec<String>,
    #[serde(default)]
    pub limits: Option<FacetLimits>,
}

// --- ВЫХОД ---

#[derive(Debug, Clone, Serialize)]
pub struct PartitionFailure {
    pub partition: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FacetMetrics {
    pub partitions_total: usize,
    pub partitions_ok: usize,
    pub partitions_failed: usize,
    pub partitions_timed_out: usize,
    /// Сумма `doc_count` по открытым партициям.
    pub docs_total: u64,
    pub deadline_hit: bool,
    pub saturated_sem: usize,
    pub took_ms: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<PartitionFailure>,
}

/// `{ "name", "type": "term_list", "entries": [...], "metrics": {...} }`
#[derive(Debug, Clone, Serialize)]
pub struct FacetResponse {
    #[serde(flatten)]
    pub result: FacetResult,
    pub metrics: FacetMetrics,
}
