use std::sync::Arc;
use std::time::{Duration, Instant};

use termlist_core::codec::CodecRegistry;
use termlist_core::request::{DEFAULT_MAX_PER_SHARD, FACET_TYPE};
use termlist_core::validate::{validate_fields, FieldKinds};
use termlist_core::{FacetError, FacetRequest, Merger, PartitionScanner};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::BrokerConfig;
use crate::facet::executor::{ParallelExecutor, RunReport, TaskOutcome};
use crate::facet::types::*;
use crate::store::{PartitionStore, SharedPartition};

pub mod executor;
pub mod types;

/// Координатор scatter/gather: открыть партиции, проверить поля,
/// разослать скан, собрать partial-результаты и слить.
pub struct FacetCoordinator {
    default_parallelism: usize,
    default_max_per_shard: i64,
    default_deadline: Option<Duration>,
    store: Arc<dyn PartitionStore>,
    codecs: Arc<CodecRegistry>,
}

impl FacetCoordinator {
    pub fn new(store: Arc<dyn PartitionStore>) -> Self {
        Self {
            default_parallelism: 4,
            default_max_per_shard: DEFAULT_MAX_PER_SHARD,
            default_deadline: None,
            store,
            codecs: Arc::new(CodecRegistry::with_defaults()),
        }
    }

    pub fn from_config(cfg: &BrokerConfig, store: Arc<dyn PartitionStore>) -> Self {
        Self {
            default_parallelism: cfg.parallelism.max(1),
            default_max_per_shard: cfg.max_per_shard,
            default_deadline: cfg.deadline_ms.map(Duration::from_millis),
            ..Self::new(store)
        }
    }

    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.default_parallelism = parallelism.max(1);
        self
    }

    pub async fn handle(&self, req: FacetHttpRequest) -> Result<FacetResponse, FacetError> {
        let start = Instant::now();
        let request = Arc::new(req.facet.into_request_with(self.default_max_per_shard)?);

        let limits = req.limits.unwrap_or_default();
        let parallelism = limits
            .parallelism
            .unwrap_or(self.default_parallelism)
            .max(1);
        let deadline = limits.deadline().or(self.default_deadline);
        let deadline_at = deadline.map(|d| start + d);
        let executor = ParallelExecutor::new(parallelism);
        let ct = CancellationToken::new();

        let mut metrics = FacetMetrics {
            partitions_total: req.partitions.len(),
            ..Default::default()
        };

        // --- 1) открыть партиции ---
        let store = self.store.clone();
        let inputs = req
            .partitions
            .iter()
            .map(|p| (p.clone(), p.clone()))
            .collect::<Vec<_>>();
        let opened = executor
            .run_all(
                ct.clone(),
                inputs,
                move |id: String, _ct| {
                    let store = store.clone();
                    async move { store.open(&id).await }
                },
                deadline,
            )
            .await;
        let opened = collect_done(opened, &mut metrics);
        debug!(opened = opened.len(), "partitions opened");

        // --- 2) центральная проверка полей ---
        let mut catalog = FieldKinds::new();
        for (_, part) in &opened {
            metrics.docs_total += part.doc_count();
            for field in request.fields() {
                if let Some(kind) = part.field_kind(field) {
                    catalog.observe(field, kind);
                }
            }
        }
        if !opened.is_empty() {
            validate_fields(request.as_ref(), &catalog)?;
        }

        // --- 3) скан по партициям ---
        let remaining = deadline_at.map(|at| at.saturating_duration_since(Instant::now()));
        let scan_req = request.clone();
        let codecs = self.codecs.clone();
        let scanned = executor
            .run_all(
                ct.clone(),
                opened,
                move |part: SharedPartition, task_ct: CancellationToken| {
                    let req = scan_req.clone();
                    let codecs = codecs.clone();
                    async move {
                        tokio::task::spawn_blocking(move || {
                            scan_encoded(&req, &part, &codecs, &task_ct)
                        })
                        .await?
                    }
                },
                remaining,
            )
            .await;
        let blobs = collect_done(scanned, &mut metrics);

        // --- 4) декод + слияние ---
        let mut merger = Merger::new();
        for (partition, bytes) in blobs {
            match self.codecs.decode(&bytes) {
                Ok(partial) => {
                    metrics.partitions_ok += 1;
                    merger.push(partial);
                }
                Err(e) => {
                    warn!(partition = %partition, error = %e, "bad partial result");
                    metrics.partitions_failed += 1;
                    metrics.failures.push(PartitionFailure {
                        partition,
                        reason: e.to_string(),
                    });
                }
            }
        }
        let result = merger.finish(&request);

        metrics.took_ms = start.elapsed().as_millis() as u64;
        info!(
            facet = %result.name,
            entries = result.entries.len(),
            ok = metrics.partitions_ok,
            failed = metrics.partitions_failed,
            timed_out = metrics.partitions_timed_out,
            took_ms = metrics.took_ms,
            "facet done"
        );

        Ok(FacetResponse { result, metrics })
    }
}

/// Скан одной партиции и упаковка результата в wire-формат.
/// Отмена `ct` (дедлайн) останавливает скан на blocking-потоке.
fn scan_encoded(
    req: &FacetRequest,
    part: &SharedPartition,
    codecs: &CodecRegistry,
    ct: &CancellationToken,
) -> anyhow::Result<Vec<u8>> {
    let partial = PartitionScanner::new(req).scan_until(part.as_ref(), || ct.is_cancelled())?;
    Ok(codecs.encode(FACET_TYPE, &partial)?)
}

/// Оставляет только успешные задачи; остальное: в метрики и лог.
fn collect_done<O>(report: RunReport<O>, metrics: &mut FacetMetrics) -> Vec<(String, O)> {
    metrics.deadline_hit |= report.deadline_hit;
    metrics.saturated_sem += report.saturated_sem;

    let mut out = Vec::with_capacity(report.reports.len());
    for r in report.reports {
        match r.outcome {
            TaskOutcome::Done(v) => out.push((r.partition, v)),
            TaskOutcome::Failed(reason) => {
                let err = FacetError::partition_unavailable(&r.partition, &reason);
                warn!(error = %err, "partition excluded");
                metrics.partitions_failed += 1;
                metrics.failures.push(PartitionFailure {
                    partition: r.partition,
                    reason,
                });
            }
            TaskOutcome::TimedOut => {
                warn!(partition = %r.partition, "partition timed out");
                metrics.partitions_timed_out += 1;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use termlist_core::partition::memory::InMemoryPartition;

    fn part() -> SharedPartition {
        let mut p = InMemoryPartition::new("p0");
        p.add_terms("tags", ["pets", "cats"]);
        Arc::new(p)
    }

    #[test]
    fn scan_encoded_round_trips_through_registry() {
        let req = FacetRequest::builder(["tags"]).build().unwrap();
        let codecs = CodecRegistry::with_defaults();
        let bytes = scan_encoded(&req, &part(), &codecs, &CancellationToken::new()).unwrap();
        let partial = codecs.decode(&bytes).unwrap();
        assert_eq!(partial.partition_id, "p0");
        assert_eq!(partial.terms, vec!["pets", "cats"]);
    }

    #[test]
    fn cancelled_token_stops_the_scan() {
        let req = FacetRequest::builder(["tags"]).build().unwrap();
        let ct = CancellationToken::new();
        ct.cancel();
        let err = scan_encoded(&req, &part(), &CodecRegistry::with_defaults(), &ct).unwrap_err();
        let err = err.downcast::<FacetError>().unwrap();
        assert!(matches!(err, FacetError::Cancelled { ref partition } if partition == "p0"));
    }
}
