// crates/broker/src/facet/executor.rs
use anyhow::Result;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};
use tokio_util::sync::CancellationToken;

/// Чем закончилась задача по одной партиции.
#[derive(Debug)]
pub enum TaskOutcome<O> {
    Done(O),
    Failed(String),
    /// Не успела до дедлайна (или отменена сверху).
    TimedOut,
}

#[derive(Debug)]
pub struct TaskReport<O> {
    pub partition: String,
    pub outcome: TaskOutcome<O>,
}

/// Отчёт по всему фан-ауту; `reports` в порядке входа.
#[derive(Debug)]
pub struct RunReport<O> {
    pub reports: Vec<TaskReport<O>>,
    pub deadline_hit: bool,
    pub saturated_sem: usize,
}

impl<O> RunReport<O> {
    fn empty() -> Self {
        Self {
            reports: Vec::new(),
            deadline_hit: false,
            saturated_sem: 0,
        }
    }
}

/// Параллельный исполнитель с семафором + дедлайном.
/// Ретраев нет: упавшая партиция просто попадает в отчёт как `Failed`.
pub struct ParallelExecutor {
    sem: Arc<Semaphore>,
}

impl ParallelExecutor {
    pub fn new(parallelism: usize) -> Self {
        Self {
            sem: Arc::new(Semaphore::new(parallelism.max(1))),
        }
    }

    /// Запускает `task_fn` для каждого `(partition, input)` и ждёт всех
    /// (барьер), либо дедлайна, либо отмены `root_ct`.
    pub async fn run_all<I, O, F, Fut>(
        &self,
        root_ct: CancellationToken,
        inputs: Vec<(String, I)>,
        task_fn: F,
        deadline: Option<Duration>,
    ) -> RunReport<O>
    where
        I: Send + 'static,
        O: Send + 'static,
        F: Fn(I, CancellationToken) -> Fut + Send + Sync + Clone + 'static,
        Fut: Future<Output = Result<O>> + Send + 'static,
    {
        if inputs.is_empty() {
            return RunReport::empty();
        }

        let merged_ct = root_ct.child_token();
        let deadline_hit = Arc::new(AtomicBool::new(false));

        let timer = deadline.map(|dl| {
            let merged_ct = merged_ct.clone();
            let flag = deadline_hit.clone();
            tokio::spawn(async move {
                tokio::time::sleep(dl).await;
                flag.store(true, Ordering::Relaxed);
                merged_ct.cancel();
            })
        });

        let names: Vec<String> = inputs.iter().map(|(n, _)| n.clone()).collect();
        let mut outcomes: Vec<Option<TaskOutcome<O>>> = names.iter().map(|_| None).collect();

        let (tx, mut rx) = mpsc::unbounded_channel::<(usize, Result<O>)>();
        let mut saturated_sem = 0usize;

        for (idx, (_name, input)) in inputs.into_iter().enumerate() {
            // семафор: быстрый путь try_acquire, медленный: ждём, но не дольше дедлайна
            let permit = match self.sem.clone().try_acquire_owned() {
                Ok(p) => p,
                Err(_) => {
                    saturated_sem += 1;
                    tokio::select! {
                        p = self.sem.clone().acquire_owned() => match p {
                            Ok(p) => p,
                            Err(_) => break, // семафор закрыт
                        },
                        _ = merged_ct.cancelled() => break,
                    }
                }
            };

            let txc = tx.clone();
            let task_fn = task_fn.clone();
            let task_ct = merged_ct.child_token();
            tokio::spawn(async move {
                let _g = permit;
                let res = tokio::select! {
                    r = task_fn(input, task_ct.clone()) => r,
                    _ = task_ct.cancelled() => return,
                };
                let _ = txc.send((idx, res));
            });
        }
        drop(tx);

        loop {
            tokio::select! {
                biased;
                msg = rx.recv() => match msg {
                    Some((idx, res)) => {
                        outcomes[idx] = Some(match res {
                            Ok(v) => TaskOutcome::Done(v),
                            Err(e) => TaskOutcome::Failed(format!("{e:#}")),
                        });
                    }
                    None => break,
                },
                _ = merged_ct.cancelled() => break,
            }
        }

        if let Some(t) = timer {
            t.abort();
        }
        // добиваем тех, кто ещё бежит
        merged_ct.cancel();

        let reports = names
            .into_iter()
            .zip(outcomes)
            .map(|(partition, outcome)| TaskReport {
                partition,
                outcome: outcome.unwrap_or(TaskOutcome::TimedOut),
            })
            .collect();

        RunReport {
            reports,
            deadline_hit: deadline_hit.load(Ordering::Relaxed),
            saturated_sem,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(n: usize) -> Vec<(String, usize)> {
        (0..n).map(|i| (format!("p{i}"), i)).collect()
    }

    #[tokio::test]
    async fn collects_all_in_input_order() {
        let ex = ParallelExecutor::new(2);
        let rep = ex
            .run_all(
                CancellationToken::new(),
                inputs(5),
                |i: usize, _ct| async move {
                    tokio::time::sleep(Duration::from_millis((5 - i as u64) * 3)).await;
                    Ok::<_, anyhow::Error>(i * 10)
                },
                None,
            )
            .await;
        let got: Vec<_> = rep
            .reports
            .iter()
            .map(|r| match r.outcome {
                TaskOutcome::Done(v) => v,
                _ => usize::MAX,
            })
            .collect();
        assert_eq!(got, vec![0, 10, 20, 30, 40]);
        assert!(!rep.deadline_hit);
    }

    #[tokio::test]
    async fn failures_are_reported_not_fatal() {
        let ex = ParallelExecutor::new(4);
        let rep = ex
            .run_all(
                CancellationToken::new(),
                inputs(3),
                |i: usize, _ct| async move {
                    if i == 1 {
                        anyhow::bail!("boom");
                    }
                    Ok::<_, anyhow::Error>(i)
                },
                None,
            )
            .await;
        assert!(matches!(rep.reports[0].outcome, TaskOutcome::Done(0)));
        assert!(matches!(rep.reports[1].outcome, TaskOutcome::Failed(ref m) if m.contains("boom")));
        assert!(matches!(rep.reports[2].outcome, TaskOutcome::Done(2)));
    }

    #[tokio::test]
    async fn slow_partition_times_out() {
        let ex = ParallelExecutor::new(4);
        let rep = ex
            .run_all(
                CancellationToken::new(),
                inputs(2),
                |i: usize, _ct| async move {
                    if i == 1 {
                        tokio::time::sleep(Duration::from_secs(30)).await;
                    }
                    Ok::<_, anyhow::Error>(i)
                },
                Some(Duration::from_millis(50)),
            )
            .await;
        assert!(rep.deadline_hit);
        assert!(matches!(rep.reports[0].outcome, TaskOutcome::Done(0)));
        assert!(matches!(rep.reports[1].outcome, TaskOutcome::TimedOut));
    }

    #[tokio::test]
    async fn empty_input_is_empty_report() {
        let ex = ParallelExecutor::new(1);
        let rep = ex
            .run_all(
                CancellationToken::new(),
                Vec::<(String, usize)>::new(),
                |i: usize, _ct| async move { Ok::<_, anyhow::Error>(i) },
                Some(Duration::from_millis(1)),
            )
            .await;
        assert!(rep.reports.is_empty());
        assert!(!rep.deadline_hit);
    }
}
