use super::Job;
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::{
    mpsc,
    Mutex,
};
use tracing::{
    debug,
    error,
};

/// Runs jobs on a bounded pool of workers that lives for one call.
#[derive(Debug, Clone, Copy)]
pub struct FanOutCollector {
    workers: usize,
}

impl FanOutCollector {
    /// A pool of `workers` workers; zero is raised to one.
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Workers actually started for `jobs` jobs.
    pub fn pool_size(&self, jobs: usize) -> usize {
        self.workers.min(jobs)
    }

    /// Attempts every job exactly once and returns once all of them are done.
    ///
    /// Outputs come back in completion order. A job that panics is logged and
    /// contributes no output; it never takes its worker or siblings down.
    pub async fn collect<J: Job>(&self, jobs: Vec<J>) -> Vec<J::Output> {
        if jobs.is_empty() {
            debug!("No jobs to run");
            return Vec::new();
        }

        let total = jobs.len();
        let (job_tx, job_rx) = mpsc::channel(total);
        for job in jobs {
            if let Err(err) = job_tx.try_send(job) {
                error!("Failed to queue job: {err}");
            }
        }
        // Closing the queue is the "no more work" signal.
        drop(job_tx);

        let queue = Arc::new(Mutex::new(job_rx));
        let (output_tx, mut output_rx) = mpsc::unbounded_channel();

        let pool = self.pool_size(total);
        debug!(jobs = total, workers = pool, "Starting workers");
        let handles = (0..pool)
            .map(|id| tokio::spawn(worker(id, Arc::clone(&queue), output_tx.clone())))
            .collect::<Vec<_>>();
        drop(output_tx);

        for joined in join_all(handles).await {
            if let Err(err) = joined {
                error!("Worker stopped unexpectedly: {err}");
            }
        }

        let mut outputs = Vec::with_capacity(total);
        while let Some(output) = output_rx.recv().await {
            outputs.push(output);
        }
        outputs
    }
}

async fn worker<J: Job>(
    id: usize,
    queue: Arc<Mutex<mpsc::Receiver<J>>>,
    outputs: mpsc::UnboundedSender<J::Output>,
) {
    loop {
        let next = queue.lock().await.recv().await;
        let Some(job) = next else {
            break;
        };

        let name = job.name();
        debug!(worker = id, job = %name, "Running job");
        match tokio::spawn(job.run()).await {
            Ok(output) => {
                if outputs.send(output).is_err() {
                    break;
                }
            }
            Err(err) => error!(worker = id, job = %name, "Job did not complete: {err}"),
        }
    }
    debug!(worker = id, "Queue drained");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        collectors::{
            testing::StubAgent,
            JobFuture,
            NodeJob,
        },
        error::Step,
        metrics::{
            Entity,
            MetricRecord,
        },
    };
    use pretty_assertions::assert_eq;
    use std::{
        sync::atomic::{
            AtomicUsize,
            Ordering,
        },
        time::Duration,
    };

    struct SleepJob {
        id: usize,
        in_flight: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
    }

    impl Job for SleepJob {
        type Output = usize;

        fn name(&self) -> String {
            format!("sleep-{}", self.id)
        }

        fn run(self) -> JobFuture<usize> {
            Box::pin(async move {
                let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                self.peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                self.in_flight.fetch_sub(1, Ordering::SeqCst);
                self.id
            })
        }
    }

    struct PanicJob(usize);

    impl Job for PanicJob {
        type Output = usize;

        fn name(&self) -> String {
            format!("panic-{}", self.0)
        }

        fn run(self) -> JobFuture<usize> {
            Box::pin(async move {
                if self.0 == 1 {
                    panic!("job {} exploded", self.0);
                }
                self.0
            })
        }
    }

    #[tokio::test]
    async fn zero_jobs_return_immediately() {
        let collector = FanOutCollector::new(5);
        assert_eq!(collector.pool_size(0), 0);

        let outputs = tokio::time::timeout(Duration::from_secs(1), collector.collect(Vec::<PanicJob>::new()))
            .await
            .unwrap();
        assert!(outputs.is_empty());
    }

    #[test]
    fn pool_is_bounded_by_workers_and_jobs() {
        assert_eq!(FanOutCollector::new(0).workers(), 1);
        assert_eq!(FanOutCollector::new(5).pool_size(2), 2);
        assert_eq!(FanOutCollector::new(5).pool_size(12), 5);
    }

    #[tokio::test]
    async fn runs_every_job_with_bounded_concurrency() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let jobs = (0..10)
            .map(|id| SleepJob {
                id,
                in_flight: Arc::clone(&in_flight),
                peak: Arc::clone(&peak),
            })
            .collect();

        let mut outputs = FanOutCollector::new(3).collect(jobs).await;
        outputs.sort_unstable();

        assert_eq!(outputs, (0..10).collect::<Vec<_>>());
        assert_eq!(peak.load(Ordering::SeqCst), 3);
        assert_eq!(in_flight.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn panicking_job_does_not_stop_the_others() {
        let jobs = (0..4).map(PanicJob).collect();

        let mut outputs = FanOutCollector::new(2).collect(jobs).await;
        outputs.sort_unstable();

        assert_eq!(outputs, vec![0, 2, 3]);
    }

    #[tokio::test]
    async fn latency_failures_stay_inside_their_job() {
        let jobs = (0..9)
            .map(|i| {
                let mut agent = StubAgent::healthy();
                if i % 3 == 0 {
                    agent.coordinates = Some(agent.coordinates.unwrap_or_default()[..1].to_vec());
                }
                NodeJob::with_api(
                    "consul-0",
                    Entity::new(format!("10.0.0.{i}:8301"), "co-agent"),
                    Arc::new(agent),
                    MetricRecord::new("ConsulAgentSample"),
                )
            })
            .collect();

        let reports = FanOutCollector::new(5).collect(jobs).await;

        assert_eq!(reports.len(), 9);
        let with_latency = reports
            .iter()
            .filter(|report| report.record.contains("net.agent.medianLatencyInMilliseconds"))
            .count();
        assert_eq!(with_latency, 6);
        for report in &reports {
            assert_eq!(report.record.value("runtime.goroutines"), Some(49.0));
            assert_eq!(report.record.value("agent.peers"), Some(3.0));
            let failed: Vec<Step> = report.failures.iter().map(|failure| failure.step).collect();
            if report.record.contains("net.agent.minLatencyInMilliseconds") {
                assert!(failed.is_empty());
            } else {
                assert_eq!(failed, vec![Step::Latency]);
            }
        }
    }
}
