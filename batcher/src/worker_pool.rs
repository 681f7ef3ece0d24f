use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Fixed-size pool of worker tasks draining a shared job queue.
///
/// Submission never blocks; jobs queue until a worker frees up. The waiting
/// count is observable so the submitter can throttle itself before the
/// queue grows without bound. Dropping the pool closes the queue and the
/// workers exit once it drains.
pub struct WorkerPool {
    job_tx: mpsc::UnboundedSender<Job>,
    waiting: Arc<AtomicUsize>,
}

impl WorkerPool {
    /// Spawns `pool_size` workers onto the current runtime.
    pub fn new(pool_size: usize) -> Self {
        let (job_tx, job_rx) = mpsc::unbounded_channel::<Job>();
        let job_rx = Arc::new(Mutex::new(job_rx));
        let waiting = Arc::new(AtomicUsize::new(0));

        for _ in 0..pool_size.max(1) {
            let job_rx = Arc::clone(&job_rx);
            let waiting = Arc::clone(&waiting);
            tokio::spawn(async move {
                loop {
                    // hold the receiver lock only while waiting for a job,
                    // never while running one
                    let job = job_rx.lock().await.recv().await;
                    match job {
                        Some(job) => {
                            waiting.fetch_sub(1, Ordering::SeqCst);
                            job.await;
                        }
                        None => break,
                    }
                }
            });
        }

        WorkerPool { job_tx, waiting }
    }

    /// Enqueues a job. Jobs submitted after the runtime shut down are
    /// silently dropped.
    pub fn submit<F>(&self, job: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.waiting.fetch_add(1, Ordering::SeqCst);
        if self.job_tx.send(Box::pin(job)).is_err() {
            self.waiting.fetch_sub(1, Ordering::SeqCst);
        }
    }

    /// Number of submitted jobs no worker has picked up yet.
    pub fn waiting_queue_size(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn runs_every_submitted_job() {
        let pool = WorkerPool::new(4);
        let counter = Arc::new(AtomicUsize::new(0));
        let (done_tx, mut done_rx) = mpsc::unbounded_channel();

        for _ in 0..32 {
            let counter = Arc::clone(&counter);
            let done_tx = done_tx.clone();
            pool.submit(async move {
                counter.fetch_add(1, Ordering::SeqCst);
                let _ = done_tx.send(());
            });
        }
        for _ in 0..32 {
            done_rx.recv().await.unwrap();
        }
        assert_eq!(counter.load(Ordering::SeqCst), 32);
        assert_eq!(pool.waiting_queue_size(), 0);
    }

    #[tokio::test]
    async fn concurrency_never_exceeds_the_pool_size() {
        let pool = WorkerPool::new(2);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (done_tx, mut done_rx) = mpsc::unbounded_channel();

        for _ in 0..16 {
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            let done_tx = done_tx.clone();
            pool.submit(async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                running.fetch_sub(1, Ordering::SeqCst);
                let _ = done_tx.send(());
            });
        }
        for _ in 0..16 {
            done_rx.recv().await.unwrap();
        }
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn waiting_queue_size_tracks_backlog() {
        let pool = WorkerPool::new(1);
        let (gate_tx, gate_rx) = tokio::sync::oneshot::channel::<()>();
        let gate_rx = Arc::new(Mutex::new(Some(gate_rx)));

        let gate = Arc::clone(&gate_rx);
        pool.submit(async move {
            if let Some(rx) = gate.lock().await.take() {
                let _ = rx.await;
            }
        });
        // give the single worker time to pick up the blocking job
        tokio::time::sleep(Duration::from_millis(10)).await;

        for _ in 0..5 {
            pool.submit(async {});
        }
        assert_eq!(pool.waiting_queue_size(), 5);
        let _ = gate_tx.send(());
    }
}
