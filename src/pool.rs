//! Small worker pool for running slow platform reads off the caller's thread.

use crossbeam_channel::{unbounded, Sender};
use std::thread::{self, JoinHandle};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Fixed-size pool of worker threads fed from one job queue.
pub struct WorkerPool {
    sender: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `size` workers (at least one).
    pub fn new(size: usize) -> Self {
        let (sender, receiver) = unbounded::<Job>();
        let workers = (0..size.max(1))
            .map(|index| {
                let receiver = receiver.clone();
                thread::Builder::new()
                    .name(format!("signal-worker-{index}"))
                    .spawn(move || {
                        // Exits once the pool drops its sender.
                        for job in receiver.iter() {
                            job();
                        }
                    })
            })
            .filter_map(|spawned| match spawned {
                Ok(handle) => Some(handle),
                Err(e) => {
                    tracing::error!("failed to spawn worker thread: {e}");
                    None
                }
            })
            .collect();

        Self {
            sender: Some(sender),
            workers,
        }
    }

    /// Number of live worker threads.
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Queue a job. Runs inline if no worker could be started.
    pub fn execute<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        match &self.sender {
            Some(sender) if !self.workers.is_empty() => {
                if let Err(e) = sender.send(Box::new(job)) {
                    (e.into_inner())();
                }
            }
            _ => job(),
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.sender.take();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_jobs_run_before_drop_returns() {
        let count = Arc::new(AtomicUsize::new(0));
        let pool = WorkerPool::new(3);
        assert_eq!(pool.size(), 3);

        for _ in 0..20 {
            let c = count.clone();
            pool.execute(move || {
                c.fetch_add(1, Ordering::SeqCst);
            });
        }
        drop(pool);

        assert_eq!(count.load(Ordering::SeqCst), 20);
    }

    #[test]
    fn test_zero_size_gets_one_worker() {
        assert_eq!(WorkerPool::new(0).size(), 1);
    }
}
