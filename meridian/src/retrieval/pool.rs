use std::sync::Arc;

use tokio::runtime::{Builder, Runtime};

use crate::config::RenderConfig;
use crate::error::MeridianError;

/// Bounded pool of threads that run feature retrievals.
///
/// At most `worker_threads` retrievals run at the same time, the rest wait in a queue. The pool is cheap to clone,
/// and clones share the same threads, so one pool can serve any number of pipelines rendering concurrently.
#[derive(Clone)]
pub struct WorkerPool {
    runtime: Arc<Runtime>,
    worker_threads: usize,
}

impl WorkerPool {
    /// Starts a pool with the given number of retrieval threads.
    pub fn new(worker_threads: usize) -> Result<Self, MeridianError> {
        if worker_threads == 0 {
            return Err(MeridianError::Config(
                "worker pool needs at least one thread".into(),
            ));
        }

        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(worker_threads)
            .thread_name("meridian-retrieval")
            .build()?;

        log::debug!("Started retrieval pool with {worker_threads} threads");

        Ok(Self {
            runtime: Arc::new(runtime),
            worker_threads,
        })
    }

    /// Starts a pool sized by the configuration.
    pub fn from_config(config: &RenderConfig) -> Result<Self, MeridianError> {
        config.validate()?;
        Self::new(config.worker_threads)
    }

    /// Maximum number of retrievals running at the same time.
    pub fn worker_threads(&self) -> usize {
        self.worker_threads
    }

    /// Queues a blocking job.
    pub(crate) fn execute(&self, job: impl FnOnce() + Send + 'static) {
        // The handle is not needed: results are delivered through the job's own channel.
        drop(self.runtime.spawn_blocking(job));
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("worker_threads", &self.worker_threads)
            .finish()
    }
}
