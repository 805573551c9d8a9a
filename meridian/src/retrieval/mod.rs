//! Asynchronous retrieval of features.
//!
//! A [`RetrievalTask`] asks a datasource for features on a [`WorkerPool`] thread, so that the pipeline can prepare
//! other layers while the data is loading.

use std::sync::Arc;

use tokio::sync::oneshot;

use crate::datasource::Datasource;
use crate::featureset::Featureset;
use crate::query::Query;

mod pool;

pub use pool::WorkerPool;

/// Running or finished query of one datasource.
///
/// The result is delivered exactly once: [`RetrievalTask::features`] consumes the task.
pub struct RetrievalTask {
    datasource: Arc<dyn Datasource>,
    query: Arc<Query>,
    result: oneshot::Receiver<Featureset>,
}

impl RetrievalTask {
    /// Queues the query on the pool and returns immediately.
    pub fn start(pool: &WorkerPool, datasource: Arc<dyn Datasource>, query: Query) -> Self {
        let query = Arc::new(query);
        let (sender, result) = oneshot::channel();

        let worker_source = datasource.clone();
        let worker_query = query.clone();
        pool.execute(move || {
            let features = match worker_source.features(&worker_query) {
                Ok(features) => features,
                Err(err) => {
                    log::error!("Failed to retrieve features: {err}");
                    Featureset::empty()
                }
            };

            if sender.send(features).is_err() {
                log::debug!("Retrieval result was discarded before the query finished");
            }
        });

        Self {
            datasource,
            query,
            result,
        }
    }

    /// The query the task runs.
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// The datasource the task queries.
    pub fn datasource(&self) -> &Arc<dyn Datasource> {
        &self.datasource
    }

    /// Blocks until the retrieval is finished and returns the features.
    ///
    /// If the datasource failed, the returned featureset is empty.
    ///
    /// Must not be called from inside an async runtime.
    pub fn features(self) -> Featureset {
        match self.result.blocking_recv() {
            Ok(features) => features,
            Err(_) => {
                log::error!("Retrieval worker stopped without producing features");
                Featureset::empty()
            }
        }
    }
}

impl std::fmt::Debug for RetrievalTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalTask")
            .field("query", &self.query)
            .finish_non_exhaustive()
    }
}
