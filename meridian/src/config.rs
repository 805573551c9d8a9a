#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::MeridianError;

/// Configuration of the rendering pipeline.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RenderConfig {
    /// Number of threads that retrieve features from datasources. Retrievals beyond this number wait in a queue.
    pub worker_threads: usize,
    /// Multiplier applied to the scale denominator of the map, e.g. for high-dpi output.
    pub scale_factor: f64,
}

impl RenderConfig {
    /// Default size of the retrieval pool.
    pub const DEFAULT_WORKER_THREADS: usize = 25;

    /// Checks that the values can be used to set up a pipeline.
    pub fn validate(&self) -> Result<(), MeridianError> {
        if self.worker_threads == 0 {
            return Err(MeridianError::Config(
                "worker_threads must be at least 1".into(),
            ));
        }

        if !(self.scale_factor.is_finite() && self.scale_factor > 0.0) {
            return Err(MeridianError::Config(format!(
                "scale_factor must be a positive number, got {}",
                self.scale_factor
            )));
        }

        Ok(())
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            worker_threads: Self::DEFAULT_WORKER_THREADS,
            scale_factor: 1.0,
        }
    }
}
