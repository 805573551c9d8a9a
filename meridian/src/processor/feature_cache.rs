use crate::feature::FeatureRef;
use crate::featureset::Featureset;

/// Features of one layer kept in memory so that the second and later styles of the layer do not query the
/// datasource again.
///
/// Only references are stored, features are never copied.
#[derive(Debug, Default)]
pub struct FeatureCache {
    features: Vec<FeatureRef>,
}

impl FeatureCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a feature.
    pub fn push(&mut self, feature: FeatureRef) {
        self.features.push(feature);
    }

    /// Replays the cached features in the order they were pushed.
    pub fn features(&self) -> Featureset {
        Featureset::new(self.features.clone().into_iter())
    }

    /// Number of cached features.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Returns true if the cache contains no features.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Removes all features.
    pub fn clear(&mut self) {
        self.features.clear();
    }
}
