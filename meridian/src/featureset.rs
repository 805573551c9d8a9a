use crate::feature::FeatureRef;

/// Lazy, forward-only sequence of features returned by a datasource query.
///
/// A featureset cannot be restarted. To render the same features more than once, collect them into a
/// [`FeatureCache`](crate::processor::FeatureCache).
pub struct Featureset {
    inner: Box<dyn Iterator<Item = FeatureRef> + Send>,
}

impl Featureset {
    /// Wraps an iterator over features.
    pub fn new(features: impl Iterator<Item = FeatureRef> + Send + 'static) -> Self {
        Self {
            inner: Box::new(features),
        }
    }

    /// Featureset without any features.
    pub fn empty() -> Self {
        Self::new(std::iter::empty())
    }
}

impl Iterator for Featureset {
    type Item = FeatureRef;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl FromIterator<FeatureRef> for Featureset {
    fn from_iter<T: IntoIterator<Item = FeatureRef>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect::<Vec<_>>().into_iter())
    }
}

impl std::fmt::Debug for Featureset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Featureset").finish_non_exhaustive()
    }
}
