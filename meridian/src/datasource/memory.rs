use std::sync::Arc;

use meridian_types::Rect;

use crate::datasource::{Datasource, DatasourceKind, Parameters};
use crate::error::DatasourceError;
use crate::feature::{Feature, FeatureRef};
use crate::featureset::Featureset;
use crate::query::Query;

/// Datasource that keeps all its features in memory.
///
/// A query returns the features whose envelope intersects the query extent, in insertion order. Features without
/// geometries are always returned.
#[derive(Debug, Clone)]
pub struct MemoryDatasource {
    kind: DatasourceKind,
    params: Parameters,
    envelope: Option<Rect>,
    features: Vec<FeatureRef>,
}

impl MemoryDatasource {
    /// Type name of the datasource in the registry.
    pub const TYPE_NAME: &'static str = "memory";

    /// Creates an empty datasource of the given kind.
    pub fn new(kind: DatasourceKind) -> Self {
        Self {
            kind,
            params: Parameters::new().with(Parameters::TYPE, Self::TYPE_NAME),
            envelope: None,
            features: vec![],
        }
    }

    /// Creates a vector datasource with the given features.
    pub fn with_features(features: impl IntoIterator<Item = Feature>) -> Self {
        let mut source = Self::new(DatasourceKind::Vector);
        for feature in features {
            source.push(feature);
        }
        source
    }

    /// Creates a datasource from configuration parameters.
    ///
    /// Recognized parameters are `kind` (`vector` or `raster`) and `extent` (`minx,miny,maxx,maxy`).
    pub fn from_params(params: &Parameters) -> Result<Self, DatasourceError> {
        let kind = match params.get_str("kind") {
            None | Some("vector") => DatasourceKind::Vector,
            Some("raster") => DatasourceKind::Raster,
            Some(_) => return Err(DatasourceError::InvalidParameter("kind".into())),
        };

        let envelope = params.get_str("extent").map(parse_extent).transpose()?;

        Ok(Self {
            kind,
            params: params.clone(),
            envelope,
            features: vec![],
        })
    }

    /// Sets the extent reported by [`Datasource::envelope`] instead of computing it from the features.
    pub fn set_envelope(&mut self, envelope: Rect) {
        self.envelope = Some(envelope);
    }

    /// Adds a feature.
    pub fn push(&mut self, feature: Feature) {
        self.features.push(Arc::new(feature));
    }

    /// Number of features in the source.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Returns true if the source contains no features.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

fn parse_extent(value: &str) -> Result<Rect, DatasourceError> {
    let coords = value
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| DatasourceError::InvalidParameter("extent".into()))?;

    match coords[..] {
        [x_min, y_min, x_max, y_max] => Ok(Rect::new(x_min, y_min, x_max, y_max)),
        _ => Err(DatasourceError::InvalidParameter("extent".into())),
    }
}

impl Datasource for MemoryDatasource {
    fn kind(&self) -> DatasourceKind {
        self.kind
    }

    fn envelope(&self) -> Rect {
        self.envelope
            .or_else(|| Rect::merge_all(self.features.iter().filter_map(|f| f.envelope())))
            .unwrap_or_else(|| Rect::new(0.0, 0.0, 0.0, 0.0))
    }

    fn features(&self, query: &Query) -> Result<Featureset, DatasourceError> {
        let bbox = *query.bbox();
        let features: Vec<_> = self
            .features
            .iter()
            .filter(|feature| {
                feature
                    .envelope()
                    .map_or(true, |envelope| envelope.intersects(&bbox))
            })
            .cloned()
            .collect();

        Ok(Featureset::new(features.into_iter()))
    }

    fn params(&self) -> &Parameters {
        &self.params
    }
}
