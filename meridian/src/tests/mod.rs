//! Fixtures shared by the tests of the crate.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use meridian_types::geo::ProjTransform;
use meridian_types::{Geom, Point2d, Rect};
use parking_lot::{Condvar, Mutex};

use crate::datasource::{Datasource, DatasourceKind, MemoryDatasource, Parameters};
use crate::error::DatasourceError;
use crate::feature::{Feature, FeatureId};
use crate::featureset::Featureset;
use crate::layer::Layer;
use crate::map::Map;
use crate::metawriter::{Metawriter, MetawriterContext};
use crate::query::Query;
use crate::render::Processor;
use crate::style::*;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn point_feature(id: FeatureId, x: f64, y: f64) -> Feature {
    Feature::new(id).with_geometry(Geom::Point(Point2d::new(x, y)))
}

/// Memory datasource that remembers the queries it received.
pub struct CountingDatasource {
    inner: MemoryDatasource,
    calls: AtomicUsize,
    queries: Mutex<Vec<Query>>,
}

impl CountingDatasource {
    pub fn new(inner: MemoryDatasource) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
            queries: Mutex::new(vec![]),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<Query> {
        self.queries.lock().last().cloned()
    }
}

impl Datasource for CountingDatasource {
    fn kind(&self) -> DatasourceKind {
        self.inner.kind()
    }

    fn envelope(&self) -> Rect {
        self.inner.envelope()
    }

    fn features(&self, query: &Query) -> Result<Featureset, DatasourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().push(query.clone());
        self.inner.features(query)
    }

    fn params(&self) -> &Parameters {
        self.inner.params()
    }
}

pub fn counting_source(features: Vec<Feature>) -> Arc<CountingDatasource> {
    Arc::new(CountingDatasource::new(MemoryDatasource::with_features(
        features,
    )))
}

/// How long a [`GatedDatasource`] waits for its gate before failing the query.
const GATE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Default)]
pub struct Gate {
    open: Mutex<bool>,
    opened: Condvar,
}

impl Gate {
    pub fn open(&self) {
        *self.open.lock() = true;
        self.opened.notify_all();
    }

    /// Returns false if the gate was not opened before the timeout.
    fn wait(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut open = self.open.lock();
        while !*open {
            if self.opened.wait_until(&mut open, deadline).timed_out() {
                return *open;
            }
        }

        true
    }
}

/// Memory datasource that can hold its query until a gate is opened, and open another gate when done.
///
/// Names of finished queries are appended to the shared `finished` list.
pub struct GatedDatasource {
    name: &'static str,
    inner: MemoryDatasource,
    waits_for: Option<Arc<Gate>>,
    opens: Option<Arc<Gate>>,
    finished: Arc<Mutex<Vec<&'static str>>>,
}

impl GatedDatasource {
    pub fn new(
        name: &'static str,
        features: Vec<Feature>,
        finished: Arc<Mutex<Vec<&'static str>>>,
    ) -> Self {
        Self {
            name,
            inner: MemoryDatasource::with_features(features),
            waits_for: None,
            opens: None,
            finished,
        }
    }

    pub fn waiting_for(mut self, gate: Arc<Gate>) -> Self {
        self.waits_for = Some(gate);
        self
    }

    pub fn opening(mut self, gate: Arc<Gate>) -> Self {
        self.opens = Some(gate);
        self
    }
}

impl Datasource for GatedDatasource {
    fn kind(&self) -> DatasourceKind {
        self.inner.kind()
    }

    fn envelope(&self) -> Rect {
        self.inner.envelope()
    }

    fn features(&self, query: &Query) -> Result<Featureset, DatasourceError> {
        if let Some(gate) = &self.waits_for {
            if !gate.wait(GATE_TIMEOUT) {
                return Err(DatasourceError::Connection(format!(
                    "gate of '{}' was never opened",
                    self.name
                )));
            }
        }

        let features = self.inner.features(query)?;
        self.finished.lock().push(self.name);
        if let Some(gate) = &self.opens {
            gate.open();
        }

        Ok(features)
    }

    fn params(&self) -> &Parameters {
        self.inner.params()
    }
}

/// Datasource whose queries always fail.
#[derive(Default)]
pub struct FailingDatasource {
    params: Parameters,
}

impl Datasource for FailingDatasource {
    fn kind(&self) -> DatasourceKind {
        DatasourceKind::Vector
    }

    fn envelope(&self) -> Rect {
        Rect::new(-1e7, -1e7, 1e7, 1e7)
    }

    fn features(&self, _query: &Query) -> Result<Featureset, DatasourceError> {
        Err(DatasourceError::Connection("connection refused".into()))
    }

    fn params(&self) -> &Parameters {
        &self.params
    }
}

/// Datasource that panics while querying.
#[derive(Default)]
pub struct PanickingDatasource {
    params: Parameters,
}

impl Datasource for PanickingDatasource {
    fn kind(&self) -> DatasourceKind {
        DatasourceKind::Vector
    }

    fn envelope(&self) -> Rect {
        Rect::new(-1e7, -1e7, 1e7, 1e7)
    }

    fn features(&self, _query: &Query) -> Result<Featureset, DatasourceError> {
        panic!("datasource bug");
    }

    fn params(&self) -> &Parameters {
        &self.params
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    StartMap,
    EndMap,
    StartLayer(String),
    EndLayer(String),
    Symbolizer {
        kind: &'static str,
        feature: FeatureId,
    },
    Batch {
        count: usize,
        feature: FeatureId,
    },
    Painted,
}

/// Processor that records every call it receives.
#[derive(Debug, Default)]
pub struct RecordingProcessor {
    pub batch: bool,
    pub events: Vec<Event>,
}

impl RecordingProcessor {
    fn record(&mut self, kind: &'static str, feature: &Feature) {
        self.events.push(Event::Symbolizer {
            kind,
            feature: feature.id(),
        });
    }

    /// Symbolizer calls as `(kind, feature id)` pairs.
    pub fn symbolizers(&self) -> Vec<(&'static str, FeatureId)> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Symbolizer { kind, feature } => Some((*kind, *feature)),
                _ => None,
            })
            .collect()
    }

    pub fn painted_count(&self) -> usize {
        self.events
            .iter()
            .filter(|event| **event == Event::Painted)
            .count()
    }

    pub fn lifecycle(&self) -> Vec<Event> {
        self.events
            .iter()
            .filter(|event| {
                matches!(
                    event,
                    Event::StartMap | Event::EndMap | Event::StartLayer(_) | Event::EndLayer(_)
                )
            })
            .cloned()
            .collect()
    }
}

impl Processor for RecordingProcessor {
    fn start_map_processing(&mut self, _map: &Map) {
        self.events.push(Event::StartMap);
    }

    fn end_map_processing(&mut self, _map: &Map) {
        self.events.push(Event::EndMap);
    }

    fn start_layer_processing(&mut self, layer: &Layer) {
        self.events.push(Event::StartLayer(layer.name().to_string()));
    }

    fn end_layer_processing(&mut self, layer: &Layer) {
        self.events.push(Event::EndLayer(layer.name().to_string()));
    }

    fn process_all(
        &mut self,
        symbolizers: &[Symbolizer],
        feature: &Feature,
        _: &ProjTransform,
    ) -> bool {
        if self.batch {
            self.events.push(Event::Batch {
                count: symbolizers.len(),
                feature: feature.id(),
            });
        }
        self.batch
    }

    fn process_point(&mut self, _: &PointSymbolizer, feature: &Feature, _: &ProjTransform) {
        self.record("point", feature);
    }

    fn process_line(&mut self, _: &LineSymbolizer, feature: &Feature, _: &ProjTransform) {
        self.record("line", feature);
    }

    fn process_line_pattern(
        &mut self,
        _: &LinePatternSymbolizer,
        feature: &Feature,
        _: &ProjTransform,
    ) {
        self.record("line-pattern", feature);
    }

    fn process_polygon(&mut self, _: &PolygonSymbolizer, feature: &Feature, _: &ProjTransform) {
        self.record("polygon", feature);
    }

    fn process_polygon_expression(
        &mut self,
        _: &PolygonExpressionSymbolizer,
        feature: &Feature,
        _: &ProjTransform,
    ) {
        self.record("polygon-expression", feature);
    }

    fn process_polygon_pattern(
        &mut self,
        _: &PolygonPatternSymbolizer,
        feature: &Feature,
        _: &ProjTransform,
    ) {
        self.record("polygon-pattern", feature);
    }

    fn process_raster(&mut self, _: &RasterSymbolizer, feature: &Feature, _: &ProjTransform) {
        self.record("raster", feature);
    }

    fn process_shield(&mut self, _: &ShieldSymbolizer, feature: &Feature, _: &ProjTransform) {
        self.record("shield", feature);
    }

    fn process_text(&mut self, _: &TextSymbolizer, feature: &Feature, _: &ProjTransform) {
        self.record("text", feature);
    }

    fn process_building(&mut self, _: &BuildingSymbolizer, feature: &Feature, _: &ProjTransform) {
        self.record("building", feature);
    }

    fn process_markers(&mut self, _: &MarkersSymbolizer, feature: &Feature, _: &ProjTransform) {
        self.record("markers", feature);
    }

    fn process_glyph(&mut self, _: &GlyphSymbolizer, feature: &Feature, _: &ProjTransform) {
        self.record("glyph", feature);
    }

    fn painted(&mut self) {
        self.events.push(Event::Painted);
    }
}

/// Metawriter that records its lifecycle.
#[derive(Default)]
pub struct RecordingMetawriter {
    pub events: Mutex<Vec<String>>,
}

impl Metawriter for RecordingMetawriter {
    fn start(&self, context: &MetawriterContext) {
        self.events.lock().push(format!(
            "start {}x{} {}",
            context.width, context.height, context.srs
        ));
    }

    fn stop(&self) {
        self.events.lock().push("stop".into());
    }
}
