//! The rendering pipeline.
//!
//! [`FeatureStyleProcessor`] renders a [`Map`] with a [`Processor`] backend. For every visible layer it:
//!
//! 1. finds the part of the layer inside the map extent ([`negotiate_extent`]),
//! 2. selects the style rules active at the current scale and the feature attributes they need,
//! 3. starts retrieving the features on the [`WorkerPool`],
//! 4. evaluates the rules for every feature and sends the symbolizers of matched rules to the processor.
//!
//! When the whole map is rendered, the retrievals of all layers are started before the first layer is rendered, so
//! that loading of data overlaps with rendering. Layers are still rendered strictly in the order of the map.
//!
//! Problems with a single layer (missing style or datasource, unavailable projection, failed query) are logged and
//! the layer is skipped. They never stop rendering of the other layers.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use meridian_types::geo::ProjTransform;

use crate::config::RenderConfig;
use crate::datasource::{Datasource, DatasourceKind};
use crate::featureset::Featureset;
use crate::layer::Layer;
use crate::map::Map;
use crate::metawriter::MetawriterContext;
use crate::query::Query;
use crate::render::{dispatch_symbolizers, Processor};
use crate::retrieval::{RetrievalTask, WorkerPool};
use crate::style::Style;

mod attribute_collector;
mod extent;
mod feature_cache;
mod phase;
mod query_builder;
mod rule_resolver;
mod stats;

pub use attribute_collector::AttributeCollector;
pub use extent::negotiate_extent;
pub use feature_cache::FeatureCache;
pub use phase::RenderPhase;
pub use query_builder::build_query;
pub use rule_resolver::{ResolvedRules, RuleMatch};
pub use stats::{LayerStats, RenderStats, SkipReason, SkippedLayer, StyleStats};

/// Drives rendering of a map: retrieves features of the layers and sends them with their symbolizers to a
/// [`Processor`].
#[derive(Debug)]
pub struct FeatureStyleProcessor<'m> {
    map: &'m Map,
    pool: WorkerPool,
    scale_factor: f64,
}

/// A layer ready to be rendered: the retrieval is running.
struct LayerRenderTask<'a> {
    layer: &'a Layer,
    transform: ProjTransform,
    styles: Vec<(&'a str, &'a Style)>,
    retrieval: RetrievalTask,
}

/// State of one call to `apply` or `apply_layer`.
#[derive(Default)]
struct RenderPass {
    phase: RenderPhase,
    stats: RenderStats,
}

impl<'m> FeatureStyleProcessor<'m> {
    /// Creates a pipeline for the map that retrieves features on the given pool.
    pub fn new(map: &'m Map, pool: WorkerPool) -> Self {
        Self {
            map,
            pool,
            scale_factor: 1.0,
        }
    }

    /// Creates a pipeline with the scale factor from the configuration.
    pub fn with_config(map: &'m Map, pool: WorkerPool, config: &RenderConfig) -> Self {
        Self::new(map, pool).with_scale_factor(config.scale_factor)
    }

    /// Sets the multiplier of the map scale denominator.
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    /// The map being rendered.
    pub fn map(&self) -> &'m Map {
        self.map
    }

    /// Scale denominator the rules and layers are evaluated at.
    pub fn scale_denominator(&self) -> f64 {
        self.map.scale_denominator() * self.scale_factor
    }

    /// Renders all layers of the map.
    pub fn apply<P: Processor + ?Sized>(&self, processor: &mut P) -> RenderStats {
        let mut pass = RenderPass::default();
        self.start_map(processor, &mut pass);

        let scale_denominator = self.scale_denominator();
        log::trace!("Rendering map at scale 1:{scale_denominator:.0}");

        let mut tasks = vec![];
        for layer in self.map.layers() {
            if !layer.is_visible(scale_denominator) {
                pass.stats.skip(layer.name(), SkipReason::NotVisible);
                continue;
            }

            let mut names = BTreeSet::new();
            if let Some(task) =
                self.prepare_layer(layer, scale_denominator, &mut names, &mut pass)
            {
                tasks.push(task);
            }
        }

        for task in tasks {
            self.apply_to_layer(processor, task, scale_denominator, &mut pass);
        }

        self.end_map(processor, pass)
    }

    /// Renders a single layer.
    ///
    /// `names` contains attributes the caller needs in addition to the ones used by the style filters. After the
    /// call it contains all the attributes that were requested from the datasource.
    pub fn apply_layer<P: Processor + ?Sized>(
        &self,
        processor: &mut P,
        layer: &Layer,
        names: &mut BTreeSet<String>,
    ) -> RenderStats {
        let mut pass = RenderPass::default();
        self.start_map(processor, &mut pass);

        let scale_denominator = self.scale_denominator();
        if layer.is_visible(scale_denominator) {
            if let Some(task) = self.prepare_layer(layer, scale_denominator, names, &mut pass) {
                self.apply_to_layer(processor, task, scale_denominator, &mut pass);
            }
        } else {
            pass.stats.skip(layer.name(), SkipReason::NotVisible);
        }

        self.end_map(processor, pass)
    }

    fn start_map<P: Processor + ?Sized>(&self, processor: &mut P, pass: &mut RenderPass) {
        processor.start_map_processing(self.map);
        pass.phase.advance(RenderPhase::MapStarted);

        let context = MetawriterContext {
            width: self.map.width(),
            height: self.map.height(),
            srs: self.map.srs(),
            output_properties: self.map.metawriter_output_properties(),
        };
        for (name, metawriter) in self.map.metawriters() {
            log::trace!("Starting metawriter '{name}'");
            metawriter.start(&context);
        }
    }

    fn end_map<P: Processor + ?Sized>(
        &self,
        processor: &mut P,
        mut pass: RenderPass,
    ) -> RenderStats {
        for (name, metawriter) in self.map.metawriters() {
            log::trace!("Stopping metawriter '{name}'");
            metawriter.stop();
        }

        pass.phase.advance(RenderPhase::MapEnded);
        processor.end_map_processing(self.map);
        pass.stats
    }

    fn prepare_layer<'a>(
        &'a self,
        layer: &'a Layer,
        scale_denominator: f64,
        names: &mut BTreeSet<String>,
        pass: &mut RenderPass,
    ) -> Option<LayerRenderTask<'a>> {
        pass.phase.advance(RenderPhase::LayerStarted);
        let task = self.try_prepare_layer(layer, scale_denominator, names);
        match task {
            Ok(task) => {
                pass.phase.advance(RenderPhase::DataRequested);
                Some(task)
            }
            Err(reason) => {
                pass.stats.skip(layer.name(), reason);
                pass.phase.advance(RenderPhase::LayerEnded);
                None
            }
        }
    }

    fn try_prepare_layer<'a>(
        &'a self,
        layer: &'a Layer,
        scale_denominator: f64,
        names: &mut BTreeSet<String>,
    ) -> Result<LayerRenderTask<'a>, SkipReason> {
        if layer.styles().is_empty() {
            log::warn!("No style for layer '{}'", layer.name());
            return Err(SkipReason::NoStyles);
        }

        let Some(datasource) = layer.datasource() else {
            log::warn!("No datasource for layer '{}'", layer.name());
            return Err(SkipReason::NoDatasource);
        };

        let transform = ProjTransform::new(self.map.srs(), layer.srs()).map_err(|err| {
            log::warn!(
                "Cannot transform map reference system {} into {} of layer '{}': {err}",
                self.map.srs(),
                layer.srs(),
                layer.name()
            );
            SkipReason::Projection(err.to_string())
        })?;

        if !transform.is_identity() {
            log::trace!(
                "Reprojecting layer '{}' from {} to {}",
                layer.name(),
                layer.srs(),
                self.map.srs()
            );
        }

        let mut map_extent = self.map.buffered_extent();
        if let Some(maximum_extent) = self.map.maximum_extent() {
            let Some(limited) = map_extent.intersection(&maximum_extent) else {
                log::trace!(
                    "Map extent is outside of the maximum extent, skipping layer '{}'",
                    layer.name()
                );
                return Err(SkipReason::OutsideExtent);
            };
            map_extent = limited;
        }

        let layer_envelope = datasource.envelope();
        let Some(query_extent) =
            negotiate_extent(&map_extent, &layer_envelope, &transform, layer.name())
        else {
            log::trace!("Layer '{}' is outside of the map extent", layer.name());
            return Err(SkipReason::OutsideExtent);
        };

        let styles = self.active_styles(layer, datasource.as_ref(), scale_denominator, names);
        if styles.is_empty() {
            return Err(SkipReason::NoActiveStyles);
        }

        let filter_factor =
            Self::raster_filter_factor(datasource.as_ref(), &styles, scale_denominator);
        let query = build_query(self.map, query_extent, scale_denominator, names, filter_factor);
        let retrieval = RetrievalTask::start(&self.pool, datasource.clone(), query);

        Ok(LayerRenderTask {
            layer,
            transform,
            styles,
            retrieval,
        })
    }

    /// Styles of the layer with at least one rule active at the scale. Adds attributes used by the active rules to
    /// `names`.
    fn active_styles<'a>(
        &'a self,
        layer: &'a Layer,
        datasource: &dyn Datasource,
        scale_denominator: f64,
        names: &mut BTreeSet<String>,
    ) -> Vec<(&'a str, &'a Style)> {
        let mut collector = AttributeCollector::new(names);
        let mut active_styles = vec![];

        for style_name in layer.styles() {
            let Some(style) = self.map.find_style(style_name) else {
                log::warn!(
                    "Style '{style_name}' required for layer '{}' does not exist",
                    layer.name()
                );
                continue;
            };

            let mut has_active_rules = false;
            for rule in style.active_rules(scale_denominator) {
                has_active_rules = true;
                // Raster data cannot be filtered by attributes.
                if datasource.kind() == DatasourceKind::Vector {
                    collector.collect(rule);
                }

                for symbolizer in &rule.symbolizers {
                    if let Some(reference) = symbolizer.metawriter() {
                        if self.map.find_metawriter(&reference.name).is_none() {
                            log::warn!(
                                "Metawriter '{}' used by style '{style_name}' is not defined",
                                reference.name
                            );
                        }
                    }
                }
            }

            if has_active_rules {
                active_styles.push((style_name.as_str(), style));
            } else {
                log::warn!(
                    "Style '{style_name}' of layer '{}' has no rules active at scale 1:{scale_denominator:.0}",
                    layer.name()
                );
            }
        }

        active_styles
    }

    /// Filter factor of a raster query, taken from the raster symbolizers of the active rules unless the datasource
    /// sets it explicitly.
    fn raster_filter_factor(
        datasource: &dyn Datasource,
        styles: &[(&str, &Style)],
        scale_denominator: f64,
    ) -> f64 {
        const DEFAULT_FILTER_FACTOR: f64 = 1.0;

        if datasource.kind() != DatasourceKind::Raster
            || datasource.params().get_or("filter_factor", 0.0) != 0.0
        {
            return DEFAULT_FILTER_FACTOR;
        }

        let mut filter_factor = None;
        let raster_symbolizers = styles
            .iter()
            .flat_map(|(_, style)| style.active_rules(scale_denominator))
            .flat_map(|rule| &rule.symbolizers)
            .filter_map(|symbolizer| symbolizer.as_raster());

        for symbolizer in raster_symbolizers {
            let value = symbolizer.filter_factor();
            if let Some(previous) = filter_factor {
                if previous != value {
                    log::warn!(
                        "Raster symbolizers of a layer have different filter factors ({previous} and {value}), \
                         the last one is used"
                    );
                }
            }
            filter_factor = Some(value);
        }

        filter_factor.unwrap_or(DEFAULT_FILTER_FACTOR)
    }

    fn apply_to_layer<P: Processor + ?Sized>(
        &self,
        processor: &mut P,
        task: LayerRenderTask,
        scale_denominator: f64,
        pass: &mut RenderPass,
    ) {
        let LayerRenderTask {
            layer,
            transform,
            styles,
            retrieval,
        } = task;

        pass.phase.advance(RenderPhase::DataConsumed);
        processor.start_layer_processing(layer);

        let datasource = retrieval.datasource().clone();
        let query = retrieval.query().clone();
        let mut retrieval = Some(retrieval);

        let mut cache = FeatureCache::new();
        let mut fill_cache = layer.cache_features() && styles.len() > 1;
        let use_cache = fill_cache;

        let mut layer_stats = LayerStats {
            name: layer.name().to_string(),
            styles: Vec::with_capacity(styles.len()),
        };

        for (style_name, style) in styles {
            let started = Instant::now();
            let rules = ResolvedRules::new(style, scale_denominator);

            let features = match retrieval.take() {
                Some(retrieval) => retrieval.features(),
                None if use_cache => cache.features(),
                None => self.requery(&datasource, query.clone()),
            };

            let mut style_stats = StyleStats {
                name: style_name.to_string(),
                queried: 0,
                rendered: 0,
                elapsed: Default::default(),
            };

            for feature in features {
                style_stats.queried += 1;
                if fill_cache {
                    cache.push(feature.clone());
                }

                let matched = rules.evaluate(&feature);
                if matched.rules.is_empty() {
                    continue;
                }

                style_stats.rendered += 1;
                processor.painted();
                for rule in matched.rules {
                    dispatch_symbolizers(processor, &rule.symbolizers, &feature, &transform);
                }
            }

            fill_cache = false;
            style_stats.elapsed = started.elapsed();
            style_stats.log(layer.name());
            layer_stats.styles.push(style_stats);
        }

        processor.end_layer_processing(layer);
        pass.phase.advance(RenderPhase::LayerEnded);
        pass.stats.layers.push(layer_stats);
    }

    /// Queries the datasource again for a style of a layer without feature caching.
    fn requery(&self, datasource: &Arc<dyn Datasource>, query: Query) -> Featureset {
        RetrievalTask::start(&self.pool, datasource.clone(), query).features()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::{MemoryDatasource, Parameters};
    use crate::feature::Feature;
    use crate::style::{
        FilterMode, LineSymbolizer, PointSymbolizer, RasterSymbolizer, Rule, ScalingMethod,
        Symbolizer, TextSymbolizer,
    };
    use crate::tests::*;
    use assert_matches::assert_matches;
    use meridian_types::geo::{Crs, Datum, ProjectionType};
    use meridian_types::Rect;

    fn pool() -> WorkerPool {
        WorkerPool::new(4).expect("pool starts")
    }

    fn test_map() -> Map {
        let mut map = Map::new(100, 100, Crs::EPSG3857);
        map.zoom_to_box(Rect::new(0.0, 0.0, 1000.0, 1000.0));
        map
    }

    fn city(id: u64, population: i64) -> Feature {
        point_feature(id, 100.0 * id as f64, 100.0).with_attribute("population", population)
    }

    fn cities() -> Vec<Feature> {
        vec![city(1, 500), city(2, 2000), city(3, 5000)]
    }

    fn point() -> Symbolizer {
        Symbolizer::Point(PointSymbolizer::default())
    }

    fn line() -> Symbolizer {
        Symbolizer::Line(LineSymbolizer::default())
    }

    fn text() -> Symbolizer {
        Symbolizer::Text(TextSymbolizer::default())
    }

    fn filter(source: &str) -> Option<crate::expression::Expression> {
        Some(source.parse().expect("valid expression"))
    }

    fn population_style() -> Style {
        Style::new(vec![
            Rule::new(filter("[population] > 1000"), vec![text()]),
            Rule::otherwise(vec![point()]),
            Rule::also(vec![line()]),
        ])
    }

    fn cities_layer(source: Arc<CountingDatasource>) -> Layer {
        Layer::new("cities", Crs::EPSG3857)
            .with_style("population")
            .with_datasource(source)
    }

    #[test]
    fn applies_if_else_and_also_rules() {
        init_logger();
        let source = counting_source(cities());
        let map = test_map()
            .with_style("population", population_style())
            .with_layer(cities_layer(source.clone()));

        let mut processor = RecordingProcessor::default();
        let stats = FeatureStyleProcessor::new(&map, pool()).apply(&mut processor);

        assert_eq!(
            processor.symbolizers(),
            vec![
                ("point", 1),
                ("line", 1),
                ("text", 2),
                ("line", 2),
                ("text", 3),
                ("line", 3),
            ]
        );
        assert_eq!(processor.painted_count(), 3);
        assert_eq!(stats.rendered_features(), 3);
        assert_eq!(source.calls(), 1);

        let query = source.last_query().expect("datasource was queried");
        assert!(query.property_names().contains("population"));
        assert_eq!(query.filter_factor(), 1.0);
    }

    #[test]
    fn first_filter_mode_stops_at_first_match() {
        let rules = vec![
            Rule::new(filter("[population] > 1000"), vec![text()]),
            Rule::new(filter("[population] > 3000"), vec![line()]),
        ];

        let render = |mode: FilterMode| {
            let map = test_map()
                .with_style("population", Style::new(rules.clone()).with_filter_mode(mode))
                .with_layer(cities_layer(counting_source(vec![city(3, 5000)])));
            let mut processor = RecordingProcessor::default();
            FeatureStyleProcessor::new(&map, pool()).apply(&mut processor);
            processor.symbolizers()
        };

        assert_eq!(render(FilterMode::First), vec![("text", 3)]);
        assert_eq!(render(FilterMode::All), vec![("text", 3), ("line", 3)]);
    }

    #[test]
    fn rule_scale_range_is_half_open() {
        let map = test_map();
        let scale = FeatureStyleProcessor::new(&map, pool()).scale_denominator();

        let map = map
            .with_style(
                "scaled",
                Style::new(vec![
                    Rule::new(None, vec![point()]).with_scale_range(scale, scale * 2.0),
                    Rule::new(None, vec![line()]).with_scale_range(scale / 2.0, scale),
                ]),
            )
            .with_layer(
                Layer::new("cities", Crs::EPSG3857)
                    .with_style("scaled")
                    .with_datasource(counting_source(vec![city(1, 1)])),
            );

        let mut processor = RecordingProcessor::default();
        FeatureStyleProcessor::new(&map, pool()).apply(&mut processor);
        assert_eq!(processor.symbolizers(), vec![("point", 1)]);
    }

    #[test]
    fn cached_features_are_queried_once() {
        let source = counting_source(cities());
        let map = test_map()
            .with_style("points", Style::new(vec![Rule::new(None, vec![point()])]))
            .with_style("labels", Style::new(vec![Rule::new(None, vec![text()])]))
            .with_layer(
                Layer::new("cities", Crs::EPSG3857)
                    .with_style("points")
                    .with_style("labels")
                    .with_cache_features(true)
                    .with_datasource(source.clone()),
            );

        let mut processor = RecordingProcessor::default();
        let stats = FeatureStyleProcessor::new(&map, pool()).apply(&mut processor);

        assert_eq!(source.calls(), 1);
        assert_eq!(
            processor.symbolizers(),
            vec![
                ("point", 1),
                ("point", 2),
                ("point", 3),
                ("text", 1),
                ("text", 2),
                ("text", 3),
            ]
        );

        let layer = stats.layer("cities").expect("layer is rendered");
        assert_eq!(layer.styles.len(), 2);
        assert_eq!(layer.styles[0].queried, 3);
        assert_eq!(layer.styles[1].queried, 3);
    }

    #[test]
    fn styles_requery_without_cache() {
        let source = counting_source(cities());
        let map = test_map()
            .with_style("points", Style::new(vec![Rule::new(None, vec![point()])]))
            .with_style("labels", Style::new(vec![Rule::new(None, vec![text()])]))
            .with_layer(
                Layer::new("cities", Crs::EPSG3857)
                    .with_style("points")
                    .with_style("labels")
                    .with_datasource(source.clone()),
            );

        let mut processor = RecordingProcessor::default();
        FeatureStyleProcessor::new(&map, pool()).apply(&mut processor);

        assert_eq!(source.calls(), 2);
        assert_eq!(processor.symbolizers().len(), 6);
    }

    #[test]
    fn layer_outside_of_extent_is_not_queried() {
        let source = counting_source(vec![point_feature(1, 5000.0, 5000.0)]);
        let map = test_map()
            .with_style("population", population_style())
            .with_layer(cities_layer(source.clone()));

        let mut processor = RecordingProcessor::default();
        let stats = FeatureStyleProcessor::new(&map, pool()).apply(&mut processor);

        assert_eq!(source.calls(), 0);
        assert_eq!(stats.skip_reason("cities"), Some(&SkipReason::OutsideExtent));
        assert_eq!(processor.lifecycle(), vec![Event::StartMap, Event::EndMap]);
    }

    #[test]
    fn maximum_extent_limits_query() {
        let source = counting_source(vec![
            point_feature(1, 500.0, 500.0),
            point_feature(2, 2500.0, 500.0),
        ]);
        let mut map = test_map()
            .with_style("population", population_style())
            .with_layer(cities_layer(source.clone()));

        map.set_maximum_extent(Some(Rect::new(0.0, 0.0, 800.0, 1000.0)));
        FeatureStyleProcessor::new(&map, pool()).apply(&mut RecordingProcessor::default());
        let query = source.last_query().expect("datasource was queried");
        assert_eq!(*query.bbox(), Rect::new(500.0, 500.0, 800.0, 500.0));

        map.set_maximum_extent(Some(Rect::new(2000.0, 0.0, 3000.0, 1000.0)));
        let mut processor = RecordingProcessor::default();
        let stats = FeatureStyleProcessor::new(&map, pool()).apply(&mut processor);

        assert_eq!(source.calls(), 1);
        assert_eq!(stats.skip_reason("cities"), Some(&SkipReason::OutsideExtent));
        assert_eq!(processor.lifecycle(), vec![Event::StartMap, Event::EndMap]);
    }

    #[test]
    fn broken_layers_do_not_stop_rendering() {
        let map = test_map()
            .with_style("population", population_style())
            .with_layer(
                Layer::new("no_style", Crs::EPSG3857)
                    .with_style("missing")
                    .with_datasource(counting_source(cities())),
            )
            .with_layer(Layer::new("no_datasource", Crs::EPSG3857).with_style("population"))
            .with_layer(
                Layer::new("unstyled", Crs::EPSG3857).with_datasource(counting_source(cities())),
            )
            .with_layer(cities_layer(counting_source(cities())));

        let mut processor = RecordingProcessor::default();
        let stats = FeatureStyleProcessor::new(&map, pool()).apply(&mut processor);

        assert_eq!(stats.skip_reason("no_style"), Some(&SkipReason::NoActiveStyles));
        assert_eq!(stats.skip_reason("no_datasource"), Some(&SkipReason::NoDatasource));
        assert_eq!(stats.skip_reason("unstyled"), Some(&SkipReason::NoStyles));
        assert_eq!(
            processor.lifecycle(),
            vec![
                Event::StartMap,
                Event::StartLayer("cities".into()),
                Event::EndLayer("cities".into()),
                Event::EndMap,
            ]
        );
        assert_eq!(processor.symbolizers().len(), 6);
    }

    #[test]
    fn unavailable_projection_skips_layer() {
        let srs = Crs::new(
            Datum::WGS84,
            ProjectionType::Other("no_such_operator".into()),
        );
        let map = test_map()
            .with_style("population", population_style())
            .with_layer(
                Layer::new("exotic", srs)
                    .with_style("population")
                    .with_datasource(counting_source(cities())),
            )
            .with_layer(cities_layer(counting_source(cities())));

        let mut processor = RecordingProcessor::default();
        let stats = FeatureStyleProcessor::new(&map, pool()).apply(&mut processor);

        assert_matches!(stats.skip_reason("exotic"), Some(SkipReason::Projection(_)));
        assert!(stats.layer("cities").is_some());
    }

    #[test]
    fn invisible_layers_are_skipped() {
        let mut hidden = cities_layer(counting_source(cities()));
        hidden.set_active(false);
        let map = test_map()
            .with_style("population", population_style())
            .with_layer(hidden)
            .with_layer(
                Layer::new("far", Crs::EPSG3857)
                    .with_style("population")
                    .with_scale_range(0.0, 1.0)
                    .with_datasource(counting_source(cities())),
            );

        let mut processor = RecordingProcessor::default();
        let stats = FeatureStyleProcessor::new(&map, pool()).apply(&mut processor);

        assert_eq!(stats.skip_reason("cities"), Some(&SkipReason::NotVisible));
        assert_eq!(stats.skip_reason("far"), Some(&SkipReason::NotVisible));
        assert!(processor.symbolizers().is_empty());
    }

    #[test]
    fn layers_are_rendered_in_map_order() {
        let style = Style::new(vec![Rule::new(None, vec![point()])]);
        let map = test_map()
            .with_style("points", style)
            .with_layer(
                Layer::new("bottom", Crs::EPSG3857)
                    .with_style("points")
                    .with_datasource(counting_source(vec![city(1, 1)])),
            )
            .with_layer(
                Layer::new("top", Crs::EPSG3857)
                    .with_style("points")
                    .with_datasource(counting_source(vec![city(2, 1)])),
            );

        let mut processor = RecordingProcessor::default();
        let stats = FeatureStyleProcessor::new(&map, pool()).apply(&mut processor);

        assert_eq!(
            processor.lifecycle(),
            vec![
                Event::StartMap,
                Event::StartLayer("bottom".into()),
                Event::EndLayer("bottom".into()),
                Event::StartLayer("top".into()),
                Event::EndLayer("top".into()),
                Event::EndMap,
            ]
        );
        assert_eq!(processor.symbolizers(), vec![("point", 1), ("point", 2)]);

        let names: Vec<_> = stats.layers.iter().map(|layer| layer.name.as_str()).collect();
        assert_eq!(names, vec!["bottom", "top"]);
    }

    #[test]
    fn data_is_prefetched_but_layers_paint_in_map_order() {
        init_logger();
        let gate = Arc::new(Gate::default());
        let finished = Arc::new(parking_lot::Mutex::new(vec![]));
        // The bottom layer answers only after the top one was queried.
        let slow = GatedDatasource::new("slow", vec![city(1, 500)], finished.clone())
            .waiting_for(gate.clone());
        let fast =
            GatedDatasource::new("fast", vec![city(2, 2000)], finished.clone()).opening(gate);

        let map = test_map()
            .with_style("population", population_style())
            .with_layer(
                Layer::new("slow", Crs::EPSG3857)
                    .with_style("population")
                    .with_datasource(Arc::new(slow)),
            )
            .with_layer(
                Layer::new("fast", Crs::EPSG3857)
                    .with_style("population")
                    .with_datasource(Arc::new(fast)),
            );

        let mut processor = RecordingProcessor::default();
        FeatureStyleProcessor::new(&map, pool()).apply(&mut processor);

        assert_eq!(*finished.lock(), vec!["fast", "slow"]);
        assert_eq!(
            processor.lifecycle(),
            vec![
                Event::StartMap,
                Event::StartLayer("slow".into()),
                Event::EndLayer("slow".into()),
                Event::StartLayer("fast".into()),
                Event::EndLayer("fast".into()),
                Event::EndMap,
            ]
        );
        assert_eq!(
            processor.symbolizers(),
            vec![("point", 1), ("line", 1), ("text", 2), ("line", 2)]
        );
    }

    #[test]
    fn failed_query_renders_nothing() {
        let map = test_map()
            .with_style("population", population_style())
            .with_layer(
                Layer::new("broken", Crs::EPSG3857)
                    .with_style("population")
                    .with_datasource(Arc::new(FailingDatasource::default())),
            );

        let mut processor = RecordingProcessor::default();
        let stats = FeatureStyleProcessor::new(&map, pool()).apply(&mut processor);

        assert_eq!(stats.layer("broken").map(|layer| layer.styles[0].queried), Some(0));
        assert_eq!(processor.painted_count(), 0);
        assert_eq!(processor.lifecycle().len(), 4);
    }

    #[test]
    fn batch_processing() {
        let map = test_map()
            .with_style("population", population_style())
            .with_layer(cities_layer(counting_source(vec![city(2, 2000)])));

        let mut processor = RecordingProcessor {
            batch: true,
            ..Default::default()
        };
        FeatureStyleProcessor::new(&map, pool()).apply(&mut processor);

        let batches: Vec<_> = processor
            .events
            .iter()
            .filter(|event| matches!(event, Event::Batch { .. }))
            .cloned()
            .collect();
        assert_eq!(
            batches,
            vec![
                Event::Batch { count: 1, feature: 2 },
                Event::Batch { count: 1, feature: 2 },
            ]
        );
        assert!(processor.symbolizers().is_empty());
        assert_eq!(processor.painted_count(), 1);
    }

    #[test]
    fn metawriters_are_started_and_stopped() {
        let writer = Arc::new(RecordingMetawriter::default());
        let mut map = test_map()
            .with_style("population", population_style())
            .with_layer(cities_layer(counting_source(cities())));
        map.insert_metawriter("hits", writer.clone());

        FeatureStyleProcessor::new(&map, pool()).apply(&mut RecordingProcessor::default());

        let events = writer.events.lock().clone();
        assert_eq!(events.len(), 2);
        assert!(events[0].starts_with("start 100x100"));
        assert_eq!(events[1], "stop");
    }

    #[test]
    fn raster_filter_factor_from_symbolizer() {
        let raster_source = |params: Parameters| {
            let params = params
                .with("type", "memory")
                .with("kind", "raster")
                .with("extent", "0,0,1000,1000");
            let source = MemoryDatasource::from_params(&params).expect("valid params");
            Arc::new(CountingDatasource::new(source))
        };
        let style = Style::new(vec![Rule::new(
            None,
            vec![Symbolizer::Raster(RasterSymbolizer {
                scaling: ScalingMethod::Bilinear,
                ..Default::default()
            })],
        )]);

        let derived = raster_source(Parameters::new());
        let explicit = raster_source(Parameters::new().with("filter_factor", 4));

        let map = test_map()
            .with_style("raster", style)
            .with_layer(
                Layer::new("derived", Crs::EPSG3857)
                    .with_style("raster")
                    .with_datasource(derived.clone()),
            )
            .with_layer(
                Layer::new("explicit", Crs::EPSG3857)
                    .with_style("raster")
                    .with_datasource(explicit.clone()),
            );

        FeatureStyleProcessor::new(&map, pool()).apply(&mut RecordingProcessor::default());

        let derived_query = derived.last_query().expect("queried");
        assert_eq!(derived_query.filter_factor(), 2.0);
        assert!(derived_query.property_names().is_empty());

        let explicit_query = explicit.last_query().expect("queried");
        assert_eq!(explicit_query.filter_factor(), 1.0);
    }

    #[test]
    fn apply_layer_extends_names() {
        let source = counting_source(cities());
        let map = test_map().with_style("population", population_style());
        let layer = cities_layer(source.clone());

        let mut names = BTreeSet::from(["name".to_string()]);
        let mut processor = RecordingProcessor::default();
        let stats = FeatureStyleProcessor::new(&map, pool()).apply_layer(
            &mut processor,
            &layer,
            &mut names,
        );

        assert_eq!(names, BTreeSet::from(["name".to_string(), "population".to_string()]));
        assert_eq!(
            source.last_query().expect("queried").property_names(),
            &names
        );
        assert_eq!(stats.rendered_features(), 3);
        assert_eq!(
            processor.lifecycle(),
            vec![
                Event::StartMap,
                Event::StartLayer("cities".into()),
                Event::EndLayer("cities".into()),
                Event::EndMap,
            ]
        );
    }

    #[test]
    fn scale_factor_changes_rule_selection() {
        let map = test_map();
        let base = FeatureStyleProcessor::new(&map, pool()).scale_denominator();
        let map = map
            .with_style(
                "points",
                Style::new(vec![Rule::new(None, vec![point()]).with_scale_range(0.0, base * 1.5)]),
            )
            .with_layer(
                Layer::new("cities", Crs::EPSG3857)
                    .with_style("points")
                    .with_datasource(counting_source(vec![city(1, 1)])),
            );

        let mut processor = RecordingProcessor::default();
        let pipeline = FeatureStyleProcessor::with_config(
            &map,
            pool(),
            &RenderConfig {
                scale_factor: 2.0,
                ..Default::default()
            },
        );
        let stats = pipeline.apply(&mut processor);

        assert_eq!(pipeline.scale_denominator(), base * 2.0);
        assert_eq!(stats.skip_reason("cities"), Some(&SkipReason::NoActiveStyles));
        assert!(processor.symbolizers().is_empty());
    }
}
