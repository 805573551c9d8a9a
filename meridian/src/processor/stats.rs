use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Why a layer did not take part in a rendering pass.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// The layer is switched off or the scale is outside its range.
    NotVisible,
    /// The layer has no styles.
    NoStyles,
    /// The layer has no datasource.
    NoDatasource,
    /// None of the layer styles has rules active at the current scale.
    NoActiveStyles,
    /// Transform between the map and the layer reference systems is not available.
    Projection(String),
    /// The layer data is outside of the map extent.
    OutsideExtent,
}

impl Display for SkipReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NotVisible => write!(f, "not visible at the current scale"),
            SkipReason::NoStyles => write!(f, "no styles"),
            SkipReason::NoDatasource => write!(f, "no datasource"),
            SkipReason::NoActiveStyles => write!(f, "no rules active at the current scale"),
            SkipReason::Projection(err) => write!(f, "projection error: {err}"),
            SkipReason::OutsideExtent => write!(f, "outside of the map extent"),
        }
    }
}

/// Statistics of rendering a layer with one style.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleStats {
    /// Name of the style.
    pub name: String,
    /// Number of features returned by the query.
    pub queried: usize,
    /// Number of features at least one rule was applied to.
    pub rendered: usize,
    /// Time spent on the style, including waiting for the features.
    pub elapsed: Duration,
}

/// Statistics of a rendered layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerStats {
    /// Name of the layer.
    pub name: String,
    /// Statistics per style, in rendering order.
    pub styles: Vec<StyleStats>,
}

/// Layer that was not rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedLayer {
    /// Name of the layer.
    pub name: String,
    /// Why the layer was skipped.
    pub reason: SkipReason,
}

/// Summary of a rendering pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderStats {
    /// Rendered layers in rendering order.
    pub layers: Vec<LayerStats>,
    /// Layers that were skipped.
    pub skipped: Vec<SkippedLayer>,
}

impl RenderStats {
    /// Statistics of the rendered layer with the given name.
    pub fn layer(&self, name: &str) -> Option<&LayerStats> {
        self.layers.iter().find(|layer| layer.name == name)
    }

    /// Reason the layer with the given name was skipped, if it was.
    pub fn skip_reason(&self, name: &str) -> Option<&SkipReason> {
        self.skipped
            .iter()
            .find(|layer| layer.name == name)
            .map(|layer| &layer.reason)
    }

    /// Total number of features any rule was applied to.
    pub fn rendered_features(&self) -> usize {
        self.layers
            .iter()
            .flat_map(|layer| &layer.styles)
            .map(|style| style.rendered)
            .sum()
    }

    pub(crate) fn skip(&mut self, name: &str, reason: SkipReason) {
        self.skipped.push(SkippedLayer {
            name: name.to_string(),
            reason,
        });
    }
}

impl StyleStats {
    pub(crate) fn log(&self, layer_name: &str) {
        if self.queried > 0 {
            log::debug!(
                "{:.1}% rendered - {} rendered for {} queried for layer '{layer_name}' and style '{}' in {:?}",
                self.rendered as f64 / self.queried as f64 * 100.0,
                self.rendered,
                self.queried,
                self.name,
                self.elapsed,
            );
        } else {
            log::debug!(
                "No features returned from query for layer '{layer_name}' and style '{}'",
                self.name
            );
        }
    }
}
