//! Metawriters collect information about what was rendered (e.g. clickable regions of features) next to the
//! rendered image.
//!
//! A metawriter is registered in the [`Map`](crate::Map) under a name, and symbolizers refer to it with a
//! [`MetawriterRef`]. The pipeline starts all metawriters of the map before the first layer is rendered and stops
//! them after the last one.

use std::collections::BTreeSet;
use std::sync::Arc;

use meridian_types::geo::Crs;

use crate::datasource::Parameters;
use crate::style::MetawriterRef;

/// Rendering pass information given to a metawriter when it is started.
#[derive(Debug, Clone, Copy)]
pub struct MetawriterContext<'a> {
    /// Width of the output in pixels.
    pub width: u32,
    /// Height of the output in pixels.
    pub height: u32,
    /// Reference system of the map.
    pub srs: &'a Crs,
    /// Output properties configured in the map.
    pub output_properties: &'a Parameters,
}

/// Collector of rendering metadata.
///
/// Metawriters are shared between the map definition and renderer backends, so all methods take `&self`.
pub trait Metawriter: Send + Sync {
    /// Called once per rendering pass, before any feature is rendered.
    fn start(&self, context: &MetawriterContext);
    /// Called once per rendering pass, after all features were rendered.
    fn stop(&self);
    /// Feature attributes this metawriter outputs unless a symbolizer asks for others.
    fn default_properties(&self) -> BTreeSet<String> {
        BTreeSet::new()
    }
}

/// Metawriter with the full set of properties a symbolizer asks it to output.
#[derive(Clone)]
pub struct ResolvedMetawriter {
    /// The metawriter.
    pub writer: Arc<dyn Metawriter>,
    /// Default properties of the metawriter merged with the ones set by the symbolizer.
    pub properties: BTreeSet<String>,
}

impl ResolvedMetawriter {
    pub(crate) fn new(writer: Arc<dyn Metawriter>, reference: &MetawriterRef) -> Self {
        let mut properties = writer.default_properties();
        properties.extend(reference.properties.iter().cloned());
        Self { writer, properties }
    }
}

impl std::fmt::Debug for ResolvedMetawriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedMetawriter")
            .field("properties", &self.properties)
            .finish_non_exhaustive()
    }
}
