//! [`Datasource`] is the source of features for a [`Layer`](crate::Layer).
//!
//! Concrete datasources (files, databases, tile services) live outside of this crate. They are plugged in either
//! directly, by setting an `Arc<dyn Datasource>` on a layer, or by type name through the
//! [`registry`](registry::create_datasource).

use std::str::FromStr;

use ahash::AHashMap;
use meridian_types::Rect;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::DatasourceError;
use crate::featureset::Featureset;
use crate::query::Query;

mod memory;
pub mod registry;

pub use memory::MemoryDatasource;

/// Kind of data a datasource provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DatasourceKind {
    /// Features with vector geometries and attributes.
    Vector,
    /// Raster data.
    Raster,
}

/// Source of features.
///
/// `features` is called from a retrieval worker thread, which is in general not the thread that created the
/// datasource.
pub trait Datasource: Send + Sync {
    /// Kind of the data in the source.
    fn kind(&self) -> DatasourceKind;
    /// Extent of all the data in the source, in the reference system of the layer.
    fn envelope(&self) -> Rect;
    /// Returns the features matching the query.
    fn features(&self, query: &Query) -> Result<Featureset, DatasourceError>;
    /// Configuration parameters of the source.
    fn params(&self) -> &Parameters;
}

/// Key-value configuration of a datasource.
///
/// The `type` parameter names the datasource type in the [registry](registry::DatasourceRegistry).
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Parameters(AHashMap<String, String>);

impl Parameters {
    /// Name of the parameter that specifies datasource type.
    pub const TYPE: &'static str = "type";

    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter.
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.insert(key, value);
        self
    }

    /// Sets a parameter, replacing the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) {
        self.0.insert(key.into(), value.to_string());
    }

    /// Raw value of a parameter.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Value of a parameter converted to `T`. Returns `None` if the parameter is absent or cannot be converted.
    pub fn get<T: FromStr>(&self, key: &str) -> Option<T> {
        let raw = self.get_str(key)?;
        match raw.trim().parse() {
            Ok(value) => Some(value),
            Err(_) => {
                log::warn!("Datasource parameter '{key}' has invalid value '{raw}'");
                None
            }
        }
    }

    /// Value of a parameter converted to `T`, or `default` if the parameter is absent or invalid.
    pub fn get_or<T: FromStr>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// Datasource type name.
    pub fn datasource_type(&self) -> Option<&str> {
        self.get_str(Self::TYPE)
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for Parameters {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}
