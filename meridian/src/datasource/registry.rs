//! Registry of datasource types.
//!
//! Datasource implementations are registered under a type name together with a constructor function. A layer can
//! then be configured with [`Parameters`] alone, the `type` parameter selecting the constructor.
//!
//! The process-wide registry is created on first use with the built-in types (`memory`) already registered.
//! Applications add their own types at start-up with [`register_datasource`].

use std::sync::Arc;

use ahash::AHashMap;
use lazy_static::lazy_static;
use parking_lot::RwLock;

use crate::datasource::{Datasource, MemoryDatasource, Parameters};
use crate::error::MeridianError;

/// Function that creates a datasource from its configuration parameters.
pub type DatasourceConstructor = fn(&Parameters) -> Result<Arc<dyn Datasource>, MeridianError>;

/// Mapping from datasource type name to its constructor.
#[derive(Debug, Default, Clone)]
pub struct DatasourceRegistry {
    constructors: AHashMap<String, DatasourceConstructor>,
}

impl DatasourceRegistry {
    /// Creates a registry with all built-in datasource types.
    pub fn with_builtin() -> Self {
        let mut registry = Self::default();
        registry.register(MemoryDatasource::TYPE_NAME, |params| {
            Ok(Arc::new(MemoryDatasource::from_params(params)?))
        });
        registry
    }

    /// Registers a constructor for the type name. Returns the previously registered constructor, if any.
    pub fn register(
        &mut self,
        type_name: impl Into<String>,
        constructor: DatasourceConstructor,
    ) -> Option<DatasourceConstructor> {
        self.constructors.insert(type_name.into(), constructor)
    }

    /// Returns true if the type name is registered.
    pub fn contains(&self, type_name: &str) -> bool {
        self.constructors.contains_key(type_name)
    }

    /// Names of all registered types, sorted.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.constructors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Creates a datasource of the type named by the `type` parameter.
    pub fn create(&self, params: &Parameters) -> Result<Arc<dyn Datasource>, MeridianError> {
        let type_name = params.datasource_type().ok_or_else(|| {
            MeridianError::Config(format!(
                "datasource parameters have no '{}' entry",
                Parameters::TYPE
            ))
        })?;

        let constructor = self
            .constructors
            .get(type_name)
            .ok_or_else(|| MeridianError::UnknownDatasourceType(type_name.to_string()))?;

        log::debug!("Creating datasource of type '{type_name}'");
        constructor(params)
    }
}

lazy_static! {
    static ref REGISTRY: RwLock<DatasourceRegistry> =
        RwLock::new(DatasourceRegistry::with_builtin());
}

/// Registers a datasource type in the process-wide registry.
pub fn register_datasource(type_name: impl Into<String>, constructor: DatasourceConstructor) {
    let type_name = type_name.into();
    if REGISTRY.write().register(type_name.clone(), constructor).is_some() {
        log::warn!(
            "Datasource type '{type_name}' was registered twice, the latest constructor is used"
        );
    }
}

/// Creates a datasource using the process-wide registry.
pub fn create_datasource(params: &Parameters) -> Result<Arc<dyn Datasource>, MeridianError> {
    REGISTRY.read().create(params)
}

/// Returns true if the type is registered in the process-wide registry.
pub fn is_registered(type_name: &str) -> bool {
    REGISTRY.read().contains(type_name)
}
