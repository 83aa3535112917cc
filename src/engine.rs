//! The conversion engine.
//!
//! An [`Engine`] owns a shared [`TypeRegistry`], a [`ConversionCache`] and an
//! [`EngineConfig`]. Conversion, capability queries and object population are
//! implemented in their own modules as further `impl Engine` blocks.
//!
//! # Example
//!
//! ```
//! use morph::{Engine, ConversionContext, DataType, Value, primitives};
//!
//! let engine = Engine::default();
//! let int = DataType::named(primitives::INT32);
//!
//! let value = engine
//!     .convert(Value::from("42"), &int, None, &ConversionContext::empty(), None)
//!     .unwrap();
//! assert_eq!(value, Value::Int32(42));
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use morph_core::{Culture, DataType, TypePair};
use morph_registry::TypeRegistry;

use crate::cache::{ConversionCache, ConversionFn};
use crate::discovery::{self, Mechanism};

/// Engine settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Culture handed to source-side descriptor converters.
    pub culture: Culture,
    /// Match property names case-insensitively during population.
    pub ignore_case: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            culture: Culture::Invariant,
            ignore_case: true,
        }
    }
}

impl EngineConfig {
    /// Default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the culture.
    pub fn with_culture(mut self, culture: Culture) -> Self {
        self.culture = culture;
        self
    }

    /// Set case sensitivity of property lookup.
    pub fn with_ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }
}

/// Value conversion engine.
///
/// Cheap to share: wrap in an `Arc` and call from any thread.
pub struct Engine {
    pub(crate) registry: Arc<TypeRegistry>,
    pub(crate) cache: Arc<ConversionCache>,
    pub(crate) config: EngineConfig,
}

impl Default for Engine {
    /// An engine over the built-in types.
    fn default() -> Self {
        Self::new(TypeRegistry::with_primitives())
    }
}

impl Engine {
    /// Create an engine with default settings and a fresh cache.
    pub fn new(registry: impl Into<Arc<TypeRegistry>>) -> Self {
        Self::with_config(registry, EngineConfig::default())
    }

    /// Create an engine with the given settings and a fresh cache.
    pub fn with_config(registry: impl Into<Arc<TypeRegistry>>, config: EngineConfig) -> Self {
        Self::with_cache(registry, Arc::new(ConversionCache::new()), config)
    }

    /// Create an engine around an existing cache.
    ///
    /// Engines sharing a cache must share the registry and culture too: a
    /// cached function is only valid for the registry and culture it was
    /// discovered with.
    pub fn with_cache(
        registry: impl Into<Arc<TypeRegistry>>,
        cache: Arc<ConversionCache>,
        config: EngineConfig,
    ) -> Self {
        Self {
            registry: registry.into(),
            cache,
            config,
        }
    }

    /// The type registry.
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// The conversion cache.
    pub fn cache(&self) -> &Arc<ConversionCache> {
        &self.cache
    }

    /// Engine settings.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Find the conversion function for `source -> target`.
    ///
    /// A cache hit returns the stored function. On a miss every mechanism is
    /// probed in priority order; a found function is cached, an absent one is
    /// not, so later calls for the pair probe again.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn resolve(&self, source: &DataType, target: &DataType) -> Option<ConversionFn> {
        let pair = TypePair::new(source, target);
        if let Some(func) = self.cache.get(&pair) {
            trace!(source = %pair.source, target = %pair.target, "conversion cache hit");
            return Some(func);
        }

        match discovery::discover(&self.registry, source, target) {
            Some(found) => {
                debug!(
                    source = %self.registry.type_name(source),
                    target = %self.registry.type_name(target),
                    mechanism = %found.mechanism(),
                    "resolved conversion"
                );
                let func = found.into_fn(target, &self.config.culture);
                Some(self.cache.get_or_insert(pair, func))
            }
            None => {
                debug!(
                    source = %self.registry.type_name(source),
                    target = %self.registry.type_name(target),
                    "no conversion mechanism"
                );
                None
            }
        }
    }

    /// The mechanism discovery would pick for `source -> target`.
    ///
    /// Never reads or writes the cache.
    pub fn mechanism(&self, source: &DataType, target: &DataType) -> Option<Mechanism> {
        discovery::discover(&self.registry, source, target).map(|found| found.mechanism())
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("types", &self.registry.len())
            .field("cache", &self.cache)
            .field("config", &self.config)
            .finish()
    }
}
