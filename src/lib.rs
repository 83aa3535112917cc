//! Generic value conversion.
//!
//! `morph` takes a loosely typed [`Value`] and a destination [`DataType`],
//! decides whether and how the value can be coerced into that type, and
//! performs the coercion. Its main use is populating typed objects from
//! name/value pairs (configuration, form data) without per-type parsing code.
//!
//! # Architecture
//!
//! ```text
//! Engine::populate ──► Engine::convert ──► Engine::resolve ──► discovery
//!                                               │
//!                                               └── ConversionCache
//! Engine::can_convert ──► discovery (read-only, no cache)
//! ```
//!
//! - [`morph_core`] holds the value model, type identities and the
//!   collaborator traits ([`CustomConverter`], [`PropertyBag`]).
//! - [`morph_registry`] holds the [`TypeRegistry`]: types, hierarchy,
//!   conversion operators and descriptor converters.
//! - This crate holds the [`Engine`].
//!
//! # Example
//!
//! ```
//! use morph::{Engine, PropertyTable, Value};
//!
//! #[derive(Default)]
//! struct Server {
//!     port: u16,
//!     verbose: bool,
//!     workers: Option<u32>,
//! }
//!
//! let bag = PropertyTable::<Server>::new()
//!     .typed("Port", |s, v: u16| s.port = v)
//!     .typed("Verbose", |s, v: bool| s.verbose = v)
//!     .typed("Workers", |s, v: Option<u32>| s.workers = v);
//!
//! let engine = Engine::default();
//! let mut server = Server::default();
//! engine
//!     .populate(
//!         &mut server,
//!         &bag,
//!         [
//!             ("port", Value::from("8080")),
//!             ("verbose", Value::from("true")),
//!             ("workers", Value::from("")),
//!         ],
//!     )
//!     .unwrap();
//!
//! assert_eq!(server.port, 8080);
//! assert!(server.verbose);
//! assert_eq!(server.workers, None);
//! ```

mod cache;
mod capability;
mod convert;
mod discovery;
mod engine;
mod populate;

pub use cache::{CacheStats, ConversionCache, ConversionFn};
pub use discovery::Mechanism;
pub use engine::{Engine, EngineConfig};

pub use morph_core::{
    ArrayValue, ConversionContext, ConvertError, Culture, CustomConverter, DataType, FieldError,
    FieldErrorKind, FnConverter, FromValue, IntoValue, InvalidValue, NativeValue, PopulateErrors,
    PropertyBag, PropertyDescriptor, PropertyTable, RegistrationError, TypeHash, TypePair, Typed,
    Value, primitives,
};
pub use morph_registry::{ConversionOperator, OperatorKind, TypeEntry, TypeKind, TypeRegistry};

/// Re-exports of the workspace crates.
pub mod prelude {
    pub use morph_core::*;
    pub use morph_registry::*;

    pub use crate::{CacheStats, ConversionCache, ConversionFn, Engine, EngineConfig, Mechanism};
}
