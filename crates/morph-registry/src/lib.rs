//! Type registry for the morph conversion engine.
//!
//! This crate provides:
//!
//! - [`TypeRegistry`]: named types, their hierarchy and their relations
//! - [`TypeEntry`] / [`ConversionOperator`]: what a type declares
//! - Built-in descriptor converters for the primitive types and enums
//!
//! The registry is the engine's view of the host type system: everything
//! strategy discovery asks about two types is answered here.

mod builtin;
mod entry;
mod registry;

pub use builtin::{
    BoolConverter, CharConverter, EnumConverter, NumericConverter, cast_numeric, format_scalar,
    parse_numeric,
};
pub use entry::{ConversionOperator, OperatorFn, OperatorKind, TypeEntry, TypeKind};
pub use registry::TypeRegistry;
