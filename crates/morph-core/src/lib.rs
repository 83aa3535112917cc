//! Core vocabulary for the morph conversion engine.
//!
//! This crate holds everything the registry and the engine share:
//!
//! - [`TypeHash`] / [`DataType`] / [`TypePair`]: type identity and shape
//! - [`Value`]: the runtime value model, with [`FromValue`] / [`IntoValue`]
//! - [`CustomConverter`], [`PropertyBag`], [`PropertyDescriptor`]: the
//!   collaborator interfaces the engine calls into
//! - [`ConvertError`], [`PopulateErrors`], [`RegistrationError`]: errors

mod context;
mod converter;
mod data_type;
mod error;
mod from_value;
mod property;
mod type_hash;
mod value;

pub use context::ConversionContext;
pub use converter::{ConvertFromFn, ConverterRef, Culture, CustomConverter, FnConverter};
pub use data_type::{DataType, TypePair};
pub use error::{
    ConvertError, FieldError, FieldErrorKind, InvalidValue, PopulateErrors, RegistrationError,
};
pub use from_value::{FromValue, IntoValue, Typed, enum_value};
pub use property::{FieldProperty, PropertyBag, PropertyDescriptor, PropertyTable};
pub use type_hash::{TypeHash, hash_constants, primitives};
pub use value::{ArrayValue, NativeValue, Value};
