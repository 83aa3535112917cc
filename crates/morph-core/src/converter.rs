//! Pluggable converters.
//!
//! A [`CustomConverter`] is the capability object supplied either per
//! property (taking precedence over everything the engine knows) or per type
//! through the registry's type-description facility, where it serves as the
//! last-resort mechanism in strategy discovery.
//!
//! Converters declare what they can do before they are asked to do it. The
//! engine only calls `convert_from` after `can_convert_from` answered `true`
//! for the value's runtime type, and likewise for `convert_to`.

use std::fmt;
use std::sync::Arc;

use crate::{ConversionContext, DataType, InvalidValue, Value};

/// Culture hint forwarded to [`CustomConverter::convert_to`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Culture {
    /// Culture-independent formatting and parsing.
    #[default]
    Invariant,
    /// A named culture, e.g. `"fr-FR"`.
    Tagged(String),
}

impl Culture {
    /// Culture tag, or `None` for the invariant culture.
    pub fn tag(&self) -> Option<&str> {
        match self {
            Culture::Invariant => None,
            Culture::Tagged(tag) => Some(tag),
        }
    }
}

impl fmt::Display for Culture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Culture::Invariant => write!(f, "invariant"),
            Culture::Tagged(tag) => write!(f, "{tag}"),
        }
    }
}

/// Converter capability.
///
/// Implementations must be callable from any thread.
pub trait CustomConverter: Send + Sync {
    /// Can values of `source` be turned into this converter's type?
    fn can_convert_from(&self, source: &DataType) -> bool {
        let _ = source;
        false
    }

    /// Turn `value` into this converter's type.
    fn convert_from(&self, ctx: &ConversionContext<'_>, value: Value) -> Result<Value, InvalidValue> {
        let _ = ctx;
        Err(InvalidValue::argument(format!(
            "converter cannot convert from {}",
            value.kind_name()
        )))
    }

    /// Can values of this converter's type be turned into `target`?
    fn can_convert_to(&self, target: &DataType) -> bool {
        let _ = target;
        false
    }

    /// Turn `value` (of this converter's type) into `target`.
    fn convert_to(
        &self,
        ctx: &ConversionContext<'_>,
        culture: &Culture,
        value: Value,
        target: &DataType,
    ) -> Result<Value, InvalidValue> {
        let _ = (ctx, culture, target);
        Err(InvalidValue::argument(format!(
            "converter cannot convert {} to the requested type",
            value.kind_name()
        )))
    }
}

/// Shared converter handle.
pub type ConverterRef = Arc<dyn CustomConverter>;

/// Function used by [`FnConverter`].
pub type ConvertFromFn =
    dyn Fn(&ConversionContext<'_>, Value) -> Result<Value, InvalidValue> + Send + Sync;

/// A `convert_from`-only converter built from a predicate and a closure.
///
/// Handy for per-property converters:
///
/// ```
/// use morph_core::{ConversionContext, CustomConverter, DataType, FnConverter, Value, primitives};
///
/// let upper = FnConverter::new(
///     |source| source.is(primitives::STRING),
///     |_ctx, value| Ok(Value::String(value.as_str().unwrap_or_default().to_uppercase())),
/// );
/// let string = DataType::named(primitives::STRING);
/// assert!(upper.can_convert_from(&string));
/// let out = upper.convert_from(&ConversionContext::empty(), Value::from("abc")).unwrap();
/// assert_eq!(out, Value::from("ABC"));
/// ```
pub struct FnConverter {
    accepts: Box<dyn Fn(&DataType) -> bool + Send + Sync>,
    convert: Box<ConvertFromFn>,
}

impl FnConverter {
    /// Build a converter from a source predicate and a conversion closure.
    pub fn new<P, F>(accepts: P, convert: F) -> Self
    where
        P: Fn(&DataType) -> bool + Send + Sync + 'static,
        F: Fn(&ConversionContext<'_>, Value) -> Result<Value, InvalidValue> + Send + Sync + 'static,
    {
        Self {
            accepts: Box::new(accepts),
            convert: Box::new(convert),
        }
    }
}

impl CustomConverter for FnConverter {
    fn can_convert_from(&self, source: &DataType) -> bool {
        (self.accepts)(source)
    }

    fn convert_from(&self, ctx: &ConversionContext<'_>, value: Value) -> Result<Value, InvalidValue> {
        (self.convert)(ctx, value)
    }
}
