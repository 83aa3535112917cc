//! Typed extraction and injection for [`Value`].
//!
//! - [`FromValue`]: extract a Rust value from a [`Value`]
//! - [`IntoValue`]: wrap a Rust value as a [`Value`]
//!
//! Extraction is exact: an `i64` is only extracted from [`Value::Int64`].
//! Widening and parsing are the engine's job, not the extractor's, so a
//! property setter written with `FromValue` sees precisely the type the
//! engine produced.
//!
//! ## Example
//!
//! ```
//! use morph_core::{FromValue, IntoValue, Value};
//!
//! let value = 42i32.into_value();
//! assert_eq!(i32::from_value(&value).unwrap(), 42);
//! assert!(i64::from_value(&value).is_err());
//! ```

use crate::{DataType, InvalidValue, TypeHash, Value, primitives};

/// Extract a typed value.
pub trait FromValue: Sized {
    /// Extract from `value`, failing with `TypeMismatch` on any other variant.
    fn from_value(value: &Value) -> Result<Self, InvalidValue>;
}

/// Wrap a typed value.
pub trait IntoValue {
    /// Convert into a [`Value`].
    fn into_value(self) -> Value;
}

/// Rust types with a fixed registered counterpart.
pub trait Typed {
    /// The registered type this Rust type maps to.
    fn data_type() -> DataType;
}

macro_rules! impl_primitive {
    ($($ty:ty => $variant:ident, $hash:expr, $name:literal;)*) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &Value) -> Result<Self, InvalidValue> {
                    match value {
                        Value::$variant(v) => Ok(v.clone()),
                        other => Err(InvalidValue::mismatch(
                            $name,
                            other.kind_name(),
                        )),
                    }
                }
            }

            impl IntoValue for $ty {
                fn into_value(self) -> Value {
                    Value::$variant(self)
                }
            }

            impl Typed for $ty {
                fn data_type() -> DataType {
                    DataType::Named($hash)
                }
            }
        )*
    };
}

impl_primitive! {
    bool => Bool, primitives::BOOL, "bool";
    i8 => Int8, primitives::INT8, "int8";
    i16 => Int16, primitives::INT16, "int16";
    i32 => Int32, primitives::INT32, "int";
    i64 => Int64, primitives::INT64, "int64";
    u8 => UInt8, primitives::UINT8, "uint8";
    u16 => UInt16, primitives::UINT16, "uint16";
    u32 => UInt32, primitives::UINT32, "uint";
    u64 => UInt64, primitives::UINT64, "uint64";
    f32 => Float, primitives::FLOAT, "float";
    f64 => Double, primitives::DOUBLE, "double";
    char => Char, primitives::CHAR, "char";
    String => String, primitives::STRING, "string";
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::String(self.to_string())
    }
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, InvalidValue> {
        Ok(value.clone())
    }
}

// ============================================================================
// Option<T> - Null maps to None
// ============================================================================

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, InvalidValue> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        match self {
            Some(v) => v.into_value(),
            None => Value::Null,
        }
    }
}

impl<T: Typed> Typed for Option<T> {
    fn data_type() -> DataType {
        DataType::optional(T::data_type())
    }
}

// ============================================================================
// Vec<T> - rank-1 arrays
// ============================================================================

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Result<Self, InvalidValue> {
        match value {
            Value::Array(array) if array.rank() == 1 => {
                array.items().iter().map(T::from_value).collect()
            }
            other => Err(InvalidValue::mismatch("array", other.kind_name())),
        }
    }
}

impl<T: IntoValue + Typed> IntoValue for Vec<T> {
    fn into_value(self) -> Value {
        let items = self.into_iter().map(IntoValue::into_value).collect();
        Value::Array(crate::ArrayValue::vector(T::data_type(), items))
    }
}

impl<T: Typed> Typed for Vec<T> {
    fn data_type() -> DataType {
        DataType::array_of(T::data_type(), 1)
    }
}

/// Extract the numeric value of an enum member of type `expected`.
pub fn enum_value(value: &Value, expected: TypeHash) -> Result<i64, InvalidValue> {
    match value {
        Value::Enum { type_hash, value } if *type_hash == expected => Ok(*value),
        other => Err(InvalidValue::mismatch("enum", other.kind_name())),
    }
}
