//! Runtime value model.
//!
//! [`Value`] is the loosely-typed currency the engine converts between. Every
//! non-null value knows its own runtime [`DataType`]; the engine never asks
//! the caller what a value "is".
//!
//! Native values wrap registered Rust types behind an `Arc`, so cloning a
//! `Value` never copies user data and identity can be checked with
//! [`NativeValue::ptr_eq`].

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::{DataType, InvalidValue, TypeHash, primitives};

/// A dynamically typed value.
#[derive(Clone)]
pub enum Value {
    /// Absence of a value.
    Null,
    /// Boolean value
    Bool(bool),
    /// 8-bit signed integer
    Int8(i8),
    /// 16-bit signed integer
    Int16(i16),
    /// 32-bit signed integer
    Int32(i32),
    /// 64-bit signed integer
    Int64(i64),
    /// 8-bit unsigned integer
    UInt8(u8),
    /// 16-bit unsigned integer
    UInt16(u16),
    /// 32-bit unsigned integer
    UInt32(u32),
    /// 64-bit unsigned integer
    UInt64(u64),
    /// Single-precision float
    Float(f32),
    /// Double-precision float
    Double(f64),
    /// Unicode scalar value
    Char(char),
    /// Text
    String(String),
    /// Member of a registered enum, stored as its numeric value.
    Enum {
        /// The enum type.
        type_hash: TypeHash,
        /// Underlying numeric value.
        value: i64,
    },
    /// Rectangular array.
    Array(ArrayValue),
    /// Instance of a registered native type.
    Native(NativeValue),
}

impl Value {
    /// Runtime type of this value, or `None` for [`Value::Null`].
    pub fn data_type(&self) -> Option<DataType> {
        let hash = match self {
            Value::Null => return None,
            Value::Bool(_) => primitives::BOOL,
            Value::Int8(_) => primitives::INT8,
            Value::Int16(_) => primitives::INT16,
            Value::Int32(_) => primitives::INT32,
            Value::Int64(_) => primitives::INT64,
            Value::UInt8(_) => primitives::UINT8,
            Value::UInt16(_) => primitives::UINT16,
            Value::UInt32(_) => primitives::UINT32,
            Value::UInt64(_) => primitives::UINT64,
            Value::Float(_) => primitives::FLOAT,
            Value::Double(_) => primitives::DOUBLE,
            Value::Char(_) => primitives::CHAR,
            Value::String(_) => primitives::STRING,
            Value::Enum { type_hash, .. } => *type_hash,
            Value::Native(native) => native.type_hash(),
            Value::Array(array) => return Some(array.data_type()),
        };
        Some(DataType::Named(hash))
    }

    /// Short description of the value's variant, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int8(_) => "int8",
            Value::Int16(_) => "int16",
            Value::Int32(_) => "int",
            Value::Int64(_) => "int64",
            Value::UInt8(_) => "uint8",
            Value::UInt16(_) => "uint16",
            Value::UInt32(_) => "uint",
            Value::UInt64(_) => "uint64",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Char(_) => "char",
            Value::String(_) => "string",
            Value::Enum { .. } => "enum",
            Value::Array(_) => "array",
            Value::Native(_) => "native",
        }
    }

    /// Check if this is the absence sentinel.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrow text content.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Check if this is null or an empty string.
    pub fn is_null_or_empty_text(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Borrow array content.
    pub fn as_array(&self) -> Option<&ArrayValue> {
        match self {
            Value::Array(array) => Some(array),
            _ => None,
        }
    }

    /// Borrow native content.
    pub fn as_native(&self) -> Option<&NativeValue> {
        match self {
            Value::Native(native) => Some(native),
            _ => None,
        }
    }

    /// Wrap a registered Rust value.
    pub fn native<T: Any + Send + Sync>(type_hash: TypeHash, value: T) -> Self {
        Value::Native(NativeValue::new(type_hash, value))
    }

    /// Check identity: same variant and, for natives, the same allocation.
    pub fn same_instance(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Native(a), Value::Native(b)) => a.ptr_eq(b),
            _ => self == other,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Bool(v) => write!(f, "Bool({})", v),
            Value::Int8(v) => write!(f, "Int8({})", v),
            Value::Int16(v) => write!(f, "Int16({})", v),
            Value::Int32(v) => write!(f, "Int32({})", v),
            Value::Int64(v) => write!(f, "Int64({})", v),
            Value::UInt8(v) => write!(f, "UInt8({})", v),
            Value::UInt16(v) => write!(f, "UInt16({})", v),
            Value::UInt32(v) => write!(f, "UInt32({})", v),
            Value::UInt64(v) => write!(f, "UInt64({})", v),
            Value::Float(v) => write!(f, "Float({})", v),
            Value::Double(v) => write!(f, "Double({})", v),
            Value::Char(v) => write!(f, "Char({:?})", v),
            Value::String(s) => write!(f, "String({:?})", s),
            Value::Enum { type_hash, value } => write!(f, "Enum({:?}, {})", type_hash, value),
            Value::Array(a) => write!(f, "Array({:?}, {:?})", a.lengths, a.items),
            Value::Native(n) => write!(f, "Native({:?})", n.type_hash),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int8(a), Value::Int8(b)) => a == b,
            (Value::Int16(a), Value::Int16(b)) => a == b,
            (Value::Int32(a), Value::Int32(b)) => a == b,
            (Value::Int64(a), Value::Int64(b)) => a == b,
            (Value::UInt8(a), Value::UInt8(b)) => a == b,
            (Value::UInt16(a), Value::UInt16(b)) => a == b,
            (Value::UInt32(a), Value::UInt32(b)) => a == b,
            (Value::UInt64(a), Value::UInt64(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (
                Value::Enum {
                    type_hash: ta,
                    value: va,
                },
                Value::Enum {
                    type_hash: tb,
                    value: vb,
                },
            ) => ta == tb && va == vb,
            (Value::Array(a), Value::Array(b)) => a == b,
            // Native payloads are opaque; only the same allocation is equal.
            (Value::Native(a), Value::Native(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

// ============================================================================
// Arrays
// ============================================================================

/// A rectangular array stored in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayValue {
    element: DataType,
    lengths: Vec<usize>,
    items: Vec<Value>,
}

impl ArrayValue {
    /// Create an array with explicit dimensions.
    ///
    /// Fails if `lengths` is empty, has more than 255 dimensions, or the item
    /// count does not equal the product of the lengths.
    pub fn new(element: DataType, lengths: Vec<usize>, items: Vec<Value>) -> Result<Self, InvalidValue> {
        if lengths.is_empty() || lengths.len() > u8::MAX as usize {
            return Err(InvalidValue::argument(format!(
                "array rank must be between 1 and 255, got {}",
                lengths.len()
            )));
        }
        let expected: usize = lengths.iter().product();
        if expected != items.len() {
            return Err(InvalidValue::argument(format!(
                "array of shape {:?} needs {} items, got {}",
                lengths,
                expected,
                items.len()
            )));
        }
        Ok(Self {
            element,
            lengths,
            items,
        })
    }

    /// Create a one-dimensional array.
    pub fn vector(element: DataType, items: Vec<Value>) -> Self {
        Self {
            element,
            lengths: vec![items.len()],
            items,
        }
    }

    /// Declared element type.
    pub fn element(&self) -> &DataType {
        &self.element
    }

    /// Number of dimensions.
    pub fn rank(&self) -> u8 {
        self.lengths.len() as u8
    }

    /// Length of each dimension.
    pub fn lengths(&self) -> &[usize] {
        &self.lengths
    }

    /// Elements in row-major order.
    pub fn items(&self) -> &[Value] {
        &self.items
    }

    /// Consume into the row-major element vector.
    pub fn into_items(self) -> Vec<Value> {
        self.items
    }

    /// Total element count.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Element at a multi-dimensional index.
    pub fn get(&self, index: &[usize]) -> Option<&Value> {
        if index.len() != self.lengths.len() {
            return None;
        }
        let mut offset = 0;
        for (&i, &len) in index.iter().zip(&self.lengths) {
            if i >= len {
                return None;
            }
            offset = offset * len + i;
        }
        self.items.get(offset)
    }

    /// Runtime type: `element[]` with this array's rank.
    pub fn data_type(&self) -> DataType {
        DataType::array_of(self.element.clone(), self.rank())
    }
}

// ============================================================================
// Native values
// ============================================================================

/// A registered Rust value carried inside [`Value::Native`].
#[derive(Clone)]
pub struct NativeValue {
    type_hash: TypeHash,
    inner: Arc<dyn Any + Send + Sync>,
}

impl NativeValue {
    /// Wrap `value` as an instance of `type_hash`.
    pub fn new<T: Any + Send + Sync>(type_hash: TypeHash, value: T) -> Self {
        Self {
            type_hash,
            inner: Arc::new(value),
        }
    }

    /// The registered type of this instance.
    pub fn type_hash(&self) -> TypeHash {
        self.type_hash
    }

    /// Borrow the payload as `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Check if both handles share the same allocation.
    pub fn ptr_eq(&self, other: &NativeValue) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}
