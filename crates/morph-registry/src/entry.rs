//! Type entries and conversion operators.
//!
//! A [`TypeEntry`] is everything the engine may need to know about a named
//! type: its kind, its place in the class hierarchy, the conversion
//! operators it declares, and the descriptor converter the type-description
//! facility hands out for it.

use std::fmt;
use std::sync::Arc;

use morph_core::{ConverterRef, DataType, InvalidValue, TypeHash, Value};

/// Kind of a registered type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// Built-in scalar (`int`, `bool`, ...).
    Primitive,
    /// User value type; never null.
    Value,
    /// User reference type; may be null.
    Reference,
    /// Interface; may be null.
    Interface,
    /// Enumeration backed by an integer.
    Enum,
}

impl TypeKind {
    /// Whether a slot of this kind can hold absence.
    pub fn is_reference_like(self) -> bool {
        matches!(self, TypeKind::Reference | TypeKind::Interface)
    }
}

/// Implicit (widening) or explicit (narrowing) operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    /// Applied without a cast.
    Implicit,
    /// Requires a cast.
    Explicit,
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatorKind::Implicit => write!(f, "implicit"),
            OperatorKind::Explicit => write!(f, "explicit"),
        }
    }
}

/// Operator body.
pub type OperatorFn = Arc<dyn Fn(Value) -> Result<Value, InvalidValue> + Send + Sync>;

/// A user-declared conversion operator `ret op(param)`.
///
/// The declaring type must appear as either the parameter or the return type.
#[derive(Clone)]
pub struct ConversionOperator {
    kind: OperatorKind,
    param: DataType,
    ret: DataType,
    func: OperatorFn,
}

impl ConversionOperator {
    /// Declare an implicit operator from `param` to `ret`.
    pub fn implicit<F>(param: impl Into<DataType>, ret: impl Into<DataType>, func: F) -> Self
    where
        F: Fn(Value) -> Result<Value, InvalidValue> + Send + Sync + 'static,
    {
        Self {
            kind: OperatorKind::Implicit,
            param: param.into(),
            ret: ret.into(),
            func: Arc::new(func),
        }
    }

    /// Declare an explicit operator from `param` to `ret`.
    pub fn explicit<F>(param: impl Into<DataType>, ret: impl Into<DataType>, func: F) -> Self
    where
        F: Fn(Value) -> Result<Value, InvalidValue> + Send + Sync + 'static,
    {
        Self {
            kind: OperatorKind::Explicit,
            param: param.into(),
            ret: ret.into(),
            func: Arc::new(func),
        }
    }

    /// Implicit or explicit.
    pub fn kind(&self) -> OperatorKind {
        self.kind
    }

    /// Declared parameter type.
    pub fn param(&self) -> &DataType {
        &self.param
    }

    /// Declared return type.
    pub fn ret(&self) -> &DataType {
        &self.ret
    }

    /// Shared handle to the operator body.
    pub fn func(&self) -> OperatorFn {
        Arc::clone(&self.func)
    }

    /// Invoke the operator.
    pub fn apply(&self, value: Value) -> Result<Value, InvalidValue> {
        (self.func)(value)
    }
}

impl fmt::Debug for ConversionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionOperator")
            .field("kind", &self.kind)
            .field("param", &self.param)
            .field("ret", &self.ret)
            .finish_non_exhaustive()
    }
}

/// A registered named type.
#[derive(Clone)]
pub struct TypeEntry {
    name: String,
    type_hash: TypeHash,
    kind: TypeKind,
    base: Option<TypeHash>,
    interfaces: Vec<TypeHash>,
    operators: Vec<ConversionOperator>,
    converter: Option<ConverterRef>,
}

impl TypeEntry {
    fn new(name: &str, kind: TypeKind) -> Self {
        Self {
            name: name.to_string(),
            type_hash: TypeHash::from_name(name),
            kind,
            base: None,
            interfaces: Vec::new(),
            operators: Vec::new(),
            converter: None,
        }
    }

    /// A built-in scalar.
    pub fn primitive(name: &str) -> Self {
        Self::new(name, TypeKind::Primitive)
    }

    /// A user class of the given kind (usually `Value` or `Reference`).
    pub fn class(name: &str, kind: TypeKind) -> Self {
        Self::new(name, kind)
    }

    /// An interface.
    pub fn interface(name: &str) -> Self {
        Self::new(name, TypeKind::Interface)
    }

    /// An enumeration.
    pub fn enumeration(name: &str) -> Self {
        Self::new(name, TypeKind::Enum)
    }

    /// Set the base class.
    pub fn with_base(mut self, base: TypeHash) -> Self {
        self.base = Some(base);
        self
    }

    /// Add an implemented (or, for interfaces, extended) interface.
    pub fn with_interface(mut self, interface: TypeHash) -> Self {
        self.interfaces.push(interface);
        self
    }

    /// Declare a conversion operator on this type.
    pub fn with_operator(mut self, operator: ConversionOperator) -> Self {
        self.operators.push(operator);
        self
    }

    /// Set the descriptor converter for this type.
    pub fn with_converter(mut self, converter: ConverterRef) -> Self {
        self.converter = Some(converter);
        self
    }

    /// Qualified name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identity hash.
    pub fn type_hash(&self) -> TypeHash {
        self.type_hash
    }

    /// Kind of the type.
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Base class, if any.
    pub fn base(&self) -> Option<TypeHash> {
        self.base
    }

    /// Directly implemented interfaces.
    pub fn interfaces(&self) -> &[TypeHash] {
        &self.interfaces
    }

    /// Declared conversion operators, in declaration order.
    pub fn operators(&self) -> &[ConversionOperator] {
        &self.operators
    }

    /// Descriptor converter.
    pub fn converter(&self) -> Option<&ConverterRef> {
        self.converter.as_ref()
    }

    pub(crate) fn push_operator(&mut self, operator: ConversionOperator) {
        self.operators.push(operator);
    }

    pub(crate) fn set_converter(&mut self, converter: ConverterRef) {
        self.converter = Some(converter);
    }
}

impl fmt::Debug for TypeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeEntry")
            .field("name", &self.name)
            .field("type_hash", &self.type_hash)
            .field("kind", &self.kind)
            .field("base", &self.base)
            .field("interfaces", &self.interfaces)
            .field("operators", &self.operators)
            .field("has_converter", &self.converter.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use morph_core::primitives;

    #[test]
    fn class_builder() {
        let shape = TypeHash::from_name("Shape");
        let drawable = TypeHash::from_name("IDrawable");
        let entry = TypeEntry::class("Circle", TypeKind::Reference)
            .with_base(shape)
            .with_interface(drawable);

        assert_eq!(entry.name(), "Circle");
        assert_eq!(entry.type_hash(), TypeHash::from_name("Circle"));
        assert_eq!(entry.base(), Some(shape));
        assert_eq!(entry.interfaces(), &[drawable]);
        assert!(entry.converter().is_none());
    }

    #[test]
    fn operator_applies_body() {
        let op = ConversionOperator::implicit(primitives::INT32, primitives::INT64, |v| match v {
            Value::Int32(i) => Ok(Value::Int64(i as i64)),
            other => Err(InvalidValue::mismatch("int", other.kind_name())),
        });
        assert_eq!(op.kind(), OperatorKind::Implicit);
        assert_eq!(op.param(), &DataType::named(primitives::INT32));
        assert_eq!(op.apply(Value::Int32(5)).unwrap(), Value::Int64(5));
        assert!(op.apply(Value::Bool(true)).is_err());
    }

    #[test]
    fn reference_like_kinds() {
        assert!(TypeKind::Reference.is_reference_like());
        assert!(TypeKind::Interface.is_reference_like());
        assert!(!TypeKind::Value.is_reference_like());
        assert!(!TypeKind::Enum.is_reference_like());
    }
}
