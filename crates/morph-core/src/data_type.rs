//! DataType - the shape of a conversion destination or a value's runtime type.
//!
//! A [`DataType`] is either a named type (identified by its [`TypeHash`]) or
//! one of the three structural shapes the engine understands: fixed-rank
//! arrays, optional wrappers and by-reference wrappers. Shapes nest, so
//! `int?[]` is `Array { element: Optional(Named(int)), rank: 1 }`.
//!
//! # Example
//!
//! ```
//! use morph_core::{DataType, primitives};
//!
//! let matrix = DataType::array_of(DataType::named(primitives::DOUBLE), 2);
//! assert!(matrix.is_array());
//! assert_eq!(matrix.rank(), Some(2));
//!
//! let maybe = DataType::optional(DataType::named(primitives::INT32));
//! assert_eq!(maybe.optional_inner(), Some(&DataType::named(primitives::INT32)));
//! ```

use crate::TypeHash;

/// A complete type description.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataType {
    /// A registered type, referenced by hash.
    Named(TypeHash),
    /// A rectangular array with `rank` dimensions.
    Array {
        /// Element type.
        element: Box<DataType>,
        /// Number of dimensions (at least 1).
        rank: u8,
    },
    /// A value of the inner type, or absence.
    Optional(Box<DataType>),
    /// A by-reference slot holding the inner type.
    ByRef(Box<DataType>),
}

impl DataType {
    /// A named type.
    #[inline]
    pub const fn named(hash: TypeHash) -> Self {
        DataType::Named(hash)
    }

    /// An array of `element` with the given rank.
    pub fn array_of(element: DataType, rank: u8) -> Self {
        DataType::Array {
            element: Box::new(element),
            rank: rank.max(1),
        }
    }

    /// An optional wrapper around `inner`.
    pub fn optional(inner: DataType) -> Self {
        DataType::Optional(Box::new(inner))
    }

    /// A by-reference wrapper around `inner`.
    pub fn by_ref(inner: DataType) -> Self {
        DataType::ByRef(Box::new(inner))
    }

    /// The identity token for this shape.
    ///
    /// Structurally equal data types always produce the same hash.
    pub fn type_hash(&self) -> TypeHash {
        match self {
            DataType::Named(hash) => *hash,
            DataType::Array { element, rank } => TypeHash::from_array(element.type_hash(), *rank),
            DataType::Optional(inner) => TypeHash::from_optional(inner.type_hash()),
            DataType::ByRef(inner) => TypeHash::from_by_ref(inner.type_hash()),
        }
    }

    /// The hash if this is a named type.
    pub fn as_named(&self) -> Option<TypeHash> {
        match self {
            DataType::Named(hash) => Some(*hash),
            _ => None,
        }
    }

    /// Check if this is the named type `hash`.
    pub fn is(&self, hash: TypeHash) -> bool {
        self.as_named() == Some(hash)
    }

    /// Check if this is an array shape.
    pub fn is_array(&self) -> bool {
        matches!(self, DataType::Array { .. })
    }

    /// Array element type.
    pub fn element(&self) -> Option<&DataType> {
        match self {
            DataType::Array { element, .. } => Some(element),
            _ => None,
        }
    }

    /// Array rank.
    pub fn rank(&self) -> Option<u8> {
        match self {
            DataType::Array { rank, .. } => Some(*rank),
            _ => None,
        }
    }

    /// Inner type of an optional wrapper.
    pub fn optional_inner(&self) -> Option<&DataType> {
        match self {
            DataType::Optional(inner) => Some(inner),
            _ => None,
        }
    }

    /// Referent type of a by-reference wrapper.
    pub fn by_ref_inner(&self) -> Option<&DataType> {
        match self {
            DataType::ByRef(inner) => Some(inner),
            _ => None,
        }
    }
}

impl From<TypeHash> for DataType {
    fn from(hash: TypeHash) -> Self {
        DataType::Named(hash)
    }
}

/// Directional cache key: conversion from `source` to `target`.
///
/// Both components are identity tokens, so equality and hashing never look
/// at structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypePair {
    /// Runtime type of the value being converted.
    pub source: TypeHash,
    /// Type being produced.
    pub target: TypeHash,
}

impl TypePair {
    /// Build the key for a pair of data types.
    pub fn new(source: &DataType, target: &DataType) -> Self {
        Self {
            source: source.type_hash(),
            target: target.type_hash(),
        }
    }
}
