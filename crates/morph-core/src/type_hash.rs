//! Deterministic hash-based type identity.
//!
//! [`TypeHash`] is the identity token every other part of the engine keys on.
//! Named types hash their qualified name; composite shapes (arrays, optional
//! and by-reference wrappers) mix the hash of their element with a
//! shape-specific domain constant, so `int[]`, `int[,]`, `int?` and `int&`
//! all receive distinct identities without any registration step.
//!
//! # Examples
//!
//! ```
//! use morph_core::{TypeHash, primitives};
//!
//! assert_eq!(TypeHash::from_name("int"), primitives::INT32);
//!
//! let vector = TypeHash::from_array(primitives::INT32, 1);
//! let matrix = TypeHash::from_array(primitives::INT32, 2);
//! assert_ne!(vector, matrix);
//! ```

use std::fmt;
use xxhash_rust::xxh64::xxh64;

/// Domain-specific mixing constants for hash computation.
pub mod hash_constants {
    /// Separator constant used when folding components together.
    pub const SEP: u64 = 0x4bc94d6bd06053ad;

    /// Domain marker for named type hashes.
    pub const TYPE: u64 = 0x2fac10b63a6cc57c;

    /// Domain marker for array shapes.
    pub const ARRAY: u64 = 0x5ea77ffbcdf5f302;

    /// Domain marker for optional (nullable) wrappers.
    pub const OPTIONAL: u64 = 0x7d3c8b4a92e15f6d;

    /// Domain marker for by-reference wrappers.
    pub const BY_REF: u64 = 0x3e9f5d2a8c7b1403;
}

/// A deterministic 64-bit hash identifying a type.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// Empty/invalid hash constant.
    pub const EMPTY: TypeHash = TypeHash(0);

    /// Create a type hash from a qualified type name.
    ///
    /// The same name always produces the same hash.
    #[inline]
    pub fn from_name(name: &str) -> Self {
        TypeHash(hash_constants::TYPE ^ xxh64(name.as_bytes(), 0))
    }

    /// Create the hash of an array of `element` with the given rank.
    ///
    /// Rank participates in the hash: `int[]` and `int[,]` differ.
    #[inline]
    pub fn from_array(element: TypeHash, rank: u8) -> Self {
        let hash = (hash_constants::ARRAY ^ element.0)
            .wrapping_mul(hash_constants::SEP)
            .wrapping_add(rank as u64);
        TypeHash(hash)
    }

    /// Create the hash of an optional wrapper around `inner`.
    #[inline]
    pub fn from_optional(inner: TypeHash) -> Self {
        TypeHash((hash_constants::OPTIONAL ^ inner.0).wrapping_mul(hash_constants::SEP))
    }

    /// Create the hash of a by-reference wrapper around `inner`.
    #[inline]
    pub fn from_by_ref(inner: TypeHash) -> Self {
        TypeHash((hash_constants::BY_REF ^ inner.0).wrapping_mul(hash_constants::SEP))
    }

    /// Check if this is an empty/invalid hash.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Get the underlying u64 value.
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHash({:#018x})", self.0)
    }
}

impl fmt::Display for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// Well-known hashes for the built-in types.
///
/// Pre-computed from `TypeHash::from_name()`.
pub mod primitives {
    use super::TypeHash;

    /// Hash for `object`, the root type every value is assignable to.
    pub const OBJECT: TypeHash = TypeHash(0x7453af4894759ab5);

    /// Hash for `bool` type
    pub const BOOL: TypeHash = TypeHash(0x1e0c8fa4cced99c1);

    /// Hash for `int8` type
    pub const INT8: TypeHash = TypeHash(0x2b44191092e74388);

    /// Hash for `int16` type
    pub const INT16: TypeHash = TypeHash(0x95aebfc985e9b115);

    /// Hash for `int` type (32-bit signed integer)
    pub const INT32: TypeHash = TypeHash(0x4f5e5320cd1c92bf);

    /// Hash for `int64` type
    pub const INT64: TypeHash = TypeHash(0x7d6c550df59a1924);

    /// Hash for `uint8` type
    pub const UINT8: TypeHash = TypeHash(0x0e8b2d31cdfa9716);

    /// Hash for `uint16` type
    pub const UINT16: TypeHash = TypeHash(0x269d68dfde65ae7f);

    /// Hash for `uint` type (32-bit unsigned integer)
    pub const UINT32: TypeHash = TypeHash(0x543fb8f520aa3e26);

    /// Hash for `uint64` type
    pub const UINT64: TypeHash = TypeHash(0x32ba58d17fda82dd);

    /// Hash for `float` type
    pub const FLOAT: TypeHash = TypeHash(0x02d5a2fddaf5bb69);

    /// Hash for `double` type
    pub const DOUBLE: TypeHash = TypeHash(0xeb125587f6c2a79b);

    /// Hash for `char` type
    pub const CHAR: TypeHash = TypeHash(0x1262f4f62a255c69);

    /// Hash for `string` type
    pub const STRING: TypeHash = TypeHash(0x7a8d5fb1ba695978);

    /// All integer primitives, narrowest signed first.
    pub const INTEGERS: [TypeHash; 8] = [INT8, INT16, INT32, INT64, UINT8, UINT16, UINT32, UINT64];

    /// All numeric primitives.
    pub const NUMERICS: [TypeHash; 10] = [
        INT8, INT16, INT32, INT64, UINT8, UINT16, UINT32, UINT64, FLOAT, DOUBLE,
    ];

    /// Check if the hash names a numeric primitive.
    pub fn is_numeric(hash: TypeHash) -> bool {
        NUMERICS.contains(&hash)
    }
}
