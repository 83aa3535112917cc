//! TypeRegistry - named types, their hierarchy, operators and converters.
//!
//! The registry answers the type-level questions the engine asks while
//! resolving a conversion: is `S` assignable to `D`, which operators does a
//! type declare, and which descriptor converter serves a type.
//!
//! # Thread Safety
//!
//! `TypeRegistry` is populated single-threaded and then shared read-only,
//! typically behind an `Arc` owned by the engine. Registration after the
//! engine has started resolving conversions is not supported: the
//! engine's cache assumes the mechanism between two types never changes.
//!
//! # Example
//!
//! ```
//! use morph_core::{DataType, primitives};
//! use morph_registry::{TypeEntry, TypeKind, TypeRegistry};
//!
//! let mut registry = TypeRegistry::with_primitives();
//! let shape = registry.register_type(TypeEntry::class("Shape", TypeKind::Reference)).unwrap();
//! let circle = registry
//!     .register_type(TypeEntry::class("Circle", TypeKind::Reference).with_base(shape))
//!     .unwrap();
//!
//! assert!(registry.is_assignable(&DataType::named(circle), &DataType::named(shape)));
//! assert!(registry.is_assignable(&DataType::named(circle), &DataType::named(primitives::OBJECT)));
//! ```

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use morph_core::{
    ConverterRef, DataType, RegistrationError, TypeHash, Value, primitives,
};

use crate::builtin::{
    BoolConverter, CharConverter, EnumConverter, NumericConverter, primitive_name,
};
use crate::entry::{ConversionOperator, TypeEntry, TypeKind};

/// Registry of named types.
#[derive(Default)]
pub struct TypeRegistry {
    types: FxHashMap<TypeHash, TypeEntry>,
}

impl TypeRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in types and their converters.
    pub fn with_primitives() -> Self {
        let mut registry = Self::new();
        registry.register_all_primitives();
        registry
    }

    /// Register `object`, `bool`, `char`, `string` and the numeric types.
    ///
    /// Already-registered built-ins are left untouched.
    pub fn register_all_primitives(&mut self) {
        let mut add = |entry: TypeEntry| {
            self.types.entry(entry.type_hash()).or_insert(entry);
        };

        add(TypeEntry::class("object", TypeKind::Reference));
        add(TypeEntry::primitive("string"));
        add(TypeEntry::primitive("bool").with_converter(Arc::new(BoolConverter)));
        add(TypeEntry::primitive("char").with_converter(Arc::new(CharConverter)));
        for hash in primitives::NUMERICS {
            if let Some(name) = primitive_name(hash) {
                add(TypeEntry::primitive(name)
                    .with_converter(Arc::new(NumericConverter::new(hash))));
            }
        }
    }

    // ==========================================================================
    // Registration
    // ==========================================================================

    /// Register a type. Returns its hash.
    pub fn register_type(&mut self, entry: TypeEntry) -> Result<TypeHash, RegistrationError> {
        let hash = entry.type_hash();
        if self.types.contains_key(&hash) {
            return Err(RegistrationError::DuplicateType(entry.name().to_string()));
        }
        for operator in entry.operators() {
            Self::validate_operator(entry.name(), hash, operator)?;
        }
        self.types.insert(hash, entry);
        Ok(hash)
    }

    /// Declare an additional operator on an already registered type.
    pub fn register_operator(
        &mut self,
        owner: TypeHash,
        operator: ConversionOperator,
    ) -> Result<(), RegistrationError> {
        let entry = self
            .types
            .get_mut(&owner)
            .ok_or_else(|| RegistrationError::TypeNotFound(owner.to_string()))?;
        Self::validate_operator(entry.name(), owner, &operator)?;
        entry.push_operator(operator);
        Ok(())
    }

    /// Replace the descriptor converter of a registered type.
    pub fn register_converter(
        &mut self,
        owner: TypeHash,
        converter: ConverterRef,
    ) -> Result<(), RegistrationError> {
        let entry = self
            .types
            .get_mut(&owner)
            .ok_or_else(|| RegistrationError::TypeNotFound(owner.to_string()))?;
        entry.set_converter(converter);
        Ok(())
    }

    /// Register an enum with the given members and a matching converter.
    pub fn register_enum(
        &mut self,
        name: &str,
        members: &[(&str, i64)],
    ) -> Result<TypeHash, RegistrationError> {
        let mut seen = FxHashSet::default();
        for (member, _) in members {
            if !seen.insert(member.to_ascii_lowercase()) {
                return Err(RegistrationError::DuplicateEnumValue {
                    enum_name: name.to_string(),
                    value_name: member.to_string(),
                });
            }
        }
        let owned = members.iter().map(|(n, v)| (n.to_string(), *v)).collect();
        let converter = Arc::new(EnumConverter::new(name, owned));
        self.register_type(TypeEntry::enumeration(name).with_converter(converter))
    }

    fn validate_operator(
        owner_name: &str,
        owner: TypeHash,
        operator: &ConversionOperator,
    ) -> Result<(), RegistrationError> {
        let owned = operator.param().is(owner) || operator.ret().is(owner);
        if !owned {
            return Err(RegistrationError::InvalidOperator {
                owner: owner_name.to_string(),
                reason: "declaring type must be the parameter or the return type".to_string(),
            });
        }
        if operator.param() == operator.ret() {
            return Err(RegistrationError::InvalidOperator {
                owner: owner_name.to_string(),
                reason: "parameter and return type are identical".to_string(),
            });
        }
        Ok(())
    }

    // ==========================================================================
    // Lookup
    // ==========================================================================

    /// Get a type by its hash.
    pub fn get(&self, hash: TypeHash) -> Option<&TypeEntry> {
        self.types.get(&hash)
    }

    /// Check if a type is registered.
    pub fn contains(&self, hash: TypeHash) -> bool {
        self.types.contains_key(&hash)
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Operators declared on a named type; empty for shapes and unknown types.
    pub fn operators_of(&self, ty: &DataType) -> &[ConversionOperator] {
        ty.as_named()
            .and_then(|hash| self.types.get(&hash))
            .map(TypeEntry::operators)
            .unwrap_or(&[])
    }

    /// Descriptor converter for a type (the type-description facility).
    pub fn converter_for(&self, ty: &DataType) -> Option<ConverterRef> {
        let hash = ty.as_named()?;
        self.types.get(&hash)?.converter().cloned()
    }

    /// Human-readable type name: `int`, `int[,]`, `int?`, `int&`.
    pub fn type_name(&self, ty: &DataType) -> String {
        match ty {
            DataType::Named(hash) => self
                .types
                .get(hash)
                .map(|e| e.name().to_string())
                .unwrap_or_else(|| hash.to_string()),
            DataType::Array { element, rank } => {
                let commas = ",".repeat(rank.saturating_sub(1) as usize);
                format!("{}[{}]", self.type_name(element), commas)
            }
            DataType::Optional(inner) => format!("{}?", self.type_name(inner)),
            DataType::ByRef(inner) => format!("{}&", self.type_name(inner)),
        }
    }

    /// Name of a value's runtime type (`null` for absence).
    pub fn value_type_name(&self, value: &Value) -> String {
        match value.data_type() {
            Some(ty) => self.type_name(&ty),
            None => "null".to_string(),
        }
    }

    // ==========================================================================
    // Type relations
    // ==========================================================================

    /// Walk the base-class chain of `source` looking for `target`.
    pub fn is_derived_from(&self, source: TypeHash, target: TypeHash) -> bool {
        let mut current = source;
        let mut steps = 0;
        while let Some(base) = self.types.get(&current).and_then(TypeEntry::base) {
            if base == target {
                return true;
            }
            current = base;
            steps += 1;
            // A malformed registry could contain a cycle.
            if steps > self.types.len() {
                return false;
            }
        }
        false
    }

    /// Check whether `source` implements `interface`, directly, through a
    /// base class, or through interface inheritance.
    pub fn implements(&self, source: TypeHash, interface: TypeHash) -> bool {
        let mut pending = vec![source];
        let mut visited = FxHashSet::default();
        while let Some(current) = pending.pop() {
            if !visited.insert(current) {
                continue;
            }
            let Some(entry) = self.types.get(&current) else {
                continue;
            };
            if entry.interfaces().contains(&interface) {
                return true;
            }
            pending.extend_from_slice(entry.interfaces());
            pending.extend(entry.base());
        }
        false
    }

    /// Whether a slot of type `ty` can hold absence.
    pub fn permits_absence(&self, ty: &DataType) -> bool {
        match ty {
            DataType::Optional(_) | DataType::Array { .. } => true,
            DataType::ByRef(inner) => self.permits_absence(inner),
            DataType::Named(hash) => {
                *hash == primitives::STRING
                    || self
                        .types
                        .get(hash)
                        .is_some_and(|e| e.kind().is_reference_like())
            }
        }
    }

    fn is_reference_like(&self, ty: &DataType) -> bool {
        match ty {
            DataType::Array { .. } => true,
            DataType::Named(_) => self.permits_absence(ty),
            DataType::Optional(_) | DataType::ByRef(_) => false,
        }
    }

    /// Whether a value of runtime type `source` can be used where `target`
    /// is expected, as-is.
    ///
    /// True for identity, any type to `object`, derived to base, class to
    /// implemented interface, `T` to `T?`, and rank-equal arrays whose
    /// elements are identical or reference-like and assignable.
    pub fn is_assignable(&self, source: &DataType, target: &DataType) -> bool {
        if source == target || target.is(primitives::OBJECT) {
            return true;
        }
        match (source, target) {
            (DataType::Named(s), DataType::Named(t)) => {
                self.is_derived_from(*s, *t) || self.implements(*s, *t)
            }
            (_, DataType::Optional(inner)) => self.is_assignable(source, inner),
            (
                DataType::Array {
                    element: se,
                    rank: sr,
                },
                DataType::Array {
                    element: te,
                    rank: tr,
                },
            ) => sr == tr && self.is_reference_like(se) && self.is_assignable(se, te),
            _ => false,
        }
    }
}
