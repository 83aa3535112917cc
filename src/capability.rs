//! Capability queries.
//!
//! Read-only mirror of [`Engine::convert`]: the same decision tree, answered
//! with a boolean. Nothing here applies a conversion or touches the cache.
//!
//! A `true` answer promises that a mechanism exists, not that every value
//! of the source type will be accepted by it: `"abc"` can be converted to
//! `int` as far as types go, and the conversion itself then fails with an
//! invalid-value error.

use morph_core::{CustomConverter, DataType, Value};

use crate::convert::unwrap_target;
use crate::discovery;
use crate::engine::Engine;

impl Engine {
    /// Can `value` be converted to `target`?
    ///
    /// Absence can be converted exactly when `target` permits it.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn can_convert(
        &self,
        value: &Value,
        target: &DataType,
        custom: Option<&dyn CustomConverter>,
    ) -> bool {
        let Some(source) = value.data_type() else {
            return self.registry.permits_absence(target);
        };
        if self.registry.is_assignable(&source, target) {
            return true;
        }
        if custom.is_some_and(|c| c.can_convert_from(&source)) {
            return true;
        }

        if let (DataType::Array { element, rank }, Value::Array(array)) = (target, value) {
            if array.rank() == *rank {
                return array
                    .items()
                    .iter()
                    .all(|item| self.can_convert(item, element, None));
            }
        }

        let (inner, optional) = unwrap_target(target);
        if optional && value.is_null_or_empty_text() {
            return true;
        }
        if inner != target && self.registry.is_assignable(&source, inner) {
            return true;
        }

        self.can_convert_type(&source, inner)
    }

    /// Does a conversion mechanism exist from `source` to `target`?
    ///
    /// Agrees with [`Engine::resolve`] for every pair, without caching.
    pub fn can_convert_type(&self, source: &DataType, target: &DataType) -> bool {
        discovery::discover(&self.registry, source, target).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use morph_core::{
        ArrayValue, ConversionContext, FnConverter, TypeHash, primitives,
    };
    use morph_registry::{TypeEntry, TypeKind, TypeRegistry};

    fn named(hash: TypeHash) -> DataType {
        DataType::named(hash)
    }

    #[test]
    fn absence_follows_target() {
        let mut registry = TypeRegistry::with_primitives();
        let node = registry
            .register_type(TypeEntry::class("Node", TypeKind::Reference))
            .unwrap();
        let engine = Engine::new(registry);

        assert!(engine.can_convert(&Value::Null, &named(node), None));
        assert!(engine.can_convert(&Value::Null, &named(primitives::STRING), None));
        assert!(engine.can_convert(&Value::Null, &DataType::optional(named(primitives::INT32)), None));
        assert!(!engine.can_convert(&Value::Null, &named(primitives::INT32), None));
    }

    #[test]
    fn mirrors_convert_for_scalars() {
        let engine = Engine::default();
        let int = named(primitives::INT32);
        let char_ty = named(primitives::CHAR);

        assert!(engine.can_convert(&Value::Int32(1), &int, None));
        assert!(engine.can_convert(&Value::from("12"), &int, None));
        assert!(!engine.can_convert(&Value::Bool(true), &char_ty, None));

        let ctx = ConversionContext::empty();
        assert!(engine.convert(Value::Bool(true), &char_ty, None, &ctx, None).is_err());
    }

    #[test]
    fn custom_converter_counts() {
        let engine = Engine::default();
        let char_ty = named(primitives::CHAR);
        let from_bool = FnConverter::new(
            |source| source.is(primitives::BOOL),
            |_, value| Ok(Value::Char(if value == Value::Bool(true) { 'y' } else { 'n' })),
        );
        assert!(engine.can_convert(&Value::Bool(true), &char_ty, Some(&from_bool)));
    }

    #[test]
    fn arrays_check_every_element() {
        let engine = Engine::default();
        let strings = ArrayValue::vector(
            named(primitives::STRING),
            vec![Value::from("1"), Value::Null],
        );
        let bools = ArrayValue::vector(named(primitives::BOOL), vec![Value::Bool(true)]);
        let ints = DataType::array_of(named(primitives::INT32), 1);
        let optional_ints = DataType::array_of(DataType::optional(named(primitives::INT32)), 1);
        let chars = DataType::array_of(named(primitives::CHAR), 1);

        assert!(!engine.can_convert(&Value::Array(strings.clone()), &ints, None));
        assert!(engine.can_convert(&Value::Array(strings), &optional_ints, None));
        assert!(!engine.can_convert(&Value::Array(bools.clone()), &chars, None));
        assert!(!engine.can_convert(&Value::Array(bools), &DataType::array_of(named(primitives::CHAR), 2), None));
    }

    #[test]
    fn empty_text_into_optional() {
        let engine = Engine::default();
        let target = DataType::optional(named(primitives::BOOL));
        assert!(engine.can_convert(&Value::from(""), &target, None));
    }

    #[test]
    fn never_touches_cache() {
        let engine = Engine::default();
        let string = named(primitives::STRING);
        let double = named(primitives::DOUBLE);
        assert!(engine.can_convert_type(&string, &double));
        assert!(engine.can_convert(&Value::from("1.5"), &double, None));
        assert!(engine.cache().is_empty());
        assert_eq!(engine.cache().stats(), Default::default());
    }

    #[test]
    fn type_query_agrees_with_resolve() {
        let engine = Engine::default();
        let types: Vec<DataType> = primitives::NUMERICS
            .into_iter()
            .chain([primitives::BOOL, primitives::CHAR, primitives::STRING, primitives::OBJECT])
            .map(named)
            .collect();

        for source in &types {
            for target in &types {
                assert_eq!(
                    engine.can_convert_type(source, target),
                    engine.resolve(source, target).is_some(),
                    "{source:?} -> {target:?}"
                );
            }
        }
    }
}
