//! Strategy discovery.
//!
//! Given a source and a destination type, probe the conversion mechanisms in
//! a fixed priority order and report the first that applies:
//!
//! | Rank | Mechanism |
//! |------|-----------|
//! | 1 | destination implicit operator, parameter is exactly the source |
//! | 2 | destination implicit operator, parameter assignable from the source |
//! | 3 | source implicit operator, `source -> destination` exactly |
//! | 4 | source implicit operator, return assignable to the destination |
//! | 5 | source explicit operator, return is exactly the destination |
//! | 6 | source explicit operator, return assignable to the destination |
//! | 7 | the source type's descriptor converter, `can_convert_to(destination)` |
//! | 8 | the destination type's descriptor converter, `can_convert_from(source)` |
//!
//! Operators bind statically and are preferred over descriptor converters,
//! which are the most permissive mechanism and therefore tried last.
//! Within one rank, operators are tried in declaration order.

use std::fmt;
use std::sync::Arc;

use morph_core::{ConversionContext, ConverterRef, Culture, DataType, Value};
use morph_registry::{ConversionOperator, OperatorFn, OperatorKind, TypeRegistry};

use crate::cache::ConversionFn;

/// Which mechanism a resolved conversion uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Mechanism {
    /// Destination-side implicit operator taking exactly the source type.
    TargetImplicitExact,
    /// Destination-side implicit operator taking a supertype of the source.
    TargetImplicitAssignable,
    /// Source-side implicit operator returning exactly the destination.
    SourceImplicitExact,
    /// Source-side implicit operator returning a subtype of the destination.
    SourceImplicitAssignable,
    /// Source-side explicit operator returning exactly the destination.
    SourceExplicitExact,
    /// Source-side explicit operator returning a subtype of the destination.
    SourceExplicitAssignable,
    /// The source type's descriptor converter.
    SourceConverter,
    /// The destination type's descriptor converter.
    TargetConverter,
}

impl Mechanism {
    /// Priority rank, 1 (tried first) to 8 (tried last).
    pub fn rank(self) -> u8 {
        self as u8 + 1
    }

    /// Whether this mechanism is a declared conversion operator.
    pub fn is_operator(self) -> bool {
        self < Mechanism::SourceConverter
    }
}

impl fmt::Display for Mechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mechanism::TargetImplicitExact => "destination implicit operator (exact)",
            Mechanism::TargetImplicitAssignable => "destination implicit operator (assignable)",
            Mechanism::SourceImplicitExact => "source implicit operator (exact)",
            Mechanism::SourceImplicitAssignable => "source implicit operator (assignable)",
            Mechanism::SourceExplicitExact => "source explicit operator (exact)",
            Mechanism::SourceExplicitAssignable => "source explicit operator (assignable)",
            Mechanism::SourceConverter => "source descriptor converter",
            Mechanism::TargetConverter => "destination descriptor converter",
        };
        f.write_str(name)
    }
}

enum Strategy {
    Operator(OperatorFn),
    SourceConverter(ConverterRef),
    TargetConverter(ConverterRef),
}

/// Result of a successful probe.
pub(crate) struct Discovered {
    mechanism: Mechanism,
    strategy: Strategy,
}

impl Discovered {
    pub(crate) fn mechanism(&self) -> Mechanism {
        self.mechanism
    }

    /// Build the cacheable conversion function.
    ///
    /// Source-side converters need the destination type and the culture, so
    /// both are captured.
    pub(crate) fn into_fn(self, target: &DataType, culture: &Culture) -> ConversionFn {
        match self.strategy {
            Strategy::Operator(func) => {
                Arc::new(move |_ctx: &ConversionContext<'_>, value: Value| func(value))
            }
            Strategy::SourceConverter(converter) => {
                let target = target.clone();
                let culture = culture.clone();
                Arc::new(move |ctx: &ConversionContext<'_>, value: Value| {
                    converter.convert_to(ctx, &culture, value, &target)
                })
            }
            Strategy::TargetConverter(converter) => {
                Arc::new(move |ctx: &ConversionContext<'_>, value: Value| {
                    converter.convert_from(ctx, value)
                })
            }
        }
    }
}

/// Probe every mechanism for `source -> target` in priority order.
///
/// Pure: reads the registry only.
pub(crate) fn discover(
    registry: &TypeRegistry,
    source: &DataType,
    target: &DataType,
) -> Option<Discovered> {
    let target_ops = registry.operators_of(target);
    let source_ops = registry.operators_of(source);

    let operator = |mechanism: Mechanism, op: &ConversionOperator| Discovered {
        mechanism,
        strategy: Strategy::Operator(op.func()),
    };

    // Destination side: `target op(param)` declared on the destination.
    let target_implicit = move || {
        target_ops
            .iter()
            .filter(move |op| op.kind() == OperatorKind::Implicit && op.ret() == target)
    };
    if let Some(op) = target_implicit().find(|op| op.param() == source) {
        return Some(operator(Mechanism::TargetImplicitExact, op));
    }
    if let Some(op) = target_implicit().find(|op| registry.is_assignable(source, op.param())) {
        return Some(operator(Mechanism::TargetImplicitAssignable, op));
    }

    // Source side: `ret op(source)` declared on the source.
    let source_side = move |kind: OperatorKind| {
        source_ops
            .iter()
            .filter(move |op| op.kind() == kind && registry.is_assignable(source, op.param()))
    };
    if let Some(op) = source_side(OperatorKind::Implicit)
        .find(|op| op.param() == source && op.ret() == target)
    {
        return Some(operator(Mechanism::SourceImplicitExact, op));
    }
    if let Some(op) =
        source_side(OperatorKind::Implicit).find(|op| registry.is_assignable(op.ret(), target))
    {
        return Some(operator(Mechanism::SourceImplicitAssignable, op));
    }
    if let Some(op) = source_side(OperatorKind::Explicit).find(|op| op.ret() == target) {
        return Some(operator(Mechanism::SourceExplicitExact, op));
    }
    if let Some(op) =
        source_side(OperatorKind::Explicit).find(|op| registry.is_assignable(op.ret(), target))
    {
        return Some(operator(Mechanism::SourceExplicitAssignable, op));
    }

    if let Some(converter) = registry
        .converter_for(source)
        .filter(|c| c.can_convert_to(target))
    {
        return Some(Discovered {
            mechanism: Mechanism::SourceConverter,
            strategy: Strategy::SourceConverter(converter),
        });
    }
    if let Some(converter) = registry
        .converter_for(target)
        .filter(|c| c.can_convert_from(source))
    {
        return Some(Discovered {
            mechanism: Mechanism::TargetConverter,
            strategy: Strategy::TargetConverter(converter),
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use morph_core::{TypeHash, primitives};
    use morph_registry::{TypeEntry, TypeKind};

    fn int() -> DataType {
        DataType::named(primitives::INT32)
    }

    fn string() -> DataType {
        DataType::named(primitives::STRING)
    }

    fn tagged(tag: i32) -> impl Fn(Value) -> Result<Value, morph_core::InvalidValue> {
        move |_| Ok(Value::Int32(tag))
    }

    fn run(found: Discovered, target: &DataType, value: Value) -> Value {
        let func = found.into_fn(target, &Culture::Invariant);
        func(&ConversionContext::empty(), value).unwrap()
    }

    #[test]
    fn mechanism_ranks() {
        assert_eq!(Mechanism::TargetImplicitExact.rank(), 1);
        assert_eq!(Mechanism::TargetConverter.rank(), 8);
        assert!(Mechanism::SourceExplicitAssignable.is_operator());
        assert!(!Mechanism::SourceConverter.is_operator());
    }

    #[test]
    fn text_to_number_uses_destination_converter() {
        let registry = TypeRegistry::with_primitives();
        let found = discover(&registry, &string(), &int()).unwrap();
        assert_eq!(found.mechanism(), Mechanism::TargetConverter);
        assert_eq!(run(found, &int(), Value::from("42")), Value::Int32(42));
    }

    #[test]
    fn number_to_text_uses_source_converter() {
        let registry = TypeRegistry::with_primitives();
        let found = discover(&registry, &int(), &string()).unwrap();
        assert_eq!(found.mechanism(), Mechanism::SourceConverter);
        assert_eq!(run(found, &string(), Value::Int32(7)), Value::from("7"));
    }

    #[test]
    fn unrelated_types_are_unresolved() {
        let mut registry = TypeRegistry::with_primitives();
        let point = registry
            .register_type(TypeEntry::class("Point", TypeKind::Value))
            .unwrap();
        assert!(discover(&registry, &DataType::named(point), &int()).is_none());
        assert!(discover(&registry, &int(), &DataType::named(point)).is_none());
    }

    #[test]
    fn destination_exact_beats_destination_assignable() {
        let mut registry = TypeRegistry::with_primitives();
        let wrapper = TypeHash::from_name("Wrapper");
        registry
            .register_type(
                TypeEntry::class("Wrapper", TypeKind::Value)
                    .with_operator(ConversionOperator::implicit(
                        primitives::OBJECT,
                        wrapper,
                        tagged(2),
                    ))
                    .with_operator(ConversionOperator::implicit(
                        primitives::INT32,
                        wrapper,
                        tagged(1),
                    )),
            )
            .unwrap();

        let target = DataType::named(wrapper);
        let found = discover(&registry, &int(), &target).unwrap();
        assert_eq!(found.mechanism(), Mechanism::TargetImplicitExact);
        assert_eq!(run(found, &target, Value::Int32(0)), Value::Int32(1));

        let found = discover(&registry, &DataType::named(primitives::BOOL), &target).unwrap();
        assert_eq!(found.mechanism(), Mechanism::TargetImplicitAssignable);
    }

    #[test]
    fn implicit_beats_explicit_on_source_side() {
        let mut registry = TypeRegistry::with_primitives();
        let meters = TypeHash::from_name("Meters");
        registry
            .register_type(
                TypeEntry::class("Meters", TypeKind::Value)
                    .with_operator(ConversionOperator::explicit(
                        meters,
                        primitives::INT32,
                        tagged(5),
                    ))
                    .with_operator(ConversionOperator::implicit(
                        meters,
                        primitives::INT32,
                        tagged(3),
                    )),
            )
            .unwrap();

        let found = discover(&registry, &DataType::named(meters), &int()).unwrap();
        assert_eq!(found.mechanism(), Mechanism::SourceImplicitExact);
        assert_eq!(run(found, &int(), Value::Int32(0)), Value::Int32(3));
    }

    #[test]
    fn assignable_return_type() {
        let mut registry = TypeRegistry::with_primitives();
        let shape = registry
            .register_type(TypeEntry::class("Shape", TypeKind::Reference))
            .unwrap();
        let circle = registry
            .register_type(TypeEntry::class("Circle", TypeKind::Reference).with_base(shape))
            .unwrap();
        let spec = TypeHash::from_name("CircleSpec");
        registry
            .register_type(
                TypeEntry::class("CircleSpec", TypeKind::Value)
                    .with_operator(ConversionOperator::explicit(spec, circle, tagged(9))),
            )
            .unwrap();

        let source = DataType::named(spec);
        let found = discover(&registry, &source, &DataType::named(shape)).unwrap();
        assert_eq!(found.mechanism(), Mechanism::SourceExplicitAssignable);

        let found = discover(&registry, &source, &DataType::named(circle)).unwrap();
        assert_eq!(found.mechanism(), Mechanism::SourceExplicitExact);
    }

    #[test]
    fn operators_beat_descriptor_converters() {
        let mut registry = TypeRegistry::with_primitives();
        let celsius = TypeHash::from_name("Celsius");
        registry
            .register_type(TypeEntry::class("Celsius", TypeKind::Value))
            .unwrap();
        // An operator into `int` registered on the source wins over the
        // `int` descriptor converter.
        registry
            .register_operator(
                celsius,
                ConversionOperator::implicit(celsius, primitives::INT32, tagged(21)),
            )
            .unwrap();
        let found = discover(&registry, &DataType::named(celsius), &int()).unwrap();
        assert!(found.mechanism().is_operator());
    }
}
