//! Object population.
//!
//! Assigns loosely typed name/value pairs to the properties of a target
//! object. Every field is attempted; failures are collected in field order
//! and returned together once all fields have been processed.

use std::any::Any;

use tracing::{debug, trace};

use morph_core::{
    ConversionContext, DataType, FieldError, FieldErrorKind, PopulateErrors, PropertyBag,
    PropertyDescriptor, Value,
};

use crate::engine::Engine;

impl Engine {
    /// Populate `target` from `fields` using the properties in `bag`.
    ///
    /// Fields with no matching property, or whose property is read-only, are
    /// skipped. A value converted into an optional property must have exactly
    /// the optional's inner type.
    ///
    /// ```
    /// use morph::{Engine, PropertyTable, Value};
    ///
    /// #[derive(Default)]
    /// struct Person {
    ///     age: i32,
    /// }
    ///
    /// let engine = Engine::default();
    /// let bag = PropertyTable::<Person>::new().typed("Age", |p, age: i32| p.age = age);
    ///
    /// let mut person = Person::default();
    /// engine.populate(&mut person, &bag, [("age", Value::from("17"))]).unwrap();
    /// assert_eq!(person.age, 17);
    /// ```
    pub fn populate<T, I, N>(
        &self,
        target: &mut T,
        bag: &dyn PropertyBag,
        fields: I,
    ) -> Result<(), PopulateErrors>
    where
        T: Any,
        I: IntoIterator<Item = (N, Value)>,
        N: AsRef<str>,
    {
        self.populate_dyn(target, bag, fields)
    }

    /// Type-erased form of [`Engine::populate`].
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn populate_dyn<I, N>(
        &self,
        target: &mut dyn Any,
        bag: &dyn PropertyBag,
        fields: I,
    ) -> Result<(), PopulateErrors>
    where
        I: IntoIterator<Item = (N, Value)>,
        N: AsRef<str>,
    {
        let mut errors = PopulateErrors::new();

        for (name, value) in fields {
            let name = name.as_ref();
            let Some(property) = bag.find(name, self.config.ignore_case) else {
                trace!(field = name, "no matching property");
                continue;
            };
            if property.is_read_only() {
                trace!(field = name, "property is read-only");
                continue;
            }

            if let Err(kind) = self.populate_field(target, property, name, value) {
                debug!(field = name, error = %kind, "field not populated");
                errors.push(FieldError::new(name, kind));
            }
        }

        errors.into_result()
    }

    fn populate_field(
        &self,
        target: &mut dyn Any,
        property: &dyn PropertyDescriptor,
        name: &str,
        value: Value,
    ) -> Result<(), FieldErrorKind> {
        let declared = property.declared_type();
        let converted = {
            let ctx = ConversionContext::new(&*target, property);
            self.convert(value, declared, property.converter(), &ctx, Some(name))?
        };

        if let DataType::Optional(inner) = declared {
            if let Some(actual) = converted.data_type() {
                if actual != **inner {
                    return Err(FieldErrorKind::OptionalMismatch {
                        expected: self.registry.type_name(inner),
                        actual: self.registry.type_name(&actual),
                    });
                }
            }
        }

        property
            .set_value(target, converted)
            .map_err(FieldErrorKind::Assign)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use morph_core::{
        ConvertError, FnConverter, InvalidValue, PropertyTable, TypeHash, primitives,
    };
    use morph_registry::TypeRegistry;
    use std::sync::Arc;

    use crate::EngineConfig;

    #[derive(Debug, Default)]
    struct Form {
        age: i32,
        age2: i32,
        score: Option<i64>,
        id: i64,
    }

    fn bag() -> PropertyTable<Form> {
        PropertyTable::new()
            .typed("Age", |f: &mut Form, v: i32| f.age = v)
            .typed("Age2", |f: &mut Form, v: i32| f.age2 = v)
            .typed("Score", |f: &mut Form, v: Option<i64>| f.score = v)
            .read_only("Id", DataType::named(primitives::INT64))
    }

    #[test]
    fn collects_errors_and_keeps_going() {
        let engine = Engine::default();
        let mut form = Form::default();
        let errors = engine
            .populate(
                &mut form,
                &bag(),
                [("Age", Value::from("17")), ("Age2", Value::from("not-a-number"))],
            )
            .unwrap_err();

        assert_eq!(form.age, 17);
        assert_eq!(form.age2, 0);
        assert_eq!(errors.len(), 1);
        let error = errors.iter().next().unwrap();
        assert_eq!(error.field, "Age2");
        assert_eq!(
            error.kind,
            FieldErrorKind::Convert(ConvertError::InvalidValue(InvalidValue::format(
                "not-a-number",
                "int"
            )))
        );
    }

    #[test]
    fn unknown_and_read_only_fields_are_skipped() {
        let engine = Engine::default();
        let mut form = Form::default();
        engine
            .populate(
                &mut form,
                &bag(),
                [("Missing", Value::from("1")), ("Id", Value::from("9"))],
            )
            .unwrap();
        assert_eq!(form.id, 0);
    }

    #[test]
    fn case_sensitivity_follows_config() {
        let strict = Engine::with_config(
            TypeRegistry::with_primitives(),
            EngineConfig::default().with_ignore_case(false),
        );
        let mut form = Form::default();
        strict
            .populate(&mut form, &bag(), [("age", Value::from("5"))])
            .unwrap();
        assert_eq!(form.age, 0);

        Engine::default()
            .populate(&mut form, &bag(), [("age", Value::from("5"))])
            .unwrap();
        assert_eq!(form.age, 5);
    }

    #[test]
    fn optional_fields() {
        let engine = Engine::default();
        let mut form = Form {
            score: Some(1),
            ..Form::default()
        };
        engine
            .populate(&mut form, &bag(), [("Score", Value::from(""))])
            .unwrap();
        assert_eq!(form.score, None);

        engine
            .populate(&mut form, &bag(), [("Score", Value::from("12"))])
            .unwrap();
        assert_eq!(form.score, Some(12));
    }

    #[test]
    fn optional_requires_exact_inner_type() {
        let engine = Engine::default();
        // Hands back an `int` where the slot holds `int64?`.
        let sloppy = FnConverter::new(
            |source| source.is(primitives::STRING),
            |_, _| Ok(Value::Int32(3)),
        );
        let bag = PropertyTable::<Form>::new()
            .typed("Score", |f: &mut Form, v: Option<i64>| f.score = v)
            .with_converter(Arc::new(sloppy));

        let mut form = Form::default();
        let errors = engine
            .populate(&mut form, &bag, [("Score", Value::from("3"))])
            .unwrap_err();
        assert_eq!(form.score, None);
        assert_eq!(
            errors.into_vec()[0].kind,
            FieldErrorKind::OptionalMismatch {
                expected: "int64".to_string(),
                actual: "int".to_string(),
            }
        );
    }

    #[test]
    fn missing_conversion_is_collected() {
        let engine = Engine::default();
        let bag = PropertyTable::<Form>::new().field(
            "Age",
            DataType::named(TypeHash::from_name("Opaque")),
            |_, _| Ok(()),
        );
        let mut form = Form::default();
        let errors = engine
            .populate(&mut form, &bag, [("Age", Value::Bool(true))])
            .unwrap_err();
        assert_eq!(
            errors.to_string(),
            "field 'Age': no conversion available for field 'Age'"
        );
    }

    #[test]
    fn assignment_failure_is_collected() {
        let engine = Engine::default();
        let bag = PropertyTable::<Form>::new().field(
            "Age",
            DataType::named(primitives::INT32),
            |_, _| Err(InvalidValue::argument("age is frozen")),
        );
        let mut form = Form::default();
        let errors = engine
            .populate(&mut form, &bag, [("Age", Value::Int32(4))])
            .unwrap_err();
        assert!(matches!(
            errors.into_vec()[0].kind,
            FieldErrorKind::Assign(InvalidValue::Argument { .. })
        ));
    }

    #[test]
    fn errors_keep_field_order() {
        let engine = Engine::default();
        let mut form = Form::default();
        let errors = engine
            .populate(
                &mut form,
                &bag(),
                vec![
                    ("Age2".to_string(), Value::from("x")),
                    ("Age".to_string(), Value::from("y")),
                ],
            )
            .unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), ["Age2", "Age"]);
    }
}
