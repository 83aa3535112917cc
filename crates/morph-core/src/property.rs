//! Property bag interfaces.
//!
//! The engine populates objects it knows nothing about through two traits:
//! [`PropertyBag`] finds a settable property by name and
//! [`PropertyDescriptor`] describes and assigns it.
//!
//! [`PropertyTable`] is a closure-backed implementation for plain Rust
//! structs:
//!
//! ```
//! use morph_core::{PropertyBag, PropertyTable};
//!
//! #[derive(Default)]
//! struct Server {
//!     port: u16,
//!     name: String,
//! }
//!
//! let table = PropertyTable::<Server>::new()
//!     .typed("Port", |s, port: u16| s.port = port)
//!     .typed("Name", |s, name: String| s.name = name);
//!
//! assert!(table.find("port", true).is_some());
//! assert!(table.find("port", false).is_none());
//! ```

use std::any::{Any, type_name};
use std::marker::PhantomData;

use crate::{ConverterRef, CustomConverter, DataType, FromValue, InvalidValue, Typed, Value};

/// A named, typed, possibly settable attribute of a target object.
pub trait PropertyDescriptor: Send + Sync {
    /// Property name.
    fn name(&self) -> &str;

    /// Declared type of the property.
    fn declared_type(&self) -> &DataType;

    /// Whether assignment is forbidden.
    fn is_read_only(&self) -> bool;

    /// Converter attached to this property, if any.
    fn converter(&self) -> Option<&dyn CustomConverter>;

    /// Assign `value` to this property on `target`.
    fn set_value(&self, target: &mut dyn Any, value: Value) -> Result<(), InvalidValue>;
}

/// Lookup of properties by name.
pub trait PropertyBag {
    /// Find a property called `name`.
    fn find(&self, name: &str, ignore_case: bool) -> Option<&dyn PropertyDescriptor>;
}

type Setter<T> = Box<dyn Fn(&mut T, Value) -> Result<(), InvalidValue> + Send + Sync>;

/// One entry of a [`PropertyTable`].
pub struct FieldProperty<T> {
    name: String,
    declared_type: DataType,
    converter: Option<ConverterRef>,
    setter: Option<Setter<T>>,
}

impl<T: Any> PropertyDescriptor for FieldProperty<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn declared_type(&self) -> &DataType {
        &self.declared_type
    }

    fn is_read_only(&self) -> bool {
        self.setter.is_none()
    }

    fn converter(&self) -> Option<&dyn CustomConverter> {
        self.converter.as_deref()
    }

    fn set_value(&self, target: &mut dyn Any, value: Value) -> Result<(), InvalidValue> {
        let setter = self
            .setter
            .as_ref()
            .ok_or_else(|| InvalidValue::argument(format!("property '{}' is read-only", self.name)))?;
        let target = target
            .downcast_mut::<T>()
            .ok_or_else(|| InvalidValue::mismatch(type_name::<T>(), "foreign target"))?;
        setter(target, value)
    }
}

/// Closure-backed property bag for `T`.
pub struct PropertyTable<T> {
    properties: Vec<FieldProperty<T>>,
    _marker: PhantomData<fn(&mut T)>,
}

impl<T> Default for PropertyTable<T> {
    fn default() -> Self {
        Self {
            properties: Vec::new(),
            _marker: PhantomData,
        }
    }
}

impl<T: Any> PropertyTable<T> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a settable property with an untyped setter.
    pub fn field<F>(mut self, name: &str, declared_type: DataType, setter: F) -> Self
    where
        F: Fn(&mut T, Value) -> Result<(), InvalidValue> + Send + Sync + 'static,
    {
        self.properties.push(FieldProperty {
            name: name.to_string(),
            declared_type,
            converter: None,
            setter: Some(Box::new(setter)),
        });
        self
    }

    /// Add a settable property whose declared type comes from `V`.
    ///
    /// The setter receives the extracted Rust value.
    pub fn typed<V, F>(self, name: &str, setter: F) -> Self
    where
        V: FromValue + Typed,
        F: Fn(&mut T, V) + Send + Sync + 'static,
    {
        self.field(name, V::data_type(), move |target, value| {
            setter(target, V::from_value(&value)?);
            Ok(())
        })
    }

    /// Add a read-only property.
    pub fn read_only(mut self, name: &str, declared_type: DataType) -> Self {
        self.properties.push(FieldProperty {
            name: name.to_string(),
            declared_type,
            converter: None,
            setter: None,
        });
        self
    }

    /// Attach a converter to the most recently added property.
    pub fn with_converter(mut self, converter: ConverterRef) -> Self {
        if let Some(last) = self.properties.last_mut() {
            last.converter = Some(converter);
        }
        self
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl<T: Any> PropertyBag for PropertyTable<T> {
    fn find(&self, name: &str, ignore_case: bool) -> Option<&dyn PropertyDescriptor> {
        let found = if ignore_case {
            let wanted = name.to_lowercase();
            self.properties.iter().find(|p| {
                p.name
                    .chars()
                    .flat_map(char::to_lowercase)
                    .eq(wanted.chars())
            })
        } else {
            self.properties.iter().find(|p| p.name == name)
        };
        found.map(|p| p as &dyn PropertyDescriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FnConverter, primitives};
    use std::sync::Arc;

    #[derive(Default)]
    struct Person {
        age: i32,
        nickname: Option<String>,
    }

    fn table() -> PropertyTable<Person> {
        PropertyTable::new()
            .typed("Age", |p: &mut Person, age: i32| p.age = age)
            .typed("Nickname", |p: &mut Person, n: Option<String>| p.nickname = n)
            .read_only("Id", DataType::named(primitives::INT64))
    }

    #[test]
    fn lookup_respects_case_flag() {
        let table = table();
        assert_eq!(table.len(), 3);
        assert!(table.find("AGE", true).is_some());
        assert!(table.find("AGE", false).is_none());
        assert!(table.find("Age", false).is_some());
        assert!(table.find("Missing", true).is_none());
    }

    #[test]
    fn ignore_case_lookup_folds_non_ascii_names() {
        let table = PropertyTable::<Person>::new()
            .typed("Größe", |p: &mut Person, v: i32| p.age = v)
            .typed("Ages", |p: &mut Person, v: i32| p.age = v);
        assert_eq!(table.find("GRÖßE", true).map(|p| p.name()), Some("Größe"));
        assert!(table.find("GRÖßE", false).is_none());
        assert_eq!(table.find("ÄGES", true).map(|p| p.name()), None);
        assert_eq!(table.find("aGeS", true).map(|p| p.name()), Some("Ages"));
        assert!(table.find("Age", true).is_none());
    }

    #[test]
    fn typed_properties_declare_their_type() {
        let table = table();
        let nickname = table.find("nickname", true).unwrap();
        assert_eq!(
            nickname.declared_type(),
            &DataType::optional(DataType::named(primitives::STRING))
        );
        assert!(!nickname.is_read_only());
        assert!(table.find("Id", false).unwrap().is_read_only());
    }

    #[test]
    fn set_value_assigns_through_setter() {
        let table = table();
        let mut person = Person::default();
        table
            .find("Age", false)
            .unwrap()
            .set_value(&mut person, Value::Int32(30))
            .unwrap();
        assert_eq!(person.age, 30);
    }

    #[test]
    fn set_value_rejects_wrong_value_type() {
        let table = table();
        let mut person = Person::default();
        let err = table
            .find("Age", false)
            .unwrap()
            .set_value(&mut person, Value::Int64(30))
            .unwrap_err();
        assert!(matches!(err, InvalidValue::TypeMismatch { .. }));
    }

    #[test]
    fn set_value_rejects_foreign_target() {
        let table = table();
        let mut other = 5u8;
        assert!(
            table
                .find("Age", false)
                .unwrap()
                .set_value(&mut other, Value::Int32(1))
                .is_err()
        );
    }

    #[test]
    fn read_only_cannot_be_set() {
        let table = table();
        let mut person = Person::default();
        assert!(
            table
                .find("Id", false)
                .unwrap()
                .set_value(&mut person, Value::Int64(1))
                .is_err()
        );
    }

    #[test]
    fn converter_attaches_to_last_property() {
        let table = table().with_converter(Arc::new(FnConverter::new(|_| true, |_, v| Ok(v))));
        assert!(table.find("Id", false).unwrap().converter().is_some());
        assert!(table.find("Age", false).unwrap().converter().is_none());
    }
}
