//! Value conversion.

use morph_core::{
    ArrayValue, ConversionContext, ConvertError, CustomConverter, DataType, FromValue,
    InvalidValue, Typed, Value,
};

use crate::engine::Engine;

/// Strip by-reference and optional wrappers from a destination type.
///
/// Returns the innermost type and whether an optional wrapper was seen.
pub(crate) fn unwrap_target(target: &DataType) -> (&DataType, bool) {
    let mut current = target;
    let mut optional = false;
    loop {
        match current {
            DataType::ByRef(inner) => current = inner,
            DataType::Optional(inner) => {
                optional = true;
                current = inner;
            }
            _ => return (current, optional),
        }
    }
}

impl Engine {
    /// Convert `value` to `target`.
    ///
    /// In order:
    /// 1. Null, or a value `target` already accepts, is returned unchanged.
    /// 2. A supplied `custom` converter able to take the value's type wins.
    /// 3. Arrays of equal rank are converted element by element. A null
    ///    element is kept only if the element type permits absence.
    /// 4. By-reference and optional wrappers are stripped from `target`.
    /// 5. Empty text into an optional becomes null.
    /// 6. Otherwise the resolved mechanism for the pair is applied.
    ///
    /// `field` only names the field in a [`ConvertError::NoConversion`].
    ///
    /// # Errors
    ///
    /// `NoConversion` when no mechanism exists for the pair, `InvalidValue`
    /// when the mechanism rejected this particular value.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn convert(
        &self,
        value: Value,
        target: &DataType,
        custom: Option<&dyn CustomConverter>,
        ctx: &ConversionContext<'_>,
        field: Option<&str>,
    ) -> Result<Value, ConvertError> {
        let Some(source) = value.data_type() else {
            return Ok(value);
        };
        if self.registry.is_assignable(&source, target) {
            return Ok(value);
        }

        if let Some(custom) = custom.filter(|c| c.can_convert_from(&source)) {
            return Ok(custom.convert_from(ctx, value)?);
        }

        if let (DataType::Array { element, rank }, Value::Array(array)) = (target, &value) {
            if array.rank() == *rank {
                return self.convert_elements(value, element, ctx, field);
            }
        }

        let (inner, optional) = unwrap_target(target);
        if optional && value.is_null_or_empty_text() {
            return Ok(Value::Null);
        }
        if inner != target && self.registry.is_assignable(&source, inner) {
            return Ok(value);
        }

        match self.resolve(&source, inner) {
            Some(func) => Ok(func(ctx, value)?),
            None => Err(ConvertError::NoConversion {
                field: field.map(str::to_string),
                source_type: self.registry.type_name(&source),
                target_type: self.registry.type_name(target),
            }),
        }
    }

    fn convert_elements(
        &self,
        value: Value,
        element: &DataType,
        ctx: &ConversionContext<'_>,
        field: Option<&str>,
    ) -> Result<Value, ConvertError> {
        let array = match value {
            Value::Array(array) => array,
            other => return Ok(other),
        };
        let lengths = array.lengths().to_vec();
        let items = array
            .into_items()
            .into_iter()
            .map(|item| {
                if item.is_null() && !self.registry.permits_absence(element) {
                    let expected = self.registry.type_name(element);
                    return Err(ConvertError::from(InvalidValue::mismatch(expected, "null")));
                }
                self.convert(item, element, None, ctx, field)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Value::Array(ArrayValue::new(element.clone(), lengths, items)?))
    }

    /// Convert `value` to `target` and extract it as `T`.
    pub fn convert_into<T: FromValue>(
        &self,
        value: Value,
        target: &DataType,
    ) -> Result<T, ConvertError> {
        let converted = self.convert(value, target, None, &ConversionContext::empty(), None)?;
        Ok(T::from_value(&converted)?)
    }

    /// Convert `value` to the type `T` declares and extract it.
    ///
    /// ```
    /// use morph::{Engine, Value};
    ///
    /// let engine = Engine::default();
    /// let port: u16 = engine.convert_to(Value::from("8080")).unwrap();
    /// assert_eq!(port, 8080);
    /// ```
    pub fn convert_to<T: FromValue + Typed>(&self, value: Value) -> Result<T, ConvertError> {
        self.convert_into(value, &T::data_type())
    }
}
