//! Built-in descriptor converters.
//!
//! These are the converters [`TypeRegistry::with_primitives`] attaches to the
//! built-in types, plus the converter generated for every registered enum.
//! Text parsing lives on the destination side (`convert_from` a string),
//! numeric casts and formatting on the source side (`convert_to`).
//!
//! [`TypeRegistry::with_primitives`]: crate::TypeRegistry::with_primitives

use std::num::IntErrorKind;
use std::str::FromStr;

use morph_core::{
    ConversionContext, Culture, CustomConverter, DataType, InvalidValue, TypeHash, Value,
    primitives,
};

/// Name of a built-in type, for error messages.
pub(crate) fn primitive_name(hash: TypeHash) -> Option<&'static str> {
    let name = match hash {
        h if h == primitives::OBJECT => "object",
        h if h == primitives::BOOL => "bool",
        h if h == primitives::INT8 => "int8",
        h if h == primitives::INT16 => "int16",
        h if h == primitives::INT32 => "int",
        h if h == primitives::INT64 => "int64",
        h if h == primitives::UINT8 => "uint8",
        h if h == primitives::UINT16 => "uint16",
        h if h == primitives::UINT32 => "uint",
        h if h == primitives::UINT64 => "uint64",
        h if h == primitives::FLOAT => "float",
        h if h == primitives::DOUBLE => "double",
        h if h == primitives::CHAR => "char",
        h if h == primitives::STRING => "string",
        _ => return None,
    };
    Some(name)
}

fn name_of(hash: TypeHash) -> &'static str {
    primitive_name(hash).unwrap_or("value")
}

// ============================================================================
// Numeric casts
// ============================================================================

enum Number {
    Int(i128),
    Float(f64),
}

fn as_number(value: &Value) -> Option<Number> {
    let n = match value {
        Value::Int8(v) => Number::Int(*v as i128),
        Value::Int16(v) => Number::Int(*v as i128),
        Value::Int32(v) => Number::Int(*v as i128),
        Value::Int64(v) => Number::Int(*v as i128),
        Value::UInt8(v) => Number::Int(*v as i128),
        Value::UInt16(v) => Number::Int(*v as i128),
        Value::UInt32(v) => Number::Int(*v as i128),
        Value::UInt64(v) => Number::Int(*v as i128),
        Value::Enum { value, .. } => Number::Int(*value as i128),
        Value::Float(v) => Number::Float(*v as f64),
        Value::Double(v) => Number::Float(*v),
        _ => return None,
    };
    Some(n)
}

macro_rules! checked_int {
    ($v:expr, $ty:ty, $variant:ident, $target:expr) => {
        <$ty>::try_from($v)
            .map(Value::$variant)
            .map_err(|_| InvalidValue::overflow($v, name_of($target)))
    };
}

fn int_to(v: i128, target: TypeHash) -> Result<Value, InvalidValue> {
    match target {
        t if t == primitives::INT8 => checked_int!(v, i8, Int8, t),
        t if t == primitives::INT16 => checked_int!(v, i16, Int16, t),
        t if t == primitives::INT32 => checked_int!(v, i32, Int32, t),
        t if t == primitives::INT64 => checked_int!(v, i64, Int64, t),
        t if t == primitives::UINT8 => checked_int!(v, u8, UInt8, t),
        t if t == primitives::UINT16 => checked_int!(v, u16, UInt16, t),
        t if t == primitives::UINT32 => checked_int!(v, u32, UInt32, t),
        t if t == primitives::UINT64 => checked_int!(v, u64, UInt64, t),
        t if t == primitives::FLOAT => Ok(Value::Float(v as f32)),
        t if t == primitives::DOUBLE => Ok(Value::Double(v as f64)),
        t => Err(InvalidValue::mismatch("numeric type", name_of(t))),
    }
}

/// Cast a numeric value to another numeric primitive.
///
/// Integers are range-checked. Floats going to an integer type round half to
/// even first; NaN and out-of-range results are overflow errors.
pub fn cast_numeric(value: &Value, target: TypeHash) -> Result<Value, InvalidValue> {
    match as_number(value) {
        Some(Number::Int(v)) => int_to(v, target),
        Some(Number::Float(f)) => {
            if target == primitives::FLOAT {
                return narrow_to_float(f);
            }
            if target == primitives::DOUBLE {
                return Ok(Value::Double(f));
            }
            let rounded = f.round_ties_even();
            if !rounded.is_finite() || rounded < i128::MIN as f64 || rounded > i128::MAX as f64 {
                return Err(InvalidValue::overflow(f, name_of(target)));
            }
            int_to(rounded as i128, target).map_err(|_| InvalidValue::overflow(f, name_of(target)))
        }
        None => Err(InvalidValue::mismatch("numeric value", value.kind_name())),
    }
}

/// `f64` to `f32`. A finite value outside the `f32` range is an overflow.
fn narrow_to_float(f: f64) -> Result<Value, InvalidValue> {
    let narrowed = f as f32;
    if f.is_finite() && !narrowed.is_finite() {
        return Err(InvalidValue::overflow(f, name_of(primitives::FLOAT)));
    }
    Ok(Value::Float(narrowed))
}

/// Render a scalar as invariant text.
pub fn format_scalar(value: &Value) -> Option<String> {
    let text = match value {
        Value::Bool(v) => v.to_string(),
        Value::Int8(v) => v.to_string(),
        Value::Int16(v) => v.to_string(),
        Value::Int32(v) => v.to_string(),
        Value::Int64(v) => v.to_string(),
        Value::UInt8(v) => v.to_string(),
        Value::UInt16(v) => v.to_string(),
        Value::UInt32(v) => v.to_string(),
        Value::UInt64(v) => v.to_string(),
        Value::Float(v) => v.to_string(),
        Value::Double(v) => v.to_string(),
        Value::Char(v) => v.to_string(),
        Value::String(v) => v.clone(),
        _ => return None,
    };
    Some(text)
}

fn parse_int(text: &str, target: TypeHash) -> Result<Value, InvalidValue> {
    let (digits, radix) = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) if hex.starts_with(['+', '-']) => {
            return Err(InvalidValue::format(text, name_of(target)));
        }
        Some(hex) => (hex, 16),
        None => (text, 10),
    };
    match i128::from_str_radix(digits, radix) {
        Ok(v) => int_to(v, target).map_err(|_| InvalidValue::overflow(text, name_of(target))),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                Err(InvalidValue::overflow(text, name_of(target)))
            }
            _ => Err(InvalidValue::format(text, name_of(target))),
        },
    }
}

/// Only finite text is accepted: `nan` and `inf` spellings are format
/// errors, digits too large for the type are overflow errors.
fn parse_float<F>(trimmed: &str, text: &str, target: TypeHash) -> Result<F, InvalidValue>
where
    F: FromStr + Copy + Into<f64>,
{
    let parsed: F = trimmed
        .parse()
        .map_err(|_| InvalidValue::format(text, name_of(target)))?;
    let wide: f64 = parsed.into();
    if wide.is_finite() {
        return Ok(parsed);
    }
    let spelled = trimmed
        .trim_start_matches(['+', '-'])
        .starts_with(|c: char| c.is_ascii_alphabetic());
    if spelled {
        Err(InvalidValue::format(text, name_of(target)))
    } else {
        Err(InvalidValue::overflow(text, name_of(target)))
    }
}

/// Parse invariant text as the numeric primitive `target`.
pub fn parse_numeric(text: &str, target: TypeHash) -> Result<Value, InvalidValue> {
    let trimmed = text.trim();
    if target == primitives::FLOAT {
        parse_float::<f32>(trimmed, text, target).map(Value::Float)
    } else if target == primitives::DOUBLE {
        parse_float::<f64>(trimmed, text, target).map(Value::Double)
    } else {
        parse_int(trimmed, target).map_err(|e| match e {
            InvalidValue::Format { .. } => InvalidValue::format(text, name_of(target)),
            other => other,
        })
    }
}

// ============================================================================
// Converters
// ============================================================================

/// Descriptor converter for a numeric primitive.
///
/// Converts from text, and to text or any other numeric primitive.
#[derive(Debug, Clone, Copy)]
pub struct NumericConverter {
    target: TypeHash,
}

impl NumericConverter {
    /// Converter for the numeric primitive `target`.
    pub fn new(target: TypeHash) -> Self {
        Self { target }
    }
}

impl CustomConverter for NumericConverter {
    fn can_convert_from(&self, source: &DataType) -> bool {
        source.is(primitives::STRING)
    }

    fn convert_from(&self, _ctx: &ConversionContext<'_>, value: Value) -> Result<Value, InvalidValue> {
        match value {
            Value::String(text) => parse_numeric(&text, self.target),
            other => Err(InvalidValue::mismatch("string", other.kind_name())),
        }
    }

    fn can_convert_to(&self, target: &DataType) -> bool {
        target
            .as_named()
            .is_some_and(|t| t == primitives::STRING || primitives::is_numeric(t))
    }

    fn convert_to(
        &self,
        _ctx: &ConversionContext<'_>,
        _culture: &Culture,
        value: Value,
        target: &DataType,
    ) -> Result<Value, InvalidValue> {
        match target.as_named() {
            Some(t) if t == primitives::STRING => format_scalar(&value)
                .map(Value::String)
                .ok_or_else(|| InvalidValue::mismatch("numeric value", value.kind_name())),
            Some(t) => cast_numeric(&value, t),
            None => Err(InvalidValue::argument("numeric values only convert to named types")),
        }
    }
}

/// Descriptor converter for `bool`.
///
/// Accepts `true`/`false` in any case, surrounding whitespace ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolConverter;

impl CustomConverter for BoolConverter {
    fn can_convert_from(&self, source: &DataType) -> bool {
        source.is(primitives::STRING)
    }

    fn convert_from(&self, _ctx: &ConversionContext<'_>, value: Value) -> Result<Value, InvalidValue> {
        let text = match value {
            Value::String(text) => text,
            other => return Err(InvalidValue::mismatch("string", other.kind_name())),
        };
        let trimmed = text.trim();
        if trimmed.eq_ignore_ascii_case("true") {
            Ok(Value::Bool(true))
        } else if trimmed.eq_ignore_ascii_case("false") {
            Ok(Value::Bool(false))
        } else {
            Err(InvalidValue::format(text, "bool"))
        }
    }

    fn can_convert_to(&self, target: &DataType) -> bool {
        target.is(primitives::STRING)
    }

    fn convert_to(
        &self,
        _ctx: &ConversionContext<'_>,
        _culture: &Culture,
        value: Value,
        _target: &DataType,
    ) -> Result<Value, InvalidValue> {
        match value {
            Value::Bool(b) => Ok(Value::String(b.to_string())),
            other => Err(InvalidValue::mismatch("bool", other.kind_name())),
        }
    }
}

/// Descriptor converter for `char`.
///
/// Text must hold exactly one character.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharConverter;

impl CustomConverter for CharConverter {
    fn can_convert_from(&self, source: &DataType) -> bool {
        source.is(primitives::STRING)
    }

    fn convert_from(&self, _ctx: &ConversionContext<'_>, value: Value) -> Result<Value, InvalidValue> {
        let text = match value {
            Value::String(text) => text,
            other => return Err(InvalidValue::mismatch("string", other.kind_name())),
        };
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(Value::Char(c)),
            _ => Err(InvalidValue::format(text, "char")),
        }
    }

    fn can_convert_to(&self, target: &DataType) -> bool {
        target.is(primitives::STRING)
    }

    fn convert_to(
        &self,
        _ctx: &ConversionContext<'_>,
        _culture: &Culture,
        value: Value,
        _target: &DataType,
    ) -> Result<Value, InvalidValue> {
        match value {
            Value::Char(c) => Ok(Value::String(c.to_string())),
            other => Err(InvalidValue::mismatch("char", other.kind_name())),
        }
    }
}

/// Descriptor converter generated for a registered enum.
///
/// From text it accepts a member name (any case) or a number naming a
/// defined member; from integers it accepts defined values. To text it
/// renders the member name, to numerics the underlying value.
#[derive(Debug, Clone)]
pub struct EnumConverter {
    type_hash: TypeHash,
    name: String,
    members: Vec<(String, i64)>,
}

impl EnumConverter {
    /// Converter for enum `name` with the given members.
    pub fn new(name: &str, members: Vec<(String, i64)>) -> Self {
        Self {
            type_hash: TypeHash::from_name(name),
            name: name.to_string(),
            members,
        }
    }

    fn member_value(&self, value: i64) -> Result<Value, InvalidValue> {
        if self.members.iter().any(|(_, v)| *v == value) {
            Ok(Value::Enum {
                type_hash: self.type_hash,
                value,
            })
        } else {
            Err(InvalidValue::argument(format!(
                "{} is not a defined value of {}",
                value, self.name
            )))
        }
    }
}

impl CustomConverter for EnumConverter {
    fn can_convert_from(&self, source: &DataType) -> bool {
        source
            .as_named()
            .is_some_and(|s| s == primitives::STRING || primitives::INTEGERS.contains(&s))
    }

    fn convert_from(&self, _ctx: &ConversionContext<'_>, value: Value) -> Result<Value, InvalidValue> {
        if let Value::String(text) = &value {
            let trimmed = text.trim();
            if let Some((_, v)) = self
                .members
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(trimmed))
            {
                return self.member_value(*v);
            }
            return match trimmed.parse::<i64>() {
                Ok(v) => self.member_value(v),
                Err(_) => Err(InvalidValue::format(text.clone(), self.name.clone())),
            };
        }
        match as_number(&value) {
            Some(Number::Int(v)) => {
                let v = i64::try_from(v).map_err(|_| InvalidValue::overflow(v, self.name.clone()))?;
                self.member_value(v)
            }
            _ => Err(InvalidValue::mismatch("string or integer", value.kind_name())),
        }
    }

    fn can_convert_to(&self, target: &DataType) -> bool {
        target
            .as_named()
            .is_some_and(|t| t == primitives::STRING || primitives::is_numeric(t))
    }

    fn convert_to(
        &self,
        _ctx: &ConversionContext<'_>,
        _culture: &Culture,
        value: Value,
        target: &DataType,
    ) -> Result<Value, InvalidValue> {
        let number = morph_core::enum_value(&value, self.type_hash)?;
        match target.as_named() {
            Some(t) if t == primitives::STRING => {
                let name = self
                    .members
                    .iter()
                    .find(|(_, v)| *v == number)
                    .map(|(name, _)| name.clone())
                    .unwrap_or_else(|| number.to_string());
                Ok(Value::String(name))
            }
            Some(t) => cast_numeric(&value, t),
            None => Err(InvalidValue::argument("enum values only convert to named types")),
        }
    }
}
