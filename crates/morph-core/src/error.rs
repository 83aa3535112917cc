//! Error types for value conversion.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ConvertError
//! ├── NoConversion   - no mechanism exists for the type pair
//! └── InvalidValue   - a mechanism exists but rejected this particular value
//!
//! PopulateErrors     - ordered FieldErrors collected while populating an object
//! RegistrationError  - type registry construction errors
//! ```
//!
//! `NoConversion` is a statement about types and is reported the same way for
//! every value of the source type. `InvalidValue` is a statement about one
//! value and comes straight from the mechanism that rejected it.

use thiserror::Error;

// ============================================================================
// Value Errors
// ============================================================================

/// A conversion mechanism rejected a specific value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidValue {
    /// Text could not be parsed as the target type.
    #[error("'{input}' is not a valid {target_type}")]
    Format {
        /// The rejected text.
        input: String,
        /// Name of the type being produced.
        target_type: String,
    },

    /// A numeric value does not fit the target type.
    #[error("value {value} is out of range for {target_type}")]
    Overflow {
        /// The rejected value, rendered as text.
        value: String,
        /// Name of the type being produced.
        target_type: String,
    },

    /// The value has the right type but an unacceptable shape or content.
    #[error("invalid argument: {message}")]
    Argument {
        /// Description of the problem.
        message: String,
    },

    /// The value's runtime type was not the one required.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Expected type name.
        expected: String,
        /// Actual type name.
        actual: String,
    },
}

impl InvalidValue {
    /// Shorthand for a [`InvalidValue::Format`] error.
    pub fn format(input: impl Into<String>, target_type: impl Into<String>) -> Self {
        InvalidValue::Format {
            input: input.into(),
            target_type: target_type.into(),
        }
    }

    /// Shorthand for an [`InvalidValue::Overflow`] error.
    pub fn overflow(value: impl ToString, target_type: impl Into<String>) -> Self {
        InvalidValue::Overflow {
            value: value.to_string(),
            target_type: target_type.into(),
        }
    }

    /// Shorthand for an [`InvalidValue::Argument`] error.
    pub fn argument(message: impl Into<String>) -> Self {
        InvalidValue::Argument {
            message: message.into(),
        }
    }

    /// Shorthand for an [`InvalidValue::TypeMismatch`] error.
    pub fn mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        InvalidValue::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

/// Failure of a single conversion.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConvertError {
    /// No conversion mechanism exists between the two types.
    #[error("{}", no_conversion_message(.field.as_deref(), .source_type, .target_type))]
    NoConversion {
        /// Field being converted, when known.
        field: Option<String>,
        /// Runtime type of the value.
        source_type: String,
        /// Requested type.
        target_type: String,
    },

    /// A conversion mechanism rejected the value.
    #[error(transparent)]
    InvalidValue(#[from] InvalidValue),
}

fn no_conversion_message(field: Option<&str>, source_type: &str, target_type: &str) -> String {
    match field {
        Some(field) => format!("no conversion available for field '{field}'"),
        None => format!("no conversion available from '{source_type}' to '{target_type}'"),
    }
}

impl ConvertError {
    /// Check if this is a missing-conversion error.
    pub fn is_no_conversion(&self) -> bool {
        matches!(self, ConvertError::NoConversion { .. })
    }

    /// Check if this is a value-level error.
    pub fn is_invalid_value(&self) -> bool {
        matches!(self, ConvertError::InvalidValue(_))
    }
}

// ============================================================================
// Population Errors
// ============================================================================

/// Why a single field could not be populated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldErrorKind {
    /// Conversion of the supplied value failed.
    #[error(transparent)]
    Convert(#[from] ConvertError),

    /// The converted value does not exactly match the optional slot's inner type.
    #[error("converted value of type {actual} does not match optional {expected}")]
    OptionalMismatch {
        /// Inner type of the optional slot.
        expected: String,
        /// Runtime type the conversion produced.
        actual: String,
    },

    /// The property rejected the value on assignment.
    #[error("assignment failed: {0}")]
    Assign(InvalidValue),
}

/// A population failure tied to the field that caused it.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("field '{field}': {kind}")]
pub struct FieldError {
    /// Field name as supplied by the caller.
    pub field: String,
    /// What went wrong.
    pub kind: FieldErrorKind,
}

impl FieldError {
    /// Create a new field error.
    pub fn new(field: impl Into<String>, kind: impl Into<FieldErrorKind>) -> Self {
        Self {
            field: field.into(),
            kind: kind.into(),
        }
    }
}

/// Ordered collection of field errors from one population pass.
///
/// Errors appear in the order the fields were supplied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PopulateErrors {
    errors: Vec<FieldError>,
}

impl PopulateErrors {
    /// Create a new empty error collection.
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Add an error to the collection.
    pub fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    /// Check if there are any errors.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get the number of errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Iterate over the errors.
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// Names of the failing fields, in order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(|e| e.field.as_str())
    }

    /// Convert to a Vec of errors.
    pub fn into_vec(self) -> Vec<FieldError> {
        self.errors
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), PopulateErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl IntoIterator for PopulateErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a PopulateErrors {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl From<FieldError> for PopulateErrors {
    fn from(error: FieldError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl std::fmt::Display for PopulateErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for PopulateErrors {}

// ============================================================================
// Registration Errors
// ============================================================================

/// Errors that occur while building a type registry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistrationError {
    /// A referenced type was not found.
    #[error("type not found: {0}")]
    TypeNotFound(String),

    /// A type with this name already exists.
    #[error("duplicate type: {0}")]
    DuplicateType(String),

    /// A duplicate enum value was registered.
    #[error("duplicate enum value: '{value_name}' in enum '{enum_name}'")]
    DuplicateEnumValue {
        /// The enum name.
        enum_name: String,
        /// The duplicate value name.
        value_name: String,
    },

    /// An operator's declaration does not involve its owner type.
    #[error("invalid operator on '{owner}': {reason}")]
    InvalidOperator {
        /// The owner type name.
        owner: String,
        /// Why it was rejected.
        reason: String,
    },
}
