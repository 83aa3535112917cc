//! Per-call conversion context.

use std::any::Any;
use std::fmt;

use crate::PropertyDescriptor;

/// What is being converted, and for whom.
///
/// Created per conversion call and dropped when the call returns. Converters
/// may use it for diagnostics or context-sensitive behaviour; the engine
/// itself never inspects it.
#[derive(Clone, Copy, Default)]
pub struct ConversionContext<'a> {
    instance: Option<&'a dyn Any>,
    property: Option<&'a dyn PropertyDescriptor>,
}

impl<'a> ConversionContext<'a> {
    /// A context with no owner and no property.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A context for `property` on `instance`.
    pub fn new(instance: &'a dyn Any, property: &'a dyn PropertyDescriptor) -> Self {
        Self {
            instance: Some(instance),
            property: Some(property),
        }
    }

    /// The object owning the value, if any.
    pub fn instance(&self) -> Option<&'a dyn Any> {
        self.instance
    }

    /// The property being populated, if any.
    pub fn property(&self) -> Option<&'a dyn PropertyDescriptor> {
        self.property
    }

    /// Name of the property being populated, if any.
    pub fn property_name(&self) -> Option<&'a str> {
        self.property.map(|p| p.name())
    }
}

impl fmt::Debug for ConversionContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionContext")
            .field("has_instance", &self.instance.is_some())
            .field("property", &self.property_name())
            .finish()
    }
}
