//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have **no identity**: two instances with the same attribute values
/// are interchangeable. Examples in this workspace are [`crate::Amount`], social
/// media handles and the comparison selection.
///
/// To "modify" a value object, build a new one. The trait only requires what the
/// read paths rely on:
/// - **Clone**: values are copied into projections and API responses
/// - **PartialEq**: compared by attribute values
/// - **Debug**: shows up in logs and test failures
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
