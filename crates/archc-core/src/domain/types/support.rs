//! Type support policy.
//!
//! Pure predicates deciding which type references the compiler can reason
//! about. The policy holds no state and performs no I/O, so a single value
//! can be shared freely (it is `Copy`).

use crate::domain::types::{TypeKind, TypeReference};

/// Classifies raw type references into supported / unsupported /
/// identifier-suitable / property-suitable categories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeSupportPolicy;

impl TypeSupportPolicy {
    pub const fn new() -> Self {
        Self
    }

    /// Only class and parameterized references are supported.
    pub fn is_supported(&self, reference: &TypeReference) -> bool {
        matches!(reference.kind(), TypeKind::Class | TypeKind::Parameterized)
    }

    /// Identifiers must be simple, non-generic class types.
    pub fn is_suitable_as_identifier(&self, reference: &TypeReference) -> bool {
        self.is_supported(reference) && reference.kind() == TypeKind::Class
    }

    pub fn is_suitable_as_property(&self, reference: &TypeReference) -> bool {
        self.is_supported(reference)
    }

    /// Parameterized types and nested class types need dedicated handling
    /// by generators (type arguments, binary names).
    pub fn requires_special_handling(&self, reference: &TypeReference) -> bool {
        match reference.kind() {
            TypeKind::Parameterized => true,
            TypeKind::Class => reference.is_nested(),
            _ => false,
        }
    }

    /// Short explanation used by diagnostics when a reference is rejected.
    pub fn rejection_reason(&self, reference: &TypeReference) -> Option<&'static str> {
        match reference.kind() {
            TypeKind::Class | TypeKind::Parameterized => None,
            TypeKind::Primitive => Some("primitive types carry no domain identity"),
            TypeKind::Array => Some("arrays are not supported, use a collection type"),
            TypeKind::Wildcard => Some("wildcards cannot be resolved to a concrete type"),
            TypeKind::TypeVariable => Some("bare type variables cannot be resolved"),
            TypeKind::Void => Some("void is not a value type"),
        }
    }
}
