//! Collection/optional-aware view over type references.
//!
//! Generators and the relationship analysis care about the *element* a
//! property carries (`List<OrderLine>` carries `OrderLine`, many times).
//! [`Cardinality`] and [`unwrap_element`] make that explicit; [`TypeSystem`]
//! adds domain lookups on top via the resolver.

use std::fmt;

use serde::Serialize;

use crate::domain::{
    model::DomainType,
    resolver::{DomainTypeResolver, ResolutionCheck},
    types::{TypeKind, TypeReference, TypeSupportPolicy},
    vocabulary::{COLLECTION_TYPES, OPTIONAL_TYPES},
};

/// How many values of the element type a reference carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    Single,
    Optional,
    Many,
}

impl Cardinality {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Optional => "optional",
            Self::Many => "many",
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the reference is one of the known single-argument collections.
pub fn is_collection(reference: &TypeReference) -> bool {
    reference.kind() == TypeKind::Parameterized
        && reference.arguments().len() == 1
        && COLLECTION_TYPES.contains(&reference.qualified_name().as_str())
}

pub fn is_optional(reference: &TypeReference) -> bool {
    reference.kind() == TypeKind::Parameterized
        && reference.arguments().len() == 1
        && OPTIONAL_TYPES.contains(&reference.qualified_name().as_str())
}

/// Peel one collection or optional wrapper off a reference.
///
/// Anything else, including a raw `List` without type argument, is returned
/// as a single value of itself.
pub fn unwrap_element(reference: &TypeReference) -> (Cardinality, &TypeReference) {
    if is_collection(reference) {
        (Cardinality::Many, &reference.arguments()[0])
    } else if is_optional(reference) {
        (Cardinality::Optional, &reference.arguments()[0])
    } else {
        (Cardinality::Single, reference)
    }
}

/// Helper handed to plugins: type predicates plus domain lookups.
#[derive(Debug, Clone, Copy)]
pub struct TypeSystem<'a> {
    resolver: DomainTypeResolver<'a>,
}

impl<'a> TypeSystem<'a> {
    pub fn new(resolver: DomainTypeResolver<'a>) -> Self {
        Self { resolver }
    }

    pub fn policy(&self) -> TypeSupportPolicy {
        self.resolver.policy()
    }

    pub fn cardinality(&self, reference: &TypeReference) -> Cardinality {
        unwrap_element(reference).0
    }

    pub fn element_type<'r>(&self, reference: &'r TypeReference) -> &'r TypeReference {
        unwrap_element(reference).1
    }

    /// Domain type carried by the reference, looking through one wrapper.
    ///
    /// Unsupported element types and types outside the domain model both
    /// yield `None`; callers that need the reason use the resolver directly.
    pub fn domain_type_of(&self, reference: &TypeReference) -> Option<&'a DomainType> {
        let element = self.element_type(reference);
        self.resolver
            .resolve(element, ResolutionCheck::None)
            .ok()
            .flatten()
    }

    /// Simple name for rendering, with type arguments kept
    /// (`List<OrderLine>`).
    pub fn render_simple(&self, reference: &TypeReference) -> String {
        match reference {
            TypeReference::Parameterized { arguments, .. } => {
                let arguments: Vec<String> =
                    arguments.iter().map(|argument| self.render_simple(argument)).collect();
                format!("{}<{}>", reference.simple_name(), arguments.join(", "))
            }
            TypeReference::Array { component } => format!("{}[]", self.render_simple(component)),
            _ => reference.simple_name(),
        }
    }
}
