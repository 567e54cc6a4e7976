//! Type references and the predicates built on them.

pub mod support;
pub mod type_ref;
pub mod type_system;

pub use support::TypeSupportPolicy;
pub use type_ref::{TypeKind, TypeReference, WildcardBound};
pub use type_system::{Cardinality, TypeSystem, is_collection, is_optional, unwrap_element};
