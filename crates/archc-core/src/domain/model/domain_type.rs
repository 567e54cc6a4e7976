//! Domain model: classified domain types and the relationships between them.

use std::fmt;

use serde::Serialize;

use crate::domain::{
    classify::AggregateRootEvidence,
    error::DomainError,
    source::simple_name_of,
    types::{Cardinality, TypeReference, unwrap_element},
};

/// Classification kind of a domain type. Fixed within one analysis; a later
/// round over a wider source set may assign another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DomainKind {
    AggregateRoot,
    Entity,
    ValueObject,
    Record,
    Enumeration,
    DomainEvent,
    Identifier,
    Collection,
    Other,
}

impl DomainKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AggregateRoot => "AGGREGATE_ROOT",
            Self::Entity => "ENTITY",
            Self::ValueObject => "VALUE_OBJECT",
            Self::Record => "RECORD",
            Self::Enumeration => "ENUMERATION",
            Self::DomainEvent => "DOMAIN_EVENT",
            Self::Identifier => "IDENTIFIER",
            Self::Collection => "COLLECTION",
            Self::Other => "OTHER",
        }
    }

    /// Kinds that carry identity of their own.
    pub fn has_identity(&self) -> bool {
        matches!(self, Self::AggregateRoot | Self::Entity)
    }

    /// Kinds compared by value; relationships to them are element
    /// collections rather than associations.
    pub fn is_value_like(&self) -> bool {
        matches!(
            self,
            Self::ValueObject | Self::Record | Self::Enumeration | Self::Identifier
        )
    }
}

impl fmt::Display for DomainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One property of a domain type (a non-static field).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Property {
    name: String,
    #[serde(rename = "type")]
    type_ref: TypeReference,
    cardinality: Cardinality,
    is_identity: bool,
}

impl Property {
    pub fn new(name: impl Into<String>, type_ref: TypeReference) -> Self {
        let cardinality = unwrap_element(&type_ref).0;
        Self {
            name: name.into(),
            type_ref,
            cardinality,
            is_identity: false,
        }
    }

    pub fn identity(mut self) -> Self {
        self.is_identity = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_ref(&self) -> &TypeReference {
        &self.type_ref
    }

    /// The carried element type (`OrderLine` for `List<OrderLine>`).
    pub fn element_type(&self) -> &TypeReference {
        unwrap_element(&self.type_ref).1
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    pub fn is_identity(&self) -> bool {
        self.is_identity
    }
}

/// A classified domain type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainType {
    qualified_name: String,
    simple_name: String,
    kind: DomainKind,
    properties: Vec<Property>,
    immutable: bool,
    documentation: Option<String>,
    #[serde(skip)]
    evidence: Option<AggregateRootEvidence>,
}

impl DomainType {
    pub fn builder() -> DomainTypeBuilder {
        DomainTypeBuilder::default()
    }

    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    pub fn simple_name(&self) -> &str {
        &self.simple_name
    }

    pub fn package_name(&self) -> &str {
        crate::domain::source::package_of(&self.qualified_name)
    }

    pub fn kind(&self) -> DomainKind {
        self.kind
    }

    pub fn is_aggregate_root(&self) -> bool {
        self.kind == DomainKind::AggregateRoot
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|property| property.name == name)
    }

    pub fn identity(&self) -> Option<&Property> {
        self.properties.iter().find(|property| property.is_identity)
    }

    pub fn is_immutable(&self) -> bool {
        self.immutable
    }

    pub fn documentation(&self) -> Option<&str> {
        self.documentation.as_deref()
    }

    pub fn evidence(&self) -> Option<&AggregateRootEvidence> {
        self.evidence.as_ref()
    }
}

#[derive(Debug, Default)]
pub struct DomainTypeBuilder {
    qualified_name: Option<String>,
    kind: Option<DomainKind>,
    properties: Vec<Property>,
    immutable: bool,
    documentation: Option<String>,
    evidence: Option<AggregateRootEvidence>,
}

impl DomainTypeBuilder {
    pub fn qualified_name(mut self, qualified_name: impl Into<String>) -> Self {
        self.qualified_name = Some(qualified_name.into());
        self
    }

    pub fn kind(mut self, kind: DomainKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    pub fn properties(mut self, properties: Vec<Property>) -> Self {
        self.properties = properties;
        self
    }

    pub fn immutable(mut self, immutable: bool) -> Self {
        self.immutable = immutable;
        self
    }

    pub fn documentation(mut self, documentation: Option<String>) -> Self {
        self.documentation = documentation;
        self
    }

    pub fn evidence(mut self, evidence: AggregateRootEvidence) -> Self {
        self.evidence = Some(evidence);
        self
    }

    pub fn build(self) -> Result<DomainType, DomainError> {
        let qualified_name = self
            .qualified_name
            .filter(|name| !name.is_empty())
            .ok_or(DomainError::MissingRequiredField { field: "domain_type.qualified_name" })?;
        let kind = self
            .kind
            .ok_or(DomainError::MissingRequiredField { field: "domain_type.kind" })?;

        let mut seen = std::collections::HashSet::new();
        for property in &self.properties {
            if !seen.insert(property.name.as_str()) {
                return Err(DomainError::DuplicateMember {
                    owner: qualified_name,
                    member: property.name.clone(),
                });
            }
        }
        if self.properties.iter().filter(|p| p.is_identity).count() > 1 {
            return Err(DomainError::DuplicateMember {
                owner: qualified_name,
                member: "identity".into(),
            });
        }

        Ok(DomainType {
            simple_name: simple_name_of(&qualified_name).to_string(),
            qualified_name,
            kind,
            properties: self.properties,
            immutable: self.immutable,
            documentation: self.documentation,
            evidence: self.evidence,
        })
    }
}

/// Association kinds between domain types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationKind {
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
    ElementCollection,
}

impl RelationKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OneToOne => "ONE_TO_ONE",
            Self::OneToMany => "ONE_TO_MANY",
            Self::ManyToOne => "MANY_TO_ONE",
            Self::ManyToMany => "MANY_TO_MANY",
            Self::ElementCollection => "ELEMENT_COLLECTION",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed reference from a property of one domain type to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relationship {
    pub source: String,
    pub property: String,
    pub target: String,
    pub kind: RelationKind,
    /// Whether the reference goes through the target's identifier.
    pub by_identifier: bool,
}

impl Relationship {
    /// A full object reference into a different aggregate.
    pub fn crosses_aggregate_by_object(&self, target_is_root: bool) -> bool {
        target_is_root && !self.by_identifier && self.source != self.target
    }
}

/// All domain types of one compilation, ordered by qualified name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DomainModel {
    types: Vec<DomainType>,
    relationships: Vec<Relationship>,
}

impl DomainModel {
    pub fn new(mut types: Vec<DomainType>, relationships: Vec<Relationship>) -> Self {
        types.sort_by(|a, b| a.qualified_name.cmp(&b.qualified_name));
        Self {
            types,
            relationships,
        }
    }

    pub fn types(&self) -> &[DomainType] {
        &self.types
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    pub fn relationships_of<'a>(&'a self, source: &'a str) -> impl Iterator<Item = &'a Relationship> {
        self.relationships
            .iter()
            .filter(move |relationship| relationship.source == source)
    }

    pub fn aggregate_roots(&self) -> impl Iterator<Item = &DomainType> {
        self.types.iter().filter(|t| t.is_aggregate_root())
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_requires_kind() {
        let result = DomainType::builder().qualified_name("com.acme.Order").build();
        assert_eq!(
            result,
            Err(DomainError::MissingRequiredField { field: "domain_type.kind" })
        );
    }

    #[test]
    fn builder_rejects_second_identity() {
        let result = DomainType::builder()
            .qualified_name("com.acme.Order")
            .kind(DomainKind::Entity)
            .property(Property::new("id", TypeReference::class("com.acme.OrderId")).identity())
            .property(Property::new("code", TypeReference::class("java.lang.String")).identity())
            .build();
        assert!(matches!(result, Err(DomainError::DuplicateMember { .. })));
    }

    #[test]
    fn property_knows_its_element() {
        let property = Property::new(
            "lines",
            TypeReference::parse("java.util.List<com.acme.OrderLine>").unwrap(),
        );
        assert_eq!(property.cardinality(), Cardinality::Many);
        assert_eq!(property.element_type().qualified_name(), "com.acme.OrderLine");
    }

    #[test]
    fn model_sorts_types() {
        let build = |name: &str| {
            DomainType::builder()
                .qualified_name(name)
                .kind(DomainKind::Other)
                .build()
                .unwrap()
        };
        let model = DomainModel::new(vec![build("com.acme.b.B"), build("com.acme.a.A")], vec![]);
        assert_eq!(model.types()[0].simple_name(), "A");
    }
}
