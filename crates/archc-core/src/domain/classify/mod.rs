//! Heuristic classification: detectors, precedence and the classifiers.
//!
//! ```text
//!  SourceElement ──► TypeCandidate / PortCandidate
//!                         │
//!                  detectors (one concern each) ──► Signal<V>
//!                         │
//!                  decide(signals, PRECEDENCE) ──► Evidence<V>
//!                         │
//!        AggregateRootClassifier / RepositoryPortMatcher / PortDirectionResolver
//! ```
//!
//! Each candidate goes `UNCLASSIFIED -> CLASSIFIED` exactly once per
//! compilation; the analyzer stores the result and nothing downstream
//! classifies again.

pub mod aggregate;
pub mod detectors;
pub mod kind;
pub mod port_direction;
pub mod repository;
pub mod signal;

use std::collections::{BTreeMap, HashMap, HashSet};

pub use aggregate::{AGGREGATE_ROOT_PRECEDENCE, AggregateRootClassifier, AggregateRootEvidence};
pub use kind::classify_kind;
pub use port_direction::{DIRECTION_PRECEDENCE, DirectionEvidence, PortDirectionResolver};
pub use repository::{REPOSITORY_PRECEDENCE, RepositoryMatch, RepositoryPortMatcher};
pub use signal::{DetectorId, Evidence, Precedence, Priority, Signal, decide};

use crate::domain::{
    annotations::AnnotationIndex,
    model::Property,
    source::SourceElement,
    types::Cardinality,
    vocabulary::{self, Concept, IDENTIFIER_SUFFIX, IDENTITY_FIELD_NAMES},
};

/// A class, record or enum awaiting domain classification.
#[derive(Debug, Clone)]
pub struct TypeCandidate<'a> {
    element: &'a SourceElement,
    annotations: AnnotationIndex,
    properties: Vec<Property>,
}

impl<'a> TypeCandidate<'a> {
    /// Extract properties: every non-static field, in declaration order.
    ///
    /// The identity property is the field annotated as identity, else the
    /// field named `id`, else the first field typed `<Simple>Id`.
    pub fn new(element: &'a SourceElement) -> Self {
        let identity_annotations = vocabulary::annotations_for(Concept::Identity);
        let fields: Vec<_> = element.fields.iter().filter(|f| !f.is_static).collect();

        let by_annotation = fields.iter().position(|field| {
            AnnotationIndex::from_slice(&field.annotations).has_any(identity_annotations)
        });
        let by_name = || {
            fields
                .iter()
                .position(|field| IDENTITY_FIELD_NAMES.contains(&field.name.as_str()))
        };
        let own_id_type = format!("{}{}", element.simple_name(), IDENTIFIER_SUFFIX);
        let by_type = || {
            fields
                .iter()
                .position(|field| field.type_ref.simple_name() == own_id_type)
        };
        let identity = by_annotation.or_else(by_name).or_else(by_type);

        let properties = fields
            .iter()
            .enumerate()
            .map(|(position, field)| {
                let property = Property::new(field.name.clone(), field.type_ref.clone());
                if Some(position) == identity {
                    property.identity()
                } else {
                    property
                }
            })
            .collect();

        Self {
            element,
            annotations: element.annotation_index(),
            properties,
        }
    }

    pub fn element(&self) -> &'a SourceElement {
        self.element
    }

    pub fn qualified_name(&self) -> &'a str {
        &self.element.qualified_name
    }

    pub fn simple_name(&self) -> &'a str {
        self.element.simple_name()
    }

    pub fn annotations(&self) -> &AnnotationIndex {
        &self.annotations
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn identity(&self) -> Option<&Property> {
        self.properties.iter().find(|property| property.is_identity())
    }

    pub fn into_properties(self) -> Vec<Property> {
        self.properties
    }
}

/// An interface awaiting port classification.
#[derive(Debug, Clone)]
pub struct PortCandidate<'a> {
    element: &'a SourceElement,
    annotations: AnnotationIndex,
}

impl<'a> PortCandidate<'a> {
    pub fn new(element: &'a SourceElement) -> Self {
        Self {
            element,
            annotations: element.annotation_index(),
        }
    }

    pub fn element(&self) -> &'a SourceElement {
        self.element
    }

    pub fn qualified_name(&self) -> &'a str {
        &self.element.qualified_name
    }

    pub fn simple_name(&self) -> &'a str {
        self.element.simple_name()
    }

    pub fn package_name(&self) -> &'a str {
        self.element.package_name()
    }

    pub fn annotations(&self) -> &AnnotationIndex {
        &self.annotations
    }
}

/// Round-wide facts the structural detectors consult.
///
/// Filled by the analyzer in stages: candidate names first, repository
/// matches after the matcher ran, implementing services from the class
/// partition.
#[derive(Debug, Clone, Default)]
pub struct ClassificationContext {
    candidates: HashSet<String>,
    candidates_by_simple_name: BTreeMap<String, Vec<String>>,
    /// managed domain type -> repository port
    managed_by: HashMap<String, String>,
    /// repository port -> managed domain type (if known)
    repositories: HashMap<String, Option<String>>,
    /// element type -> owner that holds it in a collection
    collected_by: HashMap<String, String>,
    /// interface -> annotated application service implementing it
    implemented_by_service: HashMap<String, String>,
}

impl ClassificationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_candidate(&mut self, candidate: &TypeCandidate<'_>) {
        let name = candidate.qualified_name().to_string();
        let same_name = self
            .candidates_by_simple_name
            .entry(candidate.simple_name().to_string())
            .or_default();
        same_name.push(name.clone());
        same_name.sort();

        for property in candidate.properties() {
            let element = property.element_type().qualified_name();
            if property.cardinality() == Cardinality::Many && element != name {
                self.collected_by
                    .entry(element)
                    .or_insert_with(|| name.clone());
            }
        }
        self.candidates.insert(name);
    }

    pub fn add_repository(&mut self, port: &str, managed_type: Option<&str>) {
        if let Some(managed) = managed_type {
            self.managed_by
                .entry(managed.to_string())
                .or_insert_with(|| port.to_string());
        }
        self.repositories
            .insert(port.to_string(), managed_type.map(str::to_string));
    }

    pub fn add_service_implementation(&mut self, interface: &str, service: &str) {
        self.implemented_by_service
            .entry(interface.to_string())
            .or_insert_with(|| service.to_string());
    }

    pub fn is_candidate(&self, qualified_name: &str) -> bool {
        self.candidates.contains(qualified_name)
    }

    /// Candidates with the given simple name, sorted by qualified name.
    pub fn candidates_named(&self, simple_name: &str) -> &[String] {
        self.candidates_by_simple_name
            .get(simple_name)
            .map_or(&[], Vec::as_slice)
    }

    pub fn repository_managing(&self, domain_type: &str) -> Option<&str> {
        self.managed_by.get(domain_type).map(String::as_str)
    }

    pub fn is_repository(&self, port: &str) -> bool {
        self.repositories.contains_key(port)
    }

    pub fn collection_owner(&self, element_type: &str) -> Option<&str> {
        self.collected_by.get(element_type).map(String::as_str)
    }

    pub fn implementing_service(&self, interface: &str) -> Option<&str> {
        self.implemented_by_service.get(interface).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        annotations::AnnotationFact,
        source::{ElementKind, FieldFact},
        types::TypeReference,
    };

    #[test]
    fn identity_prefers_annotation_then_name_then_type() {
        let element = SourceElement::new(ElementKind::Class, "com.acme.Order")
            .with_field(FieldFact::new("orderId", TypeReference::class("com.acme.OrderId")))
            .with_field(FieldFact::new("id", TypeReference::class("java.util.UUID")))
            .with_field(
                FieldFact::new("number", TypeReference::class("java.lang.String"))
                    .with_annotation(AnnotationFact::new("org.jmolecules.ddd.annotation.Identity")),
            );
        let candidate = TypeCandidate::new(&element);
        assert_eq!(candidate.identity().map(Property::name), Some("number"));

        let element = SourceElement::new(ElementKind::Class, "com.acme.Order")
            .with_field(FieldFact::new("orderId", TypeReference::class("com.acme.OrderId")))
            .with_field(FieldFact::new("id", TypeReference::class("java.util.UUID")));
        assert_eq!(TypeCandidate::new(&element).identity().map(Property::name), Some("id"));

        let element = SourceElement::new(ElementKind::Class, "com.acme.Order")
            .with_field(FieldFact::new("orderId", TypeReference::class("com.acme.OrderId")));
        assert_eq!(
            TypeCandidate::new(&element).identity().map(Property::name),
            Some("orderId")
        );
    }

    #[test]
    fn static_fields_are_not_properties() {
        let mut constant = FieldFact::new("MAX", TypeReference::primitive("int"));
        constant.is_static = true;
        let element = SourceElement::new(ElementKind::Class, "com.acme.Limits").with_field(constant);
        assert!(TypeCandidate::new(&element).properties().is_empty());
    }

    #[test]
    fn context_tracks_collection_owners() {
        let order = SourceElement::new(ElementKind::Class, "com.acme.Order").with_field(FieldFact::new(
            "lines",
            TypeReference::parse("java.util.List<com.acme.OrderLine>").unwrap(),
        ));
        let mut context = ClassificationContext::new();
        context.add_candidate(&TypeCandidate::new(&order));

        assert!(context.is_candidate("com.acme.Order"));
        assert_eq!(context.collection_owner("com.acme.OrderLine"), Some("com.acme.Order"));
        assert_eq!(context.candidates_named("Order"), &["com.acme.Order".to_string()]);
    }
}
