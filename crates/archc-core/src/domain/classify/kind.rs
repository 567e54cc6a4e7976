//! Domain kind assignment. First matching rule wins:
//!
//! 1. explicit kind annotation
//! 2. `enum` element
//! 3. aggregate-root verdict
//! 4. identifier shape
//! 5. event naming
//! 6. declared identity
//! 7. first-class collection
//! 8. record, or immutable class with fields
//! 9. other

use crate::domain::{
    classify::{AggregateRootEvidence, TypeCandidate},
    model::DomainKind,
    source::{ElementKind, SourceElement},
    types::{Cardinality, TypeKind, TypeSupportPolicy},
    vocabulary::{self, Concept, EVENT_SUFFIX, IDENTIFIER_SUFFIX},
};

pub fn classify_kind(candidate: &TypeCandidate<'_>, evidence: &AggregateRootEvidence) -> DomainKind {
    let element = candidate.element();
    let annotations = candidate.annotations();
    let annotated = |concept| annotations.has_any(vocabulary::annotations_for(concept));

    if evidence.is_aggregate_root() && annotated(Concept::AggregateRoot) {
        return DomainKind::AggregateRoot;
    }
    for (concept, kind) in [
        (Concept::Entity, DomainKind::Entity),
        (Concept::ValueObject, DomainKind::ValueObject),
        (Concept::DomainEvent, DomainKind::DomainEvent),
        (Concept::Identity, DomainKind::Identifier),
    ] {
        if annotated(concept) {
            return kind;
        }
    }

    if element.kind == ElementKind::Enum {
        return DomainKind::Enumeration;
    }
    if evidence.is_aggregate_root() {
        return DomainKind::AggregateRoot;
    }
    if has_identifier_shape(candidate) {
        return DomainKind::Identifier;
    }
    if vocabulary::has_suffix(candidate.simple_name(), EVENT_SUFFIX) {
        return DomainKind::DomainEvent;
    }
    if candidate.identity().is_some() {
        return DomainKind::Entity;
    }
    if matches!(candidate.properties(), [only] if only.cardinality() == Cardinality::Many) {
        return DomainKind::Collection;
    }
    if element.kind == ElementKind::Record {
        return DomainKind::Record;
    }
    if is_immutable(element) && !candidate.properties().is_empty() {
        return DomainKind::ValueObject;
    }
    DomainKind::Other
}

/// `...Id` with exactly one property of an identifier-suitable or primitive
/// type.
fn has_identifier_shape(candidate: &TypeCandidate<'_>) -> bool {
    let policy = TypeSupportPolicy::new();
    vocabulary::has_suffix(candidate.simple_name(), IDENTIFIER_SUFFIX)
        && match candidate.properties() {
            [only] => {
                only.type_ref().kind() == TypeKind::Primitive
                    || policy.is_suitable_as_identifier(only.type_ref())
            }
            _ => false,
        }
}

/// Records and enums are immutable; classes are when every instance field
/// is final.
pub fn is_immutable(element: &SourceElement) -> bool {
    match element.kind {
        ElementKind::Record | ElementKind::Enum => true,
        ElementKind::Interface => false,
        ElementKind::Class => element
            .fields
            .iter()
            .filter(|field| !field.is_static)
            .all(|field| field.is_final),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        annotations::AnnotationFact,
        classify::{AggregateRootClassifier, ClassificationContext},
        source::FieldFact,
        types::TypeReference,
    };

    fn kind_of(element: &SourceElement) -> DomainKind {
        let candidate = TypeCandidate::new(element);
        let evidence = AggregateRootClassifier::new().classify(&candidate, &ClassificationContext::new());
        classify_kind(&candidate, &evidence)
    }

    fn class(name: &str) -> SourceElement {
        SourceElement::new(ElementKind::Class, name)
    }

    #[test]
    fn explicit_root_annotation_without_suffix() {
        let order = class("com.acme.Order")
            .with_annotation(AnnotationFact::new("org.jmolecules.ddd.annotation.AggregateRoot"));
        assert_eq!(kind_of(&order), DomainKind::AggregateRoot);
    }

    #[test]
    fn conflicting_explicit_annotations_fall_back_to_entity() {
        let order = class("com.acme.Order")
            .with_annotation(AnnotationFact::new("org.jmolecules.ddd.annotation.AggregateRoot"))
            .with_annotation(AnnotationFact::new("org.jmolecules.ddd.annotation.Entity"));
        assert_eq!(kind_of(&order), DomainKind::Entity);
    }

    #[test]
    fn structural_kinds() {
        let id = class("com.acme.OrderId")
            .with_field(FieldFact::new("value", TypeReference::class("java.util.UUID")).final_field());
        assert_eq!(kind_of(&id), DomainKind::Identifier);

        let event = class("com.acme.OrderPlacedEvent")
            .with_field(FieldFact::new("orderId", TypeReference::class("com.acme.OrderId")).final_field());
        assert_eq!(kind_of(&event), DomainKind::DomainEvent);

        let line = class("com.acme.OrderLine")
            .with_field(FieldFact::new("id", TypeReference::primitive("long")));
        assert_eq!(kind_of(&line), DomainKind::Entity);

        let lines = class("com.acme.OrderLines").with_field(FieldFact::new(
            "items",
            TypeReference::parse("java.util.List<com.acme.OrderLine>").unwrap(),
        ));
        assert_eq!(kind_of(&lines), DomainKind::Collection);

        let money = class("com.acme.Money")
            .with_field(FieldFact::new("amount", TypeReference::class("java.math.BigDecimal")).final_field());
        assert_eq!(kind_of(&money), DomainKind::ValueObject);

        let record = SourceElement::new(ElementKind::Record, "com.acme.Address")
            .with_field(FieldFact::new("street", TypeReference::class("java.lang.String")));
        assert_eq!(kind_of(&record), DomainKind::Record);

        let status = SourceElement::new(ElementKind::Enum, "com.acme.Status");
        assert_eq!(kind_of(&status), DomainKind::Enumeration);

        let mutable = class("com.acme.Draft")
            .with_field(FieldFact::new("text", TypeReference::class("java.lang.String")));
        assert_eq!(kind_of(&mutable), DomainKind::Other);
    }
}
