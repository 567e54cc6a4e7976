//! Repository port matcher.

use crate::domain::{
    annotations::AnnotationValue,
    classify::{
        ClassificationContext, PortCandidate,
        detectors::{CrudShapeDetector, PortDetector, RepositoryAnnotationDetector, RepositoryNamingDetector},
        signal::{DetectorId, Evidence, Precedence, Priority, decide},
    },
    source::package_of,
    types::unwrap_element,
    vocabulary::{self, Concept, REPOSITORY_SUFFIX},
};

pub static REPOSITORY_PRECEDENCE: Precedence = &[
    (DetectorId::ExplicitAnnotation, Priority::Explicit),
    (DetectorId::CrudShape, Priority::Structural),
    (DetectorId::NamingConvention, Priority::Naming),
];

/// Outcome of matching one interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryMatch {
    pub evidence: Evidence<bool>,
    /// Domain type the repository manages, when it can be named.
    pub managed_type: Option<String>,
}

impl RepositoryMatch {
    pub fn is_repository(&self) -> bool {
        self.evidence.verdict() == Some(true)
    }
}

pub struct RepositoryPortMatcher {
    detectors: Vec<Box<dyn PortDetector<bool>>>,
}

impl Default for RepositoryPortMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl RepositoryPortMatcher {
    pub fn new() -> Self {
        Self {
            detectors: vec![
                Box::new(RepositoryAnnotationDetector),
                Box::new(CrudShapeDetector),
                Box::new(RepositoryNamingDetector),
            ],
        }
    }

    pub fn match_port(&self, candidate: &PortCandidate<'_>, context: &ClassificationContext) -> RepositoryMatch {
        let signals = self
            .detectors
            .iter()
            .flat_map(|detector| detector.detect(candidate, context))
            .collect();
        let evidence = decide(signals, REPOSITORY_PRECEDENCE);

        let managed_type = if evidence.verdict() == Some(true) {
            managed_type(candidate, context)
        } else {
            None
        };

        RepositoryMatch {
            evidence,
            managed_type,
        }
    }
}

/// Name the managed type: annotation attribute, then `XRepository` -> `X`
/// among domain candidates, then the CRUD shape, then a signature type
/// whose simple name is `X`.
fn managed_type(candidate: &PortCandidate<'_>, context: &ClassificationContext) -> Option<String> {
    let from_annotation = candidate
        .annotations()
        .first_of(vocabulary::annotations_for(Concept::Repository))
        .and_then(|fact| {
            ["domainType", "value"]
                .into_iter()
                .filter_map(|name| fact.attribute(name).and_then(AnnotationValue::as_str))
                .find_map(|value| as_type_name(value, context))
        });
    if from_annotation.is_some() {
        return from_annotation;
    }

    let prefix = candidate
        .simple_name()
        .strip_suffix(REPOSITORY_SUFFIX)
        .filter(|prefix| !prefix.is_empty());

    if let Some(prefix) = prefix {
        let named = context.candidates_named(prefix);
        let same_package = named
            .iter()
            .find(|name| package_of(name) == candidate.package_name());
        if let Some(found) = same_package.or_else(|| named.first()) {
            return Some(found.clone());
        }
    }

    if let Some(shape) = CrudShapeDetector::managed_type(candidate, context) {
        return Some(shape);
    }

    let prefix = prefix?;
    candidate.element().methods.iter().find_map(|method| {
        method
            .parameters
            .iter()
            .map(|parameter| &parameter.type_ref)
            .chain(std::iter::once(&method.return_type))
            .map(|reference| unwrap_element(reference).1)
            .find(|reference| reference.simple_name() == prefix)
            .map(|reference| reference.qualified_name())
    })
}

/// A class literal or qualified type name. Bean names such as
/// `"customerRepo"` are not types.
fn as_type_name(value: &str, context: &ClassificationContext) -> Option<String> {
    let name = value.trim();
    let name = name.strip_suffix(".class").unwrap_or(name);
    let is_type = context.is_candidate(name)
        || (name.contains('.')
            && name
                .split('.')
                .all(|segment| segment.chars().next().is_some_and(|c| c.is_alphabetic() || c == '_')));
    is_type.then(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        annotations::AnnotationFact,
        classify::TypeCandidate,
        source::{ElementKind, MethodFact, SourceElement},
        types::TypeReference,
    };

    fn parse(input: &str) -> TypeReference {
        TypeReference::parse(input).unwrap()
    }

    fn customer_repository() -> SourceElement {
        SourceElement::new(ElementKind::Interface, "com.acme.CustomerRepository")
            .with_method(MethodFact::new("save", TypeReference::Void).with_parameter("customer", parse("com.acme.Customer")))
            .with_method(
                MethodFact::new("findById", parse("java.util.Optional<com.acme.Customer>"))
                    .with_parameter("id", parse("com.acme.CustomerId")),
            )
    }

    #[test]
    fn precedence_table_is_well_ordered() {
        assert!(crate::domain::classify::signal::is_well_ordered(REPOSITORY_PRECEDENCE));
    }

    #[test]
    fn naming_alone_matches_and_names_the_managed_type() {
        let element = customer_repository();
        let result = RepositoryPortMatcher::new()
            .match_port(&PortCandidate::new(&element), &ClassificationContext::new());

        assert!(result.is_repository());
        assert_eq!(result.evidence.decided_by(), Some(DetectorId::NamingConvention));
        assert_eq!(result.managed_type.as_deref(), Some("com.acme.Customer"));
    }

    #[test]
    fn crud_shape_matches_without_naming() {
        let customer = SourceElement::new(ElementKind::Class, "com.acme.Customer");
        let mut context = ClassificationContext::new();
        context.add_candidate(&TypeCandidate::new(&customer));

        let element = SourceElement::new(ElementKind::Interface, "com.acme.Customers")
            .with_method(MethodFact::new("store", TypeReference::Void).with_parameter("c", parse("com.acme.Customer")))
            .with_method(MethodFact::new("load", parse("com.acme.Customer")).with_parameter("id", parse("com.acme.CustomerId")));
        let result = RepositoryPortMatcher::new().match_port(&PortCandidate::new(&element), &context);

        assert!(result.is_repository());
        assert_eq!(result.evidence.decided_by(), Some(DetectorId::CrudShape));
        assert_eq!(result.managed_type.as_deref(), Some("com.acme.Customer"));
    }

    #[test]
    fn annotation_attribute_names_the_managed_type() {
        let element = SourceElement::new(ElementKind::Interface, "com.acme.Archive").with_annotation(
            AnnotationFact::new("io.archc.annotation.Repository")
                .with_attribute("domainType", AnnotationValue::String("com.acme.Document".into())),
        );
        let result = RepositoryPortMatcher::new()
            .match_port(&PortCandidate::new(&element), &ClassificationContext::new());
        assert_eq!(result.managed_type.as_deref(), Some("com.acme.Document"));
    }

    #[test]
    fn class_literal_value_names_the_managed_type() {
        let element = SourceElement::new(ElementKind::Interface, "com.acme.Archive").with_annotation(
            AnnotationFact::new("io.archc.annotation.Repository")
                .with_attribute("value", AnnotationValue::String("com.acme.Document.class".into())),
        );
        let result = RepositoryPortMatcher::new()
            .match_port(&PortCandidate::new(&element), &ClassificationContext::new());
        assert_eq!(result.managed_type.as_deref(), Some("com.acme.Document"));
    }

    #[test]
    fn bean_name_value_is_not_a_managed_type() {
        let element = customer_repository().with_annotation(
            AnnotationFact::new("org.jmolecules.ddd.annotation.Repository")
                .with_attribute("value", AnnotationValue::String("customerRepo".into())),
        );
        let result = RepositoryPortMatcher::new()
            .match_port(&PortCandidate::new(&element), &ClassificationContext::new());

        assert!(result.is_repository());
        assert_eq!(result.managed_type.as_deref(), Some("com.acme.Customer"));
    }

    #[test]
    fn plain_interface_is_not_a_repository() {
        let element = SourceElement::new(ElementKind::Interface, "com.acme.PlaceOrderUseCase")
            .with_method(MethodFact::new("place", TypeReference::Void).with_parameter("order", parse("com.acme.Order")));
        let result = RepositoryPortMatcher::new()
            .match_port(&PortCandidate::new(&element), &ClassificationContext::new());
        assert!(!result.is_repository());
        assert!(result.managed_type.is_none());
    }
}
