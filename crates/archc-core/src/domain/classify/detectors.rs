//! Detectors: one narrow source of evidence each.
//!
//! A detector returns its signals (usually one) and never looks at what
//! other detectors said. Combining is the classifier's job.

use crate::domain::{
    classify::{ClassificationContext, PortCandidate, TypeCandidate},
    classify::signal::{DetectorId, Priority, Signal},
    model::PortDirection,
    source::MethodFact,
    types::{TypeReference, unwrap_element},
    vocabulary::{
        self, AGGREGATE_ROOT_SUFFIXES, CHILD_ENTITY_SUFFIXES, Concept, DRIVEN_PACKAGE_SEGMENTS,
        DRIVEN_PORT_SUFFIXES, DRIVING_PACKAGE_SEGMENTS, DRIVING_PORT_SUFFIXES,
        REPOSITORY_READ_VERBS, REPOSITORY_SUFFIX, REPOSITORY_WRITE_VERBS,
    },
};

/// Detector over a domain type candidate.
pub trait TypeDetector: Send + Sync {
    fn id(&self) -> DetectorId;
    fn priority(&self) -> Priority;
    fn detect(&self, candidate: &TypeCandidate<'_>, context: &ClassificationContext) -> Vec<Signal<bool>>;

    fn fire(&self, vote: bool, justification: String) -> Signal<bool> {
        Signal::present(self.id(), self.priority(), vote, justification)
    }

    fn silent(&self, justification: &str) -> Signal<bool> {
        Signal::absent(self.id(), self.priority(), justification)
    }
}

/// Detector over an interface candidate, voting for `V`.
pub trait PortDetector<V>: Send + Sync {
    fn id(&self) -> DetectorId;
    fn priority(&self) -> Priority;
    fn detect(&self, candidate: &PortCandidate<'_>, context: &ClassificationContext) -> Vec<Signal<V>>;

    fn fire(&self, vote: V, justification: String) -> Signal<V> {
        Signal::present(self.id(), self.priority(), vote, justification)
    }

    fn silent(&self, justification: &str) -> Signal<V> {
        Signal::absent(self.id(), self.priority(), justification)
    }
}

fn annotation_label(concept: Concept) -> &'static str {
    match concept {
        Concept::AggregateRoot => "@AggregateRoot",
        Concept::Entity => "@Entity",
        Concept::ValueObject => "@ValueObject",
        Concept::DomainEvent => "@DomainEvent",
        Concept::Repository => "@Repository",
        Concept::DrivingPort => "@DrivingPort",
        Concept::DrivenPort => "@DrivenPort",
        _ => "annotation",
    }
}

// ── Aggregate root ──────────────────────────────────────────────────────────

/// Kind annotations: `@AggregateRoot` votes for, other kind annotations
/// vote against.
#[derive(Debug, Default)]
pub struct KindAnnotationDetector;

impl TypeDetector for KindAnnotationDetector {
    fn id(&self) -> DetectorId {
        DetectorId::ExplicitAnnotation
    }

    fn priority(&self) -> Priority {
        Priority::Explicit
    }

    fn detect(&self, candidate: &TypeCandidate<'_>, _: &ClassificationContext) -> Vec<Signal<bool>> {
        let votes = [
            (Concept::AggregateRoot, true),
            (Concept::Entity, false),
            (Concept::ValueObject, false),
            (Concept::DomainEvent, false),
        ];
        let signals: Vec<_> = votes
            .into_iter()
            .filter(|(concept, _)| {
                candidate
                    .annotations()
                    .has_any(vocabulary::annotations_for(*concept))
            })
            .map(|(concept, vote)| self.fire(vote, format!("annotated {}", annotation_label(concept))))
            .collect();

        if signals.is_empty() {
            vec![self.silent("no kind annotation")]
        } else {
            signals
        }
    }
}

/// A repository port manages this type.
#[derive(Debug, Default)]
pub struct RepositoryManagedDetector;

impl TypeDetector for RepositoryManagedDetector {
    fn id(&self) -> DetectorId {
        DetectorId::RepositoryPort
    }

    fn priority(&self) -> Priority {
        Priority::Structural
    }

    fn detect(&self, candidate: &TypeCandidate<'_>, context: &ClassificationContext) -> Vec<Signal<bool>> {
        vec![match context.repository_managing(candidate.qualified_name()) {
            Some(port) => self.fire(true, format!("managed by repository port {port}")),
            None => self.silent("no repository port manages this type"),
        }]
    }
}

/// Another domain type holds this one in a collection.
#[derive(Debug, Default)]
pub struct ChildEntityDetector;

impl TypeDetector for ChildEntityDetector {
    fn id(&self) -> DetectorId {
        DetectorId::ChildEntityReference
    }

    fn priority(&self) -> Priority {
        Priority::Structural
    }

    fn detect(&self, candidate: &TypeCandidate<'_>, context: &ClassificationContext) -> Vec<Signal<bool>> {
        vec![match context.collection_owner(candidate.qualified_name()) {
            Some(owner) => self.fire(false, format!("held in a collection by {owner}")),
            None => self.silent("not held in a collection"),
        }]
    }
}

/// Root-like or child-like simple-name suffixes.
#[derive(Debug, Default)]
pub struct AggregateNamingDetector;

impl TypeDetector for AggregateNamingDetector {
    fn id(&self) -> DetectorId {
        DetectorId::NamingConvention
    }

    fn priority(&self) -> Priority {
        Priority::Naming
    }

    fn detect(&self, candidate: &TypeCandidate<'_>, _: &ClassificationContext) -> Vec<Signal<bool>> {
        let name = candidate.simple_name();
        let root = vocabulary::matching_suffix(name, AGGREGATE_ROOT_SUFFIXES);
        let child = vocabulary::matching_suffix(name, CHILD_ENTITY_SUFFIXES);

        vec![match (root, child) {
            (Some(suffix), None) => self.fire(true, format!("name ends with '{suffix}'")),
            (None, Some(suffix)) => self.fire(false, format!("name ends with '{suffix}'")),
            _ => self.silent("no aggregate naming convention"),
        }]
    }
}

/// Prerequisite for a heuristic aggregate-root verdict: the type declares
/// an identity.
#[derive(Debug, Default)]
pub struct IdentityShapeDetector;

impl TypeDetector for IdentityShapeDetector {
    fn id(&self) -> DetectorId {
        DetectorId::IdentityShape
    }

    fn priority(&self) -> Priority {
        Priority::Structural
    }

    fn detect(&self, candidate: &TypeCandidate<'_>, _: &ClassificationContext) -> Vec<Signal<bool>> {
        vec![match candidate.identity() {
            Some(identity) => self.fire(
                true,
                format!("identity property '{}' ({})", identity.name(), identity.type_ref()),
            ),
            None => self.silent("no identity property"),
        }]
    }
}

// ── Repository ──────────────────────────────────────────────────────────────

/// `@Repository` votes for; a driving-port annotation votes against.
#[derive(Debug, Default)]
pub struct RepositoryAnnotationDetector;

impl PortDetector<bool> for RepositoryAnnotationDetector {
    fn id(&self) -> DetectorId {
        DetectorId::ExplicitAnnotation
    }

    fn priority(&self) -> Priority {
        Priority::Explicit
    }

    fn detect(&self, candidate: &PortCandidate<'_>, _: &ClassificationContext) -> Vec<Signal<bool>> {
        let annotations = candidate.annotations();
        let mut signals = Vec::new();
        if annotations.has_any(vocabulary::annotations_for(Concept::Repository)) {
            signals.push(self.fire(true, "annotated @Repository".into()));
        }
        if annotations.has_any(vocabulary::annotations_for(Concept::DrivingPort)) {
            signals.push(self.fire(false, "annotated @DrivingPort".into()));
        }
        if signals.is_empty() {
            signals.push(self.silent("no repository annotation"));
        }
        signals
    }
}

/// Write and read methods over one and the same domain type.
#[derive(Debug, Default)]
pub struct CrudShapeDetector;

impl CrudShapeDetector {
    /// The single domain type the interface's CRUD methods revolve around.
    pub fn managed_type(candidate: &PortCandidate<'_>, context: &ClassificationContext) -> Option<String> {
        let abstract_methods = || {
            candidate
                .element()
                .methods
                .iter()
                .filter(|method| !method.is_default && !method.is_static)
        };

        let has_write = abstract_methods().any(|m| is_verb_method(m, REPOSITORY_WRITE_VERBS));
        let has_read = abstract_methods().any(|m| is_verb_method(m, REPOSITORY_READ_VERBS));
        if !has_write || !has_read {
            return None;
        }

        let mut managed: Vec<String> = Vec::new();
        for method in abstract_methods() {
            let carried: Vec<&TypeReference> = if is_verb_method(method, REPOSITORY_WRITE_VERBS) {
                method.parameters.iter().map(|p| unwrap_element(&p.type_ref).1).collect()
            } else if is_verb_method(method, REPOSITORY_READ_VERBS) {
                vec![unwrap_element(&method.return_type).1]
            } else {
                continue;
            };
            for reference in carried {
                let name = reference.qualified_name();
                if context.is_candidate(&name) && !managed.contains(&name) {
                    managed.push(name);
                }
            }
        }

        match managed.as_slice() {
            [single] => Some(single.clone()),
            _ => None,
        }
    }
}

fn is_verb_method(method: &MethodFact, verbs: &[&str]) -> bool {
    verbs
        .iter()
        .any(|verb| vocabulary::starts_with_verb(&method.name, verb))
}

impl PortDetector<bool> for CrudShapeDetector {
    fn id(&self) -> DetectorId {
        DetectorId::CrudShape
    }

    fn priority(&self) -> Priority {
        Priority::Structural
    }

    fn detect(&self, candidate: &PortCandidate<'_>, context: &ClassificationContext) -> Vec<Signal<bool>> {
        vec![match Self::managed_type(candidate, context) {
            Some(managed) => self.fire(true, format!("reads and writes {managed}")),
            None => self.silent("no CRUD shape over a single domain type"),
        }]
    }
}

/// `...Repository` simple names.
#[derive(Debug, Default)]
pub struct RepositoryNamingDetector;

impl PortDetector<bool> for RepositoryNamingDetector {
    fn id(&self) -> DetectorId {
        DetectorId::NamingConvention
    }

    fn priority(&self) -> Priority {
        Priority::Naming
    }

    fn detect(&self, candidate: &PortCandidate<'_>, _: &ClassificationContext) -> Vec<Signal<bool>> {
        vec![if vocabulary::has_suffix(candidate.simple_name(), REPOSITORY_SUFFIX) {
            self.fire(true, format!("name ends with '{REPOSITORY_SUFFIX}'"))
        } else {
            self.silent("no repository naming convention")
        }]
    }
}

// ── Port direction ──────────────────────────────────────────────────────────

/// Port annotations. A repository annotation makes the port driven whatever
/// other port annotations say.
#[derive(Debug, Default)]
pub struct DirectionAnnotationDetector;

impl PortDetector<PortDirection> for DirectionAnnotationDetector {
    fn id(&self) -> DetectorId {
        DetectorId::ExplicitAnnotation
    }

    fn priority(&self) -> Priority {
        Priority::Explicit
    }

    fn detect(&self, candidate: &PortCandidate<'_>, _: &ClassificationContext) -> Vec<Signal<PortDirection>> {
        if candidate
            .annotations()
            .has_any(vocabulary::annotations_for(Concept::Repository))
        {
            return vec![self.fire(
                PortDirection::Driven,
                format!("annotated {}", annotation_label(Concept::Repository)),
            )];
        }

        let votes = [
            (Concept::DrivingPort, PortDirection::Driving),
            (Concept::DrivenPort, PortDirection::Driven),
        ];
        let signals: Vec<_> = votes
            .into_iter()
            .filter(|(concept, _)| {
                candidate
                    .annotations()
                    .has_any(vocabulary::annotations_for(*concept))
            })
            .map(|(concept, direction)| {
                self.fire(direction, format!("annotated {}", annotation_label(concept)))
            })
            .collect();

        if signals.is_empty() {
            vec![self.silent("no port annotation")]
        } else {
            signals
        }
    }
}

/// Repository ports are driven.
#[derive(Debug, Default)]
pub struct RepositoryDirectionDetector;

impl PortDetector<PortDirection> for RepositoryDirectionDetector {
    fn id(&self) -> DetectorId {
        DetectorId::RepositoryPort
    }

    fn priority(&self) -> Priority {
        Priority::Structural
    }

    fn detect(&self, candidate: &PortCandidate<'_>, context: &ClassificationContext) -> Vec<Signal<PortDirection>> {
        vec![if context.is_repository(candidate.qualified_name()) {
            self.fire(PortDirection::Driven, "matched as a repository port".into())
        } else {
            self.silent("not a repository port")
        }]
    }
}

/// Interfaces implemented by an application service are driving.
#[derive(Debug, Default)]
pub struct ServiceImplementationDetector;

impl PortDetector<PortDirection> for ServiceImplementationDetector {
    fn id(&self) -> DetectorId {
        DetectorId::ImplementedByService
    }

    fn priority(&self) -> Priority {
        Priority::Structural
    }

    fn detect(&self, candidate: &PortCandidate<'_>, context: &ClassificationContext) -> Vec<Signal<PortDirection>> {
        vec![match context.implementing_service(candidate.qualified_name()) {
            Some(service) => self.fire(PortDirection::Driving, format!("implemented by application service {service}")),
            None => self.silent("no application service implements it"),
        }]
    }
}

/// Driving/driven simple-name suffixes; the longest match wins.
#[derive(Debug, Default)]
pub struct DirectionNamingDetector;

impl PortDetector<PortDirection> for DirectionNamingDetector {
    fn id(&self) -> DetectorId {
        DetectorId::NamingConvention
    }

    fn priority(&self) -> Priority {
        Priority::Naming
    }

    fn detect(&self, candidate: &PortCandidate<'_>, _: &ClassificationContext) -> Vec<Signal<PortDirection>> {
        let name = candidate.simple_name();
        let driving = vocabulary::matching_suffix(name, DRIVING_PORT_SUFFIXES);
        let driven = vocabulary::matching_suffix(name, DRIVEN_PORT_SUFFIXES);

        let chosen = match (driving, driven) {
            (Some(a), Some(b)) if a.len() >= b.len() => Some((PortDirection::Driving, a)),
            (Some(_), Some(b)) => Some((PortDirection::Driven, b)),
            (Some(a), None) => Some((PortDirection::Driving, a)),
            (None, Some(b)) => Some((PortDirection::Driven, b)),
            (None, None) => None,
        };

        vec![match chosen {
            Some((direction, suffix)) => self.fire(direction, format!("name ends with '{suffix}'")),
            None => self.silent("no port naming convention"),
        }]
    }
}

/// Package segments such as `in`/`out`; the segment closest to the type wins.
#[derive(Debug, Default)]
pub struct PackageSegmentDetector;

impl PortDetector<PortDirection> for PackageSegmentDetector {
    fn id(&self) -> DetectorId {
        DetectorId::PackageConvention
    }

    fn priority(&self) -> Priority {
        Priority::Package
    }

    fn detect(&self, candidate: &PortCandidate<'_>, _: &ClassificationContext) -> Vec<Signal<PortDirection>> {
        let found = candidate.package_name().rsplit('.').find_map(|segment| {
            if DRIVING_PACKAGE_SEGMENTS.contains(&segment) {
                Some((PortDirection::Driving, segment))
            } else if DRIVEN_PACKAGE_SEGMENTS.contains(&segment) {
                Some((PortDirection::Driven, segment))
            } else {
                None
            }
        });

        vec![match found {
            Some((direction, segment)) => self.fire(direction, format!("declared in package segment '{segment}'")),
            None => self.silent("no port package convention"),
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        annotations::AnnotationFact,
        source::{ElementKind, SourceElement},
    };

    fn interface(name: &str) -> SourceElement {
        SourceElement::new(ElementKind::Interface, name)
    }

    fn votes<V: Copy>(signals: Vec<Signal<V>>) -> Vec<Option<V>> {
        signals.into_iter().map(|signal| signal.vote).collect()
    }

    #[test]
    fn kind_annotations_vote_both_ways() {
        let element = SourceElement::new(ElementKind::Class, "com.acme.Order")
            .with_annotation(AnnotationFact::new("org.jmolecules.ddd.annotation.AggregateRoot"))
            .with_annotation(AnnotationFact::new("io.archc.annotation.Entity"));
        let signals = KindAnnotationDetector.detect(&TypeCandidate::new(&element), &ClassificationContext::new());
        assert_eq!(votes(signals), vec![Some(true), Some(false)]);
    }

    #[test]
    fn aggregate_naming() {
        let context = ClassificationContext::new();
        let check = |name: &str| {
            let element = SourceElement::new(ElementKind::Class, name);
            votes(AggregateNamingDetector.detect(&TypeCandidate::new(&element), &context))
        };
        assert_eq!(check("com.acme.OrderAggregate"), vec![Some(true)]);
        assert_eq!(check("com.acme.OrderLine"), vec![Some(false)]);
        assert_eq!(check("com.acme.Order"), vec![None]);
    }

    #[test]
    fn direction_naming_and_package() {
        let context = ClassificationContext::new();
        let naming = |name: &str| {
            let element = interface(name);
            votes(DirectionNamingDetector.detect(&PortCandidate::new(&element), &context))
        };
        assert_eq!(naming("com.acme.CustomerRepository"), vec![Some(PortDirection::Driven)]);
        assert_eq!(naming("com.acme.PlaceOrderUseCase"), vec![Some(PortDirection::Driving)]);
        assert_eq!(naming("com.acme.Clock"), vec![None]);

        let element = interface("com.acme.order.port.out.Clock");
        assert_eq!(
            votes(PackageSegmentDetector.detect(&PortCandidate::new(&element), &context)),
            vec![Some(PortDirection::Driven)]
        );
    }

    #[test]
    fn conflicting_port_annotations_yield_two_signals() {
        let element = interface("com.acme.Weird")
            .with_annotation(AnnotationFact::new("io.archc.annotation.DrivingPort"))
            .with_annotation(AnnotationFact::new("io.archc.annotation.DrivenPort"));
        let signals = DirectionAnnotationDetector.detect(&PortCandidate::new(&element), &ClassificationContext::new());
        assert_eq!(
            votes(signals),
            vec![Some(PortDirection::Driving), Some(PortDirection::Driven)]
        );
    }

    #[test]
    fn repository_annotation_silences_other_port_annotations() {
        let element = interface("com.acme.Customers")
            .with_annotation(AnnotationFact::new("io.archc.annotation.DrivingPort"))
            .with_annotation(AnnotationFact::new("io.archc.annotation.Repository"));
        let signals = DirectionAnnotationDetector.detect(&PortCandidate::new(&element), &ClassificationContext::new());
        assert_eq!(votes(signals), vec![Some(PortDirection::Driven)]);
    }
}
