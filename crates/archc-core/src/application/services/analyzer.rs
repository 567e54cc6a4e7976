//! ANALYZE phase: source elements in, classified IR out.
//!
//! Order of work within one round:
//!
//! 1. partition elements into port candidates (interfaces), domain type
//!    candidates, and implementors (application services, adapters);
//! 2. record candidate names in the classification context;
//! 3. match repository ports, record them;
//! 4. record which interfaces annotated services implement;
//! 5. resolve port directions; unresolvable interfaces are left out (ARCH-102);
//! 6. pick application services: annotated, or implementing a driving port;
//! 7. classify domain types, once each;
//! 8. derive relationships through the resolver.

use std::collections::{HashMap, HashSet};

use tracing::{debug, instrument};

use crate::domain::{
    AnnotationIndex, ApplicationModel, ApplicationService, Diagnostics, DiagnosticsFactory, DomainError,
    DomainIndex, DomainKind, DomainModel, DomainType, DomainTypeResolver, IrSnapshot, Operation, Parameter,
    Port, PortDirection, PortMethod, PortModel, Property, RelationKind, Relationship, ResolutionCheck, Round,
    SourceElement, UnresolvedInterface,
    classify::{
        AggregateRootClassifier, ClassificationContext, DirectionEvidence, PortCandidate, PortDirectionResolver,
        RepositoryPortMatcher, TypeCandidate, classify_kind, kind::is_immutable,
    },
    source::ElementKind,
    types::{Cardinality, TypeKind, unwrap_element},
    vocabulary::{self, Concept},
};
use crate::error::ArchResult;

/// Explicit relationship annotations, checked in this order.
const RELATION_CONCEPTS: [(Concept, RelationKind); 4] = [
    (Concept::OneToOne, RelationKind::OneToOne),
    (Concept::OneToMany, RelationKind::OneToMany),
    (Concept::ManyToOne, RelationKind::ManyToOne),
    (Concept::ManyToMany, RelationKind::ManyToMany),
];

struct Partition<'a> {
    interfaces: Vec<&'a SourceElement>,
    types: Vec<&'a SourceElement>,
    implementors: Vec<&'a SourceElement>,
}

impl<'a> Partition<'a> {
    /// A repeated qualified name keeps its first element.
    fn of(elements: &'a [SourceElement]) -> Self {
        let mut seen = HashSet::new();
        let mut unique = Vec::with_capacity(elements.len());
        for element in elements {
            if seen.insert(element.qualified_name.as_str()) {
                unique.push(element);
            } else {
                debug!(element = %element.qualified_name, "duplicate element ignored");
            }
        }

        let interface_names: HashSet<&str> = unique
            .iter()
            .filter(|element| element.kind == ElementKind::Interface)
            .map(|element| element.qualified_name.as_str())
            .collect();
        let service_annotations = vocabulary::annotations_for(Concept::ApplicationService);

        let mut partition = Self {
            interfaces: Vec::new(),
            types: Vec::new(),
            implementors: Vec::new(),
        };
        for element in unique {
            if element.kind == ElementKind::Interface {
                partition.interfaces.push(element);
                continue;
            }
            let is_service = element.annotation_index().has_any(service_annotations);
            let implements_port = element
                .supertypes
                .iter()
                .any(|supertype| interface_names.contains(supertype.as_str()));
            if element.kind == ElementKind::Class && (is_service || implements_port) {
                partition.implementors.push(element);
            } else {
                partition.types.push(element);
            }
        }
        partition
    }
}

/// Runs the classifiers over one round.
pub struct Analyzer {
    aggregates: AggregateRootClassifier,
    repositories: RepositoryPortMatcher,
    directions: PortDirectionResolver,
    factory: DiagnosticsFactory,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer {
    pub fn new() -> Self {
        Self {
            aggregates: AggregateRootClassifier::new(),
            repositories: RepositoryPortMatcher::new(),
            directions: PortDirectionResolver::new(),
            factory: DiagnosticsFactory::new(),
        }
    }

    /// Analyze one round. Findings go to `diagnostics`; only malformed host
    /// data (e.g. a method without a name) is an error.
    #[instrument(skip_all, fields(round = round.number, elements = round.elements.len()))]
    pub fn analyze(&self, round: &Round, diagnostics: &mut Diagnostics) -> ArchResult<IrSnapshot> {
        let partition = Partition::of(&round.elements);

        let type_candidates: Vec<TypeCandidate<'_>> =
            partition.types.iter().copied().map(TypeCandidate::new).collect();
        let port_candidates: Vec<PortCandidate<'_>> =
            partition.interfaces.iter().copied().map(PortCandidate::new).collect();

        let mut context = ClassificationContext::new();
        for candidate in &type_candidates {
            context.add_candidate(candidate);
        }

        let mut managed_types = HashMap::new();
        for candidate in &port_candidates {
            let matched = self.repositories.match_port(candidate, &context);
            if matched.evidence.is_ambiguous() {
                diagnostics.push(
                    self.factory
                        .ambiguity_resolved(candidate.qualified_name(), "not a repository"),
                );
            }
            if matched.is_repository() {
                context.add_repository(candidate.qualified_name(), matched.managed_type.as_deref());
                managed_types.insert(candidate.qualified_name(), matched.managed_type);
            }
        }

        let service_annotations = vocabulary::annotations_for(Concept::ApplicationService);
        for implementor in &partition.implementors {
            if !implementor.annotation_index().has_any(service_annotations) {
                continue;
            }
            for supertype in &implementor.supertypes {
                context.add_service_implementation(supertype, &implementor.qualified_name);
            }
        }

        let mut ports = Vec::new();
        let mut unresolved = Vec::new();
        for candidate in &port_candidates {
            let evidence = self.directions.resolve(candidate, &context);
            match evidence.verdict() {
                Some(direction) => {
                    let managed = managed_types.remove(candidate.qualified_name()).flatten();
                    ports.push(build_port(candidate.element(), direction, managed, evidence)?);
                }
                None => {
                    diagnostics.push(
                        self.factory
                            .port_direction_unresolvable(candidate.qualified_name(), &evidence.summary()),
                    );
                    unresolved.push(UnresolvedInterface {
                        qualified_name: candidate.qualified_name().to_string(),
                        evidence,
                    });
                }
            }
        }
        let ports = PortModel::new(ports);
        let application = application_model(&partition.implementors, &ports)?;

        let mut types = Vec::with_capacity(type_candidates.len());
        for candidate in &type_candidates {
            types.push(self.classify_type(candidate, &context, diagnostics)?);
        }

        let elements: HashMap<&str, &SourceElement> = partition
            .types
            .iter()
            .map(|element| (element.qualified_name.as_str(), *element))
            .collect();
        let relationships = derive_relationships(&types, &elements, diagnostics);

        debug!(
            domain_types = types.len(),
            ports = ports.len(),
            services = application.len(),
            unresolved = unresolved.len(),
            "round analyzed"
        );

        let domain = DomainModel::new(types, relationships);
        Ok(IrSnapshot::new(round.number, domain, ports, application).with_unresolved(unresolved))
    }

    fn classify_type(
        &self,
        candidate: &TypeCandidate<'_>,
        context: &ClassificationContext,
        diagnostics: &mut Diagnostics,
    ) -> Result<DomainType, DomainError> {
        let evidence = self.aggregates.classify(candidate, context);
        if evidence.is_ambiguous() {
            diagnostics.push(
                self.factory
                    .ambiguity_resolved(candidate.qualified_name(), "not an aggregate root"),
            );
        }
        let kind = classify_kind(candidate, &evidence);
        let element = candidate.element();

        DomainType::builder()
            .qualified_name(candidate.qualified_name())
            .kind(kind)
            .properties(candidate.properties().to_vec())
            .immutable(is_immutable(element))
            .documentation(element.documentation.clone())
            .evidence(evidence)
            .build()
    }
}

fn build_port(
    element: &SourceElement,
    direction: PortDirection,
    managed_type: Option<String>,
    evidence: DirectionEvidence,
) -> Result<Port, DomainError> {
    let mut builder = Port::builder()
        .qualified_name(element.qualified_name.as_str())
        .direction(direction)
        .documentation(element.documentation.clone())
        .managed_type(managed_type)
        .evidence(evidence);

    for method in &element.methods {
        let parameters = method
            .parameters
            .iter()
            .map(|parameter| Parameter {
                name: parameter.name.clone(),
                type_ref: parameter.type_ref.clone(),
            })
            .collect();
        let port_method = PortMethod::new(method.name.as_str(), method.return_type.clone(), parameters)?
            .with_modifiers(method.is_default, method.is_static);
        builder = builder.method(port_method);
    }

    builder.build()
}

/// Annotated services, plus classes implementing a driving port. A class
/// that only implements driven ports is an adapter and is skipped.
fn application_model(implementors: &[&SourceElement], ports: &PortModel) -> Result<ApplicationModel, DomainError> {
    let driving: HashSet<&str> = ports
        .ports()
        .iter()
        .filter(|port| port.direction() == PortDirection::Driving)
        .map(Port::qualified_name)
        .collect();
    let service_annotations = vocabulary::annotations_for(Concept::ApplicationService);

    let mut services = Vec::new();
    for class in implementors {
        let implements: Vec<String> = class
            .supertypes
            .iter()
            .filter(|supertype| driving.contains(supertype.as_str()))
            .cloned()
            .collect();
        if implements.is_empty() && !class.annotation_index().has_any(service_annotations) {
            continue;
        }

        let operations = class
            .methods
            .iter()
            .filter(|method| !method.is_static)
            .map(|method| {
                Operation::new(
                    method.name.as_str(),
                    method.return_type.clone(),
                    method.parameters.iter().map(|p| p.type_ref.clone()).collect(),
                )
            })
            .collect();
        services.push(ApplicationService::new(class.qualified_name.as_str(), operations, implements)?);
    }

    Ok(ApplicationModel::new(services))
}

fn derive_relationships(
    types: &[DomainType],
    elements: &HashMap<&str, &SourceElement>,
    diagnostics: &mut Diagnostics,
) -> Vec<Relationship> {
    let index = DomainIndex::build(types.iter().cloned());
    let resolver = DomainTypeResolver::new(&index);
    let mut relationships = Vec::new();

    for source in types {
        for property in source.properties() {
            if property.is_identity() {
                continue;
            }
            let (cardinality, element_type) = unwrap_element(property.type_ref());
            if matches!(element_type.kind(), TypeKind::Primitive | TypeKind::Void) {
                continue;
            }

            let target = match resolver.resolve(element_type, ResolutionCheck::Property) {
                Ok(Some(target)) => target,
                Ok(None) => continue,
                Err(diagnostic) => {
                    diagnostics
                        .push(diagnostic.with_subject(format!("{}.{}", source.qualified_name(), property.name())));
                    continue;
                }
            };

            let explicit = elements
                .get(source.qualified_name())
                .and_then(|element| explicit_relation(element, property.name()));
            if let Some(relationship) = relate(source, property, cardinality, target, &index, explicit) {
                relationships.push(relationship);
            }
        }
    }

    relationships
}

fn explicit_relation(element: &SourceElement, field: &str) -> Option<RelationKind> {
    let field = element.fields.iter().find(|candidate| candidate.name == field)?;
    let annotations = AnnotationIndex::from_slice(&field.annotations);
    RELATION_CONCEPTS
        .into_iter()
        .find(|(concept, _)| annotations.has_any(vocabulary::annotations_for(*concept)))
        .map(|(_, kind)| kind)
}

fn relate(
    source: &DomainType,
    property: &Property,
    cardinality: Cardinality,
    target: &DomainType,
    index: &DomainIndex,
    explicit: Option<RelationKind>,
) -> Option<Relationship> {
    let relationship = |target: &str, kind, by_identifier| Relationship {
        source: source.qualified_name().to_string(),
        property: property.name().to_string(),
        target: target.to_string(),
        kind,
        by_identifier,
    };

    if target.kind() == DomainKind::Identifier {
        let owner = index.owner_of_identifier(target.qualified_name())?;
        if owner.qualified_name() == source.qualified_name() || !owner.is_aggregate_root() {
            return None;
        }
        let kind = explicit.unwrap_or(match cardinality {
            Cardinality::Many => RelationKind::ManyToMany,
            Cardinality::Single | Cardinality::Optional => RelationKind::ManyToOne,
        });
        return Some(relationship(owner.qualified_name(), kind, true));
    }

    let kind = match (explicit, cardinality) {
        (Some(kind), _) => kind,
        (None, Cardinality::Many) if target.kind().has_identity() => RelationKind::OneToMany,
        (None, Cardinality::Many) if target.kind().is_value_like() => RelationKind::ElementCollection,
        (None, Cardinality::Single | Cardinality::Optional) if target.kind().has_identity() => {
            RelationKind::OneToOne
        }
        _ => return None,
    };
    Some(relationship(target.qualified_name(), kind, false))
}
