//! Architectural vocabulary registry.
//!
//! # Design
//!
//! Every convention the detectors understand is described exactly once in
//! this module: accepted annotation names per concept, simple-name suffixes,
//! and package segments. Detectors only ever look things up here, so adding
//! a convention means adding one table entry.
//!
//! Annotation names cover jMolecules and the `io.archc.annotation`
//! namespace.

/// Concepts the compiler can recognise from explicit annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Concept {
    AggregateRoot,
    Entity,
    ValueObject,
    Identity,
    DomainEvent,
    Repository,
    DrivingPort,
    DrivenPort,
    ApplicationService,
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
}

/// Accepted annotation names for one concept.
#[derive(Debug, Clone, Copy)]
pub struct ConceptDef {
    pub concept: Concept,
    pub annotations: &'static [&'static str],
}

/// Single source of truth for annotation names.
pub static CONCEPT_REGISTRY: &[ConceptDef] = &[
    ConceptDef {
        concept: Concept::AggregateRoot,
        annotations: &[
            "org.jmolecules.ddd.annotation.AggregateRoot",
            "io.archc.annotation.AggregateRoot",
        ],
    },
    ConceptDef {
        concept: Concept::Entity,
        annotations: &[
            "org.jmolecules.ddd.annotation.Entity",
            "io.archc.annotation.Entity",
        ],
    },
    ConceptDef {
        concept: Concept::ValueObject,
        annotations: &[
            "org.jmolecules.ddd.annotation.ValueObject",
            "io.archc.annotation.ValueObject",
        ],
    },
    ConceptDef {
        concept: Concept::Identity,
        annotations: &[
            "org.jmolecules.ddd.annotation.Identity",
            "io.archc.annotation.Identity",
        ],
    },
    ConceptDef {
        concept: Concept::DomainEvent,
        annotations: &[
            "org.jmolecules.event.annotation.DomainEvent",
            "io.archc.annotation.DomainEvent",
        ],
    },
    ConceptDef {
        concept: Concept::Repository,
        annotations: &[
            "org.jmolecules.ddd.annotation.Repository",
            "io.archc.annotation.Repository",
        ],
    },
    ConceptDef {
        concept: Concept::DrivingPort,
        annotations: &[
            "org.jmolecules.architecture.hexagonal.PrimaryPort",
            "io.archc.annotation.DrivingPort",
        ],
    },
    ConceptDef {
        concept: Concept::DrivenPort,
        annotations: &[
            "org.jmolecules.architecture.hexagonal.SecondaryPort",
            "io.archc.annotation.DrivenPort",
        ],
    },
    ConceptDef {
        concept: Concept::ApplicationService,
        annotations: &[
            "org.jmolecules.ddd.annotation.Service",
            "io.archc.annotation.ApplicationService",
        ],
    },
    ConceptDef {
        concept: Concept::OneToOne,
        annotations: &["io.archc.annotation.OneToOne"],
    },
    ConceptDef {
        concept: Concept::OneToMany,
        annotations: &["io.archc.annotation.OneToMany"],
    },
    ConceptDef {
        concept: Concept::ManyToOne,
        annotations: &["io.archc.annotation.ManyToOne"],
    },
    ConceptDef {
        concept: Concept::ManyToMany,
        annotations: &["io.archc.annotation.ManyToMany"],
    },
];

/// Annotation names registered for a concept.
pub fn annotations_for(concept: Concept) -> &'static [&'static str] {
    CONCEPT_REGISTRY
        .iter()
        .find(|def| def.concept == concept)
        .map_or(&[], |def| def.annotations)
}

// ── Naming conventions ───────────────────────────────────────────────────────

/// Simple-name suffixes of interfaces the system requires from infrastructure.
pub static DRIVEN_PORT_SUFFIXES: &[&str] = &[
    "Repository",
    "Gateway",
    "Client",
    "Publisher",
    "Store",
    "Notifier",
    "Sender",
    "Provider",
];

/// Simple-name suffixes of interfaces the system exposes.
pub static DRIVING_PORT_SUFFIXES: &[&str] =
    &["UseCase", "Service", "Facade", "Api", "Query", "Command", "Handler"];

/// Suffix marking a persistence port.
pub static REPOSITORY_SUFFIX: &str = "Repository";

/// Method name prefixes of repository writes.
pub static REPOSITORY_WRITE_VERBS: &[&str] = &["save", "store", "delete", "remove"];

/// Method name prefixes of repository reads.
pub static REPOSITORY_READ_VERBS: &[&str] = &["find", "get", "load", "exists", "count"];

/// Package segments marking inbound ports.
pub static DRIVING_PACKAGE_SEGMENTS: &[&str] =
    &["in", "inbound", "driving", "primary", "api", "usecase", "usecases"];

/// Package segments marking outbound ports.
pub static DRIVEN_PACKAGE_SEGMENTS: &[&str] =
    &["out", "outbound", "driven", "secondary", "spi", "persistence"];

/// Simple-name suffixes hinting that a type is an aggregate root.
pub static AGGREGATE_ROOT_SUFFIXES: &[&str] = &["Aggregate", "AggregateRoot", "Root"];

/// Simple-name suffixes hinting that a type is a child entity.
pub static CHILD_ENTITY_SUFFIXES: &[&str] = &["Line", "Item", "Entry", "Detail", "Entity"];

/// Suffix of identifier types (`OrderId`).
pub static IDENTIFIER_SUFFIX: &str = "Id";

/// Suffix of domain event types (`OrderPlaced` does not match; `OrderPlacedEvent` does).
pub static EVENT_SUFFIX: &str = "Event";

/// Field names treated as identity when no annotation says otherwise.
pub static IDENTITY_FIELD_NAMES: &[&str] = &["id"];

/// Qualified names of collection types whose single type argument is the
/// element type.
pub static COLLECTION_TYPES: &[&str] = &[
    "java.util.List",
    "java.util.Set",
    "java.util.SortedSet",
    "java.util.Collection",
    "java.util.Queue",
    "java.util.Deque",
    "java.lang.Iterable",
    "java.util.stream.Stream",
];

/// Qualified names of optional wrappers.
pub static OPTIONAL_TYPES: &[&str] = &["java.util.Optional"];

/// Whether a method name is `verb` or starts with `verb` followed by an
/// uppercase letter (`find`, `findById`; not `finder`).
pub fn starts_with_verb(method_name: &str, verb: &str) -> bool {
    method_name == verb
        || method_name
            .strip_prefix(verb)
            .is_some_and(|rest| rest.starts_with(|c: char| c.is_uppercase()))
}

/// Whether `simple_name` ends with `suffix` and has something before it.
pub fn has_suffix(simple_name: &str, suffix: &str) -> bool {
    simple_name.len() > suffix.len() && simple_name.ends_with(suffix)
}

/// Return the first suffix from `suffixes` that `simple_name` carries.
///
/// Longer suffixes are tried first so `OrderAggregateRoot` reports
/// `AggregateRoot`, not `Root`.
pub fn matching_suffix(simple_name: &str, suffixes: &[&'static str]) -> Option<&'static str> {
    let mut ordered: Vec<&'static str> = suffixes.to_vec();
    ordered.sort_by_key(|suffix| std::cmp::Reverse(suffix.len()));
    ordered
        .into_iter()
        .find(|suffix| has_suffix(simple_name, suffix))
}
