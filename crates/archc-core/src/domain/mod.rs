// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for archc.
//!
//! Pure analysis logic: the type model, the architectural vocabulary, the
//! models and their indexes, the classifiers, the resolver, diagnostics,
//! artifacts and the custom-block merge. No I/O and no logging; everything
//! that touches the outside world goes through the ports of the
//! application layer.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: domain logic is synchronous
//! - **No I/O**: no filesystem, network or host calls
//! - **Immutable results**: models, indexes and evidence are frozen once built
//! - **Fallible construction**: builders return `Result<_, DomainError>`

pub mod annotations;
pub mod artifact;
pub mod classify;
pub mod diagnostics;
pub mod error;
pub mod index;
pub mod ir;
pub mod merge;
pub mod model;
pub mod naming;
pub mod resolver;
pub mod session;
pub mod source;
pub mod types;
pub mod vocabulary;

pub use annotations::{AnnotationFact, AnnotationIndex, AnnotationValue};
pub use artifact::{
    ArtifactBuilder, ArtifactContent, ArtifactHeader, ArtifactKind, ArtifactPath, CommentStyle,
    GeneratedArtifact, MergeMode, OutputLayout,
};
pub use classify::{AggregateRootEvidence, DetectorId, DirectionEvidence, Evidence, Priority, Signal};
pub use diagnostics::{
    Diagnostic, DiagnosticCode, DiagnosticReporter, Diagnostics, DiagnosticsFactory, Severity, codes,
};
pub use error::{DomainError, ErrorCategory};
pub use index::{DomainIndex, PortIndex};
pub use ir::{IrSnapshot, UnresolvedInterface};
pub use merge::{CustomBlocks, MergeInput, MergeOutcome, merge_custom_blocks};
pub use model::{
    ApplicationModel, ApplicationService, DomainKind, DomainModel, DomainType, Operation, Parameter,
    Port, PortDirection, PortMethod, PortModel, Property, RelationKind, Relationship, SignatureId,
};
pub use naming::NamingConventions;
pub use resolver::{DomainTypeResolver, ResolutionCheck};
pub use session::{CompilationSession, SessionConfig};
pub use source::{ElementKind, FieldFact, MethodFact, ParameterFact, Round, SourceElement, SourceSet};
pub use types::{Cardinality, TypeKind, TypeReference, TypeSupportPolicy, TypeSystem};
