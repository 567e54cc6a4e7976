//! Aggregate root classifier.
//!
//! Precedence: explicit annotation > structural (repository port, child
//! reference) > naming. A heuristic `true` additionally needs the identity
//! prerequisite; without it the verdict is withdrawn. Unresolved means
//! "not an aggregate root".

use crate::domain::classify::{
    ClassificationContext, TypeCandidate,
    detectors::{
        AggregateNamingDetector, ChildEntityDetector, IdentityShapeDetector, KindAnnotationDetector,
        RepositoryManagedDetector, TypeDetector,
    },
    signal::{DetectorId, Evidence, Precedence, Priority, decide},
};

pub type AggregateRootEvidence = Evidence<bool>;

impl Evidence<bool> {
    pub fn is_aggregate_root(&self) -> bool {
        self.verdict() == Some(true)
    }
}

pub static AGGREGATE_ROOT_PRECEDENCE: Precedence = &[
    (DetectorId::ExplicitAnnotation, Priority::Explicit),
    (DetectorId::ChildEntityReference, Priority::Structural),
    (DetectorId::RepositoryPort, Priority::Structural),
    (DetectorId::NamingConvention, Priority::Naming),
];

pub struct AggregateRootClassifier {
    detectors: Vec<Box<dyn TypeDetector>>,
    prerequisite: IdentityShapeDetector,
}

impl Default for AggregateRootClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl AggregateRootClassifier {
    pub fn new() -> Self {
        Self {
            detectors: vec![
                Box::new(KindAnnotationDetector),
                Box::new(RepositoryManagedDetector),
                Box::new(ChildEntityDetector),
                Box::new(AggregateNamingDetector),
            ],
            prerequisite: IdentityShapeDetector,
        }
    }

    pub fn classify(&self, candidate: &TypeCandidate<'_>, context: &ClassificationContext) -> AggregateRootEvidence {
        let signals = self
            .detectors
            .iter()
            .flat_map(|detector| detector.detect(candidate, context))
            .collect();
        let mut evidence = decide(signals, AGGREGATE_ROOT_PRECEDENCE);

        let identity = self
            .prerequisite
            .detect(candidate, context)
            .into_iter()
            .next();
        let has_identity = identity.as_ref().is_some_and(|signal| signal.is_present());
        if let Some(signal) = identity {
            evidence.add_prerequisite(signal);
        }

        let explicit = evidence.decided_by() == Some(DetectorId::ExplicitAnnotation);
        if evidence.is_aggregate_root() && !explicit && !has_identity {
            evidence.withdraw("heuristic verdict withdrawn: no identity property");
        }
        if evidence.is_ambiguous() {
            evidence.note("conflicting signals of equal priority; not an aggregate root");
        }

        evidence
    }
}
