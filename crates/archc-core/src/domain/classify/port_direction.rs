//! Port direction resolver.
//!
//! "Unresolvable" is a legitimate outcome: when no signal fires, or equally
//! strong signals disagree, the resolver reports `None` and the interface is
//! left out of the port model.

use crate::domain::{
    classify::{
        ClassificationContext, PortCandidate,
        detectors::{
            DirectionAnnotationDetector, DirectionNamingDetector, PackageSegmentDetector, PortDetector,
            RepositoryDirectionDetector, ServiceImplementationDetector,
        },
        signal::{DetectorId, Evidence, Precedence, Priority, decide},
    },
    model::PortDirection,
};

pub type DirectionEvidence = Evidence<PortDirection>;

pub static DIRECTION_PRECEDENCE: Precedence = &[
    (DetectorId::ExplicitAnnotation, Priority::Explicit),
    (DetectorId::ImplementedByService, Priority::Structural),
    (DetectorId::RepositoryPort, Priority::Structural),
    (DetectorId::NamingConvention, Priority::Naming),
    (DetectorId::PackageConvention, Priority::Package),
];

pub struct PortDirectionResolver {
    detectors: Vec<Box<dyn PortDetector<PortDirection>>>,
}

impl Default for PortDirectionResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl PortDirectionResolver {
    pub fn new() -> Self {
        Self {
            detectors: vec![
                Box::new(DirectionAnnotationDetector),
                Box::new(ServiceImplementationDetector),
                Box::new(RepositoryDirectionDetector),
                Box::new(DirectionNamingDetector),
                Box::new(PackageSegmentDetector),
            ],
        }
    }

    pub fn resolve(&self, candidate: &PortCandidate<'_>, context: &ClassificationContext) -> DirectionEvidence {
        let signals = self
            .detectors
            .iter()
            .flat_map(|detector| detector.detect(candidate, context))
            .collect();
        decide(signals, DIRECTION_PRECEDENCE)
    }
}
