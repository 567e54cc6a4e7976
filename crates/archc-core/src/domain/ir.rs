//! The intermediate representation of one round.

use serde::Serialize;

use crate::domain::{
    classify::DirectionEvidence,
    index::{DomainIndex, PortIndex},
    model::{ApplicationModel, DomainModel, PortModel},
    resolver::DomainTypeResolver,
    types::TypeSystem,
};

/// An interface the direction resolver could not place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedInterface {
    pub qualified_name: String,
    #[serde(skip)]
    pub evidence: DirectionEvidence,
}

/// Immutable snapshot of the analyzed and classified models of one round.
///
/// The indexes are built here, once, from the finished models.
#[derive(Debug, Clone, Serialize)]
pub struct IrSnapshot {
    round: u32,
    domain: DomainModel,
    ports: PortModel,
    application: ApplicationModel,
    unresolved: Vec<UnresolvedInterface>,
    #[serde(skip)]
    domain_index: DomainIndex,
    #[serde(skip)]
    port_index: PortIndex,
}

impl IrSnapshot {
    pub fn new(round: u32, domain: DomainModel, ports: PortModel, application: ApplicationModel) -> Self {
        let domain_index = DomainIndex::build(domain.types().iter().cloned());
        let port_index = PortIndex::build(ports.ports().iter().cloned());
        Self {
            round,
            domain,
            ports,
            application,
            unresolved: Vec::new(),
            domain_index,
            port_index,
        }
    }

    pub fn with_unresolved(mut self, mut unresolved: Vec<UnresolvedInterface>) -> Self {
        unresolved.sort_by(|a, b| a.qualified_name.cmp(&b.qualified_name));
        self.unresolved = unresolved;
        self
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn domain(&self) -> &DomainModel {
        &self.domain
    }

    pub fn ports(&self) -> &PortModel {
        &self.ports
    }

    pub fn application(&self) -> &ApplicationModel {
        &self.application
    }

    pub fn unresolved(&self) -> &[UnresolvedInterface] {
        &self.unresolved
    }

    pub fn domain_index(&self) -> &DomainIndex {
        &self.domain_index
    }

    pub fn port_index(&self) -> &PortIndex {
        &self.port_index
    }

    pub fn resolver(&self) -> DomainTypeResolver<'_> {
        DomainTypeResolver::new(&self.domain_index)
    }

    pub fn type_system(&self) -> TypeSystem<'_> {
        TypeSystem::new(self.resolver())
    }

    pub fn is_empty(&self) -> bool {
        self.domain.is_empty() && self.ports.is_empty() && self.application.is_empty()
    }
}
