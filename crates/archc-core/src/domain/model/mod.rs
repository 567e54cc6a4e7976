//! The three sibling models composed into the IR.

pub mod application;
pub mod domain_type;
pub mod port;

pub use application::{ApplicationModel, ApplicationService, Operation};
pub use domain_type::{
    DomainKind, DomainModel, DomainType, DomainTypeBuilder, Property, RelationKind, Relationship,
};
pub use port::{Parameter, Port, PortBuilder, PortDirection, PortMethod, PortModel, SignatureId};
