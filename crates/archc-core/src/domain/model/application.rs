//! Application model. Informational only: nothing in generation keys off it.

use serde::Serialize;

use crate::domain::{
    error::DomainError,
    model::port::SignatureId,
    source::simple_name_of,
    types::TypeReference,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Operation {
    pub name: String,
    pub return_type: TypeReference,
    pub parameter_types: Vec<TypeReference>,
    pub signature_id: SignatureId,
}

impl Operation {
    pub fn new(name: impl Into<String>, return_type: TypeReference, parameter_types: Vec<TypeReference>) -> Self {
        let name = name.into();
        let signature_id = SignatureId::of(&name, &parameter_types);
        Self {
            name,
            return_type,
            parameter_types,
            signature_id,
        }
    }
}

/// An orchestration-layer unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationService {
    qualified_name: String,
    simple_name: String,
    operations: Vec<Operation>,
    /// Driving ports this service implements.
    implements: Vec<String>,
}

impl ApplicationService {
    pub fn new(
        qualified_name: impl Into<String>,
        operations: Vec<Operation>,
        implements: Vec<String>,
    ) -> Result<Self, DomainError> {
        let qualified_name = qualified_name.into();
        if qualified_name.is_empty() {
            return Err(DomainError::MissingRequiredField { field: "service.qualified_name" });
        }
        Ok(Self {
            simple_name: simple_name_of(&qualified_name).to_string(),
            qualified_name,
            operations,
            implements,
        })
    }

    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    pub fn simple_name(&self) -> &str {
        &self.simple_name
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn implements(&self) -> &[String] {
        &self.implements
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplicationModel {
    services: Vec<ApplicationService>,
}

impl ApplicationModel {
    pub fn new(mut services: Vec<ApplicationService>) -> Self {
        services.sort_by(|a, b| a.qualified_name.cmp(&b.qualified_name));
        Self { services }
    }

    pub fn services(&self) -> &[ApplicationService] {
        &self.services
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}
