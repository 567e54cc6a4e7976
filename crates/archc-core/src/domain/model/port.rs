//! Port model: interfaces at the hexagon boundary.

use std::fmt;

use serde::Serialize;

use crate::domain::{
    classify::DirectionEvidence, error::DomainError, source::simple_name_of, types::TypeReference,
};

/// Which side of the hexagon a port sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PortDirection {
    /// Inbound contract the system exposes.
    Driving,
    /// Outbound contract the system requires from infrastructure.
    Driven,
}

impl PortDirection {
    pub const ALL: [PortDirection; 2] = [PortDirection::Driving, PortDirection::Driven];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Driving => "DRIVING",
            Self::Driven => "DRIVEN",
        }
    }
}

impl fmt::Display for PortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deterministic method signature: name plus canonical parameter types,
/// e.g. `save(com.acme.Customer)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SignatureId(String);

impl SignatureId {
    pub fn of(name: &str, parameter_types: &[TypeReference]) -> Self {
        let parameters: Vec<String> = parameter_types.iter().map(ToString::to_string).collect();
        Self(format!("{}({})", name, parameters.join(",")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SignatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub type_ref: TypeReference,
}

/// One method declared by a port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortMethod {
    name: String,
    return_type: TypeReference,
    parameters: Vec<Parameter>,
    is_default: bool,
    is_static: bool,
    signature_id: SignatureId,
}

impl PortMethod {
    pub fn new(
        name: impl Into<String>,
        return_type: TypeReference,
        parameters: Vec<Parameter>,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        if name.is_empty() {
            return Err(DomainError::MissingRequiredField { field: "method.name" });
        }
        let types: Vec<TypeReference> = parameters.iter().map(|p| p.type_ref.clone()).collect();
        let signature_id = SignatureId::of(&name, &types);
        Ok(Self {
            name,
            return_type,
            parameters,
            is_default: false,
            is_static: false,
            signature_id,
        })
    }

    pub fn with_modifiers(mut self, is_default: bool, is_static: bool) -> Self {
        self.is_default = is_default;
        self.is_static = is_static;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn return_type(&self) -> &TypeReference {
        &self.return_type
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Abstract methods are the contract an adapter has to implement.
    pub fn is_abstract(&self) -> bool {
        !self.is_default && !self.is_static
    }

    pub fn signature_id(&self) -> &SignatureId {
        &self.signature_id
    }
}

/// A classified port. Frozen once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Port {
    qualified_name: String,
    simple_name: String,
    direction: PortDirection,
    methods: Vec<PortMethod>,
    documentation: Option<String>,
    /// Domain type managed by a repository port.
    managed_type: Option<String>,
    #[serde(skip)]
    evidence: Option<DirectionEvidence>,
}

impl Port {
    pub fn builder() -> PortBuilder {
        PortBuilder::default()
    }

    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    pub fn simple_name(&self) -> &str {
        &self.simple_name
    }

    pub fn package_name(&self) -> &str {
        crate::domain::source::package_of(&self.qualified_name)
    }

    pub fn direction(&self) -> PortDirection {
        self.direction
    }

    pub fn methods(&self) -> &[PortMethod] {
        &self.methods
    }

    pub fn documentation(&self) -> Option<&str> {
        self.documentation.as_deref()
    }

    pub fn managed_type(&self) -> Option<&str> {
        self.managed_type.as_deref()
    }

    pub fn is_repository(&self) -> bool {
        self.managed_type.is_some()
    }

    pub fn evidence(&self) -> Option<&DirectionEvidence> {
        self.evidence.as_ref()
    }

    pub fn method(&self, signature: &str) -> Option<&PortMethod> {
        self.methods
            .iter()
            .find(|method| method.signature_id.as_str() == signature)
    }
}

#[derive(Debug, Default)]
pub struct PortBuilder {
    qualified_name: Option<String>,
    direction: Option<PortDirection>,
    methods: Vec<PortMethod>,
    documentation: Option<String>,
    managed_type: Option<String>,
    evidence: Option<DirectionEvidence>,
}

impl PortBuilder {
    pub fn qualified_name(mut self, qualified_name: impl Into<String>) -> Self {
        self.qualified_name = Some(qualified_name.into());
        self
    }

    pub fn direction(mut self, direction: PortDirection) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn method(mut self, method: PortMethod) -> Self {
        self.methods.push(method);
        self
    }

    pub fn documentation(mut self, documentation: Option<String>) -> Self {
        self.documentation = documentation;
        self
    }

    pub fn managed_type(mut self, managed_type: Option<String>) -> Self {
        self.managed_type = managed_type;
        self
    }

    pub fn evidence(mut self, evidence: DirectionEvidence) -> Self {
        self.evidence = Some(evidence);
        self
    }

    pub fn build(self) -> Result<Port, DomainError> {
        let qualified_name = self
            .qualified_name
            .filter(|name| !name.is_empty())
            .ok_or(DomainError::MissingRequiredField { field: "port.qualified_name" })?;
        let direction = self
            .direction
            .ok_or(DomainError::MissingRequiredField { field: "port.direction" })?;

        let mut seen = std::collections::HashSet::new();
        for method in &self.methods {
            if !seen.insert(method.signature_id.clone()) {
                return Err(DomainError::DuplicateMember {
                    owner: qualified_name,
                    member: method.signature_id.to_string(),
                });
            }
        }

        Ok(Port {
            simple_name: simple_name_of(&qualified_name).to_string(),
            qualified_name,
            direction,
            methods: self.methods,
            documentation: self.documentation,
            managed_type: self.managed_type,
            evidence: self.evidence,
        })
    }
}

/// All ports of one compilation, ordered by qualified name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PortModel {
    ports: Vec<Port>,
}

impl PortModel {
    pub fn new(mut ports: Vec<Port>) -> Self {
        ports.sort_by(|a, b| a.qualified_name.cmp(&b.qualified_name));
        Self { ports }
    }

    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }
}
