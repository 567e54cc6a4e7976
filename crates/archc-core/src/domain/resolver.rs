//! Resolves type references to domain types.

use crate::domain::{
    diagnostics::{Diagnostic, DiagnosticsFactory},
    index::DomainIndex,
    model::DomainType,
    types::{TypeReference, TypeSupportPolicy},
};

/// Extra validation a caller can ask for on top of the lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolutionCheck {
    #[default]
    None,
    Identifier,
    Property,
}

/// Stateless composition of the domain index, the support policy and the
/// diagnostics factory. `Copy`, so it can be handed out freely.
#[derive(Debug, Clone, Copy)]
pub struct DomainTypeResolver<'a> {
    index: &'a DomainIndex,
    policy: TypeSupportPolicy,
    factory: DiagnosticsFactory,
}

impl<'a> DomainTypeResolver<'a> {
    pub fn new(index: &'a DomainIndex) -> Self {
        Self {
            index,
            policy: TypeSupportPolicy::new(),
            factory: DiagnosticsFactory::new(),
        }
    }

    pub fn policy(&self) -> TypeSupportPolicy {
        self.policy
    }

    pub fn index(&self) -> &'a DomainIndex {
        self.index
    }

    /// Resolve a reference.
    ///
    /// - unsupported reference: `Err` with an ARCH-101 diagnostic (no subject;
    ///   the caller attaches one);
    /// - supported but unknown to the domain model: `Ok(None)`;
    /// - known: `Ok(Some(domain_type))`.
    ///
    /// The requested check runs on the reference itself, whether or not it
    /// was found.
    pub fn resolve(
        &self,
        reference: &TypeReference,
        check: ResolutionCheck,
    ) -> Result<Option<&'a DomainType>, Diagnostic> {
        if let Some(reason) = self.policy.rejection_reason(reference) {
            return Err(self.unsupported(reference, reason));
        }

        let qualified_name = match reference {
            TypeReference::Class { qualified_name }
            | TypeReference::Parameterized { qualified_name, .. } => qualified_name,
            _ => return Err(self.unsupported(reference, "only class types can be looked up")),
        };
        let found = self.index.get(qualified_name);

        match check {
            ResolutionCheck::Identifier if !self.policy.is_suitable_as_identifier(reference) => {
                Err(self.unsupported(reference, "identifiers must be simple, non-generic class types"))
            }
            ResolutionCheck::Property if !self.policy.is_suitable_as_property(reference) => {
                Err(self.unsupported(reference, "not usable as a property type"))
            }
            _ => Ok(found),
        }
    }

    fn unsupported(&self, reference: &TypeReference, reason: &str) -> Diagnostic {
        self.factory.unsupported_type(&reference.to_string(), reason)
    }
}
