//! VALIDATE phase: architectural rules over a finished IR snapshot.

use tracing::{debug, instrument};

use crate::domain::{
    Diagnostic, DiagnosticsFactory, DomainType, IrSnapshot, ResolutionCheck, TypeKind,
};

/// Checks one snapshot. Stateless; the same validator serves every round.
#[derive(Debug, Default, Clone, Copy)]
pub struct Validator {
    factory: DiagnosticsFactory,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// All findings, in rule order: identity rules per type, repository
    /// rules per port, then aggregate boundaries per relationship.
    #[instrument(skip_all, fields(round = ir.round()))]
    pub fn validate(&self, ir: &IrSnapshot) -> Vec<Diagnostic> {
        let mut findings = Vec::new();

        for domain_type in ir.domain().types() {
            findings.extend(self.check_identity(ir, domain_type));
        }
        self.check_repositories(ir, &mut findings);
        self.check_aggregate_boundaries(ir, &mut findings);

        debug!(findings = findings.len(), "snapshot validated");
        findings
    }

    /// ARCH-108 and ARCH-106.
    fn check_identity(&self, ir: &IrSnapshot, domain_type: &DomainType) -> Option<Diagnostic> {
        if !domain_type.kind().has_identity() {
            return None;
        }
        let Some(identity) = domain_type.identity() else {
            return Some(
                self.factory
                    .missing_identity(domain_type.qualified_name(), domain_type.kind().as_str()),
            );
        };

        // Primitive keys are accepted as identifiers.
        if identity.type_ref().kind() == TypeKind::Primitive {
            return None;
        }
        ir.resolver()
            .resolve(identity.type_ref(), ResolutionCheck::Identifier)
            .err()
            .map(|_| {
                self.factory.identity_not_identifier(
                    domain_type.qualified_name(),
                    identity.name(),
                    &identity.type_ref().to_string(),
                )
            })
    }

    /// ARCH-105. A managed type outside the domain model is not checked.
    fn check_repositories(&self, ir: &IrSnapshot, findings: &mut Vec<Diagnostic>) {
        for port in ir.ports().ports() {
            let Some(managed) = port.managed_type() else {
                continue;
            };
            let is_root = ir.domain_index().get(managed).map(DomainType::is_aggregate_root);
            if is_root == Some(false) {
                findings.push(
                    self.factory
                        .repository_manages_non_root(port.qualified_name(), managed),
                );
            }
        }
    }

    /// ARCH-202.
    fn check_aggregate_boundaries(&self, ir: &IrSnapshot, findings: &mut Vec<Diagnostic>) {
        for relationship in ir.domain().relationships() {
            let target_is_root = ir
                .domain_index()
                .get(&relationship.target)
                .is_some_and(DomainType::is_aggregate_root);
            if relationship.crosses_aggregate_by_object(target_is_root) {
                findings.push(self.factory.inter_aggregate_reference(
                    &relationship.source,
                    &relationship.property,
                    &relationship.target,
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        ApplicationModel, DomainKind, DomainModel, Port, PortDirection, PortModel, Property, RelationKind,
        Relationship, TypeReference, codes,
    };

    fn parse(input: &str) -> TypeReference {
        TypeReference::parse(input).unwrap()
    }

    fn root(name: &str, identity: Option<&str>) -> DomainType {
        let mut builder = DomainType::builder().qualified_name(name).kind(DomainKind::AggregateRoot);
        if let Some(type_text) = identity {
            builder = builder.property(Property::new("id", parse(type_text)).identity());
        }
        builder.build().unwrap()
    }

    fn snapshot(types: Vec<DomainType>, relationships: Vec<Relationship>, ports: Vec<Port>) -> IrSnapshot {
        IrSnapshot::new(
            1,
            DomainModel::new(types, relationships),
            PortModel::new(ports),
            ApplicationModel::default(),
        )
    }

    fn codes_of(findings: &[Diagnostic]) -> Vec<String> {
        findings.iter().map(|d| d.code().to_string()).collect()
    }

    #[test]
    fn clean_model_has_no_findings() {
        let ir = snapshot(
            vec![root("com.acme.Order", Some("com.acme.OrderId")), root("com.acme.Line", Some("long"))],
            vec![],
            vec![],
        );

        assert!(Validator::new().validate(&ir).is_empty());
    }

    #[test]
    fn root_without_identity_is_a_warning() {
        let ir = snapshot(vec![root("com.acme.Order", None)], vec![], vec![]);
        let findings = Validator::new().validate(&ir);

        assert_eq!(codes_of(&findings), vec!["ARCH-108"]);
        assert!(!findings[0].is_error());
    }

    #[test]
    fn generic_identity_is_not_an_identifier() {
        let ir = snapshot(
            vec![root("com.acme.Order", Some("java.util.List<java.lang.String>"))],
            vec![],
            vec![],
        );
        let findings = Validator::new().validate(&ir);

        assert_eq!(findings[0].code(), &codes::identity_not_identifier());
        assert_eq!(findings[0].subject(), Some("com.acme.Order"));
    }

    #[test]
    fn repository_of_a_value_object_is_flagged() {
        let money = DomainType::builder()
            .qualified_name("com.acme.Money")
            .kind(DomainKind::ValueObject)
            .build()
            .unwrap();
        let port = Port::builder()
            .qualified_name("com.acme.MoneyRepository")
            .direction(PortDirection::Driven)
            .managed_type(Some("com.acme.Money".into()))
            .build()
            .unwrap();
        let ir = snapshot(vec![money], vec![], vec![port]);

        assert_eq!(codes_of(&Validator::new().validate(&ir)), vec!["ARCH-105"]);
    }

    #[test]
    fn object_reference_across_aggregates_is_an_error() {
        let relationship = |by_identifier| Relationship {
            source: "com.acme.Order".into(),
            property: "customer".into(),
            target: "com.acme.Customer".into(),
            kind: RelationKind::ManyToOne,
            by_identifier,
        };
        let types = || {
            vec![
                root("com.acme.Order", Some("com.acme.OrderId")),
                root("com.acme.Customer", Some("com.acme.CustomerId")),
            ]
        };

        let by_object = snapshot(types(), vec![relationship(false)], vec![]);
        let findings = Validator::new().validate(&by_object);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].code(), &codes::inter_aggregate_reference());
        assert!(findings[0].is_error());

        let by_id = snapshot(types(), vec![relationship(true)], vec![]);
        assert!(Validator::new().validate(&by_id).is_empty());
    }
}
