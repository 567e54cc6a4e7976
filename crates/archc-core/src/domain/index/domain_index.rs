use std::collections::HashMap;

use crate::domain::{
    index::PackageMap,
    model::{DomainKind, DomainType},
};

/// Immutable lookup over the domain types of one round.
#[derive(Debug, Clone, Default)]
pub struct DomainIndex {
    types: Vec<DomainType>,
    by_name: HashMap<String, usize>,
    by_simple_name: HashMap<String, Vec<usize>>,
    by_kind: HashMap<DomainKind, Vec<usize>>,
    by_package: PackageMap,
    /// Identity property type -> owning type.
    by_identity_type: HashMap<String, usize>,
}

impl DomainIndex {
    /// Build the index. A repeated qualified name keeps its first type.
    pub fn build(types: impl IntoIterator<Item = DomainType>) -> Self {
        let mut index = Self::default();

        for domain_type in types {
            if index.by_name.contains_key(domain_type.qualified_name()) {
                continue;
            }
            let position = index.types.len();

            index
                .by_name
                .insert(domain_type.qualified_name().to_string(), position);
            index
                .by_simple_name
                .entry(domain_type.simple_name().to_string())
                .or_default()
                .push(position);
            index
                .by_kind
                .entry(domain_type.kind())
                .or_default()
                .push(position);
            index.by_package.insert(domain_type.package_name(), position);
            if let Some(identity) = domain_type.identity() {
                index
                    .by_identity_type
                    .entry(identity.type_ref().qualified_name())
                    .or_insert(position);
            }

            index.types.push(domain_type);
        }

        index
    }

    pub fn get(&self, qualified_name: &str) -> Option<&DomainType> {
        self.by_name.get(qualified_name).map(|&position| &self.types[position])
    }

    pub fn contains(&self, qualified_name: &str) -> bool {
        self.by_name.contains_key(qualified_name)
    }

    pub fn find_by_simple_name(&self, simple_name: &str) -> Vec<&DomainType> {
        self.resolve(self.by_simple_name.get(simple_name).map_or(&[], Vec::as_slice))
    }

    pub fn find_by_kind(&self, kind: DomainKind) -> Vec<&DomainType> {
        self.resolve(self.by_kind.get(&kind).map_or(&[], Vec::as_slice))
    }

    pub fn count_by_kind(&self, kind: DomainKind) -> usize {
        self.by_kind.get(&kind).map_or(0, Vec::len)
    }

    pub fn aggregate_roots(&self) -> Vec<&DomainType> {
        self.find_by_kind(DomainKind::AggregateRoot)
    }

    pub fn find_by_package(&self, package: &str) -> Vec<&DomainType> {
        self.resolve(self.by_package.exact(package))
    }

    pub fn find_by_package_prefix(&self, prefix: &str) -> Vec<&DomainType> {
        self.by_package
            .with_prefix(prefix)
            .map(|position| &self.types[position])
            .collect()
    }

    /// Type whose identity property has the given type (`OrderId` -> `Order`).
    pub fn owner_of_identifier(&self, identifier_type: &str) -> Option<&DomainType> {
        self.by_identity_type
            .get(identifier_type)
            .map(|&position| &self.types[position])
    }

    pub fn iter(&self) -> impl Iterator<Item = &DomainType> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    fn resolve(&self, positions: &[usize]) -> Vec<&DomainType> {
        positions.iter().map(|&position| &self.types[position]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{model::Property, types::TypeReference};

    fn domain_type(name: &str, kind: DomainKind) -> DomainType {
        DomainType::builder()
            .qualified_name(name)
            .kind(kind)
            .build()
            .unwrap()
    }

    #[test]
    fn kind_groups_and_counts() {
        let index = DomainIndex::build(vec![
            domain_type("com.acme.order.Order", DomainKind::AggregateRoot),
            domain_type("com.acme.order.OrderLine", DomainKind::Entity),
            domain_type("com.acme.order.Money", DomainKind::ValueObject),
            domain_type("com.acme.customer.Customer", DomainKind::AggregateRoot),
        ]);

        assert_eq!(index.aggregate_roots().len(), 2);
        assert_eq!(index.count_by_kind(DomainKind::Entity), 1);
        assert_eq!(index.count_by_kind(DomainKind::Enumeration), 0);
        assert_eq!(index.find_by_package_prefix("com.acme.order").len(), 3);
        assert_eq!(index.find_by_simple_name("Money").len(), 1);
    }

    #[test]
    fn identifier_owner_lookup() {
        let order = DomainType::builder()
            .qualified_name("com.acme.Order")
            .kind(DomainKind::AggregateRoot)
            .property(Property::new("id", TypeReference::class("com.acme.OrderId")).identity())
            .build()
            .unwrap();
        let index = DomainIndex::build(vec![order]);

        assert_eq!(
            index
                .owner_of_identifier("com.acme.OrderId")
                .map(DomainType::simple_name),
            Some("Order")
        );
        assert!(index.owner_of_identifier("com.acme.CustomerId").is_none());
    }
}
