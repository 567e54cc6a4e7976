use std::collections::HashMap;

use crate::domain::{
    index::PackageMap,
    model::{Port, PortDirection},
};

/// Immutable lookup over the ports of one round.
#[derive(Debug, Clone, Default)]
pub struct PortIndex {
    ports: Vec<Port>,
    by_name: HashMap<String, usize>,
    by_simple_name: HashMap<String, Vec<usize>>,
    driving: Vec<usize>,
    driven: Vec<usize>,
    by_package: PackageMap,
    by_managed_type: HashMap<String, Vec<usize>>,
}

impl PortIndex {
    /// Build the index. A repeated qualified name keeps its first port.
    pub fn build(ports: impl IntoIterator<Item = Port>) -> Self {
        let mut index = Self::default();

        for port in ports {
            if index.by_name.contains_key(port.qualified_name()) {
                continue;
            }
            let position = index.ports.len();

            index.by_name.insert(port.qualified_name().to_string(), position);
            index
                .by_simple_name
                .entry(port.simple_name().to_string())
                .or_default()
                .push(position);
            match port.direction() {
                PortDirection::Driving => index.driving.push(position),
                PortDirection::Driven => index.driven.push(position),
            }
            index.by_package.insert(port.package_name(), position);
            if let Some(managed) = port.managed_type() {
                index
                    .by_managed_type
                    .entry(managed.to_string())
                    .or_default()
                    .push(position);
            }

            index.ports.push(port);
        }

        index
    }

    pub fn get(&self, qualified_name: &str) -> Option<&Port> {
        self.by_name.get(qualified_name).map(|&position| &self.ports[position])
    }

    pub fn contains(&self, qualified_name: &str) -> bool {
        self.by_name.contains_key(qualified_name)
    }

    pub fn find_by_simple_name(&self, simple_name: &str) -> Vec<&Port> {
        self.resolve(self.by_simple_name.get(simple_name).map_or(&[], Vec::as_slice))
    }

    pub fn find_by_direction(&self, direction: PortDirection) -> Vec<&Port> {
        self.resolve(self.direction_positions(direction))
    }

    pub fn count_by_direction(&self, direction: PortDirection) -> usize {
        self.direction_positions(direction).len()
    }

    pub fn driving_port_count(&self) -> usize {
        self.driving.len()
    }

    pub fn driven_port_count(&self) -> usize {
        self.driven.len()
    }

    pub fn find_by_package(&self, package: &str) -> Vec<&Port> {
        self.resolve(self.by_package.exact(package))
    }

    /// Ports in `prefix` or any of its sub-packages.
    pub fn find_by_package_prefix(&self, prefix: &str) -> Vec<&Port> {
        self.by_package
            .with_prefix(prefix)
            .map(|position| &self.ports[position])
            .collect()
    }

    /// Repository ports managing the given domain type.
    pub fn repositories_for(&self, domain_type: &str) -> Vec<&Port> {
        self.resolve(self.by_managed_type.get(domain_type).map_or(&[], Vec::as_slice))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Port> {
        self.ports.iter()
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    fn direction_positions(&self, direction: PortDirection) -> &[usize] {
        match direction {
            PortDirection::Driving => &self.driving,
            PortDirection::Driven => &self.driven,
        }
    }

    fn resolve(&self, positions: &[usize]) -> Vec<&Port> {
        positions.iter().map(|&position| &self.ports[position]).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn port(name: &str, direction: PortDirection) -> Port {
        Port::builder()
            .qualified_name(name)
            .direction(direction)
            .build()
            .unwrap()
    }

    fn sample() -> Vec<Port> {
        vec![
            port("com.acme.order.port.in.PlaceOrderUseCase", PortDirection::Driving),
            port("com.acme.order.port.out.OrderRepository", PortDirection::Driven),
            port("com.acme.billing.InvoiceGateway", PortDirection::Driven),
            port("com.acme.billing.BillingFacade", PortDirection::Driving),
            port("com.acme.order.port.out.OrderPublisher", PortDirection::Driven),
        ]
    }

    #[test]
    fn directions_partition_the_ports() {
        let ports = sample();
        let index = PortIndex::build(ports.clone());

        let driving = index.find_by_direction(PortDirection::Driving);
        let driven = index.find_by_direction(PortDirection::Driven);

        let recovered: HashSet<&str> = driving
            .iter()
            .chain(driven.iter())
            .map(|port| port.qualified_name())
            .collect();
        let original: HashSet<&str> = ports.iter().map(Port::qualified_name).collect();

        assert_eq!(recovered, original);
        assert_eq!(driving.len() + driven.len(), ports.len());
        assert_eq!(index.count_by_direction(PortDirection::Driving), driving.len());
        assert_eq!(index.count_by_direction(PortDirection::Driven), driven.len());
        assert_eq!(index.driven_port_count(), 3);
        assert_eq!(index.driving_port_count(), 2);
    }

    #[test]
    fn duplicate_names_are_indexed_once() {
        let mut ports = sample();
        ports.push(port("com.acme.billing.InvoiceGateway", PortDirection::Driving));
        let index = PortIndex::build(ports);

        assert_eq!(index.len(), 5);
        assert_eq!(
            index.get("com.acme.billing.InvoiceGateway").map(Port::direction),
            Some(PortDirection::Driven)
        );
    }

    #[test]
    fn package_lookups() {
        let index = PortIndex::build(sample());

        assert_eq!(index.find_by_package("com.acme.billing").len(), 2);
        assert_eq!(index.find_by_package_prefix("com.acme.order").len(), 3);
        assert_eq!(index.find_by_package_prefix("com.acme").len(), 5);
        assert!(index.find_by_package_prefix("com.acm").is_empty());
    }

    #[test]
    fn simple_name_and_repository_lookups() {
        let repository = Port::builder()
            .qualified_name("com.acme.CustomerRepository")
            .direction(PortDirection::Driven)
            .managed_type(Some("com.acme.Customer".into()))
            .build()
            .unwrap();
        let index = PortIndex::build(vec![repository]);

        assert_eq!(index.find_by_simple_name("CustomerRepository").len(), 1);
        assert_eq!(index.repositories_for("com.acme.Customer").len(), 1);
        assert!(index.repositories_for("com.acme.Order").is_empty());
    }
}
