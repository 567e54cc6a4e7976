//! Per-round lookup structures over the extracted models.
//!
//! Indexes are built once from a finished model, in O(n), and expose no
//! mutators. A new round builds new indexes; nothing is patched in place.
//! Entries are stored once and referenced by position from every key map.

pub mod domain_index;
pub mod port_index;

use std::collections::BTreeMap;

pub use domain_index::DomainIndex;
pub use port_index::PortIndex;

/// Package name -> positions, ordered so that a package prefix selects a
/// contiguous range.
#[derive(Debug, Clone, Default)]
pub(crate) struct PackageMap {
    packages: BTreeMap<String, Vec<usize>>,
}

impl PackageMap {
    pub(crate) fn insert(&mut self, package: &str, position: usize) {
        self.packages
            .entry(package.to_string())
            .or_default()
            .push(position);
    }

    pub(crate) fn exact(&self, package: &str) -> &[usize] {
        self.packages.get(package).map_or(&[], Vec::as_slice)
    }

    /// Positions in `prefix` and every sub-package of it, in package order.
    ///
    /// `com.acme` matches `com.acme` and `com.acme.order`, not `com.acmex`.
    pub(crate) fn with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = usize> + 'a {
        self.packages
            .range(prefix.to_string()..)
            .take_while(move |(package, _)| package.starts_with(prefix))
            .filter(move |(package, _)| {
                prefix.is_empty()
                    || package.len() == prefix.len()
                    || package.as_bytes().get(prefix.len()) == Some(&b'.')
            })
            .flat_map(|(_, positions)| positions.iter().copied())
    }
}
