//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `archc-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `Filesystem`: File operations
//!   - `PluginCatalog`: Plugin discovery
//!   - `SourceHost`: Source elements per round
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - `PipelineOrchestrator` is driven directly by the CLI

pub mod output;

pub use output::{Filesystem, PluginCatalog, SourceHost};

#[cfg(test)]
pub use output::MockPluginCatalog;
