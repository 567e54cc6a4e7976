//! Application layer for archc.
//!
//! This layer contains:
//! - **Services**: one per pipeline phase, sequenced by the `PipelineOrchestrator`
//! - **Plugins**: the `Plugin` trait, execution plan and plugin context
//! - **Options**: per-plugin configuration resolved once per session
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! analysis rules itself. Those live in `crate::domain`.

pub mod error;
pub mod options;
pub mod plugin;
pub mod ports;
pub mod services;

pub use services::{
    Analyzer, ArtifactWriter, CompilationSummary, Generator, Phase, PipelineOrchestrator, RoundReport, Validator,
    WriteOutcome, WriteStatus,
};

pub use options::{OptionValue, Options, PluginOptions};
pub use plugin::{
    ArtifactSink, EmittedArtifact, Plugin, PluginContext, PluginExecutionPlan, PluginMetadata, PluginOrder,
};
pub use ports::{Filesystem, PluginCatalog, SourceHost};

pub use error::ApplicationError;
