//! archc Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers of the archc
//! architectural compiler: it classifies a host's source model into domain
//! types, ports and application services, validates the result, runs
//! generator plugins over it and writes their artifacts without losing
//! user edits.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            archc-cli (CLI)              │
//! │        (Drives the orchestrator)        │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │  Analyzer, Validator, Generator, Writer │
//! │       sequenced by the orchestrator     │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │       Application Ports (Traits)        │
//! │ (Filesystem, PluginCatalog, SourceHost) │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │     archc-adapters (Infrastructure)     │
//! │ (LocalFilesystem, JsonModelHost, ...)   │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │        Domain Layer (Pure Logic)        │
//! │  (types, classifiers, IR, diagnostics)  │
//! │              No I/O                     │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use archc_core::prelude::*;
//!
//! # fn run(catalog: Box<dyn PluginCatalog>, fs: Box<dyn Filesystem>, host: &mut dyn SourceHost) -> ArchResult<()> {
//! let session = CompilationSession::start(SessionConfig::default())?;
//! let writer = ArtifactWriter::new(fs, OutputLayout::new("target/archc"));
//! let summary = PipelineOrchestrator::new(session, catalog, writer).run(host)?;
//! println!("{} artifact(s) written", summary.written());
//! # Ok(())
//! # }
//! ```

// Domain layer (pure analysis logic)
pub mod domain;

// Application layer (orchestration logic)
pub mod application;

// Error types
pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        ArtifactWriter, CompilationSummary, OptionValue, Options, Plugin, PluginContext, PluginMetadata,
        PluginOptions, PluginOrder, PipelineOrchestrator, WriteStatus,
        ports::{Filesystem, PluginCatalog, SourceHost},
    };
    pub use crate::domain::{
        CompilationSession, Diagnostic, Diagnostics, DomainKind, GeneratedArtifact, IrSnapshot, MergeMode,
        OutputLayout, PortDirection, Round, SessionConfig, Severity, SourceElement, SourceSet,
    };
    pub use crate::error::{ArchError, ArchResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
