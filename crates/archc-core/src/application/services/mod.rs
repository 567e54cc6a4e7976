//! Application services - one per pipeline phase, plus the orchestrator
//! that sequences them.

pub mod analyzer;
pub mod generator;
pub mod orchestrator;
pub mod validator;
pub mod writer;

pub use analyzer::Analyzer;
pub use generator::Generator;
pub use orchestrator::{CompilationSummary, Phase, PipelineOrchestrator, RoundReport};
pub use validator::Validator;
pub use writer::{ArtifactWriter, WriteOutcome, WriteStatus};
