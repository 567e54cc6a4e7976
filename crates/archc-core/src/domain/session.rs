//! Compilation session: groups all rounds of one compiler invocation.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::error::DomainError;

/// Settings a session is started with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub debug: bool,
    pub mode: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            debug: false,
            mode: "default".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompilationSession {
    id: Uuid,
    started_at: DateTime<Utc>,
    debug: bool,
    mode: String,
}

impl CompilationSession {
    pub fn start(config: SessionConfig) -> Result<Self, DomainError> {
        if config.mode.trim().is_empty() {
            return Err(DomainError::MissingRequiredField { field: "session.mode" });
        }
        Ok(Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            debug: config.debug,
            mode: config.mode,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn mode(&self) -> &str {
        &self.mode
    }
}
