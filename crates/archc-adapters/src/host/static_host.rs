//! In-memory host for tests and embedding.

use std::collections::VecDeque;

use archc_core::{
    application::ports::SourceHost,
    domain::{Round, SourceElement},
    error::ArchResult,
};

/// Hands out prepared batches, then one final empty round.
#[derive(Debug, Default)]
pub struct StaticHost {
    batches: VecDeque<Vec<SourceElement>>,
    number: u32,
    closed: bool,
}

impl StaticHost {
    pub fn new(batches: impl IntoIterator<Item = Vec<SourceElement>>) -> Self {
        Self {
            batches: batches.into_iter().collect(),
            number: 0,
            closed: false,
        }
    }

    /// A single batch.
    pub fn single(elements: Vec<SourceElement>) -> Self {
        Self::new([elements])
    }
}

impl SourceHost for StaticHost {
    fn next_round(&mut self) -> ArchResult<Option<Round>> {
        if self.closed {
            return Ok(None);
        }
        self.number += 1;
        Ok(Some(match self.batches.pop_front() {
            Some(elements) => Round::new(self.number, elements),
            None => {
                self.closed = true;
                Round::last(self.number, Vec::new())
            }
        }))
    }
}
