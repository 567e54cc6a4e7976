//! Signals, precedence tables and the evidence trail.
//!
//! A detector inspects one narrow source of evidence and produces a
//! [`Signal`]: which detector spoke, at which [`Priority`], what it votes for
//! (if anything) and why. A classifier collects signals from all of its
//! detectors and hands them to [`decide`] together with a precedence table,
//! an explicit ordered list of `(DetectorId, Priority)` pairs.
//!
//! # Decision rule
//!
//! Tiers are visited from the strongest priority to the weakest. The first
//! tier containing at least one present signal decides:
//!
//! - every present signal in the tier votes the same way: that vote wins;
//! - signals in the tier disagree: no verdict, and weaker tiers are **not**
//!   consulted. A tie between equally strong signals is never broken by
//!   weaker evidence; the classification stays unresolved (false negative).
//!
//! Signals are recorded in table order (priority, then detector id in
//! alphabetical order), so the trail is stable across runs.

use std::fmt;

/// Identifies a detector in evidence trails and precedence tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DetectorId {
    ChildEntityReference,
    CrudShape,
    ExplicitAnnotation,
    IdentityShape,
    ImplementedByService,
    NamingConvention,
    PackageConvention,
    RepositoryPort,
}

impl DetectorId {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ChildEntityReference => "child-entity-reference",
            Self::CrudShape => "crud-shape",
            Self::ExplicitAnnotation => "explicit-annotation",
            Self::IdentityShape => "identity-shape",
            Self::ImplementedByService => "implemented-by-service",
            Self::NamingConvention => "naming-convention",
            Self::PackageConvention => "package-convention",
            Self::RepositoryPort => "repository-port",
        }
    }
}

impl fmt::Display for DetectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strength of a detector. Lower sorts first and wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Priority {
    Explicit,
    Structural,
    Naming,
    Package,
}

impl Priority {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Explicit => "explicit",
            Self::Structural => "structural",
            Self::Naming => "naming",
            Self::Package => "package",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered precedence table of one classifier.
pub type Precedence = &'static [(DetectorId, Priority)];

/// Output of one detector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signal<V> {
    pub detector: DetectorId,
    pub priority: Priority,
    /// `None` when the detector found nothing to say.
    pub vote: Option<V>,
    pub justification: String,
}

impl<V> Signal<V> {
    pub fn present(
        detector: DetectorId,
        priority: Priority,
        vote: V,
        justification: impl Into<String>,
    ) -> Self {
        Self {
            detector,
            priority,
            vote: Some(vote),
            justification: justification.into(),
        }
    }

    pub fn absent(detector: DetectorId, priority: Priority, justification: impl Into<String>) -> Self {
        Self {
            detector,
            priority,
            vote: None,
            justification: justification.into(),
        }
    }

    pub fn is_present(&self) -> bool {
        self.vote.is_some()
    }
}

/// Evidence trail of one classification decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evidence<V> {
    verdict: Option<V>,
    decided_by: Option<DetectorId>,
    ambiguous: bool,
    signals: Vec<Signal<V>>,
    /// Signals that gate a verdict without voting on it.
    prerequisites: Vec<Signal<V>>,
    notes: Vec<String>,
}

impl<V: Copy + PartialEq> Evidence<V> {
    pub fn verdict(&self) -> Option<V> {
        self.verdict
    }

    pub fn decided_by(&self) -> Option<DetectorId> {
        self.decided_by
    }

    /// Whether equally strong signals disagreed.
    pub fn is_ambiguous(&self) -> bool {
        self.ambiguous
    }

    pub fn signals(&self) -> &[Signal<V>] {
        &self.signals
    }

    pub fn prerequisites(&self) -> &[Signal<V>] {
        &self.prerequisites
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    /// Present signals that voted against the verdict (or all present
    /// signals when there is no verdict).
    pub fn losing_signals(&self) -> impl Iterator<Item = &Signal<V>> {
        self.signals
            .iter()
            .filter(move |signal| signal.vote.is_some() && signal.vote != self.verdict)
    }

    /// Withdraw a verdict that lacks a required prerequisite.
    pub(crate) fn withdraw(&mut self, note: impl Into<String>) {
        self.verdict = None;
        self.decided_by = None;
        self.notes.push(note.into());
    }

    pub(crate) fn note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    pub(crate) fn add_prerequisite(&mut self, signal: Signal<V>) {
        self.prerequisites.push(signal);
    }

    /// One-line human summary, e.g. `naming-convention: ends with 'Repository'`.
    pub fn summary(&self) -> String {
        match self.decided_by.and_then(|id| self.signals.iter().find(|s| s.detector == id)) {
            Some(signal) => format!("{}: {}", signal.detector, signal.justification),
            None if self.ambiguous => "unresolved: conflicting signals of equal priority".into(),
            None => "unresolved: no signal fired".into(),
        }
    }
}

/// Combine signals under a precedence table.
///
/// Signals whose detector is missing from the table are ignored; they are an
/// internal wiring mistake and would otherwise vote with undefined strength.
pub fn decide<V: Copy + PartialEq>(mut signals: Vec<Signal<V>>, precedence: Precedence) -> Evidence<V> {
    signals.retain(|signal| position_of(signal.detector, precedence).is_some());
    signals.sort_by_key(|signal| position_of(signal.detector, precedence));

    let mut verdict = None;
    let mut decided_by = None;
    let mut ambiguous = false;

    let mut tiers: Vec<Priority> = precedence.iter().map(|(_, priority)| *priority).collect();
    tiers.dedup();

    for tier in tiers {
        let present: Vec<&Signal<V>> = signals
            .iter()
            .filter(|signal| signal.priority == tier && signal.is_present())
            .collect();
        let Some(first) = present.first() else {
            continue;
        };

        if present.iter().all(|signal| signal.vote == first.vote) {
            verdict = first.vote;
            decided_by = Some(first.detector);
        } else {
            ambiguous = true;
        }
        break;
    }

    Evidence {
        verdict,
        decided_by,
        ambiguous,
        signals,
        prerequisites: Vec::new(),
        notes: Vec::new(),
    }
}

fn position_of(detector: DetectorId, precedence: Precedence) -> Option<usize> {
    precedence.iter().position(|(id, _)| *id == detector)
}

/// Check that a precedence table is ordered by priority, then detector id.
pub fn is_well_ordered(precedence: Precedence) -> bool {
    precedence
        .windows(2)
        .all(|pair| (pair[0].1, pair[0].0) < (pair[1].1, pair[1].0))
}
