//! Diagnostics: stable codes, severities, the collector and the factory.
//!
//! # Code convention
//!
//! Codes read `<NAMESPACE>-<NUMBER>` and the number range fixes the
//! severity:
//!
//! | Range   | Severity |
//! |---------|----------|
//! | 001-099 | info     |
//! | 100-199 | warning  |
//! | 200-299 | error    |
//!
//! The compiler's own catalogue lives in [`codes`] under the `ARCH`
//! namespace. Plugins may report under their own namespace through
//! [`DiagnosticCode::new`].

use std::{fmt, str::FromStr};

use serde::{Serialize, Serializer};

use crate::domain::error::DomainError;

pub const NAMESPACE: &str = "ARCH";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }

    const fn of(number: u16) -> Option<Self> {
        match number {
            1..=99 => Some(Self::Info),
            100..=199 => Some(Self::Warning),
            200..=299 => Some(Self::Error),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `<NAMESPACE>-<NUMBER>` diagnostic code.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DiagnosticCode {
    namespace: String,
    number: u16,
}

impl DiagnosticCode {
    pub fn new(namespace: impl Into<String>, number: u16) -> Result<Self, DomainError> {
        let namespace = namespace.into();
        let code = format!("{namespace}-{number:03}");

        if namespace.is_empty()
            || !namespace
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        {
            return Err(DomainError::InvalidDiagnosticCode {
                code,
                reason: "namespace must be uppercase ASCII letters or digits".into(),
            });
        }
        if Severity::of(number).is_none() {
            return Err(DomainError::InvalidDiagnosticCode {
                code,
                reason: "number must be within 001-299".into(),
            });
        }

        Ok(Self { namespace, number })
    }

    /// Catalogue constructor; numbers are checked by the catalogue tests.
    fn arch(number: u16) -> Self {
        Self {
            namespace: NAMESPACE.to_string(),
            number,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn number(&self) -> u16 {
        self.number
    }

    pub fn severity(&self) -> Severity {
        Severity::of(self.number).unwrap_or(Severity::Error)
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:03}", self.namespace, self.number)
    }
}

impl FromStr for DiagnosticCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| DomainError::InvalidDiagnosticCode {
            code: s.to_string(),
            reason: reason.to_string(),
        };
        let (namespace, number) = s
            .split_once('-')
            .ok_or_else(|| invalid("expected <NAMESPACE>-<NUMBER>"))?;
        let number: u16 = number
            .parse()
            .map_err(|_| invalid("number is not numeric"))?;
        Self::new(namespace, number)
    }
}

impl Serialize for DiagnosticCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The `ARCH` catalogue.
pub mod codes {
    use super::DiagnosticCode;

    macro_rules! catalogue {
        ($($name:ident = $number:literal),* $(,)?) => {
            $(
                pub fn $name() -> DiagnosticCode {
                    DiagnosticCode::arch($number)
                }
            )*

            /// Every catalogued number, in declaration order.
            pub const ALL: &[u16] = &[$($number),*];
        };
    }

    catalogue! {
        round_analyzed = 1,
        artifact_written = 2,
        artifact_unchanged = 3,
        ambiguity_resolved = 4,
        compilation_finished = 5,
        generation_skipped = 6,
        kind_changed = 7,
        discovery_failed = 100,
        unsupported_type = 101,
        port_direction_unresolvable = 102,
        orphaned_custom_block = 104,
        repository_manages_non_root = 105,
        identity_not_identifier = 106,
        duplicate_plugin_id = 107,
        missing_identity = 108,
        write_conflict = 200,
        plugin_failed = 201,
        inter_aggregate_reference = 202,
        write_failed = 203,
        duplicate_target = 204,
        malformed_custom_blocks = 205,
        undeclared_custom_block = 206,
    }
}

/// One reported diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    code: DiagnosticCode,
    severity: Severity,
    message: String,
    /// Qualified name or path the diagnostic is about.
    #[serde(skip_serializing_if = "Option::is_none")]
    subject: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    notes: Vec<String>,
}

impl Diagnostic {
    pub fn new(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: code.severity(),
            code,
            message: message.into(),
            subject: None,
            notes: Vec::new(),
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn code(&self) -> &DiagnosticCode {
        &self.code
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.severity, self.code, self.message)?;
        if let Some(subject) = &self.subject {
            write!(f, " ({subject})")?;
        }
        Ok(())
    }
}

/// Narrow reporting interface handed to plugins and engines.
pub trait DiagnosticReporter {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// The shared diagnostic engine of one compilation.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
    infos: usize,
    warnings: usize,
    errors: usize,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Info => self.infos += 1,
            Severity::Warning => self.warnings += 1,
            Severity::Error => self.errors += 1,
        }
        self.entries.push(diagnostic);
    }

    /// Push unless an equal diagnostic was already reported. Returns whether
    /// it was pushed.
    pub fn push_new(&mut self, diagnostic: Diagnostic) -> bool {
        if self.entries.contains(&diagnostic) {
            return false;
        }
        self.push(diagnostic);
        true
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.push(diagnostic);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn info_count(&self) -> usize {
        self.infos
    }

    pub fn warning_count(&self) -> usize {
        self.warnings
    }

    pub fn error_count(&self) -> usize {
        self.errors
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    /// Position marker; pair with [`Diagnostics::since`] to scope a phase.
    pub fn mark(&self) -> usize {
        self.entries.len()
    }

    pub fn since(&self, mark: usize) -> &[Diagnostic] {
        self.entries.get(mark..).unwrap_or(&[])
    }

    pub fn errors_since(&self, mark: usize) -> usize {
        self.since(mark).iter().filter(|d| d.is_error()).count()
    }

    pub fn with_code<'a>(&'a self, code: &'a DiagnosticCode) -> impl Iterator<Item = &'a Diagnostic> {
        self.entries.iter().filter(move |d| &d.code == code)
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

impl DiagnosticReporter for Diagnostics {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

impl DiagnosticReporter for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Builds the catalogued diagnostics with consistent wording.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiagnosticsFactory;

impl DiagnosticsFactory {
    pub const fn new() -> Self {
        Self
    }

    // ── info ────────────────────────────────────────────────────────────────

    pub fn round_analyzed(&self, round: u32, domain_types: usize, ports: usize, services: usize) -> Diagnostic {
        Diagnostic::new(
            codes::round_analyzed(),
            format!(
                "round {round} analyzed: {domain_types} domain types, {ports} ports, {services} application services"
            ),
        )
    }

    pub fn artifact_written(&self, path: &str) -> Diagnostic {
        Diagnostic::new(codes::artifact_written(), "artifact written").with_subject(path)
    }

    pub fn artifact_unchanged(&self, path: &str) -> Diagnostic {
        Diagnostic::new(codes::artifact_unchanged(), "artifact unchanged").with_subject(path)
    }

    pub fn ambiguity_resolved(&self, subject: &str, outcome: &str) -> Diagnostic {
        Diagnostic::new(
            codes::ambiguity_resolved(),
            format!("conflicting classification signals, resolved as {outcome}"),
        )
        .with_subject(subject)
    }

    pub fn compilation_finished(&self, rounds: u32, artifacts: usize) -> Diagnostic {
        Diagnostic::new(
            codes::compilation_finished(),
            format!("compilation finished after {rounds} round(s), {artifacts} artifact(s) written"),
        )
    }

    pub fn generation_skipped(&self, round: u32, errors: usize) -> Diagnostic {
        Diagnostic::new(
            codes::generation_skipped(),
            format!("round {round}: generation skipped after {errors} validation error(s)"),
        )
    }

    pub fn kind_changed(&self, subject: &str, from: &str, to: &str) -> Diagnostic {
        Diagnostic::new(
            codes::kind_changed(),
            format!("reclassified from {from} to {to} after later sources arrived"),
        )
        .with_subject(subject)
    }

    // ── warning ─────────────────────────────────────────────────────────────

    pub fn discovery_failed(&self, reason: &str) -> Diagnostic {
        Diagnostic::new(
            codes::discovery_failed(),
            format!("plugin discovery failed, continuing without plugins: {reason}"),
        )
    }

    /// Subject-free; the caller attaches the element it was resolving for.
    pub fn unsupported_type(&self, type_text: &str, reason: &str) -> Diagnostic {
        Diagnostic::new(
            codes::unsupported_type(),
            format!("unsupported type '{type_text}': {reason}"),
        )
    }

    pub fn port_direction_unresolvable(&self, port: &str, summary: &str) -> Diagnostic {
        Diagnostic::new(
            codes::port_direction_unresolvable(),
            "port direction could not be determined; interface left out of the port model",
        )
        .with_subject(port)
        .with_note(summary)
    }

    pub fn orphaned_custom_block(&self, path: &str, block_id: &str) -> Diagnostic {
        Diagnostic::new(
            codes::orphaned_custom_block(),
            format!("custom block '{block_id}' is no longer generated; existing file left untouched"),
        )
        .with_subject(path)
    }

    pub fn repository_manages_non_root(&self, port: &str, managed: &str) -> Diagnostic {
        Diagnostic::new(
            codes::repository_manages_non_root(),
            format!("repository manages '{managed}', which is not an aggregate root"),
        )
        .with_subject(port)
    }

    pub fn identity_not_identifier(&self, subject: &str, property: &str, type_text: &str) -> Diagnostic {
        Diagnostic::new(
            codes::identity_not_identifier(),
            format!("identity property '{property}' has type '{type_text}', which is not suitable as an identifier"),
        )
        .with_subject(subject)
    }

    pub fn duplicate_plugin_id(&self, id: &str) -> Diagnostic {
        Diagnostic::new(
            codes::duplicate_plugin_id(),
            format!("plugin id '{id}' registered more than once; later registration ignored"),
        )
    }

    pub fn missing_identity(&self, subject: &str, kind: &str) -> Diagnostic {
        Diagnostic::new(
            codes::missing_identity(),
            format!("{kind} declares no identity property"),
        )
        .with_subject(subject)
    }

    // ── error ───────────────────────────────────────────────────────────────

    pub fn write_conflict(&self, path: &str) -> Diagnostic {
        Diagnostic::new(
            codes::write_conflict(),
            "file already exists and the artifact must not overwrite it",
        )
        .with_subject(path)
    }

    pub fn plugin_failed(&self, plugin: &str, reason: &str) -> Diagnostic {
        Diagnostic::new(codes::plugin_failed(), format!("plugin '{plugin}' failed: {reason}"))
    }

    pub fn inter_aggregate_reference(&self, source: &str, property: &str, target: &str) -> Diagnostic {
        Diagnostic::new(
            codes::inter_aggregate_reference(),
            format!("property '{property}' references aggregate root '{target}' by object; reference it by identifier"),
        )
        .with_subject(source)
    }

    pub fn write_failed(&self, path: &str, reason: &str) -> Diagnostic {
        Diagnostic::new(codes::write_failed(), format!("artifact could not be written: {reason}"))
            .with_subject(path)
    }

    pub fn duplicate_target(&self, path: &str) -> Diagnostic {
        Diagnostic::new(
            codes::duplicate_target(),
            "more than one artifact targets this path; only the first is written",
        )
        .with_subject(path)
    }

    pub fn malformed_custom_blocks(&self, path: &str, reason: &str) -> Diagnostic {
        Diagnostic::new(
            codes::malformed_custom_blocks(),
            format!("custom block markers are malformed: {reason}"),
        )
        .with_subject(path)
    }

    pub fn undeclared_custom_block(&self, path: &str, block_id: &str) -> Diagnostic {
        Diagnostic::new(
            codes::undeclared_custom_block(),
            format!("generated content and declared custom blocks disagree on '{block_id}'"),
        )
        .with_subject(path)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn severity_follows_number_range() {
        assert_eq!(codes::round_analyzed().severity(), Severity::Info);
        assert_eq!(codes::discovery_failed().severity(), Severity::Warning);
        assert_eq!(codes::write_conflict().severity(), Severity::Error);
    }

    #[test]
    fn catalogue_numbers_are_valid_and_unique() {
        let mut seen = HashSet::new();
        for &number in codes::ALL {
            assert!(DiagnosticCode::new(NAMESPACE, number).is_ok(), "{number}");
            assert!(seen.insert(number), "duplicate {number}");
        }
    }

    #[test]
    fn code_text_form() {
        assert_eq!(codes::discovery_failed().to_string(), "ARCH-100");
        assert_eq!(codes::round_analyzed().to_string(), "ARCH-001");

        let parsed: DiagnosticCode = "DOC-150".parse().unwrap();
        assert_eq!(parsed.namespace(), "DOC");
        assert_eq!(parsed.severity(), Severity::Warning);
    }

    #[test]
    fn rejects_out_of_range_and_bad_namespaces() {
        assert!(DiagnosticCode::new("ARCH", 0).is_err());
        assert!(DiagnosticCode::new("ARCH", 300).is_err());
        assert!(DiagnosticCode::new("arch", 1).is_err());
        assert!("ARCH".parse::<DiagnosticCode>().is_err());
        assert!("ARCH-x".parse::<DiagnosticCode>().is_err());
    }

    #[test]
    fn collector_counts_and_scopes() {
        let factory = DiagnosticsFactory::new();
        let mut diagnostics = Diagnostics::new();

        diagnostics.report(factory.round_analyzed(1, 2, 1, 0));
        let mark = diagnostics.mark();
        diagnostics.report(factory.discovery_failed("boom"));
        diagnostics.report(factory.write_conflict("out/a.md"));

        assert_eq!(diagnostics.info_count(), 1);
        assert_eq!(diagnostics.warning_count(), 1);
        assert_eq!(diagnostics.error_count(), 1);
        assert_eq!(diagnostics.since(mark).len(), 2);
        assert_eq!(diagnostics.errors_since(mark), 1);
        assert_eq!(diagnostics.with_code(&codes::write_conflict()).count(), 1);
    }

    #[test]
    fn push_new_skips_repeats() {
        let factory = DiagnosticsFactory::new();
        let mut diagnostics = Diagnostics::new();

        assert!(diagnostics.push_new(factory.unsupported_type("int[][]", "nested arrays")));
        assert!(!diagnostics.push_new(factory.unsupported_type("int[][]", "nested arrays")));
        assert!(diagnostics.push_new(factory.kind_changed("com.acme.Customer", "ENTITY", "AGGREGATE_ROOT")));
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics.warning_count(), 1);
        assert_eq!(codes::kind_changed().to_string(), "ARCH-007");
    }

    #[test]
    fn display_includes_subject() {
        let diagnostic = DiagnosticsFactory::new().artifact_written("docs/a.md");
        assert_eq!(diagnostic.to_string(), "info [ARCH-002] artifact written (docs/a.md)");
    }
}
