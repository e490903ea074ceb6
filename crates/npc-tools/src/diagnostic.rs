#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Well-known diagnostic tags.
pub mod tags {
    pub const BUDGET_EXHAUSTED: &str = "ai_budget_exhausted";
    pub const SEARCH_STARTED: &str = "search_started";
    pub const COORDINATION_FORMED: &str = "coordination_formed";
    pub const ALERT_RAISED: &str = "alert_raised";
    pub const ALERT_EASING: &str = "alert_easing";
    pub const ALERT_ENDED: &str = "alert_ended";
    pub const TRAP_SPRUNG: &str = "trap_sprung";
}

/// A small diagnostic record: a tag, two numeric slots and an optional note.
///
/// Subsystems agree on what `a` and `b` mean per tag, e.g. for
/// [`tags::BUDGET_EXHAUSTED`] `a` is the denial count and `b` the limit.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Diagnostic {
    pub tick: u64,
    pub tag: Cow<'static, str>,
    pub a: u64,
    pub b: u64,
    pub note: Option<String>,
}

impl Diagnostic {
    pub fn new(tick: u64, tag: impl Into<Cow<'static, str>>) -> Self {
        Self {
            tick,
            tag: tag.into(),
            a: 0,
            b: 0,
            note: None,
        }
    }

    pub fn with_a(mut self, a: u64) -> Self {
        self.a = a;
        self
    }

    pub fn with_b(mut self, b: u64) -> Self {
        self.b = b;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

pub trait DiagnosticSink {
    fn emit(&mut self, diagnostic: Diagnostic);
}

#[derive(Debug, Default)]
pub struct NullDiagnosticSink;

impl DiagnosticSink for NullDiagnosticSink {
    fn emit(&mut self, _diagnostic: Diagnostic) {}
}

#[derive(Debug, Default)]
pub struct VecDiagnosticSink {
    pub diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink for VecDiagnosticSink {
    fn emit(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

/// Forwards every record to `tracing` at debug level.
#[derive(Debug, Default)]
pub struct TracingDiagnosticSink;

impl DiagnosticSink for TracingDiagnosticSink {
    fn emit(&mut self, diagnostic: Diagnostic) {
        tracing::debug!(
            tick = diagnostic.tick,
            tag = %diagnostic.tag,
            a = diagnostic.a,
            b = diagnostic.b,
            note = diagnostic.note.as_deref().unwrap_or(""),
            "diagnostic"
        );
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DiagnosticLog {
    pub diagnostics: Vec<Diagnostic>,
}

impl DiagnosticLog {
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn count(&self, tag: &str) -> usize {
        self.diagnostics.iter().filter(|d| d.tag == tag).count()
    }

    pub fn last(&self, tag: &str) -> Option<&Diagnostic> {
        self.diagnostics.iter().rev().find(|d| d.tag == tag)
    }
}

impl DiagnosticSink for DiagnosticLog {
    fn emit(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}
