//! Diagnostics primitives for turn-based NPC simulation.
//!
//! Records here are for tuning and tooling only; gameplay never reads them back.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod diagnostic;

pub use diagnostic::{
    tags, Diagnostic, DiagnosticLog, DiagnosticSink, NullDiagnosticSink, TracingDiagnosticSink,
    VecDiagnosticSink,
};
