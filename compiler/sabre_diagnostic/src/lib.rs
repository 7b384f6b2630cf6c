//! Diagnostic system for the Sabre compiler.
//!
//! Errors are values: each phase appends [`Diagnostic`] records to a
//! [`DiagnosticList`] and carries on. Nothing here aborts compilation; the
//! driver decides what to do with the accumulated list.

mod diagnostic;
mod source_map;
pub mod emitter;

pub use diagnostic::{Diagnostic, DiagnosticList, Severity};
pub use source_map::{LineCol, SourceFile, SourceMap};
