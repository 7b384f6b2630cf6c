//! Semantic analysis for the Sabre shading language.
//!
//! The typer takes parsed files grouped into packages and produces fully
//! typed, reachable symbols in first-use order, entry points with assigned
//! resource bindings, and accumulated diagnostics.
//!
//! # Architecture
//!
//! Resolution is lazy and cycle-detecting: every symbol carries an
//! `Unresolved → Resolving → Resolved` state, and hitting a `Resolving`
//! symbol again is a cyclic-dependency error. A shallow walk first
//! registers every top-level symbol (evaluating compile-time `if` blocks),
//! then each global symbol is resolved on demand, recursing into its
//! dependencies, across package boundaries when imports are involved.
//!
//! The main entry point is [`check_package`].

mod scope;
mod symbol;
mod unit;
mod checker;

pub use checker::check_package;
pub use scope::{Scope, ScopeArena, ScopeFlags, ScopeId, ScopeOwner};
pub use symbol::{AddressMode, EntryMode, EntryPoint, Symbol, SymbolId, SymbolKind, SymbolState};
pub use unit::{Keywords, Package, PackageId, Stage, Unit, UnitFile};
