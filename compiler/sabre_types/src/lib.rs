//! Type system for the Sabre compiler.
//!
//! Types are interned: structurally identical types share one [`TypeId`],
//! so type equality is an integer compare. The [`TypeInterner`] owns every
//! type for the lifetime of a compilation unit and is also the home of the
//! template specialization tables.

mod core;
mod interner;
pub mod value;

pub use core::{
    EnumField, FuncSign, ScalarKind, StreamKind, StructField, SymRef, TextureDim, Type, TypeData,
    TypeId,
};
pub use interner::TypeInterner;
pub use value::{AggregateValue, Value};
