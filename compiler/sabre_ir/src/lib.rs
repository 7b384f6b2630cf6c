//! Sabre IR - core data structures for the Sabre shader compiler.
//!
//! This crate contains the types shared by every compiler phase:
//! - Spans and file-qualified locations
//! - Interned identifier names
//! - Tokens and `TokenList` for lexer output
//! - AST nodes (declarations, statements, expressions, type signatures, tags)
//! - Flat arena allocation for AST nodes
//!
//! # Design Philosophy
//!
//! - **Intern everything**: strings become `Name(u32)`, so identifier
//!   comparison is a single integer compare.
//! - **Flatten everything**: no `Box<Expr>`; child references are
//!   `ExprId`/`StmtId`/`DeclId` indices into an [`AstArena`].

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-allocated types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod span;
mod name;
mod interner;
mod token;
pub mod ast;
mod arena;

pub use span::{FileId, Loc, Span};
pub use name::Name;
pub use interner::StringInterner;
pub use token::{Token, TokenKind, TokenList};
pub use ast::{
    AssignOp, BinaryOp, ComplitField, Decl, DeclKind, EnumFieldDecl, Expr, ExprKind, FuncParam,
    Ident, Stmt, StmtKind, StructFieldDecl, Tag, TagArg, TagTable, TagValue, TypeSign,
    TypeSignAtom, UnaryOp,
};
pub use arena::{AstArena, DeclId, ExprId, StmtId};
