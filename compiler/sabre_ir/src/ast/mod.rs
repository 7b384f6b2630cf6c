//! AST node definitions.
//!
//! Nodes are allocated in an [`crate::AstArena`] and refer to children by id.
//! Every node carries a file-qualified [`Loc`](crate::Loc).

mod operators;
mod sign;
mod tag;
mod expr;
mod stmt;
mod decl;

pub use operators::{AssignOp, BinaryOp, UnaryOp};
pub use sign::{TypeSign, TypeSignAtom};
pub use tag::{Tag, TagArg, TagTable, TagValue};
pub use expr::{ComplitField, Expr, ExprKind};
pub use stmt::{Stmt, StmtKind};
pub use decl::{Decl, DeclKind, EnumFieldDecl, FuncParam, StructFieldDecl};

use crate::{Name, Span};

/// A source identifier: interned name plus its span.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Ident {
    pub name: Name,
    pub span: Span,
}

impl Ident {
    #[inline]
    pub const fn new(name: Name, span: Span) -> Self {
        Ident { name, span }
    }
}
