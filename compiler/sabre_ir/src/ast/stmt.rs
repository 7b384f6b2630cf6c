//! Statement nodes.

use super::AssignOp;
use crate::{DeclId, ExprId, Loc, StmtId};

/// A statement node. Children are arena ids.
#[derive(Clone, PartialEq, Debug)]
pub struct Stmt {
    pub kind: StmtKind,
    pub loc: Loc,
}

/// Statement kinds of the Sabre surface language.
#[derive(Clone, PartialEq, Debug)]
pub enum StmtKind {
    Break,
    Continue,
    /// Pixel-shader early out.
    Discard,
    Return(Option<ExprId>),
    /// `if c0 {..} else if c1 {..} else {..}`; conditions and bodies are
    /// parallel, bodies are block statements.
    If {
        conds: Vec<ExprId>,
        bodies: Vec<StmtId>,
        else_body: Option<StmtId>,
    },
    For {
        init: Option<StmtId>,
        cond: Option<ExprId>,
        post: Option<StmtId>,
        body: StmtId,
    },
    /// Multi-target assignment; lhs and rhs are parallel.
    Assign {
        op: AssignOp,
        lhs: Vec<ExprId>,
        rhs: Vec<ExprId>,
    },
    Expr(ExprId),
    Decl(DeclId),
    Block(Vec<StmtId>),
}
