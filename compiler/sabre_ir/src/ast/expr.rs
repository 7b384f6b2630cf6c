//! Expression nodes.

use super::{BinaryOp, Ident, TypeSign, UnaryOp};
use crate::{ExprId, Loc, Span};

/// An expression node. Children are arena ids.
#[derive(Clone, PartialEq, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub loc: Loc,
}

/// Expression kinds of the Sabre surface language.
#[derive(Clone, PartialEq, Debug)]
pub enum ExprKind {
    IntLit(i64),
    FloatLit(f64),
    BoolLit(bool),
    Ident(Ident),
    Binary {
        op: BinaryOp,
        op_span: Span,
        lhs: ExprId,
        rhs: ExprId,
    },
    Unary {
        op: UnaryOp,
        base: ExprId,
    },
    Call {
        base: ExprId,
        args: Vec<ExprId>,
    },
    /// `base: type` cast.
    Cast {
        base: ExprId,
        sign: TypeSign,
    },
    /// `lhs.field`, or `.field` with the lhs type taken from context
    /// (enum shorthand and composite-literal selectors).
    Dot {
        lhs: Option<ExprId>,
        field: Ident,
    },
    Indexed {
        base: ExprId,
        index: ExprId,
    },
    /// Composite literal `type{...}` or contextual `{...}`.
    Complit {
        sign: TypeSign,
        fields: Vec<ComplitField>,
    },
}

/// One field of a composite literal: positional, or keyed with `.name =`.
#[derive(Clone, PartialEq, Debug)]
pub struct ComplitField {
    pub selector: Option<Ident>,
    pub value: ExprId,
}
