//! Declaration nodes.

use super::{Ident, TagTable, TypeSign};
use crate::{DeclId, ExprId, Loc, StmtId};

/// A declaration node. Children are arena ids.
#[derive(Clone, PartialEq, Debug)]
pub struct Decl {
    pub kind: DeclKind,
    pub tags: TagTable,
    pub loc: Loc,
}

impl Decl {
    /// The primary declared name, when the declaration has one.
    pub fn name(&self) -> Option<Ident> {
        match &self.kind {
            DeclKind::Const { names, .. } | DeclKind::Var { names, .. } => names.first().copied(),
            DeclKind::Func { name, .. }
            | DeclKind::Struct { name, .. }
            | DeclKind::Enum { name, .. } => Some(*name),
            DeclKind::Import { alias, .. } => *alias,
            DeclKind::If { .. } => None,
        }
    }
}

/// Declaration kinds of the Sabre surface language.
#[derive(Clone, PartialEq, Debug)]
pub enum DeclKind {
    /// `const a, b: T = x, y;` with values pairing to names positionally.
    Const {
        names: Vec<Ident>,
        sign: TypeSign,
        values: Vec<ExprId>,
    },
    Var {
        names: Vec<Ident>,
        sign: TypeSign,
        values: Vec<ExprId>,
    },
    Func {
        name: Ident,
        templates: Vec<Ident>,
        params: Vec<FuncParam>,
        return_sign: TypeSign,
        body: Option<StmtId>,
    },
    Struct {
        name: Ident,
        templates: Vec<Ident>,
        fields: Vec<StructFieldDecl>,
    },
    Enum {
        name: Ident,
        fields: Vec<EnumFieldDecl>,
    },
    /// `import "path" as alias;`
    Import {
        path: Ident,
        alias: Option<Ident>,
    },
    /// Compile-time conditional declaration block.
    If {
        conds: Vec<ExprId>,
        bodies: Vec<Vec<DeclId>>,
        else_body: Vec<DeclId>,
    },
}

/// Function parameter group: `a, b: T`.
#[derive(Clone, PartialEq, Debug)]
pub struct FuncParam {
    pub names: Vec<Ident>,
    pub sign: TypeSign,
}

/// Struct field group: `a, b: T = default;` with optional tags.
#[derive(Clone, PartialEq, Debug)]
pub struct StructFieldDecl {
    pub names: Vec<Ident>,
    pub sign: TypeSign,
    pub default_value: Option<ExprId>,
    pub tags: TagTable,
}

/// Enum field: `NAME` or `NAME = value`.
#[derive(Clone, PartialEq, Debug)]
pub struct EnumFieldDecl {
    pub name: Ident,
    pub value: Option<ExprId>,
}
