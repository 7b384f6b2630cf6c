//! Arena allocation for the flat AST.
//!
//! All nodes of a package live in one arena and reference each other by id.
//! Template instantiation clones declaration subtrees into the same arena;
//! the clones get fresh ids, so per-expression side tables start empty for
//! them.

use crate::ast::{ComplitField, Decl, DeclKind, EnumFieldDecl, Expr, ExprKind, FuncParam, Stmt,
    StmtKind, StructFieldDecl, TypeSign, TypeSignAtom};

macro_rules! define_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub const fn new(raw: u32) -> Self {
                $name(raw)
            }

            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

define_id! {
    /// Id of an [`Expr`] in an [`AstArena`].
    ExprId
}
define_id! {
    /// Id of a [`Stmt`] in an [`AstArena`].
    StmtId
}
define_id! {
    /// Id of a [`Decl`] in an [`AstArena`].
    DeclId
}

/// Contiguous storage for all AST nodes in a package.
#[derive(Clone, Default, Debug)]
pub struct AstArena {
    exprs: Vec<Expr>,
    stmts: Vec<Stmt>,
    decls: Vec<Decl>,
}

impl AstArena {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== Allocation =====

    #[inline]
    pub fn alloc_expr(&mut self, expr: Expr) -> ExprId {
        let id = ExprId::new(self.exprs.len() as u32);
        self.exprs.push(expr);
        id
    }

    #[inline]
    pub fn alloc_stmt(&mut self, stmt: Stmt) -> StmtId {
        let id = StmtId::new(self.stmts.len() as u32);
        self.stmts.push(stmt);
        id
    }

    #[inline]
    pub fn alloc_decl(&mut self, decl: Decl) -> DeclId {
        let id = DeclId::new(self.decls.len() as u32);
        self.decls.push(decl);
        id
    }

    // ===== Access =====

    /// Get an expression by id.
    ///
    /// # Panics
    /// Panics if `id` is out of bounds.
    #[inline]
    #[track_caller]
    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    #[inline]
    #[track_caller]
    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.index()]
    }

    #[inline]
    #[track_caller]
    pub fn decl(&self, id: DeclId) -> &Decl {
        &self.decls[id.index()]
    }

    #[inline]
    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    // ===== Deep cloning (template instantiation) =====

    /// Deep-clone a declaration subtree. Every contained statement and
    /// expression is re-allocated under a fresh id.
    pub fn clone_decl(&mut self, id: DeclId) -> DeclId {
        let decl = self.decl(id).clone();
        let kind = match decl.kind {
            DeclKind::Const { names, sign, values } => DeclKind::Const {
                names,
                sign: self.clone_sign(&sign),
                values: values.into_iter().map(|e| self.clone_expr(e)).collect(),
            },
            DeclKind::Var { names, sign, values } => DeclKind::Var {
                names,
                sign: self.clone_sign(&sign),
                values: values.into_iter().map(|e| self.clone_expr(e)).collect(),
            },
            DeclKind::Func { name, templates, params, return_sign, body } => DeclKind::Func {
                name,
                templates,
                params: params
                    .into_iter()
                    .map(|p| FuncParam { names: p.names, sign: self.clone_sign(&p.sign) })
                    .collect(),
                return_sign: self.clone_sign(&return_sign),
                body: body.map(|b| self.clone_stmt(b)),
            },
            DeclKind::Struct { name, templates, fields } => DeclKind::Struct {
                name,
                templates,
                fields: fields
                    .into_iter()
                    .map(|f| StructFieldDecl {
                        names: f.names,
                        sign: self.clone_sign(&f.sign),
                        default_value: f.default_value.map(|e| self.clone_expr(e)),
                        tags: f.tags,
                    })
                    .collect(),
            },
            DeclKind::Enum { name, fields } => DeclKind::Enum {
                name,
                fields: fields
                    .into_iter()
                    .map(|f| EnumFieldDecl { name: f.name, value: f.value.map(|e| self.clone_expr(e)) })
                    .collect(),
            },
            DeclKind::Import { path, alias } => DeclKind::Import { path, alias },
            DeclKind::If { conds, bodies, else_body } => DeclKind::If {
                conds: conds.into_iter().map(|e| self.clone_expr(e)).collect(),
                bodies: bodies
                    .into_iter()
                    .map(|b| b.into_iter().map(|d| self.clone_decl(d)).collect())
                    .collect(),
                else_body: else_body.into_iter().map(|d| self.clone_decl(d)).collect(),
            },
        };
        self.alloc_decl(Decl { kind, tags: decl.tags, loc: decl.loc })
    }

    fn clone_stmt(&mut self, id: StmtId) -> StmtId {
        let stmt = self.stmt(id).clone();
        let kind = match stmt.kind {
            StmtKind::Break => StmtKind::Break,
            StmtKind::Continue => StmtKind::Continue,
            StmtKind::Discard => StmtKind::Discard,
            StmtKind::Return(e) => StmtKind::Return(e.map(|e| self.clone_expr(e))),
            StmtKind::If { conds, bodies, else_body } => StmtKind::If {
                conds: conds.into_iter().map(|e| self.clone_expr(e)).collect(),
                bodies: bodies.into_iter().map(|s| self.clone_stmt(s)).collect(),
                else_body: else_body.map(|s| self.clone_stmt(s)),
            },
            StmtKind::For { init, cond, post, body } => StmtKind::For {
                init: init.map(|s| self.clone_stmt(s)),
                cond: cond.map(|e| self.clone_expr(e)),
                post: post.map(|s| self.clone_stmt(s)),
                body: self.clone_stmt(body),
            },
            StmtKind::Assign { op, lhs, rhs } => StmtKind::Assign {
                op,
                lhs: lhs.into_iter().map(|e| self.clone_expr(e)).collect(),
                rhs: rhs.into_iter().map(|e| self.clone_expr(e)).collect(),
            },
            StmtKind::Expr(e) => StmtKind::Expr(self.clone_expr(e)),
            StmtKind::Decl(d) => StmtKind::Decl(self.clone_decl(d)),
            StmtKind::Block(stmts) => {
                StmtKind::Block(stmts.into_iter().map(|s| self.clone_stmt(s)).collect())
            }
        };
        self.alloc_stmt(Stmt { kind, loc: stmt.loc })
    }

    fn clone_expr(&mut self, id: ExprId) -> ExprId {
        let expr = self.expr(id).clone();
        let kind = match expr.kind {
            ExprKind::IntLit(v) => ExprKind::IntLit(v),
            ExprKind::FloatLit(v) => ExprKind::FloatLit(v),
            ExprKind::BoolLit(v) => ExprKind::BoolLit(v),
            ExprKind::Ident(name) => ExprKind::Ident(name),
            ExprKind::Binary { op, op_span, lhs, rhs } => ExprKind::Binary {
                op,
                op_span,
                lhs: self.clone_expr(lhs),
                rhs: self.clone_expr(rhs),
            },
            ExprKind::Unary { op, base } => ExprKind::Unary { op, base: self.clone_expr(base) },
            ExprKind::Call { base, args } => ExprKind::Call {
                base: self.clone_expr(base),
                args: args.into_iter().map(|e| self.clone_expr(e)).collect(),
            },
            ExprKind::Cast { base, sign } => ExprKind::Cast {
                base: self.clone_expr(base),
                sign: self.clone_sign(&sign),
            },
            ExprKind::Dot { lhs, field } => ExprKind::Dot {
                lhs: lhs.map(|e| self.clone_expr(e)),
                field,
            },
            ExprKind::Indexed { base, index } => ExprKind::Indexed {
                base: self.clone_expr(base),
                index: self.clone_expr(index),
            },
            ExprKind::Complit { sign, fields } => ExprKind::Complit {
                sign: self.clone_sign(&sign),
                fields: fields
                    .into_iter()
                    .map(|f| ComplitField { selector: f.selector, value: self.clone_expr(f.value) })
                    .collect(),
            },
        };
        self.alloc_expr(Expr { kind, loc: expr.loc })
    }

    fn clone_sign(&mut self, sign: &TypeSign) -> TypeSign {
        let atoms = sign
            .atoms
            .iter()
            .map(|atom| match atom {
                TypeSignAtom::Named { package, name } => {
                    TypeSignAtom::Named { package: *package, name: *name }
                }
                TypeSignAtom::Array { count, span } => TypeSignAtom::Array {
                    count: count.map(|e| self.clone_expr(e)),
                    span: *span,
                },
                TypeSignAtom::Templated { package, name, args } => TypeSignAtom::Templated {
                    package: *package,
                    name: *name,
                    args: args.iter().map(|a| self.clone_sign(a)).collect(),
                },
            })
            .collect();
        TypeSign { atoms }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Loc, Span};

    #[test]
    fn clone_expr_gets_fresh_ids() {
        let mut arena = AstArena::new();
        let loc = Loc::default();
        let one = arena.alloc_expr(Expr { kind: ExprKind::IntLit(1), loc });
        let two = arena.alloc_expr(Expr { kind: ExprKind::IntLit(2), loc });
        let sum = arena.alloc_expr(Expr {
            kind: ExprKind::Binary {
                op: crate::BinaryOp::Add,
                op_span: Span::DUMMY,
                lhs: one,
                rhs: two,
            },
            loc,
        });

        let cloned = arena.clone_expr(sum);
        assert_ne!(cloned, sum);
        match &arena.expr(cloned).kind {
            ExprKind::Binary { lhs, rhs, .. } => {
                assert_ne!(*lhs, one);
                assert_ne!(*rhs, two);
                assert_eq!(arena.expr(*lhs).kind, ExprKind::IntLit(1));
                assert_eq!(arena.expr(*rhs).kind, ExprKind::IntLit(2));
            }
            other => panic!("expected binary expression, got {other:?}"),
        }
    }
}
