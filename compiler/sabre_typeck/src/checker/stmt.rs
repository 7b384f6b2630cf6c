//! Statement checking and termination analysis.

use crate::checker::Typer;
use crate::scope::{ScopeFlags, ScopeOwner};
use crate::symbol::{AddressMode, Symbol, SymbolKind};
use sabre_ir::{AssignOp, DeclId, DeclKind, ExprId, Loc, StmtId, StmtKind};
use sabre_types::TypeId;

/// Result of the control-flow walk verifying that every exit path of a
/// non-void function ends in a return.
pub(crate) struct TerminationInfo {
    pub will_return: bool,
    pub loc: Loc,
    pub msg: String,
}

impl TerminationInfo {
    fn returns(loc: Loc) -> Self {
        TerminationInfo { will_return: true, loc, msg: String::new() }
    }

    fn falls_through(loc: Loc, msg: impl Into<String>) -> Self {
        TerminationInfo { will_return: false, loc, msg: msg.into() }
    }
}

impl Typer<'_> {
    pub(crate) fn resolve_stmt(&mut self, s: StmtId) -> TypeId {
        let stmt = self.stmt(s);
        match stmt.kind {
            StmtKind::Break => {
                if !self
                    .pkg()
                    .scopes
                    .find_flag(self.current_scope(), ScopeFlags::INSIDE_LOOP)
                {
                    self.err(
                        stmt.loc,
                        "unexpected break statement, they can only appear in for loops",
                    );
                }
                TypeId::VOID
            }
            StmtKind::Continue => {
                if !self
                    .pkg()
                    .scopes
                    .find_flag(self.current_scope(), ScopeFlags::INSIDE_LOOP)
                {
                    self.err(
                        stmt.loc,
                        "unexpected continue statement, they can only appear in for loops",
                    );
                }
                TypeId::VOID
            }
            StmtKind::Discard => TypeId::VOID,
            StmtKind::Return(value) => self.resolve_return_stmt(value, stmt.loc),
            StmtKind::If { conds, bodies, else_body } => {
                for (&cond, &body) in conds.iter().zip(bodies.iter()) {
                    let cond_type = self.resolve_expr(cond);
                    if !self.unit.types.types_equal(cond_type, TypeId::BOOL) {
                        let cond_loc = self.pkg().ast.expr(cond).loc;
                        let shown = self.display(cond_type);
                        self.err(
                            cond_loc,
                            format!("if condition type '{shown}' is not a boolean"),
                        );
                    }
                    self.resolve_stmt(body);
                }
                if let Some(else_body) = else_body {
                    self.resolve_stmt(else_body);
                }
                TypeId::VOID
            }
            StmtKind::For { init, cond, post, body } => {
                let scope = self.create_scope_for(
                    ScopeOwner::Stmt(s),
                    self.current_scope(),
                    sabre_ir::Name::EMPTY,
                    None,
                    ScopeFlags::INSIDE_LOOP,
                );
                self.with_scope(scope, |t| {
                    if let Some(init) = init {
                        t.resolve_stmt(init);
                    }
                    if let Some(cond) = cond {
                        let cond_type = t.resolve_expr(cond);
                        if !t.unit.types.types_equal(cond_type, TypeId::BOOL) {
                            let cond_loc = t.pkg().ast.expr(cond).loc;
                            let shown = t.display(cond_type);
                            t.err(
                                cond_loc,
                                format!("for loop condition type '{shown}' is not a boolean"),
                            );
                        }
                    }
                    if let Some(post) = post {
                        t.resolve_stmt(post);
                    }
                    // The body's statements run directly in the loop scope.
                    if let StmtKind::Block(stmts) = t.stmt(body).kind {
                        for stmt in stmts {
                            t.resolve_stmt(stmt);
                        }
                    }
                });
                TypeId::VOID
            }
            StmtKind::Assign { op, lhs, rhs } => self.resolve_assign_stmt(op, &lhs, &rhs, stmt.loc),
            StmtKind::Expr(e) => self.resolve_expr(e),
            StmtKind::Decl(decl) => self.resolve_decl_stmt(decl),
            StmtKind::Block(stmts) => {
                let scope = self.create_scope_for(
                    ScopeOwner::Stmt(s),
                    self.current_scope(),
                    sabre_ir::Name::EMPTY,
                    None,
                    ScopeFlags::NONE,
                );
                self.with_scope(scope, |t| {
                    for stmt in stmts {
                        t.resolve_stmt(stmt);
                    }
                });
                TypeId::VOID
            }
        }
    }

    fn resolve_return_stmt(&mut self, value: Option<ExprId>, loc: Loc) -> TypeId {
        let expected = self.expected_return_type();
        let ret = match value {
            Some(value) => self.with_expected(expected, |t| t.resolve_expr(value)),
            None => TypeId::VOID,
        };

        let Some(expected) = expected else {
            self.err(loc, "unexpected return statement");
            return ret;
        };

        if !self.unit.types.types_equal(ret, expected) {
            let value_loc = value.map_or(loc, |v| self.pkg().ast.expr(v).loc);
            let (found, wanted) = (self.display(ret), self.display(expected));
            self.err(
                value_loc,
                format!("incorrect return type '{found}' expected '{wanted}'"),
            );
        }
        ret
    }

    fn resolve_assign_stmt(
        &mut self,
        op: AssignOp,
        lhs: &[ExprId],
        rhs: &[ExprId],
        loc: Loc,
    ) -> TypeId {
        for (i, &target) in lhs.iter().enumerate() {
            let Some(&source) = rhs.get(i) else {
                break;
            };

            let lhs_type = self.resolve_expr(target);
            let target_loc = self.pkg().ast.expr(target).loc;
            if lhs_type == TypeId::VOID {
                self.err(target_loc, "cannot assign into a void type");
            }

            let rhs_type = self.resolve_expr(source);
            let source_loc = self.pkg().ast.expr(source).loc;
            if rhs_type == TypeId::VOID {
                self.err(source_loc, "cannot assign a void type");
            }

            // `v *= m` keeps the vector on the left when widths agree.
            if op == AssignOp::Mul {
                if let (Some((_, vec_width)), Some(mat_width)) =
                    (self.vec_parts(lhs_type), self.mat_width(rhs_type))
                {
                    if vec_width == mat_width {
                        continue;
                    }
                    let (a, b) = (self.display(lhs_type), self.display(rhs_type));
                    self.err(
                        loc,
                        format!("width mismatch in multiply operation '{a}' * '{b}'"),
                    );
                }
            }

            if !self.can_assign(lhs_type, source) {
                if op.is_shift() {
                    if !self.unit.types.has_bit_ops(rhs_type) {
                        let shown = self.display(rhs_type);
                        self.err(
                            source_loc,
                            format!("type '{shown}' cannot be used in a bitwise shift operation"),
                        );
                    } else if self.unit.types.width(lhs_type) != self.unit.types.width(rhs_type) {
                        let (a, b) = (self.display(rhs_type), self.display(lhs_type));
                        self.err(
                            source_loc,
                            format!(
                                "type '{a}' is not compatible with '{b}' in a bitwise shift operation"
                            ),
                        );
                    }
                } else {
                    let (a, b) = (self.display(lhs_type), self.display(rhs_type));
                    self.err(
                        source_loc,
                        format!(
                            "type mismatch in assignment statement, expected '{a}' but found '{b}'"
                        ),
                    );
                }
            }

            match self.mode(target) {
                AddressMode::Variable => {}
                AddressMode::Const => {
                    self.err(target_loc, "cannot assign into a constant value");
                }
                AddressMode::ComputedValue => {
                    self.err(target_loc, "cannot assign into a computed value");
                }
                AddressMode::None => {
                    self.err(target_loc, "you can only assign into variables");
                }
            }
        }
        TypeId::VOID
    }

    /// Local declarations create symbols and resolve them immediately;
    /// shadowing an outer name is allowed.
    fn resolve_decl_stmt(&mut self, decl_id: DeclId) -> TypeId {
        let decl = self.decl(decl_id);
        let file = decl.loc.file;
        match decl.kind {
            DeclKind::Const { names, sign, values } => {
                for (i, name) in names.iter().enumerate() {
                    let kind = SymbolKind::Const {
                        decl: decl_id,
                        sign: sign.clone(),
                        value: values.get(i).copied(),
                        folded: None,
                    };
                    let id = self.add_new_symbol(Symbol::new(*name, file, self.pkg, kind));
                    self.resolve_symbol(self.sym_ref(id));
                }
            }
            DeclKind::Var { names, sign, values } => {
                for (i, name) in names.iter().enumerate() {
                    let kind = SymbolKind::Var {
                        decl: Some(decl_id),
                        sign: sign.clone(),
                        value: values.get(i).copied(),
                        is_uniform: false,
                        binding: None,
                        binding_processed: false,
                    };
                    let id = self.add_new_symbol(Symbol::new(*name, file, self.pkg, kind));
                    self.resolve_symbol(self.sym_ref(id));
                }
            }
            DeclKind::Func { .. } => {
                let id = self.add_func_symbol(decl_id);
                self.resolve_symbol(self.sym_ref(id));
            }
            _ => {}
        }
        TypeId::VOID
    }

    // ===== Termination analysis =====

    /// A `return` terminates; a block terminates iff its last statement
    /// does; a `for` with a condition may not enter; an `if` terminates
    /// iff every branch (including a present `else`) does.
    pub(crate) fn stmt_terminates(&self, s: StmtId) -> TerminationInfo {
        let stmt = self.pkg().ast.stmt(s);
        match &stmt.kind {
            StmtKind::Block(stmts) => match stmts.last() {
                Some(&last) => self.stmt_terminates(last),
                None => TerminationInfo::falls_through(stmt.loc, "empty block does not return"),
            },
            StmtKind::Return(_) => TerminationInfo::returns(stmt.loc),
            StmtKind::For { cond, body, .. } => {
                if cond.is_some() {
                    return TerminationInfo::falls_through(
                        stmt.loc,
                        "for loop with condition may not enter and thus will not return",
                    );
                }
                self.stmt_terminates(*body)
            }
            StmtKind::If { bodies, else_body, .. } => {
                for &body in bodies {
                    let info = self.stmt_terminates(body);
                    if !info.will_return {
                        return TerminationInfo::falls_through(
                            info.loc,
                            "one of the if branches does not end with return statement",
                        );
                    }
                }
                match else_body {
                    Some(else_body) => {
                        let info = self.stmt_terminates(*else_body);
                        if !info.will_return {
                            return TerminationInfo::falls_through(
                                info.loc,
                                "one of the if branches does not end with return statement",
                            );
                        }
                    }
                    None => {
                        return TerminationInfo::falls_through(
                            stmt.loc,
                            "if statement is missing else branch",
                        );
                    }
                }
                TerminationInfo::returns(stmt.loc)
            }
            _ => TerminationInfo::falls_through(
                stmt.loc,
                "the function body does not end with a return statement",
            ),
        }
    }
}
