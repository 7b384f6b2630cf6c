//! Statement parsing.

use crate::Parser;
use sabre_ir::{AssignOp, Span, Stmt, StmtId, StmtKind, TokenKind};

fn assign_op(kind: &TokenKind) -> Option<AssignOp> {
    let op = match kind {
        TokenKind::Assign => AssignOp::Assign,
        TokenKind::PlusAssign => AssignOp::Add,
        TokenKind::MinusAssign => AssignOp::Sub,
        TokenKind::StarAssign => AssignOp::Mul,
        TokenKind::SlashAssign => AssignOp::Div,
        TokenKind::PercentAssign => AssignOp::Rem,
        TokenKind::AmpAssign => AssignOp::BitAnd,
        TokenKind::PipeAssign => AssignOp::BitOr,
        TokenKind::CaretAssign => AssignOp::BitXor,
        TokenKind::ShlAssign => AssignOp::Shl,
        TokenKind::ShrAssign => AssignOp::Shr,
        _ => return None,
    };
    Some(op)
}

impl Parser<'_> {
    pub(crate) fn alloc_stmt(&mut self, kind: StmtKind, span: Span) -> StmtId {
        let loc = self.loc(span);
        self.arena.alloc_stmt(Stmt { kind, loc })
    }

    pub(crate) fn parse_stmt(&mut self) -> Option<StmtId> {
        let span = self.cursor.span();
        match self.cursor.kind() {
            TokenKind::KwBreak => {
                self.cursor.advance();
                self.expect(TokenKind::Semicolon)?;
                Some(self.alloc_stmt(StmtKind::Break, span))
            }
            TokenKind::KwContinue => {
                self.cursor.advance();
                self.expect(TokenKind::Semicolon)?;
                Some(self.alloc_stmt(StmtKind::Continue, span))
            }
            TokenKind::KwDiscard => {
                self.cursor.advance();
                self.expect(TokenKind::Semicolon)?;
                Some(self.alloc_stmt(StmtKind::Discard, span))
            }
            TokenKind::KwReturn => {
                self.cursor.advance();
                let value = if self.cursor.check(&TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                let end = self.expect(TokenKind::Semicolon)?;
                Some(self.alloc_stmt(StmtKind::Return(value), span.merge(end)))
            }
            TokenKind::KwIf => self.parse_if_stmt(),
            TokenKind::KwFor => self.parse_for_stmt(),
            TokenKind::LBrace => self.parse_block(),
            TokenKind::KwVar | TokenKind::KwConst | TokenKind::KwFunc => {
                let decl = self.parse_decl()?;
                let end = self.cursor.prev_span();
                Some(self.alloc_stmt(StmtKind::Decl(decl), span.merge(end)))
            }
            _ => {
                let stmt = self.parse_simple_stmt()?;
                self.expect(TokenKind::Semicolon)?;
                Some(stmt)
            }
        }
    }

    /// `{ stmt* }`
    pub(crate) fn parse_block(&mut self) -> Option<StmtId> {
        let open = self.expect(TokenKind::LBrace)?;
        let mut stmts = Vec::new();
        while !self.cursor.check(&TokenKind::RBrace) && !self.cursor.at_eof() {
            match self.parse_stmt() {
                Some(stmt) => stmts.push(stmt),
                None => self.synchronize_stmt(),
            }
        }
        let close = self.expect(TokenKind::RBrace)?;
        Some(self.alloc_stmt(StmtKind::Block(stmts), open.merge(close)))
    }

    fn synchronize_stmt(&mut self) {
        while !self.cursor.at_eof() {
            match self.cursor.kind() {
                TokenKind::Semicolon => {
                    self.cursor.advance();
                    return;
                }
                TokenKind::RBrace => return,
                _ => {
                    self.cursor.advance();
                }
            }
        }
    }

    fn parse_if_stmt(&mut self) -> Option<StmtId> {
        let start = self.cursor.span();
        self.cursor.advance(); // 'if'

        let mut conds = Vec::new();
        let mut bodies = Vec::new();
        let mut else_body = None;

        let saved = std::mem::replace(&mut self.no_complit, true);
        let cond = self.parse_expr();
        self.no_complit = saved;
        conds.push(cond?);
        bodies.push(self.parse_block()?);

        while self.cursor.eat(&TokenKind::KwElse) {
            if self.cursor.eat(&TokenKind::KwIf) {
                let saved = std::mem::replace(&mut self.no_complit, true);
                let cond = self.parse_expr();
                self.no_complit = saved;
                conds.push(cond?);
                bodies.push(self.parse_block()?);
            } else {
                else_body = Some(self.parse_block()?);
                break;
            }
        }

        let span = start.merge(self.cursor.prev_span());
        Some(self.alloc_stmt(StmtKind::If { conds, bodies, else_body }, span))
    }

    /// `for { }` | `for cond { }` | `for init; cond; post { }`
    fn parse_for_stmt(&mut self) -> Option<StmtId> {
        let start = self.cursor.span();
        self.cursor.advance(); // 'for'

        let mut init = None;
        let mut cond = None;
        let mut post = None;

        if !self.cursor.check(&TokenKind::LBrace) {
            let saved = std::mem::replace(&mut self.no_complit, true);
            let header = self.parse_for_header(&mut init, &mut cond, &mut post);
            self.no_complit = saved;
            header?;
        }

        let body = self.parse_block()?;
        let span = start.merge(self.cursor.prev_span());
        Some(self.alloc_stmt(StmtKind::For { init, cond, post, body }, span))
    }

    fn parse_for_header(
        &mut self,
        init: &mut Option<StmtId>,
        cond: &mut Option<sabre_ir::ExprId>,
        post: &mut Option<StmtId>,
    ) -> Option<()> {
        if self.cursor.check(&TokenKind::KwVar) || self.cursor.check(&TokenKind::KwConst) {
            // `for var i = 0; cond; post { }`; the declaration eats its
            // own semicolon.
            let span = self.cursor.span();
            let decl = self.parse_decl()?;
            let end = self.cursor.prev_span();
            *init = Some(self.alloc_stmt(StmtKind::Decl(decl), span.merge(end)));
        } else {
            let first = self.parse_simple_stmt()?;
            if self.cursor.check(&TokenKind::LBrace) {
                // `for cond { }`
                if let StmtKind::Expr(expr) = &self.arena.stmt(first).kind {
                    *cond = Some(*expr);
                    return Some(());
                }
                self.error(self.cursor.span(), "for loop condition must be an expression");
                return None;
            }
            self.expect(TokenKind::Semicolon)?;
            *init = Some(first);
        }

        if !self.cursor.check(&TokenKind::Semicolon) {
            *cond = Some(self.parse_expr()?);
        }
        self.expect(TokenKind::Semicolon)?;

        if !self.cursor.check(&TokenKind::LBrace) {
            *post = Some(self.parse_simple_stmt()?);
        }
        Some(())
    }

    /// An expression statement or an assignment, with no trailing
    /// semicolon.
    fn parse_simple_stmt(&mut self) -> Option<StmtId> {
        let start = self.cursor.span();
        let mut lhs = vec![self.parse_expr()?];
        while self.cursor.eat(&TokenKind::Comma) {
            lhs.push(self.parse_expr()?);
        }

        if let Some(op) = assign_op(self.cursor.kind()) {
            self.cursor.advance();
            let mut rhs = vec![self.parse_expr()?];
            while self.cursor.eat(&TokenKind::Comma) {
                rhs.push(self.parse_expr()?);
            }
            if lhs.len() != rhs.len() {
                self.error(
                    start.merge(self.cursor.prev_span()),
                    format!(
                        "assignment mismatch: {} targets but {} values",
                        lhs.len(),
                        rhs.len()
                    ),
                );
            }
            let span = start.merge(self.cursor.prev_span());
            return Some(self.alloc_stmt(StmtKind::Assign { op, lhs, rhs }, span));
        }

        if lhs.len() > 1 {
            self.error(start, "expected assignment after expression list");
            return None;
        }
        let expr = lhs[0];
        let span = self.expr_span(expr);
        Some(self.alloc_stmt(StmtKind::Expr(expr), span))
    }
}
