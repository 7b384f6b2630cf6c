//! Expression parsing: precedence climbing over unary and postfix chains.

use crate::Parser;
use sabre_ir::{ast::Ident, BinaryOp, ComplitField, Expr, ExprId, ExprKind, Span, TokenKind,
    TypeSign, TypeSignAtom, UnaryOp};

/// Binding powers; higher binds tighter.
fn binary_prec(kind: &TokenKind) -> Option<(BinaryOp, u8)> {
    let entry = match kind {
        TokenKind::OrOr => (BinaryOp::LogicOr, 1),
        TokenKind::AndAnd => (BinaryOp::LogicAnd, 2),
        TokenKind::Pipe => (BinaryOp::BitOr, 3),
        TokenKind::Caret => (BinaryOp::BitXor, 4),
        TokenKind::Amp => (BinaryOp::BitAnd, 5),
        TokenKind::EqEq => (BinaryOp::Eq, 6),
        TokenKind::Ne => (BinaryOp::Ne, 6),
        TokenKind::Lt => (BinaryOp::Lt, 7),
        TokenKind::Le => (BinaryOp::Le, 7),
        TokenKind::Gt => (BinaryOp::Gt, 7),
        TokenKind::Ge => (BinaryOp::Ge, 7),
        TokenKind::Shl => (BinaryOp::Shl, 8),
        TokenKind::Shr => (BinaryOp::Shr, 8),
        TokenKind::Plus => (BinaryOp::Add, 9),
        TokenKind::Minus => (BinaryOp::Sub, 9),
        TokenKind::Star => (BinaryOp::Mul, 10),
        TokenKind::Slash => (BinaryOp::Div, 10),
        TokenKind::Percent => (BinaryOp::Rem, 10),
        _ => return None,
    };
    Some(entry)
}

fn unary_op(kind: &TokenKind) -> Option<UnaryOp> {
    let op = match kind {
        TokenKind::Plus => UnaryOp::Pos,
        TokenKind::Minus => UnaryOp::Neg,
        TokenKind::Inc => UnaryOp::Inc,
        TokenKind::Dec => UnaryOp::Dec,
        TokenKind::Bang => UnaryOp::Not,
        TokenKind::Tilde => UnaryOp::BitNot,
        _ => return None,
    };
    Some(op)
}

impl Parser<'_> {
    /// Parse a full expression, including trailing `expr: type` casts.
    pub(crate) fn parse_expr(&mut self) -> Option<ExprId> {
        let mut expr = self.parse_binary(0)?;
        while self.cursor.eat(&TokenKind::Colon) {
            let sign = self.parse_type_sign()?;
            let span = self.expr_span(expr).merge(self.cursor.prev_span());
            expr = self.alloc_expr(ExprKind::Cast { base: expr, sign }, span);
        }
        Some(expr)
    }

    pub(crate) fn expr_span(&self, expr: ExprId) -> Span {
        self.arena.expr(expr).loc.span
    }

    pub(crate) fn alloc_expr(&mut self, kind: ExprKind, span: Span) -> ExprId {
        let loc = self.loc(span);
        self.arena.alloc_expr(Expr { kind, loc })
    }

    fn parse_binary(&mut self, min_prec: u8) -> Option<ExprId> {
        let mut lhs = self.parse_unary()?;
        while let Some((op, prec)) = binary_prec(self.cursor.kind()) {
            if prec < min_prec {
                break;
            }
            let op_span = self.cursor.advance().span;
            let rhs = self.parse_binary(prec + 1)?;
            let span = self.expr_span(lhs).merge(self.expr_span(rhs));
            lhs = self.alloc_expr(ExprKind::Binary { op, op_span, lhs, rhs }, span);
        }
        Some(lhs)
    }

    fn parse_unary(&mut self) -> Option<ExprId> {
        if let Some(op) = unary_op(self.cursor.kind()) {
            let op_span = self.cursor.advance().span;
            let base = self.parse_unary()?;
            let span = op_span.merge(self.expr_span(base));
            return Some(self.alloc_expr(ExprKind::Unary { op, base }, span));
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Option<ExprId> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.cursor.kind() {
                TokenKind::LParen => {
                    self.cursor.advance();
                    let mut args = Vec::new();
                    // Complit conditions do not extend into parentheses.
                    let saved = std::mem::replace(&mut self.no_complit, false);
                    while !self.cursor.check(&TokenKind::RParen) && !self.cursor.at_eof() {
                        match self.parse_expr() {
                            Some(arg) => args.push(arg),
                            None => break,
                        }
                        if !self.cursor.eat(&TokenKind::Comma) {
                            break;
                        }
                    }
                    self.no_complit = saved;
                    let close = self.expect(TokenKind::RParen)?;
                    let span = self.expr_span(expr).merge(close);
                    expr = self.alloc_expr(ExprKind::Call { base: expr, args }, span);
                }
                TokenKind::LBracket => {
                    self.cursor.advance();
                    let saved = std::mem::replace(&mut self.no_complit, false);
                    let index = self.parse_expr();
                    self.no_complit = saved;
                    let index = index?;
                    let close = self.expect(TokenKind::RBracket)?;
                    let span = self.expr_span(expr).merge(close);
                    expr = self.alloc_expr(ExprKind::Indexed { base: expr, index }, span);
                }
                TokenKind::Dot => {
                    self.cursor.advance();
                    let field = self.expect_ident()?;
                    let span = self.expr_span(expr).merge(field.span);
                    expr = self.alloc_expr(ExprKind::Dot { lhs: Some(expr), field }, span);
                }
                _ => break,
            }
        }
        Some(expr)
    }

    fn parse_primary(&mut self) -> Option<ExprId> {
        let span = self.cursor.span();
        match *self.cursor.kind() {
            TokenKind::Int(value) => {
                self.cursor.advance();
                Some(self.alloc_expr(ExprKind::IntLit(value), span))
            }
            TokenKind::Float(value) => {
                self.cursor.advance();
                Some(self.alloc_expr(ExprKind::FloatLit(value), span))
            }
            TokenKind::KwTrue => {
                self.cursor.advance();
                Some(self.alloc_expr(ExprKind::BoolLit(true), span))
            }
            TokenKind::KwFalse => {
                self.cursor.advance();
                Some(self.alloc_expr(ExprKind::BoolLit(false), span))
            }
            TokenKind::Ident(name) => {
                if !self.no_complit {
                    if let Some(complit) = self.try_parse_complit() {
                        return Some(complit);
                    }
                }
                self.cursor.advance();
                Some(self.alloc_expr(ExprKind::Ident(Ident::new(name, span)), span))
            }
            TokenKind::LParen => {
                self.cursor.advance();
                let saved = std::mem::replace(&mut self.no_complit, false);
                let inner = self.parse_expr();
                self.no_complit = saved;
                let inner = inner?;
                self.expect(TokenKind::RParen)?;
                Some(inner)
            }
            TokenKind::Dot => {
                self.cursor.advance();
                match *self.cursor.kind() {
                    TokenKind::Int(_) | TokenKind::Float(_) => {
                        let lit_span = self.cursor.advance().span;
                        let source_span = span.merge(lit_span);
                        self.error(
                            source_span,
                            "floating point numbers cannot omit the leading 0; write 0.x",
                        );
                        None
                    }
                    _ => {
                        let field = self.expect_ident()?;
                        let full = span.merge(field.span);
                        Some(self.alloc_expr(ExprKind::Dot { lhs: None, field }, full))
                    }
                }
            }
            TokenKind::LBrace if !self.no_complit => {
                self.parse_complit_body(TypeSign::new(), span)
            }
            ref other => {
                let found = other.describe();
                self.error(span, format!("expected expression but found {found}"));
                None
            }
        }
    }

    /// Speculatively parse `name{`, `pkg.name{` or `name<args>{` as a
    /// composite literal. Rolls the cursor back when the shape does not
    /// match.
    fn try_parse_complit(&mut self) -> Option<ExprId> {
        let snapshot = self.cursor.position();
        let pending_gt = self.pending_gt;
        let start = self.cursor.span();

        let sign = self.parse_complit_sign();
        match sign {
            Some(sign) if self.cursor.check(&TokenKind::LBrace) => {
                self.parse_complit_body(sign, start)
            }
            _ => {
                self.cursor.set_position(snapshot);
                self.pending_gt = pending_gt;
                None
            }
        }
    }

    /// The restricted signature grammar usable in front of a composite
    /// literal brace. Errors are suppressed; the caller rolls back.
    fn parse_complit_sign(&mut self) -> Option<TypeSign> {
        let first = match *self.cursor.kind() {
            TokenKind::Ident(name) => Ident::new(name, self.cursor.advance().span),
            _ => return None,
        };
        let (package, name) = if self.cursor.check(&TokenKind::Dot) {
            match *self.cursor.peek_kind(1) {
                TokenKind::Ident(second) => {
                    self.cursor.advance();
                    let span = self.cursor.advance().span;
                    (Some(first), Ident::new(second, span))
                }
                _ => return None,
            }
        } else {
            (None, first)
        };

        let atom = if self.cursor.check(&TokenKind::Lt) {
            // Only worth committing to if a brace follows the close.
            let args = self.parse_template_args_quietly()?;
            TypeSignAtom::Templated { package, name, args }
        } else {
            TypeSignAtom::Named { package, name }
        };
        Some(TypeSign { atoms: vec![atom] })
    }

    /// Template arguments without diagnostics; failure aborts the
    /// speculative composite-literal parse.
    fn parse_template_args_quietly(&mut self) -> Option<Vec<TypeSign>> {
        let diag_mark = self.diags.len();
        let args = self.parse_template_args();
        if args.is_none() {
            self.diags.truncate(diag_mark);
        }
        args
    }

    pub(crate) fn parse_complit_body(&mut self, sign: TypeSign, start: Span) -> Option<ExprId> {
        self.expect(TokenKind::LBrace)?;
        let saved = std::mem::replace(&mut self.no_complit, false);
        let mut fields = Vec::new();
        while !self.cursor.check(&TokenKind::RBrace) && !self.cursor.at_eof() {
            // `.name = value` is a keyed field; anything else is positional.
            let selector = if self.cursor.check(&TokenKind::Dot)
                && matches!(self.cursor.peek_kind(1), TokenKind::Ident(_))
                && matches!(self.cursor.peek_kind(2), TokenKind::Assign)
            {
                self.cursor.advance();
                let field = self.expect_ident()?;
                self.cursor.advance(); // '='
                Some(field)
            } else {
                None
            };
            let value = match self.parse_expr() {
                Some(value) => value,
                None => break,
            };
            fields.push(ComplitField { selector, value });
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.no_complit = saved;
        let close = self.expect(TokenKind::RBrace)?;
        let span = start.merge(close);
        Some(self.alloc_expr(ExprKind::Complit { sign, fields }, span))
    }
}
