//! Type signature parsing.
//!
//! A signature is a chain of array prefixes followed by a (possibly
//! package-qualified, possibly templated) named atom:
//! `[4]vec3`, `[]float`, `math.quat`, `box<int>`.

use crate::Parser;
use sabre_ir::{ast::Ident, TokenKind, TypeSign, TypeSignAtom};

impl Parser<'_> {
    pub(crate) fn parse_type_sign(&mut self) -> Option<TypeSign> {
        let mut atoms = Vec::new();

        // Array prefixes, outermost first.
        while self.cursor.check(&TokenKind::LBracket) {
            let open = self.cursor.advance().span;
            if self.cursor.check(&TokenKind::RBracket) {
                let close = self.cursor.advance().span;
                atoms.push(TypeSignAtom::Array { count: None, span: open.merge(close) });
            } else {
                let count = self.parse_expr()?;
                let close = self.expect(TokenKind::RBracket)?;
                atoms.push(TypeSignAtom::Array { count: Some(count), span: open.merge(close) });
            }
        }

        let first = self.expect_ident()?;
        let (package, name) = if self.cursor.check(&TokenKind::Dot) {
            self.cursor.advance();
            let name = self.expect_ident()?;
            (Some(first), name)
        } else {
            (None, first)
        };

        if self.cursor.check(&TokenKind::Lt) {
            let args = self.parse_template_args()?;
            atoms.push(TypeSignAtom::Templated { package, name, args });
        } else {
            atoms.push(TypeSignAtom::Named { package, name });
        }

        Some(TypeSign { atoms })
    }

    pub(crate) fn parse_template_args(&mut self) -> Option<Vec<TypeSign>> {
        self.expect(TokenKind::Lt)?;
        let mut args = Vec::new();
        loop {
            args.push(self.parse_type_sign()?);
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect_template_close()?;
        Some(args)
    }

    /// Close a template argument list. A `>>` closing two nested lists is
    /// split in half via `pending_gt`.
    fn expect_template_close(&mut self) -> Option<()> {
        if self.pending_gt {
            self.pending_gt = false;
            return Some(());
        }
        if self.cursor.eat(&TokenKind::Gt) {
            return Some(());
        }
        if self.cursor.check(&TokenKind::Shr) {
            self.cursor.advance();
            self.pending_gt = true;
            return Some(());
        }
        let found = self.cursor.kind().describe();
        self.error(self.cursor.span(), format!("expected '>' but found {found}"));
        None
    }

    /// Parse template parameter names in a declaration: `<T, U>`.
    pub(crate) fn parse_template_params(&mut self) -> Option<Vec<Ident>> {
        self.expect(TokenKind::Lt)?;
        let mut params = Vec::new();
        loop {
            params.push(self.expect_ident()?);
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::Gt)?;
        Some(params)
    }
}
