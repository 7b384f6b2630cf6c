//! Declaration parsing.

use crate::Parser;
use sabre_ir::{ast::Ident, Decl, DeclId, DeclKind, EnumFieldDecl, FuncParam, Span,
    StructFieldDecl, TagTable, TokenKind, TypeSign};

impl Parser<'_> {
    fn alloc_decl(&mut self, kind: DeclKind, tags: TagTable, span: Span) -> DeclId {
        let loc = self.loc(span);
        self.arena.alloc_decl(Decl { kind, tags, loc })
    }

    pub(crate) fn parse_decl(&mut self) -> Option<DeclId> {
        let tags = self.parse_tags();
        let span = self.cursor.span();
        match self.cursor.kind() {
            TokenKind::KwConst => self.parse_const_var(true, tags),
            TokenKind::KwVar => self.parse_const_var(false, tags),
            TokenKind::KwFunc => self.parse_func(tags),
            TokenKind::KwStruct => self.parse_struct(tags),
            TokenKind::KwEnum => self.parse_enum(tags),
            TokenKind::KwImport => self.parse_import(tags),
            TokenKind::KwIf => self.parse_if_decl(tags),
            ref other => {
                let found = other.describe();
                self.error(span, format!("expected declaration but found {found}"));
                None
            }
        }
    }

    /// `const a, b: T = x, y;` / `var a, b: T = x, y;`
    fn parse_const_var(&mut self, is_const: bool, tags: TagTable) -> Option<DeclId> {
        let start = self.cursor.advance().span;

        let mut names = vec![self.expect_ident()?];
        while self.cursor.eat(&TokenKind::Comma) {
            names.push(self.expect_ident()?);
        }

        let sign = if self.cursor.eat(&TokenKind::Colon) {
            self.parse_type_sign()?
        } else {
            TypeSign::new()
        };

        let mut values = Vec::new();
        if self.cursor.eat(&TokenKind::Assign) {
            values.push(self.parse_expr()?);
            while self.cursor.eat(&TokenKind::Comma) {
                values.push(self.parse_expr()?);
            }
        }

        let end = self.expect(TokenKind::Semicolon)?;
        let kind = if is_const {
            DeclKind::Const { names, sign, values }
        } else {
            DeclKind::Var { names, sign, values }
        };
        Some(self.alloc_decl(kind, tags, start.merge(end)))
    }

    /// `func name<T>(a, b: T): R { ... }`
    fn parse_func(&mut self, tags: TagTable) -> Option<DeclId> {
        let start = self.cursor.advance().span;
        let name = self.expect_ident()?;

        let templates = if self.cursor.check(&TokenKind::Lt) {
            self.parse_template_params()?
        } else {
            Vec::new()
        };

        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        while !self.cursor.check(&TokenKind::RParen) && !self.cursor.at_eof() {
            params.push(self.parse_func_param()?);
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen)?;

        let return_sign = if self.cursor.eat(&TokenKind::Colon) {
            self.parse_type_sign()?
        } else {
            TypeSign::new()
        };

        let body = if self.cursor.check(&TokenKind::LBrace) {
            Some(self.parse_block()?)
        } else {
            self.expect(TokenKind::Semicolon)?;
            None
        };

        let span = start.merge(self.cursor.prev_span());
        let kind = DeclKind::Func { name, templates, params, return_sign, body };
        Some(self.alloc_decl(kind, tags, span))
    }

    /// `a, b: T`
    fn parse_func_param(&mut self) -> Option<FuncParam> {
        let mut names = vec![self.expect_ident()?];
        while self.cursor.eat(&TokenKind::Comma) {
            names.push(self.expect_ident()?);
        }
        self.expect(TokenKind::Colon)?;
        let sign = self.parse_type_sign()?;
        Some(FuncParam { names, sign })
    }

    /// `struct Name<T> { a, b: T = default; ... }`
    fn parse_struct(&mut self, tags: TagTable) -> Option<DeclId> {
        let start = self.cursor.advance().span;
        let name = self.expect_ident()?;

        let templates = if self.cursor.check(&TokenKind::Lt) {
            self.parse_template_params()?
        } else {
            Vec::new()
        };

        self.expect(TokenKind::LBrace)?;
        let mut fields = Vec::new();
        while !self.cursor.check(&TokenKind::RBrace) && !self.cursor.at_eof() {
            let field_tags = self.parse_tags();
            let mut names = vec![self.expect_ident()?];
            while self.cursor.eat(&TokenKind::Comma) {
                names.push(self.expect_ident()?);
            }
            self.expect(TokenKind::Colon)?;
            let sign = self.parse_type_sign()?;
            let default_value = if self.cursor.eat(&TokenKind::Assign) {
                Some(self.parse_expr()?)
            } else {
                None
            };
            self.expect(TokenKind::Semicolon)?;
            fields.push(StructFieldDecl { names, sign, default_value, tags: field_tags });
        }
        let end = self.expect(TokenKind::RBrace)?;

        let kind = DeclKind::Struct { name, templates, fields };
        Some(self.alloc_decl(kind, tags, start.merge(end)))
    }

    /// `enum Name { A, B = 7, C }`
    fn parse_enum(&mut self, tags: TagTable) -> Option<DeclId> {
        let start = self.cursor.advance().span;
        let name = self.expect_ident()?;
        self.expect(TokenKind::LBrace)?;

        let mut fields = Vec::new();
        while !self.cursor.check(&TokenKind::RBrace) && !self.cursor.at_eof() {
            let field_name = self.expect_ident()?;
            let value = if self.cursor.eat(&TokenKind::Assign) {
                Some(self.parse_expr()?)
            } else {
                None
            };
            fields.push(EnumFieldDecl { name: field_name, value });
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        let end = self.expect(TokenKind::RBrace)?;

        let kind = DeclKind::Enum { name, fields };
        Some(self.alloc_decl(kind, tags, start.merge(end)))
    }

    /// `import "path";` / `import "path" as name;`
    fn parse_import(&mut self, tags: TagTable) -> Option<DeclId> {
        let start = self.cursor.advance().span;
        let path = match *self.cursor.kind() {
            TokenKind::Str(content) => Ident::new(content, self.cursor.advance().span),
            ref other => {
                let found = other.describe();
                self.error(
                    self.cursor.span(),
                    format!("expected package path string but found {found}"),
                );
                return None;
            }
        };
        let alias = if self.cursor.eat(&TokenKind::KwAs) {
            Some(self.expect_ident()?)
        } else {
            None
        };
        let end = self.expect(TokenKind::Semicolon)?;

        let kind = DeclKind::Import { path, alias };
        Some(self.alloc_decl(kind, tags, start.merge(end)))
    }

    /// Compile-time `if` over declaration blocks.
    fn parse_if_decl(&mut self, tags: TagTable) -> Option<DeclId> {
        let start = self.cursor.span();
        self.cursor.advance(); // 'if'

        let mut conds = Vec::new();
        let mut bodies = Vec::new();
        let mut else_body = Vec::new();

        let saved = std::mem::replace(&mut self.no_complit, true);
        let cond = self.parse_expr();
        self.no_complit = saved;
        conds.push(cond?);
        bodies.push(self.parse_decl_block()?);

        while self.cursor.eat(&TokenKind::KwElse) {
            if self.cursor.eat(&TokenKind::KwIf) {
                let saved = std::mem::replace(&mut self.no_complit, true);
                let cond = self.parse_expr();
                self.no_complit = saved;
                conds.push(cond?);
                bodies.push(self.parse_decl_block()?);
            } else {
                else_body = self.parse_decl_block()?;
                break;
            }
        }

        let span = start.merge(self.cursor.prev_span());
        let kind = DeclKind::If { conds, bodies, else_body };
        Some(self.alloc_decl(kind, tags, span))
    }

    fn parse_decl_block(&mut self) -> Option<Vec<DeclId>> {
        self.expect(TokenKind::LBrace)?;
        let mut decls = Vec::new();
        while !self.cursor.check(&TokenKind::RBrace) && !self.cursor.at_eof() {
            decls.push(self.parse_decl()?);
        }
        self.expect(TokenKind::RBrace)?;
        Some(decls)
    }
}
