//! Recursive-descent parser for the Sabre shading language.
//!
//! The entry point is [`parse_file`], which consumes a file's token stream
//! and appends declarations into the package's AST arena. Parse errors are
//! diagnostics; the parser synchronizes to the next declaration and keeps
//! going.

mod cursor;
mod grammar;

use cursor::Cursor;
use sabre_diagnostic::{Diagnostic, DiagnosticList};
use sabre_ir::{ast::Ident, AstArena, DeclId, FileId, Loc, Span, StringInterner, TokenKind,
    TokenList};

/// Parse one file's tokens into top-level declarations.
pub fn parse_file(
    tokens: &TokenList,
    file: FileId,
    strings: &StringInterner,
    arena: &mut AstArena,
    diags: &mut DiagnosticList,
) -> Vec<DeclId> {
    let mut parser = Parser {
        cursor: Cursor::new(tokens),
        file,
        strings,
        arena,
        diags,
        no_complit: false,
        pending_gt: false,
    };
    parser.parse_top_level()
}

/// Parser state for one file.
pub(crate) struct Parser<'a> {
    pub(crate) cursor: Cursor<'a>,
    pub(crate) file: FileId,
    pub(crate) strings: &'a StringInterner,
    pub(crate) arena: &'a mut AstArena,
    pub(crate) diags: &'a mut DiagnosticList,
    /// Inside an if/for header, a brace opens the body rather than a
    /// composite literal.
    pub(crate) no_complit: bool,
    /// Set when a `>>` token was split in half while closing nested
    /// template argument lists.
    pub(crate) pending_gt: bool,
}

impl Parser<'_> {
    fn parse_top_level(&mut self) -> Vec<DeclId> {
        let mut decls = Vec::new();
        while !self.cursor.at_eof() {
            match self.parse_decl() {
                Some(decl) => decls.push(decl),
                None => self.synchronize_decl(),
            }
        }
        decls
    }

    pub(crate) fn loc(&self, span: Span) -> Loc {
        Loc::new(self.file, span)
    }

    pub(crate) fn error(&mut self, span: Span, message: impl Into<String>) {
        self.diags.push(Diagnostic::error(self.loc(span), message));
    }

    /// Consume a token of the given kind or report what was found.
    pub(crate) fn expect(&mut self, kind: TokenKind) -> Option<Span> {
        if self.cursor.check(&kind) {
            Some(self.cursor.advance().span)
        } else {
            let found = self.cursor.kind().describe();
            self.error(
                self.cursor.span(),
                format!("expected {} but found {}", kind.describe(), found),
            );
            None
        }
    }

    pub(crate) fn expect_ident(&mut self) -> Option<Ident> {
        match *self.cursor.kind() {
            TokenKind::Ident(name) => {
                let span = self.cursor.advance().span;
                Some(Ident::new(name, span))
            }
            ref other => {
                let found = other.describe();
                self.error(self.cursor.span(), format!("expected identifier but found {found}"));
                None
            }
        }
    }

    /// Skip tokens until a plausible declaration boundary.
    fn synchronize_decl(&mut self) {
        self.cursor.advance();
        while !self.cursor.at_eof() {
            match self.cursor.kind() {
                TokenKind::Semicolon | TokenKind::RBrace => {
                    self.cursor.advance();
                    return;
                }
                TokenKind::KwConst
                | TokenKind::KwVar
                | TokenKind::KwFunc
                | TokenKind::KwStruct
                | TokenKind::KwEnum
                | TokenKind::KwImport
                | TokenKind::At => return,
                _ => {
                    self.cursor.advance();
                }
            }
        }
    }
}
