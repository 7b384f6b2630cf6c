//! Tag annotations: `@name` or `@name{key = value, ...}`.

use crate::Parser;
use sabre_ir::{Tag, TagArg, TagTable, TagValue, TokenKind};

impl Parser<'_> {
    /// Parse zero or more leading tags.
    pub(crate) fn parse_tags(&mut self) -> TagTable {
        let mut table = TagTable::new();
        while self.cursor.check(&TokenKind::At) {
            self.cursor.advance();
            let Some(name) = self.expect_ident() else {
                break;
            };
            let mut tag = Tag::new(name);
            if self.cursor.eat(&TokenKind::LBrace) {
                self.parse_tag_args(&mut tag);
            }
            if table.insert(tag).is_some() {
                let tag_name = self.strings.lookup(name.name);
                self.error(name.span, format!("'{tag_name}' tag redefinition"));
            }
        }
        table
    }

    fn parse_tag_args(&mut self, tag: &mut Tag) {
        while !self.cursor.check(&TokenKind::RBrace) && !self.cursor.at_eof() {
            let Some(key) = self.expect_ident() else {
                break;
            };
            if self.expect(TokenKind::Assign).is_none() {
                break;
            }
            let span = self.cursor.span();
            let value = match *self.cursor.kind() {
                TokenKind::Int(v) => TagValue::Int(v),
                TokenKind::Float(v) => TagValue::Float(v),
                TokenKind::KwTrue => TagValue::Bool(true),
                TokenKind::KwFalse => TagValue::Bool(false),
                TokenKind::Ident(name) => TagValue::Ident(name),
                ref other => {
                    let found = other.describe();
                    self.error(span, format!("expected tag argument value but found {found}"));
                    break;
                }
            };
            self.cursor.advance();
            tag.args.insert(key.name, TagArg { value, span });
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBrace);
    }
}
