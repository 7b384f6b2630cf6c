//! Lexer for the Sabre shading language, built on logos with string
//! interning.
//!
//! The entry point is [`lex()`], which converts source text into a
//! [`TokenList`]. Invalid input produces `TokenKind::Error` tokens and the
//! lexer continues, allowing partial parsing of malformed source. The
//! stream always ends with an `Eof` token.

mod raw_token;

use logos::Logos;
use raw_token::RawToken;
use sabre_ir::{Span, StringInterner, Token, TokenKind, TokenList};

/// Lex source code into a [`TokenList`].
///
/// Literal payloads are cooked here: integer and float literals parse to
/// `i64`/`f64`, identifiers and string-literal contents intern through
/// `interner`. Integer literals that overflow `i64` become error tokens.
pub fn lex(source: &str, interner: &StringInterner) -> TokenList {
    let mut result = TokenList::new();
    let mut logos = RawToken::lexer(source);

    while let Some(token_result) = logos.next() {
        let span = Span::from_range(logos.span());
        let slice = logos.slice();

        match token_result {
            Ok(raw) => {
                let kind = cook_token(raw, slice, interner);
                result.push(Token::new(kind, span));
            }
            Err(()) => {
                result.push(Token::new(TokenKind::Error, span));
            }
        }
    }

    let eof_span = Span::point(source.len() as u32);
    result.push(Token::new(TokenKind::Eof, eof_span));
    result
}

/// Convert a raw token into its cooked [`TokenKind`].
fn cook_token(raw: RawToken, slice: &str, interner: &StringInterner) -> TokenKind {
    match raw {
        RawToken::Int => match slice.parse::<i64>() {
            Ok(value) => TokenKind::Int(value),
            Err(_) => TokenKind::Error,
        },
        RawToken::Float => match slice.parse::<f64>() {
            Ok(value) => TokenKind::Float(value),
            Err(_) => TokenKind::Error,
        },
        RawToken::Str => {
            // Quotes are part of the match; strip them.
            let content = &slice[1..slice.len() - 1];
            TokenKind::Str(interner.intern(content))
        }
        RawToken::Ident => TokenKind::Ident(interner.intern(slice)),

        RawToken::KwConst => TokenKind::KwConst,
        RawToken::KwVar => TokenKind::KwVar,
        RawToken::KwFunc => TokenKind::KwFunc,
        RawToken::KwStruct => TokenKind::KwStruct,
        RawToken::KwEnum => TokenKind::KwEnum,
        RawToken::KwImport => TokenKind::KwImport,
        RawToken::KwIf => TokenKind::KwIf,
        RawToken::KwElse => TokenKind::KwElse,
        RawToken::KwFor => TokenKind::KwFor,
        RawToken::KwBreak => TokenKind::KwBreak,
        RawToken::KwContinue => TokenKind::KwContinue,
        RawToken::KwDiscard => TokenKind::KwDiscard,
        RawToken::KwReturn => TokenKind::KwReturn,
        RawToken::KwTrue => TokenKind::KwTrue,
        RawToken::KwFalse => TokenKind::KwFalse,
        RawToken::KwAs => TokenKind::KwAs,

        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Semicolon => TokenKind::Semicolon,
        RawToken::Dot => TokenKind::Dot,
        RawToken::At => TokenKind::At,

        RawToken::Inc => TokenKind::Inc,
        RawToken::Dec => TokenKind::Dec,
        RawToken::PlusAssign => TokenKind::PlusAssign,
        RawToken::MinusAssign => TokenKind::MinusAssign,
        RawToken::StarAssign => TokenKind::StarAssign,
        RawToken::SlashAssign => TokenKind::SlashAssign,
        RawToken::PercentAssign => TokenKind::PercentAssign,
        RawToken::AmpAssign => TokenKind::AmpAssign,
        RawToken::PipeAssign => TokenKind::PipeAssign,
        RawToken::CaretAssign => TokenKind::CaretAssign,
        RawToken::ShlAssign => TokenKind::ShlAssign,
        RawToken::ShrAssign => TokenKind::ShrAssign,
        RawToken::Shl => TokenKind::Shl,
        RawToken::Shr => TokenKind::Shr,
        RawToken::AndAnd => TokenKind::AndAnd,
        RawToken::OrOr => TokenKind::OrOr,
        RawToken::EqEq => TokenKind::EqEq,
        RawToken::Ne => TokenKind::Ne,
        RawToken::Le => TokenKind::Le,
        RawToken::Ge => TokenKind::Ge,
        RawToken::Plus => TokenKind::Plus,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Star => TokenKind::Star,
        RawToken::Slash => TokenKind::Slash,
        RawToken::Percent => TokenKind::Percent,
        RawToken::Amp => TokenKind::Amp,
        RawToken::Pipe => TokenKind::Pipe,
        RawToken::Caret => TokenKind::Caret,
        RawToken::Tilde => TokenKind::Tilde,
        RawToken::Bang => TokenKind::Bang,
        RawToken::Lt => TokenKind::Lt,
        RawToken::Gt => TokenKind::Gt,
        RawToken::Assign => TokenKind::Assign,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let interner = StringInterner::new();
        lex(source, &interner).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lex_declaration() {
        let interner = StringInterner::new();
        let tokens = lex("const x = 42;", &interner);
        let expected = vec![
            TokenKind::KwConst,
            TokenKind::Ident(interner.intern("x")),
            TokenKind::Assign,
            TokenKind::Int(42),
            TokenKind::Semicolon,
            TokenKind::Eof,
        ];
        let actual: Vec<_> = (&tokens).into_iter().map(|t| t.kind).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn lex_float_and_leading_dot() {
        assert_eq!(
            kinds("1.5"),
            vec![TokenKind::Float(1.5), TokenKind::Eof]
        );
        // `.5` is not a float literal; the parser reports the mistake.
        assert_eq!(
            kinds(".5"),
            vec![TokenKind::Dot, TokenKind::Int(5), TokenKind::Eof]
        );
    }

    #[test]
    fn lex_compound_operators() {
        let tokens = kinds("a <<= b >> 2");
        assert!(matches!(tokens[0], TokenKind::Ident(_)));
        assert_eq!(tokens[1], TokenKind::ShlAssign);
        assert!(matches!(tokens[2], TokenKind::Ident(_)));
        assert_eq!(tokens[3], TokenKind::Shr);
        assert_eq!(tokens[4], TokenKind::Int(2));
        assert_eq!(tokens[5], TokenKind::Eof);
    }

    #[test]
    fn lex_comments_and_tags() {
        let tokens = kinds("@vertex // entry point\nfunc main() {}");
        assert_eq!(tokens[0], TokenKind::At);
        assert!(matches!(tokens[1], TokenKind::Ident(_)));
        assert_eq!(tokens[2], TokenKind::KwFunc);
    }

    #[test]
    fn lex_error_recovers() {
        let tokens = kinds("var x = $ 1;");
        assert!(tokens.contains(&TokenKind::Error));
        assert!(tokens.contains(&TokenKind::Int(1)));
    }

    #[test]
    fn lex_string_literal_strips_quotes() {
        let interner = StringInterner::new();
        let tokens = lex("import \"std/math\";", &interner);
        let expected_name = interner.intern("std/math");
        assert_eq!(tokens[1].kind, TokenKind::Str(expected_name));
    }

    #[test]
    fn int_overflow_is_an_error_token() {
        assert_eq!(
            kinds("99999999999999999999"),
            vec![TokenKind::Error, TokenKind::Eof]
        );
    }
}
