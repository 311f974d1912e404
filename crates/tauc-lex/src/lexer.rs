//! Core lexer implementation.

use tauc_util::{CompileError, Coord, Result, Span};

use crate::cursor::Cursor;
use crate::token::{Token, TokenKind};

/// Lexer for the Tau language.
///
/// Produces one token per call to [`next_token`]; [`tokenize`] drives it to
/// completion and returns the whole stream, `Eof` token included.
///
/// [`next_token`]: Lexer::next_token
/// [`tokenize`]: Lexer::tokenize
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            cursor: Cursor::new(source),
        }
    }

    /// Scan the whole source, returning the token stream terminated by an
    /// `Eof` token.
    pub fn tokenize(source: &str) -> Result<Vec<Token>> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    /// Return the next token from the source.
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_trivia();

        let start = self.cursor.coord();

        if self.cursor.is_at_end() {
            return Ok(Token::new(TokenKind::Eof, "", Span::point(start)));
        }

        let c = self.cursor.current_char();
        match c {
            '(' => Ok(self.punct(TokenKind::LParen, start)),
            ')' => Ok(self.punct(TokenKind::RParen, start)),
            '{' => Ok(self.punct(TokenKind::LBrace, start)),
            '}' => Ok(self.punct(TokenKind::RBrace, start)),
            '[' => Ok(self.punct(TokenKind::LBracket, start)),
            ']' => Ok(self.punct(TokenKind::RBracket, start)),
            ',' => Ok(self.punct(TokenKind::Comma, start)),
            ':' => Ok(self.punct(TokenKind::Colon, start)),
            '+' => Ok(self.punct(TokenKind::Plus, start)),
            '-' => Ok(self.punct(TokenKind::Minus, start)),
            '*' => Ok(self.punct(TokenKind::Star, start)),
            '/' => Ok(self.punct(TokenKind::Slash, start)),
            '=' => Ok(self.punct_or_eq(TokenKind::Assign, TokenKind::EqEq, start)),
            '<' => Ok(self.punct_or_eq(TokenKind::Lt, TokenKind::Le, start)),
            '>' => Ok(self.punct_or_eq(TokenKind::Gt, TokenKind::Ge, start)),
            '!' => {
                if self.cursor.char_at(1) == '=' {
                    self.cursor.advance();
                    self.cursor.advance();
                    Ok(self.fixed(TokenKind::Ne, start))
                } else {
                    Err(self.invalid_char(c, start))
                }
            }
            c if c.is_ascii_digit() => Ok(self.lex_number(start)),
            c if c.is_ascii_alphabetic() || c == '_' => Ok(self.lex_identifier(start)),
            c => Err(self.invalid_char(c, start)),
        }
    }

    /// Skip whitespace and `// ...` line comments.
    fn skip_trivia(&mut self) {
        loop {
            match self.cursor.current_char() {
                ' ' | '\t' | '\r' | '\n' => self.cursor.advance(),
                '/' if self.cursor.char_at(1) == '/' => {
                    while !self.cursor.is_at_end() && self.cursor.current_char() != '\n' {
                        self.cursor.advance();
                    }
                }
                _ => return,
            }
        }
    }

    fn punct(&mut self, kind: TokenKind, start: Coord) -> Token {
        self.cursor.advance();
        self.fixed(kind, start)
    }

    /// A one-character token, or its `=`-suffixed two-character form.
    fn punct_or_eq(&mut self, single: TokenKind, double: TokenKind, start: Coord) -> Token {
        self.cursor.advance();
        if self.cursor.current_char() == '=' {
            self.cursor.advance();
            self.fixed(double, start)
        } else {
            self.fixed(single, start)
        }
    }

    /// Build a fixed token whose lexeme is its kind's spelling.
    fn fixed(&self, kind: TokenKind, start: Coord) -> Token {
        Token::new(kind, kind.as_str(), Span::new(start, self.cursor.coord()))
    }

    fn lex_number(&mut self, start: Coord) -> Token {
        let mut value = String::new();
        while self.cursor.current_char().is_ascii_digit() {
            value.push(self.cursor.current_char());
            self.cursor.advance();
        }
        Token::new(TokenKind::Int, value, Span::new(start, self.cursor.coord()))
    }

    fn lex_identifier(&mut self, start: Coord) -> Token {
        let mut value = String::new();
        loop {
            let c = self.cursor.current_char();
            if c.is_ascii_alphanumeric() || c == '_' {
                value.push(c);
                self.cursor.advance();
            } else {
                break;
            }
        }
        let span = Span::new(start, self.cursor.coord());
        match TokenKind::keyword(&value) {
            Some(kind) => Token::new(kind, value, span),
            None => Token::new(TokenKind::Id, value, span),
        }
    }

    fn invalid_char(&mut self, c: char, start: Coord) -> CompileError {
        self.cursor.advance();
        CompileError::lex(
            format!("invalid character '{c}'"),
            Span::new(start, self.cursor.coord()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::tokenize(source)
            .expect("scan failed")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_empty_source() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
        assert_eq!(kinds("   \n\t  "), vec![TokenKind::Eof]);
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            kinds("func main whiley"),
            vec![
                TokenKind::Func,
                TokenKind::Id,
                TokenKind::Id,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_punctuation() {
        assert_eq!(
            kinds("( ) { } [ ] , :"),
            vec![
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::LBracket,
                TokenKind::RBracket,
                TokenKind::Comma,
                TokenKind::Colon,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_two_char_operators() {
        assert_eq!(
            kinds("< <= > >= = == !="),
            vec![
                TokenKind::Lt,
                TokenKind::Le,
                TokenKind::Gt,
                TokenKind::Ge,
                TokenKind::Assign,
                TokenKind::EqEq,
                TokenKind::Ne,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_adjacent_operators() {
        // `x<=1` with no spaces
        assert_eq!(
            kinds("x<=1"),
            vec![TokenKind::Id, TokenKind::Le, TokenKind::Int, TokenKind::Eof]
        );
    }

    #[test]
    fn test_int_literal_value() {
        let tokens = Lexer::tokenize("print 1234").expect("scan failed");
        assert_eq!(tokens[1].kind, TokenKind::Int);
        assert_eq!(tokens[1].value, "1234");
    }

    #[test]
    fn test_int_stops_at_letter() {
        assert_eq!(
            kinds("12ab"),
            vec![TokenKind::Int, TokenKind::Id, TokenKind::Eof]
        );
    }

    #[test]
    fn test_comments_skipped() {
        assert_eq!(
            kinds("var // x: int\nprint // trailing"),
            vec![TokenKind::Var, TokenKind::Print, TokenKind::Eof]
        );
    }

    #[test]
    fn test_spans_are_half_open() {
        let tokens = Lexer::tokenize("if x").expect("scan failed");
        assert_eq!(tokens[0].span.start, Coord::new(1, 1));
        assert_eq!(tokens[0].span.end, Coord::new(3, 1));
        assert_eq!(tokens[1].span.start, Coord::new(4, 1));
        assert_eq!(tokens[1].span.end, Coord::new(5, 1));
    }

    #[test]
    fn test_spans_across_lines() {
        let tokens = Lexer::tokenize("a\n  b").expect("scan failed");
        assert_eq!(tokens[1].span.start, Coord::new(3, 2));
        assert_eq!(tokens[1].span.end, Coord::new(4, 2));
    }

    #[test]
    fn test_invalid_character() {
        let err = Lexer::tokenize("var x # int").expect_err("expected lex error");
        assert!(matches!(err, CompileError::Lex { .. }));
        assert_eq!(err.span().start, Coord::new(7, 1));
    }

    #[test]
    fn test_lone_bang_is_invalid() {
        let err = Lexer::tokenize("a ! b").expect_err("expected lex error");
        assert!(matches!(err, CompileError::Lex { .. }));
    }

    #[test]
    fn test_eof_token_terminates_stream() {
        let tokens = Lexer::tokenize("x").expect("scan failed");
        assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
    }
}
