//! tauc-par - Parser (Syntactic Analyzer)
//!
//! A predictive recursive-descent parser for the Tau grammar, driven by
//! one-token lookahead:
//!
//! ```ebnf
//! program     = { func_decl } EOF ;
//! func_decl   = "func" ID "(" [ params ] ")" ":" type nest ;
//! params      = param { "," param } ;
//! param       = ID ":" type ;
//! declaration = "var" ID ":" type ;
//! type        = "int" | "bool" | "void" | "[" [ expr ] "]" type ;
//! nest        = "{" { declaration } { statement | nest } [ return ] "}" ;
//! statement   = call | print | if | while | equation ;
//! ```
//!
//! Expressions use layered precedence levels (lowest to highest): `or`,
//! `and`, comparison, additive, multiplicative, prefix unary, atom. Each
//! binary level folds left-associatively with a loop over same-precedence
//! operators; prefix unaries nest right-associatively.
//!
//! On an unexpected token the parser fails with a parse error carrying the
//! expected and found tokens; there is no recovery.

pub mod ast;
mod expr;
mod items;
mod stmt;
mod types;

pub use ast::*;

use tauc_lex::{Token, TokenKind};
use tauc_util::{CompileError, Result, Span};

/// Recursive-descent parser over a scanned token stream.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    next_node: u32,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let span = tokens.last().map(|t| Span::point(t.span.end)).unwrap_or(Span::DUMMY);
            tokens.push(Token::new(TokenKind::Eof, "", span));
        }
        Self {
            tokens,
            pos: 0,
            next_node: 0,
        }
    }

    /// Parse a whole token stream into a [`Program`].
    pub fn parse(tokens: Vec<Token>) -> Result<Program> {
        Parser::new(tokens).parse_program()
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            Err(self.expected(kind.as_str()))
        }
    }

    /// Parse error at the current token.
    fn expected(&self, what: &str) -> CompileError {
        let token = self.peek();
        CompileError::parse(what, token.to_string(), token.span)
    }

    fn fresh_node(&mut self) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        id
    }

    /// True if the current token can start an expression.
    fn at_expr_start(&self) -> bool {
        matches!(
            self.peek_kind(),
            TokenKind::LParen
                | TokenKind::Minus
                | TokenKind::Not
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Id
                | TokenKind::Int
        )
    }

    /// Parse an identifier token into an [`Id`] node.
    fn parse_ident(&mut self) -> Result<Id> {
        let token = self.expect(TokenKind::Id)?;
        Ok(Id {
            id: self.fresh_node(),
            name: token.value,
            span: token.span,
        })
    }
}
