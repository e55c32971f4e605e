use std::mem;

use crate::{
    ast::{Node, Token, TokenKind},
    lexer::{Lexer, Position},
};

/// A single syntax error and where it occurred.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{pos}: {message}")]
pub struct ParseError {
    pub pos: Position,
    pub message: String,
}

/// Every syntax error found in one path, in source order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", join_errors(.0))]
pub struct ParseErrors(pub Vec<ParseError>);

impl ParseErrors {
    /// The first error, which is usually the one worth showing.
    pub fn first(&self) -> Option<&ParseError> {
        self.0.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParseError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn join_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

pub struct Parser {
    lexer: Lexer,
    pos: Position,
    current_token: Token,
    errors: Vec<ParseError>,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Self {
        let (pos, current_token) = lexer.next_token();
        Parser {
            lexer,
            pos,
            current_token,
            errors: Vec::new(),
        }
    }

    /// Parse the whole path.
    ///
    /// Returns `Ok(None)` for an empty path. Parsing continues past errors so
    /// that all of them are reported together.
    pub fn parse(&mut self) -> Result<Option<Node>, ParseErrors> {
        let node = self.parse_path();
        if self.errors.is_empty() {
            Ok(node)
        } else {
            tracing::debug!(errors = self.errors.len(), "path failed to parse");
            Err(ParseErrors(mem::take(&mut self.errors)))
        }
    }

    fn advance(&mut self) {
        (self.pos, self.current_token) = self.lexer.next_token();
    }

    fn error(&mut self, pos: Position, message: String) {
        self.errors.push(ParseError { pos, message });
    }

    /// Report an error unless the current token is one of `expected`.
    /// Always advances, so a bad token can never stall the parser.
    fn expect(&mut self, expected: &[TokenKind]) {
        let found = self.current_token.kind();
        if !expected.contains(&found) {
            let expected = expected
                .iter()
                .map(|kind| format!("\"{}\"", kind))
                .collect::<Vec<_>>()
                .join(" or ");
            self.error(self.pos, format!("expected {} but found \"{}\"", expected, found));
        }
        self.advance();
    }

    fn parse_path(&mut self) -> Option<Node> {
        let mut node = self.parse_first()?;

        loop {
            match self.current_token {
                Token::Period => {
                    let pos = self.pos;
                    self.advance(); // consume '.'
                    node = self.parse_selector(pos, Some(node));
                }
                Token::LBracket => node = self.parse_bracket(Some(node)),
                Token::Eof => break,
                _ => self.expect(&[TokenKind::Period, TokenKind::LBracket]),
            }
        }
        Some(node)
    }

    fn parse_first(&mut self) -> Option<Node> {
        match self.current_token {
            Token::Root => {
                let node = Node::Root { pos: self.pos };
                self.advance();
                Some(node)
            }
            Token::String(_) => {
                let pos = self.pos;
                Some(self.parse_selector(pos, None))
            }
            Token::Period => {
                let pos = self.pos;
                self.advance(); // consume '.'
                Some(self.parse_selector(pos, None))
            }
            Token::LBracket => Some(self.parse_bracket(None)),
            Token::Eof => None,
            _ => {
                self.expect(&[TokenKind::Root, TokenKind::String, TokenKind::LBracket]);
                None
            }
        }
    }

    /// Parse the bare name of a `.name` selector; the period is already consumed.
    fn parse_selector(&mut self, pos: Position, parent: Option<Node>) -> Node {
        let name = self.current_token.literal().to_string();
        self.expect(&[TokenKind::String]);
        Node::Selector {
            pos,
            parent: parent.map(Box::new),
            name,
        }
    }

    /// Parse `[STRING]` or `[INT]`.
    fn parse_bracket(&mut self, parent: Option<Node>) -> Node {
        let pos = self.pos;
        self.advance(); // consume '['

        let parent = parent.map(Box::new);
        let node = match mem::replace(&mut self.current_token, Token::Eof) {
            Token::String(name) => {
                self.advance();
                Node::Selector { pos, parent, name }
            }
            Token::Int(literal) => {
                let index = self.parse_int(&literal);
                self.advance();
                Node::Index { pos, parent, index }
            }
            token => {
                self.current_token = token;
                self.expect(&[TokenKind::String, TokenKind::Int]);
                // the reported error discards the whole tree
                Node::Index { pos, parent, index: 0 }
            }
        };

        self.expect(&[TokenKind::RBracket]);
        node
    }

    fn parse_int(&mut self, literal: &str) -> usize {
        match literal.parse::<usize>() {
            Ok(index) => index,
            Err(_) => {
                self.error(self.pos, format!("{} is not an integer", literal));
                0
            }
        }
    }
}
