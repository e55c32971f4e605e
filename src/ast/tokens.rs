use std::fmt;

/// Lexical tokens of the path language.
///
/// Literal-bearing tokens keep the text they were scanned from, so that the
/// parser can report it back in diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A character sequence that is not valid at its position
    ///
    /// Carries the offending text. Empty for an unterminated quoted string
    /// or a bad escape.
    Illegal(String),

    /// End of input
    Eof,

    /// Field name, either bare or quoted
    ///
    /// # Examples
    /// ```text
    /// name
    /// ['with.dots']
    /// ["double"]
    /// ```
    String(String),

    /// Decimal array index, only valid inside brackets
    ///
    /// Holds the digits exactly as written.
    ///
    /// # Examples
    /// ```text
    /// [0]
    /// [42]
    /// ```
    Int(String),

    /// Field separator `.`
    Period,

    /// Left bracket, enters bracket mode
    LBracket,

    /// Right bracket, leaves bracket mode
    RBracket,

    /// Root marker `$`, only as the first character of a path
    Root,
}

impl Token {
    /// The source text of the token.
    pub fn literal(&self) -> &str {
        match self {
            Token::Illegal(lit) | Token::String(lit) | Token::Int(lit) => lit,
            Token::Eof => "",
            Token::Period => ".",
            Token::LBracket => "[",
            Token::RBracket => "]",
            Token::Root => "$",
        }
    }

    /// The token category, ignoring any literal.
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::Illegal(_) => TokenKind::Illegal,
            Token::Eof => TokenKind::Eof,
            Token::String(_) => TokenKind::String,
            Token::Int(_) => TokenKind::Int,
            Token::Period => TokenKind::Period,
            Token::LBracket => TokenKind::LBracket,
            Token::RBracket => TokenKind::RBracket,
            Token::Root => TokenKind::Root,
        }
    }
}

/// Token categories, used when the parser states what it expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Illegal,
    Eof,
    String,
    Int,
    Period,
    LBracket,
    RBracket,
    Root,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Illegal => "illegal",
            TokenKind::Eof => "EOF",
            TokenKind::String => "string",
            TokenKind::Int => "int",
            TokenKind::Period => "period",
            TokenKind::LBracket => "lbrack",
            TokenKind::RBracket => "rbrack",
            TokenKind::Root => "root",
        };
        f.write_str(name)
    }
}
