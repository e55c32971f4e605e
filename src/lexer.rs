use crate::ast::Token;

/// 1-based character offset into a path string.
pub type Position = usize;

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    in_brackets: bool,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            in_brackets: false,
        }
    }

    /// Position of the next unread character.
    fn pos(&self) -> Position {
        self.position + 1
    }

    fn read(&mut self) -> Option<char> {
        let ch = self.input.get(self.position).copied()?;
        self.position += 1;
        Some(ch)
    }

    /// Push back the last character returned by `read`.
    fn unread(&mut self) {
        self.position -= 1;
    }

    fn read_bare_string(&mut self, start: Position, head: char) -> (Position, Token) {
        let mut result = String::from(head);

        while let Some(ch) = self.read() {
            if ch == '.' || ch == '[' {
                self.unread();
                break;
            }
            result.push(ch);
        }

        (start, Token::String(result))
    }

    fn read_quoted_string(&mut self, start: Position, quote: char) -> (Position, Token) {
        let mut result = String::new();

        loop {
            let at = self.pos();
            match self.read() {
                // string not terminated
                None => return (self.pos(), Token::Illegal(String::new())),
                Some('\\') => match self.read() {
                    Some(escaped) if escaped == '\\' || escaped == quote => result.push(escaped),
                    _ => return (at, Token::Illegal(String::new())),
                },
                Some(ch) if ch == quote => return (start, Token::String(result)),
                Some(ch) => result.push(ch),
            }
        }
    }

    fn read_number(&mut self, start: Position, head: char) -> (Position, Token) {
        let mut number = String::from(head);

        while let Some(ch) = self.read() {
            if is_digit(ch) {
                number.push(ch);
            } else {
                self.unread();
                break;
            }
        }

        if head == '0' && number.chars().count() > 1 {
            return (start, Token::Illegal(number));
        }
        (start, Token::Int(number))
    }

    pub fn next_token(&mut self) -> (Position, Token) {
        let start = self.pos();
        let Some(ch) = self.read() else {
            return (start, Token::Eof);
        };

        if self.in_brackets {
            return match ch {
                '\'' | '"' => self.read_quoted_string(start, ch),
                ']' => {
                    self.in_brackets = false;
                    (start, Token::RBracket)
                }
                ch if is_digit(ch) => self.read_number(start, ch),
                ch => (start, Token::Illegal(ch.to_string())),
            };
        }

        match ch {
            '$' if start == 1 => (start, Token::Root),
            '.' => (start, Token::Period),
            '[' => {
                self.in_brackets = true;
                (start, Token::LBracket)
            }
            ']' => {
                self.in_brackets = false;
                (start, Token::RBracket)
            }
            ch => self.read_bare_string(start, ch),
        }
    }
}

/// Zero of every run of ten Unicode decimal digits (general category Nd)
/// outside ASCII.
const DECIMAL_ZEROS: &[u32] = &[
    0x0660, 0x06F0, 0x07C0, 0x0966, 0x09E6, 0x0A66, 0x0AE6, 0x0B66, 0x0BE6, 0x0C66, 0x0CE6,
    0x0D66, 0x0DE6, 0x0E50, 0x0ED0, 0x0F20, 0x1040, 0x1090, 0x17E0, 0x1810, 0x1946, 0x19D0,
    0x1A80, 0x1A90, 0x1B50, 0x1BB0, 0x1C40, 0x1C50, 0xA620, 0xA8D0, 0xA900, 0xA9D0, 0xA9F0,
    0xAA50, 0xABF0, 0xFF10, 0x104A0, 0x10D30, 0x11066, 0x110F0, 0x11136, 0x111D0, 0x112F0,
    0x11450, 0x114D0, 0x11650, 0x116C0, 0x11730, 0x118E0, 0x11950, 0x11C50, 0x11D50, 0x11DA0,
    0x11F50, 0x16A60, 0x16AC0, 0x16B50, 0x1D7CE, 0x1D7D8, 0x1D7E2, 0x1D7EC, 0x1D7F6, 0x1E140,
    0x1E2F0, 0x1E4F0, 0x1E950, 0x1FBF0,
];

/// Decimal digits, including non-ASCII ones; the parser rejects those it
/// cannot convert. Other numerals such as `²` or `Ⅻ` are not digits.
fn is_digit(ch: char) -> bool {
    if ch.is_ascii() {
        return ch.is_ascii_digit();
    }
    let code = u32::from(ch);
    DECIMAL_ZEROS
        .iter()
        .any(|&zero| (zero..zero + 10).contains(&code))
}

#[test]
fn test_bare_string_stops_before_separators() {
    let mut lexer = Lexer::new("a]b.c[");
    assert_eq!(lexer.next_token(), (1, Token::String("a]b".to_string())));
    assert_eq!(lexer.next_token(), (4, Token::Period));
    assert_eq!(lexer.next_token(), (5, Token::String("c".to_string())));
    assert_eq!(lexer.next_token(), (6, Token::LBracket));
    assert_eq!(lexer.next_token(), (7, Token::Eof));
}

#[test]
fn test_root_only_at_start() {
    let mut lexer = Lexer::new("$.$ref");
    assert_eq!(lexer.next_token(), (1, Token::Root));
    assert_eq!(lexer.next_token(), (2, Token::Period));
    assert_eq!(lexer.next_token(), (3, Token::String("$ref".to_string())));
    assert_eq!(lexer.next_token(), (7, Token::Eof));
}

#[test]
fn test_eof_is_sticky() {
    let mut lexer = Lexer::new("a");
    lexer.next_token();
    assert_eq!(lexer.next_token(), (2, Token::Eof));
    assert_eq!(lexer.next_token(), (2, Token::Eof));
}
