use crate::error::Span;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    LeftParen,
    RightParen,

    // Literals
    Atom,
    Number,

    // Keywords
    Let,
    In,
    Lambda,
}

impl TokenKind {
    fn keyword(text: &str) -> Option<Self> {
        match text {
            "let" => Some(TokenKind::Let),
            "in" => Some(TokenKind::In),
            "lambda" => Some(TokenKind::Lambda),
            _ => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = match self {
            TokenKind::LeftParen => "'('",
            TokenKind::RightParen => "')'",
            TokenKind::Atom => "a symbol",
            TokenKind::Number => "a number",
            TokenKind::Let => "'let'",
            TokenKind::In => "'in'",
            TokenKind::Lambda => "'lambda'",
        };
        write!(f, "{}", text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: String, span: Span) -> Self {
        Self { kind, lexeme, span }
    }
}

/// Splits source text into tokens. Never fails: anything that is not a
/// parenthesis or whitespace ends up in a number, keyword or atom.
pub struct Lexer<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            tokens: Vec::new(),
            start: 0,
            current: 0,
        }
    }

    pub fn scan_tokens(mut self) -> Vec<Token> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token();
        }

        tracing::debug!(count = self.tokens.len(), "tokenized");
        self.tokens
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn scan_token(&mut self) {
        let c = self.advance();

        match c {
            '(' => self.add_token(TokenKind::LeftParen),
            ')' => self.add_token(TokenKind::RightParen),
            c if is_separator(c) => {}
            _ => self.word(),
        }
    }

    fn advance(&mut self) -> char {
        match self.peek() {
            Some(c) => {
                self.current += c.len_utf8();
                c
            }
            None => '\0',
        }
    }

    fn peek(&self) -> Option<char> {
        self.source[self.current..].chars().next()
    }

    fn word(&mut self) {
        while let Some(c) = self.peek() {
            if is_separator(c) || c == '(' || c == ')' {
                break;
            }
            self.advance();
        }

        let text = &self.source[self.start..self.current];
        let kind = if is_number(text) {
            TokenKind::Number
        } else {
            TokenKind::keyword(text).unwrap_or(TokenKind::Atom)
        };

        self.add_token(kind);
    }

    fn add_token(&mut self, kind: TokenKind) {
        let text = &self.source[self.start..self.current];
        self.tokens.push(Token::new(
            kind,
            text.to_string(),
            Span::new(self.start, self.current),
        ));
    }
}

pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).scan_tokens()
}

fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

/// `[+-]?[0-9]+`
fn is_number(text: &str) -> bool {
    let digits = text.strip_prefix(&['+', '-'][..]).unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}
