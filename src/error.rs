use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use std::fmt;

use crate::lexer::TokenKind;

/// Byte range into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn single(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos + 1,
        }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(&self, other: &Span) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// What the parser was looking for when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    Token(TokenKind),
    Expression,
    /// The operation name right after `(`.
    FormHead,
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expected::Token(kind) => write!(f, "{}", kind),
            Expected::Expression => write!(f, "an expression"),
            Expected::FormHead => write!(f, "an operation name, 'let' or 'lambda'"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    EmptyInput,
    UnexpectedEndOfInput { expected: Expected },
    UnexpectedToken { expected: Expected, found: String },
    TrailingTokens { found: String },
    NestingTooDeep { limit: usize },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseError::EmptyInput => write!(f, "empty input"),
            ParseError::UnexpectedEndOfInput { expected } => {
                write!(f, "unexpected end of input, expected {}", expected)
            }
            ParseError::UnexpectedToken { expected, found } => {
                write!(f, "expected {}, found '{}'", expected, found)
            }
            ParseError::TrailingTokens { found } => {
                write!(f, "unexpected '{}' after complete expression", found)
            }
            ParseError::NestingTooDeep { limit } => {
                write!(f, "expression nested deeper than {} levels", limit)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    UndefinedSymbol { name: String },
    /// `node` is the canonical rendering of whatever sat in call position.
    NotCallable { node: String },
    ArityMismatch { expected: usize, actual: usize },
    TypeMismatch { expected: &'static str, actual: &'static str },
    RecursionLimitExceeded { limit: usize },
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EvalError::UndefinedSymbol { name } => write!(f, "undefined symbol '{}'", name),
            EvalError::NotCallable { node } => write!(f, "'{}' is not callable", node),
            EvalError::ArityMismatch { expected, actual } => write!(
                f,
                "expected {} argument{}, got {}",
                expected,
                if *expected == 1 { "" } else { "s" },
                actual
            ),
            EvalError::TypeMismatch { expected, actual } => {
                write!(f, "expected {}, found {}", expected, actual)
            }
            EvalError::RecursionLimitExceeded { limit } => {
                write!(f, "recursion limit of {} exceeded", limit)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    Parse(ParseError),
    Eval(EvalError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    pub kind: ErrorKind,
    pub span: Span,
    pub help: Option<String>,
}

impl Error {
    pub fn new(kind: ErrorKind, span: Span) -> Self {
        Self {
            kind,
            span,
            help: None,
        }
    }

    pub fn parse(error: ParseError, span: Span) -> Self {
        Self::new(ErrorKind::Parse(error), span)
    }

    pub fn eval(error: EvalError, span: Span) -> Self {
        Self::new(ErrorKind::Eval(error), span)
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn as_parse(&self) -> Option<&ParseError> {
        match &self.kind {
            ErrorKind::Parse(err) => Some(err),
            ErrorKind::Eval(_) => None,
        }
    }

    pub fn as_eval(&self) -> Option<&EvalError> {
        match &self.kind {
            ErrorKind::Eval(err) => Some(err),
            ErrorKind::Parse(_) => None,
        }
    }

    pub fn report(&self, source: &str, filename: Option<&str>) {
        let filename = filename.unwrap_or("<repl>");

        let (color, kind_str) = match self.kind {
            ErrorKind::Parse(_) => (Color::Yellow, "Parse Error"),
            ErrorKind::Eval(_) => (Color::Magenta, "Evaluation Error"),
        };

        // Clamp so end-of-input spans still land inside the source.
        let end = self.span.end.min(source.len()).max(self.span.start.min(source.len()));
        let start = self.span.start.min(end);
        let message = self.to_string();

        let mut report_builder = Report::build(ReportKind::Error, filename, start)
            .with_message(format!("{}: {}", kind_str.fg(color), message))
            .with_label(
                Label::new((filename, start..end))
                    .with_message(&message)
                    .with_color(color),
            );

        if let Some(ref help_text) = self.help {
            report_builder =
                report_builder.with_note(format!("{}: {}", "help".fg(Color::Cyan), help_text));
        }

        if let Err(err) = report_builder
            .finish()
            .eprint((filename, Source::from(source)))
        {
            tracing::warn!(?err, "failed to render diagnostic");
            eprintln!("{}: {}", kind_str, message);
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.kind {
            ErrorKind::Parse(err) => write!(f, "{}", err),
            ErrorKind::Eval(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Error {}
