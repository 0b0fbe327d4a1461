use crate::ast::Expr;
use crate::error::{Error, Expected, ParseError, Span};
use crate::lexer::{Token, TokenKind};
use std::rc::Rc;

/// Default bound on nested parenthesised forms. Matches the evaluator's
/// default depth so a debug build stays inside a 2 MiB thread stack.
pub const DEFAULT_MAX_NESTING: usize = 128;

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    depth: usize,
    max_depth: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            current: 0,
            depth: 0,
            max_depth: DEFAULT_MAX_NESTING,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Parses exactly one expression; anything left over is an error.
    pub fn parse(&mut self) -> Result<Expr, Error> {
        if self.tokens.is_empty() {
            return Err(Error::parse(ParseError::EmptyInput, Span::single(0))
                .with_help("Enter an expression, for example (+ 1 2)"));
        }

        let expr = self.expression()?;

        if let Some(token) = self.peek() {
            let found = token.lexeme.clone();
            let span = token.span;
            return Err(Error::parse(ParseError::TrailingTokens { found }, span).with_help(
                "A program is a single expression. Check for an extra ')' or wrap the expressions in one form.",
            ));
        }

        tracing::debug!(ast = %expr, "parsed");
        Ok(expr)
    }

    fn expression(&mut self) -> Result<Expr, Error> {
        let token = self.peek_expecting(Expected::Expression)?.clone();

        match token.kind {
            TokenKind::Number => {
                self.advance();
                number_literal(token)
            }
            TokenKind::Atom => {
                self.advance();
                Ok(Expr::Symbol {
                    name: token.lexeme,
                    span: token.span,
                })
            }
            TokenKind::LeftParen => {
                self.depth += 1;
                if self.depth > self.max_depth {
                    return Err(nesting_too_deep(self.max_depth, token.span));
                }
                let result = self.form();
                self.depth -= 1;
                result
            }
            _ => Err(misplaced_token(token)),
        }
    }

    /// Looks at the token after `(` to pick the form, then rewinds so each
    /// form parser consumes its own opening parenthesis.
    fn form(&mut self) -> Result<Expr, Error> {
        let checkpoint = self.checkpoint();
        let open = self.advance();
        debug_assert_eq!(open.map(|t| t.kind), Some(TokenKind::LeftParen));

        let head = self.peek_expecting(Expected::FormHead)?.clone();
        self.restore(checkpoint);

        match head.kind {
            TokenKind::Let => self.let_form(),
            TokenKind::Lambda => self.lambda_form(),
            TokenKind::Atom => self.call(),
            _ => Err(bad_form_head(head)),
        }
    }

    // ( ATOM expr* )
    fn call(&mut self) -> Result<Expr, Error> {
        let open = self.consume(TokenKind::LeftParen)?.span;
        let head = self.consume(TokenKind::Atom)?.clone();
        let function = Expr::Symbol {
            name: head.lexeme,
            span: head.span,
        };

        let mut args = Vec::new();
        while !self.check(TokenKind::RightParen) && !self.is_at_end() {
            args.push(self.expression()?);
        }

        let close = self.consume_with_help(
            TokenKind::RightParen,
            "Every opening parenthesis '(' must have a matching closing parenthesis ')'.",
        )?;
        Ok(Expr::Call {
            function: Box::new(function),
            args,
            span: open.to(&close.span),
        })
    }

    // ( let ( ATOM expr ) in expr )
    fn let_form(&mut self) -> Result<Expr, Error> {
        let open = self.consume(TokenKind::LeftParen)?.span;
        self.consume(TokenKind::Let)?;
        self.consume_with_help(
            TokenKind::LeftParen,
            "A let binding is written (let (name value) in body)",
        )?;
        let name = self
            .consume_with_help(TokenKind::Atom, "The bound name must be a symbol")?
            .lexeme
            .clone();
        let value = self.expression()?;
        self.consume_with_help(
            TokenKind::RightParen,
            "A let binds exactly one name: (let (name value) in body)",
        )?;
        self.consume_with_help(
            TokenKind::In,
            "The binding must be followed by 'in' and the body",
        )?;
        let body = self.expression()?;
        let close = self.consume_with_help(
            TokenKind::RightParen,
            "Every opening parenthesis '(' must have a matching closing parenthesis ')'.",
        )?;

        Ok(Expr::Let {
            name,
            value: Box::new(value),
            body: Box::new(body),
            span: open.to(&close.span),
        })
    }

    // ( lambda ( ATOM* ) expr )
    fn lambda_form(&mut self) -> Result<Expr, Error> {
        let open = self.consume(TokenKind::LeftParen)?.span;
        self.consume(TokenKind::Lambda)?;
        self.consume_with_help(
            TokenKind::LeftParen,
            "Parameters are written as a list: (lambda (x y) body)",
        )?;

        let mut params = Vec::new();
        while !self.check(TokenKind::RightParen) && !self.is_at_end() {
            let param = self.consume_with_help(TokenKind::Atom, "Parameters must be symbols")?;
            params.push(param.lexeme.clone());
        }
        self.consume_with_help(
            TokenKind::RightParen,
            "Close the parameter list with ')'",
        )?;

        let body = self.expression()?;
        let close = self.consume_with_help(
            TokenKind::RightParen,
            "Every opening parenthesis '(' must have a matching closing parenthesis ')'.",
        )?;

        Ok(Expr::Lambda {
            params,
            body: Rc::new(body),
            span: open.to(&close.span),
        })
    }

    fn checkpoint(&self) -> usize {
        self.current
    }

    fn restore(&mut self, checkpoint: usize) {
        debug_assert!(checkpoint <= self.current, "parser can only rewind");
        self.current = checkpoint;
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().is_some_and(|token| token.kind == kind)
    }

    fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.current);
        if token.is_some() {
            self.current += 1;
        }
        token
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.current)
    }

    fn peek_expecting(&self, expected: Expected) -> Result<&Token, Error> {
        self.peek().ok_or_else(|| {
            Error::parse(ParseError::UnexpectedEndOfInput { expected }, self.end_span())
        })
    }

    /// Points one past the last token.
    fn end_span(&self) -> Span {
        self.tokens
            .last()
            .map(|token| Span::single(token.span.end))
            .unwrap_or_else(|| Span::single(0))
    }

    fn consume(&mut self, kind: TokenKind) -> Result<&Token, Error> {
        if self.check(kind) {
            self.current += 1;
            return Ok(&self.tokens[self.current - 1]);
        }

        let expected = Expected::Token(kind);
        Err(match self.peek() {
            Some(token) => Error::parse(
                ParseError::UnexpectedToken {
                    expected,
                    found: token.lexeme.clone(),
                },
                token.span,
            ),
            None => Error::parse(
                ParseError::UnexpectedEndOfInput { expected },
                self.end_span(),
            ),
        })
    }

    fn consume_with_help(&mut self, kind: TokenKind, help: &str) -> Result<&Token, Error> {
        self.consume(kind).map_err(|error| error.with_help(help))
    }
}

// Error construction lives outside the recursive descent so `expression`
// and `form` keep small frames.

#[inline(never)]
fn number_literal(token: Token) -> Result<Expr, Error> {
    match token.lexeme.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Expr::Number {
            value,
            span: token.span,
        }),
        _ => Err(Error::parse(
            ParseError::UnexpectedToken {
                expected: Expected::Token(TokenKind::Number),
                found: token.lexeme,
            },
            token.span,
        )
        .with_help("Number literal is too large to represent")),
    }
}

#[cold]
#[inline(never)]
fn nesting_too_deep(limit: usize, span: Span) -> Error {
    Error::parse(ParseError::NestingTooDeep { limit }, span)
}

#[cold]
#[inline(never)]
fn misplaced_token(token: Token) -> Error {
    let help = match token.kind {
        TokenKind::RightParen => "Found ')' without matching '('. Check for unbalanced parentheses.",
        TokenKind::In => "'in' may only follow the binding of a let: (let (x 1) in x)",
        _ => "'let' and 'lambda' must open a form: (let ...) or (lambda ...)",
    };
    Error::parse(
        ParseError::UnexpectedToken {
            expected: Expected::Expression,
            found: token.lexeme,
        },
        token.span,
    )
    .with_help(help)
}

#[cold]
#[inline(never)]
fn bad_form_head(head: Token) -> Error {
    let help = match head.kind {
        TokenKind::RightParen => "Empty parentheses are not allowed.",
        _ => "A parenthesised form must start by naming an operation, e.g. (+ 1 2)",
    };
    Error::parse(
        ParseError::UnexpectedToken {
            expected: Expected::FormHead,
            found: head.lexeme,
        },
        head.span,
    )
    .with_help(help)
}

pub fn parse(tokens: Vec<Token>) -> Result<Expr, Error> {
    Parser::new(tokens).parse()
}
