use crate::error::Span;
use std::fmt;
use std::rc::Rc;

/// A parsed expression. Built once by the parser and never mutated.
///
/// Equality is structural: spans are ignored, so a tree reparsed from its
/// own `Display` output compares equal to the original.
#[derive(Debug, Clone)]
pub enum Expr {
    Number {
        value: f64,
        span: Span,
    },
    Symbol {
        name: String,
        span: Span,
    },
    Call {
        function: Box<Expr>,
        args: Vec<Expr>,
        span: Span,
    },
    Let {
        name: String,
        value: Box<Expr>,
        body: Box<Expr>,
        span: Span,
    },
    /// The body is reference counted so closures can hold on to it after
    /// the tree that produced them is gone.
    Lambda {
        params: Vec<String>,
        body: Rc<Expr>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> &Span {
        match self {
            Expr::Number { span, .. } => span,
            Expr::Symbol { span, .. } => span,
            Expr::Call { span, .. } => span,
            Expr::Let { span, .. } => span,
            Expr::Lambda { span, .. } => span,
        }
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Expr::Number { value: a, .. }, Expr::Number { value: b, .. }) => a == b,
            (Expr::Symbol { name: a, .. }, Expr::Symbol { name: b, .. }) => a == b,
            (
                Expr::Call {
                    function: f1,
                    args: a1,
                    ..
                },
                Expr::Call {
                    function: f2,
                    args: a2,
                    ..
                },
            ) => f1 == f2 && a1 == a2,
            (
                Expr::Let {
                    name: n1,
                    value: v1,
                    body: b1,
                    ..
                },
                Expr::Let {
                    name: n2,
                    value: v2,
                    body: b2,
                    ..
                },
            ) => n1 == n2 && v1 == v2 && b1 == b2,
            (
                Expr::Lambda {
                    params: p1,
                    body: b1,
                    ..
                },
                Expr::Lambda {
                    params: p2,
                    body: b2,
                    ..
                },
            ) => p1 == p2 && b1 == b2,
            _ => false,
        }
    }
}

/// Canonical source form, accepted back by the parser.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Number { value, .. } => write!(f, "{}", value),
            Expr::Symbol { name, .. } => write!(f, "{}", name),
            Expr::Call { function, args, .. } => {
                write!(f, "({}", function)?;
                for arg in args {
                    write!(f, " {}", arg)?;
                }
                write!(f, ")")
            }
            Expr::Let {
                name, value, body, ..
            } => write!(f, "(let ({} {}) in {})", name, value, body),
            Expr::Lambda { params, body, .. } => {
                write!(f, "(lambda ({}) {})", params.join(" "), body)
            }
        }
    }
}
