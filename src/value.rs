use crate::ast::Expr;
use crate::environment::Environment;
use crate::error::EvalError;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Builtin(Builtin),
    Closure(Rc<Closure>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Builtin(_) => "builtin",
            Value::Closure(_) => "closure",
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Builtin(builtin) => write!(f, "#<builtin {}>", builtin.name()),
            Value::Closure(closure) => write!(f, "#<lambda ({})>", closure.params.join(" ")),
        }
    }
}

/// Operations provided by the root environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Add,
}

impl Builtin {
    pub const ALL: [Builtin; 1] = [Builtin::Add];

    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Add => "+",
        }
    }

    /// Applies the builtin to already evaluated arguments.
    pub fn call(&self, args: &[Value]) -> Result<Value, EvalError> {
        match self {
            Builtin::Add => {
                let mut sum = 0.0;
                for arg in args {
                    match arg {
                        Value::Number(n) => sum += n,
                        other => {
                            return Err(EvalError::TypeMismatch {
                                expected: "number",
                                actual: other.type_name(),
                            })
                        }
                    }
                }
                Ok(Value::Number(sum))
            }
        }
    }
}

/// A lambda paired with the environment it was evaluated in.
pub struct Closure {
    pub params: Vec<String>,
    pub body: Rc<Expr>,
    pub env: Rc<Environment>,
}

impl Closure {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

// The captured environment is left out; printing it would dump every
// enclosing frame.
impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Closure")
            .field("params", &self.params)
            .field("body", &format_args!("{}", self.body))
            .finish_non_exhaustive()
    }
}

/// Closures are equal only when they are the same closure.
impl PartialEq for Closure {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}
