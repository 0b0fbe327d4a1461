use crate::ast::Expr;
use crate::environment::Environment;
use crate::error::{Error, EvalError, Span};
use crate::value::{Closure, Value};
use std::rc::Rc;

/// Default bound on nested evaluation, counting both AST nesting and
/// closure calls. Sized so a debug build stays inside a 2 MiB thread stack.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Tree-walking evaluator. Holds only configuration; every call to
/// [`Evaluator::evaluate`] starts from a fresh root environment.
#[derive(Debug, Clone)]
pub struct Evaluator {
    max_depth: usize,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn evaluate(&self, expr: &Expr) -> Result<Value, Error> {
        let env = Environment::root();
        let value = self.eval(expr, &env, 0)?;
        tracing::debug!(%value, "evaluated");
        Ok(value)
    }

    // Frames on the recursive path stay small: errors and logging are built
    // in the out-of-line helpers below.
    fn eval(&self, expr: &Expr, env: &Rc<Environment>, depth: usize) -> Result<Value, Error> {
        if depth >= self.max_depth {
            return Err(recursion_limit(self.max_depth, expr));
        }
        let depth = depth + 1;

        match expr {
            Expr::Number { value, .. } => Ok(Value::Number(*value)),
            Expr::Symbol { name, span } => lookup(env, name, *span),
            Expr::Call {
                function,
                args,
                span,
            } => self.eval_call(function, args, *span, env, depth),
            Expr::Let {
                name, value, body, ..
            } => self.eval_let(name, value, body, env, depth),
            Expr::Lambda { params, body, .. } => Ok(Value::Closure(Rc::new(Closure {
                params: params.clone(),
                body: Rc::clone(body),
                env: Rc::clone(env),
            }))),
        }
    }

    fn eval_let(
        &self,
        name: &str,
        value: &Expr,
        body: &Expr,
        env: &Rc<Environment>,
        depth: usize,
    ) -> Result<Value, Error> {
        // The name is not in scope for its own value.
        let value = self.eval(value, env, depth)?;
        let frame = Environment::extend(env, [(name.to_string(), value)]);
        trace_let(name, &frame);
        self.eval(body, &frame, depth)
    }

    fn eval_call(
        &self,
        function: &Expr,
        args: &[Expr],
        span: Span,
        env: &Rc<Environment>,
        depth: usize,
    ) -> Result<Value, Error> {
        let name = match function {
            Expr::Symbol { name, .. } => name,
            other => return Err(not_callable(other.to_string(), *other.span(), None)),
        };

        // Resolve and check the head before touching any argument.
        match lookup(env, name, *function.span())? {
            Value::Builtin(builtin) => {
                let values = self.eval_args(args, env, depth)?;
                builtin
                    .call(&values)
                    .map_err(|err| builtin_error(err, &values, args, span))
            }
            Value::Closure(closure) => {
                let values = self.eval_args(args, env, depth)?;
                self.apply(&closure, values, span, depth)
            }
            Value::Number(_) => Err(not_callable(name.clone(), *function.span(), Some("number"))),
        }
    }

    /// Left to right, all in the caller's environment.
    fn eval_args(
        &self,
        args: &[Expr],
        env: &Rc<Environment>,
        depth: usize,
    ) -> Result<Vec<Value>, Error> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval(arg, env, depth)?);
        }
        Ok(values)
    }

    fn apply(
        &self,
        closure: &Closure,
        args: Vec<Value>,
        span: Span,
        depth: usize,
    ) -> Result<Value, Error> {
        if args.len() != closure.arity() {
            return Err(arity_mismatch(closure.arity(), args.len(), span));
        }

        trace_closure(closure, depth);
        // Parent is the captured frame, not the caller's.
        let frame = Environment::extend(&closure.env, closure.params.iter().cloned().zip(args));
        self.eval(&closure.body, &frame, depth)
    }
}

fn lookup(env: &Environment, name: &str, span: Span) -> Result<Value, Error> {
    match env.get(name) {
        Some(value) => Ok(value.clone()),
        None => Err(undefined_symbol(name, span)),
    }
}

#[cold]
#[inline(never)]
fn recursion_limit(limit: usize, expr: &Expr) -> Error {
    Error::eval(EvalError::RecursionLimitExceeded { limit }, *expr.span()).with_help(
        "Evaluation nested too deeply. Check for a closure that calls itself without end.",
    )
}

#[cold]
#[inline(never)]
fn undefined_symbol(name: &str, span: Span) -> Error {
    Error::eval(
        EvalError::UndefinedSymbol {
            name: name.to_string(),
        },
        span,
    )
}

#[cold]
#[inline(never)]
fn not_callable(node: String, span: Span, bound_to: Option<&str>) -> Error {
    let help = bound_to.map(|kind| format!("'{}' is bound to a {}", node, kind));
    let error = Error::eval(EvalError::NotCallable { node }, span);
    match help {
        Some(help) => error.with_help(help),
        None => error,
    }
}

#[cold]
#[inline(never)]
fn arity_mismatch(expected: usize, actual: usize, span: Span) -> Error {
    Error::eval(EvalError::ArityMismatch { expected, actual }, span)
}

/// Points a type error at the first argument that is not a number.
#[cold]
#[inline(never)]
fn builtin_error(err: EvalError, values: &[Value], args: &[Expr], span: Span) -> Error {
    let span = match err {
        EvalError::TypeMismatch { .. } => values
            .iter()
            .position(|v| v.as_number().is_none())
            .map(|i| *args[i].span())
            .unwrap_or(span),
        _ => span,
    };
    Error::eval(err, span)
}

#[inline(never)]
fn trace_let(name: &str, frame: &Environment) {
    tracing::trace!(%name, frames = frame.depth(), "let frame");
}

#[inline(never)]
fn trace_closure(closure: &Closure, depth: usize) {
    tracing::trace!(params = ?closure.params, depth, "invoking closure");
}

pub fn evaluate(expr: &Expr) -> Result<Value, Error> {
    Evaluator::new().evaluate(expr)
}
