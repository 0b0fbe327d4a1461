// simlang interpreter library
//
// A small S-expression language: numbers, one builtin `+`, single-binding
// `let` and first-class closures with lexical scope.

// Public modules
pub mod ast;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod repl;
pub mod runner;
pub mod value;

// Re-export commonly used items
pub use ast::Expr;
pub use environment::Environment;
pub use error::{Error, ErrorKind, EvalError, Expected, ParseError, Span};
pub use evaluator::{evaluate, Evaluator};
pub use lexer::{tokenize, Lexer, Token, TokenKind};
pub use parser::{parse, Parser};
pub use value::{Builtin, Closure, Value};

// Re-export main functions
pub use repl::start as start_repl;
pub use runner::{interpret, run};
