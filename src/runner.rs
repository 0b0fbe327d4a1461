use crate::ast::Expr;
use crate::error::Error;
use crate::evaluator::Evaluator;
use crate::lexer::tokenize;
use crate::parser::Parser;
use crate::value::Value;

/// Source text through the whole pipeline: tokens, one expression, a value.
pub fn interpret(source: &str, evaluator: &Evaluator) -> Result<Value, Error> {
    let expr = parse_source(source)?;
    evaluator.evaluate(&expr)
}

pub fn parse_source(source: &str) -> Result<Expr, Error> {
    let tokens = tokenize(source);
    Parser::new(tokens).parse()
}

/// Like [`interpret`], but renders any error as a diagnostic against
/// `source` before handing it back.
pub fn run(source: &str, filename: Option<&str>, evaluator: &Evaluator) -> Result<Value, Error> {
    let span = tracing::debug_span!("run", file = filename.unwrap_or("<repl>"));
    let _guard = span.enter();

    interpret(source, evaluator).map_err(|error| {
        error.report(source, filename);
        error
    })
}

/// Parses `source` and returns its canonical rendering without evaluating it.
pub fn show_ast(source: &str, filename: Option<&str>) -> Result<String, Error> {
    parse_source(source).map(|expr| expr.to_string()).map_err(|error| {
        error.report(source, filename);
        error
    })
}
