// Integration tests for the simlang pipeline
//
// Table-driven suites run source text through tokenize, parse and evaluate,
// checking either the numeric result or the error that comes back.

use simlang::evaluator::DEFAULT_MAX_DEPTH;
use simlang::parser::DEFAULT_MAX_NESTING;
use simlang::runner::{interpret, parse_source};
use simlang::{Error, ErrorKind, EvalError, Evaluator, ParseError, Value};

/// Test result for a single test case
#[derive(Debug)]
pub enum TestResult {
    Pass,
    Fail(String),
    Crash(String),
}

#[derive(Debug, Clone)]
pub enum Outcome {
    Number(f64),
    Closure,
    ParseError(&'static str),
    EvalError(&'static str),
}

/// Individual test case
#[derive(Debug, Clone)]
pub struct TestCase {
    pub name: String,
    pub input: String,
    pub expected: Outcome,
    pub expected_error_contains: Option<String>,
}

/// Test suite containing multiple test cases
#[derive(Debug)]
pub struct TestSuite {
    pub name: String,
    pub tests: Vec<TestCase>,
}

impl TestSuite {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            tests: Vec::new(),
        }
    }

    pub fn add_test(&mut self, test: TestCase) {
        self.tests.push(test);
    }

    /// Run all tests in this suite
    pub fn run(&self) -> TestSuiteResults {
        let mut results = TestSuiteResults::new(&self.name);

        println!("Running test suite: {}", self.name);
        println!("{}", "=".repeat(50));

        for test in &self.tests {
            let result = run_single_test(test);
            results.add_result(&test.name, result);
        }

        results.print_summary();
        results
    }
}

/// Results for a test suite run
#[derive(Debug)]
pub struct TestSuiteResults {
    pub suite_name: String,
    pub results: Vec<(String, TestResult)>,
    pub passed: usize,
    pub failed: usize,
    pub crashed: usize,
}

impl TestSuiteResults {
    pub fn new(suite_name: &str) -> Self {
        Self {
            suite_name: suite_name.to_string(),
            results: Vec::new(),
            passed: 0,
            failed: 0,
            crashed: 0,
        }
    }

    pub fn add_result(&mut self, test_name: &str, result: TestResult) {
        match &result {
            TestResult::Pass => {
                self.passed += 1;
                println!("  ✓ {}", test_name);
            }
            TestResult::Fail(msg) => {
                self.failed += 1;
                println!("  ✗ {}: {}", test_name, msg);
            }
            TestResult::Crash(msg) => {
                self.crashed += 1;
                println!("  💥 {}: CRASHED - {}", test_name, msg);
            }
        }
        self.results.push((test_name.to_string(), result));
    }

    pub fn print_summary(&self) {
        println!();
        println!("Test Suite: {} - Summary", self.suite_name);
        println!("{}", "-".repeat(30));
        println!("Passed:  {}", self.passed);
        println!("Failed:  {}", self.failed);
        println!("Crashed: {}", self.crashed);
        println!("Total:   {}", self.results.len());
        println!();
    }

    pub fn is_all_passed(&self) -> bool {
        self.crashed == 0 && self.failed == 0
    }
}

/// Name of the error variant, used to match against [`Outcome`].
fn error_kind_name(error: &Error) -> &'static str {
    match &error.kind {
        ErrorKind::Parse(err) => match err {
            ParseError::EmptyInput => "EmptyInput",
            ParseError::UnexpectedEndOfInput { .. } => "UnexpectedEndOfInput",
            ParseError::UnexpectedToken { .. } => "UnexpectedToken",
            ParseError::TrailingTokens { .. } => "TrailingTokens",
            ParseError::NestingTooDeep { .. } => "NestingTooDeep",
        },
        ErrorKind::Eval(err) => match err {
            EvalError::UndefinedSymbol { .. } => "UndefinedSymbol",
            EvalError::NotCallable { .. } => "NotCallable",
            EvalError::ArityMismatch { .. } => "ArityMismatch",
            EvalError::TypeMismatch { .. } => "TypeMismatch",
            EvalError::RecursionLimitExceeded { .. } => "RecursionLimitExceeded",
        },
    }
}

/// Run a single test case
fn run_single_test(test: &TestCase) -> TestResult {
    // Catch any panics to detect crashes
    let result = std::panic::catch_unwind(|| interpret(&test.input, &Evaluator::new()));

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(panic_info) => {
            let panic_msg = if let Some(s) = panic_info.downcast_ref::<String>() {
                s.clone()
            } else if let Some(s) = panic_info.downcast_ref::<&str>() {
                s.to_string()
            } else {
                "Unknown panic".to_string()
            };
            return TestResult::Crash(panic_msg);
        }
    };

    match (&test.expected, outcome) {
        (Outcome::Number(expected), Ok(Value::Number(actual))) => {
            if *expected == actual {
                TestResult::Pass
            } else {
                TestResult::Fail(format!("Expected {}, got {}", expected, actual))
            }
        }
        (Outcome::Closure, Ok(Value::Closure(_))) => TestResult::Pass,
        (Outcome::ParseError(kind), Err(error)) if matches!(error.kind, ErrorKind::Parse(_)) => {
            check_error(test, kind, &error)
        }
        (Outcome::EvalError(kind), Err(error)) if matches!(error.kind, ErrorKind::Eval(_)) => {
            check_error(test, kind, &error)
        }
        (expected, Ok(value)) => TestResult::Fail(format!("Expected {:?}, got value {}", expected, value)),
        (expected, Err(error)) => TestResult::Fail(format!(
            "Expected {:?}, got {} error: {}",
            expected,
            error_kind_name(&error),
            error
        )),
    }
}

fn check_error(test: &TestCase, kind: &str, error: &Error) -> TestResult {
    let actual = error_kind_name(error);
    if actual != kind {
        return TestResult::Fail(format!("Expected {} error, got {}: {}", kind, actual, error));
    }
    match &test.expected_error_contains {
        Some(expected) if !error.to_string().contains(expected.as_str()) => TestResult::Fail(format!(
            "Error message '{}' doesn't contain expected text '{}'",
            error, expected
        )),
        _ => TestResult::Pass,
    }
}

/// Test case builder for convenience
impl TestCase {
    pub fn evaluates_to(name: &str, input: &str, value: f64) -> Self {
        Self::new(name, input, Outcome::Number(value))
    }

    pub fn evaluates_to_closure(name: &str, input: &str) -> Self {
        Self::new(name, input, Outcome::Closure)
    }

    pub fn parse_error(name: &str, input: &str, kind: &'static str) -> Self {
        Self::new(name, input, Outcome::ParseError(kind))
    }

    pub fn eval_error(name: &str, input: &str, kind: &'static str) -> Self {
        Self::new(name, input, Outcome::EvalError(kind))
    }

    pub fn with_message(mut self, expected_msg: &str) -> Self {
        self.expected_error_contains = Some(expected_msg.to_string());
        self
    }

    fn new(name: &str, input: &str, expected: Outcome) -> Self {
        Self {
            name: name.to_string(),
            input: input.to_string(),
            expected,
            expected_error_contains: None,
        }
    }
}

// ============================================================================
// Test Suite Creation Functions
// ============================================================================

fn create_arithmetic_tests() -> TestSuite {
    let mut suite = TestSuite::new("Arithmetic");

    suite.add_test(TestCase::evaluates_to("two_numbers", "(+ 1 2)", 3.0));
    suite.add_test(TestCase::evaluates_to("three_numbers", "(+ 1 2 3)", 6.0));
    suite.add_test(TestCase::evaluates_to("nested", "(+ 10 (+ 5 3) 2)", 20.0));
    suite.add_test(TestCase::evaluates_to("negative", "(+ -5 10)", 5.0));
    suite.add_test(TestCase::evaluates_to("explicit_plus_sign", "(+ +5 10)", 15.0));
    suite.add_test(TestCase::evaluates_to("zeros", "(+ 0 0 0)", 0.0));
    suite.add_test(TestCase::evaluates_to("mixed_signs", "(+ 100 -50 25)", 75.0));
    suite.add_test(TestCase::evaluates_to(
        "associativity",
        "(+ (+ 1 2) (+ 3 4) (+ 5 6))",
        21.0,
    ));
    suite.add_test(TestCase::evaluates_to("unary", "(+ 42)", 42.0));
    suite.add_test(TestCase::evaluates_to("nullary", "(+)", 0.0));
    suite.add_test(TestCase::evaluates_to("bare_number", "17", 17.0));
    suite.add_test(TestCase::evaluates_to(
        "multiline",
        "(+ 1\n\t2\r\n   3)",
        6.0,
    ));

    suite
}

fn create_scoping_tests() -> TestSuite {
    let mut suite = TestSuite::new("Let Scoping");

    suite.add_test(TestCase::evaluates_to("simple_let", "(let (x 10) in x)", 10.0));
    suite.add_test(TestCase::evaluates_to(
        "shadowing",
        "(let (x 10) in (let (x 20) in x))",
        20.0,
    ));
    suite.add_test(TestCase::evaluates_to(
        "outer_visible",
        "(let (x 10) in (let (y 20) in (+ x y)))",
        30.0,
    ));
    suite.add_test(TestCase::evaluates_to(
        "outer_not_corrupted",
        "(let (x 10) in (+ (let (x 20) in x) x))",
        30.0,
    ));
    suite.add_test(TestCase::evaluates_to(
        "value_sees_enclosing_binding",
        "(let (x 1) in (let (x (+ x 1)) in x))",
        2.0,
    ));
    suite.add_test(
        TestCase::eval_error("not_recursive", "(let (x x) in x)", "UndefinedSymbol")
            .with_message("undefined symbol 'x'"),
    );
    suite.add_test(TestCase::eval_error(
        "binding_does_not_leak",
        "(+ (let (x 1) in x) x)",
        "UndefinedSymbol",
    ));

    suite
}

fn create_closure_tests() -> TestSuite {
    let mut suite = TestSuite::new("Closures");

    suite.add_test(TestCase::evaluates_to(
        "add2",
        "(let (add2 (lambda (x) (+ x 2))) in (add2 10))",
        12.0,
    ));
    suite.add_test(TestCase::evaluates_to(
        "lexical_capture",
        "(let (y 1) in (let (f (lambda (x) (+ x y))) in (let (y 100) in (f 10))))",
        11.0,
    ));
    suite.add_test(TestCase::evaluates_to(
        "closure_returning_closure",
        "(let (make (lambda (n) (lambda (x) (+ x n)))) in (let (add3 (make 3)) in (add3 4)))",
        7.0,
    ));
    suite.add_test(TestCase::evaluates_to(
        "higher_order",
        "(let (apply (lambda (f v) (f v))) in (apply (lambda (z) (+ z z)) 21))",
        42.0,
    ));
    suite.add_test(TestCase::evaluates_to(
        "param_shadows_outer",
        "(let (x 5) in (let (f (lambda (x) x)) in (f 9)))",
        9.0,
    ));
    suite.add_test(TestCase::evaluates_to_closure("bare_lambda", "(lambda (x) x)"));
    suite.add_test(
        TestCase::eval_error(
            "too_many_args",
            "(let (f (lambda (x) x)) in (f 1 2))",
            "ArityMismatch",
        )
        .with_message("expected 1 argument, got 2"),
    );
    suite.add_test(TestCase::eval_error(
        "too_few_args",
        "(let (f (lambda (x y) x)) in (f 1))",
        "ArityMismatch",
    ));
    suite.add_test(TestCase::eval_error(
        "params_not_visible_outside",
        "(let (f (lambda (x) x)) in (+ (f 1) x))",
        "UndefinedSymbol",
    ));

    suite
}

fn create_runtime_error_tests() -> TestSuite {
    let mut suite = TestSuite::new("Runtime Errors");

    suite.add_test(
        TestCase::eval_error("undefined_function", "(foo 1)", "UndefinedSymbol")
            .with_message("undefined symbol 'foo'"),
    );
    suite.add_test(TestCase::eval_error("undefined_symbol", "nope", "UndefinedSymbol"));
    suite.add_test(
        TestCase::eval_error("add_closure", "(+ 1 (lambda (x) x))", "TypeMismatch")
            .with_message("expected number, found closure"),
    );
    suite.add_test(TestCase::eval_error(
        "add_builtin",
        "(+ 1 +)",
        "TypeMismatch",
    ));
    suite.add_test(
        TestCase::eval_error("call_number", "(let (n 4) in (n 1))", "NotCallable")
            .with_message("'n' is not callable"),
    );
    suite.add_test(TestCase::eval_error(
        "call_number_before_arguments",
        "(let (n 4) in (n (foo)))",
        "NotCallable",
    ));

    suite
}

fn create_malformed_input_tests() -> TestSuite {
    let mut suite = TestSuite::new("Malformed Input");

    suite.add_test(TestCase::parse_error("empty", "", "EmptyInput"));
    suite.add_test(TestCase::parse_error("whitespace_only", "  \n\t", "EmptyInput"));
    suite.add_test(
        TestCase::parse_error("unbalanced", "(+ 1 2", "UnexpectedEndOfInput")
            .with_message("expected ')'"),
    );
    suite.add_test(TestCase::parse_error("lone_paren", "(", "UnexpectedEndOfInput"));
    suite.add_test(TestCase::parse_error(
        "unfinished_let",
        "(let (x 1)",
        "UnexpectedEndOfInput",
    ));
    suite.add_test(TestCase::parse_error("trailing_paren", "(+ 1 2))", "TrailingTokens"));
    suite.add_test(TestCase::parse_error("two_expressions", "(+ 1) (+ 2)", "TrailingTokens"));
    suite.add_test(TestCase::parse_error("stray_close", ")", "UnexpectedToken"));
    suite.add_test(TestCase::parse_error("empty_parens", "()", "UnexpectedToken"));
    suite.add_test(TestCase::parse_error("number_head", "(1 2 3)", "UnexpectedToken"));
    suite.add_test(TestCase::parse_error("paren_head", "((+ 1) 2)", "UnexpectedToken"));
    suite.add_test(
        TestCase::parse_error("let_without_in", "(let (x 1) x)", "UnexpectedToken")
            .with_message("expected 'in', found 'x'"),
    );
    suite.add_test(TestCase::parse_error(
        "let_two_bindings",
        "(let (x 1) (y 2) in x)",
        "UnexpectedToken",
    ));
    suite.add_test(TestCase::parse_error(
        "let_number_name",
        "(let (1 1) in 1)",
        "UnexpectedToken",
    ));
    suite.add_test(TestCase::parse_error(
        "lambda_number_param",
        "(lambda (1) 1)",
        "UnexpectedToken",
    ));
    suite.add_test(TestCase::parse_error("bare_keyword", "let", "UnexpectedToken"));
    suite.add_test(TestCase::parse_error(
        "lambda_without_body",
        "(lambda (x))",
        "UnexpectedToken",
    ));
    suite.add_test(TestCase::parse_error(
        "number_too_large",
        &format!("(+ {} 1)", "9".repeat(400)),
        "UnexpectedToken",
    ));

    suite
}

// ============================================================================
// Main Test Function
// ============================================================================

#[test]
fn comprehensive_pipeline_tests() {
    println!("simlang Pipeline Test Suite");
    println!("===========================\n");

    let suites = vec![
        create_arithmetic_tests(),
        create_scoping_tests(),
        create_closure_tests(),
        create_runtime_error_tests(),
        create_malformed_input_tests(),
    ];

    let mut failed_suites = Vec::new();
    for suite in suites {
        let results = suite.run();
        if !results.is_all_passed() {
            failed_suites.push(results.suite_name);
        }
    }

    assert!(failed_suites.is_empty(), "failing suites: {:?}", failed_suites);
}

/// Sums of literals give the same total whatever the nesting shape.
#[test]
fn sum_is_independent_of_nesting() {
    let shapes = [
        "(+ 1 2 3 4 5 6)",
        "(+ (+ 1 2) (+ 3 4) (+ 5 6))",
        "(+ 1 (+ 2 (+ 3 (+ 4 (+ 5 6)))))",
        "(+ (+ (+ (+ (+ 1 2) 3) 4) 5) 6)",
        "(+ (+ 1) (+) (+ 2 3 (+ 4 5)) 6)",
    ];
    for shape in shapes {
        assert_eq!(
            interpret(shape, &Evaluator::new()),
            Ok(Value::Number(21.0)),
            "{}",
            shape
        );
    }
}

#[test]
fn canonical_form_round_trips() {
    let programs = [
        "(+ (+ 1 2) (+ 3 4) (+ 5 6))",
        "(let (x 10) in (let (y 20) in (+ x y)))",
        "(let (add2 (lambda (x) (+ x 2))) in (add2 10))",
        "(let    (f (lambda (a b c)\n (+ a (+ b c)))) in (f -1 +2 3))",
        "(lambda () 0)",
        "x",
    ];
    for program in programs {
        let expr = parse_source(program).unwrap();
        let printed = expr.to_string();
        let reparsed = parse_source(&printed).unwrap();
        assert_eq!(expr, reparsed, "{}", printed);
        assert_eq!(
            interpret(program, &Evaluator::new()).map(|v| v.to_string()),
            interpret(&printed, &Evaluator::new()).map(|v| v.to_string()),
        );
    }
}

#[test]
fn recursion_limit_is_configurable() {
    let deep = format!("{}1{}", "(+ ".repeat(50), ")".repeat(50));
    assert_eq!(interpret(&deep, &Evaluator::new()), Ok(Value::Number(1.0)));

    let error = interpret(&deep, &Evaluator::new().with_max_depth(25)).unwrap_err();
    assert_eq!(
        error.kind,
        ErrorKind::Eval(EvalError::RecursionLimitExceeded { limit: 25 })
    );
}

#[test]
fn self_application_hits_the_limit() {
    let omega = "(let (f (lambda (g) (g g))) in (f f))";
    let error = interpret(omega, &Evaluator::new().with_max_depth(100)).unwrap_err();
    assert_eq!(
        error.kind,
        ErrorKind::Eval(EvalError::RecursionLimitExceeded { limit: 100 })
    );
    assert!(error.help.is_some());
}

#[test]
fn default_limits_report_errors_instead_of_overflowing() {
    let omega = "(let (f (lambda (g) (g g))) in (f f))";
    let error = interpret(omega, &Evaluator::new()).unwrap_err();
    assert_eq!(
        error.kind,
        ErrorKind::Eval(EvalError::RecursionLimitExceeded {
            limit: DEFAULT_MAX_DEPTH
        })
    );

    let depth = DEFAULT_MAX_NESTING + 1;
    let deep = format!("{}1{}", "(+ ".repeat(depth), ")".repeat(depth));
    let error = parse_source(&deep).unwrap_err();
    assert_eq!(
        error.kind,
        ErrorKind::Parse(ParseError::NestingTooDeep {
            limit: DEFAULT_MAX_NESTING
        })
    );

    let lets = DEFAULT_MAX_DEPTH - 1;
    let chain = format!("{}x{}", "(let (x 2) in ".repeat(lets), ")".repeat(lets));
    assert_eq!(interpret(&chain, &Evaluator::new()), Ok(Value::Number(2.0)));
}
