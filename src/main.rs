use clap::{value_parser, Arg, ArgAction, Command};
use simlang::evaluator::{Evaluator, DEFAULT_MAX_DEPTH};
use simlang::{repl, runner};
use std::fs;
use std::path::Path;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    let matches = Command::new("simlang")
        .about("A tiny S-expression interpreter with let bindings and closures")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("file")
                .help("Source file holding a single expression")
                .value_name("FILE")
                .index(1)
                .conflicts_with("eval"),
        )
        .arg(
            Arg::new("eval")
                .short('e')
                .long("eval")
                .help("Evaluate EXPR and print the result")
                .value_name("EXPR"),
        )
        .arg(
            Arg::new("interactive")
                .short('i')
                .long("interactive")
                .help("Start in interactive REPL mode")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("max-depth")
                .long("max-depth")
                .help(format!("Maximum evaluation depth before giving up [default: {}]", DEFAULT_MAX_DEPTH))
                .value_name("N")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("ast")
                .long("ast")
                .help("Print the canonical form of the parsed expression instead of evaluating it")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .help("Log filter, e.g. 'debug' or 'simlang=trace' (defaults to RUST_LOG, then 'warn')")
                .value_name("LEVEL"),
        )
        .get_matches();

    init_logging(matches.get_one::<String>("log-level").map(String::as_str));

    let max_depth = matches
        .get_one::<usize>("max-depth")
        .copied()
        .unwrap_or(DEFAULT_MAX_DEPTH);
    let evaluator = Evaluator::new().with_max_depth(max_depth);
    let print_ast = matches.get_flag("ast");

    if let Some(expr) = matches.get_one::<String>("eval") {
        run_source(expr, None, &evaluator, print_ast);
    } else if let Some(file_path) = matches.get_one::<String>("file") {
        run_file(file_path, &evaluator, print_ast);
    }

    if matches.get_flag("interactive")
        || (matches.get_one::<String>("file").is_none() && matches.get_one::<String>("eval").is_none())
    {
        repl::start(&evaluator);
    }
}

fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_file(path: &str, evaluator: &Evaluator, print_ast: bool) {
    let path = Path::new(path);

    if !path.exists() {
        eprintln!("Error: File '{}' not found", path.display());
        process::exit(1);
    }

    match fs::read_to_string(path) {
        Ok(source) => {
            let filename = path.display().to_string();
            run_source(&source, Some(&filename), evaluator, print_ast);
        }
        Err(e) => {
            eprintln!("Error reading file '{}': {}", path.display(), e);
            process::exit(1);
        }
    }
}

fn run_source(source: &str, filename: Option<&str>, evaluator: &Evaluator, print_ast: bool) {
    let outcome = if print_ast {
        runner::show_ast(source, filename)
    } else {
        runner::run(source, filename, evaluator).map(|value| value.to_string())
    };

    match outcome {
        Ok(output) => println!("{}", output),
        Err(_) => process::exit(1),
    }
}
