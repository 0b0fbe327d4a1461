use crate::evaluator::Evaluator;
use crate::runner;
use std::io::{self, BufRead, Write};

/// Line-oriented shell. Every line is a separate program with its own
/// root environment; errors are reported and the loop keeps going.
pub fn start(evaluator: &Evaluator) {
    println!("simlang {}", env!("CARGO_PKG_VERSION"));
    println!("Type 'exit' or press Ctrl+D to quit");
    println!();

    let stdin = io::stdin();
    let mut input = stdin.lock();

    loop {
        print!("λ> ");
        if let Err(error) = io::stdout().flush() {
            tracing::warn!(%error, "failed to flush prompt");
        }

        let mut line = String::new();
        match input.read_line(&mut line) {
            Ok(0) => {
                // EOF reached (Ctrl+D or piped input ended)
                println!();
                break;
            }
            Ok(_) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line == "exit" || line == "quit" {
                    println!("Goodbye!");
                    break;
                }

                if let Ok(value) = runner::run(line, None, evaluator) {
                    println!("=> {}", value);
                }
            }
            Err(error) => {
                eprintln!("Error reading input: {}", error);
                break;
            }
        }
    }
}
