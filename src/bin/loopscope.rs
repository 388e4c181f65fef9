//! Loopscope CLI
//!
//! Runs the counting-loop scenarios and shows what closures created in the
//! loop body observe under `var` and `let` declarations.

use loopscope_core::cli;

fn main() {
    if let Err(e) = cli::run_cli() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
