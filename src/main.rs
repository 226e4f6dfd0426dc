//! Romgfx - command-line tool for decoding and encoding ROM graphics regions

use std::process::ExitCode;

use romgfx::cli;

fn main() -> ExitCode {
    cli::run()
}
