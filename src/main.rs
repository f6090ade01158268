//! template-finder CLI entry point
//!
//! Parses arguments, runs the selected command and reports failures with
//! suggestions. The process exits with the code the command returns, or 1 on
//! error.

use clap::Parser;
use template_finder::cli;
use template_finder::core::user_friendly_error;

fn main() {
    let cli = cli::Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
