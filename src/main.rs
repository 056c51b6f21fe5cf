//! rota - local-first duty rotation for small teams

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = rota_cli::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
