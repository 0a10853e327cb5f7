use std::io::{self, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    match halprobed::run_daemon() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let _ = writeln!(io::stderr(), "halprobed: {error}");
            ExitCode::FAILURE
        }
    }
}
