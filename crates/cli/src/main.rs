use std::process::ExitCode;

fn main() -> ExitCode {
    marchelo_cli::run()
}
