use std::process::ExitCode;

fn main() -> ExitCode {
    gamescout_cli::run()
}
