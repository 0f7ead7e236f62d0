use std::process::ExitCode;

fn main() -> ExitCode {
    rentdesk_cli::run()
}
