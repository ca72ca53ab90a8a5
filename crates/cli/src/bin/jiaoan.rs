use presto_typst::Jiaoan;
use std::process::ExitCode;

fn main() -> ExitCode {
    presto_cli::run(&Jiaoan)
}
