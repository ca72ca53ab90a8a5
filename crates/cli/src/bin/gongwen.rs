use presto_typst::Gongwen;
use std::process::ExitCode;

fn main() -> ExitCode {
    presto_cli::run(&Gongwen)
}
