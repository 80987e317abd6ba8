use clap::Parser;
use voltrader::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
