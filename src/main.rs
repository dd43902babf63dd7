use clap::Parser;
use notetidy::cli::{Args, run_cli};
use notetidy::output::OutputFormatter;

fn main() {
    let args = Args::parse();

    if let Err(e) = run_cli(&args) {
        OutputFormatter::error(&e);
        std::process::exit(1);
    }
}
