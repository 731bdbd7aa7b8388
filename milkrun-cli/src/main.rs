//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

fn main() {
    if let Err(err) = milkrun_cli::run() {
        eprintln!("milkrun: {err}");
        std::process::exit(1);
    }
}
