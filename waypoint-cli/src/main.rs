//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

fn main() {
    if let Err(err) = waypoint_cli::run() {
        eprintln!("waypoint: {:#}", eyre::Report::new(err));
        std::process::exit(1);
    }
}
