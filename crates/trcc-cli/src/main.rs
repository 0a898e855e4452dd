//! trcc — command-line front end for the Thermalright/ALi Corp/Winbond
//! cooler LCD and LED USB device I/O core.

use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;

mod cli;
mod config;

/// Shared shutdown flag — set by the Ctrl+C handler, polled by long-running
/// commands (`hr10 run`).
pub static RUNNING: AtomicBool = AtomicBool::new(true);

#[derive(Parser)]
#[command(
    name = "trcc",
    version,
    about = "Userspace controller for Thermalright/ALi Corp/Winbond cooler LCD and LED panels"
)]
struct Args {
    /// Output as JSON (for discover, devices, probe)
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: cli::Command,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let args = Args::parse();

    ctrlc::set_handler(move || {
        RUNNING.store(false, Ordering::SeqCst);
    })
    .ok();

    if let Err(e) = cli::run(args.command, args.json) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
