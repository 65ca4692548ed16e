//! stdio-script CLI - lint and inspect scenario files

use clap::Parser;
use stdio_script::{cli, commands::Commands, common::logging};

#[derive(Parser)]
#[command(name = "stdio-script", about = "Scripted stdin/stdout sessions for console programs")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() {
    logging::init_cli();

    let cli = Cli::parse();

    match cli::dispatch(cli.command) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
