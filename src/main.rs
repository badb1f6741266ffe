use clap::Parser;

use pixelscript::host::cli::{self, Cli};

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(err) = cli::run(&cli) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}
