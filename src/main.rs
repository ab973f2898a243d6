mod cli;
mod xwin;

use std::io::IsTerminal;

use clap::Parser;
use cli::Cli;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();

    let cli = Cli::parse();

    if let Err(e) = xwin::run(cli.display.as_deref(), &cli.title, cli.window_config()) {
        xwin::errors::die(e);
    }
}
