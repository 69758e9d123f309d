#[macro_use]
extern crate log;
mod input;
use clap::Parser;
use env_logger::Env;
use input::Cli;
use knock::{Console, KnockConfig, KnockError};
use std::io;
use std::process::ExitCode;

// Port knocking client
//
// Builds the knock parameters from an optional profile and the command line,
// then knocks each port of the sequence in order. With -i the whole sequence
// is repeated after every interval until a knock fails or the process is
// killed.
fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), KnockError> {
    let config = KnockConfig::try_from(cli.settings()?)?;
    debug!("config: {:?}", config);
    let console = Console::new(io::stdout(), config.verbose);
    knock::run(&config, console)
}
