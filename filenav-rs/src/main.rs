use filenav_core::logging::init_logging;
use filenav_core::prelude::*;
use filenav_core::Shell;
use std::env;
use std::io;
use std::process::exit;

fn run() -> Result<()> {
    let config = Config::from_env()?;
    tracing::debug!(staging_dir = %config.staging_dir.display(), "resolved configuration");

    let cwd = env::current_dir().map_err(|err| CoreError::io(".", err))?;
    let bin = RecycleBin::new(&config);
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut shell = Shell::new(stdin.lock(), stdout.lock(), cwd, bin);
    shell.run().map_err(|err| CoreError::io("<stdio>", err))
}

fn main() {
    init_logging();
    if let Err(err) = run() {
        eprintln!("filenav: {}", err.report());
        exit(1);
    }
}
