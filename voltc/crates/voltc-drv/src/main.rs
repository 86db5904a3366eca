use anyhow::Result;
use voltc_drv::{Config, Session};
use voltc_util::VoltLogger;

fn main() {
    // Pass-progress chatter stays off unless a developer flips it back on.
    VoltLogger::init().disable(log::Level::Info);
    if let Err(e) = run() {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = Config::from_args(std::env::args().skip(1))?;
    let session = Session::new(config);
    let result = session.compile();
    session.handler().emit_stderr();
    result?;
    Ok(())
}
