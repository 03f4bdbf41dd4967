use std::process;

use tracing_subscriber::filter::LevelFilter;

mod logging;
mod replay;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let level = match replay::log_level_arg(&args) {
        Ok(Some(value)) => logging::parse_level(&value),
        Ok(None) => Ok(LevelFilter::INFO),
        Err(err) => Err(err),
    };
    let level = match level {
        Ok(level) => level,
        Err(err) => {
            eprintln!("dragbox error: {err}");
            process::exit(1);
        }
    };
    logging::setup_tracing(level);

    tracing::info!("dragbox starting");

    if let Err(err) = replay::run_replay(&args) {
        eprintln!("dragbox error: {err}");
        process::exit(1);
    }
}
