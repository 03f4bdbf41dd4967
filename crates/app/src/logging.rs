use std::io;

use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// Installs the global subscriber. Logs go to stderr so stdout stays JSON.
pub(crate) fn setup_tracing(level: LevelFilter) {
    let level = level.into_level();
    let filter_layer = tracing_subscriber::filter::filter_fn(move |metadata| {
        let Some(level) = level else {
            return false;
        };
        let is_dragbox = metadata.target().starts_with("dragbox");
        let effective_level = if is_dragbox { level } else { Level::WARN };
        metadata.level() <= &effective_level
    });
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(io::stderr);

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter_layer))
        .init();
}

pub(crate) fn parse_level(value: &str) -> Result<LevelFilter, String> {
    value
        .parse::<LevelFilter>()
        .map_err(|_| format!("unknown log level {value}"))
}
