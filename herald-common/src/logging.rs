use std::str::FromStr;

use tracing::metadata::LevelFilter;
use tracing_subscriber::{
    Layer, filter::FilterFn, prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt,
};

/// Events from this workspace only; dependency chatter stays out of the
/// gateway's logs.
fn workspace_events() -> FilterFn {
    FilterFn::new(|metadata| metadata.target().starts_with("herald"))
}

/// The level to log at: `LOG_LEVEL` when set and valid, otherwise trace in
/// debug builds and info in release builds.
fn level() -> LevelFilter {
    let default = if cfg!(debug_assertions) {
        LevelFilter::TRACE
    } else {
        LevelFilter::INFO
    };

    std::env::var("LOG_LEVEL").map_or(default, |level| {
        LevelFilter::from_str(level.as_str()).unwrap_or_else(|_| {
            eprintln!("Invalid log level specified {level}, defaulting to {default}");
            default
        })
    })
}

/// Install the process-wide subscriber: compact output with UTC timestamps.
pub fn init() {
    let format = tracing_subscriber::fmt::layer()
        .with_file(false)
        .with_line_number(false)
        .compact()
        .with_ansi(true)
        .with_timer(tracing_subscriber::fmt::time::ChronoUtc::rfc_3339());

    tracing_subscriber::Registry::default()
        .with(format.with_filter(level()).with_filter(workspace_events()))
        .init();
}
