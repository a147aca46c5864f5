use crate::config::LoggingSettings;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins over the configured level. `format` is one of
/// `json`, `pretty` or `compact`; anything else falls back to compact.
pub fn init(settings: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    match settings.format.as_str() {
        "json" => subscriber.json().init(),
        "pretty" => subscriber.pretty().init(),
        _ => subscriber.compact().init(),
    }
}
