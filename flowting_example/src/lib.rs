use flowting_stream::ClientConfig;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Filter directive from the config, unless `RUST_LOG` is set.
fn env_filter(config: &ClientConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Output goes to stderr so stdout stays free for streamed text and payloads.
fn fmt_layer(config: &ClientConfig) -> BoxedLayer {
    if config.logging.format.eq_ignore_ascii_case("json") {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer().pretty().with_writer(std::io::stderr).boxed()
    }
}

/// Install the global subscriber for the example binaries.
pub fn init_logging(config: &ClientConfig) {
    tracing_subscriber::registry()
        .with(fmt_layer(config))
        .with(env_filter(config))
        .init();
}
