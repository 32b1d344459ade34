use tracing::subscriber::set_global_default;
use tracing::Subscriber;
use tracing_appender::rolling::RollingFileAppender;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};

pub fn get_subscriber(
    name: String,
    env_filter: String,
    file_appender: RollingFileAppender,
) -> impl Subscriber + Send + Sync {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(env_filter));

    let stdout_layer = BunyanFormattingLayer::new(name.clone(), std::io::stdout);
    let file_layer = BunyanFormattingLayer::new(name, file_appender);

    Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(stdout_layer)
        .with(file_layer)
}

pub fn init_subscriber(subscriber: impl Subscriber + Send + Sync) {
    LogTracer::init().expect("Failed to set logger");
    set_global_default(subscriber).expect("Failed to set subscriber");
}
