use tracing_subscriber::EnvFilter;

/// Default filter directives when `RUST_LOG` is unset. The tick loop and
/// the magnetism resolver log per-event at debug; keeping them at info by
/// default means a 500 Hz daemon does not flood the journal.
const DEFAULT_DIRECTIVES: &str = "info,gp_engine::tick=info,gp_engine::magnet=info";

pub fn init_logger() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

    // try_init so tests and embedders that already installed a subscriber
    // are left alone.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .try_init();
}
