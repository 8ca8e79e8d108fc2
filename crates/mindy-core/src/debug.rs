//! Debug instrumentation.
//!
//! [`init_logging`] installs the process-wide `tracing` subscriber (with the
//! `log` bridge) writing to stderr. [`enable`] raises it to debug level and
//! installs a panic hook that logs the panic with a backtrace.
use std::backtrace::Backtrace;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt, reload};

static ENABLED: AtomicBool = AtomicBool::new(false);
static FILTER: OnceLock<reload::Handle<EnvFilter, Registry>> = OnceLock::new();

/// Install the global subscriber filtered at `directive` unless `RUST_LOG`
/// says otherwise. Returns false when a subscriber was already installed.
pub fn init_logging(directive: &str) -> bool {
    if FILTER.get().is_some() {
        return false;
    }
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    let (filter_layer, handle) = reload::Layer::new(filter);
    let subscriber = tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt::layer().with_writer(std::io::stderr));
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        return false;
    }
    if let Err(e) = tracing_log::LogTracer::init() {
        tracing::warn!("log bridge not installed: {}", e);
    }
    FILTER.set(handle).is_ok()
}

/// Turn on debug instrumentation. Calling it again has no effect.
pub fn enable() {
    if ENABLED.swap(true, Ordering::SeqCst) {
        return;
    }

    if !init_logging("debug") {
        if let Some(handle) = FILTER.get() {
            if let Err(e) = handle.reload(EnvFilter::new("debug")) {
                tracing::warn!("could not raise log level to debug: {}", e);
            }
        }
    }

    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        log::error!("{}\n{}", info, Backtrace::force_capture());
        previous(info);
    }));

    log::debug!("Debug instrumentation enabled");
}

pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::SeqCst)
}
