//! Log subscriber setup.
//!
//! The catalog only emits `tracing` events; nothing is printed unless a
//! subscriber is installed, either by the embedding application or here.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding the filter directives.
pub const LOG_ENV: &str = "NC4META_LOG";

static INSTALLED: AtomicBool = AtomicBool::new(false);

/// Install a formatting subscriber filtered by `NC4META_LOG`, writing to
/// stdout.
///
/// Returns false if a global subscriber was already set. Safe to call
/// more than once.
pub fn init_tracing() -> bool {
    install(BoxMakeWriter::new(std::io::stdout))
}

/// Like [`init_tracing`], but output is captured by the test harness.
pub fn init_test_tracing() -> bool {
    install(BoxMakeWriter::new(fmt::TestWriter::default()))
}

fn install(writer: BoxMakeWriter) -> bool {
    if INSTALLED.swap(true, Ordering::AcqRel) {
        return false;
    }

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(writer));

    tracing::subscriber::set_global_default(subscriber).is_ok()
}
