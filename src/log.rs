//! Diagnostics: one-shot `tracing` subscriber setup, plus the
//! `ILLEGAL` mutation event emitted in debug builds.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Initialize the global tracing subscriber exactly once.
///
/// `FUZZER_QUIET` disables logging entirely. `DEBUG=1` raises the
/// filter to `debug` (otherwise `warn`). `PROJECT_ROOT`, when set,
/// redirects output to `$PROJECT_ROOT/workdir/logs/mutator.log`
/// instead of stderr.
pub fn init() {
    INIT.call_once(|| {
        if std::env::var("FUZZER_QUIET").is_ok() {
            return;
        }

        let verbose = std::env::var("DEBUG").map(|v| v == "1").unwrap_or(false);
        let filter = EnvFilter::new(if verbose { "debug" } else { "warn" });
        let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

        if let Ok(root) = std::env::var("PROJECT_ROOT") {
            let log_dir = std::path::Path::new(&root).join("workdir").join("logs");
            let _ = std::fs::create_dir_all(&log_dir);
            if let Ok(file) = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_dir.join("mutator.log"))
            {
                let _ = builder.with_writer(std::sync::Mutex::new(file)).try_init();
                return;
            }
        }

        let _ = builder.try_init();
    });
}

/// Emit an `ILLEGAL` event: a mutation produced an encoding the
/// legality oracle rejects. Always emitted at `debug` level, so it is
/// silent unless `DEBUG=1` raised the filter in [`init`].
pub fn illegal_event(context: &str, word: u32) {
    tracing::debug!(word = format!("{word:#010x}"), context, "ILLEGAL");
}
