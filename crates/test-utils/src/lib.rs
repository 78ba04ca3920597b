pub mod builders;
pub mod fake_compiler;
pub mod fake_control;

use std::sync::{Arc, Once};

use sasswatch::watch::Watcher;
use tracing_subscriber::{EnvFilter, fmt};

pub use fake_compiler::{FakeCompiler, FakeSelector, FakeWatch, WatchCall};
pub use fake_control::RecordingControl;

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// A watcher wired to a fake compiler and a recording process control.
pub fn fake_watcher(compiler: FakeCompiler) -> (Watcher, Arc<FakeCompiler>, Arc<RecordingControl>) {
    let compiler = Arc::new(compiler);
    let control = Arc::new(RecordingControl::new());
    let watcher = Watcher::new(
        Arc::new(FakeSelector(Arc::clone(&compiler))),
        control.clone(),
    );
    (watcher, compiler, control)
}

/// Run a future with a 5-second timeout.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(std::time::Duration::from_secs(5), f)
        .await
        .expect("Test timed out after 5 seconds")
}
