use std::fs::File;
use std::io;
use std::path::Path;
use std::thread::sleep;
use std::time::Duration;

static INIT_ONCE: std::sync::Once = std::sync::Once::new();
pub fn init_tracing_once() {
    INIT_ONCE.call_once(|| {
        let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(io::stderr)
            .try_init();
    });
}

/// Resolve a requested worker count: 0 means "use available parallelism".
pub fn resolve_workers(requested: usize) -> usize {
    if requested > 0 {
        return requested;
    }
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(4)
}

/// Return true for transient/retriable I/O errors often seen on Windows when
/// filter drivers (AV/backup), network volumes, or sharing violations occur.
fn is_retriable_io_error(e: &io::Error) -> bool {
    // 5 = access denied (AV/share), 32 = sharing violation, 33 = lock violation,
    // 21 = device not ready, 1117 = I/O device error.
    matches!(e.raw_os_error(), Some(5) | Some(32) | Some(33) | Some(21) | Some(1117))
}

/// Open a file with retries/backoff for transient errors.
/// Non-transient errors (not found, permission) are returned immediately.
pub fn open_with_backoff(path: &Path, tries: usize, delay_ms: u64) -> io::Result<File> {
    let mut last_err: Option<io::Error> = None;
    for i in 0..tries.max(1) {
        match File::open(path) {
            Ok(f) => return Ok(f),
            Err(e) if is_retriable_io_error(&e) => {
                tracing::debug!(path = %path.display(), attempt = i + 1, error = %e, "transient open failure, retrying");
                last_err = Some(e);
                sleep(Duration::from_millis(delay_ms.saturating_mul((i + 1) as u64)));
            }
            Err(e) => return Err(e),
        }
    }
    Err(last_err.unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "open failed")))
}
