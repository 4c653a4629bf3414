use std::future::Future;
use std::time::Duration;

use tokio::time::{Instant, sleep};

/// Returned when [`poll_until`] exhausts its timeout without the probe
/// producing a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("timed out after {0:?}")]
pub struct TimedOut(pub Duration);

/// Run `probe` every `interval` until it yields `Some(T)` or `timeout`
/// elapses. The first probe runs immediately. A probe that fails internally
/// should return `None` to keep waiting; only the overall timeout surfaces
/// as an error.
pub async fn poll_until<T, F, Fut>(
    interval: Duration,
    timeout: Duration,
    mut probe: F,
) -> Result<T, TimedOut>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(value) = probe().await {
            return Ok(value);
        }
        if Instant::now() + interval > deadline {
            return Err(TimedOut(timeout));
        }
        sleep(interval).await;
    }
}
