use std::sync::atomic::{self, AtomicBool};
use std::sync::Arc;
use std::time::Duration;

use async_stream::stream;
use futures::pin_mut;
use futures_core::stream::Stream;
use futures_core::Future;
use futures_util::stream::StreamExt;
use tokio::signal;
use tokio_retry::strategy::{jitter, FixedInterval};
use tokio_retry::RetryIf;

use crate::error::MainError;

pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(5000);

fn heights(from: u64) -> impl Stream<Item = u64> {
    stream! {
        for height in from..u64::MAX {
            yield height;
        }
    }
}

/// Runs `f` for every height starting at `first_height`. A height is retried
/// every `interval` (with jitter) for as long as it fails with a retryable
/// error; other errors skip it. Stops on Ctrl-C.
pub async fn crawl<F, Fut>(
    f: F,
    first_height: u64,
    interval: Option<Duration>,
) -> Result<(), MainError>
where
    F: Fn(u64) -> Fut,
    Fut: Future<Output = Result<(), MainError>>,
{
    let must_exit = must_exit_handle();

    crawl_until(f, first_height, interval, must_exit).await
}

async fn crawl_until<F, Fut>(
    f: F,
    first_height: u64,
    interval: Option<Duration>,
    must_exit: Arc<AtomicBool>,
) -> Result<(), MainError>
where
    F: Fn(u64) -> Fut,
    Fut: Future<Output = Result<(), MainError>>,
{
    let interval = interval.unwrap_or(DEFAULT_INTERVAL);
    let s = heights(first_height);
    pin_mut!(s);
    let retry_strategy = FixedInterval::new(interval).map(jitter);

    while let Some(height) = s.next().await {
        if must_exit.load(atomic::Ordering::Relaxed) {
            break;
        }
        let result = RetryIf::spawn(
            retry_strategy.clone(),
            || f(height),
            |e: &MainError| {
                !must_exit.load(atomic::Ordering::Relaxed) && is_retryable(e)
            },
        )
        .await;

        if let Err(reason) = result {
            tracing::warn!(height, %reason, "Giving up on height");
        }
    }

    Ok(())
}

fn is_retryable(error: &MainError) -> bool {
    matches!(error, MainError::RpcError | MainError::NoAction)
}

fn must_exit_handle() -> Arc<AtomicBool> {
    let handle = Arc::new(AtomicBool::new(false));
    let task_handle = Arc::clone(&handle);
    tokio::spawn(async move {
        if let Err(reason) = signal::ctrl_c().await {
            tracing::error!(%reason, "Error receiving interrupt signal");
            return;
        }
        task_handle.store(true, atomic::Ordering::Relaxed);
    });
    handle
}
