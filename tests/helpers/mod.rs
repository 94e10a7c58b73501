#![allow(dead_code)]
pub mod mock_query;
pub mod recording_presenter;

use std::time::{Duration, Instant};

use sysview::Dispatcher;

/// Delivers pending notifications until `done` holds or `timeout` elapses.
pub async fn pump_until(
    dispatcher: &mut Dispatcher,
    timeout: Duration,
    mut done: impl FnMut() -> bool,
) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        dispatcher.dispatch_pending();
        if done() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
