//! Shared helpers for longcall integration tests

#![allow(dead_code)]

use longcall::cache::CacheProvider;
use longcall::engine::TaskEngine;
use longcall::task::{PollOutcome, TaskHandle};
use longcall::web::{AppState, WebConfig};
use std::sync::Arc;
use std::time::Duration;

pub type TestEngine = TaskEngine<Vec<String>, CacheProvider<Vec<String>>>;

pub const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Engine over a fresh in-process cache
pub fn in_process_engine() -> TestEngine {
    let cache = CacheProvider::in_process(Duration::from_secs(600), None);
    TaskEngine::new("test-operation", Arc::new(cache))
}

/// App state whose demo operation takes `demo_delay`
pub fn test_app_state(demo_delay: Duration) -> AppState {
    AppState::new(
        in_process_engine(),
        WebConfig {
            default_task_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(2),
            demo_delay,
        },
    )
}

pub fn greeting() -> Vec<String> {
    vec!["Hello".to_string(), "Client!".to_string()]
}

/// Poll until the outcome is no longer pending, counting pending answers
pub async fn poll_until_settled(
    engine: &TestEngine,
    handle: TaskHandle,
    deadline: Duration,
) -> (PollOutcome<Vec<String>>, usize) {
    let started = tokio::time::Instant::now();
    let mut pending = 0;
    loop {
        let outcome = engine
            .poll_handle(handle)
            .await
            .expect("poll should not fail");
        match outcome {
            PollOutcome::Pending => {
                pending += 1;
                assert!(
                    started.elapsed() < deadline,
                    "task {handle} still pending after {deadline:?}"
                );
                tokio::time::sleep(POLL_INTERVAL).await;
            }
            settled => return (settled, pending),
        }
    }
}
