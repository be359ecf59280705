#![allow(dead_code)]

use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::thread::sleep;
use std::time::{Duration, Instant};

use serde_json::json;
use toggle_repository::{
    InMemoryStorage, Repository, RepositoryBuilder, RepositoryEvent, Storage,
};

pub const WAIT: Duration = Duration::from_secs(5);

pub fn feature_payload() -> serde_json::Value {
    json!({
        "features": [
            {
                "name": "feature",
                "enabled": true,
                "strategies": [{"name": "default"}]
            }
        ]
    })
}

/// Starts a repository against `url` with its subscriber registered before the first fetch.
pub fn start_repository(
    url: &str,
    refresh_interval: Duration,
    storage: Arc<dyn Storage>,
) -> (Repository, Receiver<RepositoryEvent>) {
    let (events_tx, events_rx) = channel();
    let repository = RepositoryBuilder::new("foo", url)
        .authorization("foo:bar")
        .refresh_interval(refresh_interval)
        .request_timeout(Duration::from_secs(2))
        .storage(storage)
        .subscriber(events_tx)
        .build()
        .unwrap();
    (repository, events_rx)
}

pub fn start_repository_in_memory(
    url: &str,
    refresh_interval: Duration,
) -> (Repository, Receiver<RepositoryEvent>) {
    start_repository(url, refresh_interval, Arc::new(InMemoryStorage::new()))
}

pub fn wait_until<F: FnMut() -> bool>(mut condition: F) {
    let start = Instant::now();
    while !condition() {
        if start.elapsed() > WAIT {
            panic!("Condition not reached in time")
        }
        sleep(Duration::from_millis(10));
    }
}
