// (C) Copyright IBM Corp. 2025.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use log::{debug, error, warn};

use super::{PollingWorker, RepositoryEvent, RepositoryState, Subscribers};
use crate::builders::RepositoryBuilder;
use crate::models::ToggleDefinition;
use crate::network::Fetcher;
use crate::storage::Storage;
use crate::utils::{ThreadHandle, ThreadStatus, Waitable};
use crate::{Error, Result};

/// Keeps a [`Storage`] synchronized with a remote toggle endpoint.
///
/// A background thread waits until the storage is ready, fetches the toggles once
/// and then again every refresh interval, until [`Repository::stop`] is called or
/// the repository is dropped. Requests are conditional on the ETag of the last
/// accepted response. Outcomes are published as [`RepositoryEvent`]s.
#[derive(Debug)]
pub struct Repository {
    app_name: String,
    storage: Arc<dyn Storage>,
    etag: Arc<Mutex<Option<String>>>,
    state: Waitable<RepositoryState>,
    subscribers: Subscribers,
    update_thread: Mutex<Option<ThreadHandle<()>>>,
}

impl Repository {
    /// Creates and starts a repository.
    ///
    /// Use [`RepositoryBuilder`] for the remaining settings.
    ///
    /// # Arguments
    ///
    /// * `app_name` - Identifies the application towards the server.
    /// * `url` - Base URL of the toggle service. Toggles are requested from `<url>/features`.
    /// * `authorization` - Sent as `Authorization` header.
    /// * `refresh_interval` - Time between fetches. Zero fetches only once.
    /// * `storage` - Where the toggles are kept.
    pub fn new(
        app_name: &str,
        url: &str,
        authorization: &str,
        refresh_interval: Duration,
        storage: Arc<dyn Storage>,
    ) -> Result<Self> {
        RepositoryBuilder::new(app_name, url)
            .authorization(authorization)
            .refresh_interval(refresh_interval)
            .storage(storage)
            .build()
    }

    pub(crate) fn start<F: Fetcher>(
        app_name: String,
        fetcher: F,
        storage: Arc<dyn Storage>,
        etag: Option<String>,
        refresh_interval: Duration,
        subscribers: Vec<Sender<RepositoryEvent>>,
    ) -> Result<Self> {
        let etag = Arc::new(Mutex::new(etag));
        let state = Waitable::new(RepositoryState::AwaitingStorage);
        let event_subscribers = Subscribers::default();
        for sender in subscribers {
            event_subscribers.add(sender);
        }

        let worker = PollingWorker::new(
            fetcher,
            storage.clone(),
            etag.clone(),
            state.clone(),
            event_subscribers.clone(),
            refresh_interval,
        );
        let update_thread = ThreadHandle::new(&format!("toggles-{app_name}"), move |terminator| {
            worker.run(terminator)
        })
        .map_err(|e| Error::ThreadStartError(e.to_string()))?;
        debug!("Started toggle repository for '{app_name}'");

        Ok(Self {
            app_name,
            storage,
            etag,
            state,
            subscribers: event_subscribers,
            update_thread: Mutex::new(Some(update_thread)),
        })
    }

    /// Stops polling. Idempotent.
    ///
    /// Returns without waiting for a request in flight; its response will be
    /// ignored.
    pub fn stop(&self) -> Result<()> {
        self.state.set(RepositoryState::Stopped)?;
        if let Some(mut update_thread) = self.update_thread.lock()?.take() {
            update_thread.terminate();
            debug!("Stopped toggle repository for '{}'", self.app_name);
        }
        Ok(())
    }

    /// The toggle named `name` as currently held in the storage. Never triggers a fetch.
    pub fn get_toggle(&self, name: &str) -> Result<Option<ToggleDefinition>> {
        Ok(self.storage.get(name)?)
    }

    /// Whether the toggle `name` exists and is switched on. Strategies are not evaluated.
    pub fn is_enabled(&self, name: &str) -> Result<bool> {
        Ok(self
            .get_toggle(name)?
            .is_some_and(|toggle| toggle.is_enabled()))
    }

    /// A new channel receiving every event published from now on.
    pub fn subscribe(&self) -> Receiver<RepositoryEvent> {
        self.subscribers.subscribe()
    }

    /// ETag of the last accepted response (or the one given at construction).
    pub fn etag(&self) -> Option<String> {
        self.etag
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn state(&self) -> Result<RepositoryState> {
        let state = self.state.get()?;
        if let Some(update_thread) = self.update_thread.lock()?.as_mut() {
            if let ThreadStatus::Finished(Err(msg)) = update_thread.get_thread_status() {
                error!("Toggle polling thread died: {msg}");
                return Ok(RepositoryState::Stopped);
            }
        }
        Ok(state)
    }

    /// Blocks until the repository reaches `state` or `timeout` elapses. Returns
    /// whether the state was reached.
    pub fn wait_for_state(&self, state: RepositoryState, timeout: Duration) -> Result<bool> {
        let (_, reached) = self.state.wait_until(timeout, |current| *current == state)?;
        Ok(reached)
    }

    pub fn get_app_name(&self) -> &str {
        &self.app_name
    }
}

impl Drop for Repository {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!("Failed to stop toggle repository for '{}': {e}", self.app_name);
        }
    }
}
