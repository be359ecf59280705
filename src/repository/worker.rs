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

use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use log::{debug, warn};

use super::{RepositoryError, RepositoryEvent, RepositoryState, Subscribers};
use crate::models::FeaturePayload;
use crate::network::{FetchResponse, Fetcher, NetworkResult};
use crate::storage::Storage;
use crate::utils::Waitable;

/// How often the worker checks for termination while the storage is not ready.
const STORAGE_READY_POLL: Duration = Duration::from_millis(50);

pub(crate) struct PollingWorker<F: Fetcher> {
    fetcher: F,
    storage: Arc<dyn Storage>,
    etag: Arc<Mutex<Option<String>>>,
    state: Waitable<RepositoryState>,
    subscribers: Subscribers,
    refresh_interval: Duration,
}

impl<F: Fetcher> PollingWorker<F> {
    pub(crate) fn new(
        fetcher: F,
        storage: Arc<dyn Storage>,
        etag: Arc<Mutex<Option<String>>>,
        state: Waitable<RepositoryState>,
        subscribers: Subscribers,
        refresh_interval: Duration,
    ) -> Self {
        Self {
            fetcher,
            storage,
            etag,
            state,
            subscribers,
            refresh_interval,
        }
    }

    /// Waits for the storage, then runs fetch cycles until terminated.
    ///
    /// With a zero `refresh_interval` a single cycle runs. Otherwise cycle `k` starts
    /// at `start + k * refresh_interval`, or right away if the previous one overran.
    /// A response arriving after termination is dropped without touching the
    /// storage, the ETag or the subscribers.
    pub(crate) fn run(self, thread_termination_receiver: Receiver<()>) {
        if !self.wait_for_storage(&thread_termination_receiver) {
            return;
        }
        match self
            .state
            .set_if(RepositoryState::Polling, |s| *s == RepositoryState::AwaitingStorage)
        {
            Ok(true) => debug!(
                "Storage ready, polling toggles every {:?}",
                self.refresh_interval
            ),
            _ => return,
        }

        let mut next_tick = Instant::now();
        loop {
            let response = self.fetch();
            if Self::terminated(&thread_termination_receiver) {
                debug!("Repository stopped, discarding response of last fetch");
                return;
            }
            self.handle_response(response);

            if self.refresh_interval.is_zero() {
                return;
            }
            next_tick += self.refresh_interval;
            let timeout = next_tick.saturating_duration_since(Instant::now());
            if timeout.is_zero() {
                next_tick = Instant::now();
            }
            match thread_termination_receiver.recv_timeout(timeout) {
                Err(RecvTimeoutError::Timeout) => {}
                _ => return,
            }
        }
    }

    /// Returns `false` if terminated (or the storage failed) before it became ready.
    fn wait_for_storage(&self, thread_termination_receiver: &Receiver<()>) -> bool {
        loop {
            match self.storage.wait_until_ready(STORAGE_READY_POLL) {
                Ok(true) => return true,
                Ok(false) => {}
                Err(e) => {
                    let e = RepositoryError::from(e);
                    warn!("Storage never became ready: {e}");
                    self.subscribers.emit(RepositoryEvent::Failed(e));
                    return false;
                }
            }
            if Self::terminated(thread_termination_receiver) {
                return false;
            }
        }
    }

    fn terminated(thread_termination_receiver: &Receiver<()>) -> bool {
        !matches!(
            thread_termination_receiver.try_recv(),
            Err(TryRecvError::Empty)
        )
    }

    fn fetch(&self) -> NetworkResult<FetchResponse> {
        let etag = self.current_etag();
        debug!("Fetching toggles (etag: {:?})", etag);
        self.fetcher.fetch(etag.as_deref())
    }

    fn current_etag(&self) -> Option<String> {
        self.etag
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Applies the outcome of a request and publishes it. Returns the published
    /// event, if any.
    ///
    /// Nothing is published once the repository left the `Polling` state.
    pub(crate) fn handle_response(
        &self,
        response: NetworkResult<FetchResponse>,
    ) -> Option<RepositoryEvent> {
        let (event, etag) = match response {
            Err(e) => (RepositoryEvent::Failed(e.into()), None),
            Ok(FetchResponse::NotModified) => {
                debug!("Toggles not modified");
                return None;
            }
            Ok(FetchResponse::HttpError { status_code }) => (
                RepositoryEvent::Failed(RepositoryError::HttpStatus(status_code)),
                None,
            ),
            Ok(FetchResponse::Success { body, etag }) => match self.update(&body) {
                Ok(true) => (RepositoryEvent::Updated, etag),
                Ok(false) => return Self::discarded(),
                Err(e) => (RepositoryEvent::Failed(e), None),
            },
        };
        self.publish(event, etag)
    }

    /// Replaces the stored toggles. Either the whole payload is stored or nothing.
    /// Returns `false` if the repository was stopped before the storage was touched.
    fn update(&self, body: &str) -> Result<bool, RepositoryError> {
        let toggles = FeaturePayload::parse(body)?.into_toggle_map();
        if !self.is_polling() {
            return Ok(false);
        }
        debug!("Replacing stored toggles with {} toggles", toggles.len());
        self.storage.reset(toggles)?;
        Ok(true)
    }

    /// Stores `etag` and emits `event` while holding the state lock, so that
    /// [`crate::Repository::stop`] either happens before (and nothing is published)
    /// or waits until the event is out.
    fn publish(&self, event: RepositoryEvent, etag: Option<String>) -> Option<RepositoryEvent> {
        let published = self.state.run_if(
            |state| *state == RepositoryState::Polling,
            || {
                if let Some(etag) = etag {
                    *self.etag.lock().unwrap_or_else(PoisonError::into_inner) = Some(etag);
                }
                if let RepositoryEvent::Failed(e) = &event {
                    warn!("Fetching toggles failed: {e}");
                }
                self.subscribers.emit(event.clone());
            },
        );
        match published {
            Ok(Some(())) => Some(event),
            _ => Self::discarded(),
        }
    }

    fn is_polling(&self) -> bool {
        matches!(self.state.get(), Ok(RepositoryState::Polling))
    }

    fn discarded() -> Option<RepositoryEvent> {
        debug!("Repository stopped, discarding response of last fetch");
        None
    }
}
