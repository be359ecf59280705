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

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};

use super::RepositoryError;

/// Outcome of a fetch cycle, as seen by subscribers.
///
/// `304 Not Modified` cycles produce no event at all.
#[derive(Debug, Clone)]
pub enum RepositoryEvent {
    /// The storage now holds the toggles of the latest response. Read them back
    /// through [`crate::Repository::get_toggle`].
    Updated,

    Failed(RepositoryError),
}

/// Fan-out of [`RepositoryEvent`]s to any number of channels.
#[derive(Debug, Clone, Default)]
pub(crate) struct Subscribers {
    senders: Arc<Mutex<Vec<Sender<RepositoryEvent>>>>,
}

impl Subscribers {
    pub(crate) fn add(&self, sender: Sender<RepositoryEvent>) {
        self.senders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(sender);
    }

    pub(crate) fn subscribe(&self) -> Receiver<RepositoryEvent> {
        let (sender, receiver) = mpsc::channel();
        self.add(sender);
        receiver
    }

    /// Sends `event` to every subscriber, forgetting the ones whose receiver is gone.
    pub(crate) fn emit(&self, event: RepositoryEvent) {
        self.senders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|sender| sender.send(event.clone()).is_ok());
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.senders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
