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

//! The polling repository: keeps a [`crate::storage::Storage`] synchronized with the
//! toggle endpoint and reports every outcome to its subscribers.

mod errors;
mod events;
mod repository;
mod state;
mod worker;

pub use errors::RepositoryError;
pub use events::RepositoryEvent;
pub use repository::Repository;
pub use state::RepositoryState;

pub(crate) use events::Subscribers;
pub(crate) use worker::PollingWorker;
