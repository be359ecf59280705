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

//! Background polling client for feature toggle definitions.
//!
//! A [`Repository`] fetches the toggles from `<url>/features`, validates them and
//! stores them in a pluggable [`Storage`]. Requests are conditional (`If-None-Match`)
//! on the ETag of the last accepted response, so unchanged toggles cost a `304`.
//! Every outcome is published to subscribers as a [`RepositoryEvent`].
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use toggle_repository::{InMemoryStorage, Repository, RepositoryEvent};
//!
//! let storage = Arc::new(InMemoryStorage::new());
//! let repository = Repository::new(
//!     "my-app",
//!     "https://toggles.example.com/api/",
//!     "secret-token",
//!     Duration::from_secs(15),
//!     storage,
//! )?;
//!
//! for event in repository.subscribe() {
//!     match event {
//!         RepositoryEvent::Updated => {
//!             println!("checkout enabled: {}", repository.is_enabled("checkout")?);
//!         }
//!         RepositoryEvent::Failed(e) => eprintln!("{e}"),
//!     }
//! }
//! # Ok::<(), toggle_repository::Error>(())
//! ```
//!
//! Toggles are stored as received. Evaluating their strategies is out of scope.

mod builders;
mod errors;
mod models;
mod network;
mod repository;
mod storage;
mod utils;

pub use builders::{RepositoryBuilder, DEFAULT_REFRESH_INTERVAL, DEFAULT_REQUEST_TIMEOUT};
pub use errors::{Error, Result};
pub use models::{FeaturePayload, PayloadError, StrategyDefinition, ToggleDefinition};
pub use network::{FetchResponse, Fetcher, HttpFetcher, NetworkError, NetworkResult};
pub use repository::{Repository, RepositoryError, RepositoryEvent, RepositoryState};
pub use storage::{FileBackupStorage, InMemoryStorage, Storage, StorageError, StorageResult};
