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

//! Local storage of the toggles received from the server.
//!
//! The repository only depends on the [`Storage`] trait. Two implementations ship
//! with the crate: [`InMemoryStorage`] and [`FileBackupStorage`], which also keeps
//! the last received toggles on disk so they are available before the first fetch.

mod errors;
mod file_backup;
mod in_memory;

use std::collections::HashMap;
use std::time::Duration;

pub use errors::{StorageError, StorageResult};
pub use file_backup::FileBackupStorage;
pub use in_memory::InMemoryStorage;

use crate::models::ToggleDefinition;

/// Key/value store of toggles, keyed by toggle name.
pub trait Storage: std::fmt::Debug + Send + Sync {
    /// Blocks until the storage is usable or `timeout` elapses. Returns whether it is ready.
    ///
    /// Once a storage reported ready it stays ready.
    fn wait_until_ready(&self, timeout: Duration) -> StorageResult<bool>;

    /// Replaces the whole content with `toggles`.
    fn reset(&self, toggles: HashMap<String, ToggleDefinition>) -> StorageResult<()>;

    fn get(&self, name: &str) -> StorageResult<Option<ToggleDefinition>>;
}
