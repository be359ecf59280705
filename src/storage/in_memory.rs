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

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use super::{Storage, StorageResult};
use crate::models::ToggleDefinition;
use crate::utils::Waitable;

/// Keeps the toggles in memory only.
#[derive(Debug)]
pub struct InMemoryStorage {
    toggles: RwLock<HashMap<String, ToggleDefinition>>,
    ready: Waitable<bool>,
}

impl InMemoryStorage {
    /// A storage that is ready right away.
    pub fn new() -> Self {
        Self::with_readiness(true)
    }

    /// A storage that stays not-ready until [`InMemoryStorage::mark_ready`] is called.
    pub fn pending() -> Self {
        Self::with_readiness(false)
    }

    fn with_readiness(ready: bool) -> Self {
        Self {
            toggles: RwLock::new(HashMap::new()),
            ready: Waitable::new(ready),
        }
    }

    pub fn mark_ready(&self) -> StorageResult<()> {
        self.ready.set(true)?;
        Ok(())
    }

    /// A copy of everything currently stored.
    pub fn snapshot(&self) -> StorageResult<HashMap<String, ToggleDefinition>> {
        Ok(self.toggles.read()?.clone())
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for InMemoryStorage {
    fn wait_until_ready(&self, timeout: Duration) -> StorageResult<bool> {
        let (_, ready) = self.ready.wait_until(timeout, |ready| *ready)?;
        Ok(ready)
    }

    fn reset(&self, toggles: HashMap<String, ToggleDefinition>) -> StorageResult<()> {
        *self.toggles.write()? = toggles;
        Ok(())
    }

    fn get(&self, name: &str) -> StorageResult<Option<ToggleDefinition>> {
        Ok(self.toggles.read()?.get(name).cloned())
    }
}
