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

/// Lifecycle of a [`crate::Repository`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryState {
    /// Waiting for the storage to become ready. No request has been sent yet.
    AwaitingStorage,

    /// The storage is ready and fetch cycles are being run.
    Polling,

    /// [`crate::Repository::stop`] was called. Terminal.
    Stopped,
}

impl std::fmt::Display for RepositoryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepositoryState::AwaitingStorage => write!(f, "AwaitingStorage"),
            RepositoryState::Polling => write!(f, "Polling"),
            RepositoryState::Stopped => write!(f, "Stopped"),
        }
    }
}
