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

use std::sync::Arc;

use thiserror::Error;

use crate::models::PayloadError;
use crate::network::NetworkError;
use crate::storage::StorageError;

/// Why a fetch cycle did not update the toggles.
///
/// None of these stop the polling: the next cycle runs as scheduled and the last
/// good toggles stay in the storage.
#[derive(Debug, Error, Clone)]
pub enum RepositoryError {
    /// DNS, connection or timeout problems.
    #[error("Cannot reach toggle endpoint: {0}")]
    Transport(#[source] Arc<NetworkError>),

    /// The server answered something other than `200` or `304`.
    #[error("Response was not statusCode 200 but {0}")]
    HttpStatus(u16),

    #[error("Cannot parse toggle payload: {0}")]
    PayloadParse(String),

    #[error("Invalid toggle '{toggle}': {reason}")]
    ToggleValidation { toggle: String, reason: String },

    #[error("Cannot store toggles: {0}")]
    Storage(#[source] Arc<StorageError>),
}

impl From<PayloadError> for RepositoryError {
    fn from(value: PayloadError) -> Self {
        match value {
            PayloadError::Parse(msg) => Self::PayloadParse(msg),
            PayloadError::InvalidToggle { toggle, reason } => {
                Self::ToggleValidation { toggle, reason }
            }
        }
    }
}

impl From<NetworkError> for RepositoryError {
    fn from(value: NetworkError) -> Self {
        Self::Transport(Arc::new(value))
    }
}

impl From<StorageError> for RepositoryError {
    fn from(value: StorageError) -> Self {
        Self::Storage(Arc::new(value))
    }
}
