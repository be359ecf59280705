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

use std::sync::PoisonError;

use thiserror::Error;

pub type StorageResult<T> = std::result::Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Cannot acquire storage lock")]
    CannotAcquireLock,

    #[error("Cannot write backup file '{path}': {source}")]
    BackupWrite {
        path: String,
        source: std::io::Error,
    },

    #[error("Cannot start backup loader thread: {0}")]
    LoaderStart(std::io::Error),

    #[error(transparent)]
    SerializationError(#[from] serde_json::Error),
}

impl<T> From<PoisonError<T>> for StorageError {
    fn from(_value: PoisonError<T>) -> Self {
        StorageError::CannotAcquireLock
    }
}
