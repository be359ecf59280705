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

use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::network::{Fetcher, HttpFetcher, NetworkError};
use crate::repository::{Repository, RepositoryEvent};
use crate::storage::{InMemoryStorage, Storage};
use crate::{Error, Result};

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(15);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Collects the settings of a [`Repository`] and starts it.
///
/// ```no_run
/// use std::time::Duration;
/// use toggle_repository::RepositoryBuilder;
///
/// let repository = RepositoryBuilder::new("my-app", "https://toggles.example.com/api/")
///     .authorization("secret-token")
///     .refresh_interval(Duration::from_secs(10))
///     .build()?;
/// # Ok::<(), toggle_repository::Error>(())
/// ```
#[derive(Debug)]
pub struct RepositoryBuilder {
    app_name: String,
    url: String,
    authorization: String,
    refresh_interval: Duration,
    request_timeout: Duration,
    custom_headers: Vec<(String, String)>,
    etag: Option<String>,
    storage: Option<Arc<dyn Storage>>,
    subscribers: Vec<Sender<RepositoryEvent>>,
}

impl RepositoryBuilder {
    /// # Arguments
    ///
    /// * `app_name` - Identifies the application towards the server (`User-Agent`).
    /// * `url` - Base URL of the toggle service. Toggles are requested from `<url>/features`.
    pub fn new(app_name: &str, url: &str) -> Self {
        Self {
            app_name: app_name.to_string(),
            url: url.to_string(),
            authorization: String::new(),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            custom_headers: Vec::new(),
            etag: None,
            storage: None,
            subscribers: Vec::new(),
        }
    }

    /// Value of the `Authorization` header. Without a token no such header is sent.
    pub fn authorization(mut self, token: &str) -> Self {
        self.authorization = token.to_string();
        self
    }

    /// Time between fetches. Zero fetches once and never again.
    pub fn refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn custom_header(mut self, name: &str, value: &str) -> Self {
        self.custom_headers
            .push((name.to_string(), value.to_string()));
        self
    }

    /// ETag of toggles already present in the storage, e.g. restored from a backup.
    /// The first request will be conditional on it.
    pub fn etag(mut self, etag: &str) -> Self {
        self.etag = Some(etag.to_string());
        self
    }

    /// Where toggles are kept. Defaults to an [`InMemoryStorage`].
    pub fn storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Registers a channel before the repository starts, so not even the first
    /// event can be missed.
    pub fn subscriber(mut self, sender: Sender<RepositoryEvent>) -> Self {
        self.subscribers.push(sender);
        self
    }

    /// Validates the settings and starts the repository with an [`HttpFetcher`].
    pub fn build(self) -> Result<Repository> {
        let url = Self::parse_url(&self.url)?;
        let fetcher = HttpFetcher::new(
            &url,
            &self.app_name,
            &self.authorization,
            &self.custom_headers,
            self.request_timeout,
        )
        .map_err(|e| match e {
            NetworkError::InvalidHeaderValue(name) => Error::InvalidHeader(name),
            e => Error::NetworkError(e),
        })?;
        self.build_with_fetcher(fetcher)
    }

    /// Starts the repository using a custom transport. URL, authorization, timeout
    /// and custom headers are left to `fetcher`.
    pub fn build_with_fetcher<F: Fetcher>(self, fetcher: F) -> Result<Repository> {
        let storage = self
            .storage
            .unwrap_or_else(|| Arc::new(InMemoryStorage::new()));
        Repository::start(
            self.app_name,
            fetcher,
            storage,
            self.etag,
            self.refresh_interval,
            self.subscribers,
        )
    }

    fn parse_url(url: &str) -> Result<Url> {
        let parsed = Url::parse(url).map_err(|e| Error::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        match parsed.scheme() {
            "http" | "https" => Ok(parsed),
            scheme => Err(Error::InvalidUrl {
                url: url.to_string(),
                reason: format!("unsupported scheme '{scheme}'"),
            }),
        }
    }
}
