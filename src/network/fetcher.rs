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

use std::time::Duration;

use log::debug;
use reqwest::blocking::Client;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, ETAG, IF_NONE_MATCH, USER_AGENT,
};
use reqwest::StatusCode;
use url::Url;

use super::{NetworkError, NetworkResult};

/// Resolved against the configured URL, so `http://host` and `http://host/features`
/// both end up requesting `http://host/features`.
pub(crate) const FEATURES_PATH: &str = "./features";

/// Outcome of one conditional GET that reached the server.
///
/// Failures before a status line is received (DNS, connect, timeout) are reported
/// as [`NetworkError`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResponse {
    /// `304`: the data held for the sent ETag is still current.
    NotModified,

    /// `200` with its raw body and the `ETag` header, if the server sent one.
    Success { body: String, etag: Option<String> },

    /// Any other status. The body is not read.
    HttpError { status_code: u16 },
}

/// Performs the request of a single fetch cycle.
pub trait Fetcher: Send + 'static {
    fn fetch(&self, etag: Option<&str>) -> NetworkResult<FetchResponse>;
}

/// [`Fetcher`] talking to the toggle endpoint over HTTP(S).
#[derive(Debug)]
pub struct HttpFetcher {
    client: Client,
    endpoint: Url,
}

impl HttpFetcher {
    /// Creates a fetcher for `<url>/features`.
    ///
    /// # Arguments
    ///
    /// * `url` - Base URL of the toggle service, or the full features URL.
    /// * `app_name` - Sent as `User-Agent`.
    /// * `authorization` - Sent verbatim as `Authorization` header. Left out when empty.
    /// * `custom_headers` - Additional headers attached to every request.
    /// * `timeout` - Upper bound for a whole request/response exchange.
    pub fn new(
        url: &Url,
        app_name: &str,
        authorization: &str,
        custom_headers: &[(String, String)],
        timeout: Duration,
    ) -> NetworkResult<Self> {
        let endpoint = url
            .join(FEATURES_PATH)
            .map_err(|_| NetworkError::UrlParseError(url.to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, Self::header_value("User-Agent", app_name)?);
        if !authorization.is_empty() {
            headers.insert(
                AUTHORIZATION,
                Self::header_value("Authorization", authorization)?,
            );
        }
        for (name, value) in custom_headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| NetworkError::InvalidHeaderValue(name.clone()))?;
            headers.insert(header_name, Self::header_value(name, value)?);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn header_value(name: &str, value: &str) -> NetworkResult<HeaderValue> {
        HeaderValue::from_str(value)
            .map_err(|_| NetworkError::InvalidHeaderValue(name.to_string()))
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, etag: Option<&str>) -> NetworkResult<FetchResponse> {
        let mut request = self.client.get(self.endpoint.clone());
        if let Some(etag) = etag.filter(|etag| !etag.is_empty()) {
            request = request.header(IF_NONE_MATCH, etag);
        }

        let response = request.send()?;
        let status = response.status();
        debug!("GET {} answered {}", self.endpoint, status);

        match status {
            StatusCode::NOT_MODIFIED => Ok(FetchResponse::NotModified),
            StatusCode::OK => {
                let etag = response
                    .headers()
                    .get(ETAG)
                    .and_then(|value| value.to_str().ok())
                    .map(str::to_string);
                let body = response.text()?;
                Ok(FetchResponse::Success { body, etag })
            }
            other => Ok(FetchResponse::HttpError {
                status_code: other.as_u16(),
            }),
        }
    }
}
