//! HTTP client for the daemon's JSON API.
//!
//! Thin, endpoint-per-method wrapper over `reqwest`. Every non-success
//! response is turned into a [`SyncError::Status`] carrying the daemon's
//! `{error}` text when present, so callers surface one meaningful
//! notification per failure.

use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use skiff_api_models::{
    ErrorBody, MagnetRequest, RouteCreateRequest, RouteSummary, TorrentDetail, TorrentFileList,
    TorrentPage, WatchInterval,
};

use crate::error::{SyncError, SyncResult};

/// Client for one daemon instance.
#[derive(Debug, Clone)]
pub struct DaemonClient {
    http: Client,
    base_url: Url,
}

impl DaemonClient {
    /// Wrap a configured `reqwest` client and a daemon base URL.
    #[must_use]
    pub const fn new(http: Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// Base URL this client talks to.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetch the route listing, filtered to entries with a non-empty name.
    pub async fn routes(&self) -> SyncResult<Vec<RouteSummary>> {
        let routes: Option<Vec<RouteSummary>> = self.get_json("/api/routes").await?;
        Ok(routes
            .unwrap_or_default()
            .into_iter()
            .filter(|route| !route.name.is_empty())
            .collect())
    }

    /// Fetch the configured watch interval in seconds.
    pub async fn watch_interval(&self) -> SyncResult<u32> {
        let payload: WatchInterval = self.get_json("/api/watch_interval").await?;
        Ok(payload.interval)
    }

    /// Persist a new watch interval.
    pub async fn set_watch_interval(&self, interval: u32) -> SyncResult<()> {
        let endpoint = "/api/watch_interval";
        let url = self.endpoint(endpoint)?;
        let response = self
            .send(endpoint, self.http.post(url).json(&WatchInterval { interval }))
            .await?;
        Self::expect_ok(endpoint, response).await.map(drop)
    }

    /// Fetch one page of a route's torrents.
    pub async fn torrent_page(&self, route: &str, page: u32, size: u32) -> SyncResult<TorrentPage> {
        let endpoint = format!("/api/routes/{}/torrents", urlencoding::encode(route));
        let mut url = self.endpoint(&endpoint)?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("size", &size.to_string());
        let response = self.send(&endpoint, self.http.get(url)).await?;
        let response = Self::expect_ok(&endpoint, response).await?;
        Self::decode(&endpoint, response).await
    }

    /// Fetch the detail view for one torrent.
    pub async fn torrent_detail(&self, route: &str, hash: &str) -> SyncResult<TorrentDetail> {
        let endpoint = format!(
            "/api/routes/{}/torrent/{}",
            urlencoding::encode(route),
            urlencoding::encode(hash)
        );
        self.get_json(&endpoint).await
    }

    /// Fetch the file listing for one torrent.
    pub async fn torrent_files(&self, route: &str, hash: &str) -> SyncResult<TorrentFileList> {
        let endpoint = format!(
            "/api/routes/{}/torrent/{}/files",
            urlencoding::encode(route),
            urlencoding::encode(hash)
        );
        self.get_json(&endpoint).await
    }

    /// Remove a torrent from a route.
    pub async fn delete_torrent(&self, route: &str, hash: &str) -> SyncResult<()> {
        let endpoint = format!(
            "/api/routes/{}/torrent/{}",
            urlencoding::encode(route),
            urlencoding::encode(hash)
        );
        let url = self.endpoint(&endpoint)?;
        let response = self.send(&endpoint, self.http.delete(url)).await?;
        Self::expect_ok(&endpoint, response).await.map(drop)
    }

    /// Blacklist a torrent so the daemon requests a replacement.
    pub async fn blacklist_torrent(&self, route: &str, hash: &str) -> SyncResult<()> {
        let endpoint = format!(
            "/api/routes/{}/torrent/{}/blacklist",
            urlencoding::encode(route),
            urlencoding::encode(hash)
        );
        let url = self.endpoint(&endpoint)?;
        let response = self.send(&endpoint, self.http.post(url)).await?;
        Self::expect_ok(&endpoint, response).await.map(drop)
    }

    /// Attach a magnet URI to a route.
    pub async fn add_magnet(&self, route: &str, magnet: &str) -> SyncResult<()> {
        let endpoint = format!("/api/routes/{}/torrent", urlencoding::encode(route));
        let url = self.endpoint(&endpoint)?;
        let body = MagnetRequest {
            magnet: magnet.to_string(),
        };
        let response = self.send(&endpoint, self.http.post(url).json(&body)).await?;
        Self::expect_ok(&endpoint, response).await.map(drop)
    }

    /// Upload a `.torrent` file to a route as a multipart form.
    pub async fn upload_torrent(
        &self,
        route: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> SyncResult<()> {
        let endpoint = format!("/api/routes/{}/files", urlencoding::encode(route));
        let url = self.endpoint(&endpoint)?;
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);
        let response = self
            .send(&endpoint, self.http.post(url).multipart(form))
            .await?;
        Self::expect_ok(&endpoint, response).await.map(drop)
    }

    /// Create a new route.
    pub async fn create_route(&self, name: &str) -> SyncResult<()> {
        let endpoint = "/api/routes";
        let url = self.endpoint(endpoint)?;
        let body = RouteCreateRequest {
            name: name.to_string(),
        };
        let response = self.send(endpoint, self.http.post(url).json(&body)).await?;
        Self::expect_ok(endpoint, response).await.map(drop)
    }

    /// Delete a route and its client-side state.
    pub async fn delete_route(&self, name: &str) -> SyncResult<()> {
        let endpoint = format!("/api/routes/{}", urlencoding::encode(name));
        let url = self.endpoint(&endpoint)?;
        let response = self.send(&endpoint, self.http.delete(url)).await?;
        Self::expect_ok(&endpoint, response).await.map(drop)
    }

    /// Open the structured log endpoint as a byte stream.
    pub async fn open_log_stream(&self) -> SyncResult<Response> {
        let endpoint = "/api/log";
        let url = self.endpoint(endpoint)?;
        let response = self.send(endpoint, self.http.get(url)).await?;
        Self::expect_ok(endpoint, response).await
    }

    /// Fetch the whole log blob for the polling fallback.
    pub async fn fetch_log_text(&self) -> SyncResult<String> {
        let endpoint = "/api/log";
        let url = self.endpoint(endpoint)?;
        let response = self.send(endpoint, self.http.get(url)).await?;
        let response = Self::expect_ok(endpoint, response).await?;
        response.text().await.map_err(|source| SyncError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> SyncResult<T> {
        let url = self.endpoint(endpoint)?;
        let response = self.send(endpoint, self.http.get(url)).await?;
        let response = Self::expect_ok(endpoint, response).await?;
        Self::decode(endpoint, response).await
    }

    fn endpoint(&self, path: &str) -> SyncResult<Url> {
        self.base_url
            .join(path)
            .map_err(|source| SyncError::InvalidUrl {
                endpoint: path.to_string(),
                source,
            })
    }

    async fn send(&self, endpoint: &str, builder: RequestBuilder) -> SyncResult<Response> {
        builder
            .send()
            .await
            .map_err(|source| SyncError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })
    }

    async fn expect_ok(endpoint: &str, response: Response) -> SyncResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let bytes = response.bytes().await.unwrap_or_default();
        let message = serde_json::from_slice::<ErrorBody>(&bytes).map_or_else(
            |_| {
                let text = String::from_utf8_lossy(&bytes).trim().to_string();
                if text.is_empty() {
                    format!("request failed with status {status}")
                } else {
                    text
                }
            },
            |body| body.error,
        );
        Err(SyncError::Status {
            endpoint: endpoint.to_string(),
            status,
            message,
        })
    }

    async fn decode<T: DeserializeOwned>(endpoint: &str, response: Response) -> SyncResult<T> {
        response.json().await.map_err(|source| SyncError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }
}
