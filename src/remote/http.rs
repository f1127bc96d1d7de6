//! HTTP implementation of the remote book service.

use crate::error::{AppError, Result};
use crate::library::{Book, Bookmark, BookmarkPatch, CategoryIndex, NewBookmark, ScanSummary};
use crate::remote::RemoteBookService;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Response envelope the backend wraps around every JSON payload.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    data: Option<T>,
    #[serde(default)]
    message: Option<String>,
}

/// Client for the book backend HTTP API.
///
/// Holds two [`reqwest::Client`]s: a short-timeout one for interactive
/// calls and a long-timeout one for the library scan, which can take
/// minutes on a large catalog. Mixing the budgets would either hang
/// interactive calls or fail scans spuriously.
pub struct HttpBookService {
    base_url: String,
    http: reqwest::Client,
    scan_http: reqwest::Client,
}

impl HttpBookService {
    /// Create a client for the backend at `base_url`.
    pub fn new(base_url: &str, timeout: Duration, scan_timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        let scan_http = reqwest::Client::builder()
            .timeout(scan_timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            scan_http,
        })
    }

    /// URL serving a book's raw file for in-client reading. No network call.
    pub fn book_file_url(&self, book_id: i64) -> String {
        format!("{}/api/books/{}/file", self.base_url, book_id)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET a path and unwrap the envelope, classifying failures as fetches.
    async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let resp = self
            .http
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| AppError::Fetch(e.to_string()))?;

        unwrap_envelope(resp, AppError::Fetch).await
    }
}

/// Parse a `{success, data, message}` envelope, mapping backend-reported
/// failures through `err`. A 404 becomes [`AppError::NotFound`] regardless
/// of `err`.
async fn unwrap_envelope<T: DeserializeOwned>(
    resp: reqwest::Response,
    err: fn(String) -> AppError,
) -> Result<T> {
    let status = resp.status();
    let envelope: Envelope<T> = resp
        .json()
        .await
        .map_err(|_| err(format!("unexpected response format (HTTP {})", status)))?;

    if !status.is_success() || !envelope.success {
        let message = envelope
            .message
            .unwrap_or_else(|| format!("server returned HTTP {}", status));
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(message));
        }
        return Err(err(message));
    }

    envelope
        .data
        .ok_or_else(|| err("response is missing its data payload".to_string()))
}

/// Like [`unwrap_envelope`] for operations whose envelope carries no data.
async fn check_envelope(resp: reqwest::Response, err: fn(String) -> AppError) -> Result<()> {
    let status = resp.status();
    let envelope: Envelope<serde_json::Value> = resp
        .json()
        .await
        .map_err(|_| err(format!("unexpected response format (HTTP {})", status)))?;

    if !status.is_success() || !envelope.success {
        let message = envelope
            .message
            .unwrap_or_else(|| format!("server returned HTTP {}", status));
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(message));
        }
        return Err(err(message));
    }

    Ok(())
}

#[async_trait]
impl RemoteBookService for HttpBookService {
    async fn list_books(&self, category: Option<&str>) -> Result<Vec<Book>> {
        let mut req = self.http.get(self.url("/api/books/list"));
        if let Some(category) = category {
            req = req.query(&[("category", category)]);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| AppError::Fetch(e.to_string()))?;
        unwrap_envelope(resp, AppError::Fetch).await
    }

    async fn list_categories(&self) -> Result<CategoryIndex> {
        self.fetch("/api/books/categories").await
    }

    async fn get_book(&self, book_id: i64) -> Result<Book> {
        self.fetch(&format!("/api/books/{}", book_id)).await
    }

    async fn get_bookmarks(&self, book_id: i64) -> Result<Vec<Bookmark>> {
        self.fetch(&format!("/api/books/{}/bookmarks", book_id))
            .await
    }

    async fn create_bookmark(&self, book_id: i64, data: &NewBookmark) -> Result<Bookmark> {
        let resp = self
            .http
            .post(self.url(&format!("/api/books/{}/bookmarks", book_id)))
            .json(data)
            .send()
            .await
            .map_err(|e| AppError::Write(e.to_string()))?;

        unwrap_envelope(resp, AppError::Write).await
    }

    async fn update_bookmark(&self, bookmark_id: i64, patch: &BookmarkPatch) -> Result<()> {
        let resp = self
            .http
            .put(self.url(&format!("/api/books/bookmarks/{}", bookmark_id)))
            .json(patch)
            .send()
            .await
            .map_err(|e| AppError::Write(e.to_string()))?;

        check_envelope(resp, AppError::Write).await
    }

    async fn delete_bookmark(&self, bookmark_id: i64) -> Result<()> {
        let resp = self
            .http
            .delete(self.url(&format!("/api/books/bookmarks/{}", bookmark_id)))
            .send()
            .await
            .map_err(|e| AppError::Write(e.to_string()))?;

        check_envelope(resp, AppError::Write).await
    }

    async fn scan_library(&self, update: bool) -> Result<ScanSummary> {
        let body = serde_json::json!({ "update": update });

        // The scan client has the long timeout; transport failures get a
        // distinct human-readable message per failure class.
        let resp = match self
            .scan_http
            .post(self.url("/api/books/scan"))
            .json(&body)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) if e.is_timeout() => {
                return Err(AppError::Scan(
                    "scan timed out; a large catalog can take several minutes, retry later"
                        .to_string(),
                ));
            }
            Err(e) if e.is_connect() => {
                return Err(AppError::Scan(format!(
                    "could not reach the backend at {}: {}",
                    self.base_url, e
                )));
            }
            Err(e) => return Err(AppError::Scan(e.to_string())),
        };

        let status = resp.status();
        let envelope: Envelope<ScanSummary> = resp
            .json()
            .await
            .map_err(|_| AppError::Scan(format!("unexpected response format (HTTP {})", status)))?;

        if !status.is_success() || !envelope.success {
            let message = envelope
                .message
                .unwrap_or_else(|| format!("server returned HTTP {}", status));
            return Err(AppError::Scan(message));
        }

        // Older backends omit counters that are zero.
        Ok(envelope.data.unwrap_or_default())
    }

    async fn delete_book(&self, book_id: i64) -> Result<()> {
        let resp = self
            .http
            .delete(self.url(&format!("/api/books/{}", book_id)))
            .send()
            .await
            .map_err(|e| AppError::Write(e.to_string()))?;

        check_envelope(resp, AppError::Write).await
    }
}
