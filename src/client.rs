use std::thread;
use std::time::{Duration, Instant};

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::Dataset;
use crate::error::GridError;
use crate::query::with_query;

pub type Row = Map<String, Value>;

pub const DEFAULT_PREVIEW_LIMIT: usize = 100;
const DEFAULT_CONTENT_TYPE: &str = "text/csv";
const LEGACY_MORE_MARKER: &str = "hasMoreResults";

/// One bounded page of matching rows. Zero rows is a normal result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreviewPage {
    pub rows: Vec<Row>,
    pub has_more: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadBlob {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

pub trait DatasetClient: Send + Sync {
    fn preview(&self, dataset: Dataset, query: &str) -> Result<PreviewPage, GridError>;
    fn suggest(&self, dataset: Dataset, text: &str) -> Result<Vec<String>, GridError>;
    fn download(&self, dataset: Dataset, query: &str) -> Result<DownloadBlob, GridError>;
}

#[derive(Clone)]
pub struct HttpDatasetClient {
    client: Client,
    base_url: String,
    preview_limit: usize,
}

impl HttpDatasetClient {
    pub fn new(base_url: &str, timeout: Duration, preview_limit: usize) -> Result<Self, GridError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("laborgrid/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| GridError::NetworkFailure(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|err| GridError::NetworkFailure(err.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            preview_limit,
        })
    }

    pub fn preview_url(&self, dataset: Dataset, query: &str) -> String {
        with_query(&format!("{}/{}", self.base_url, dataset.slug()), query)
    }

    pub fn download_url(&self, dataset: Dataset, query: &str) -> String {
        with_query(
            &format!("{}/{}/download", self.base_url, dataset.slug()),
            query,
        )
    }

    pub fn suggest_url(&self, dataset: Dataset) -> String {
        format!("{}/{}/suggest", self.base_url, dataset.slug())
    }

    fn send_with_retries<F>(&self, mut make_req: F) -> Result<Response, GridError>
    where
        F: FnMut() -> RequestBuilder,
    {
        const MAX_RETRIES: usize = 2;
        const BASE_DELAY_MS: u64 = 200;
        let mut attempt = 0usize;
        loop {
            match make_req().send() {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    if attempt < MAX_RETRIES && is_retryable_status(status) {
                        tracing::warn!(status, attempt, "retrying request");
                        thread::sleep(Duration::from_millis(BASE_DELAY_MS * (attempt as u64 + 1)));
                        attempt += 1;
                        continue;
                    }
                    return check_status(resp);
                }
                Err(err) => {
                    if attempt < MAX_RETRIES && is_retryable_error(&err) {
                        tracing::warn!(error = %err, attempt, "retrying request");
                        thread::sleep(Duration::from_millis(BASE_DELAY_MS * (attempt as u64 + 1)));
                        attempt += 1;
                        continue;
                    }
                    return Err(GridError::NetworkFailure(err.to_string()));
                }
            }
        }
    }

    fn get_json(&self, url: &str, params: &[(&str, &str)]) -> Result<Value, GridError> {
        let start = Instant::now();
        let response = self.send_with_retries(|| {
            let request = self.client.get(url);
            if params.is_empty() {
                request
            } else {
                request.query(params)
            }
        })?;
        let body = response
            .text()
            .map_err(|err| GridError::NetworkFailure(err.to_string()))?;
        tracing::debug!(
            url,
            latency_ms = start.elapsed().as_millis() as u64,
            "json response"
        );
        serde_json::from_str(&body).map_err(|err| GridError::MalformedResponse(err.to_string()))
    }
}

impl DatasetClient for HttpDatasetClient {
    fn preview(&self, dataset: Dataset, query: &str) -> Result<PreviewPage, GridError> {
        let url = self.preview_url(dataset, query);
        let payload = self.get_json(&url, &[])?;
        decode_preview(payload, self.preview_limit)
    }

    fn suggest(&self, dataset: Dataset, text: &str) -> Result<Vec<String>, GridError> {
        let url = self.suggest_url(dataset);
        let payload = self.get_json(&url, &[("geo", text)])?;
        extract_suggestions(&payload)
    }

    fn download(&self, dataset: Dataset, query: &str) -> Result<DownloadBlob, GridError> {
        let url = self.download_url(dataset, query);
        let start = Instant::now();
        let response = self.send_with_retries(|| self.client.get(&url))?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();
        let bytes = response
            .bytes()
            .map_err(|err| GridError::NetworkFailure(err.to_string()))?
            .to_vec();
        tracing::info!(
            dataset = dataset.slug(),
            bytes = bytes.len(),
            latency_ms = start.elapsed().as_millis() as u64,
            "download received"
        );
        Ok(DownloadBlob {
            content_type,
            bytes,
        })
    }
}

fn check_status(response: Response) -> Result<Response, GridError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let message = response
        .text()
        .unwrap_or_else(|_| "request failed".to_string());
    Err(GridError::HttpStatus { status, message })
}

fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

fn is_retryable_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect()
}

/// Accepts `{ "rows": [...], "hasMore": bool }` or a bare array of rows.
/// In the bare form a `hasMoreResults` field on the last row is lifted out of
/// the row and reported as `has_more`.
pub fn decode_preview(payload: Value, limit: usize) -> Result<PreviewPage, GridError> {
    let (rows, mut has_more) = match payload {
        Value::Object(mut envelope) => {
            let rows = match envelope.remove("rows") {
                Some(Value::Array(rows)) => rows,
                Some(_) => {
                    return Err(GridError::MalformedResponse(
                        "`rows` is not an array".to_string(),
                    ));
                }
                None => {
                    return Err(GridError::MalformedResponse(
                        "missing `rows` field".to_string(),
                    ));
                }
            };
            let has_more = envelope
                .get("hasMore")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            (rows, has_more)
        }
        Value::Array(rows) => (rows, false),
        _ => {
            return Err(GridError::MalformedResponse(
                "expected an array of rows".to_string(),
            ));
        }
    };

    let mut decoded = Vec::with_capacity(rows.len().min(limit));
    for row in rows {
        match row {
            Value::Object(row) => decoded.push(row),
            other => {
                return Err(GridError::MalformedResponse(format!(
                    "row is not an object: {other}"
                )));
            }
        }
    }

    if let Some(last) = decoded.last_mut() {
        if let Some(marker) = last.remove(LEGACY_MORE_MARKER) {
            has_more |= marker.as_bool().unwrap_or(false);
        }
    }
    if decoded.len() > limit {
        decoded.truncate(limit);
        has_more = true;
    }

    Ok(PreviewPage {
        rows: decoded,
        has_more,
    })
}

/// Display strings for suggestion candidates; `area` wins over `name`.
pub fn extract_suggestions(payload: &Value) -> Result<Vec<String>, GridError> {
    let items = payload.as_array().ok_or_else(|| {
        GridError::MalformedResponse("expected an array of suggestions".to_string())
    })?;
    items
        .iter()
        .map(|item| {
            item.get("area")
                .and_then(Value::as_str)
                .or_else(|| item.get("name").and_then(Value::as_str))
                .map(str::to_string)
                .ok_or_else(|| {
                    GridError::MalformedResponse(format!(
                        "suggestion has neither `area` nor `name`: {item}"
                    ))
                })
        })
        .collect()
}
