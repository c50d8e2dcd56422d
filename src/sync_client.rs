use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::catalog::CatalogRow;
use crate::codec::HistoryRow;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Could not build HTTP client: {0}")]
    Client(reqwest::Error),
    #[error("Request to {url} failed: {source}")]
    Transport { url: String, source: reqwest::Error },
    #[error("Server returned error: {status} - {body}")]
    Status { status: StatusCode, body: String },
    #[error("Server rejected the write: {0}")]
    Rejected(String),
    #[error("Failed to deserialize server response from {url}: {source}")]
    Decode { url: String, source: reqwest::Error },
}

#[derive(Serialize, Debug)]
struct WritePayload<'a> {
    date: &'a str,
    content: &'a str,
}

/// Client for the spreadsheet-backed endpoint.
///
/// Every call is a single request: no retries, and callers update local state
/// only after a call returns `Ok`.
pub struct SyncClient {
    http_client: Client,
    endpoint: String,
}

impl SyncClient {
    /// # Errors
    /// Returns `Error::Client` if the underlying HTTP client cannot be built.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, Error> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(Error::Client)?;
        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// `GET <endpoint>`: the exercise sheet as raw rows.
    ///
    /// # Errors
    /// Transport failure, non-success status, or an undecodable body.
    pub async fn fetch_catalog(&self) -> Result<Vec<CatalogRow>, Error> {
        let rows: Vec<CatalogRow> = self.get_json(&[]).await?;
        info!("Fetched {} catalog rows", rows.len());
        Ok(rows)
    }

    /// `GET <endpoint>?type=history`: one `{date, content}` row per day.
    ///
    /// # Errors
    /// Transport failure, non-success status, or an undecodable body.
    pub async fn fetch_history(&self) -> Result<Vec<HistoryRow>, Error> {
        let rows: Vec<HistoryRow> = self.get_json(&[("type", "history")]).await?;
        info!("Fetched {} history rows", rows.len());
        Ok(rows)
    }

    /// `POST <endpoint>` with `{date, content}`. The sheet updates the row for
    /// that date or appends one. It answers with plain text; an `ERROR:` body
    /// (for instance when its write lock cannot be acquired) is a failed write.
    ///
    /// # Errors
    /// Transport failure, non-success status, or `Error::Rejected`.
    pub async fn push_day(&self, row: &HistoryRow) -> Result<String, Error> {
        let payload = WritePayload {
            date: &row.date,
            content: &row.content,
        };
        info!("Sending POST to {} for {}", self.endpoint, row.date);
        debug!("Pushing payload: {:?}", payload);

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|source| Error::Transport {
                url: self.endpoint.clone(),
                source,
            })?;
        let response = Self::check_status(response).await?;

        let body = response.text().await.map_err(|source| Error::Decode {
            url: self.endpoint.clone(),
            source,
        })?;
        let body = body.trim().to_string();
        if body.starts_with("ERROR") {
            error!("Write for {} rejected: {}", row.date, body);
            return Err(Error::Rejected(body));
        }
        info!("Write for {} accepted: {}", row.date, body);
        Ok(body)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        query: &[(&str, &str)],
    ) -> Result<T, Error> {
        debug!("Sending GET to {} with query {:?}", self.endpoint, query);
        let response = self
            .http_client
            .get(&self.endpoint)
            .query(query)
            .send()
            .await
            .map_err(|source| Error::Transport {
                url: self.endpoint.clone(),
                source,
            })?;
        let response = Self::check_status(response).await?;

        response.json().await.map_err(|source| Error::Decode {
            url: self.endpoint.clone(),
            source,
        })
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, Error> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Could not read error body".to_string());
        error!("Request failed with status: {}. Body: {}", status, body);
        Err(Error::Status { status, body })
    }
}
