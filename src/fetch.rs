use std::time::Duration;

use serde_json::Value;

use crate::error::FetchError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// GET `url` once and parse the body as JSON.
pub fn fetch_document(url: &str) -> Result<Value, FetchError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;

    tracing::debug!(url, "fetching document");

    let response = client.get(url).send().map_err(|source| {
        if source.is_connect() {
            FetchError::Connection {
                url: url.to_string(),
                source,
            }
        } else {
            FetchError::Request {
                url: url.to_string(),
                source,
            }
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status,
        });
    }

    let body = response.text().map_err(|source| FetchError::Request {
        url: url.to_string(),
        source,
    })?;
    tracing::debug!(bytes = body.len(), "document received");

    serde_json::from_str(&body).map_err(|source| FetchError::Parse {
        url: url.to_string(),
        source,
    })
}
