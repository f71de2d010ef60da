// src/fetch.rs

use anyhow::Context;
use reqwest::Client;
use url::Url;

use crate::error::Error;

/// Fetches the body of `url` as text, tagging every failure with the URL.
pub(crate) async fn get_text(client: &Client, url: &str) -> Result<String, Error> {
    let parsed = Url::parse(url)
        .with_context(|| format!("parsing URL {url}"))
        .map_err(|source| fetch_error(url, source))?;

    let response = client
        .get(parsed.clone())
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .with_context(|| format!("GET {parsed}"))
        .map_err(|source| fetch_error(url, source))?;

    response
        .text()
        .await
        .with_context(|| format!("reading body from {parsed}"))
        .map_err(|source| fetch_error(url, source))
}

fn fetch_error(url: &str, source: anyhow::Error) -> Error {
    Error::Fetch {
        url: url.to_string(),
        source,
    }
}
