use reqwest::{Client, header};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use crate::error::Result;

const USER_AGENT: &str = concat!("azure-node-images/", env!("CARGO_PKG_VERSION"));

/// HTTP client shared by both gallery listers.
///
/// Listing calls are bounded by `timeout`; nothing here retries.
pub fn build_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()?)
}

/// Join `path` onto the management endpoint and add the api-version query.
pub(crate) fn management_url(endpoint: &Url, path: &str, api_version: &str) -> Result<Url> {
    let mut url = endpoint.join(path)?;
    url.query_pairs_mut().append_pair("api-version", api_version);
    Ok(url)
}

pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: Url,
    access_token: Option<&str>,
) -> Result<T> {
    let mut request = client.get(url).header(header::ACCEPT, "application/json");
    if let Some(token) = access_token {
        request = request.bearer_auth(token);
    }

    let bytes = request.send().await?.error_for_status()?.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Next page of a listing, if the service returned one.
pub(crate) fn next_page(next_link: Option<String>) -> Result<Option<Url>> {
    match next_link {
        Some(link) if !link.is_empty() => Ok(Some(Url::parse(&link)?)),
        _ => Ok(None),
    }
}
