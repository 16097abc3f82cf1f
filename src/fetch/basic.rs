use std::time::Duration;

use anyhow::{Context, Result};

use super::client::{HttpClient, RemoteResponse};

/// [`HttpClient`] backed by a blocking reqwest client with a cookie jar.
///
/// No overall timeout is set so large bodies can stream to completion.
pub struct BasicClient(reqwest::blocking::Client);

impl BasicClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .cookie_store(true)
            .connect_timeout(Duration::from_secs(10))
            .timeout(None)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self(client))
    }
}

impl HttpClient for BasicClient {
    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<RemoteResponse> {
        let resp = self
            .0
            .get(url)
            .query(query)
            .send()
            .with_context(|| format!("GET {url} failed"))?
            .error_for_status()?;

        let cookies = resp
            .cookies()
            .map(|c| (c.name().to_string(), c.value().to_string()))
            .collect();

        Ok(RemoteResponse::new(cookies, resp))
    }
}
