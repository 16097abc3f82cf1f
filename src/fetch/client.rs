use std::io::Read;

use anyhow::Result;

/// A response whose body has not been read yet.
///
/// `cookies` holds the `(name, value)` pairs the server set on this response.
pub struct RemoteResponse {
    pub cookies: Vec<(String, String)>,
    pub body: Box<dyn Read>,
}

impl RemoteResponse {
    pub fn new(cookies: Vec<(String, String)>, body: impl Read + 'static) -> Self {
        Self {
            cookies,
            body: Box::new(body),
        }
    }
}

/// Blocking GET transport used by the downloader.
pub trait HttpClient {
    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<RemoteResponse>;
}
