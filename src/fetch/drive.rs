//! Google Drive style downloads with the large-file confirmation step.

use std::path::Path;

use anyhow::Result;
use tracing::{debug, info};

use super::chunks::{CHUNK_SIZE, Chunks, save_chunks};
use super::client::HttpClient;

/// Default endpoint for file downloads by id.
pub const DRIVE_DOWNLOAD_URL: &str = "https://docs.google.com/uc?export=download";

/// Cookie name prefix the backend uses for the size-warning interstitial.
pub const WARNING_COOKIE_PREFIX: &str = "download_warning";

/// Returns the value of the first cookie named with [`WARNING_COOKIE_PREFIX`].
pub fn confirm_token(cookies: &[(String, String)]) -> Option<&str> {
    cookies
        .iter()
        .find(|(name, _)| name.starts_with(WARNING_COOKIE_PREFIX))
        .map(|(_, value)| value.as_str())
}

/// Downloads file `id` from `base_url` into `destination`.
///
/// When the first response carries a warning cookie, the request is issued a
/// second time with `confirm=<token>` and that response's body is saved
/// instead. Returns the number of bytes written.
pub fn download_file<C: HttpClient>(
    client: &C,
    base_url: &str,
    id: &str,
    destination: &Path,
) -> Result<u64> {
    let mut response = client.get(base_url, &[("id", id)])?;

    if let Some(token) = confirm_token(&response.cookies).map(str::to_string) {
        debug!(id, "Confirmation token present, re-requesting");
        response = client.get(base_url, &[("id", id), ("confirm", token.as_str())])?;
    }

    let bytes = save_chunks(Chunks::new(response.body, CHUNK_SIZE), destination)?;
    info!(id, bytes, path = %destination.display(), "Download complete");

    Ok(bytes)
}
