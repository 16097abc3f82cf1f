mod basic;
mod chunks;
mod client;
mod drive;

pub use basic::BasicClient;
pub use chunks::{CHUNK_SIZE, Chunks, save_chunks};
pub use client::{HttpClient, RemoteResponse};
pub use drive::{DRIVE_DOWNLOAD_URL, WARNING_COOKIE_PREFIX, confirm_token, download_file};
