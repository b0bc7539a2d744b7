//! Input sources: local files or HTTP(S) URLs, optionally gzip compressed.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use tracing::debug;

/// Downloads `url` and returns the response body.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?.error_for_status()?;
    Ok(resp.bytes().await?.to_vec())
}

/// Opens a local path or downloads a URL, returning a reader over its
/// decompressed contents.
///
/// Sources ending in `.gz` are gzip-decoded. Local files are streamed, remote
/// ones are buffered in memory.
#[tracing::instrument(skip(client))]
pub async fn open_source<C: HttpClient>(client: &C, source: &str) -> Result<Box<dyn Read + Send>> {
    let raw: Box<dyn Read + Send> = if is_url(source) {
        let bytes = fetch_bytes(client, source)
            .await
            .with_context(|| format!("Failed to download {source}"))?;
        debug!(bytes = bytes.len(), "Downloaded source");
        Box::new(Cursor::new(bytes))
    } else {
        let file = File::open(source).with_context(|| format!("Failed to open {source}"))?;
        Box::new(BufReader::new(file))
    };

    if is_gzip(source) {
        Ok(Box::new(MultiGzDecoder::new(raw)))
    } else {
        Ok(raw)
    }
}

fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

fn is_gzip(source: &str) -> bool {
    source
        .split(['?', '#'])
        .next()
        .is_some_and(|path| path.ends_with(".gz"))
}
