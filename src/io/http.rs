use reqwest::blocking::{Client, Response};
use std::io::BufReader;
use std::time::Duration;

use super::ArchiveStream;
use anyhow::{Result, bail};

const MAX_RETRY: u32 = 10;

/// Stream a remote archive over a single HTTP GET.
///
/// The body is consumed front to back, so the server needs no Range support.
/// Connection failures and timeouts while establishing the request are retried
/// with a linear back-off.
pub fn open_url(url: &str) -> Result<ArchiveStream<BufReader<Response>>> {
    // No overall timeout: the body of a large archive may take a long time.
    let client = Client::builder()
        .connect_timeout(Duration::from_secs(30))
        .timeout(None::<Duration>)
        .build()?;

    let mut retry_count = 0;
    let resp = loop {
        match client.get(url).send() {
            Ok(resp) => break resp,
            Err(e) if e.is_timeout() || e.is_connect() => {
                retry_count += 1;
                if retry_count >= MAX_RETRY {
                    bail!("Max retries exceeded");
                }
                log::warn!("Connection error, retry {}/{}: {}", retry_count, MAX_RETRY, e);
                std::thread::sleep(Duration::from_millis(500 * retry_count as u64));
            }
            Err(e) => return Err(e.into()),
        }
    };

    if !resp.status().is_success() {
        bail!("HTTP request failed with status: {}", resp.status());
    }

    Ok(ArchiveStream::new(BufReader::new(resp)))
}
