use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use std::{fs, io};

use spdlog::debug;
use thiserror::Error;

use crate::image_ref::ImageRef;

const USER_AGENT: &str = concat!("wp2md/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Transport used to download images. Any error, including a non success
/// status, makes the fetcher move on to the fallback url.
pub trait HttpClient {
    fn get(&self, url: &str) -> anyhow::Result<Vec<u8>>;
}

pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    pub fn new() -> anyhow::Result<ReqwestClient> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(ReqwestClient { client })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> anyhow::Result<Vec<u8>> {
        let response = self.client.get(url).send()?.error_for_status()?;
        Ok(response.bytes()?.to_vec())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Already on disk, nothing requested
    Exists,
    Downloaded,
    DownloadedFallback,
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Error downloading {url}: {error}")]
    Request { url: String, error: String },
    #[error("Error downloading {url}: {error} - fallback {fallback_url}: {fallback_error}")]
    Unavailable {
        url: String,
        error: String,
        fallback_url: String,
        fallback_error: String,
    },
    #[error("Error writing image {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Downloads images one at a time, keeping a fixed delay between requests
/// to the remote host.
pub struct ImageFetcher<C: HttpClient> {
    client: C,
    delay: Duration,
    last_request: Option<Instant>,
}

impl<C: HttpClient> ImageFetcher<C> {
    pub fn new(client: C, delay: Duration) -> Self {
        ImageFetcher {
            client,
            delay,
            last_request: None,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Source url first, then the fallback url once. An image already present
    /// at its local path is not requested again.
    pub fn fetch(&mut self, image: &ImageRef) -> Result<FetchOutcome, FetchError> {
        if image.local_path.exists() {
            return Ok(FetchOutcome::Exists);
        }

        let error = match self.request(&image.source_url) {
            Ok(bytes) => {
                write_image(&image.local_path, &bytes)?;
                return Ok(FetchOutcome::Downloaded);
            }
            Err(e) => e,
        };

        if image.fallback_url == image.source_url {
            return Err(FetchError::Request {
                url: image.source_url.clone(),
                error: error.to_string(),
            });
        }
        debug!("{} failed ({}), trying {}", image.source_url, error, image.fallback_url);

        match self.request(&image.fallback_url) {
            Ok(bytes) => {
                write_image(&image.local_path, &bytes)?;
                Ok(FetchOutcome::DownloadedFallback)
            }
            Err(fallback_error) => Err(FetchError::Unavailable {
                url: image.source_url.clone(),
                error: error.to_string(),
                fallback_url: image.fallback_url.clone(),
                fallback_error: fallback_error.to_string(),
            }),
        }
    }

    fn request(&mut self, url: &str) -> anyhow::Result<Vec<u8>> {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.delay {
                thread::sleep(self.delay - elapsed);
            }
        }
        let res = self.client.get(url);
        self.last_request = Some(Instant::now());
        res
    }
}

/// Writes through a temporary file so an interrupted run never leaves a
/// partial image that a later run would take as already downloaded.
fn write_image(path: &Path, bytes: &[u8]) -> Result<(), FetchError> {
    let mut tmp_name = path.file_name().map(OsString::from).unwrap_or_default();
    tmp_name.push(".part");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, bytes)
        .and_then(|_| fs::rename(&tmp_path, path))
        .map_err(|source| {
            let _ = fs::remove_file(&tmp_path);
            FetchError::Write { path: path.to_path_buf(), source }
        })
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use crate::image_ref::resolve;
    use crate::test_data::FakeClient;

    use super::*;

    const THUMB_URL: &str = "https://mseeeen.msen.jp/wp-content/uploads/2020/img-640x480.png";
    const ORIGINAL_URL: &str = "https://mseeeen.msen.jp/wp-content/uploads/2020/img.png";

    fn image(dir: &TempDir, url: &str) -> ImageRef {
        resolve(url, dir.path(), Some("hello"), 1).unwrap()
    }

    #[test]
    fn test_download_source() {
        let dir = TempDir::new().unwrap();
        let client = FakeClient::with_images(&[(ORIGINAL_URL, "original")]);
        let mut fetcher = ImageFetcher::new(client, Duration::ZERO);

        let im = image(&dir, THUMB_URL);
        assert_eq!(fetcher.fetch(&im).unwrap(), FetchOutcome::Downloaded);
        assert_eq!(fs::read(&im.local_path).unwrap(), b"original");
        assert_eq!(fetcher.client().requests(), [ORIGINAL_URL]);
    }

    #[test]
    fn test_download_fallback() {
        let dir = TempDir::new().unwrap();
        let client = FakeClient::with_images(&[(THUMB_URL, "thumbnail")]);
        let mut fetcher = ImageFetcher::new(client, Duration::ZERO);

        let im = image(&dir, THUMB_URL);
        assert_eq!(fetcher.fetch(&im).unwrap(), FetchOutcome::DownloadedFallback);
        assert_eq!(fs::read(&im.local_path).unwrap(), b"thumbnail");
        assert_eq!(fetcher.client().requests(), [ORIGINAL_URL, THUMB_URL]);
    }

    #[test]
    fn test_both_attempts_fail() {
        let dir = TempDir::new().unwrap();
        let mut fetcher = ImageFetcher::new(FakeClient::default(), Duration::ZERO);

        let im = image(&dir, THUMB_URL);
        let err = fetcher.fetch(&im).unwrap_err();
        assert!(matches!(err, FetchError::Unavailable { .. }));
        assert!(!im.local_path.exists());
        assert_eq!(fetcher.client().requests().len(), 2);
    }

    #[test]
    fn test_same_url_is_not_retried() {
        let dir = TempDir::new().unwrap();
        let mut fetcher = ImageFetcher::new(FakeClient::default(), Duration::ZERO);

        let im = image(&dir, ORIGINAL_URL);
        let err = fetcher.fetch(&im).unwrap_err();
        assert!(matches!(err, FetchError::Request { .. }));
        assert_eq!(fetcher.client().requests(), [ORIGINAL_URL]);
    }

    #[test]
    fn test_existing_file_is_skipped() {
        let dir = TempDir::new().unwrap();
        let im = image(&dir, THUMB_URL);
        fs::write(&im.local_path, b"already here").unwrap();

        let client = FakeClient::with_images(&[(ORIGINAL_URL, "original")]);
        let mut fetcher = ImageFetcher::new(client, Duration::ZERO);
        assert_eq!(fetcher.fetch(&im).unwrap(), FetchOutcome::Exists);
        assert!(fetcher.client().requests().is_empty());
        assert_eq!(fs::read(&im.local_path).unwrap(), b"already here");
    }

    #[test]
    fn test_write_error() {
        let dir = TempDir::new().unwrap();
        let im = resolve(ORIGINAL_URL, &dir.path().join("missing"), Some("hello"), 1).unwrap();
        let client = FakeClient::with_images(&[(ORIGINAL_URL, "original")]);
        let mut fetcher = ImageFetcher::new(client, Duration::ZERO);

        let err = fetcher.fetch(&im).unwrap_err();
        assert!(matches!(err, FetchError::Write { .. }));
    }

    #[test]
    fn test_courtesy_delay() {
        let dir = TempDir::new().unwrap();
        let client = FakeClient::default();
        let mut fetcher = ImageFetcher::new(client, Duration::from_millis(50));

        let started = Instant::now();
        let _ = fetcher.fetch(&image(&dir, THUMB_URL));
        assert!(started.elapsed() >= Duration::from_millis(50));
    }
}
