//! Streaming HTTP(S) downloads with manual redirect handling and progress.

use log::debug;
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use reqwest::{Client, Proxy, Response, Url};
use std::io::Write;

use crate::error::{Error, Result};
use crate::events::SharedObserver;
use crate::logger::SharedLogger;

/// Upper bound on 301/302 hops for a single download.
pub const MAX_REDIRECTS: usize = 10;

const USER_AGENT: &str = concat!("svcfetch/", env!("CARGO_PKG_VERSION"));

/// Byte and percentage bookkeeping for one download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadProgress {
    /// Zero when the server sent no Content-Length.
    pub package_size: u64,
    pub downloaded_bytes: u64,
    pub download_percentage: u8,
}

impl DownloadProgress {
    pub fn new(package_size: Option<u64>) -> Self {
        Self {
            package_size: package_size.unwrap_or(0),
            downloaded_bytes: 0,
            download_percentage: 0,
        }
    }

    /// Accounts for `len` more bytes. Returns the new percentage only when
    /// it differs from the previous one; never returns anything when the
    /// package size is unknown.
    pub fn record(&mut self, len: u64) -> Option<u8> {
        self.downloaded_bytes += len;
        if self.package_size == 0 {
            return None;
        }

        let size = self.package_size as u128;
        let percentage = (100 * self.downloaded_bytes as u128).div_ceil(size).min(100) as u8;
        if percentage != self.download_percentage {
            self.download_percentage = percentage;
            Some(percentage)
        } else {
            None
        }
    }
}

/// Performs GET downloads under one proxy / TLS policy.
///
/// Redirects are followed here rather than by reqwest, on the same client,
/// so every hop shares the proxy and certificate settings.
#[derive(Clone)]
pub struct DownloadManager {
    client: Client,
    logger: SharedLogger,
    observer: SharedObserver,
}

impl DownloadManager {
    pub fn new(
        proxy: Option<&str>,
        strict_ssl: bool,
        logger: SharedLogger,
        observer: SharedObserver,
    ) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(Policy::none())
            .danger_accept_invalid_certs(!strict_ssl);

        if let Some(proxy) = proxy.filter(|p| !p.trim().is_empty()) {
            let proxy = Proxy::all(proxy).map_err(|e| Error::InvalidUrl {
                url: proxy.to_string(),
                reason: e.to_string(),
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::with_client(client, logger, observer))
    }

    /// Wraps an existing client. The client must not follow redirects itself.
    pub fn with_client(client: Client, logger: SharedLogger, observer: SharedObserver) -> Self {
        Self {
            client,
            logger,
            observer,
        }
    }

    /// Downloads `url` into `destination`, which is written to but not
    /// closed. Returns the number of bytes written.
    #[tracing::instrument(skip(self, destination))]
    pub async fn download_file<W: Write>(&self, url: &str, destination: &mut W) -> Result<u64> {
        let mut current = parse_url(url)?;

        for _ in 0..=MAX_REDIRECTS {
            debug!("GET {}", current);
            let response = self
                .client
                .get(current.clone())
                .send()
                .await
                .map_err(|e| {
                    self.logger
                        .verbose(&format!("Request to {} failed: {}", current, e));
                    Error::Request {
                        name: error_name(&e),
                    }
                })?;

            match response.status().as_u16() {
                301 | 302 => {
                    let status = response.status().as_u16();
                    let location = response
                        .headers()
                        .get(LOCATION)
                        .and_then(|v| v.to_str().ok())
                        .ok_or(Error::MissingLocation { status })?;
                    let next = current.join(location).map_err(|e| Error::InvalidUrl {
                        url: location.to_string(),
                        reason: e.to_string(),
                    })?;
                    self.logger
                        .verbose(&format!("Redirected ({}) to {}", status, next));
                    current = check_scheme(next)?;
                }
                200 => return self.write_body(current.as_str(), response, destination).await,
                status => {
                    self.logger
                        .error(&format!("failed (error code '{}')", status));
                    return Err(Error::HttpStatus {
                        status,
                        url: current.to_string(),
                    });
                }
            }
        }

        Err(Error::TooManyRedirects {
            hops: MAX_REDIRECTS,
        })
    }

    async fn write_body<W: Write>(
        &self,
        url: &str,
        mut response: Response,
        destination: &mut W,
    ) -> Result<u64> {
        let mut progress = DownloadProgress::new(response.content_length());
        self.observer
            .download_started(url, response.content_length());
        if let Some(size) = response.content_length() {
            self.logger
                .info(&format!("({} KB) {}", size.div_ceil(1024), url));
        }

        while let Some(chunk) = response.chunk().await.map_err(|e| {
            self.logger
                .verbose(&format!("Reading response from {} failed: {}", url, e));
            Error::Response {
                name: error_name(&e),
            }
        })? {
            destination
                .write_all(&chunk)
                .map_err(|e| Error::fs("Failed to write chunk to package file", e))?;
            if let Some(percentage) = progress.record(chunk.len() as u64) {
                self.observer.download_progress(percentage);
            }
        }
        destination
            .flush()
            .map_err(|e| Error::fs("Failed to flush package file", e))?;

        self.observer.download_ended();
        debug!(
            "Downloaded {:.2} MB",
            progress.downloaded_bytes as f64 / (1024.0 * 1024.0)
        );
        Ok(progress.downloaded_bytes)
    }
}

fn parse_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).map_err(|e| Error::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    check_scheme(parsed)
}

fn check_scheme(url: Url) -> Result<Url> {
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Error::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

/// Short name for the failure class of a reqwest error.
fn error_name(e: &reqwest::Error) -> String {
    let name = if e.is_timeout() {
        "TimeoutError"
    } else if e.is_connect() {
        "ConnectError"
    } else if e.is_redirect() {
        "RedirectError"
    } else if e.is_body() {
        "BodyError"
    } else if e.is_decode() {
        "DecodeError"
    } else if e.is_request() {
        "RequestError"
    } else {
        "Error"
    };
    name.to_string()
}
