//! Data source fetching: HTTP(S) via reqwest, local files via tokio.

use std::{collections::HashMap, path::PathBuf};

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::core::{config::DispatchConfig, error::FetchError};

#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the resource at `locator` as text.
    async fn fetch(&self, locator: &str) -> Result<String, FetchError>;
}

/// Where a `csvSrc` value points once resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Http(Url),
    File(PathBuf),
}

/// Resolve `locator` against `base`; bare relative paths stay relative without one.
pub fn resolve_locator(locator: &str, base: Option<&Url>) -> Result<Source, FetchError> {
    let invalid = |source| FetchError::InvalidLocator {
        locator: locator.to_owned(),
        source,
    };
    let url = match Url::parse(locator) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => match base {
            Some(base) => base.join(locator).map_err(invalid)?,
            None => return Ok(Source::File(PathBuf::from(locator))),
        },
        Err(e) => return Err(invalid(e)),
    };
    match url.scheme() {
        "http" | "https" => Ok(Source::Http(url)),
        "file" => url
            .to_file_path()
            .map(Source::File)
            .map_err(|()| FetchError::UnsupportedScheme(url.to_string())),
        // `C:\data.csv` parses as scheme `c`.
        s if s.len() == 1 => Ok(Source::File(PathBuf::from(locator))),
        s => Err(FetchError::UnsupportedScheme(s.to_owned())),
    }
}

/// Default fetcher for documents read from disk or the network.
#[derive(Debug, Clone)]
pub struct SourceFetcher {
    client: Client,
    base: Option<Url>,
}

impl SourceFetcher {
    pub fn new(config: &DispatchConfig, base: Option<Url>) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client, base })
    }
}

#[async_trait]
impl Fetcher for SourceFetcher {
    async fn fetch(&self, locator: &str) -> Result<String, FetchError> {
        match resolve_locator(locator, self.base.as_ref())? {
            Source::Http(url) => {
                debug!(%url, "GET");
                let resp = self.client.get(url.clone()).send().await?;
                let status = resp.status();
                if !status.is_success() {
                    return Err(FetchError::Status {
                        url: url.to_string(),
                        status: status.as_u16(),
                    });
                }
                Ok(resp.text().await?)
            }
            Source::File(path) => {
                debug!(path = %path.display(), "read");
                tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|source| FetchError::Io { path, source })
            }
        }
    }
}

/// In-memory sources keyed by locator.
#[derive(Debug, Clone, Default)]
pub struct MemoryFetcher {
    sources: HashMap<String, String>,
}

impl MemoryFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, locator: impl Into<String>, body: impl Into<String>) -> Self {
        self.sources.insert(locator.into(), body.into());
        self
    }
}

#[async_trait]
impl Fetcher for MemoryFetcher {
    async fn fetch(&self, locator: &str) -> Result<String, FetchError> {
        self.sources
            .get(locator)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(locator.to_owned()))
    }
}
