//! Where the initial collection comes from.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use async_trait::async_trait;
use reqwest::Client;
use shared::{domain::Item, protocol::decode_lists_payload};
use tracing::debug;

use crate::error::LoadError;

#[async_trait]
pub trait ListSource: Send + Sync {
    async fn fetch_lists(&self) -> Result<Vec<Item>, LoadError>;

    fn describe(&self) -> String;
}

pub struct HttpListSource {
    http: Client,
    url: String,
}

impl HttpListSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            url: url.into(),
        }
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self, LoadError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| LoadError::Transport(err.to_string()))?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ListSource for HttpListSource {
    async fn fetch_lists(&self) -> Result<Vec<Item>, LoadError> {
        debug!(url = %self.url, "fetching lists");
        let body = self
            .http
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(decode_lists_payload(&body)?.lists)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Reads the same payload shape from a local JSON file.
pub struct FileListSource {
    path: PathBuf,
}

impl FileListSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ListSource for FileListSource {
    async fn fetch_lists(&self) -> Result<Vec<Item>, LoadError> {
        debug!(path = %self.path.display(), "reading lists fixture");
        let body = tokio::fs::read(&self.path).await.map_err(|err| {
            LoadError::Transport(format!("failed to read {}: {err}", self.path.display()))
        })?;
        Ok(decode_lists_payload(&body)?.lists)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
