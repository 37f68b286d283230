//! Load barrier over independent resource fetches.
//!
//! All fetches are issued at once and joined. The completion step runs
//! exactly once, with every resource present, or not at all: the first
//! failure drops the remaining in-flight fetches and is returned.

use std::collections::HashMap;

use futures::future::{try_join_all, LocalBoxFuture};
use polars::prelude::DataFrame;
use thiserror::Error;

use crate::table;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("fetch of '{key}' ({url}) failed: {message}")]
    Fetch {
        key: String,
        url: String,
        message: String,
    },
    #[error("resource '{key}' could not be parsed: {message}")]
    Parse { key: String, message: String },
    #[error("resource key '{0}' requested twice")]
    DuplicateKey(String),
    #[error("resource '{0}' was not loaded")]
    MissingResource(String),
    #[error("resource '{key}' is not {expected}")]
    WrongKind { key: String, expected: &'static str },
}

/// How the fetched bytes are decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Json,
    Csv,
}

/// One named fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchDescriptor {
    pub key: String,
    pub kind: ResourceKind,
    pub url: String,
}

impl FetchDescriptor {
    pub fn new(key: &str, kind: ResourceKind, url: &str) -> Self {
        Self {
            key: key.to_string(),
            kind,
            url: url.to_string(),
        }
    }
}

/// A decoded resource.
#[derive(Debug, Clone)]
pub enum Resource {
    Json(serde_json::Value),
    Table(DataFrame),
}

/// Source of raw bytes. The browser implementation wraps `fetch`,
/// the native one reads files.
pub trait Fetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<Vec<u8>, String>>;
}

/// Every resource of a completed load, keyed by descriptor key.
#[derive(Debug, Default)]
pub struct LoadedResources {
    resources: HashMap<String, Resource>,
}

impl LoadedResources {
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.resources.contains_key(key)
    }

    /// Remove and return a JSON resource.
    pub fn take_json(&mut self, key: &str) -> Result<serde_json::Value, LoadError> {
        match self.resources.remove(key) {
            Some(Resource::Json(value)) => Ok(value),
            Some(other) => {
                self.resources.insert(key.to_string(), other);
                Err(LoadError::WrongKind {
                    key: key.to_string(),
                    expected: "JSON",
                })
            }
            None => Err(LoadError::MissingResource(key.to_string())),
        }
    }

    /// Remove and return a table resource.
    pub fn take_table(&mut self, key: &str) -> Result<DataFrame, LoadError> {
        match self.resources.remove(key) {
            Some(Resource::Table(df)) => Ok(df),
            Some(other) => {
                self.resources.insert(key.to_string(), other);
                Err(LoadError::WrongKind {
                    key: key.to_string(),
                    expected: "a table",
                })
            }
            None => Err(LoadError::MissingResource(key.to_string())),
        }
    }
}

/// Fetch and decode a single resource.
async fn fetch_one<F: Fetcher>(
    fetcher: &F,
    source: &FetchDescriptor,
) -> Result<(String, Resource), LoadError> {
    log::debug!("Fetching '{}' from {}", source.key, source.url);
    let bytes = fetcher
        .fetch(&source.url)
        .await
        .map_err(|message| LoadError::Fetch {
            key: source.key.clone(),
            url: source.url.clone(),
            message,
        })?;

    let parse_error = |message: String| LoadError::Parse {
        key: source.key.clone(),
        message,
    };
    let resource = match source.kind {
        ResourceKind::Json => Resource::Json(
            serde_json::from_slice(&bytes).map_err(|e| parse_error(e.to_string()))?,
        ),
        ResourceKind::Csv => Resource::Table(
            table::read_census_table(&bytes).map_err(|e| parse_error(e.to_string()))?,
        ),
    };
    log::debug!("Loaded '{}' ({} bytes)", source.key, bytes.len());
    Ok((source.key.clone(), resource))
}

/// Issue every fetch concurrently and wait for all of them.
///
/// Resolves with all resources once every fetch succeeded. Rejects with the
/// first error; the fetches still in flight are dropped at that point.
pub async fn load_all<F: Fetcher>(
    fetcher: &F,
    sources: &[FetchDescriptor],
) -> Result<LoadedResources, LoadError> {
    for (i, source) in sources.iter().enumerate() {
        if sources[..i].iter().any(|s| s.key == source.key) {
            return Err(LoadError::DuplicateKey(source.key.clone()));
        }
    }

    let results = try_join_all(sources.iter().map(|source| fetch_one(fetcher, source)))
        .await
        .inspect_err(|e| log::error!("Load aborted: {e}"))?;

    log::info!("All {} resources loaded", results.len());
    Ok(LoadedResources {
        resources: results.into_iter().collect(),
    })
}

/// [`load_all`] followed by a completion callback.
///
/// `on_complete` is invoked exactly once with the full result set when every
/// fetch succeeded, and never when any of them failed.
pub async fn load_then<F, C>(
    fetcher: &F,
    sources: &[FetchDescriptor],
    on_complete: C,
) -> Result<(), LoadError>
where
    F: Fetcher,
    C: FnOnce(LoadedResources),
{
    let resources = load_all(fetcher, sources).await?;
    on_complete(resources);
    Ok(())
}
