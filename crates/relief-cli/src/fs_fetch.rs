use std::path::{Path, PathBuf};

use futures::future::{FutureExt, LocalBoxFuture};
use relief_data::Fetcher;

/// [`Fetcher`] over a local directory. Only the last path segment of a
/// source URL is used, so `data/judete-id.json` resolves to
/// `<root>/judete-id.json`.
pub struct FsFetcher {
    root: PathBuf,
}

impl FsFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn resolve(&self, url: &str) -> PathBuf {
        let file_name = url.rsplit('/').next().unwrap_or(url);
        self.root.join(file_name)
    }
}

impl Fetcher for FsFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<Vec<u8>, String>> {
        let path = self.resolve(url);
        async move { read(&path) }.boxed_local()
    }
}

fn read(path: &Path) -> Result<Vec<u8>, String> {
    std::fs::read(path).map_err(|e| format!("{}: {e}", path.display()))
}
