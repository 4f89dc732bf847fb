// Copyright 2025 the Vistage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! URL resolution.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::DataError;

/// Resolves a data URL to its text body.
///
/// Loading is synchronous; hosts with an event loop fetch on their side and use
/// [`StaticFetcher`] to hand the body over.
pub trait Fetcher {
    /// Fetches `url`.
    fn fetch(&self, url: &str) -> Result<String, DataError>;
}

/// Reads URLs as paths relative to a base directory.
///
/// A leading `/` or `./` is resolved against the base as well, mirroring how a web app
/// serves its public folder.
#[derive(Clone, Debug)]
pub struct FileFetcher {
    base: PathBuf,
}

impl FileFetcher {
    /// Creates a fetcher rooted at `base`.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Resolves `url` to a filesystem path.
    pub fn resolve(&self, url: &str) -> PathBuf {
        let rel = url.trim_start_matches("./").trim_start_matches('/');
        self.base.join(Path::new(rel))
    }
}

impl Fetcher for FileFetcher {
    fn fetch(&self, url: &str) -> Result<String, DataError> {
        let path = self.resolve(url);
        std::fs::read_to_string(&path).map_err(|source| DataError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}

/// Serves bodies from memory.
#[derive(Clone, Debug, Default)]
pub struct StaticFetcher {
    bodies: HashMap<String, String>,
}

impl StaticFetcher {
    /// Creates an empty fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a body for `url`.
    pub fn with(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.insert(url, body);
        self
    }

    /// Registers a body for `url`.
    pub fn insert(&mut self, url: impl Into<String>, body: impl Into<String>) {
        self.bodies.insert(url.into(), body.into());
    }
}

impl Fetcher for StaticFetcher {
    fn fetch(&self, url: &str) -> Result<String, DataError> {
        self.bodies
            .get(url)
            .cloned()
            .ok_or_else(|| DataError::Fetch {
                url: url.to_string(),
                message: "not found".to_string(),
            })
    }
}

/// Fetches over HTTP(S) with `ureq`.
#[cfg(feature = "http")]
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    timeout: std::time::Duration,
}

#[cfg(feature = "http")]
impl Default for HttpFetcher {
    fn default() -> Self {
        Self {
            timeout: std::time::Duration::from_secs(30),
        }
    }
}

#[cfg(feature = "http")]
impl HttpFetcher {
    /// Creates a fetcher with a 30 second timeout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(feature = "http")]
impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String, DataError> {
        let fail = |message: String| DataError::Fetch {
            url: url.to_string(),
            message,
        };
        // Non-2xx statuses surface as `ureq::Error::Status`.
        let response = ureq::get(url)
            .timeout(self.timeout)
            .call()
            .map_err(|e| fail(e.to_string()))?;
        response.into_string().map_err(|e| fail(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_fetcher_serves_and_misses() {
        let f = StaticFetcher::new().with("/a.csv", "x\n1\n");
        assert_eq!(f.fetch("/a.csv").unwrap(), "x\n1\n");
        assert!(matches!(
            f.fetch("/b.csv"),
            Err(DataError::Fetch { ref url, .. }) if url == "/b.csv"
        ));
    }

    #[test]
    fn file_fetcher_resolves_relative_to_base() {
        let f = FileFetcher::new("/srv/public");
        assert_eq!(f.resolve("./data/a.json"), PathBuf::from("/srv/public/data/a.json"));
        assert_eq!(f.resolve("/data/a.json"), PathBuf::from("/srv/public/data/a.json"));
        assert!(matches!(
            f.fetch("definitely/missing.json"),
            Err(DataError::Io { .. })
        ));
    }
}
