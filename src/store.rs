//! The cache resolver: maps logical filenames to verified local copies,
//! downloading through a [`Transport`] only when the cache misses or fails
//! hash validation.
//!
//! Concurrent processes may share one cache directory. Every write goes to a
//! uniquely named temporary file in the destination directory and is renamed
//! into place, so a concurrent reader sees either no file or a fully valid
//! one, never a partial download.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use directories::BaseDirs;
use tracing::{debug, info};

use crate::error::GeoError;
use crate::fs_util::sha256_file;
use crate::processors::Processor;
use crate::registry::Registry;
use crate::transport::Transport;

pub const CACHE_ENV_VAR: &str = "GEODATASETS_DATA_DIR";

/// What the store had to do to satisfy a fetch. Processors use this to skip
/// regenerating derived artifacts when the raw file did not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchAction {
    /// The file was downloaded (first fetch or failed validation).
    Downloaded,
    /// A valid copy was already in the cache; no network access happened.
    UpToDate,
}

#[derive(Debug, Clone)]
pub struct Store<T: Transport> {
    registry: Registry,
    cache_root: Utf8PathBuf,
    transport: T,
}

impl<T: Transport> Store<T> {
    /// Build a store rooted at `$GEODATASETS_DATA_DIR`, or the per-user cache
    /// directory when the variable is unset.
    pub fn new(registry: Registry, transport: T) -> Result<Self, GeoError> {
        let cache_root = match std::env::var(CACHE_ENV_VAR) {
            Ok(dir) if !dir.trim().is_empty() => Utf8PathBuf::from(dir),
            _ => BaseDirs::new()
                .and_then(|dirs| {
                    Utf8PathBuf::from_path_buf(dirs.home_dir().join(".cache").join("geodatasets"))
                        .ok()
                })
                .ok_or_else(|| {
                    GeoError::Filesystem("unable to resolve cache directory".to_string())
                })?,
        };
        Ok(Self {
            registry,
            cache_root,
            transport,
        })
    }

    pub fn with_cache_root(registry: Registry, transport: T, cache_root: Utf8PathBuf) -> Self {
        Self {
            registry,
            cache_root,
            transport,
        }
    }

    pub fn cache_root(&self) -> &Utf8Path {
        &self.cache_root
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn local_path(&self, name: &str) -> Utf8PathBuf {
        self.cache_root.join(name)
    }

    /// Resolve `name` to a verified local file, downloading if necessary.
    pub fn fetch(&self, name: &str) -> Result<(Utf8PathBuf, FetchAction), GeoError> {
        let entry = self.registry.lookup(name)?;
        let local = self.local_path(name);

        if local.as_std_path().is_file() {
            let actual = sha256_file(local.as_std_path())?;
            if actual == entry.sha256 {
                debug!(name, "cache hit");
                return Ok((local, FetchAction::UpToDate));
            }
            info!(name, "cached copy failed validation, refetching");
        }

        let parent = local
            .parent()
            .ok_or_else(|| GeoError::Filesystem(format!("invalid cache path {local}")))?;
        fs::create_dir_all(parent.as_std_path())
            .map_err(|err| GeoError::Filesystem(err.to_string()))?;

        let url = self.registry.url_for(name)?;
        let temp = tempfile::Builder::new()
            .prefix(".geodatasets-")
            .tempfile_in(parent.as_std_path())
            .map_err(|err| GeoError::Filesystem(err.to_string()))?;

        info!(name, url, "downloading");
        self.transport.download(&url, temp.path())?;

        let actual = sha256_file(temp.path())?;
        if actual != entry.sha256 {
            // Dropping `temp` removes it; nothing reaches the final path.
            return Err(GeoError::Integrity {
                name: name.to_string(),
                expected: entry.sha256.clone(),
                actual,
            });
        }

        if local.as_std_path().exists() {
            fs::remove_file(local.as_std_path())
                .map_err(|err| GeoError::Filesystem(err.to_string()))?;
        }
        temp.persist(local.as_std_path())
            .map_err(|err| GeoError::Filesystem(err.to_string()))?;
        Ok((local, FetchAction::Downloaded))
    }

    /// Fetch `name` and run it through `processor`, returning the derived
    /// artifact paths. The processor skips work when both the raw file and
    /// its derived artifacts are already valid.
    pub fn fetch_processed(
        &self,
        name: &str,
        processor: &Processor,
    ) -> Result<Vec<Utf8PathBuf>, GeoError> {
        let (raw, action) = self.fetch(name)?;
        processor.apply(&raw, action)
    }
}
