// Solclone - Clone verified contracts into local projects
// Copyright (C) 2024 Zhuo Zhang and Wuqi Zhang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Cache utilities for block-explorer responses.

use std::{fs, marker::PhantomData, path::PathBuf, time::Duration};

use alloy_chains::Chain;
use eyre::Result;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{trace, warn};

/// Default cache TTL for explorer responses.
/// Set to 1 day since the verified source of a contract is unlikely to change.
pub const DEFAULT_ETHERSCAN_CACHE_TTL: u64 = 86400;

/// Trait for cache paths.
pub trait CachePath {
    /// Returns the path to solclone's cache dir: `~/.solclone/cache` by default.
    fn solclone_cache_dir(&self) -> Option<PathBuf>;

    /// Check whether the cache is valid.
    fn is_valid(&self) -> bool {
        self.solclone_cache_dir().is_some()
    }

    /// Returns the path to the explorer cache dir: `<cache_root>/etherscan`.
    fn etherscan_cache_dir(&self) -> Option<PathBuf> {
        Some(self.solclone_cache_dir()?.join("etherscan"))
    }

    /// Returns the path to the explorer cache dir for `chain_id`:
    /// `<cache_root>/etherscan/<chain>`
    fn etherscan_chain_cache_dir(&self, chain_id: impl Into<Chain>) -> Option<PathBuf> {
        Some(self.etherscan_cache_dir()?.join(chain_id.into().to_string()))
    }
}

/// Cache path for solclone.
#[derive(Debug)]
pub struct SolcloneCachePath {
    root: Option<PathBuf>,
}

impl Default for SolcloneCachePath {
    fn default() -> Self {
        Self { root: default_cache_root() }
    }
}

fn default_cache_root() -> Option<PathBuf> {
    dirs_next::home_dir().map(|p| p.join(".solclone").join("cache"))
}

impl SolcloneCachePath {
    /// New cache path, defaulting to `~/.solclone/cache` when `root` is `None`.
    pub fn new(root: Option<impl Into<PathBuf>>) -> Self {
        Self { root: root.map(Into::into).or_else(default_cache_root) }
    }

    /// New empty cache path, which disables caching.
    pub fn empty() -> Self {
        Self { root: None }
    }
}

impl CachePath for SolcloneCachePath {
    fn solclone_cache_dir(&self) -> Option<PathBuf> {
        self.root.clone()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheWrapper<T> {
    pub data: T,
    pub expires_at: u64,
}

impl<T> CacheWrapper<T> {
    pub fn new(data: T, ttl: Option<Duration>) -> Self {
        Self {
            data,
            expires_at: ttl
                .map(|ttl| ttl.as_secs().saturating_add(chrono::Utc::now().timestamp() as u64))
                .unwrap_or(u64::MAX),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at < chrono::Utc::now().timestamp() as u64
    }
}

/// Trait for cache.
pub trait Cache {
    /// The type of the data to be cached.
    type Data: Serialize + DeserializeOwned;

    /// Loads the cache for the given label.
    fn load_cache(&self, label: impl Into<String>) -> Option<Self::Data>;

    /// Saves the cache for the given label.
    fn save_cache(&self, label: impl Into<String>, data: &Self::Data) -> Result<()>;
}

/// A cache manager that stores data in the file system.
///  - `T` is the type of the data to be cached.
///  - `cache_dir` is the directory where the cache files are stored.
///  - `cache_ttl` is the time-to-live of the cache files. If it is `None`, the cache files will
///    never expire.
#[derive(Debug, Clone)]
pub struct SolcloneCache<T> {
    cache_dir: PathBuf,
    cache_ttl: Option<Duration>,
    phantom: PhantomData<T>,
}

impl<T> SolcloneCache<T>
where
    T: Serialize + DeserializeOwned,
{
    /// New cache. Returns `None` when no directory is given.
    pub fn new(
        cache_dir: Option<impl Into<PathBuf>>,
        cache_ttl: Option<Duration>,
    ) -> Result<Option<Self>> {
        if let Some(cache_dir) = cache_dir {
            let cache_dir = cache_dir.into();
            fs::create_dir_all(&cache_dir)?;
            Ok(Some(Self { cache_dir, cache_ttl, phantom: PhantomData }))
        } else {
            Ok(None)
        }
    }

    /// Returns the cache directory.
    pub fn cache_dir(&self) -> &PathBuf {
        &self.cache_dir
    }

    /// Returns the cache TTL.
    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl
    }
}

impl<T> Cache for SolcloneCache<T>
where
    T: Serialize + DeserializeOwned,
{
    type Data = T;

    fn load_cache(&self, label: impl Into<String>) -> Option<T> {
        let cache_file = self.cache_dir.join(format!("{}.json", label.into()));
        trace!("loading cache: {:?}", cache_file);
        if !cache_file.exists() {
            return None;
        }

        let content = fs::read_to_string(&cache_file).ok()?;
        let cache: CacheWrapper<_> = if let Ok(cache) = serde_json::from_str(&content) {
            cache
        } else {
            warn!("the cache file has been corrupted: {:?}", cache_file);
            let _ = fs::remove_file(&cache_file);
            return None;
        };

        if cache.is_expired() {
            trace!("the cache file has expired: {:?}", cache_file);
            let _ = fs::remove_file(&cache_file);
            None
        } else {
            trace!("hit the cache: {:?}", cache_file);
            Some(cache.data)
        }
    }

    fn save_cache(&self, label: impl Into<String>, data: &T) -> Result<()> {
        let cache_file = self.cache_dir.join(format!("{}.json", label.into()));
        trace!("saving cache: {:?}", cache_file);

        let cache = CacheWrapper::new(data, self.cache_ttl);
        let content = serde_json::to_string(&cache)?;
        fs::write(&cache_file, content)?;
        Ok(())
    }
}

impl<T> Cache for Option<SolcloneCache<T>>
where
    T: Serialize + DeserializeOwned,
{
    type Data = T;

    fn load_cache(&self, label: impl Into<String>) -> Option<T> {
        self.as_ref()?.load_cache(label)
    }

    fn save_cache(&self, label: impl Into<String>, data: &T) -> Result<()> {
        if let Some(cache) = self {
            cache.save_cache(label, data)
        } else {
            Ok(())
        }
    }
}
