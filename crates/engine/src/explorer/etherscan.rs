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

//! Etherscan-compatible explorer client.

use std::{path::PathBuf, time::Duration};

use alloy_chains::Chain;
use alloy_primitives::Address;
use reqwest::Client;
use solclone_common::{Cache, CachePath, SolcloneCache, SolcloneCachePath};
use tracing::{debug, trace, warn};

use super::{
    decode_creation, decode_metadata, Creation, Envelope, Explorer, Metadata, RawCreation,
    RawMetadata,
};
use crate::{CloneError, Result};

/// Client for the `contract` module of an Etherscan-compatible API.
#[derive(Debug, Clone)]
pub struct EtherscanExplorer {
    client: Client,
    chain: Chain,
    api_url: String,
    source_cache: Option<SolcloneCache<RawMetadata>>,
    creation_cache: Option<SolcloneCache<RawCreation>>,
}

impl EtherscanExplorer {
    /// Explorer for a chain with a known Etherscan deployment.
    pub fn new(chain: Chain) -> Result<Self> {
        let (api_url, _) = chain.etherscan_urls().ok_or_else(|| {
            CloneError::Unsupported(format!("no known block explorer for chain {chain}"))
        })?;
        Ok(Self::with_url(chain, api_url))
    }

    /// Explorer served at an explicit API endpoint.
    pub fn with_url(chain: Chain, api_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            chain,
            api_url: api_url.into(),
            source_cache: None,
            creation_cache: None,
        }
    }

    /// Cache verified responses below `cache_root` (default `~/.solclone/cache`).
    ///
    /// A cache directory that cannot be created disables caching.
    pub fn with_cache(mut self, cache_root: Option<PathBuf>, ttl: Option<Duration>) -> Self {
        let dir = SolcloneCachePath::new(cache_root).etherscan_chain_cache_dir(self.chain);
        match (SolcloneCache::new(dir.clone(), ttl), SolcloneCache::new(dir, ttl)) {
            (Ok(source_cache), Ok(creation_cache)) => {
                self.source_cache = source_cache;
                self.creation_cache = creation_cache;
            }
            (Err(err), _) | (_, Err(err)) => {
                warn!("could not create explorer cache dir: {err:?}");
            }
        }
        self
    }

    /// The chain this explorer serves.
    pub fn chain(&self) -> Chain {
        self.chain
    }

    /// The API endpoint.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    async fn query<T: serde::de::DeserializeOwned>(
        &self,
        action: &str,
        params: &[(&str, String)],
        api_key: Option<&str>,
    ) -> Result<T> {
        let mut query: Vec<(&str, String)> =
            vec![("module", "contract".to_string()), ("action", action.to_string())];
        query.extend(params.iter().cloned());
        // the unified v2 endpoint serves every chain and needs to be told which
        if self.api_url.contains("/v2/") && !self.api_url.contains("chainid=") {
            query.push(("chainid", self.chain.id().to_string()));
        }
        if let Some(key) = api_key {
            query.push(("apikey", key.to_string()));
        }

        debug!(url = %self.api_url, action, "querying block explorer");
        let envelope: Envelope = self
            .client
            .get(&self.api_url)
            .query(&query)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        envelope.into_first()
    }
}

impl Explorer for EtherscanExplorer {
    async fn get_source(&self, address: Address, api_key: Option<&str>) -> Result<Metadata> {
        let label = format!("{address}-source");
        if let Some(raw) = self.source_cache.load_cache(&label) {
            trace!(%address, "using cached source");
            return decode_metadata(address, raw);
        }

        let raw: RawMetadata =
            self.query("getsourcecode", &[("address", address.to_string())], api_key).await?;
        // unverified responses fail here and are never cached
        let metadata = decode_metadata(address, raw.clone())?;
        if let Err(err) = self.source_cache.save_cache(label, &raw) {
            warn!(%address, "failed to cache source: {err}");
        }
        Ok(metadata)
    }

    async fn get_creation(&self, address: Address, api_key: Option<&str>) -> Result<Creation> {
        let label = format!("{address}-creation");
        if let Some(raw) = self.creation_cache.load_cache(&label) {
            trace!(%address, "using cached creation info");
            return decode_creation(raw);
        }

        let raw: RawCreation = self
            .query("getcontractcreation", &[("contractaddresses", address.to_string())], api_key)
            .await?;
        let creation = decode_creation(raw.clone())?;
        if let Err(err) = self.creation_cache.save_cache(label, &raw) {
            warn!(%address, "failed to cache creation info: {err}");
        }
        Ok(creation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_chain_resolves_endpoint() {
        let explorer = EtherscanExplorer::new(Chain::mainnet()).unwrap();
        assert!(explorer.api_url().starts_with("https://"));
        assert_eq!(explorer.chain(), Chain::mainnet());
    }

    #[test]
    fn test_cache_is_disabled_without_directory() {
        let explorer = EtherscanExplorer::with_url(Chain::mainnet(), "http://localhost/api");
        assert!(explorer.source_cache.is_none());
        assert!(explorer.creation_cache.is_none());
    }

    #[test]
    fn test_cache_lives_in_chain_directory() {
        let root = tempfile::TempDir::new().unwrap();
        let explorer = EtherscanExplorer::with_url(Chain::mainnet(), "http://localhost/api")
            .with_cache(Some(root.path().to_path_buf()), None);
        let cache = explorer.source_cache.as_ref().unwrap();
        assert!(cache.cache_dir().starts_with(root.path().join("etherscan")));
        assert!(cache.cache_dir().is_dir());
    }
}
