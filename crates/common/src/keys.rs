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

//! Explorer API key rotation.

use std::env;

/// Environment variable holding a comma separated list of explorer API keys.
pub const ETHERSCAN_API_KEYS_ENV: &str = "ETHERSCAN_API_KEYS";

/// A round-robin pool of explorer API keys.
///
/// Rotation state lives in the pool value itself; whoever owns the pool
/// decides when to advance it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiKeyPool {
    keys: Vec<String>,
    next: usize,
}

impl ApiKeyPool {
    /// Create a pool from the given keys. Blank keys are dropped.
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys = keys
            .into_iter()
            .map(Into::into)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keys, next: 0 }
    }

    /// Create a pool from [`ETHERSCAN_API_KEYS_ENV`].
    pub fn from_env() -> Self {
        env::var(ETHERSCAN_API_KEYS_ENV)
            .map(|v| Self::new(v.split(',').map(str::to_string)))
            .unwrap_or_default()
    }

    /// Number of keys in the pool.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the pool holds no keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Returns the current key and advances the rotation, wrapping around.
    pub fn next_key(&mut self) -> Option<String> {
        if self.keys.is_empty() {
            return None;
        }
        let key = self.keys[self.next % self.keys.len()].clone();
        self.next = (self.next + 1) % self.keys.len();
        Some(key)
    }
}
