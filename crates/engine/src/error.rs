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

//! Errors raised by the clone engine.

use std::path::PathBuf;

use alloy_primitives::Address;
use thiserror::Error;

/// Result type used throughout the engine.
pub type Result<T, E = CloneError> = std::result::Result<T, E>;

/// Errors that can occur while cloning a contract or resolving cloned sources.
///
/// Every variant is surfaced to the immediate caller unchanged; only the CLI
/// turns one into a process exit status.
#[derive(Debug, Error)]
pub enum CloneError {
    /// The explorer has no verified source for the address
    #[error("contract {address} is not verified")]
    NotVerified {
        /// The queried contract
        address: Address,
    },

    /// The explorer answered with a non-success status
    #[error("explorer error: {message} ({result})")]
    Explorer {
        /// The envelope's `message` field
        message: String,
        /// The envelope's `result` payload, rendered as text
        result: String,
    },

    /// The explorer could not be reached or returned an unreadable body
    #[error("failed to reach the explorer: {0}")]
    Transport(#[source] reqwest::Error),

    /// Cloning would overwrite existing files
    #[error("files will be overridden: {}", display_paths(.files))]
    FileCollision {
        /// Would-be-overwritten paths, relative to the clone destination
        files: Vec<PathBuf>,
    },

    /// The request is outside what the engine models
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// The persisted clone journal is not a list of valid records
    #[error("malformed clone journal: {0}")]
    MalformedJournal(String),

    /// An explorer payload did not have the expected shape
    #[error("failed to decode explorer response: {0}")]
    Decode(String),

    /// Filesystem failure
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failure outside of explorer decoding
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn display_paths(files: &[PathBuf]) -> String {
    files.iter().map(|f| f.display().to_string()).collect::<Vec<_>>().join(", ")
}

impl From<reqwest::Error> for CloneError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collision_message_lists_every_file() {
        let err = CloneError::FileCollision {
            files: vec![PathBuf::from("Foo.sol"), PathBuf::from("lib/Bar.sol")],
        };
        assert_eq!(err.to_string(), "files will be overridden: Foo.sol, lib/Bar.sol");
    }

    #[test]
    fn test_not_verified_names_the_address() {
        let err = CloneError::NotVerified { address: Address::ZERO };
        assert!(err.to_string().contains("0x0000000000000000000000000000000000000000"));
    }
}
