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

//! The clone journal: one JSON array of [`CloneRecord`]s per project.
//!
//! The journal is always read in full and rewritten in full. There is no
//! locking; concurrent clones into the same project are not supported.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use alloy_primitives::{Address, Bytes, TxHash};
use semver::Version;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::{CloneError, Result};

/// File name of the journal, relative to the project root.
pub const JOURNAL_FILE: &str = ".clone.meta";

/// Compiler version and settings a contract was verified with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolcConfig {
    /// The compiler version, without build metadata.
    pub version: Version,
    /// Standard-JSON compiler settings, kept verbatim.
    #[serde(default)]
    pub settings: Map<String, Value>,
}

impl SolcConfig {
    /// The `from=to` remappings declared in the settings, split at the first `=`.
    ///
    /// Entries that are not strings or carry no `=` are ignored.
    pub fn declared_remappings(&self) -> Vec<(String, String)> {
        self.settings
            .get("remappings")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
            .filter_map(|r| r.split_once('='))
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect()
    }

    /// Replace the declared remappings.
    pub fn set_declared_remappings(&mut self, remappings: &[(String, String)]) {
        let remappings =
            remappings.iter().map(|(from, to)| Value::String(format!("{from}={to}"))).collect();
        self.settings.insert("remappings".to_string(), Value::Array(remappings));
    }
}

/// The durable record of one completed clone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloneRecord {
    /// The address of the contract.
    pub address: Address,
    /// The folder, relative to the project root, the contract was cloned into.
    pub folder: String,
    /// The source file declaring the contract, relative to `folder`.
    #[serde(alias = "main_file")]
    pub main_file: String,
    /// The chain the contract is deployed on.
    pub chain_id: u64,
    /// The transaction that created the contract.
    pub creation_transaction: TxHash,
    /// The sender of the creation transaction.
    pub deployer: Address,
    /// ABI-encoded constructor arguments, stored as bare hex.
    #[serde(with = "hex_bytes")]
    pub constructor_arguments: Bytes,
    /// The compiler configuration the contract was verified with.
    pub solc_config: SolcConfig,
    /// Every cloned file: original source name => path relative to `folder`.
    pub cloned_files: BTreeMap<String, String>,
}

impl CloneRecord {
    /// Path of a cloned file relative to the project root.
    pub fn project_path(&self, actual_path: &str) -> String {
        join_folder(&self.folder, actual_path)
    }

    /// Run the record-level predicates that serde cannot express.
    fn validate(&self) -> std::result::Result<(), String> {
        if self.chain_id < 1 {
            return Err("chainId must be at least 1".to_string());
        }
        if Path::new(&self.folder).is_absolute() {
            return Err(format!("folder must be relative: {}", self.folder));
        }
        if let Some((name, path)) = self.cloned_files.iter().find(|(_, p)| p.starts_with('/')) {
            return Err(format!("cloned file {name} has an absolute path: {path}"));
        }
        Ok(())
    }
}

/// Join a cloned path onto its folder, treating `.` and the empty folder as the root.
pub(crate) fn join_folder(folder: &str, path: &str) -> String {
    let folder = folder.trim_end_matches('/');
    if folder.is_empty() || folder == "." {
        path.to_string()
    } else {
        format!("{folder}/{path}")
    }
}

/// Load-all / rewrite-all access to a project's clone journal.
#[derive(Debug, Clone)]
pub struct CloneJournal {
    path: PathBuf,
}

impl CloneJournal {
    /// Journal stored at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Journal of the project rooted at `root`.
    pub fn for_project(root: &Path) -> Self {
        Self::new(root.join(JOURNAL_FILE))
    }

    /// The journal file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every record. A missing file is an empty journal.
    pub fn load(&self) -> Result<Vec<CloneRecord>> {
        if !self.path.exists() {
            trace!(path = %self.path.display(), "no clone journal yet");
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)?;
        let records = decode_journal(&content)?;
        debug!(path = %self.path.display(), records = records.len(), "loaded clone journal");
        Ok(records)
    }

    /// Append one record, rewriting the whole journal.
    pub fn append(&self, record: CloneRecord) -> Result<()> {
        let mut records = self.load()?;
        records.push(record);
        self.store(&records)
    }

    /// Replace the journal with `records`.
    ///
    /// The content is written to a sibling temp file first and renamed over the
    /// journal, so readers see either the old or the new journal.
    pub fn store(&self, records: &[CloneRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(records)?;
        let temp_file = self.path.with_extension("tmp");
        fs::write(&temp_file, content)?;
        fs::rename(&temp_file, &self.path)?;
        debug!(path = %self.path.display(), records = records.len(), "stored clone journal");
        Ok(())
    }
}

/// Decode the journal text into records, validating each one.
pub fn decode_journal(content: &str) -> Result<Vec<CloneRecord>> {
    let value: Value = serde_json::from_str(content)
        .map_err(|e| CloneError::MalformedJournal(format!("invalid JSON: {e}")))?;
    let Value::Array(items) = value else {
        return Err(CloneError::MalformedJournal(
            "expected an array of clone records".to_string(),
        ));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let record: CloneRecord = serde_json::from_value(item)
                .map_err(|e| CloneError::MalformedJournal(format!("record {index}: {e}")))?;
            record
                .validate()
                .map_err(|e| CloneError::MalformedJournal(format!("record {index}: {e}")))?;
            Ok(record)
        })
        .collect()
}

/// Bare-hex serialization of byte strings (a `0x` prefix is accepted on read).
mod hex_bytes {
    use alloy_primitives::Bytes;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(bytes: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Bytes, D::Error> {
        let s = String::deserialize(deserializer)?;
        let s = s.strip_prefix("0x").unwrap_or(&s);
        hex::decode(s).map(Bytes::from).map_err(D::Error::custom)
    }
}
