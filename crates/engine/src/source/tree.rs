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

//! Source trees reconstructed from a verified source bundle.
//!
//! A [`SourceTree`] is built from `(source name, content)` pairs, checked against
//! a destination directory with [`SourceTree::check_overrides`], and written
//! out with [`SourceTree::dump`]. All filesystem mutation of a clone goes
//! through [`SourceTree::dump`].

use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    path::{Component, Path, PathBuf},
};

use tracing::{debug, trace};

use super::sanitize::{sanitize, RenameMap, SOLIDITY_EXTENSION};
use crate::{CloneError, Result};

/// A file in a [`SourceTree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTreeEntry {
    /// The source name as declared by the explorer.
    pub source_name: String,
    /// The sanitized, tree-relative path of the entry.
    pub path: String,
    /// The file content.
    pub content: String,
    /// Rename hops applied to reach `path` from `source_name`.
    pub remappings: RenameMap,
}

impl SourceTreeEntry {
    /// Create an entry, sanitizing its source name.
    pub fn new(source_name: impl Into<String>, content: impl Into<String>) -> Self {
        let source_name = source_name.into();
        let sanitized = sanitize(&source_name);
        Self {
            source_name,
            path: sanitized.path,
            content: content.into(),
            remappings: sanitized.renames,
        }
    }

    /// Write the entry below `dir`, creating parent directories as needed.
    pub fn dump(&self, dir: &Path) -> Result<()> {
        let file = dir.join(&self.path);
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&file, &self.content)?;
        Ok(())
    }
}

/// An ordered collection of sanitized source files.
///
/// Order follows the explorer's declaration order. It only matters for
/// deterministic logging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceTree {
    /// The entries of the tree.
    pub entries: Vec<SourceTreeEntry>,
}

impl SourceTree {
    /// Build a tree from `(source name, content)` pairs.
    pub fn build<I, N, C>(sources: I) -> Self
    where
        I: IntoIterator<Item = (N, C)>,
        N: Into<String>,
        C: Into<String>,
    {
        let entries =
            sources.into_iter().map(|(name, content)| SourceTreeEntry::new(name, content)).collect();
        Self { entries }
    }

    /// Check that every entry stays below the tree root and that no two
    /// entries sanitize to the same path.
    pub fn validate(&self) -> Result<()> {
        let mut seen: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for entry in &self.entries {
            let path = Path::new(&entry.path);
            if !path.components().all(|c| matches!(c, Component::Normal(_) | Component::CurDir)) {
                return Err(CloneError::Decode(format!(
                    "source `{}` escapes the clone destination",
                    entry.source_name
                )));
            }
            seen.entry(entry.path.as_str()).or_default().push(entry.source_name.as_str());
        }

        let collisions: Vec<_> = seen
            .into_iter()
            .filter(|(_, names)| names.len() > 1)
            .map(|(path, names)| format!("{path} ({})", names.join(", ")))
            .collect();
        if !collisions.is_empty() {
            return Err(CloneError::Decode(format!(
                "sources collide after sanitization: {}",
                collisions.join("; ")
            )));
        }
        Ok(())
    }

    /// Build the tree of a single-file bundle, named after its contract.
    pub fn single_file(contract_name: &str, content: impl Into<String>) -> Self {
        Self::build([(format!("{contract_name}{SOLIDITY_EXTENSION}"), content.into())])
    }

    /// Whether the tree holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// All files (original source name => sanitized path).
    pub fn all_files(&self) -> BTreeMap<String, String> {
        self.entries.iter().map(|e| (e.source_name.clone(), e.path.clone())).collect()
    }

    /// The union of every entry's rename hops.
    pub fn remappings(&self) -> RenameMap {
        let mut remappings = RenameMap::new();
        for entry in &self.entries {
            remappings.extend(entry.remappings.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        remappings
    }

    /// The sanitized path of the file declaring `contract_name`.
    ///
    /// The heuristic looks for a file named after the contract and falls back
    /// to the first entry.
    pub fn main_file(&self, contract_name: &str) -> Option<&str> {
        let file_name = format!("{contract_name}{SOLIDITY_EXTENSION}");
        self.entries
            .iter()
            .find(|e| e.path == file_name || e.path.ends_with(&format!("/{file_name}")))
            .or_else(|| self.entries.first())
            .map(|e| e.path.as_str())
    }

    /// Check whether dumping into `dir` would override existing files.
    ///
    /// Returns the tree-relative paths that already exist, along with any
    /// parent directory of an entry that exists as something other than a
    /// directory. Nothing is created; a missing `dir` yields an empty list.
    pub fn check_overrides(&self, dir: &Path) -> Vec<PathBuf> {
        if !dir.exists() {
            return Vec::new();
        }
        let mut seen = BTreeSet::new();
        let mut overrides = Vec::new();
        for entry in &self.entries {
            let path = PathBuf::from(&entry.path);
            let blocked = path
                .ancestors()
                .skip(1)
                .filter(|a| !a.as_os_str().is_empty())
                .find(|a| dir.join(a).exists() && !dir.join(a).is_dir())
                .map(Path::to_path_buf);
            let hit = match blocked {
                Some(ancestor) => Some(ancestor),
                None => dir.join(&path).exists().then_some(path),
            };
            if let Some(hit) = hit {
                if seen.insert(hit.clone()) {
                    trace!(path = %hit.display(), "destination already exists");
                    overrides.push(hit);
                }
            }
        }
        overrides
    }

    /// Dump the tree into `dir`, creating it if needed.
    ///
    /// Existing files are overwritten; callers must run
    /// [`SourceTree::check_overrides`] first. A tree that fails
    /// [`SourceTree::validate`] is rejected before anything is written.
    pub fn dump(&self, dir: &Path) -> Result<()> {
        self.validate()?;
        fs::create_dir_all(dir)?;
        for entry in &self.entries {
            debug!(path = %entry.path, dir = %dir.display(), "dumping source file");
            entry.dump(dir)?;
        }
        Ok(())
    }
}
