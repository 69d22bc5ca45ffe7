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

//! A build project that contracts are cloned into, and what it hands to the
//! build tool: remappings, per-file compiler overrides and extra sources.

use std::{
    collections::BTreeMap,
    path::{Component, Path, PathBuf},
};

use semver::Version;
use serde_json::{Map, Value};

use crate::{
    journal::{join_folder, CloneJournal, JOURNAL_FILE},
    remapping, Result,
};

/// Default name of the build tool's own sources directory.
pub const DEFAULT_SOURCES_DIR: &str = "contracts";

/// A project on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    /// The project root.
    pub root: PathBuf,
    /// The build tool's sources directory, which clones may not target.
    pub sources_dir: PathBuf,
}

/// Compiler version and settings to use for one cloned file.
#[derive(Debug, Clone, PartialEq)]
pub struct CompilerOverride {
    /// Path of the file, relative to the project root.
    pub path: String,
    /// Compiler version the file was verified with.
    pub version: Version,
    /// Compiler settings the file was verified with.
    pub settings: Map<String, Value>,
}

impl Project {
    /// Project rooted at `root`, with the default sources directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let sources_dir = root.join(DEFAULT_SOURCES_DIR);
        Self { root, sources_dir }
    }

    /// Set the sources directory; relative paths are taken from the root.
    pub fn with_sources_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.sources_dir = self.root.join(dir);
        self
    }

    /// The journal of this project.
    pub fn journal(&self) -> CloneJournal {
        CloneJournal::new(self.journal_path())
    }

    /// Path of the clone journal.
    pub fn journal_path(&self) -> PathBuf {
        self.root.join(JOURNAL_FILE)
    }

    /// Whether `destination`, relative to the root, is the sources directory.
    pub fn is_sources_dir(&self, destination: &Path) -> bool {
        lexical(&self.root.join(destination)) == lexical(&self.sources_dir)
    }

    /// The remapping table of every cloned contract.
    pub fn remappings(&self) -> Result<BTreeMap<String, String>> {
        Ok(remapping::compose(&self.journal().load()?))
    }

    /// One compiler override per cloned file.
    pub fn compiler_overrides(&self) -> Result<Vec<CompilerOverride>> {
        let records = self.journal().load()?;
        Ok(records
            .iter()
            .flat_map(|record| {
                record.cloned_files.values().map(|actual| CompilerOverride {
                    path: record.project_path(actual),
                    version: record.solc_config.version.clone(),
                    settings: record.solc_config.settings.clone(),
                })
            })
            .collect())
    }

    /// Absolute paths of every cloned main file.
    pub fn cloned_sources(&self) -> Result<Vec<PathBuf>> {
        let records = self.journal().load()?;
        Ok(records
            .iter()
            .map(|record| self.root.join(join_folder(&record.folder, &record.main_file)))
            .collect())
    }
}

/// Drop `.` components so that `a/./b` and `a/b` compare equal.
fn lexical(path: &Path) -> PathBuf {
    path.components().filter(|c| !matches!(c, Component::CurDir)).collect()
}
