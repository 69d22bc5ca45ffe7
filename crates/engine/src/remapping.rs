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

//! Import remappings for cloned sources.
//!
//! A cloned contract keeps its original import statements. To let the compiler
//! resolve them against the sanitized layout on disk, every clone record
//! contributes two kinds of remapping:
//!
//! * derived ones, expanding each compiler-declared `from=to` prefix over every
//!   concrete file living below `to`;
//! * direct ones, mapping each explorer-reported source name to its file.
//!
//! Records are merged in journal order and the last record wins on duplicate
//! keys.

use std::collections::BTreeMap;

use foundry_compilers::artifacts::remappings::Remapping;
use tracing::debug;

use crate::{journal::CloneRecord, source::RenameMap};

/// Compose the project-wide remapping table (import name => project-relative path).
pub fn compose(records: &[CloneRecord]) -> BTreeMap<String, String> {
    let mut table = BTreeMap::new();
    for record in records {
        for (name, path) in record_remappings(record) {
            if let Some(previous) = table.insert(name.clone(), path.clone()) {
                if previous != path {
                    debug!(
                        name = %name,
                        previous = %previous,
                        path = %path,
                        address = %record.address,
                        "remapping overridden by a later clone"
                    );
                }
            }
        }
    }
    table
}

/// [`compose`], adapted to the build tool's remapping type.
pub fn compose_remappings(records: &[CloneRecord]) -> Vec<Remapping> {
    compose(records)
        .into_iter()
        .map(|(name, path)| Remapping { context: None, name, path })
        .collect()
}

/// Remappings contributed by a single record, in emission order.
fn record_remappings(record: &CloneRecord) -> Vec<(String, String)> {
    let mut out = Vec::new();

    for (from, to) in record.solc_config.declared_remappings() {
        if from == to {
            continue;
        }
        for actual in record.cloned_files.values() {
            if let Some(rest) = actual.strip_prefix(to.as_str()) {
                out.push((format!("{from}{rest}"), record.project_path(actual)));
            }
        }
    }

    for (source_name, actual) in &record.cloned_files {
        out.push((source_name.clone(), record.project_path(actual)));
    }

    out
}

/// Rewrite declared remapping targets through a tree's rename hops.
///
/// For every `from=to`, the longest rename key that is a prefix of `to` has
/// that prefix replaced by its sanitized form. At most one hop is applied per
/// remapping.
pub fn regulate_declared_remappings(
    declared: &[(String, String)],
    renames: &RenameMap,
) -> Vec<(String, String)> {
    declared
        .iter()
        .map(|(from, to)| {
            let to = renames
                .iter()
                .filter(|(key, _)| to.starts_with(key.as_str()))
                .max_by_key(|(key, _)| key.len())
                .map(|(key, value)| format!("{value}{}", &to[key.len()..]))
                .unwrap_or_else(|| to.clone());
            (from.clone(), to)
        })
        .collect()
}
