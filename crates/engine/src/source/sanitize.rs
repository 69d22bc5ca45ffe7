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

//! Path sanitization for explorer-reported source names.
//!
//! A source name as declared in a compiler input may be absolute, may lack the
//! `.sol` extension, and may live below a `node_modules` directory. [`sanitize`]
//! turns it into a tree-relative path that is safe to write to disk, and
//! records every hop it applied in a [`RenameMap`] so that the original name
//! can be remapped to the new location later.
//!
//! Each hop is keyed by the string *before* that hop, not by the original
//! source name, so chained renames can be replayed one step at a time.

use std::collections::BTreeMap;

use tracing::trace;

/// Canonical extension of Solidity source files.
pub const SOLIDITY_EXTENSION: &str = ".sol";

/// Directory name used by package managers for installed dependencies.
pub const DEPENDENCY_MARKER: &str = "node_modules";

/// Filesystem-safe replacement for [`DEPENDENCY_MARKER`].
pub const SAFE_DEPENDENCY_MARKER: &str = "node-modules";

/// Mapping from a path (or path prefix) to its sanitized form.
pub type RenameMap = BTreeMap<String, String>;

/// The result of sanitizing one source name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sanitized {
    /// The tree-relative path the source should be written to.
    pub path: String,
    /// Every rename hop applied, keyed by the input of that hop.
    pub renames: RenameMap,
}

/// Sanitize a source name into a tree-relative path.
///
/// The rules run in a fixed order, each contributing at most one entry to the
/// rename map:
///
/// 1. leading `/` separators are stripped;
/// 2. the `.sol` extension is appended when missing;
/// 3. the innermost `node_modules` directory segment is renamed to
///    `node-modules`, together with everything before it.
///
/// The function is total and idempotent: sanitizing its own output yields the
/// same path and no renames.
pub fn sanitize(source_name: &str) -> Sanitized {
    let mut renames = RenameMap::new();
    let mut path = source_name.to_string();

    // 1. make the path relative
    let relative = path.trim_start_matches('/');
    if relative.len() != path.len() {
        let relative = relative.to_string();
        renames.insert(path, relative.clone());
        path = relative;
    }

    // 2. enforce the extension
    if !path.ends_with(SOLIDITY_EXTENSION) {
        let with_ext = format!("{path}{SOLIDITY_EXTENSION}");
        renames.insert(path, with_ext.clone());
        path = with_ext;
    }

    // 3. rename the innermost dependency namespace
    if let Some(end) = innermost_marker_end(&path) {
        let from_prefix = &path[..end];
        let start = end - DEPENDENCY_MARKER.len() - 1;
        let to_prefix = format!("{}{SAFE_DEPENDENCY_MARKER}/", &path[..start]);
        let renamed = format!("{to_prefix}{}", &path[end..]);
        renames.insert(from_prefix.to_string(), to_prefix);
        path = renamed;
    }

    trace!(source = source_name, path = %path, hops = renames.len(), "sanitized source name");
    Sanitized { path, renames }
}

/// Returns the byte offset just past `node_modules/` when the innermost
/// dependency-namespace segment of `path` is still in its unsafe form.
///
/// Only directory segments are considered; the file name never counts. The scan
/// runs from the innermost directory outwards and stops at the first segment
/// that is either the marker or its safe replacement.
fn innermost_marker_end(path: &str) -> Option<usize> {
    let dir_end = path.rfind('/')?;
    let mut seg_end = dir_end;
    loop {
        let seg_start = path[..seg_end].rfind('/').map_or(0, |i| i + 1);
        match &path[seg_start..seg_end] {
            DEPENDENCY_MARKER => return Some(seg_end + 1),
            SAFE_DEPENDENCY_MARKER => return None,
            _ => {}
        }
        if seg_start == 0 {
            return None;
        }
        seg_end = seg_start - 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renames(pairs: &[(&str, &str)]) -> RenameMap {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_leading_slash_and_extension_are_both_recorded() {
        let s = sanitize("/Foo");
        assert_eq!(s.path, "Foo.sol");
        assert_eq!(s.renames, renames(&[("/Foo", "Foo"), ("Foo", "Foo.sol")]));
    }

    #[test]
    fn test_clean_path_is_untouched() {
        let s = sanitize("contracts/Token.sol");
        assert_eq!(s.path, "contracts/Token.sol");
        assert!(s.renames.is_empty());
    }

    #[test]
    fn test_repeated_leading_slashes_collapse_in_one_hop() {
        let s = sanitize("//lib/A.sol");
        assert_eq!(s.path, "lib/A.sol");
        assert_eq!(s.renames, renames(&[("//lib/A.sol", "lib/A.sol")]));
    }

    #[test]
    fn test_dependency_namespace_is_renamed_with_its_prefix() {
        let s = sanitize("node_modules/@openzeppelin/contracts/token/ERC20/ERC20.sol");
        assert_eq!(s.path, "node-modules/@openzeppelin/contracts/token/ERC20/ERC20.sol");
        assert_eq!(s.renames, renames(&[("node_modules/", "node-modules/")]));

        let s = sanitize("/app/node_modules/solmate/src/tokens/ERC20");
        assert_eq!(s.path, "app/node-modules/solmate/src/tokens/ERC20.sol");
        assert_eq!(
            s.renames,
            renames(&[
                ("/app/node_modules/solmate/src/tokens/ERC20", "app/node_modules/solmate/src/tokens/ERC20"),
                ("app/node_modules/solmate/src/tokens/ERC20", "app/node_modules/solmate/src/tokens/ERC20.sol"),
                ("app/node_modules/", "app/node-modules/"),
            ])
        );
    }

    #[test]
    fn test_only_innermost_dependency_namespace_is_renamed() {
        let s = sanitize("node_modules/a/node_modules/b/B.sol");
        assert_eq!(s.path, "node_modules/a/node-modules/b/B.sol");
        assert_eq!(s.renames, renames(&[("node_modules/a/node_modules/", "node_modules/a/node-modules/")]));
    }

    #[test]
    fn test_marker_must_be_a_whole_directory_segment() {
        for name in ["my_node_modules/A.sol", "node_modules_x/A.sol", "lib/node_modules.sol"] {
            let s = sanitize(name);
            assert_eq!(s.path, name);
            assert!(s.renames.is_empty(), "{name} should not be renamed");
        }
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        for name in [
            "/Foo",
            "foo",
            "",
            "/",
            "///a/b",
            "node_modules/x/X",
            "/node_modules/a/node_modules/b/node_modules/c",
            "lib/forge-std/src/Test.sol",
        ] {
            let once = sanitize(name);
            assert!(once.path.ends_with(SOLIDITY_EXTENSION), "{name}");
            assert!(!once.path.starts_with('/'), "{name}");

            let twice = sanitize(&once.path);
            assert_eq!(twice.path, once.path, "{name}");
            assert!(twice.renames.is_empty(), "{name}");
        }
    }
}
