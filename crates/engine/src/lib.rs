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

//! Solclone Engine - source tree reconstruction and remapping for cloned contracts.
//!
//! The engine turns the verified source bundle of an on-chain contract into a
//! collision-free file tree inside a local project, records every clone in a
//! journal, and composes the remappings and compiler overrides the build tool
//! needs to compile the cloned code.

pub mod clone;
pub use clone::*;

pub mod error;
pub use error::*;

pub mod explorer;
pub use explorer::*;

pub mod journal;
pub use journal::*;

pub mod project;
pub use project::*;

pub mod remapping;
pub use remapping::*;

pub mod source;
pub use source::*;
