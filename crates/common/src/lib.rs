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

//! Solclone Common - Shared functionality for solclone components
//!
//! This crate provides the utilities used by both the solclone binary
//! and the engine crate: logging setup, explorer response caching and
//! API key rotation.

/// Caching utilities for storing and retrieving explorer responses
pub mod cache;
/// Round-robin pool of explorer API keys
pub mod keys;
/// Logging setup and utilities for consistent logging across solclone components
pub mod logging;

pub use cache::*;
pub use keys::*;
pub use logging::*;
