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

//! Block-explorer access.
//!
//! The clone workflow only needs two questions answered about an address: its
//! verified source, and how it was created. [`Explorer`] abstracts over who
//! answers them so that the workflow can be driven by an in-memory explorer in
//! tests and by [`EtherscanExplorer`] in production.

use std::future::Future;

use alloy_primitives::Address;

use crate::Result;

mod etherscan;
pub use etherscan::*;

mod types;
pub use types::*;

/// A source of verified contract metadata.
pub trait Explorer {
    /// Fetch the verified source of `address`.
    ///
    /// Fails with [`crate::CloneError::NotVerified`] for unverified contracts.
    fn get_source(
        &self,
        address: Address,
        api_key: Option<&str>,
    ) -> impl Future<Output = Result<Metadata>> + Send;

    /// Fetch the creation transaction and deployer of `address`.
    fn get_creation(
        &self,
        address: Address,
        api_key: Option<&str>,
    ) -> impl Future<Output = Result<Creation>> + Send;
}
