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

//! The clone workflow.
//!
//! Cloning is a check-then-act sequence without a lock: the collision check and
//! the dump are separate steps, and a process interrupted between the dump and
//! the journal append leaves files on disk without a journal entry. Re-running
//! the clone then fails with a collision, which has to be resolved by hand.

use std::{
    path::{Component, PathBuf},
    time::Duration,
};

use alloy_chains::Chain;
use alloy_primitives::Address;
use tracing::{debug, info, warn};

use crate::{
    explorer::Explorer, journal::CloneRecord, project::Project,
    remapping::regulate_declared_remappings, CloneError, Result,
};

/// Delay between the two explorer calls when no API key is configured.
pub const ANONYMOUS_RATE_LIMIT_DELAY: Duration = Duration::from_secs(5);

/// Options of a single clone.
#[derive(Debug, Clone)]
pub struct CloneOptions {
    /// Chain the contract is deployed on.
    pub chain: Chain,
    /// The contract to clone.
    pub address: Address,
    /// Destination folder, relative to the project root.
    pub destination: PathBuf,
    /// Explorer API key, if any.
    pub api_key: Option<String>,
    /// Emit progress at `debug` instead of `info`.
    pub quiet: bool,
    /// Pause between explorer calls when `api_key` is `None`.
    pub anonymous_delay: Duration,
}

impl CloneOptions {
    /// Clone `address` on `chain` into the project root.
    pub fn new(chain: Chain, address: Address) -> Self {
        Self {
            chain,
            address,
            destination: PathBuf::from("."),
            api_key: None,
            quiet: false,
            anonymous_delay: ANONYMOUS_RATE_LIMIT_DELAY,
        }
    }

    /// Set the destination folder
    pub fn with_destination(mut self, destination: impl Into<PathBuf>) -> Self {
        self.destination = destination.into();
        self
    }

    /// Set the explorer API key
    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key.filter(|k| !k.is_empty());
        self
    }

    /// Enable or disable quiet mode
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Set the pause used between anonymous explorer calls
    pub fn with_anonymous_delay(mut self, delay: Duration) -> Self {
        self.anonymous_delay = delay;
        self
    }
}

macro_rules! progress {
    ($quiet:expr, $($arg:tt)+) => {
        if $quiet {
            debug!($($arg)+)
        } else {
            info!($($arg)+)
        }
    };
}

/// Clone a verified contract into `project` and record it in the journal.
///
/// Nothing is written when the journal is malformed, the destination is
/// rejected, the contract is unverified or written in Vyper, or a cloned file
/// would override an existing one.
pub async fn clone_contract<E: Explorer>(
    project: &Project,
    explorer: &E,
    opts: &CloneOptions,
) -> Result<CloneRecord> {
    let CloneOptions { chain, address, destination, api_key, quiet, anonymous_delay } = opts;
    let (address, quiet, api_key) = (*address, *quiet, api_key.as_deref());

    let journal = project.journal();
    let history = journal.load()?;
    debug!(records = history.len(), "loaded clone history");

    if destination.is_absolute()
        || destination.components().any(|c| matches!(c, Component::ParentDir))
    {
        return Err(CloneError::Unsupported(format!(
            "destination must be a folder below the project root: {}",
            destination.display()
        )));
    }
    if project.is_sources_dir(destination) {
        return Err(CloneError::Unsupported(format!(
            "cannot clone into the sources directory {}",
            project.sources_dir.display()
        )));
    }

    progress!(quiet, %address, %chain, destination = %destination.display(), "cloning contract");
    if api_key.is_none() {
        debug!("no explorer API key provided");
    }

    debug!(%address, "fetching verified source");
    let metadata = explorer.get_source(address, api_key).await?;
    if metadata.is_vyper() {
        return Err(CloneError::Unsupported(format!(
            "{address} is a Vyper contract ({})",
            metadata.compiler_version
        )));
    }
    let tree = metadata.tree()?;
    if tree.is_empty() {
        return Err(CloneError::NotVerified { address });
    }
    let mut solc_config = metadata.solc_config()?;

    let dump_dir = project.root.join(destination);
    let overrides = tree.check_overrides(&dump_dir);
    if !overrides.is_empty() {
        for file in &overrides {
            warn!(file = %destination.join(file).display(), "existing file would be overridden");
        }
        return Err(CloneError::FileCollision { files: overrides });
    }
    debug!(files = tree.len(), dir = %dump_dir.display(), "dumping source tree");
    tree.dump(&dump_dir)?;

    if api_key.is_none() && !anonymous_delay.is_zero() {
        progress!(quiet, delay = ?anonymous_delay, "waiting before the next explorer request");
        tokio::time::sleep(*anonymous_delay).await;
    }

    debug!(%address, "fetching creation info");
    let creation = explorer.get_creation(address, api_key).await?;

    let declared = solc_config.declared_remappings();
    solc_config.set_declared_remappings(&regulate_declared_remappings(&declared, &tree.remappings()));
    let main_file = tree.main_file(&metadata.contract_name).unwrap_or_default().to_string();
    let record = CloneRecord {
        address,
        folder: destination.to_string_lossy().into_owned(),
        main_file,
        chain_id: chain.id(),
        creation_transaction: creation.tx_hash,
        deployer: creation.contract_creator,
        constructor_arguments: metadata.constructor_arguments.clone(),
        solc_config,
        cloned_files: tree.all_files(),
    };

    debug!("appending clone record");
    journal.append(record.clone())?;
    progress!(quiet, %address, files = record.cloned_files.len(), "contract cloned");
    Ok(record)
}
