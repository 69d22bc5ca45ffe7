//! Clone command - fetch a verified contract into the project

use std::{path::PathBuf, str::FromStr, time::Duration};

use alloy_chains::Chain;
use alloy_primitives::Address;
use clap::Args;
use eyre::Result;
use solclone_common::{ApiKeyPool, DEFAULT_ETHERSCAN_CACHE_TTL};
use solclone_engine::{clone_contract, CloneOptions, EtherscanExplorer, Project};

/// Arguments of the `clone` command
#[derive(Debug, Args)]
pub struct CloneArgs {
    /// Chain the contract is deployed on, by id or name
    #[arg(long, default_value = "mainnet", value_parser = parse_chain)]
    pub chain: Chain,

    /// Explorer API key; falls back to the first key of ETHERSCAN_API_KEYS
    #[arg(long, env = "ETHERSCAN_API_KEY")]
    pub etherscan_api_key: Option<String>,

    /// Explorer API endpoint, overriding the chain's default
    #[arg(long)]
    pub explorer_url: Option<String>,

    /// Only report errors
    #[arg(long, short)]
    pub quiet: bool,

    /// Do not cache explorer responses
    #[arg(long)]
    pub no_cache: bool,

    /// Cache directory for explorer responses (default: ~/.solclone/cache)
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Address of the contract, with or without the 0x prefix
    #[arg(value_parser = parse_address)]
    pub address: Address,

    /// Folder, relative to the project root, to clone into
    #[arg(default_value = ".")]
    pub destination: PathBuf,
}

/// Clone the contract described by `args` into `project`
pub async fn clone(project: &Project, args: &CloneArgs) -> Result<()> {
    let mut explorer = match &args.explorer_url {
        Some(url) => EtherscanExplorer::with_url(args.chain, url),
        None => EtherscanExplorer::new(args.chain)?,
    };
    if !args.no_cache {
        explorer = explorer.with_cache(
            args.cache_dir.clone(),
            Some(Duration::from_secs(DEFAULT_ETHERSCAN_CACHE_TTL)),
        );
    }

    let api_key = args.etherscan_api_key.clone().or_else(|| ApiKeyPool::from_env().next_key());
    let opts = CloneOptions::new(args.chain, args.address)
        .with_destination(args.destination.clone())
        .with_api_key(api_key)
        .with_quiet(args.quiet);

    let record = clone_contract(project, &explorer, &opts).await?;
    if !args.quiet {
        println!(
            "Cloned {} ({} files) into {}",
            record.address,
            record.cloned_files.len(),
            args.destination.display()
        );
    }
    Ok(())
}

fn parse_chain(s: &str) -> Result<Chain, String> {
    Chain::from_str(s).map_err(|e| format!("invalid chain `{s}`: {e}"))
}

fn parse_address(s: &str) -> Result<Address, String> {
    let hex = s.strip_prefix("0x").unwrap_or(s);
    Address::from_str(hex).map_err(|e| format!("invalid address `{s}`: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address_with_and_without_prefix() {
        let with = parse_address("0xdAC17F958D2ee523a2206206994597C13D831ec7").unwrap();
        let without = parse_address("dac17f958d2ee523a2206206994597c13d831ec7").unwrap();
        assert_eq!(with, without);
        assert!(parse_address("0x1234").is_err());
    }

    #[test]
    fn test_parse_chain_by_name_and_id() {
        assert_eq!(parse_chain("mainnet").unwrap(), Chain::mainnet());
        assert_eq!(parse_chain("1").unwrap(), Chain::mainnet());
        assert_eq!(parse_chain("31337").unwrap().id(), 31337);
    }
}
