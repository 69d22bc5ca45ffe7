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

//! Wire shapes of the explorer API and their decoders.
//!
//! Raw types mirror the JSON exactly and accept anything that has the right
//! shape. The `decode_*` functions turn them into typed values, running every
//! field check as a plain predicate and failing with [`CloneError::Decode`].

use alloy_primitives::{Address, Bytes, TxHash};
use semver::{BuildMetadata, Version};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Map, Value};

use crate::{journal::SolcConfig, source::SourceTree, CloneError, Result};

/// Marker the explorer puts in the ABI field of unverified contracts.
pub const NOT_VERIFIED_ABI: &str = "Contract source code not verified";

/// Compiler-version prefix of Vyper contracts.
pub const VYPER_PREFIX: &str = "vyper:";

/// Response envelope shared by every explorer endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    /// `"1"` on success.
    #[serde(deserialize_with = "lenient_string")]
    pub status: String,
    /// Human-readable status.
    #[serde(default)]
    pub message: String,
    /// The payload, or an error description on failure.
    #[serde(default)]
    pub result: Value,
}

impl Envelope {
    /// Unwrap the first item of a successful response.
    pub fn into_first<T: serde::de::DeserializeOwned>(self) -> Result<T> {
        if self.status != "1" {
            let result = match self.result {
                Value::String(s) => s,
                other => other.to_string(),
            };
            return Err(CloneError::Explorer { message: self.message, result });
        }
        let first = match self.result {
            Value::Array(items) => items.into_iter().next(),
            _ => None,
        }
        .ok_or_else(|| CloneError::Decode("expected a non-empty result list".to_string()))?;
        serde_json::from_value(first).map_err(|e| CloneError::Decode(e.to_string()))
    }
}

/// Contract metadata as returned by `getsourcecode`.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RawMetadata {
    #[serde(deserialize_with = "lenient_string")]
    pub source_code: String,
    #[serde(rename = "ABI", deserialize_with = "lenient_string")]
    pub abi: String,
    #[serde(deserialize_with = "lenient_string")]
    pub contract_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub compiler_version: String,
    #[serde(deserialize_with = "lenient_string")]
    pub optimization_used: String,
    #[serde(deserialize_with = "lenient_string")]
    pub runs: String,
    #[serde(deserialize_with = "lenient_string")]
    pub constructor_arguments: String,
    #[serde(rename = "EVMVersion", deserialize_with = "lenient_string")]
    pub evm_version: String,
    #[serde(deserialize_with = "lenient_string")]
    pub library: String,
    #[serde(deserialize_with = "lenient_string")]
    pub license_type: String,
    #[serde(deserialize_with = "lenient_string")]
    pub proxy: String,
    #[serde(deserialize_with = "lenient_string")]
    pub implementation: String,
    #[serde(deserialize_with = "lenient_string")]
    pub swarm_source: String,
}

/// Contract creation info as returned by `getcontractcreation`.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawCreation {
    #[serde(deserialize_with = "lenient_string")]
    pub contract_address: String,
    #[serde(deserialize_with = "lenient_string")]
    pub contract_creator: String,
    #[serde(deserialize_with = "lenient_string")]
    pub tx_hash: String,
}

/// Verified contract metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    /// Raw source bundle; see [`Metadata::source_bundle`].
    pub source_code: String,
    /// The ABI, as a JSON string.
    pub abi: String,
    /// Name of the verified contract.
    pub contract_name: String,
    /// Compiler version string, e.g. `v0.8.19+commit.7dd6d404`.
    pub compiler_version: String,
    /// Whether the optimizer was enabled.
    pub optimization_used: bool,
    /// Optimizer runs.
    pub runs: u64,
    /// ABI-encoded constructor arguments.
    pub constructor_arguments: Bytes,
    /// Target EVM version, or `Default`.
    pub evm_version: String,
    /// Linked libraries, as reported.
    pub library: String,
    /// License identifier.
    pub license_type: String,
    /// Whether the explorer flags the contract as a proxy.
    pub proxy: bool,
    /// The implementation address of a proxy.
    pub implementation: Option<Address>,
    /// Swarm source, if any.
    pub swarm_source: Option<String>,
}

/// Contract creation info.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Creation {
    /// The created contract.
    pub contract_address: Address,
    /// Sender of the creation transaction.
    pub contract_creator: Address,
    /// The creation transaction.
    pub tx_hash: TxHash,
}

/// The source files of a verified contract.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceBundle {
    /// A flattened contract, reported as one blob.
    Single {
        /// Name of the contract the blob declares.
        contract_name: String,
        /// The source text.
        content: String,
    },
    /// A multi-file compiler input.
    Multi {
        /// `(source name, content)` pairs in declaration order.
        sources: Vec<(String, String)>,
        /// Compiler settings, when the bundle is a standard-JSON input.
        settings: Option<Map<String, Value>>,
    },
}

/// Decode a `getsourcecode` item.
///
/// Fails with [`CloneError::NotVerified`] when the explorer reports no source.
pub fn decode_metadata(address: Address, raw: RawMetadata) -> Result<Metadata> {
    if raw.abi == NOT_VERIFIED_ABI || raw.source_code.is_empty() {
        return Err(CloneError::NotVerified { address });
    }

    let optimization_used = decode_flag("OptimizationUsed", &raw.optimization_used)?;
    let proxy = decode_flag("Proxy", &raw.proxy)?;
    let runs = if raw.runs.is_empty() {
        0
    } else {
        raw.runs.parse().map_err(|_| CloneError::Decode(format!("invalid Runs: {}", raw.runs)))?
    };
    let constructor_arguments = decode_hex("ConstructorArguments", &raw.constructor_arguments)?;
    let implementation = if raw.implementation.is_empty() {
        None
    } else {
        Some(decode_address("Implementation", &raw.implementation)?)
    };

    Ok(Metadata {
        source_code: raw.source_code,
        abi: raw.abi,
        contract_name: raw.contract_name,
        compiler_version: raw.compiler_version,
        optimization_used,
        runs,
        constructor_arguments,
        evm_version: raw.evm_version,
        library: raw.library,
        license_type: raw.license_type,
        proxy,
        implementation,
        swarm_source: Some(raw.swarm_source).filter(|s| !s.is_empty()),
    })
}

/// Decode a `getcontractcreation` item.
pub fn decode_creation(raw: RawCreation) -> Result<Creation> {
    let tx_hash = raw
        .tx_hash
        .parse()
        .map_err(|_| CloneError::Decode(format!("invalid txHash: {}", raw.tx_hash)))?;
    Ok(Creation {
        contract_address: decode_address("contractAddress", &raw.contract_address)?,
        contract_creator: decode_address("contractCreator", &raw.contract_creator)?,
        tx_hash,
    })
}

impl Metadata {
    /// Whether the contract was written in Vyper.
    pub fn is_vyper(&self) -> bool {
        self.compiler_version.starts_with(VYPER_PREFIX)
    }

    /// The compiler version as a semantic version, without build metadata.
    ///
    /// Pre-release tags written as `a`/`b` suffixes are accepted.
    pub fn compiler_semver(&self) -> Result<Version> {
        let raw = self.compiler_version.replacen(VYPER_PREFIX, "", 1).replacen('v', "", 1);
        let mut version = Version::parse(&raw)
            .or_else(|_| Version::parse(&raw.replacen('a', "-alpha.", 1).replacen('b', "-beta.", 1)))
            .map_err(|_| {
                CloneError::Decode(format!("invalid compiler version: {}", self.compiler_version))
            })?;
        version.build = BuildMetadata::EMPTY;
        Ok(version)
    }

    /// Split the raw source bundle into files.
    pub fn source_bundle(&self) -> Result<SourceBundle> {
        let code = self.source_code.trim();
        if !code.starts_with('{') {
            return Ok(SourceBundle::Single {
                contract_name: self.contract_name.clone(),
                content: self.source_code.clone(),
            });
        }

        // Standard-JSON inputs are wrapped in one extra pair of braces.
        let json = if code.starts_with("{{") && code.ends_with("}}") {
            &code[1..code.len() - 1]
        } else {
            code
        };
        let value: Value = serde_json::from_str(json)
            .map_err(|e| CloneError::Decode(format!("invalid multi-file source: {e}")))?;
        let Value::Object(mut object) = value else {
            return Err(CloneError::Decode("multi-file source is not an object".to_string()));
        };

        let (sources, settings) = match object.remove("sources") {
            Some(Value::Object(sources)) => {
                let settings = match object.remove("settings") {
                    Some(Value::Object(settings)) => Some(settings),
                    None | Some(Value::Null) => None,
                    Some(_) => {
                        return Err(CloneError::Decode("settings is not an object".to_string()))
                    }
                };
                (sources, settings)
            }
            Some(_) => return Err(CloneError::Decode("sources is not an object".to_string())),
            // older form: a bare map of files
            None => (object, None),
        };

        let sources = sources
            .into_iter()
            .map(|(name, file)| match file.get("content").and_then(Value::as_str) {
                Some(content) => Ok((name, content.to_string())),
                None => Err(CloneError::Decode(format!("source {name} has no content"))),
            })
            .collect::<Result<_>>()?;
        Ok(SourceBundle::Multi { sources, settings })
    }

    /// Build the source tree of the contract.
    pub fn tree(&self) -> Result<SourceTree> {
        let tree = match self.source_bundle()? {
            SourceBundle::Single { contract_name, content } => {
                SourceTree::single_file(&contract_name, content)
            }
            SourceBundle::Multi { sources, .. } => SourceTree::build(sources),
        };
        tree.validate()?;
        Ok(tree)
    }

    /// The compiler configuration the contract was verified with.
    pub fn solc_config(&self) -> Result<SolcConfig> {
        let version = self.compiler_semver()?;
        let settings = match self.source_bundle()? {
            SourceBundle::Multi { settings: Some(settings), .. } => settings,
            _ => self.synthesized_settings(),
        };
        Ok(SolcConfig { version, settings })
    }

    fn synthesized_settings(&self) -> Map<String, Value> {
        let mut settings = Map::new();
        settings.insert(
            "optimizer".to_string(),
            json!({ "enabled": self.optimization_used, "runs": self.runs }),
        );
        settings.insert("outputSelection".to_string(), json!({ "*": { "*": ["*"] } }));
        if !self.evm_version.is_empty() && !self.evm_version.eq_ignore_ascii_case("default") {
            settings.insert("evmVersion".to_string(), Value::String(self.evm_version.clone()));
        }
        settings
    }
}

fn decode_flag(field: &str, value: &str) -> Result<bool> {
    match value {
        "" | "0" => Ok(false),
        "1" => Ok(true),
        other => Err(CloneError::Decode(format!("invalid {field}: {other}"))),
    }
}

fn decode_hex(field: &str, value: &str) -> Result<Bytes> {
    let value = value.strip_prefix("0x").unwrap_or(value);
    hex::decode(value)
        .map(Bytes::from)
        .map_err(|e| CloneError::Decode(format!("invalid {field}: {e}")))
}

fn decode_address(field: &str, value: &str) -> Result<Address> {
    value.parse().map_err(|_| CloneError::Decode(format!("invalid {field}: {value}")))
}

/// Accept strings, numbers, booleans and null where the API documents a string.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        Value::Bool(b) => u8::from(b).to_string(),
        other => other.to_string(),
    })
}
