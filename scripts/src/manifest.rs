//! The deployment manifest: one JSON record per contract per network, stored at
//! `<deployments>/<network>/<ContractName>.json`

use std::{
    fs,
    path::{Path, PathBuf},
};

use alloy::{
    json_abi::JsonAbi,
    primitives::{Address, B256, U256},
};
use serde::{Deserialize, Serialize};
use serde_json::{ser::PrettyFormatter, Map, Serializer, Value};
use tracing::debug;

use crate::{chain::Chain, errors::ScriptError};

/// The transaction that created a deployment
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployTransaction {
    /// The transaction hash
    pub hash: B256,
    /// The sender
    pub from: Address,
    /// The block the transaction was included in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    /// The gas limit the transaction was sent with
    pub gas_limit: u64,
    /// The effective gas price paid
    pub gas_price: U256,
    /// The gas actually consumed
    pub gas_used: u64,
}

/// A deployment record as stored in the manifest
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    /// The name the contract was deployed under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_name: Option<String>,
    /// The address callers interact with; the proxy address for proxied contracts
    pub address: Address,
    /// The contract ABI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abi: Option<JsonAbi>,
    /// The creating transaction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deploy_transaction: Option<DeployTransaction>,
    /// The implementation behind a proxy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implementation: Option<Address>,
    /// The admin of a proxy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_admin: Option<Address>,
    /// Stringified constructor arguments, passed through to verification
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constructor_args: Vec<String>,
}

impl DeploymentRecord {
    /// A record holding just a name and an address
    pub fn new(contract_name: &str, address: Address) -> Self {
        Self { contract_name: Some(contract_name.to_string()), address, ..Default::default() }
    }
}

/// Reads and writes deployment records for a single chain
#[derive(Clone, Debug)]
pub struct DeploymentStore {
    /// The directory holding this chain's records
    dir: PathBuf,
    /// The chain the records belong to
    chain: Chain,
}

impl DeploymentStore {
    /// Open the store of `chain` below the deployments root
    pub fn new(root: impl AsRef<Path>, chain: Chain) -> Self {
        Self { dir: root.as_ref().join(chain.dir_name()), chain }
    }

    /// The directory holding this chain's records
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The path of a contract's record
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    /// Whether a record exists for the contract
    pub fn exists(&self, name: &str) -> bool {
        self.path(name).exists()
    }

    /// Save a record, merging it over any existing one unless `overwrite` is set
    pub fn save(
        &self,
        name: &str,
        record: &DeploymentRecord,
        overwrite: bool,
    ) -> Result<(), ScriptError> {
        let value = serde_json::to_value(record)
            .map_err(|e| ScriptError::WriteDeployments(e.to_string()))?;
        self.save_value(name, value, overwrite)
    }

    /// Save a raw JSON record with the same merge semantics as [`Self::save`]
    pub fn save_value(&self, name: &str, value: Value, overwrite: bool) -> Result<(), ScriptError> {
        let path = self.path(name);

        let mut merged = if !overwrite && path.exists() {
            self.load_value(name)?
        } else {
            Value::Object(Map::new())
        };
        merge_json(&mut merged, value);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ScriptError::WriteDeployments(e.to_string()))?;
        }
        fs::write(&path, to_tab_indented(&merged)?)
            .map_err(|e| ScriptError::WriteDeployments(e.to_string()))?;

        debug!("saved deployment record {}", path.display());
        Ok(())
    }

    /// Load a contract's record
    pub fn load(&self, name: &str) -> Result<DeploymentRecord, ScriptError> {
        let value = self.load_value(name)?;
        serde_json::from_value(value).map_err(|e| {
            ScriptError::ReadDeployments(format!("malformed record for {name}: {e}"))
        })
    }

    /// Load the address of a deployed contract
    pub fn address(&self, name: &str) -> Result<Address, ScriptError> {
        self.load(name).map(|record| record.address)
    }

    /// Load a contract's record as raw JSON
    pub fn load_value(&self, name: &str) -> Result<Value, ScriptError> {
        let path = self.path(name);
        if !path.exists() {
            return Err(ScriptError::ReadDeployments(format!(
                "no deployment of {name} on {}",
                self.chain
            )));
        }

        let contents =
            fs::read_to_string(&path).map_err(|e| ScriptError::ReadDeployments(e.to_string()))?;
        serde_json::from_str(&contents).map_err(|e| ScriptError::ReadDeployments(e.to_string()))
    }
}

/// Merge `update` into `base`: objects merge key by key, everything else is replaced
pub fn merge_json(base: &mut Value, update: Value) {
    match (base, update) {
        (Value::Object(base), Value::Object(update)) => {
            for (key, value) in update {
                match base.get_mut(&key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, update) => *base = update,
    }
}

/// Serialize a JSON value with tab indentation
fn to_tab_indented(value: &Value) -> Result<Vec<u8>, ScriptError> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"\t"));
    value.serialize(&mut ser).map_err(|e| ScriptError::WriteDeployments(e.to_string()))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::tempdir;

    use super::*;

    const GOERLI: Chain = Chain(5);

    #[test]
    fn test_records_live_under_the_chain_name() {
        let dir = tempdir().unwrap();
        let store = DeploymentStore::new(dir.path(), GOERLI);

        store.save("Taggr", &DeploymentRecord::new("Taggr", Address::repeat_byte(1)), false).unwrap();

        assert!(dir.path().join("goerli").join("Taggr.json").exists());
        assert!(store.exists("Taggr"));
        assert_eq!(store.address("Taggr").unwrap(), Address::repeat_byte(1));
    }

    #[test]
    fn test_localhost_shares_the_hardhat_directory() {
        let dir = tempdir().unwrap();
        let store = DeploymentStore::new(dir.path(), Chain::from_network_name("localhost"));
        assert_eq!(store.path("Taggr"), dir.path().join("hardhat").join("Taggr.json"));
    }

    #[test]
    fn test_latest_write_wins() {
        let dir = tempdir().unwrap();
        let store = DeploymentStore::new(dir.path(), GOERLI);

        let mut record = DeploymentRecord::new("TokenEscrow", Address::repeat_byte(1));
        record.implementation = Some(Address::repeat_byte(2));
        store.save("TokenEscrow", &record, false).unwrap();

        let update = DeploymentRecord::new("TokenEscrow", Address::repeat_byte(3));
        store.save("TokenEscrow", &update, false).unwrap();

        let loaded = store.load("TokenEscrow").unwrap();
        assert_eq!(loaded.address, Address::repeat_byte(3));
        // Fields absent from the update survive the merge
        assert_eq!(loaded.implementation, Some(Address::repeat_byte(2)));
    }

    #[test]
    fn test_overwrite_discards_existing_fields() {
        let dir = tempdir().unwrap();
        let store = DeploymentStore::new(dir.path(), GOERLI);

        let mut record = DeploymentRecord::new("Taggr", Address::repeat_byte(1));
        record.proxy_admin = Some(Address::repeat_byte(9));
        store.save("Taggr", &record, false).unwrap();

        store.save("Taggr", &DeploymentRecord::new("Taggr", Address::repeat_byte(4)), true).unwrap();

        let loaded = store.load("Taggr").unwrap();
        assert_eq!(loaded.address, Address::repeat_byte(4));
        assert!(loaded.proxy_admin.is_none());
    }

    #[test]
    fn test_nested_merge_replaces_arrays() {
        let mut base = json!({
            "address": "0x01",
            "deployTransaction": { "hash": "0xaa", "gasUsed": 10 },
            "constructorArgs": ["a", "b", "c"],
        });
        let update = json!({
            "deployTransaction": { "gasUsed": 20 },
            "constructorArgs": ["d"],
        });
        merge_json(&mut base, update);

        assert_eq!(
            base,
            json!({
                "address": "0x01",
                "deployTransaction": { "hash": "0xaa", "gasUsed": 20 },
                "constructorArgs": ["d"],
            })
        );
    }

    #[test]
    fn test_files_are_tab_indented() {
        let dir = tempdir().unwrap();
        let store = DeploymentStore::new(dir.path(), GOERLI);
        store.save_value("PID", json!({ "address": Address::ZERO }), false).unwrap();

        let contents = fs::read_to_string(store.path("PID")).unwrap();
        assert!(contents.contains("\n\t\"address\""));
    }

    #[test]
    fn test_missing_record_names_contract_and_network() {
        let dir = tempdir().unwrap();
        let store = DeploymentStore::new(dir.path(), GOERLI);

        match store.load("NftDistributor") {
            Err(ScriptError::ReadDeployments(msg)) => {
                assert!(msg.contains("NftDistributor"));
                assert!(msg.contains("Goerli"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_deploy_transaction_round_trips_camel_case() {
        let tx = DeployTransaction {
            hash: B256::repeat_byte(7),
            from: Address::repeat_byte(8),
            block_number: Some(12),
            gas_limit: 100,
            gas_price: U256::from(5u64),
            gas_used: 90,
        };
        let value = serde_json::to_value(&tx).unwrap();
        assert!(value.get("blockNumber").is_some());
        assert!(value.get("gasLimit").is_some());
        assert_eq!(serde_json::from_value::<DeployTransaction>(value).unwrap(), tx);
    }
}
