//! The signing RPC client and the context shared by every script

use std::path::PathBuf;

use alloy::{
    contract::{CallBuilder, CallDecoder, Error as ContractError},
    network::{Ethereum, EthereumWallet, TransactionBuilder},
    primitives::{Address, B256, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::{TransactionReceipt, TransactionRequest},
    signers::local::{coins_bip39::English, MnemonicBuilder, PrivateKeySigner},
    transports::TransportError,
};
use tracing::info;

use crate::{
    artifacts::ArtifactStore,
    chain::Chain,
    config::{NamedAccount, NamedAccounts, NetworkConfig},
    constants::NUM_NAMED_ACCOUNTS,
    errors::ScriptError,
    executor::TxSummary,
    manifest::DeploymentStore,
};

/// The call builder type used by the scripts
pub type ScriptCallBuilder<'a, C> = CallBuilder<&'a DynProvider, C, Ethereum>;

/// The filesystem locations the scripts read from and write to
#[derive(Clone, Debug)]
pub struct ScriptPaths {
    /// Root of the deployment manifest
    pub deployments_dir: PathBuf,
    /// Compiler artifacts
    pub artifacts_dir: PathBuf,
    /// Flat ABI exports
    pub abis_dir: PathBuf,
    /// Proxy artifacts shipped with the OpenZeppelin upgrades plugin
    pub proxy_artifacts_dir: PathBuf,
}

/// Everything a script needs: the provider, the network, the named accounts
/// and the on-disk stores
pub struct ScriptContext {
    /// A provider signing with every named account, defaulting to the deployer
    pub provider: DynProvider,
    /// The network the script runs against
    pub network: NetworkConfig,
    /// The named account addresses
    pub accounts: NamedAccounts,
    /// The deployment manifest of the network
    pub store: DeploymentStore,
    /// Compiled contracts
    pub artifacts: ArtifactStore,
    /// Whether to log the gas cost of each transaction
    pub report_gas: bool,
}

/// Derive the named signers from a mnemonic
pub fn derive_signers(mnemonic: &str) -> Result<Vec<PrivateKeySigner>, ScriptError> {
    (0..NUM_NAMED_ACCOUNTS)
        .map(|index| {
            MnemonicBuilder::<English>::default()
                .phrase(mnemonic)
                .index(index)
                .and_then(|builder| builder.build())
                .map_err(|e| ScriptError::ClientInitialization(e.to_string()))
        })
        .collect()
}

impl ScriptContext {
    /// Connect to the network and check that it serves the expected chain
    pub async fn connect(
        network: NetworkConfig,
        paths: ScriptPaths,
        report_gas: bool,
    ) -> Result<Self, ScriptError> {
        let signers = derive_signers(&network.mnemonic)?;
        let accounts = NamedAccounts::new(signers.iter().map(|s| s.address()).collect())?;

        let mut signers = signers.into_iter();
        let deployer = signers.next().ok_or_else(|| {
            ScriptError::ClientInitialization("no signers derived".to_string())
        })?;
        let mut wallet = EthereumWallet::new(deployer);
        for signer in signers {
            wallet.register_signer(signer);
        }

        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect(&network.rpc_url)
            .await
            .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
        let provider = DynProvider::new(provider);

        let node_chain_id = provider
            .get_chain_id()
            .await
            .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
        check_chain_id(network.chain, node_chain_id)?;

        let store = DeploymentStore::new(&paths.deployments_dir, network.chain);
        let artifacts = ArtifactStore::new(paths.artifacts_dir, paths.abis_dir)
            .with_fallback(paths.proxy_artifacts_dir);

        Ok(Self { provider, network, accounts, store, artifacts, report_gas })
    }

    /// The chain the script runs against
    pub fn chain(&self) -> Chain {
        self.network.chain
    }

    /// The deployer address
    pub fn deployer(&self) -> Address {
        self.accounts.deployer()
    }

    /// The address of a named account
    pub fn account(&self, account: NamedAccount) -> Address {
        self.accounts.get(account)
    }

    /// Log the banner every script opens with
    pub fn banner(&self, title: &str) {
        info!("~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~");
        info!("Taggr - {title}");
        info!("~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~");
        info!(
            "  Using Network: {} ({}:{})",
            self.chain().name(),
            self.network.name,
            self.chain().id()
        );
        info!("  Using Accounts:");
        info!("  - Deployer:           {:#x}", self.deployer());
        info!("  - Owner:              {:#x}", self.accounts.protocol_owner());
    }

    /// Send a contract call from the deployer and wait for it to succeed
    pub async fn send_call<C: CallDecoder>(
        &self,
        call: ScriptCallBuilder<'_, C>,
    ) -> Result<TxSummary, ScriptError> {
        self.send_call_from(call, self.deployer()).await
    }

    /// Send a contract call from `from` and wait for it to succeed
    pub async fn send_call_from<C: CallDecoder>(
        &self,
        call: ScriptCallBuilder<'_, C>,
        from: Address,
    ) -> Result<TxSummary, ScriptError> {
        let pending = call
            .from(from)
            .gas_price(self.network.gas_price)
            .send()
            .await
            .map_err(describe_contract_error)?;

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
        TxSummary::from_receipt(&receipt)
    }

    /// Send a raw transaction from the deployer, filling in the gas price and
    /// gas limit, and wait for its receipt. Returns the receipt and gas limit.
    pub async fn send_transaction(
        &self,
        tx: TransactionRequest,
    ) -> Result<(TransactionReceipt, u64), ScriptError> {
        let mut tx = tx.with_from(self.deployer()).with_gas_price(self.network.gas_price);
        let gas_limit = self
            .provider
            .estimate_gas(tx.clone())
            .await
            .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?;
        tx.set_gas_limit(gas_limit);

        let receipt = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?
            .get_receipt()
            .await
            .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?;

        if !receipt.status() {
            return Err(ScriptError::ContractDeployment(format!(
                "transaction {:#x} reverted",
                receipt.transaction_hash
            )));
        }
        Ok((receipt, gas_limit))
    }

    /// Read a storage slot of a contract
    pub async fn storage_at(&self, address: Address, slot: B256) -> Result<U256, ScriptError> {
        self.provider
            .get_storage_at(address, U256::from_be_bytes(slot.0))
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))
    }
}

/// Refuse to run against a node serving a different chain than the selected
/// network. Unknown networks (chain ID 0) are accepted as-is.
pub fn check_chain_id(expected: Chain, node_chain_id: u64) -> Result<(), ScriptError> {
    if expected.id() != 0 && expected.id() != node_chain_id {
        return Err(ScriptError::InvalidNetwork(format!(
            "expected chain {expected}, but the node serves chain ID {node_chain_id}"
        )));
    }
    Ok(())
}

/// Surface the node's revert message when a call is rejected
fn describe_contract_error(err: ContractError) -> ScriptError {
    let msg = match err {
        ContractError::TransportError(TransportError::ErrorResp(payload)) => {
            let data = payload.data.map(|d| d.get().to_string()).unwrap_or_default();
            format!("{} (data = {data})", payload.message)
        }
        other => other.to_string(),
    };
    ScriptError::ContractInteraction(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEV_MNEMONIC;

    #[test]
    fn test_dev_mnemonic_derives_the_well_known_accounts() {
        let signers = derive_signers(DEV_MNEMONIC).unwrap();
        assert_eq!(signers.len(), 10);
        assert_eq!(
            format!("{:#x}", signers[0].address()),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
        assert_eq!(
            format!("{:#x}", signers[1].address()),
            "0x70997970c51812dc3a010c7d01b50e0d17dc79c8"
        );
    }

    #[test]
    fn test_chain_id_guard() {
        assert!(check_chain_id(Chain(5), 5).is_ok());
        assert!(check_chain_id(Chain(0), 12345).is_ok());
        assert!(matches!(check_chain_id(Chain(1), 31337), Err(ScriptError::InvalidNetwork(_))));
    }
}
