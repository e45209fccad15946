//! Deploy-then-initialize procedures, directly or behind a transparent proxy

use alloy::{
    json_abi::JsonAbi,
    network::TransactionBuilder,
    primitives::{Address, Bytes, B256, U256},
    rpc::types::TransactionRequest,
    sol_types::{SolCall, SolValue},
};
use tracing::info;

use crate::{
    client::ScriptContext,
    constants::{
        ADMIN_STORAGE_SLOT, IMPLEMENTATION_STORAGE_SLOT, PROXY_ADMIN, PROXY_INITIAL_OWNER_PARAM,
        TRANSPARENT_PROXY,
    },
    errors::ScriptError,
    gas::{actual_tx_gas_cost, tx_gas_cost},
    manifest::{DeployTransaction, DeploymentRecord},
    solidity::initializeCall,
};

/// A contract created on-chain, before it is recorded
#[derive(Clone, Debug)]
pub struct Deployed {
    /// The contract address
    pub address: Address,
    /// The creating transaction
    pub deploy_transaction: DeployTransaction,
}

/// The calldata of `initialize(initiator)`
pub fn initialize_calldata(initiator: Address) -> Bytes {
    initializeCall { initiator }.abi_encode().into()
}

/// The encoded constructor arguments of `TransparentUpgradeableProxy`
pub fn proxy_constructor_args(implementation: Address, admin: Address, data: Bytes) -> Bytes {
    (implementation, admin, data).abi_encode_params().into()
}

/// Deploy a contract's creation bytecode with encoded constructor arguments
pub async fn deploy_bytecode(
    ctx: &ScriptContext,
    name: &str,
    constructor_args: &[u8],
) -> Result<Deployed, ScriptError> {
    let artifact = ctx.artifacts.load(name)?;
    let mut code = artifact.bytecode.to_vec();
    code.extend_from_slice(constructor_args);

    let tx = TransactionRequest::default().with_deploy_code(code);
    let (receipt, gas_limit) = ctx.send_transaction(tx).await?;
    let address = receipt.contract_address.ok_or_else(|| {
        ScriptError::ContractDeployment(format!("no contract address in receipt of {name}"))
    })?;

    let deploy_transaction = DeployTransaction {
        hash: receipt.transaction_hash,
        from: receipt.from,
        block_number: receipt.block_number,
        gas_limit,
        gas_price: U256::from(receipt.effective_gas_price),
        gas_used: receipt.gas_used,
    };
    log_deployment(ctx, name, address, &deploy_transaction);

    Ok(Deployed { address, deploy_transaction })
}

/// Deploy a contract directly and save it to the manifest, optionally calling
/// `initialize(deployer)` afterwards
pub async fn deploy_direct(
    ctx: &ScriptContext,
    name: &str,
    constructor_args: &[u8],
    constructor_args_display: Vec<String>,
    initialize: bool,
) -> Result<DeploymentRecord, ScriptError> {
    info!("  Deploying {name}...");
    let deployed = deploy_bytecode(ctx, name, constructor_args).await?;

    let record = DeploymentRecord {
        contract_name: Some(name.to_string()),
        address: deployed.address,
        abi: Some(ctx.artifacts.contract_abi(name)?),
        deploy_transaction: Some(deployed.deploy_transaction),
        constructor_args: constructor_args_display,
        ..Default::default()
    };
    ctx.store.save(name, &record, false)?;

    if initialize {
        info!("  Initializing {name}...");
        let tx = TransactionRequest::default()
            .with_to(deployed.address)
            .with_input(initialize_calldata(ctx.deployer()));
        ctx.send_transaction(tx).await?;
    }

    Ok(record)
}

/// Who the second constructor argument of a transparent proxy designates
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProxyOwnership {
    /// OpenZeppelin v4: the address of an existing `ProxyAdmin`
    SharedAdmin,
    /// OpenZeppelin v5: the owner of the `ProxyAdmin` the proxy creates itself
    InitialOwner,
}

impl ProxyOwnership {
    /// Read the proxy flavour off its constructor
    pub fn from_abi(abi: &JsonAbi) -> Self {
        let is_owner = abi
            .constructor()
            .and_then(|c| c.inputs.get(1))
            .is_some_and(|input| input.name == PROXY_INITIAL_OWNER_PARAM);
        if is_owner {
            ProxyOwnership::InitialOwner
        } else {
            ProxyOwnership::SharedAdmin
        }
    }
}

/// Deploy a contract behind a transparent proxy initialized with
/// `initialize(deployer)`, and save the proxy to the manifest under `name`
pub async fn deploy_proxy(
    ctx: &ScriptContext,
    name: &str,
) -> Result<DeploymentRecord, ScriptError> {
    info!("  Deploying {name} implementation...");
    let implementation = deploy_bytecode(ctx, name, &[]).await?;

    let ownership = ProxyOwnership::from_abi(&ctx.artifacts.load(TRANSPARENT_PROXY)?.abi);
    let admin = match ownership {
        ProxyOwnership::SharedAdmin => ensure_proxy_admin(ctx).await?,
        ProxyOwnership::InitialOwner => ctx.deployer(),
    };

    info!("  Deploying {name} proxy...");
    let init_data = initialize_calldata(ctx.deployer());
    let args = proxy_constructor_args(implementation.address, admin, init_data.clone());
    let proxy = deploy_bytecode(ctx, TRANSPARENT_PROXY, &args).await?;

    // A v5 proxy creates its own admin; record whichever one the proxy reports
    let reported_admin = slot_address(ctx.storage_at(proxy.address, ADMIN_STORAGE_SLOT).await?);
    let proxy_admin = match ownership {
        ProxyOwnership::SharedAdmin if reported_admin.is_zero() => admin,
        _ => reported_admin,
    };

    let record = DeploymentRecord {
        contract_name: Some(name.to_string()),
        address: proxy.address,
        abi: Some(ctx.artifacts.contract_abi(name)?),
        deploy_transaction: Some(proxy.deploy_transaction),
        implementation: Some(implementation.address),
        proxy_admin: Some(proxy_admin),
        constructor_args: vec![
            format!("{:#x}", implementation.address),
            format!("{admin:#x}"),
            init_data.to_string(),
        ],
    };
    ctx.store.save(name, &record, false)?;

    info!("   - Proxy:          {:#x}", proxy.address);
    info!("   - Implementation: {:#x}", implementation.address);
    info!("   - Proxy Admin:    {proxy_admin:#x}");
    Ok(record)
}

/// The network's proxy admin: reused from the manifest, or deployed and saved
pub async fn ensure_proxy_admin(ctx: &ScriptContext) -> Result<Address, ScriptError> {
    if ctx.store.exists(PROXY_ADMIN) {
        let address = ctx.store.address(PROXY_ADMIN)?;
        info!("  Using existing {PROXY_ADMIN} at {address:#x}");
        return Ok(address);
    }

    // Older admins take no constructor arguments, newer ones take their owner
    let abi = ctx.artifacts.load(PROXY_ADMIN)?.abi;
    let takes_owner = abi.constructor().is_some_and(|c| c.inputs.len() == 1);
    let (args, display) = if takes_owner {
        (ctx.deployer().abi_encode(), vec![format!("{:#x}", ctx.deployer())])
    } else {
        (Vec::new(), Vec::new())
    };

    let record = deploy_direct(ctx, PROXY_ADMIN, &args, display, false).await?;
    Ok(record.address)
}

/// The implementation behind a proxied deployment: the recorded one, or the
/// one held in the proxy's EIP-1967 slot
pub async fn resolve_implementation(
    ctx: &ScriptContext,
    name: &str,
) -> Result<Option<Address>, ScriptError> {
    let record = ctx.store.load(name)?;
    if let Some(implementation) = record.implementation {
        return Ok(Some(implementation));
    }

    let word = ctx.storage_at(record.address, IMPLEMENTATION_STORAGE_SLOT).await?;
    let implementation = slot_address(word);
    Ok((!implementation.is_zero()).then_some(implementation))
}

/// The address held in the low 20 bytes of a storage word
pub fn slot_address(word: U256) -> Address {
    Address::from_word(B256::from(word.to_be_bytes::<32>()))
}

/// Log the address, block and cost of a deployment
fn log_deployment(ctx: &ScriptContext, name: &str, address: Address, tx: &DeployTransaction) {
    info!("   - {name}: {address:#x}");
    if let Some(block) = tx.block_number {
        info!("     - Block: {block}");
    }

    let cost = if ctx.report_gas {
        actual_tx_gas_cost(tx.gas_used, tx.gas_limit, tx.gas_price)
    } else {
        tx_gas_cost(tx.gas_limit, tx.gas_price)
    };
    info!("     - Gas Cost: {cost}");
}

#[cfg(test)]
mod tests {
    use alloy::primitives::hex;

    use super::*;

    #[test]
    fn test_proxy_constructor_args_layout() {
        let implementation = Address::repeat_byte(0x11);
        let admin = Address::repeat_byte(0x22);
        let data = initialize_calldata(Address::repeat_byte(0x33));
        let encoded = proxy_constructor_args(implementation, admin, data.clone());

        // two static words, a bytes offset, a length word, then the padded payload
        assert_eq!(encoded.len(), 32 * 4 + 64);
        assert_eq!(&encoded[12..32], implementation.as_slice());
        assert_eq!(&encoded[44..64], admin.as_slice());
        assert_eq!(U256::from_be_slice(&encoded[64..96]), U256::from(96u64));
        assert_eq!(U256::from_be_slice(&encoded[96..128]), U256::from(data.len()));
        assert_eq!(&encoded[128..128 + data.len()], data.as_ref());
    }

    /// A proxy ABI holding just a constructor with the given parameter names
    fn proxy_abi(params: [&str; 3]) -> JsonAbi {
        let inputs: Vec<_> = params
            .iter()
            .zip(["address", "address", "bytes"])
            .map(|(name, ty)| serde_json::json!({ "name": name, "type": ty, "internalType": ty }))
            .collect();
        serde_json::from_value(serde_json::json!([
            { "type": "constructor", "inputs": inputs, "stateMutability": "payable" }
        ]))
        .unwrap()
    }

    #[test]
    fn test_proxy_ownership_from_constructor() {
        assert_eq!(
            ProxyOwnership::from_abi(&proxy_abi(["_logic", "admin_", "_data"])),
            ProxyOwnership::SharedAdmin
        );
        assert_eq!(
            ProxyOwnership::from_abi(&proxy_abi(["_logic", "initialOwner", "_data"])),
            ProxyOwnership::InitialOwner
        );
        // No constructor at all is treated as the shared-admin layout
        assert_eq!(ProxyOwnership::from_abi(&JsonAbi::new()), ProxyOwnership::SharedAdmin);
    }

    #[test]
    fn test_slot_address() {
        let mut word = [0xffu8; 32];
        word[12..].copy_from_slice(Address::repeat_byte(0x42).as_slice());
        // Only the low 20 bytes are read
        assert_eq!(slot_address(U256::from_be_bytes(word)), Address::repeat_byte(0x42));
        assert!(slot_address(U256::ZERO).is_zero());
    }

    #[test]
    fn test_initialize_calldata_displays_as_hex() {
        let data = initialize_calldata(Address::ZERO);
        assert_eq!(data.to_string(), format!("0xc4d66de8{}", hex::encode([0u8; 32])));
    }
}
