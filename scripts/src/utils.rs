//! Utilities shared by the scripts

use alloy::primitives::Address;
use tracing::info;

use crate::{
    chain::Chain,
    client::ScriptContext,
    constants::{
        FAKE_USDC, GOERLI_CHAIN_ID, GOERLI_USDC, IPFS_GATEWAY, MAINNET_USDC,
        PROD_METADATA_BASE_URI, STAGING_METADATA_BASE_URI,
    },
    errors::ScriptError,
    manifest::DeploymentStore,
};

/// The canonical USDC deployment of a chain, if the scripts know one
pub fn canonical_usdc(chain: Chain) -> Option<Address> {
    if chain.is_prod() {
        Some(MAINNET_USDC)
    } else if chain.id() == GOERLI_CHAIN_ID {
        Some(GOERLI_USDC)
    } else {
        None
    }
}

/// The token fees are paid in: an explicit override, else the recorded
/// FakeUSDC off production, else the chain's canonical USDC
pub fn resolve_fee_token(
    chain: Chain,
    store: &DeploymentStore,
    fee_token: Option<Address>,
) -> Result<Address, ScriptError> {
    if let Some(token) = fee_token {
        return Ok(token);
    }
    if !chain.is_prod() && store.exists(FAKE_USDC) {
        return store.address(FAKE_USDC);
    }
    canonical_usdc(chain).ok_or_else(|| {
        ScriptError::ReadDeployments(format!(
            "no {FAKE_USDC} deployment and no canonical USDC on {chain}"
        ))
    })
}

/// The project metadata API serving base token URIs on a chain
pub fn metadata_base_uri(chain: Chain) -> &'static str {
    if chain.is_prod() {
        PROD_METADATA_BASE_URI
    } else {
        STAGING_METADATA_BASE_URI
    }
}

/// Rewrite `ipfs://` URIs to the public gateway; other URIs pass through
pub fn resolve_token_uri(uri: &str) -> String {
    match uri.strip_prefix("ipfs://") {
        Some(path) => format!("{IPFS_GATEWAY}{}", path.trim_start_matches("ipfs/")),
        None => uri.to_string(),
    }
}

/// Load a recorded contract address, logging where it was loaded from
pub fn load_address(ctx: &ScriptContext, name: &str) -> Result<Address, ScriptError> {
    let address = ctx.store.address(name)?;
    info!("  Loading {name} from: {address:#x}");
    Ok(address)
}
