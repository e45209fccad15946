//! The `merkle` script: pushes a project's claim Merkle root

use std::fs;

use alloy::{
    contract::CallBuilder,
    primitives::{Address, Bytes, B256},
    sol_types::SolCall,
};
use serde_json::json;
use tracing::info;

use crate::{
    cli::MerkleArgs,
    client::ScriptContext,
    config::{NamedAccount, NamedAccounts},
    constants::NFT_DISTRIBUTOR,
    errors::ScriptError,
    merkle::{parse_sources, MerkleTree},
    solidity::INftDistributor::{setMerkleRootCall, setMerkleRootForProjectCall},
    utils::load_address,
};

use super::log_complete;

/// The distributor entry point a root is pushed through
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RootSetter {
    /// `setMerkleRootForProject`, callable by the distributor owner (the deployer)
    Owner,
    /// `setMerkleRoot`, callable by the project's manager
    Manager(NamedAccount),
}

impl RootSetter {
    /// The account the transaction is sent from
    fn sender(&self, accounts: &NamedAccounts) -> Address {
        match self {
            RootSetter::Owner => accounts.deployer(),
            RootSetter::Manager(account) => accounts.get(*account),
        }
    }

    /// The calldata setting `root` for `project_id`
    fn calldata(&self, project_id: &str, root: B256) -> Bytes {
        let project_id = project_id.to_string();
        match self {
            RootSetter::Owner => {
                setMerkleRootForProjectCall { projectId: project_id, root }.abi_encode()
            },
            RootSetter::Manager(_) => setMerkleRootCall { projectId: project_id, root }.abi_encode(),
        }
        .into()
    }
}

/// Set the root of a project on the distributor, building it from a leaves
/// file when no literal root is given
pub async fn run(args: MerkleArgs, ctx: &ScriptContext) -> Result<(), ScriptError> {
    ctx.banner("Set Merkle Root");

    let root = match (args.root, &args.leaves) {
        (Some(root), _) => root,
        (None, Some(path)) => {
            let contents = fs::read_to_string(path)
                .map_err(|e| ScriptError::Merkle(format!("{}: {e}", path.display())))?;
            let sources = parse_sources(&contents);
            let tree = MerkleTree::from_sources(&sources)?;
            info!("  Built tree of {} leaves from {}", tree.leaves().len(), path.display());

            if let Some(out) = &args.proofs_out {
                let proofs = tree.proofs_by_source(&sources)?;
                let output = json!({ "root": tree.root(), "proofs": proofs });
                let json = serde_json::to_string_pretty(&output)
                    .map_err(|e| ScriptError::Merkle(e.to_string()))?;
                fs::write(out, json)
                    .map_err(|e| ScriptError::Merkle(format!("{}: {e}", out.display())))?;
                info!("  Proofs written to {}", out.display());
            }
            tree.root()
        },
        (None, None) => {
            return Err(ScriptError::Merkle(
                "either a root or a leaves file is required".to_string(),
            ))
        },
    };

    let distributor = load_address(ctx, NFT_DISTRIBUTOR)?;
    let setter = args.manager.map_or(RootSetter::Owner, RootSetter::Manager);
    info!("  Setting Merkle Root for Project: \"{}\" with Root: {root:#x}", args.project_id);
    let call = CallBuilder::new_raw(&ctx.provider, setter.calldata(&args.project_id, root))
        .to(distributor);
    ctx.send_call_from(call, setter.sender(&ctx.accounts)).await?;

    log_complete("Merkle Root Set!");
    Ok(())
}
