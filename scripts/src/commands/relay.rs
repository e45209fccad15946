//! The `relay` script: deploys an NFT relay for a project and maps its tokens

use tracing::info;

use crate::{
    cli::RelayArgs,
    client::ScriptContext,
    constants::{NFT_DISTRIBUTOR, TAGGR_NFT_RELAY},
    deploy::deploy_bytecode,
    errors::ScriptError,
    manifest::DeploymentRecord,
    plans::{read_plan, RelayPlan},
    solidity::ITaggrNftRelay,
    utils::load_address,
};

use super::log_complete;

/// Deploy a relay, record it under the project ID, initialize it and map the
/// plan's tokens in batches
pub async fn run(args: RelayArgs, ctx: &ScriptContext) -> Result<(), ScriptError> {
    let plan: RelayPlan = read_plan(&args.plan)?;
    ctx.banner("Deploy NFT Relay");
    let distributor = load_address(ctx, NFT_DISTRIBUTOR)?;

    info!("Taggr: Deploying NFT Relay for Project {}", plan.project_name);
    let deployed = deploy_bytecode(ctx, TAGGR_NFT_RELAY, &[]).await?;
    let record = DeploymentRecord {
        contract_name: Some(TAGGR_NFT_RELAY.to_string()),
        address: deployed.address,
        abi: Some(ctx.artifacts.contract_abi(TAGGR_NFT_RELAY)?),
        deploy_transaction: Some(deployed.deploy_transaction),
        ..Default::default()
    };
    ctx.store.save(&plan.project_id, &record, false)?;

    let owner = plan.owner_address(&ctx.accounts);
    let holder = plan.nft_holder.resolve(&ctx.accounts);

    info!("Taggr: Initializing NFT Relay...");
    let relay = ITaggrNftRelay::new(deployed.address, ctx.provider.clone());
    ctx.send_call(relay.initialize(
        plan.project_name.clone(),
        owner,
        distributor,
        plan.nft_contract,
        holder,
    ))
    .await?;

    info!("Taggr: Mapping NFT Tokens for Relay...");
    for (token_ids, nft_token_ids) in plan.batches() {
        info!(" - Mapping {} tokens...", token_ids.len());
        ctx.send_call(relay.mapTokens(token_ids, nft_token_ids)).await?;
    }

    info!("Taggr: Deployment Complete!");
    info!("   - New NFT Relay: {:#x}", deployed.address);
    info!("   - Deployment saved to: \"{}\"", ctx.store.path(&plan.project_id).display());
    log_complete("NFT Relay Deployment Complete!");
    Ok(())
}
