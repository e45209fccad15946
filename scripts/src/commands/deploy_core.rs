//! The `core` script: deploys the protocol contracts

use tracing::info;

use crate::{
    cli::CoreArgs,
    client::ScriptContext,
    constants::{FAKE_USDC, PROXIED_CONTRACTS, TAGGR_LAZY_721, TAGGR_NFT_RELAY},
    deploy::{deploy_direct, deploy_proxy},
    errors::ScriptError,
    gas::GasTracker,
    manifest::DeploymentRecord,
};

use super::log_complete;

/// Deploy the upgradeable contracts, the lazy-mint template and, off
/// production, FakeUSDC
pub async fn run(args: CoreArgs, ctx: &ScriptContext) -> Result<(), ScriptError> {
    ctx.banner("Contract Deployment");
    let mut gas = GasTracker::new();

    for name in PROXIED_CONTRACTS {
        let record = if args.direct {
            // The relay template is initialized per project by the `relay` script
            let initialize = name != TAGGR_NFT_RELAY;
            deploy_direct(ctx, name, &[], vec![], initialize).await?
        } else {
            deploy_proxy(ctx, name).await?
        };
        track(&mut gas, &record);
    }

    // Deployed once so the minimal proxies cloned from it can be verified
    let record = deploy_direct(ctx, TAGGR_LAZY_721, &[], vec![], false).await?;
    track(&mut gas, &record);

    if !ctx.chain().is_prod() {
        let record = deploy_direct(ctx, FAKE_USDC, &[], vec![], false).await?;
        track(&mut gas, &record);
    }

    info!("  Contract Deployment Data saved to \"{}\"", ctx.store.dir().display());
    if ctx.report_gas {
        gas.report();
    }
    log_complete("Contract Deployment Complete!");
    Ok(())
}

/// Add the gas of a recorded deployment
fn track(gas: &mut GasTracker, record: &DeploymentRecord) {
    if let Some(tx) = &record.deploy_transaction {
        gas.add(tx.gas_used);
    }
}
