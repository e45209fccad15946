//! The `verify` script: verifies deployed contracts on the block explorer

use tracing::info;

use crate::{
    cli::VerifyArgs,
    client::ScriptContext,
    constants::{PROXIED_CONTRACTS, TAGGR_LAZY_721},
    errors::ScriptError,
    verification::{Verifier, VerifyOutcome, VerifyRequest},
};

use super::log_complete;

/// Verify the core contracts and/or a named deployment
pub async fn run(args: VerifyArgs, ctx: &ScriptContext) -> Result<(), ScriptError> {
    if ctx.chain().is_local() {
        info!("Skipping contract verification on {}", ctx.chain());
        return Ok(());
    }

    ctx.banner("Contract Verification");
    let verifier = Verifier::new(ctx, &args.verifier_cmd);
    let mut failed = Vec::new();

    if args.core {
        for name in PROXIED_CONTRACTS {
            if let Some(VerifyOutcome::Failed(_)) = verifier.verify_proxy(ctx, name).await? {
                failed.push(name.to_string());
            }
        }
        if let VerifyOutcome::Failed(_) = verifier.verify_recorded(ctx, TAGGR_LAZY_721, None)? {
            failed.push(TAGGR_LAZY_721.to_string());
        }
    }

    if let Some(name) = args.name {
        let outcome = match args.address {
            // An explicit address may not have a record; its arguments are reused when it does
            Some(address) => {
                let constructor_args = ctx
                    .store
                    .load(&name)
                    .map(|record| record.constructor_args)
                    .unwrap_or_default();
                verifier.verify(&VerifyRequest {
                    name: name.clone(),
                    address,
                    contract_ref: args.contract_ref,
                    constructor_args,
                })?
            }
            None => verifier.verify_recorded(ctx, &name, args.contract_ref)?,
        };
        if let VerifyOutcome::Failed(_) = outcome {
            failed.push(name);
        }
    }

    if !failed.is_empty() {
        info!("  Unverified: {}", failed.join(", "));
    }
    log_complete("Contract Verification Complete.");
    Ok(())
}
