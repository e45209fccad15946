//! The `mintusdc` script: funds test accounts with FakeUSDC

use tracing::info;

use crate::{
    cli::MintUsdcArgs,
    client::ScriptContext,
    constants::{FAKE_USDC, USDC_DECIMALS},
    errors::ScriptError,
    plans::parse_token_amount,
    solidity::IFakeUSDC,
    utils::load_address,
};

use super::{log_complete, resolve_recipients};

/// Mint `amount` FakeUSDC to each recipient. A no-op on production networks,
/// where no FakeUSDC is deployed.
pub async fn run(args: MintUsdcArgs, ctx: &ScriptContext) -> Result<(), ScriptError> {
    ctx.banner("Mint FakeUSDC");
    if ctx.chain().is_prod() {
        info!("  {FAKE_USDC} is not available on {}; skipping", ctx.chain());
        return Ok(());
    }

    let fake_usdc = IFakeUSDC::new(load_address(ctx, FAKE_USDC)?, ctx.provider.clone());
    let amount = parse_token_amount(&args.amount, USDC_DECIMALS)?;

    let recipients = resolve_recipients(ctx.chain(), &ctx.accounts, args.recipients.as_deref())?;
    for recipient in recipients {
        info!("  Minting {} Fake USDC to {recipient:#x}", args.amount);
        ctx.send_call(fake_usdc.mint(recipient, amount)).await?;
    }

    log_complete("FakeUSDC Minting Complete!");
    Ok(())
}
