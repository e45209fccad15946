//! The `freemintpass` script: grants free mint passes for a project

use alloy::primitives::{Address, U256};
use tracing::info;

use crate::{
    chain::Chain,
    cli::FreeMintPassArgs,
    client::ScriptContext,
    config::NamedAccounts,
    constants::CUSTOMER_SETTINGS,
    errors::ScriptError,
    solidity::ICustomerSettings,
    utils::load_address,
};

use super::{log_complete, resolve_recipients};

/// The pass recipients. Production networks never fall back to defaults.
fn pass_recipients(
    chain: Chain,
    accounts: &NamedAccounts,
    recipients: Option<&str>,
) -> Result<Vec<Address>, ScriptError> {
    if chain.is_prod() && recipients.is_none() {
        return Err(ScriptError::PlanParsing(format!("--recipients is required on {chain}")));
    }
    resolve_recipients(chain, accounts, recipients)
}

/// Grant `count` free mints of a project to each recipient, signed by the
/// chosen named account
pub async fn run(args: FreeMintPassArgs, ctx: &ScriptContext) -> Result<(), ScriptError> {
    ctx.banner("Free Mint Passes");
    let recipients = pass_recipients(ctx.chain(), &ctx.accounts, args.recipients.as_deref())?;

    let customer_settings =
        ICustomerSettings::new(load_address(ctx, CUSTOMER_SETTINGS)?, ctx.provider.clone());
    let signer = ctx.account(args.signer);
    info!("  Signing as {} ({signer:#x})", args.signer);

    let count = U256::from(args.count);
    for account in recipients {
        info!("  Granting {} free mint(s) of {} to {account:#x}", args.count, args.project_id);
        ctx.send_call_from(
            customer_settings.setProjectFreeMint(args.project_id.clone(), account, count),
            signer,
        )
        .await?;
    }

    log_complete("Free Mint Passes Granted!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accounts() -> NamedAccounts {
        NamedAccounts::new((1..=10u8).map(Address::repeat_byte).collect()).unwrap()
    }

    #[test]
    fn test_production_requires_explicit_recipients() {
        for chain in [Chain(1), Chain(137)] {
            assert!(matches!(
                pass_recipients(chain, &accounts(), None),
                Err(ScriptError::PlanParsing(_))
            ));
            assert_eq!(
                pass_recipients(chain, &accounts(), Some("user2")).unwrap(),
                vec![Address::repeat_byte(5)]
            );
        }
    }

    #[test]
    fn test_testnets_fall_back_to_default_recipients() {
        assert_eq!(pass_recipients(Chain(31337), &accounts(), None).unwrap().len(), 9);
        assert_eq!(pass_recipients(Chain(80001), &accounts(), None).unwrap().len(), 9);
    }
}
