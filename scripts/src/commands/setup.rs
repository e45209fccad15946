//! The `setup` script: wires the deployed core contracts together

use alloy::primitives::U256;
use tracing::info;

use crate::{
    cli::SetupArgs,
    client::ScriptContext,
    constants::{
        CUSTOMER_SETTINGS, LAZY_721_FACTORY_ID, MEMBERSHIP_FEE, MINTING_FEES_BY_PLAN,
        NFT_DISTRIBUTOR, PROJECT_LAUNCH_FEE, TAGGR, TAGGR_FACTORY_LAZY_721, TAGGR_SETTINGS,
        TOKEN_ESCROW,
    },
    errors::ScriptError,
    executor::TxExecutor,
    plans::parse_token_amount,
    solidity::{
        ICustomerSettings, INftDistributor, ITaggr, ITaggrFactoryLazy721, ITaggrSettings,
        ITokenEscrow,
    },
    utils::{load_address, resolve_fee_token},
};

use super::log_complete;

/// Fees are denominated with 18 decimals regardless of the fee token
const FEE_DECIMALS: u8 = 18;

/// Labels of the minting-fee transactions, by position in the plan table
const MINTING_FEE_TX_IDS: [&str; 4] = ["2-e", "2-f", "2-g", "2-h"];

/// Register every core contract with the contracts that call it
pub async fn run(args: SetupArgs, ctx: &ScriptContext) -> Result<(), ScriptError> {
    ctx.banner("Contract Configurations");

    let taggr_addr = load_address(ctx, TAGGR)?;
    let taggr_settings_addr = load_address(ctx, TAGGR_SETTINGS)?;
    let customer_settings_addr = load_address(ctx, CUSTOMER_SETTINGS)?;
    let nft_distributor_addr = load_address(ctx, NFT_DISTRIBUTOR)?;
    let token_escrow_addr = load_address(ctx, TOKEN_ESCROW)?;
    let factory_addr = load_address(ctx, TAGGR_FACTORY_LAZY_721)?;
    let fee_token = resolve_fee_token(ctx.chain(), &ctx.store, args.fee_token)?;
    info!("  Using fee token: {fee_token:#x}");

    let taggr = ITaggr::new(taggr_addr, ctx.provider.clone());
    let taggr_settings = ITaggrSettings::new(taggr_settings_addr, ctx.provider.clone());
    let customer_settings = ICustomerSettings::new(customer_settings_addr, ctx.provider.clone());
    let nft_distributor = INftDistributor::new(nft_distributor_addr, ctx.provider.clone());
    let token_escrow = ITokenEscrow::new(token_escrow_addr, ctx.provider.clone());
    let factory = ITaggrFactoryLazy721::new(factory_addr, ctx.provider.clone());

    let mut executor = TxExecutor::new(true, ctx.report_gas);
    if let Some(id) = args.skip_to {
        executor.skip_to(id);
    }

    // Taggr
    executor
        .execute("1-a", "Taggr: Registering Settings", || {
            ctx.send_call(taggr.setTaggrSettings(taggr_settings_addr))
        })
        .await?;
    executor
        .execute("1-b", "Taggr: Registering NFT Distributor", || {
            ctx.send_call(taggr.setNftDistributor(nft_distributor_addr))
        })
        .await?;
    executor
        .execute("1-c", "Taggr: Registering Lazy721 Factory", || {
            ctx.send_call(taggr.registerNftFactory(U256::from(LAZY_721_FACTORY_ID), factory_addr))
        })
        .await?;

    // TaggrSettings
    let membership_fee = parse_token_amount(MEMBERSHIP_FEE, FEE_DECIMALS)?;
    let launch_fee = parse_token_amount(PROJECT_LAUNCH_FEE, FEE_DECIMALS)?;
    executor
        .execute("2-a", "TaggrSettings: Membership Fee", || {
            ctx.send_call(taggr_settings.setMembershipFee(membership_fee))
        })
        .await?;
    executor
        .execute("2-b", "TaggrSettings: Project Launch Fee", || {
            ctx.send_call(taggr_settings.setProjectLaunchFee(launch_fee))
        })
        .await?;
    executor
        .execute("2-c", "TaggrSettings: Membership Fee Token", || {
            ctx.send_call(taggr_settings.setMembershipFeeToken(fee_token))
        })
        .await?;
    executor
        .execute("2-d", "TaggrSettings: Project Launch Fee Token", || {
            ctx.send_call(taggr_settings.setProjectLaunchFeeToken(fee_token))
        })
        .await?;
    for (id, (plan_type, plan_name, fee)) in MINTING_FEE_TX_IDS.iter().zip(MINTING_FEES_BY_PLAN) {
        let description =
            format!("TaggrSettings: Set Minting Fee by Plan Type ({plan_type}={plan_name})");
        executor
            .execute(id, &description, || {
                ctx.send_call(
                    taggr_settings.setMintingFeeByPlanType(U256::from(plan_type), U256::from(fee)),
                )
            })
            .await?;
    }

    // CustomerSettings
    executor
        .execute("3-a", "CustomerSettings: Register Taggr", || {
            ctx.send_call(customer_settings.setTaggr(taggr_addr))
        })
        .await?;
    executor
        .execute("3-b", "CustomerSettings: Register NFT Distributor", || {
            ctx.send_call(customer_settings.setNftDistributor(nft_distributor_addr))
        })
        .await?;

    // NftDistributor
    executor
        .execute("4-a", "NftDistributor: Register Taggr", || {
            ctx.send_call(nft_distributor.setTaggr(taggr_addr))
        })
        .await?;
    executor
        .execute("4-b", "NftDistributor: Register TaggrSettings", || {
            ctx.send_call(nft_distributor.setTaggrSettings(taggr_settings_addr))
        })
        .await?;
    executor
        .execute("4-c", "NftDistributor: Register CustomerSettings", || {
            ctx.send_call(nft_distributor.setCustomerSettings(customer_settings_addr))
        })
        .await?;
    executor
        .execute("4-d", "NftDistributor: Register TokenEscrow", || {
            ctx.send_call(nft_distributor.setTokenEscrow(token_escrow_addr))
        })
        .await?;

    // TokenEscrow
    executor
        .execute("5-a", "TokenEscrow: Register NFT Distributor", || {
            ctx.send_call(token_escrow.setNftDistributor(nft_distributor_addr))
        })
        .await?;

    // TaggrFactoryLazy721
    executor
        .execute("6-a", "TaggrFactoryLazy721: Register Taggr as Deployer", || {
            ctx.send_call(factory.setDeployer(taggr_addr))
        })
        .await?;

    if executor.is_skipping() {
        return Err(ScriptError::ContractInteraction(
            "the --skip-to label matched no transaction".to_string(),
        ));
    }

    info!("  Contract Initialization Complete!");
    executor.gas().report();
    log_complete("Contract Configuration Complete!");
    Ok(())
}
