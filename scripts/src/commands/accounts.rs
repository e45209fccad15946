//! The `accounts` script: creates customer accounts and launches their projects

use alloy::{primitives::U256, providers::DynProvider};
use tracing::info;

use crate::{
    cli::AccountsArgs,
    client::ScriptContext,
    constants::{CUSTOMER_SETTINGS, TAGGR, TAGGR_LAZY_721},
    errors::ScriptError,
    executor::{TxExecutor, TxSummary},
    manifest::{DeployTransaction, DeploymentRecord},
    plans::{read_plan, AccountPlan, ProjectPlan},
    solidity::{ICustomerSettings, ITaggr},
    utils::{load_address, metadata_base_uri, resolve_fee_token},
};

use super::log_complete;

/// Process every project of the plan, in order
pub async fn run(args: AccountsArgs, ctx: &ScriptContext) -> Result<(), ScriptError> {
    let plan: AccountPlan = read_plan(&args.plan)?;
    ctx.banner("Customer Accounts");

    let taggr = ITaggr::new(load_address(ctx, TAGGR)?, ctx.provider.clone());
    let customer_settings =
        ICustomerSettings::new(load_address(ctx, CUSTOMER_SETTINGS)?, ctx.provider.clone());
    let mut executor = TxExecutor::new(true, ctx.report_gas);

    for (index, project) in plan.projects.iter().enumerate() {
        let step = index + 1;
        let customer = project.customer_address.resolve(&ctx.accounts);
        info!("  {} ({customer:#x}): {}", project.customer, project.project_id);

        let mut launch = None;
        if project.launch_project {
            if project.create_customer {
                executor
                    .execute(&format!("{step}-a"), "Taggr: Create Customer Account", || {
                        ctx.send_call(taggr.managerUpdateCustomerAccount(
                            customer,
                            U256::from(project.plan_type.id()),
                        ))
                    })
                    .await?;
                if project.self_serve {
                    executor
                        .execute(&format!("{step}-b"), "Taggr: Enable Customer Self-Serve", || {
                            ctx.send_call(taggr.toggleCustomerSelfServe(customer, true))
                        })
                        .await?;
                }
            }

            let token_uri = project.token_uri(metadata_base_uri(ctx.chain()));
            launch = executor
                .execute(&format!("{step}-c"), "Taggr: Launch New Project", || {
                    ctx.send_call(taggr.managerLaunchNewProject(
                        customer,
                        project.project_id.clone(),
                        project.name.clone(),
                        project.symbol.clone(),
                        token_uri,
                        U256::from(project.nft_factory),
                        U256::from(project.max),
                        U256::from(project.royalties),
                    ))
                })
                .await?;
        }

        let purchase_token = resolve_fee_token(ctx.chain(), &ctx.store, project.purchase_token)?;
        let purchase_fee = project.purchase_fee_units()?;
        executor
            .execute(&format!("{step}-d"), "CustomerSettings: Set Project Purchase Fee", || {
                ctx.send_call(customer_settings.setProjectPurchaseFee(
                    project.project_id.clone(),
                    purchase_token,
                    purchase_fee,
                ))
            })
            .await?;

        if let Some(summary) = launch {
            record_project(ctx, &taggr, project, &summary).await?;
        }
    }

    executor.gas().report();
    log_complete("Customer Accounts Complete!");
    Ok(())
}

/// Look up a launched project's collection and save it under the project ID
async fn record_project(
    ctx: &ScriptContext,
    taggr: &ITaggr::ITaggrInstance<DynProvider>,
    project: &ProjectPlan,
    launch: &TxSummary,
) -> Result<(), ScriptError> {
    let address = taggr
        .getProjectContract(project.project_id.clone())
        .call()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
    if address.is_zero() {
        return Err(ScriptError::ContractInteraction(format!(
            "no collection registered for project {}",
            project.project_id
        )));
    }

    let record = DeploymentRecord {
        contract_name: Some(TAGGR_LAZY_721.to_string()),
        address,
        abi: Some(ctx.artifacts.contract_abi(TAGGR_LAZY_721)?),
        deploy_transaction: Some(DeployTransaction {
            hash: launch.hash,
            from: ctx.deployer(),
            block_number: launch.block_number,
            gas_limit: launch.gas_used,
            gas_price: launch.gas_price,
            gas_used: launch.gas_used,
        }),
        ..Default::default()
    };
    ctx.store.save(&project.project_id, &record, false)?;

    info!("   - {} Collection: {address:#x}", project.project_id);
    Ok(())
}
