//! Definitions of CLI arguments and commands for the deployment scripts

use std::path::PathBuf;

use alloy::primitives::{Address, B256};
use clap::{builder::FalseyValueParser, ArgGroup, Args, Parser, Subcommand};

use crate::{
    client::{ScriptContext, ScriptPaths},
    commands::{
        accounts, deploy_core, free_mint_pass, merkle, mint_usdc, relay, scrape, setup, verify,
    },
    config::{AccountRef, NamedAccount, NetworkOverrides},
    constants::{DEFAULT_FAKE_USDC_MINT, DEFAULT_PROXY_ARTIFACTS_DIR, DEFAULT_VERIFIER_COMMAND},
    errors::ScriptError,
};

/// Deploy, configure and administer the Taggr contracts
#[derive(Parser)]
#[command(name = "taggr", version)]
pub struct Cli {
    /// The network to run against
    #[arg(long, env = "NETWORK", default_value = "hardhat", global = true)]
    pub network: String,

    /// Override the network's RPC endpoint
    #[arg(long, env = "RPC_URL", global = true)]
    pub rpc_url: Option<String>,

    /// Override the network's mnemonic
    #[arg(long, global = true)]
    pub mnemonic: Option<String>,

    /// Override the network's gas price, in gwei
    #[arg(long, global = true)]
    pub gas_price_gwei: Option<String>,

    /// Root of the deployment manifest
    #[arg(long, default_value = "deployments", global = true)]
    pub deployments_dir: PathBuf,

    /// Compiler artifacts directory
    #[arg(long, default_value = "build/contracts", global = true)]
    pub artifacts_dir: PathBuf,

    /// Flat ABI export directory
    #[arg(long, default_value = "abis", global = true)]
    pub abis_dir: PathBuf,

    /// Where proxy artifacts missing from the build output are looked up
    #[arg(long, default_value = DEFAULT_PROXY_ARTIFACTS_DIR, global = true)]
    pub proxy_artifacts_dir: PathBuf,

    /// Log the gas cost of every transaction. `REPORT_GAS` enables it when set
    /// to anything but a falsey value
    #[arg(long, env = "REPORT_GAS", global = true, value_parser = FalseyValueParser::new())]
    pub report_gas: bool,

    /// The script to run
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// The command-line overrides of the network table
    pub fn network_overrides(&self) -> NetworkOverrides {
        NetworkOverrides {
            rpc_url: self.rpc_url.clone(),
            mnemonic: self.mnemonic.clone(),
            gas_price_gwei: self.gas_price_gwei.clone(),
        }
    }

    /// The filesystem locations the scripts use
    pub fn paths(&self) -> ScriptPaths {
        ScriptPaths {
            deployments_dir: self.deployments_dir.clone(),
            artifacts_dir: self.artifacts_dir.clone(),
            abis_dir: self.abis_dir.clone(),
            proxy_artifacts_dir: self.proxy_artifacts_dir.clone(),
        }
    }
}

/// The deployment scripts, by tag
#[derive(Subcommand)]
pub enum Command {
    /// Deploy the core contracts
    Core(CoreArgs),
    /// Wire the deployed core contracts together
    Setup(SetupArgs),
    /// Verify deployed contracts on the block explorer
    Verify(VerifyArgs),
    /// List the NFTs an account holds in a collection
    Scrape(ScrapeArgs),
    /// Deploy and populate an NFT relay
    Relay(RelayArgs),
    /// Push a project's claim Merkle root
    Merkle(MerkleArgs),
    /// Mint FakeUSDC to test accounts
    #[command(name = "mintusdc")]
    MintUsdc(MintUsdcArgs),
    /// Create customer accounts and launch their projects
    Accounts(AccountsArgs),
    /// Grant free mint passes for a project
    #[command(name = "freemintpass")]
    FreeMintPass(FreeMintPassArgs),
}

impl Command {
    /// Run the script
    pub async fn run(self, ctx: &ScriptContext) -> Result<(), ScriptError> {
        match self {
            Command::Core(args) => deploy_core::run(args, ctx).await,
            Command::Setup(args) => setup::run(args, ctx).await,
            Command::Verify(args) => verify::run(args, ctx).await,
            Command::Scrape(args) => scrape::run(args, ctx).await,
            Command::Relay(args) => relay::run(args, ctx).await,
            Command::Merkle(args) => merkle::run(args, ctx).await,
            Command::MintUsdc(args) => mint_usdc::run(args, ctx).await,
            Command::Accounts(args) => accounts::run(args, ctx).await,
            Command::FreeMintPass(args) => free_mint_pass::run(args, ctx).await,
        }
    }
}

/// Deploy the core contracts.
///
/// By default each upgradeable contract is deployed behind a
/// `TransparentUpgradeableProxy` administered by the network's `ProxyAdmin`.
#[derive(Args)]
pub struct CoreArgs {
    /// Deploy the contracts directly and call `initialize`, without proxies
    #[arg(long)]
    pub direct: bool,
}

/// Wire the deployed core contracts together
#[derive(Args)]
pub struct SetupArgs {
    /// The token membership and launch fees are paid in
    #[arg(long)]
    pub fee_token: Option<Address>,

    /// Skip every transaction before this label, e.g. `2-c`
    #[arg(long)]
    pub skip_to: Option<String>,
}

/// Verify deployed contracts
#[derive(Args)]
#[command(group(ArgGroup::new("target").required(true).multiple(true).args(["core", "name"])))]
pub struct VerifyArgs {
    /// Verify the core proxies' implementations and `TaggrLazy721`
    #[arg(long)]
    pub core: bool,

    /// Verify a recorded deployment by name
    #[arg(long)]
    pub name: Option<String>,

    /// Verify this address instead of the recorded one
    #[arg(long, requires = "name")]
    pub address: Option<Address>,

    /// Fully-qualified source reference, e.g. `Taggr.sol:Taggr`
    #[arg(long, requires = "name")]
    pub contract_ref: Option<String>,

    /// The verification command
    #[arg(long, env = "VERIFIER_CMD", default_value = DEFAULT_VERIFIER_COMMAND)]
    pub verifier_cmd: String,
}

/// List the NFTs an account holds in a collection
#[derive(Args)]
pub struct ScrapeArgs {
    /// The ERC-721 collection
    #[arg(long)]
    pub nft_contract: Address,

    /// The account to scrape: a hex address or a named account
    #[arg(long)]
    pub account: AccountRef,
}

/// Deploy and populate an NFT relay
#[derive(Args)]
pub struct RelayArgs {
    /// The relay plan file
    #[arg(long)]
    pub plan: PathBuf,
}

/// Push a project's claim Merkle root
#[derive(Args)]
#[command(group(ArgGroup::new("source").required(true).args(["root", "leaves"])))]
pub struct MerkleArgs {
    /// The project the root is set for
    #[arg(long)]
    pub project_id: String,

    /// A precomputed root
    #[arg(long)]
    pub root: Option<B256>,

    /// A file of claim-code sources, one per line, to build the root from
    #[arg(long)]
    pub leaves: Option<PathBuf>,

    /// Write the proof of every leaf to this JSON file
    #[arg(long, requires = "leaves")]
    pub proofs_out: Option<PathBuf>,

    /// Set the root through the project-manager entry point, signed by this
    /// named account, instead of as the contract owner
    #[arg(long)]
    pub manager: Option<NamedAccount>,
}

/// Mint FakeUSDC to test accounts
#[derive(Args)]
pub struct MintUsdcArgs {
    /// The whole-token amount minted to each recipient
    #[arg(long, default_value = DEFAULT_FAKE_USDC_MINT)]
    pub amount: String,

    /// Comma-separated recipients; defaults to the named accounts, or the QA
    /// wallets on Goerli
    #[arg(long)]
    pub recipients: Option<String>,
}

/// Create customer accounts and launch their projects
#[derive(Args)]
pub struct AccountsArgs {
    /// The account plan file
    #[arg(long)]
    pub plan: PathBuf,
}

/// Grant free mint passes for a project
#[derive(Args)]
pub struct FreeMintPassArgs {
    /// The project the passes are for
    #[arg(long)]
    pub project_id: String,

    /// Passes granted to each recipient
    #[arg(long, default_value_t = 1)]
    pub count: u64,

    /// The named account signing the grants
    #[arg(long, default_value_t = NamedAccount::ProtocolOwner)]
    pub signer: NamedAccount,

    /// Comma-separated recipients; required on production networks. Defaults
    /// to the named accounts, or the QA wallets on Goerli
    #[arg(long)]
    pub recipients: Option<String>,
}
