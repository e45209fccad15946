//! Constants used in the deployment scripts

use alloy::primitives::{address, b256, Address, B256};

// ------------------
// | Contract names |
// ------------------

/// The Taggr core contract
pub const TAGGR: &str = "Taggr";

/// The protocol-wide settings contract
pub const TAGGR_SETTINGS: &str = "TaggrSettings";

/// The per-customer settings contract
pub const CUSTOMER_SETTINGS: &str = "CustomerSettings";

/// The NFT distributor, which handles claims and purchases
pub const NFT_DISTRIBUTOR: &str = "NftDistributor";

/// The ERC20 escrow holding customer payments
pub const TOKEN_ESCROW: &str = "TokenEscrow";

/// The NFT relay template
pub const TAGGR_NFT_RELAY: &str = "TaggrNftRelay";

/// The factory cloning lazy-mint ERC721 collections
pub const TAGGR_FACTORY_LAZY_721: &str = "TaggrFactoryLazy721";

/// The lazy-mint ERC721 implementation cloned by the factory
pub const TAGGR_LAZY_721: &str = "TaggrLazy721";

/// The mintable USDC stand-in used off production networks
pub const FAKE_USDC: &str = "FakeUSDC";

/// The OpenZeppelin transparent proxy
pub const TRANSPARENT_PROXY: &str = "TransparentUpgradeableProxy";

/// The OpenZeppelin proxy admin
pub const PROXY_ADMIN: &str = "ProxyAdmin";

/// The upgradeable contracts deployed behind a proxy by the `core` script, in
/// deployment order
pub const PROXIED_CONTRACTS: [&str; 7] = [
    TAGGR,
    TAGGR_SETTINGS,
    CUSTOMER_SETTINGS,
    NFT_DISTRIBUTOR,
    TOKEN_ESCROW,
    TAGGR_NFT_RELAY,
    TAGGR_FACTORY_LAZY_721,
];

// -----------
// | Proxies |
// -----------

/// The storage slot holding the implementation address of an EIP-1967 proxy.
///
/// See https://eips.ethereum.org/EIPS/eip-1967#logic-contract-address
pub const IMPLEMENTATION_STORAGE_SLOT: B256 =
    b256!("360894a13ba1a3210667c828492db98dca3e2076cc3735a920a3ca505d382bbc");

/// Where `@openzeppelin/hardhat-upgrades` ships the proxy and proxy admin
/// artifacts, which a project build does not emit
pub const DEFAULT_PROXY_ARTIFACTS_DIR: &str = "node_modules/@openzeppelin/upgrades-core/artifacts";

/// The constructor parameter of OpenZeppelin v5 proxies that names the owner
/// of the proxy's own admin
pub const PROXY_INITIAL_OWNER_PARAM: &str = "initialOwner";

/// The storage slot holding the admin address of an EIP-1967 proxy.
///
/// See https://eips.ethereum.org/EIPS/eip-1967#admin-address
pub const ADMIN_STORAGE_SLOT: B256 =
    b256!("b53127684a568b3173ae13b9f8a6016e243e63b6e8ee1178d6a717850b5d6103");

// ------------
// | Networks |
// ------------

/// The chain ID of Ethereum mainnet
pub const MAINNET_CHAIN_ID: u64 = 1;

/// The chain ID of the Ropsten testnet
pub const ROPSTEN_CHAIN_ID: u64 = 3;

/// The chain ID of the Rinkeby testnet
pub const RINKEBY_CHAIN_ID: u64 = 4;

/// The chain ID of the Goerli testnet
pub const GOERLI_CHAIN_ID: u64 = 5;

/// The chain ID of the Kovan testnet
pub const KOVAN_CHAIN_ID: u64 = 42;

/// The chain ID of Polygon mainnet
pub const POLYGON_CHAIN_ID: u64 = 137;

/// The chain ID of the Mumbai testnet
pub const MUMBAI_CHAIN_ID: u64 = 80001;

/// The chain ID of a local Hardhat or Anvil node
pub const HARDHAT_CHAIN_ID: u64 = 31337;

/// The RPC endpoint of a local development node
pub const LOCAL_RPC_URL: &str = "http://127.0.0.1:8545";

/// The mnemonic every local development node seeds its accounts from
pub const DEV_MNEMONIC: &str = "test test test test test test test test test test test junk";

/// The number of accounts derived from the mnemonic
pub const NUM_NAMED_ACCOUNTS: u32 = 10;

// ----------
// | Tokens |
// ----------

/// Canonical USDC on Ethereum mainnet
pub const MAINNET_USDC: Address = address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");

/// Circle's USDC on Goerli
pub const GOERLI_USDC: Address = address!("07865c6e87b9f70255377e024ace6630c1eaa37f");

/// The number of decimals of USDC and FakeUSDC
pub const USDC_DECIMALS: u8 = 6;

/// The amount of FakeUSDC minted to each recipient by `mintusdc`
pub const DEFAULT_FAKE_USDC_MINT: &str = "1000000000";

/// QA wallets that receive test funds and mint passes on Goerli
pub const GOERLI_QA_ACCOUNTS: [Address; 6] = [
    address!("27607dF15Aa481D31dCEEdc2572ae083809f6995"),
    address!("9E89edFFC3Bcdd502663503c93aaF6d37f4188dA"),
    address!("6feDb09BABb57Bf252588Ae17c0A0400E5fBC9D3"),
    address!("beb87B2e4D8B89cd2Af8A3c7103DB7fB2f5af022"),
    address!("653398a5B2c85476514693b67d8d5B92C1F737D2"),
    address!("9FdD726dAf27DFd27332d7b5523288CaEaD2d3eD"),
];

// ------------
// | Settings |
// ------------

/// The membership fee, in whole fee-token units
pub const MEMBERSHIP_FEE: &str = "1.0";

/// The project launch fee, in whole fee-token units
pub const PROJECT_LAUNCH_FEE: &str = "1.0";

/// The factory ID under which the lazy-mint ERC721 factory is registered
pub const LAZY_721_FACTORY_ID: u64 = 1;

/// Minting fees per membership plan type, in basis points
pub const MINTING_FEES_BY_PLAN: [(u64, &str, u64); 4] = [
    (1, "Free", 500),
    (2, "Standard", 400),
    (3, "Professional", 300),
    (4, "Business", 200),
];

/// The number of token mappings sent per `mapTokens` transaction
pub const RELAY_MAPPING_BATCH_SIZE: usize = 20;

/// Project metadata API used as the base token URI on production networks
pub const PROD_METADATA_BASE_URI: &str =
    "https://us-central1-taggr-admin-prod.cloudfunctions.net/api/project-meta";

/// Project metadata API used as the base token URI everywhere else
pub const STAGING_METADATA_BASE_URI: &str =
    "https://us-central1-taggr-admin-staging.cloudfunctions.net/api/project-meta";

/// The public gateway used to resolve `ipfs://` token URIs
pub const IPFS_GATEWAY: &str = "https://ipfs.io/ipfs/";

// -------
// | Gas |
// -------

/// Gas prices, in gwei, at which the accumulated gas of a run is reported
pub const GAS_REPORT_TIERS_GWEI: [u64; 3] = [10, 100, 150];

// ----------------
// | Verification |
// ----------------

/// The default block-explorer verification command
pub const DEFAULT_VERIFIER_COMMAND: &str = "npx hardhat verify";

/// Substring of the verifier output reporting a contract as already verified
pub const ALREADY_VERIFIED_MARKER: &str = "already verified";

/// The directory prefix of fully-qualified contract references
pub const CONTRACTS_SOURCE_DIR: &str = "contracts";
