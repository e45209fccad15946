//! Operator plan files: the project accounts to create and the relays to launch

use std::{fs, path::Path, str::FromStr};

use alloy::primitives::{
    utils::{parse_units, ParseUnits},
    Address, U256,
};
use serde::{de::DeserializeOwned, Deserialize, Deserializer};

use crate::{
    config::{AccountRef, NamedAccounts},
    constants::{LAZY_721_FACTORY_ID, RELAY_MAPPING_BATCH_SIZE, USDC_DECIMALS},
    errors::ScriptError,
};

/// Read and parse a JSON plan file
pub fn read_plan<T: DeserializeOwned>(path: &Path) -> Result<T, ScriptError> {
    let contents = fs::read_to_string(path)
        .map_err(|e| ScriptError::PlanParsing(format!("{}: {e}", path.display())))?;
    serde_json::from_str(&contents)
        .map_err(|e| ScriptError::PlanParsing(format!("{}: {e}", path.display())))
}

/// Parse a decimal amount of a token with the given decimals
pub fn parse_token_amount(amount: &str, decimals: u8) -> Result<U256, ScriptError> {
    match parse_units(amount, decimals) {
        Ok(ParseUnits::U256(value)) => Ok(value),
        Ok(ParseUnits::I256(_)) => {
            Err(ScriptError::PlanParsing(format!("negative amount `{amount}`")))
        }
        Err(e) => Err(ScriptError::PlanParsing(format!("invalid amount `{amount}`: {e}"))),
    }
}

/// Deserialize a decimal string into a 256-bit integer
fn u256_from_decimal<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
    let s = String::deserialize(deserializer)?;
    U256::from_str_radix(s.trim(), 10).map_err(serde::de::Error::custom)
}

// ------------
// | Accounts |
// ------------

/// Membership plans a customer can subscribe to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    /// Plan 1
    Free,
    /// Plan 2
    Standard,
    /// Plan 3
    Professional,
    /// Plan 4
    Business,
}

impl PlanType {
    /// The on-chain plan ID
    pub fn id(&self) -> u64 {
        match self {
            PlanType::Free => 1,
            PlanType::Standard => 2,
            PlanType::Professional => 3,
            PlanType::Business => 4,
        }
    }
}

/// A customer project to create, launch or reprice
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPlan {
    /// Display name of the customer
    pub customer: String,
    /// The customer's wallet
    pub customer_address: AccountRef,
    /// The customer's membership plan
    pub plan_type: PlanType,
    /// Whether the customer may launch projects without a manager
    #[serde(default)]
    pub self_serve: bool,
    /// Whether to create or update the customer account first
    #[serde(default = "default_true")]
    pub create_customer: bool,
    /// Whether to launch the project; when false only the purchase fee is set
    #[serde(default = "default_true")]
    pub launch_project: bool,
    /// The project ID
    pub project_id: String,
    /// The collection name
    pub name: String,
    /// The collection symbol
    pub symbol: String,
    /// The base token URI; defaults to `<metadata base>/<project ID>/`
    #[serde(default)]
    pub base_token_uri: Option<String>,
    /// The factory the collection is cloned from
    #[serde(default = "default_factory")]
    pub nft_factory: u64,
    /// The maximum supply
    pub max: u64,
    /// Royalties in basis points
    pub royalties: u64,
    /// The token purchases are paid in; defaults to the network's USDC
    #[serde(default)]
    pub purchase_token: Option<Address>,
    /// The purchase price, as a decimal USDC amount
    pub purchase_fee: String,
}

/// `true`, for serde defaults
fn default_true() -> bool {
    true
}

/// The lazy-mint factory, for serde defaults
fn default_factory() -> u64 {
    LAZY_721_FACTORY_ID
}

impl ProjectPlan {
    /// The base token URI of the project under the given metadata base
    pub fn token_uri(&self, metadata_base: &str) -> String {
        self.base_token_uri
            .clone()
            .unwrap_or_else(|| format!("{}/{}/", metadata_base.trim_end_matches('/'), self.project_id))
    }

    /// The purchase fee in USDC base units
    pub fn purchase_fee_units(&self) -> Result<U256, ScriptError> {
        parse_token_amount(&self.purchase_fee, USDC_DECIMALS)
    }
}

/// The account plan: projects processed in order
#[derive(Clone, Debug, Deserialize)]
pub struct AccountPlan {
    /// The projects
    pub projects: Vec<ProjectPlan>,
}

// ----------
// | Relays |
// ----------

/// A relay token mapped to a pre-existing NFT
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenMapping {
    /// The relay token ID
    #[serde(deserialize_with = "u256_from_decimal")]
    pub token_id: U256,
    /// The token ID in the relayed collection
    #[serde(deserialize_with = "u256_from_decimal")]
    pub nft_token_id: U256,
    /// An optional label
    #[serde(default)]
    pub name: Option<String>,
}

/// A relay to deploy for a project
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayPlan {
    /// The project ID the relay is recorded under
    pub project_id: String,
    /// The project name passed to `initialize`
    pub project_name: String,
    /// The relay owner; defaults to the deployer
    #[serde(default)]
    pub owner: Option<AccountRef>,
    /// The relayed collection
    pub nft_contract: Address,
    /// The wallet holding the relayed tokens
    pub nft_holder: AccountRef,
    /// The token mappings
    pub token_map: Vec<TokenMapping>,
}

impl RelayPlan {
    /// The relay owner, defaulting to the deployer
    pub fn owner_address(&self, accounts: &NamedAccounts) -> Address {
        self.owner.map_or_else(|| accounts.deployer(), |owner| owner.resolve(accounts))
    }

    /// The mappings split into `mapTokens` batches
    pub fn batches(&self) -> Vec<(Vec<U256>, Vec<U256>)> {
        self.token_map
            .chunks(RELAY_MAPPING_BATCH_SIZE)
            .map(|chunk| {
                chunk.iter().map(|mapping| (mapping.token_id, mapping.nft_token_id)).unzip()
            })
            .collect()
    }
}

/// Parse a comma-separated list of account references
pub fn parse_account_list(list: &str) -> Result<Vec<AccountRef>, ScriptError> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(AccountRef::from_str)
        .collect()
}
