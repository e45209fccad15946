//! Per-network configuration and named accounts

use std::{
    env,
    fmt::{self, Display},
    str::FromStr,
};

use alloy::primitives::{utils::parse_units, Address};

use crate::{
    chain::Chain,
    constants::{DEV_MNEMONIC, LOCAL_RPC_URL},
    errors::ScriptError,
};

/// The environment variable holding the testnet mnemonic
pub const TESTNET_MNEMONIC_VAR: &str = "TESTNET_MNEMONIC";
/// The environment variable holding the mainnet mnemonic
pub const MAINNET_MNEMONIC_VAR: &str = "MAINNET_MNEMONIC";
/// The environment variable holding the Etherscan API key
pub const ETHERSCAN_APIKEY_VAR: &str = "ETHERSCAN_APIKEY";
/// The environment variable holding the Polygonscan API key
pub const POLYGONSCAN_APIKEY_VAR: &str = "POLYGONSCAN_APIKEY";

/// The static description of a known network
struct NetworkSpec {
    /// Canonical network name
    name: &'static str,
    /// RPC endpoint template; `{VAR}` is substituted from the environment
    rpc_url: &'static str,
    /// Default gas price in gwei
    gas_price_gwei: u64,
    /// Whether the network signs with the mainnet mnemonic
    mainnet_keys: bool,
    /// The environment variable holding the explorer API key
    explorer_key_var: Option<&'static str>,
}

/// The networks the scripts know how to reach
const NETWORKS: [NetworkSpec; 6] = [
    NetworkSpec {
        name: "hardhat",
        rpc_url: LOCAL_RPC_URL,
        gas_price_gwei: 1,
        mainnet_keys: false,
        explorer_key_var: None,
    },
    NetworkSpec {
        name: "localhost",
        rpc_url: LOCAL_RPC_URL,
        gas_price_gwei: 1,
        mainnet_keys: false,
        explorer_key_var: None,
    },
    NetworkSpec {
        name: "goerli",
        rpc_url: "https://goerli.infura.io/v3/{INFURA_APIKEY}",
        gas_price_gwei: 1,
        mainnet_keys: false,
        explorer_key_var: Some(ETHERSCAN_APIKEY_VAR),
    },
    NetworkSpec {
        name: "mumbai",
        rpc_url: "https://matic-mumbai.chainstacklabs.com/",
        gas_price_gwei: 10,
        mainnet_keys: false,
        explorer_key_var: Some(POLYGONSCAN_APIKEY_VAR),
    },
    NetworkSpec {
        name: "polygon",
        rpc_url: "https://rpc-mainnet.maticvigil.com/v1/{MATIC_APIKEY}",
        gas_price_gwei: 15,
        mainnet_keys: true,
        explorer_key_var: Some(POLYGONSCAN_APIKEY_VAR),
    },
    NetworkSpec {
        name: "mainnet",
        rpc_url: "https://mainnet.infura.io/v3/{INFURA_APIKEY}",
        gas_price_gwei: 22,
        mainnet_keys: true,
        explorer_key_var: Some(ETHERSCAN_APIKEY_VAR),
    },
];

/// The resolved configuration of the network a script runs against
#[derive(Clone, Debug)]
pub struct NetworkConfig {
    /// The network name, as passed on the command line
    pub name: String,
    /// The chain the network is expected to serve
    pub chain: Chain,
    /// The RPC endpoint
    pub rpc_url: String,
    /// The gas price, in wei, to send transactions with
    pub gas_price: u128,
    /// The mnemonic the named accounts are derived from
    pub mnemonic: String,
    /// The block explorer API key, if the network has one configured
    pub explorer_api_key: Option<String>,
}

/// Optional command-line overrides of the network table
#[derive(Clone, Debug, Default)]
pub struct NetworkOverrides {
    /// Use this RPC endpoint instead of the table's
    pub rpc_url: Option<String>,
    /// Use this mnemonic instead of the environment's
    pub mnemonic: Option<String>,
    /// Use this gas price, in gwei, instead of the table's
    pub gas_price_gwei: Option<String>,
}

impl NetworkConfig {
    /// Resolve a network from the process environment
    pub fn from_env(name: &str, overrides: NetworkOverrides) -> Result<Self, ScriptError> {
        Self::resolve(name, overrides, |var| env::var(var).ok())
    }

    /// Resolve a network, reading environment variables through `lookup`
    pub fn resolve(
        name: &str,
        overrides: NetworkOverrides,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ScriptError> {
        // Hardhat reports mainnet as `homestead`
        let canonical = match name.to_lowercase().as_str() {
            "homestead" => "mainnet".to_string(),
            other => other.to_string(),
        };
        let spec = NETWORKS.iter().find(|spec| spec.name == canonical).ok_or_else(|| {
            ScriptError::InvalidNetwork(format!("no configuration for network `{name}`"))
        })?;
        let chain = Chain::from_network_name(spec.name);

        let rpc_url = match overrides.rpc_url {
            Some(url) => url,
            None => interpolate_env(spec.rpc_url, &lookup)?,
        };

        let gas_price_gwei = overrides
            .gas_price_gwei
            .unwrap_or_else(|| spec.gas_price_gwei.to_string());
        let gas_price: u128 = parse_units(&gas_price_gwei, "gwei")
            .map_err(|e| ScriptError::InvalidNetwork(format!("invalid gas price: {e}")))?
            .get_absolute()
            .try_into()
            .map_err(|_| ScriptError::InvalidNetwork("gas price too large".to_string()))?;

        let mnemonic_var =
            if spec.mainnet_keys { MAINNET_MNEMONIC_VAR } else { TESTNET_MNEMONIC_VAR };
        let mnemonic = match overrides.mnemonic.or_else(|| lookup(mnemonic_var)) {
            Some(phrase) => normalize_mnemonic(&phrase),
            None if chain.is_local() => DEV_MNEMONIC.to_string(),
            None => {
                return Err(ScriptError::ClientInitialization(format!(
                    "{mnemonic_var} is not set"
                )))
            }
        };

        let explorer_api_key = spec.explorer_key_var.and_then(&lookup);

        Ok(Self {
            name: spec.name.to_string(),
            chain,
            rpc_url,
            gas_price,
            mnemonic,
            explorer_api_key,
        })
    }
}

/// Mnemonics are stored in `.env` files with underscores between words
pub fn normalize_mnemonic(phrase: &str) -> String {
    phrase.trim().replace('_', " ")
}

/// Substitute every `{VAR}` in `template` from the environment
fn interpolate_env(
    template: &str,
    lookup: &impl Fn(&str) -> Option<String>,
) -> Result<String, ScriptError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let end = rest[start..]
            .find('}')
            .map(|i| start + i)
            .ok_or_else(|| ScriptError::InvalidNetwork(format!("malformed RPC url `{template}`")))?;
        let var = &rest[start + 1..end];
        let value = lookup(var)
            .ok_or_else(|| ScriptError::ClientInitialization(format!("{var} is not set")))?;

        out.push_str(&rest[..start]);
        out.push_str(&value);
        rest = &rest[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

// ------------------
// | Named accounts |
// ------------------

/// The accounts derived from the network mnemonic, by role
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NamedAccount {
    /// Deploys and initializes the contracts
    Deployer,
    /// Owns the protocol
    ProtocolOwner,
    /// Receives protocol fees
    FoundationTreasury,
    /// Test user 1
    User1,
    /// Test user 2
    User2,
    /// Test user 3
    User3,
    /// Test user 4
    User4,
    /// Test user 5
    User5,
    /// Test user 6
    User6,
    /// Test user 7
    User7,
}

impl NamedAccount {
    /// Every named account, in derivation order
    pub const ALL: [NamedAccount; 10] = [
        NamedAccount::Deployer,
        NamedAccount::ProtocolOwner,
        NamedAccount::FoundationTreasury,
        NamedAccount::User1,
        NamedAccount::User2,
        NamedAccount::User3,
        NamedAccount::User4,
        NamedAccount::User5,
        NamedAccount::User6,
        NamedAccount::User7,
    ];

    /// The mnemonic derivation index of the account
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// The camel-case name used in plan files
    pub fn name(&self) -> &'static str {
        match self {
            NamedAccount::Deployer => "deployer",
            NamedAccount::ProtocolOwner => "protocolOwner",
            NamedAccount::FoundationTreasury => "foundationTreasury",
            NamedAccount::User1 => "user1",
            NamedAccount::User2 => "user2",
            NamedAccount::User3 => "user3",
            NamedAccount::User4 => "user4",
            NamedAccount::User5 => "user5",
            NamedAccount::User6 => "user6",
            NamedAccount::User7 => "user7",
        }
    }
}

impl Display for NamedAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for NamedAccount {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NamedAccount::ALL
            .into_iter()
            .find(|account| account.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ScriptError::PlanParsing(format!("unknown named account `{s}`")))
    }
}

/// Addresses of the named accounts
#[derive(Clone, Debug)]
pub struct NamedAccounts {
    /// Addresses indexed by [`NamedAccount::index`]
    addresses: Vec<Address>,
}

impl NamedAccounts {
    /// Wrap the derived addresses, which must cover every named account
    pub fn new(addresses: Vec<Address>) -> Result<Self, ScriptError> {
        if addresses.len() < NamedAccount::ALL.len() {
            return Err(ScriptError::ClientInitialization(format!(
                "expected {} accounts, derived {}",
                NamedAccount::ALL.len(),
                addresses.len()
            )));
        }
        Ok(Self { addresses })
    }

    /// The address of a named account
    pub fn get(&self, account: NamedAccount) -> Address {
        self.addresses[account.index()]
    }

    /// The deployer address
    pub fn deployer(&self) -> Address {
        self.get(NamedAccount::Deployer)
    }

    /// The protocol owner address
    pub fn protocol_owner(&self) -> Address {
        self.get(NamedAccount::ProtocolOwner)
    }

    /// Every named address, in derivation order
    pub fn all(&self) -> Vec<Address> {
        NamedAccount::ALL.iter().map(|account| self.get(*account)).collect()
    }
}

/// A reference to an account in a plan file: a hex address or a named account
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccountRef {
    /// A literal address
    Address(Address),
    /// One of the mnemonic-derived accounts
    Named(NamedAccount),
}

impl AccountRef {
    /// Resolve the reference against the derived accounts
    pub fn resolve(&self, accounts: &NamedAccounts) -> Address {
        match self {
            AccountRef::Address(address) => *address,
            AccountRef::Named(account) => accounts.get(*account),
        }
    }
}

impl FromStr for AccountRef {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with("0x") {
            Address::from_str(s)
                .map(AccountRef::Address)
                .map_err(|e| ScriptError::PlanParsing(format!("invalid address `{s}`: {e}")))
        } else {
            s.parse().map(AccountRef::Named)
        }
    }
}

impl<'de> serde::Deserialize<'de> for AccountRef {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn test_goerli_interpolates_infura_key() {
        let lookup = lookup_from(&[
            ("INFURA_APIKEY", "abc123"),
            ("TESTNET_MNEMONIC", "one_two_three"),
            ("ETHERSCAN_APIKEY", "scan"),
        ]);
        let config = NetworkConfig::resolve("goerli", NetworkOverrides::default(), lookup).unwrap();

        assert_eq!(config.rpc_url, "https://goerli.infura.io/v3/abc123");
        assert_eq!(config.chain.id(), 5);
        assert_eq!(config.gas_price, 1_000_000_000);
        assert_eq!(config.mnemonic, "one two three");
        assert_eq!(config.explorer_api_key.as_deref(), Some("scan"));
    }

    #[test]
    fn test_homestead_is_mainnet() {
        let lookup = lookup_from(&[("INFURA_APIKEY", "k"), ("MAINNET_MNEMONIC", "a_b")]);
        let config =
            NetworkConfig::resolve("homestead", NetworkOverrides::default(), lookup).unwrap();

        assert_eq!(config.name, "mainnet");
        assert_eq!(config.gas_price, 22_000_000_000);
        assert!(config.chain.is_prod());
    }

    #[test]
    fn test_missing_mnemonic_off_local_network_is_an_error() {
        let lookup = lookup_from(&[("MATIC_APIKEY", "k")]);
        let res = NetworkConfig::resolve("polygon", NetworkOverrides::default(), lookup);
        assert!(matches!(res, Err(ScriptError::ClientInitialization(_))));
    }

    #[test]
    fn test_missing_rpc_key_is_an_error() {
        let lookup = lookup_from(&[("TESTNET_MNEMONIC", "a_b")]);
        let res = NetworkConfig::resolve("goerli", NetworkOverrides::default(), lookup);
        assert!(matches!(res, Err(ScriptError::ClientInitialization(_))));
    }

    #[test]
    fn test_local_network_defaults() {
        let config =
            NetworkConfig::resolve("hardhat", NetworkOverrides::default(), |_| None).unwrap();

        assert_eq!(config.rpc_url, LOCAL_RPC_URL);
        assert_eq!(config.mnemonic, DEV_MNEMONIC);
        assert!(config.explorer_api_key.is_none());
    }

    #[test]
    fn test_overrides_take_precedence() {
        let overrides = NetworkOverrides {
            rpc_url: Some("http://node:8545".to_string()),
            mnemonic: Some("x_y_z".to_string()),
            gas_price_gwei: Some("2.5".to_string()),
        };
        let config = NetworkConfig::resolve("mumbai", overrides, |_| None).unwrap();

        assert_eq!(config.rpc_url, "http://node:8545");
        assert_eq!(config.mnemonic, "x y z");
        assert_eq!(config.gas_price, 2_500_000_000);
    }

    #[test]
    fn test_unknown_network() {
        let res = NetworkConfig::resolve("sepolia", NetworkOverrides::default(), |_| None);
        assert!(matches!(res, Err(ScriptError::InvalidNetwork(_))));
    }

    #[test]
    fn test_account_refs() {
        let addresses: Vec<Address> = (1..=10u8).map(|i| Address::repeat_byte(i)).collect();
        let accounts = NamedAccounts::new(addresses).unwrap();

        let owner: AccountRef = "protocolOwner".parse().unwrap();
        assert_eq!(owner.resolve(&accounts), Address::repeat_byte(2));

        let user: AccountRef = "USER7".parse().unwrap();
        assert_eq!(user.resolve(&accounts), Address::repeat_byte(10));

        let literal: AccountRef =
            "0x51D33ab709B04B235F84fd2333c93F747645Ceea".parse().unwrap();
        assert!(matches!(literal, AccountRef::Address(_)));

        assert!("nobody".parse::<AccountRef>().is_err());
        assert!("0x1234".parse::<AccountRef>().is_err());
    }

    #[test]
    fn test_too_few_accounts() {
        assert!(NamedAccounts::new(vec![Address::ZERO; 3]).is_err());
    }
}
