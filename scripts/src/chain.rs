//! Chain metadata: network names, chain IDs and the environment class of each chain

use std::fmt::{self, Display};

use crate::constants::{
    GOERLI_CHAIN_ID, HARDHAT_CHAIN_ID, KOVAN_CHAIN_ID, MAINNET_CHAIN_ID, MUMBAI_CHAIN_ID,
    POLYGON_CHAIN_ID, RINKEBY_CHAIN_ID, ROPSTEN_CHAIN_ID,
};

/// The environment class a chain belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChainType {
    /// A production network holding real value
    Production,
    /// A public test network
    Testnet,
    /// A local development node, or any chain we do not recognize
    Local,
}

/// Resolve a network name to its chain ID, returning 0 for unknown networks
pub fn chain_id_by_name(name: &str) -> u64 {
    match name.to_lowercase().as_str() {
        "homestead" | "mainnet" => MAINNET_CHAIN_ID,
        "ropsten" => ROPSTEN_CHAIN_ID,
        "rinkeby" => RINKEBY_CHAIN_ID,
        "goerli" => GOERLI_CHAIN_ID,
        "kovan" => KOVAN_CHAIN_ID,
        "polygon" => POLYGON_CHAIN_ID,
        "mumbai" => MUMBAI_CHAIN_ID,
        "hardhat" | "coverage" | "localhost" => HARDHAT_CHAIN_ID,
        _ => 0,
    }
}

/// The display name of a chain
pub fn chain_name_by_id(chain_id: u64) -> &'static str {
    match chain_id {
        MAINNET_CHAIN_ID => "Mainnet",
        GOERLI_CHAIN_ID => "Goerli",
        POLYGON_CHAIN_ID => "Polygon",
        MUMBAI_CHAIN_ID => "Mumbai",
        HARDHAT_CHAIN_ID => "Hardhat",
        _ => "Unknown",
    }
}

/// The environment class of a chain
pub fn chain_type_by_id(chain_id: u64) -> ChainType {
    match chain_id {
        MAINNET_CHAIN_ID | POLYGON_CHAIN_ID => ChainType::Production,
        ROPSTEN_CHAIN_ID | RINKEBY_CHAIN_ID | GOERLI_CHAIN_ID | KOVAN_CHAIN_ID
        | MUMBAI_CHAIN_ID => ChainType::Testnet,
        _ => ChainType::Local,
    }
}

/// A chain identified by its ID
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Chain(pub u64);

impl Chain {
    /// Resolve a chain from a network name
    pub fn from_network_name(name: &str) -> Self {
        Self(chain_id_by_name(name))
    }

    /// The chain ID
    pub fn id(&self) -> u64 {
        self.0
    }

    /// The display name of the chain, e.g. `Goerli`
    pub fn name(&self) -> &'static str {
        chain_name_by_id(self.0)
    }

    /// The lowercase name of the chain, used for the deployments directory
    pub fn dir_name(&self) -> String {
        self.name().to_lowercase()
    }

    /// The environment class of the chain
    pub fn chain_type(&self) -> ChainType {
        chain_type_by_id(self.0)
    }

    /// Whether the chain is a production network
    pub fn is_prod(&self) -> bool {
        self.chain_type() == ChainType::Production
    }

    /// Whether the chain is a public testnet
    pub fn is_testnet(&self) -> bool {
        self.chain_type() == ChainType::Testnet
    }

    /// Whether the chain is a local development node
    pub fn is_local(&self) -> bool {
        self.chain_type() == ChainType::Local
    }
}

impl Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_resolve_case_insensitively() {
        assert_eq!(chain_id_by_name("Homestead"), 1);
        assert_eq!(chain_id_by_name("MAINNET"), 1);
        assert_eq!(chain_id_by_name("goerli"), 5);
        assert_eq!(chain_id_by_name("Mumbai"), 80001);
        assert_eq!(chain_id_by_name("coverage"), 31337);
        assert_eq!(chain_id_by_name("sepolia"), 0);
    }

    #[test]
    fn test_chain_names() {
        assert_eq!(chain_name_by_id(137), "Polygon");
        assert_eq!(chain_name_by_id(31337), "Hardhat");
        // Kovan resolves by name but has no display name
        assert_eq!(chain_name_by_id(42), "Unknown");
        assert_eq!(Chain(80001).dir_name(), "mumbai");
    }

    #[test]
    fn test_chain_types() {
        assert_eq!(chain_type_by_id(1), ChainType::Production);
        assert_eq!(chain_type_by_id(137), ChainType::Production);
        for id in [3, 4, 5, 42, 80001] {
            assert_eq!(chain_type_by_id(id), ChainType::Testnet);
        }
        assert_eq!(chain_type_by_id(31337), ChainType::Local);
        assert_eq!(chain_type_by_id(0), ChainType::Local);
        assert_eq!(chain_type_by_id(11155111), ChainType::Local);
    }

    #[test]
    fn test_chain_predicates() {
        let chain = Chain::from_network_name("polygon");
        assert!(chain.is_prod());
        assert!(!chain.is_testnet());
        assert!(!chain.is_local());
        assert_eq!(chain.to_string(), "Polygon (137)");
    }
}
