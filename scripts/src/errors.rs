//! Definitions of errors that can occur during the execution of the deployment scripts

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

/// Errors that can occur during the execution of the deployment scripts
#[derive(Debug)]
pub enum ScriptError {
    /// The selected network is unknown or does not match the connected node
    InvalidNetwork(String),
    /// Error initializing the RPC client or its signers
    ClientInitialization(String),
    /// Error reading a deployment record
    ReadDeployments(String),
    /// Error writing a deployment record
    WriteDeployments(String),
    /// Error parsing a compilation artifact or exported ABI
    ArtifactParsing(String),
    /// Error reading or parsing an operator plan file
    PlanParsing(String),
    /// Error constructing calldata or parsing a call argument
    CalldataConstruction(String),
    /// Error deploying a contract
    ContractDeployment(String),
    /// Error calling a contract method
    ContractInteraction(String),
    /// Error fetching token metadata over HTTP
    MetadataFetch(String),
    /// Error running the block-explorer verification CLI
    Verification(String),
    /// Error building a Merkle tree or proof
    Merkle(String),
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::InvalidNetwork(s) => write!(f, "invalid network: {}", s),
            ScriptError::ClientInitialization(s) => write!(f, "error initializing client: {}", s),
            ScriptError::ReadDeployments(s) => write!(f, "error reading deployments: {}", s),
            ScriptError::WriteDeployments(s) => write!(f, "error writing deployments: {}", s),
            ScriptError::ArtifactParsing(s) => write!(f, "error parsing artifact: {}", s),
            ScriptError::PlanParsing(s) => write!(f, "error parsing plan: {}", s),
            ScriptError::CalldataConstruction(s) => write!(f, "error constructing calldata: {}", s),
            ScriptError::ContractDeployment(s) => write!(f, "error deploying contract: {}", s),
            ScriptError::ContractInteraction(s) => {
                write!(f, "error interacting with contract: {}", s)
            }
            ScriptError::MetadataFetch(s) => write!(f, "error fetching token metadata: {}", s),
            ScriptError::Verification(s) => write!(f, "error verifying contract: {}", s),
            ScriptError::Merkle(s) => write!(f, "error building merkle tree: {}", s),
        }
    }
}

impl Error for ScriptError {}
