//! Block-explorer verification through an external CLI

use std::process::Command;

use alloy::primitives::Address;
use tracing::{error, info, warn};

use crate::{
    client::ScriptContext,
    constants::{ALREADY_VERIFIED_MARKER, CONTRACTS_SOURCE_DIR},
    deploy::resolve_implementation,
    errors::ScriptError,
};

/// A contract to verify
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifyRequest {
    /// The manifest name, used for logging
    pub name: String,
    /// The deployed address
    pub address: Address,
    /// Fully-qualified source reference, e.g. `Taggr.sol:Taggr`
    pub contract_ref: Option<String>,
    /// Stringified constructor arguments
    pub constructor_args: Vec<String>,
}

/// How a verification attempt ended
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// The explorer accepted the source
    Verified,
    /// The explorer already had the source
    AlreadyVerified,
    /// Anything else, with the verifier's output
    Failed(String),
}

/// Build the verifier invocation: `<cmd> --network <name> [--contract
/// contracts/<ref>] <address> <args…>`
pub fn build_verify_command(verifier: &str, network: &str, req: &VerifyRequest) -> Vec<String> {
    let mut argv: Vec<String> = verifier.split_whitespace().map(String::from).collect();
    argv.extend(["--network".to_string(), network.to_string()]);

    if let Some(contract_ref) = req.contract_ref.as_deref().filter(|r| !r.is_empty()) {
        argv.push("--contract".to_string());
        argv.push(format!("{CONTRACTS_SOURCE_DIR}/{contract_ref}"));
    }

    argv.push(format!("{:#x}", req.address));
    argv.extend(req.constructor_args.iter().cloned());
    argv
}

/// Classify the verifier's exit status and combined output
pub fn classify_output(success: bool, output: &str) -> VerifyOutcome {
    if output.to_lowercase().contains(ALREADY_VERIFIED_MARKER) {
        VerifyOutcome::AlreadyVerified
    } else if success {
        VerifyOutcome::Verified
    } else {
        VerifyOutcome::Failed(output.trim().to_string())
    }
}

/// Runs the verification CLI for the network a script runs against
#[derive(Clone, Debug)]
pub struct Verifier {
    /// The verification command, split on whitespace before running
    command: String,
    /// The network name passed to `--network`
    network: String,
    /// Verification is a no-op on local networks
    enabled: bool,
}

impl Verifier {
    /// A verifier for the context's network
    pub fn new(ctx: &ScriptContext, command: &str) -> Self {
        Self {
            command: command.to_string(),
            network: ctx.network.name.clone(),
            enabled: !ctx.chain().is_local(),
        }
    }

    /// Verify a contract. Failures are logged and do not abort the run; only a
    /// verifier that cannot be spawned is an error.
    pub fn verify(&self, req: &VerifyRequest) -> Result<VerifyOutcome, ScriptError> {
        if !self.enabled {
            info!("Skipping verification of {} on a local network", req.name);
            return Ok(VerifyOutcome::Verified);
        }

        info!(
            "Verifying {} at address \"{:#x}\" with {} arg(s)...",
            req.name,
            req.address,
            req.constructor_args.len()
        );
        let argv = build_verify_command(&self.command, &self.network, req);
        info!("CMD: {}", argv.join(" "));

        let (program, args) = argv
            .split_first()
            .ok_or_else(|| ScriptError::Verification("empty verifier command".to_string()))?;
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|e| ScriptError::Verification(format!("could not run {program}: {e}")))?;

        let combined = format!(
            "{}{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        let outcome = classify_output(output.status.success(), &combined);
        match &outcome {
            VerifyOutcome::Verified => info!("{} verified!", req.name),
            VerifyOutcome::AlreadyVerified => info!("{} already verified", req.name),
            VerifyOutcome::Failed(msg) => error!("failed to verify {}: {msg}", req.name),
        }

        Ok(outcome)
    }

    /// Verify a recorded deployment by manifest name
    pub fn verify_recorded(
        &self,
        ctx: &ScriptContext,
        name: &str,
        contract_ref: Option<String>,
    ) -> Result<VerifyOutcome, ScriptError> {
        let record = ctx.store.load(name)?;
        self.verify(&VerifyRequest {
            name: name.to_string(),
            address: record.address,
            contract_ref,
            constructor_args: record.constructor_args,
        })
    }

    /// Verify the implementation behind a recorded proxy. A proxy whose
    /// implementation cannot be found is logged and skipped.
    pub async fn verify_proxy(
        &self,
        ctx: &ScriptContext,
        name: &str,
    ) -> Result<Option<VerifyOutcome>, ScriptError> {
        if !self.enabled {
            info!("Skipping verification of {name} on a local network");
            return Ok(None);
        }

        let Some(implementation) = resolve_implementation(ctx, name).await? else {
            warn!("Failed to Verify Proxy: \"{name}\" - Implementation Address not found!");
            return Ok(None);
        };

        info!("Found implementation address for {name} Proxy: \"{implementation:#x}\"");
        self.verify(&VerifyRequest {
            name: name.to_string(),
            address: implementation,
            contract_ref: None,
            constructor_args: vec![],
        })
        .map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(contract_ref: Option<&str>, args: &[&str]) -> VerifyRequest {
        VerifyRequest {
            name: "TaggrLazy721".to_string(),
            address: Address::repeat_byte(0xaa),
            contract_ref: contract_ref.map(String::from),
            constructor_args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    #[test]
    fn test_command_without_contract_ref() {
        let argv = build_verify_command("npx hardhat verify", "goerli", &request(None, &[]));
        assert_eq!(
            argv,
            vec![
                "npx",
                "hardhat",
                "verify",
                "--network",
                "goerli",
                "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
            ]
        );
    }

    #[test]
    fn test_command_with_contract_ref_and_args() {
        let req = request(Some("TaggrLazy721.sol:TaggrLazy721"), &["0x01", "42"]);
        let argv = build_verify_command("hardhat verify", "polygon", &req);
        assert_eq!(
            argv[4..],
            [
                "--contract",
                "contracts/TaggrLazy721.sol:TaggrLazy721",
                "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
                "0x01",
                "42",
            ]
        );
    }

    #[test]
    fn test_empty_contract_ref_is_ignored() {
        let argv = build_verify_command("hardhat verify", "mainnet", &request(Some(""), &[]));
        assert!(!argv.contains(&"--contract".to_string()));
    }

    #[test]
    fn test_output_classification() {
        assert_eq!(classify_output(true, "Successfully verified"), VerifyOutcome::Verified);
        assert_eq!(
            classify_output(false, "Error: Contract source code already verified"),
            VerifyOutcome::AlreadyVerified
        );
        assert_eq!(
            classify_output(false, "  Contract Already Verified  "),
            VerifyOutcome::AlreadyVerified
        );
        assert_eq!(
            classify_output(false, "  rate limited\n"),
            VerifyOutcome::Failed("rate limited".to_string())
        );
    }
}
