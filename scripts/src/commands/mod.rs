//! Implementations of the deployment scripts, one module per tag

pub mod accounts;
pub mod deploy_core;
pub mod free_mint_pass;
pub mod merkle;
pub mod mint_usdc;
pub mod relay;
pub mod scrape;
pub mod setup;
pub mod verify;

use alloy::primitives::Address;
use tracing::info;

use crate::{
    chain::Chain,
    config::{NamedAccount, NamedAccounts},
    constants::{GOERLI_CHAIN_ID, GOERLI_QA_ACCOUNTS},
    errors::ScriptError,
    plans::parse_account_list,
};

/// The named accounts that receive test funds and passes by default
const DEFAULT_RECIPIENTS: [NamedAccount; 9] = [
    NamedAccount::Deployer,
    NamedAccount::ProtocolOwner,
    NamedAccount::User1,
    NamedAccount::User2,
    NamedAccount::User3,
    NamedAccount::User4,
    NamedAccount::User5,
    NamedAccount::User6,
    NamedAccount::User7,
];

/// Resolve the recipients of a disbursement: the explicit list when given,
/// else the QA wallets on Goerli, else the default named accounts
pub(crate) fn resolve_recipients(
    chain: Chain,
    accounts: &NamedAccounts,
    recipients: Option<&str>,
) -> Result<Vec<Address>, ScriptError> {
    if let Some(list) = recipients {
        let refs = parse_account_list(list)?;
        return Ok(refs.iter().map(|r| r.resolve(accounts)).collect());
    }

    if chain.id() == GOERLI_CHAIN_ID {
        return Ok(GOERLI_QA_ACCOUNTS.to_vec());
    }
    Ok(DEFAULT_RECIPIENTS.iter().map(|account| accounts.get(*account)).collect())
}

/// Log the closing banner of a script
pub(crate) fn log_complete(message: &str) {
    info!("  {message}");
    info!("~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~");
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Accounts whose addresses repeat their derivation index plus one
    fn accounts() -> NamedAccounts {
        NamedAccounts::new((1..=10u8).map(Address::repeat_byte).collect()).unwrap()
    }

    #[test]
    fn test_default_recipients_exclude_the_treasury() {
        let recipients = resolve_recipients(Chain(31337), &accounts(), None).unwrap();

        assert_eq!(recipients.len(), 9);
        assert_eq!(recipients[0], accounts().deployer());
        assert_eq!(recipients[1], accounts().protocol_owner());
        assert!(!recipients.contains(&accounts().get(NamedAccount::FoundationTreasury)));
        assert_eq!(recipients[8], accounts().get(NamedAccount::User7));
    }

    #[test]
    fn test_goerli_defaults_to_the_qa_wallets() {
        let recipients = resolve_recipients(Chain(5), &accounts(), None).unwrap();
        assert_eq!(recipients, GOERLI_QA_ACCOUNTS.to_vec());
    }

    #[test]
    fn test_explicit_recipients_win_everywhere() {
        let list = "foundationTreasury, 0x27607dF15Aa481D31dCEEdc2572ae083809f6995";
        for chain in [Chain(1), Chain(5), Chain(31337)] {
            let recipients = resolve_recipients(chain, &accounts(), Some(list)).unwrap();
            assert_eq!(
                recipients,
                vec![
                    Address::repeat_byte(3),
                    "0x27607dF15Aa481D31dCEEdc2572ae083809f6995".parse().unwrap(),
                ]
            );
        }
    }
}
