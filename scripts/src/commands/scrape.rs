//! The `scrape` script: lists the NFTs an account holds in a collection

use alloy::primitives::U256;
use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    cli::ScrapeArgs,
    client::ScriptContext,
    errors::ScriptError,
    solidity::IERC721Enumerable,
    utils::resolve_token_uri,
};

use super::log_complete;

/// The part of the token metadata the scraper reports
#[derive(Debug, Deserialize)]
struct TokenMetadata {
    /// The token name
    #[serde(default)]
    name: Option<String>,
}

/// Fetch the metadata behind a token URI
async fn fetch_metadata(
    http: &reqwest::Client,
    token_uri: &str,
) -> Result<TokenMetadata, ScriptError> {
    let url = resolve_token_uri(token_uri);
    http.get(&url)
        .send()
        .await
        .and_then(|resp| resp.error_for_status())
        .map_err(|e| ScriptError::MetadataFetch(format!("{url}: {e}")))?
        .json::<TokenMetadata>()
        .await
        .map_err(|e| ScriptError::MetadataFetch(format!("{url}: {e}")))
}

/// Print the balance of the account, then each token ID with its metadata name
pub async fn run(args: ScrapeArgs, ctx: &ScriptContext) -> Result<(), ScriptError> {
    if ctx.chain().is_local() {
        info!("Skipping NFT scraping on {}", ctx.chain());
        return Ok(());
    }

    let account = args.account.resolve(&ctx.accounts);
    ctx.banner("NFT Scraper");
    info!("  Scraping Account: {account:#x}");
    info!("  Scraping NFTs of: {:#x}", args.nft_contract);

    let nft = IERC721Enumerable::new(args.nft_contract, ctx.provider.clone());
    let balance = nft
        .balanceOf(account)
        .call()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
    info!("  Balance: {balance}");

    let http = reqwest::Client::new();
    let mut index = U256::ZERO;
    while index < balance {
        let token_id = nft
            .tokenOfOwnerByIndex(account, index)
            .call()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
        let token_uri = nft
            .tokenURI(token_id)
            .call()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

        match fetch_metadata(&http, &token_uri).await {
            Ok(meta) => {
                info!("  [{index}] = {token_id} = {}", meta.name.unwrap_or_default())
            }
            Err(e) => warn!("  [{index}] = {token_id} = <{e}>"),
        }
        index += U256::from(1u64);
    }

    log_complete("NFT Scraper Complete.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_name_is_optional() {
        let meta: TokenMetadata =
            serde_json::from_str(r#"{ "name": "Glass Ape #7", "image": "ipfs://x" }"#).unwrap();
        assert_eq!(meta.name.as_deref(), Some("Glass Ape #7"));

        let meta: TokenMetadata = serde_json::from_str(r#"{ "description": "none" }"#).unwrap();
        assert!(meta.name.is_none());
    }
}
