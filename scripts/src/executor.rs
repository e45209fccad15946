//! Labelled, strictly sequential transaction execution

use std::future::Future;

use alloy::{
    primitives::{B256, U256},
    rpc::types::TransactionReceipt,
};
use tracing::info;

use crate::{
    errors::ScriptError,
    gas::{tx_gas_cost, GasTracker},
};

/// The outcome of a confirmed transaction
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TxSummary {
    /// The transaction hash
    pub hash: B256,
    /// The block the transaction was included in
    pub block_number: Option<u64>,
    /// The gas consumed
    pub gas_used: u64,
    /// The effective gas price paid
    pub gas_price: U256,
}

impl TxSummary {
    /// Summarize a receipt, rejecting reverted transactions
    pub fn from_receipt(receipt: &TransactionReceipt) -> Result<Self, ScriptError> {
        if !receipt.status() {
            return Err(ScriptError::ContractInteraction(format!(
                "transaction {:#x} reverted",
                receipt.transaction_hash
            )));
        }

        Ok(Self {
            hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
            gas_price: U256::from(receipt.effective_gas_price),
        })
    }
}

/// Runs labelled transactions one after another, accumulating their gas
#[derive(Debug)]
pub struct TxExecutor {
    /// Transactions are skipped until this label is reached
    skip_to: Option<String>,
    /// Whether to log each transaction
    verbose: bool,
    /// Whether to log the cost of each transaction
    report_gas: bool,
    /// Gas accumulated by executed transactions
    gas: GasTracker,
}

impl TxExecutor {
    /// An executor that runs every transaction
    pub fn new(verbose: bool, report_gas: bool) -> Self {
        Self { skip_to: None, verbose, report_gas, gas: GasTracker::new() }
    }

    /// Skip every transaction before the one labelled `id`
    pub fn skip_to(&mut self, id: impl Into<String>) {
        self.skip_to = Some(id.into());
    }

    /// Whether a label is still being skipped to
    pub fn is_skipping(&self) -> bool {
        self.skip_to.is_some()
    }

    /// The gas accumulated so far
    pub fn gas(&self) -> &GasTracker {
        &self.gas
    }

    /// Execute the transaction built by `send` under label `id`, returning its
    /// summary, or `None` if it was skipped
    pub async fn execute<F, Fut>(
        &mut self,
        id: &str,
        description: &str,
        send: F,
    ) -> Result<Option<TxSummary>, ScriptError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<TxSummary, ScriptError>>,
    {
        if let Some(target) = &self.skip_to {
            if target != id {
                if self.verbose {
                    info!("[TX-{id}] {description} (skipped)");
                }
                return Ok(None);
            }
            self.skip_to = None;
        }

        if self.verbose {
            info!("[TX-{id}] {description}");
        }

        let summary = send().await?;
        self.gas.add(summary.gas_used);

        if self.verbose && self.report_gas {
            info!("   - Gas Cost: {}", tx_gas_cost(summary.gas_used, summary.gas_price));
        }

        Ok(Some(summary))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    fn summary(gas_used: u64) -> TxSummary {
        TxSummary { gas_used, gas_price: U256::from(1u64), ..Default::default() }
    }

    #[tokio::test]
    async fn test_executes_in_order_and_accumulates_gas() {
        let mut executor = TxExecutor::new(false, false);
        let order = RefCell::new(Vec::new());

        for (id, gas) in [("1-a", 100), ("1-b", 200), ("1-c", 300)] {
            let order = &order;
            let res = executor
                .execute(id, "test", move || async move {
                    order.borrow_mut().push(id);
                    Ok(summary(gas))
                })
                .await
                .unwrap();
            assert_eq!(res.unwrap().gas_used, gas);
        }

        assert_eq!(order.into_inner(), vec!["1-a", "1-b", "1-c"]);
        assert_eq!(executor.gas().total(), 600);
    }

    #[tokio::test]
    async fn test_skip_to_resumes_at_label() {
        let mut executor = TxExecutor::new(false, false);
        executor.skip_to("2-a");

        let skipped =
            executor.execute("1-a", "test", || async { Ok(summary(100)) }).await.unwrap();
        assert!(skipped.is_none());
        assert!(executor.is_skipping());

        let ran = executor.execute("2-a", "test", || async { Ok(summary(50)) }).await.unwrap();
        assert!(ran.is_some());
        assert!(!executor.is_skipping());

        // Labels after the resume point run normally
        let ran = executor.execute("2-b", "test", || async { Ok(summary(25)) }).await.unwrap();
        assert!(ran.is_some());
        assert_eq!(executor.gas().total(), 75);
    }

    #[tokio::test]
    async fn test_errors_propagate() {
        let mut executor = TxExecutor::new(false, false);
        let res = executor
            .execute("1-a", "test", || async {
                Err(ScriptError::ContractInteraction("reverted".to_string()))
            })
            .await;

        assert!(matches!(res, Err(ScriptError::ContractInteraction(_))));
        assert_eq!(executor.gas().total(), 0);
    }
}
