//! Gas cost accounting for deployments and transactions

use alloy::primitives::{utils::format_units, U256};
use tracing::info;

use crate::constants::GAS_REPORT_TIERS_GWEI;

/// One gwei, in wei
const GWEI: u64 = 1_000_000_000;

/// Format a wei amount as ether, trimming trailing zeros but keeping one
/// fractional digit, e.g. `1.0` or `0.00042`
pub fn format_ether(wei: U256) -> String {
    // `format_units` only fails on invalid unit names
    let formatted = format_units(wei, "ether").unwrap_or_else(|_| wei.to_string());
    match formatted.split_once('.') {
        Some((whole, frac)) => {
            let frac = frac.trim_end_matches('0');
            let frac = if frac.is_empty() { "0" } else { frac };
            format!("{whole}.{frac}")
        }
        None => format!("{formatted}.0"),
    }
}

/// The estimated cost of a transaction: `<eth> ETH`
pub fn tx_gas_cost(gas_limit: u64, gas_price: U256) -> String {
    format!("{} ETH", format_ether(U256::from(gas_limit) * gas_price))
}

/// The actual cost of a transaction against its estimate:
/// `<eth> ETH Used.  (Estimated: <eth> ETH)`
pub fn actual_tx_gas_cost(gas_used: u64, gas_limit: u64, gas_price: U256) -> String {
    let used = format_ether(U256::from(gas_used) * gas_price);
    let estimated = format_ether(U256::from(gas_limit) * gas_price);
    format!("{used} ETH Used.  (Estimated: {estimated} ETH)")
}

/// Gas accumulated over a script run
#[derive(Clone, Debug, Default)]
pub struct GasTracker {
    /// Total gas used
    total: u64,
}

impl GasTracker {
    /// A tracker with nothing accumulated
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the gas used by one transaction
    pub fn add(&mut self, gas_used: u64) {
        self.total = self.total.saturating_add(gas_used);
    }

    /// The total gas used so far
    pub fn total(&self) -> u64 {
        self.total
    }

    /// The total priced at a gas price given in gwei, formatted as ether
    pub fn cost_at_gwei(&self, gwei: u64) -> String {
        format_ether(U256::from(self.total) * U256::from(gwei) * U256::from(GWEI))
    }

    /// The total priced at each reporting tier
    pub fn tiered_costs(&self) -> Vec<(u64, String)> {
        GAS_REPORT_TIERS_GWEI.iter().map(|gwei| (*gwei, self.cost_at_gwei(*gwei))).collect()
    }

    /// Log the total priced at each reporting tier
    pub fn report(&self) {
        info!("     - Total Gas Cost");
        for (gwei, cost) in self.tiered_costs() {
            info!("       @ {gwei} gwei: {cost}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_ether() {
        assert_eq!(format_ether(U256::ZERO), "0.0");
        assert_eq!(format_ether(U256::from(10u64).pow(U256::from(18u64))), "1.0");
        assert_eq!(format_ether(U256::from(1_500_000_000_000_000_000u128)), "1.5");
        assert_eq!(format_ether(U256::from(420_000_000_000_000u64)), "0.00042");
        assert_eq!(format_ether(U256::from(1u64)), "0.000000000000000001");
    }

    #[test]
    fn test_tx_gas_cost() {
        // 21000 gas at 1 gwei
        assert_eq!(tx_gas_cost(21_000, U256::from(GWEI)), "0.000021 ETH");
    }

    #[test]
    fn test_actual_tx_gas_cost() {
        let cost = actual_tx_gas_cost(50_000, 100_000, U256::from(2 * GWEI));
        assert_eq!(cost, "0.0001 ETH Used.  (Estimated: 0.0002 ETH)");
    }

    #[test]
    fn test_tiered_costs() {
        let mut tracker = GasTracker::new();
        tracker.add(600_000);
        tracker.add(400_000);
        assert_eq!(tracker.total(), 1_000_000);

        let costs = tracker.tiered_costs();
        assert_eq!(
            costs,
            vec![(10, "0.01".to_string()), (100, "0.1".to_string()), (150, "0.15".to_string())]
        );
    }
}
