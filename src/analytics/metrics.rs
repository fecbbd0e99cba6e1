//! Metrics calculation for session analysis

use crate::simulation::history::{PriceHistory, TransactionKind};
use crate::simulation::SessionResults;
use serde::{Deserialize, Serialize};

/// Calculator for session metrics
pub struct MetricsCalculator;

impl MetricsCalculator {
    /// Pool price after every step
    pub fn price_over_time(results: &SessionResults) -> Vec<PriceDataPoint> {
        results
            .steps
            .iter()
            .map(|s| PriceDataPoint {
                step: s.step,
                price: s.price_after,
                price_usd: s.price_usd_after,
            })
            .collect()
    }

    /// Running net token1 flow into the pool, per executed transaction
    pub fn cumulative_token1_flow(results: &SessionResults) -> Vec<CumulativeDataPoint> {
        let mut cumulative = 0.0;
        let mut points = Vec::new();

        for (i, tx) in results.executed.iter().enumerate() {
            cumulative += match tx.kind {
                TransactionKind::Buy => tx.input_amount,
                TransactionKind::Sell => -tx.output_amount,
                TransactionKind::AddLiquidity => tx.input_amount,
                TransactionKind::RemoveLiquidity => -tx.input_amount,
            };
            points.push(CumulativeDataPoint {
                transaction: i as u32,
                value: cumulative,
            });
        }

        points
    }

    /// Largest relative change of k across an accepted trade step
    pub fn max_trade_k_drift(results: &SessionResults) -> f64 {
        let mut previous_k = results.initial.k;
        let mut drift: f64 = 0.0;

        for step in &results.steps {
            if step.action == "trade" && step.accepted && previous_k > 0.0 {
                drift = drift.max(((step.k_after - previous_k) / previous_k).abs());
            }
            previous_k = step.k_after;
        }

        drift
    }

    /// Statistics over the price history kept by the pool
    pub fn history_stats(results: &SessionResults) -> HistoryStats {
        let history: PriceHistory = results.price_history.iter().cloned().collect();

        HistoryStats {
            points: history.len() as u32,
            min_price_usd: history.min_price_usd().unwrap_or_default(),
            max_price_usd: history.max_price_usd().unwrap_or_default(),
            average_price_usd: history.average_price_usd().unwrap_or_default(),
            change_percentage: history.price_change_percentage(),
        }
    }

    /// Count executed transactions by kind
    pub fn transaction_breakdown(results: &SessionResults) -> TransactionBreakdown {
        let mut breakdown = TransactionBreakdown::default();
        for tx in &results.executed {
            match tx.kind {
                TransactionKind::Buy => breakdown.buys += 1,
                TransactionKind::Sell => breakdown.sells += 1,
                TransactionKind::AddLiquidity => breakdown.adds += 1,
                TransactionKind::RemoveLiquidity => breakdown.removes += 1,
            }
        }
        breakdown
    }
}

/// Data point for cumulative series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CumulativeDataPoint {
    pub transaction: u32,
    pub value: f64,
}

/// Price data point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceDataPoint {
    pub step: u32,
    pub price: f64,
    pub price_usd: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryStats {
    pub points: u32,
    pub min_price_usd: f64,
    pub max_price_usd: f64,
    pub average_price_usd: f64,
    pub change_percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionBreakdown {
    pub buys: u32,
    pub sells: u32,
    pub adds: u32,
    pub removes: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PoolConfig;
    use crate::simulation::{LiquidityIntent, Orchestrator, SessionStep, TradeIntent};

    fn sample_results() -> SessionResults {
        let steps = vec![
            SessionStep::Simulate,
            SessionStep::Trade {
                intents: vec![TradeIntent::buy(1.0), TradeIntent::buy(0.5)],
            },
            SessionStep::Liquidity {
                intents: vec![LiquidityIntent::add(1.0, 2_000_000.0)],
            },
            SessionStep::Trade {
                intents: vec![TradeIntent::sell(3_000_000.0)],
            },
        ];
        Orchestrator::new(PoolConfig::default()).unwrap().run(&steps)
    }

    #[test]
    fn test_breakdown_and_series() {
        let results = sample_results();

        let breakdown = MetricsCalculator::transaction_breakdown(&results);
        assert_eq!(
            breakdown,
            TransactionBreakdown { buys: 2, sells: 1, adds: 1, removes: 0 }
        );

        let prices = MetricsCalculator::price_over_time(&results);
        assert_eq!(prices.len(), 4);

        let flow = MetricsCalculator::cumulative_token1_flow(&results);
        assert_eq!(flow.len(), 4);
        assert!((flow[2].value - 2.5).abs() < 1e-12);
        assert!(flow[3].value < flow[2].value);
    }

    #[test]
    fn test_trade_k_drift_is_tiny() {
        let results = sample_results();
        assert!(MetricsCalculator::max_trade_k_drift(&results) < 1e-12);
    }

    #[test]
    fn test_history_stats() {
        let results = sample_results();
        let stats = MetricsCalculator::history_stats(&results);

        // opening point, simulate, three committed batches
        assert_eq!(stats.points, 5);
        assert!(stats.min_price_usd <= stats.average_price_usd);
        assert!(stats.average_price_usd <= stats.max_price_usd);
        // Buying token2 raises its USD price
        assert!(results.price_history[2].price_usd > results.price_history[1].price_usd);
        assert_eq!(stats.change_percentage, results.final_state.price_change_percentage);
    }

    #[test]
    fn test_history_stats_empty() {
        let mut results = sample_results();
        results.price_history.clear();

        let stats = MetricsCalculator::history_stats(&results);
        assert_eq!(stats.points, 0);
        assert_eq!(stats.average_price_usd, 0.0);
        assert_eq!(stats.change_percentage, 0.0);
    }
}
