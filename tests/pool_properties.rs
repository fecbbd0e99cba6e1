// Property tests for the pool engine: constant-product preservation across
// trade batches, round-trip losses, and the supply/drain/history limits.

use lp_simulator::config::PoolConfig;
use lp_simulator::simulation::history::PRICE_HISTORY_CAP;
use lp_simulator::simulation::{LiquidityIntent, LiquidityKind, SimulatedPool, TradeIntent};
use lp_simulator::PoolError;
use proptest::prelude::*;

fn pool(token1_reserve: f64, token2_reserve: f64, token2_total_supply: f64) -> SimulatedPool {
    SimulatedPool::new(PoolConfig {
        token1_reserve,
        token2_reserve,
        token2_total_supply,
        ..Default::default()
    })
    .unwrap()
}

fn arb_trade() -> impl Strategy<Value = TradeIntent> {
    prop_oneof![
        (0.0f64..5.0).prop_map(TradeIntent::buy),
        (0.0f64..5_000_000.0).prop_map(TradeIntent::sell),
    ]
}

fn arb_liquidity() -> impl Strategy<Value = LiquidityIntent> {
    (
        prop_oneof![Just(LiquidityKind::Add), Just(LiquidityKind::Remove)],
        -20.0f64..20.0,
        -5_000.0f64..500.0,
    )
        .prop_map(|(kind, token1_amount, token2_amount)| LiquidityIntent {
            kind,
            token1_amount,
            token2_amount,
        })
}

proptest! {
    /// k is unchanged by any committed buy/sell batch
    #[test]
    fn prop_trades_preserve_k(
        token1 in 0.5f64..100.0,
        token2 in 1_000_000.0f64..50_000_000.0,
        trades in prop::collection::vec(arb_trade(), 1..12),
    ) {
        let mut pool = pool(token1, token2, 1_000_000_000.0);
        let k_before = pool.k();

        if pool.execute_trade_batch(&trades).is_ok() {
            let k_after = pool.k();
            prop_assert!(((k_after - k_before) / k_before).abs() < 1e-9);
            prop_assert!(pool.current().token1_reserve > 0.0);
            prop_assert!(pool.current().token2_reserve > 0.0);
        }
    }

    /// Buying then selling the proceeds straight back never returns more
    #[test]
    fn prop_round_trip_never_profits(
        token1 in 0.5f64..100.0,
        token2 in 1_000_000.0f64..50_000_000.0,
        amount in 0.001f64..10.0,
    ) {
        let mut pool = pool(token1, token2, 1_000_000_000.0);

        let bought = pool.execute_trade_batch(&[TradeIntent::buy(amount)]).unwrap();
        let received = bought.transactions[0].output_amount;

        let sold = pool.execute_trade_batch(&[TradeIntent::sell(received)]).unwrap();
        let returned = sold.transactions[0].output_amount;

        // Zero fees make this break-even in exact arithmetic
        prop_assert!(returned <= amount + token1 * 1e-9);
    }

    /// Whatever mix of signs a liquidity batch carries, committed reserves
    /// stay positive and within the total supply
    #[test]
    fn prop_liquidity_keeps_reserve_invariants(
        intents in prop::collection::vec(arb_liquidity(), 1..10),
    ) {
        let mut pool = pool(10.0, 100.0, 1000.0);

        if pool.execute_liquidity_batch(&intents).is_ok() {
            let state = pool.current();
            prop_assert!(state.token1_reserve > 0.0);
            prop_assert!(state.token2_reserve > 0.0);
            prop_assert!(state.token2_reserve <= state.token2_total_supply);
        }
    }

    /// Rejected trade batches leave the pool and histories untouched
    #[test]
    fn prop_rejected_batch_is_atomic(
        buys in prop::collection::vec(0.01f64..2.0, 0..5),
        excess in 1.0f64..1_000.0,
    ) {
        let mut pool = pool(10.0, 900.0, 1000.0);
        let before = pool.current().clone();

        let mut batch: Vec<TradeIntent> = buys.into_iter().map(TradeIntent::buy).collect();
        batch.push(TradeIntent::sell(100.0 + excess));

        prop_assert!(pool.execute_trade_batch(&batch).is_err());
        prop_assert_eq!(pool.current(), &before);
        prop_assert!(pool.transactions().is_empty());
    }
}

#[test]
fn round_trip_never_gains() {
    let mut pool = SimulatedPool::new(PoolConfig::default()).unwrap();

    let received = pool.execute_trade_batch(&[TradeIntent::buy(1.0)]).unwrap().transactions[0].output_amount;
    let returned = pool.execute_trade_batch(&[TradeIntent::sell(received)]).unwrap().transactions[0].output_amount;

    assert!(returned <= 1.0 + 1e-9);
    assert!((returned - 1.0).abs() < 1e-9);
}

#[test]
fn supply_ceiling_on_add() {
    let mut pool = pool(10.0, 900.0, 1000.0);

    let err = pool.execute_liquidity_batch(&[LiquidityIntent::add(1.5, 150.0)]).unwrap_err();
    assert!(err.to_string().contains("Only 100 available"));

    pool.execute_liquidity_batch(&[LiquidityIntent::add(1.0, 100.0)]).unwrap();
    assert_eq!(pool.current().token2_reserve, 1000.0);
}

#[test]
fn drain_prevention_on_remove() {
    let mut pool = pool(10.0, 100.0, 1000.0);

    let outcome = pool.execute_liquidity_batch(&[LiquidityIntent::remove(10.0, 100.0)]).unwrap();

    assert_eq!(outcome.rejected.len(), 1);
    assert_eq!(outcome.rejected[0].error, Some(PoolError::WouldDrainPool));
    assert_eq!(pool.current().token1_reserve, 10.0);
    assert_eq!(pool.current().token2_reserve, 100.0);
}

#[test]
fn concrete_buy_scenario() {
    let mut pool = SimulatedPool::new(PoolConfig::default()).unwrap();
    assert!((pool.k() - 38_000_000.0).abs() < 1e-6);

    let outcome = pool.execute_trade_batch(&[TradeIntent::buy(1.0)]).unwrap();

    assert!((pool.current().token1_reserve - 4.8).abs() < 1e-12);
    assert!((pool.current().token2_reserve - 7_916_666.667).abs() < 0.001);
    assert!((outcome.transactions[0].output_amount - 2_083_333.33).abs() < 0.01);
}

#[test]
fn batch_ordering_compounds_impact() {
    let mut split = SimulatedPool::new(PoolConfig::default()).unwrap();
    let outcome = split.execute_trade_batch(&[TradeIntent::buy(1.0), TradeIntent::buy(1.0)]).unwrap();

    let mut single = SimulatedPool::new(PoolConfig::default()).unwrap();
    let combined = single.execute_trade_batch(&[TradeIntent::buy(2.0)]).unwrap().transactions[0].output_amount;

    let first = outcome.transactions[0].output_amount;
    let second = outcome.transactions[1].output_amount;
    assert!(second < first);
    assert!(second < combined);
}

#[test]
fn history_bounds() {
    let mut pool = SimulatedPool::new(PoolConfig::default()).unwrap();
    let mut prices = Vec::new();

    for _ in 0..25 {
        pool.execute_trade_batch(&[TradeIntent::buy(0.05)]).unwrap();
        prices.push(pool.current().current_price());
    }

    let history = pool.price_history();
    assert_eq!(history.len(), PRICE_HISTORY_CAP);

    // Only the newest points survive, oldest first
    let kept: Vec<f64> = history.iter().map(|p| p.price).collect();
    assert_eq!(kept, prices[prices.len() - PRICE_HISTORY_CAP..].to_vec());
}
