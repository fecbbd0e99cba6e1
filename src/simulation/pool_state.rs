//! Simulated Pool State Management
//!
//! Owns the pool for one session: runs trade and liquidity batches
//! (validate against the pre-batch pool, apply to a working copy, commit
//! once), keeps the bounded histories and the simulate/reset lock.

use crate::config::PoolConfig;
use crate::errors::{PoolError, PoolResult};
use crate::simulation::batch::{
    LiquidityBatchOutcome, LiquidityIntent, LiquidityKind, RejectedIntent, TradeBatchOutcome,
    TradeIntent, TradeKind, TradeQuote,
};
use crate::simulation::history::{
    PriceHistory, Transaction, TransactionKind, TransactionLog, LIQUIDITY_HISTORY_CAP,
    TRADE_HISTORY_CAP,
};
use crate::utils::amm_math::{PoolState, Token2Operation};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Whether config edits are allowed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Unlocked,
    Locked,
}

/// Pool plus every derived read-out
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub pool: PoolState,
    pub session: SessionState,
    pub k: f64,
    pub price: f64,
    pub price_usd: f64,
    pub slippage_percentage: f64,
    pub market_cap: f64,
    pub pool_share_percentage: f64,
    pub available_supply: f64,
    pub token1_reserve_usd: f64,
    pub token2_reserve_usd: f64,
    pub price_change_percentage: f64,
}

/// Single-owner handle on the session's pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatedPool {
    state: PoolState,
    session: SessionState,
    price_history: PriceHistory,
    transactions: TransactionLog,
    /// Config the session started from, used by reset
    initial_config: PoolConfig,
}

impl SimulatedPool {
    /// Create a pool from a config and record its opening price
    pub fn new(config: PoolConfig) -> PoolResult<Self> {
        let state = PoolState::from_config(&config)?;

        let mut price_history = PriceHistory::new();
        price_history.record(&state);

        Ok(Self {
            state,
            session: SessionState::Unlocked,
            price_history,
            transactions: TransactionLog::new(),
            initial_config: config,
        })
    }

    pub fn current(&self) -> &PoolState {
        &self.state
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub fn is_locked(&self) -> bool {
        self.session == SessionState::Locked
    }

    pub fn price_history(&self) -> &PriceHistory {
        &self.price_history
    }

    pub fn transactions(&self) -> &TransactionLog {
        &self.transactions
    }

    pub fn k(&self) -> f64 {
        self.state.k()
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        let pool = &self.state;
        PoolSnapshot {
            pool: pool.clone(),
            session: self.session,
            k: pool.k(),
            price: pool.current_price(),
            price_usd: pool.token2_price_usd(),
            slippage_percentage: pool.slippage_percentage(),
            market_cap: pool.market_cap(),
            pool_share_percentage: pool.pool_share_percentage(),
            available_supply: pool.available_supply(),
            token1_reserve_usd: pool.token1_reserve_usd(),
            token2_reserve_usd: pool.token2_reserve_usd(),
            price_change_percentage: self.price_history.price_change_percentage(),
        }
    }

    /// Replace the pool configuration. Rejected once the session is locked.
    pub fn update_config(&mut self, config: PoolConfig) -> PoolResult<()> {
        if self.is_locked() {
            return Err(PoolError::ConfigLocked);
        }

        let next = PoolState::from_config(&config)?;
        let price_moved = next.token1_reserve != self.state.token1_reserve
            || next.token2_reserve != self.state.token2_reserve
            || next.token1_price != self.state.token1_price;

        self.state = next;
        if price_moved {
            self.price_history.record(&self.state);
        }

        info!(
            "Pool configured: {} {} / {} {} @ ${}",
            self.state.token1_reserve,
            self.state.token1_symbol,
            self.state.token2_reserve,
            self.state.token2_symbol,
            self.state.token1_price
        );
        Ok(())
    }

    /// Lock the configuration and start simulating
    pub fn simulate(&mut self) -> PoolResult<()> {
        if self.is_locked() {
            return Err(PoolError::AlreadyLocked);
        }

        self.session = SessionState::Locked;
        self.price_history.record(&self.state);
        info!("Configuration locked, simulation started");
        Ok(())
    }

    /// Restore the starting reserves, clear both histories and unlock.
    ///
    /// Symbols, reference price and total supply keep their edited values;
    /// the total supply is restored too if it no longer covers the starting
    /// token2 reserve. When the reserves actually moved, the restored price
    /// is recorded as the first point of the new history.
    pub fn reset(&mut self) {
        let reserves_moved = self.state.token1_reserve != self.initial_config.token1_reserve
            || self.state.token2_reserve != self.initial_config.token2_reserve;

        self.state.token1_reserve = self.initial_config.token1_reserve;
        self.state.token2_reserve = self.initial_config.token2_reserve;
        if self.state.token2_total_supply < self.state.token2_reserve {
            self.state.token2_total_supply = self.initial_config.token2_total_supply;
        }

        self.price_history.clear();
        self.transactions.clear();
        if reserves_moved {
            self.price_history.record(&self.state);
        }
        self.session = SessionState::Unlocked;
        info!("Pool reset");
    }

    /// Preview a trade without touching the pool
    pub fn quote_trade(&self, intent: TradeIntent) -> TradeQuote {
        let pool = &self.state;
        let (input_reserve, output_reserve) = match intent.kind {
            TradeKind::Buy => (pool.token1_reserve, pool.token2_reserve),
            TradeKind::Sell => (pool.token2_reserve, pool.token1_reserve),
        };

        let output_amount = pool.calculate_output_amount(intent.amount, input_reserve, output_reserve);
        let price_impact = pool.calculate_price_impact(intent.amount, input_reserve, output_reserve);
        let effective_rate = if intent.amount > 0.0 {
            output_amount / intent.amount
        } else {
            0.0
        };

        TradeQuote {
            intent,
            output_amount,
            price_impact,
            effective_rate,
        }
    }

    /// Execute trades in order against the running pool.
    ///
    /// Fails without touching the pool if any amount is not finite or any sell
    /// exceeds the circulating supply.
    pub fn execute_trade_batch(&mut self, intents: &[TradeIntent]) -> PoolResult<TradeBatchOutcome> {
        if let Some(bad) = intents.iter().find(|i| !i.amount.is_finite()) {
            return Err(PoolError::InvalidAmount {
                operation: bad.kind.label(),
                amount: bad.amount,
            });
        }

        // Every sell is checked against the pool as it was before the batch
        for intent in intents.iter().filter(|i| !i.is_noop()) {
            if intent.kind == TradeKind::Sell {
                self.state.validate_token2_amount(intent.amount, Token2Operation::Sell)?;
            }
        }

        let mut working = self.state.clone();
        let mut outcome = TradeBatchOutcome::default();

        for intent in intents {
            if intent.is_noop() {
                outcome.skipped += 1;
                continue;
            }

            let k = working.k();
            let output_amount = match intent.kind {
                TradeKind::Buy => {
                    let new_token1_reserve = working.token1_reserve + intent.amount;
                    let new_token2_reserve = k / new_token1_reserve;
                    let output = working.token2_reserve - new_token2_reserve;

                    working.token1_reserve = new_token1_reserve;
                    working.token2_reserve = new_token2_reserve;
                    output
                }
                TradeKind::Sell => {
                    let new_token2_reserve = working.token2_reserve + intent.amount;
                    if new_token2_reserve > working.token2_total_supply {
                        return Err(PoolError::SupplyExceeded {
                            operation: "sell",
                            amount: intent.amount,
                            symbol: working.token2_symbol.clone(),
                            available: working.available_supply(),
                            scope: "circulating supply",
                        });
                    }
                    let new_token1_reserve = k / new_token2_reserve;
                    let output = working.token1_reserve - new_token1_reserve;

                    working.token1_reserve = new_token1_reserve;
                    working.token2_reserve = new_token2_reserve;
                    output
                }
            };

            let (kind, input_token, output_token) = match intent.kind {
                TradeKind::Buy => (TransactionKind::Buy, &working.token1_symbol, &working.token2_symbol),
                TradeKind::Sell => (TransactionKind::Sell, &working.token2_symbol, &working.token1_symbol),
            };

            debug!(
                "{} {} {} -> {} {}",
                kind.label(),
                intent.amount,
                input_token,
                output_amount,
                output_token
            );

            outcome.transactions.push(Transaction {
                timestamp: Utc::now(),
                kind,
                input_amount: intent.amount,
                input_token: input_token.clone(),
                output_amount,
                output_token: output_token.clone(),
                price: working.current_price(),
                token1_amount: None,
                token2_amount: None,
            });
        }

        self.state = working;
        self.commit(&outcome.transactions, TRADE_HISTORY_CAP);

        info!(
            "Trade batch committed: {} executed, {} skipped",
            outcome.transactions.len(),
            outcome.skipped
        );
        Ok(outcome)
    }

    /// Execute liquidity operations in order against the running pool.
    ///
    /// Token2 amounts are validated against the pre-batch pool and any failure
    /// aborts the batch. Operations that would overdraw or empty the running
    /// reserves, or push token2 past its total supply, are rejected one by one
    /// and reported in the outcome.
    pub fn execute_liquidity_batch(&mut self, intents: &[LiquidityIntent]) -> PoolResult<LiquidityBatchOutcome> {
        for intent in intents.iter().filter(|i| !i.is_noop()) {
            let operation = match intent.kind {
                LiquidityKind::Add => Token2Operation::Add,
                LiquidityKind::Remove => Token2Operation::Remove,
            };
            self.state.validate_token2_amount(intent.token2_amount, operation)?;
        }

        let mut working = self.state.clone();
        let mut outcome = LiquidityBatchOutcome::default();

        for (index, intent) in intents.iter().enumerate() {
            if intent.is_noop() {
                outcome.skipped += 1;
                continue;
            }

            match apply_liquidity(&mut working, intent) {
                Ok(tx) => outcome.transactions.push(tx),
                Err(err) => {
                    warn!("Liquidity operation #{} rejected: {}", index, err);
                    outcome.rejected.push(RejectedIntent {
                        index,
                        intent: *intent,
                        reason: err.to_string(),
                        error: Some(err),
                    });
                }
            }
        }

        self.state = working;
        self.commit(&outcome.transactions, LIQUIDITY_HISTORY_CAP);

        info!(
            "Liquidity batch committed: {} executed, {} rejected, {} skipped",
            outcome.transactions.len(),
            outcome.rejected.len(),
            outcome.skipped
        );
        Ok(outcome)
    }

    fn commit(&mut self, batch: &[Transaction], cap: usize) {
        self.transactions.prepend_batch(batch, cap);
        self.price_history.record(&self.state);
    }
}

/// Apply one liquidity operation to the running pool
fn apply_liquidity(pool: &mut PoolState, intent: &LiquidityIntent) -> PoolResult<Transaction> {
    let operation = intent.kind.label();
    if !intent.has_valid_amounts() {
        let amount = if intent.token1_amount.is_finite() && intent.token1_amount >= 0.0 {
            intent.token2_amount
        } else {
            intent.token1_amount
        };
        return Err(PoolError::InvalidAmount { operation, amount });
    }

    let price_before = pool.current_price();

    let (new_token1_reserve, new_token2_reserve, kind) = match intent.kind {
        LiquidityKind::Add => (
            pool.token1_reserve + intent.token1_amount,
            pool.token2_reserve + intent.token2_amount,
            TransactionKind::AddLiquidity,
        ),
        LiquidityKind::Remove => {
            if intent.token1_amount > pool.token1_reserve || intent.token2_amount > pool.token2_reserve {
                return Err(PoolError::InsufficientLiquidity);
            }
            (
                pool.token1_reserve - intent.token1_amount,
                pool.token2_reserve - intent.token2_amount,
                TransactionKind::RemoveLiquidity,
            )
        }
    };

    // Reserves stay positive and token2 stays within its total supply
    if new_token2_reserve > pool.token2_total_supply {
        return Err(PoolError::SupplyExceeded {
            operation,
            amount: intent.token2_amount,
            symbol: pool.token2_symbol.clone(),
            available: pool.available_supply(),
            scope: "total supply",
        });
    }
    if new_token1_reserve <= 0.0 || new_token2_reserve <= 0.0 {
        return Err(PoolError::WouldDrainPool);
    }

    pool.token1_reserve = new_token1_reserve;
    pool.token2_reserve = new_token2_reserve;

    Ok(Transaction {
        timestamp: Utc::now(),
        kind,
        input_amount: intent.token1_amount,
        input_token: pool.token1_symbol.clone(),
        output_amount: intent.token2_amount,
        output_token: pool.token2_symbol.clone(),
        price: price_before,
        token1_amount: Some(intent.token1_amount),
        token2_amount: Some(intent.token2_amount),
    })
}
