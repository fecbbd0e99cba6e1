//! Simulation Orchestrator
//!
//! Drives one `SimulatedPool` through a session, either from a scripted
//! list of steps or from randomly generated trade batches, and collects the
//! results.

use crate::config::PoolConfig;
use crate::simulation::batch::{LiquidityIntent, TradeIntent, TradeKind};
use crate::simulation::history::{PriceHistoryPoint, Transaction, TransactionKind};
use crate::simulation::pool_state::{PoolSnapshot, SimulatedPool};
use anyhow::{Context, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// One user action in a session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SessionStep {
    /// Edit the pool configuration
    Configure { config: PoolConfig },
    /// Lock the configuration
    Simulate,
    /// Execute a trade batch
    Trade { intents: Vec<TradeIntent> },
    /// Execute a liquidity batch
    Liquidity { intents: Vec<LiquidityIntent> },
    /// Restore starting reserves and clear history
    Reset,
}

impl SessionStep {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Configure { .. } => "configure",
            Self::Simulate => "simulate",
            Self::Trade { .. } => "trade",
            Self::Liquidity { .. } => "liquidity",
            Self::Reset => "reset",
        }
    }
}

/// Scripted session, loaded from JSON
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionScript {
    #[serde(default)]
    pub config: Option<PoolConfig>,
    pub steps: Vec<SessionStep>,
}

impl SessionScript {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read session script {}", path.display()))?;

        serde_json::from_str(&contents).context("Failed to parse session script")
    }
}

/// Result of one session step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: u32,
    pub action: String,
    pub accepted: bool,
    /// Error for a rejected step, or per-intent rejections joined
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub executed: usize,
    pub rejected: usize,
    pub price_after: f64,
    pub price_usd_after: f64,
    pub k_after: f64,
}

/// Totals over the whole session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSummary {
    pub total_steps: u32,
    pub rejected_steps: u32,
    pub buys: u32,
    pub sells: u32,
    pub liquidity_adds: u32,
    pub liquidity_removes: u32,
    pub rejected_intents: u32,
    /// token1 spent on buys
    pub token1_volume_in: f64,
    /// token2 spent on sells
    pub token2_volume_in: f64,
    /// Mean price impact (%) of executed trades, as quoted before each batch
    pub avg_price_impact: f64,
}

/// Everything a finished session produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResults {
    pub initial: PoolSnapshot,
    pub final_state: PoolSnapshot,
    pub steps: Vec<StepRecord>,
    /// Every transaction in execution order, not capped
    pub executed: Vec<Transaction>,
    /// Price history as held by the pool at the end
    pub price_history: Vec<PriceHistoryPoint>,
    /// Transaction log as held by the pool at the end, newest first
    pub recent_transactions: Vec<Transaction>,
    pub summary: SessionSummary,
}

/// Parameters for a random session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickConfig {
    pub batches: u32,
    pub trades_per_batch: u32,
    /// Buy size range in token1
    pub min_amount: f64,
    pub max_amount: f64,
}

impl Default for QuickConfig {
    fn default() -> Self {
        Self {
            batches: 10,
            trades_per_batch: 3,
            min_amount: 0.01,
            max_amount: 0.5,
        }
    }
}

/// Main session orchestrator
pub struct Orchestrator {
    pool: SimulatedPool,
    initial: PoolSnapshot,
    steps: Vec<StepRecord>,
    executed: Vec<Transaction>,
    summary: SessionSummary,
    impact_total: f64,
    impact_count: u32,
}

impl Orchestrator {
    pub fn new(config: PoolConfig) -> Result<Self> {
        let pool = SimulatedPool::new(config).context("Invalid starting pool")?;
        let initial = pool.snapshot();

        Ok(Self {
            pool,
            initial,
            steps: Vec::new(),
            executed: Vec::new(),
            summary: SessionSummary::default(),
            impact_total: 0.0,
            impact_count: 0,
        })
    }

    pub fn pool(&self) -> &SimulatedPool {
        &self.pool
    }

    /// Run a scripted session
    pub fn run(mut self, steps: &[SessionStep]) -> SessionResults {
        info!("Starting session with {} steps", steps.len());

        for step in steps {
            self.apply(step);
        }

        self.finish()
    }

    /// Run random buy/sell batches. Sells are sized from the token2 a buy of
    /// the same range would return, capped at the circulating headroom.
    pub fn run_quick(mut self, quick: &QuickConfig) -> SessionResults {
        info!(
            "Starting quick session: {} batches x {} trades",
            quick.batches, quick.trades_per_batch
        );

        let mut rng = rand::thread_rng();
        if let Err(err) = self.pool.simulate() {
            warn!("Could not lock pool: {}", err);
        }

        for i in 0..quick.batches {
            let intents: Vec<TradeIntent> = (0..quick.trades_per_batch)
                .map(|_| {
                    let amount = random_amount(&mut rng, quick.min_amount, quick.max_amount);
                    if rng.gen_bool(0.5) {
                        TradeIntent::buy(amount)
                    } else {
                        let pool = self.pool.current();
                        let token2 = pool.calculate_proportional_amount(amount, true);
                        TradeIntent::sell(token2.min(pool.available_supply()))
                    }
                })
                .collect();

            self.apply(&SessionStep::Trade { intents });

            if (i + 1) % 10 == 0 || i == 0 {
                info!("Progress: {}/{} batches", i + 1, quick.batches);
            }
        }

        self.finish()
    }

    /// Apply one step, recording rejections instead of failing the session
    pub fn apply(&mut self, step: &SessionStep) {
        let index = self.steps.len() as u32;
        let mut executed = 0;
        let mut rejected = 0;

        let result: Result<Option<String>, String> = match step {
            SessionStep::Configure { config } => self
                .pool
                .update_config(config.clone())
                .map(|_| None)
                .map_err(|e| e.to_string()),
            SessionStep::Simulate => self.pool.simulate().map(|_| None).map_err(|e| e.to_string()),
            SessionStep::Reset => {
                self.pool.reset();
                Ok(None)
            }
            SessionStep::Trade { intents } => {
                let quotes: Vec<f64> = intents
                    .iter()
                    .filter(|i| !i.is_noop())
                    .map(|i| self.pool.quote_trade(*i).price_impact)
                    .collect();

                match self.pool.execute_trade_batch(intents) {
                    Ok(outcome) => {
                        executed = outcome.transactions.len();
                        self.impact_total += quotes.iter().sum::<f64>();
                        self.impact_count += quotes.len() as u32;

                        for intent in intents.iter().filter(|i| !i.is_noop()) {
                            match intent.kind {
                                TradeKind::Buy => {
                                    self.summary.buys += 1;
                                    self.summary.token1_volume_in += intent.amount;
                                }
                                TradeKind::Sell => {
                                    self.summary.sells += 1;
                                    self.summary.token2_volume_in += intent.amount;
                                }
                            }
                        }
                        self.executed.extend(outcome.transactions);
                        Ok(None)
                    }
                    Err(err) => Err(err.to_string()),
                }
            }
            SessionStep::Liquidity { intents } => match self.pool.execute_liquidity_batch(intents) {
                Ok(outcome) => {
                    executed = outcome.transactions.len();
                    rejected = outcome.rejected.len();
                    self.summary.rejected_intents += rejected as u32;

                    for tx in &outcome.transactions {
                        match tx.kind {
                            TransactionKind::AddLiquidity => self.summary.liquidity_adds += 1,
                            _ => self.summary.liquidity_removes += 1,
                        }
                    }
                    self.executed.extend(outcome.transactions);

                    let message = (!outcome.rejected.is_empty()).then(|| {
                        outcome
                            .rejected
                            .iter()
                            .map(|r| format!("#{}: {}", r.index, r.reason))
                            .collect::<Vec<_>>()
                            .join("; ")
                    });
                    Ok(message)
                }
                Err(err) => Err(err.to_string()),
            },
        };

        let (accepted, message) = match result {
            Ok(message) => (true, message),
            Err(message) => {
                warn!("Step {} ({}) rejected: {}", index, step.name(), message);
                self.summary.rejected_steps += 1;
                (false, Some(message))
            }
        };

        let state = self.pool.current();
        debug!(
            "Step {} ({}): price {:.4}, k {:.4}",
            index,
            step.name(),
            state.current_price(),
            state.k()
        );

        self.steps.push(StepRecord {
            step: index,
            action: step.name().to_string(),
            accepted,
            message,
            executed,
            rejected,
            price_after: state.current_price(),
            price_usd_after: state.token2_price_usd(),
            k_after: state.k(),
        });
        self.summary.total_steps += 1;
    }

    /// Close the session and build its results
    pub fn finish(mut self) -> SessionResults {
        self.summary.avg_price_impact = if self.impact_count > 0 {
            self.impact_total / self.impact_count as f64
        } else {
            0.0
        };

        let final_state = self.pool.snapshot();
        info!("Session complete!");
        info!(
            "Final price: 1 {} = {:.2} {} (${:.6})",
            final_state.pool.token1_symbol,
            final_state.price,
            final_state.pool.token2_symbol,
            final_state.price_usd
        );

        SessionResults {
            initial: self.initial,
            final_state,
            steps: self.steps,
            executed: self.executed,
            price_history: self.pool.price_history().to_vec(),
            recent_transactions: self.pool.transactions().to_vec(),
            summary: self.summary,
        }
    }
}

/// Generate a random amount in `[min, max]`
pub fn random_amount<R: Rng>(rng: &mut R, min: f64, max: f64) -> f64 {
    if max <= min {
        return min;
    }
    rng.gen_range(min..=max)
}
