//! Trade and liquidity intents submitted as ordered batches

use crate::errors::PoolError;
use crate::simulation::history::Transaction;
use crate::utils::amm_math::PoolState;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeKind {
    /// Spend token1, receive token2
    Buy,
    /// Spend token2, receive token1
    Sell,
}

impl TradeKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeIntent {
    pub kind: TradeKind,
    pub amount: f64,
}

impl TradeIntent {
    pub fn buy(amount: f64) -> Self {
        Self { kind: TradeKind::Buy, amount }
    }

    pub fn sell(amount: f64) -> Self {
        Self { kind: TradeKind::Sell, amount }
    }

    /// Non-positive amounts are skipped without error
    pub fn is_noop(&self) -> bool {
        self.amount <= 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiquidityKind {
    Add,
    Remove,
}

impl LiquidityKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiquidityIntent {
    pub kind: LiquidityKind,
    pub token1_amount: f64,
    pub token2_amount: f64,
}

impl LiquidityIntent {
    pub fn add(token1_amount: f64, token2_amount: f64) -> Self {
        Self { kind: LiquidityKind::Add, token1_amount, token2_amount }
    }

    pub fn remove(token1_amount: f64, token2_amount: f64) -> Self {
        Self { kind: LiquidityKind::Remove, token1_amount, token2_amount }
    }

    /// Intent driven by a token1 amount, token2 filled in at the pool ratio
    pub fn proportional_to_token1(kind: LiquidityKind, token1_amount: f64, pool: &PoolState) -> Self {
        Self {
            kind,
            token1_amount,
            token2_amount: pool.calculate_proportional_amount(token1_amount, true),
        }
    }

    /// Intent driven by a token2 amount, token1 filled in at the pool ratio
    pub fn proportional_to_token2(kind: LiquidityKind, token2_amount: f64, pool: &PoolState) -> Self {
        Self {
            kind,
            token1_amount: pool.calculate_proportional_amount(token2_amount, false),
            token2_amount,
        }
    }

    /// Skipped only when both sides are non-positive; a mixed-sign intent is
    /// applied and rejected there
    pub fn is_noop(&self) -> bool {
        self.token1_amount <= 0.0 && self.token2_amount <= 0.0
    }

    /// Both amounts finite and non-negative
    pub fn has_valid_amounts(&self) -> bool {
        [self.token1_amount, self.token2_amount]
            .iter()
            .all(|a| a.is_finite() && *a >= 0.0)
    }
}

/// Preview of a single trade against the live pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeQuote {
    pub intent: TradeIntent,
    pub output_amount: f64,
    /// Percent, two decimals
    pub price_impact: f64,
    /// Output per unit of input
    pub effective_rate: f64,
}

/// Committed trade batch
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TradeBatchOutcome {
    /// One record per executed intent, in batch order
    pub transactions: Vec<Transaction>,
    /// Intents skipped for a non-positive amount
    pub skipped: usize,
}

/// Liquidity intent rejected while applying a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedIntent {
    /// Position in the submitted batch
    pub index: usize,
    pub intent: LiquidityIntent,
    pub reason: String,
    #[serde(skip)]
    pub error: Option<PoolError>,
}

/// Committed liquidity batch
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LiquidityBatchOutcome {
    pub transactions: Vec<Transaction>,
    pub rejected: Vec<RejectedIntent>,
    pub skipped: usize,
}

impl LiquidityBatchOutcome {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}
