//! Bounded price and transaction logs

use crate::utils::amm_math::PoolState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Number of price points kept
pub const PRICE_HISTORY_CAP: usize = 20;
/// Transactions kept after a trade batch
pub const TRADE_HISTORY_CAP: usize = 10;
/// Transactions kept after a liquidity batch
pub const LIQUIDITY_HISTORY_CAP: usize = 20;

/// Pool price at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceHistoryPoint {
    pub timestamp: DateTime<Utc>,
    /// token2 per token1
    pub price: f64,
    /// USD value of one token2
    pub price_usd: f64,
}

impl PriceHistoryPoint {
    pub fn capture(pool: &PoolState) -> Self {
        Self {
            timestamp: Utc::now(),
            price: pool.current_price(),
            price_usd: pool.token2_price_usd(),
        }
    }
}

/// Ring buffer of the most recent price points, oldest first
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceHistory {
    points: VecDeque<PriceHistoryPoint>,
}

impl PriceHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, point: PriceHistoryPoint) {
        self.points.push_back(point);
        while self.points.len() > PRICE_HISTORY_CAP {
            self.points.pop_front();
        }
    }

    pub fn record(&mut self, pool: &PoolState) {
        self.push(PriceHistoryPoint::capture(pool));
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PriceHistoryPoint> {
        self.points.iter()
    }

    pub fn first(&self) -> Option<&PriceHistoryPoint> {
        self.points.front()
    }

    pub fn last(&self) -> Option<&PriceHistoryPoint> {
        self.points.back()
    }

    /// Change (%) of the token2 USD price from the oldest to the newest point
    pub fn price_change_percentage(&self) -> f64 {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) if self.points.len() >= 2 => {
                (last.price_usd - first.price_usd) / first.price_usd * 100.0
            }
            _ => 0.0,
        }
    }

    pub fn min_price_usd(&self) -> Option<f64> {
        self.points.iter().map(|p| p.price_usd).reduce(f64::min)
    }

    pub fn max_price_usd(&self) -> Option<f64> {
        self.points.iter().map(|p| p.price_usd).reduce(f64::max)
    }

    pub fn average_price_usd(&self) -> Option<f64> {
        if self.points.is_empty() {
            return None;
        }
        let total: f64 = self.points.iter().map(|p| p.price_usd).sum();
        Some(total / self.points.len() as f64)
    }

    pub fn to_vec(&self) -> Vec<PriceHistoryPoint> {
        self.points.iter().cloned().collect()
    }
}

impl FromIterator<PriceHistoryPoint> for PriceHistory {
    fn from_iter<I: IntoIterator<Item = PriceHistoryPoint>>(iter: I) -> Self {
        let mut history = Self::new();
        for point in iter {
            history.push(point);
        }
        history
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Buy,
    Sell,
    AddLiquidity,
    RemoveLiquidity,
}

impl TransactionKind {
    pub fn is_liquidity(&self) -> bool {
        matches!(self, Self::AddLiquidity | Self::RemoveLiquidity)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
            Self::AddLiquidity => "add_liquidity",
            Self::RemoveLiquidity => "remove_liquidity",
        }
    }
}

/// Executed trade or liquidity operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub timestamp: DateTime<Utc>,
    pub kind: TransactionKind,
    pub input_amount: f64,
    pub input_token: String,
    pub output_amount: f64,
    pub output_token: String,
    /// Pool price (token2 per token1) recorded with the operation
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token1_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token2_amount: Option<f64>,
}

impl Transaction {
    /// Rate shown for the record: pool price for liquidity operations,
    /// output per input for trades
    pub fn effective_rate(&self) -> f64 {
        if self.kind.is_liquidity() {
            self.price
        } else if self.input_amount > 0.0 {
            self.output_amount / self.input_amount
        } else {
            0.0
        }
    }
}

/// Newest-first transaction log
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionLog {
    entries: VecDeque<Transaction>,
}

impl TransactionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a committed batch in front of the log, keeping batch order, then
    /// truncate to `cap`
    pub fn prepend_batch(&mut self, batch: &[Transaction], cap: usize) {
        for tx in batch.iter().rev() {
            self.entries.push_front(tx.clone());
        }
        self.entries.truncate(cap);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&Transaction> {
        self.entries.front()
    }

    pub fn to_vec(&self) -> Vec<Transaction> {
        self.entries.iter().cloned().collect()
    }
}
