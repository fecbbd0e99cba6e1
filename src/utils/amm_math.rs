//! AMM Math Utilities
//!
//! Implements zero-fee constant-product (x * y = k) pricing over a
//! two-asset pool. Everything here is read-only; state changes happen in
//! `simulation::pool_state`.

use crate::config::PoolConfig;
use crate::errors::{PoolError, PoolResult};
use serde::{Deserialize, Serialize};

/// Current state of the pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolState {
    pub token1_symbol: String,
    pub token2_symbol: String,
    /// Reserve of the base asset
    pub token1_reserve: f64,
    /// Reserve of the pooled token
    pub token2_reserve: f64,
    /// External USD reference price of token1
    pub token1_price: f64,
    /// Upper bound on token2_reserve
    pub token2_total_supply: f64,
}

/// Operations whose token2 amount is checked against supply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Token2Operation {
    Add,
    Remove,
    Sell,
}

impl PoolState {
    /// Build a pool from a validated config
    pub fn from_config(config: &PoolConfig) -> PoolResult<Self> {
        config.validate()?;

        Ok(Self {
            token1_symbol: config.token1_symbol.clone(),
            token2_symbol: config.token2_symbol.clone(),
            token1_reserve: config.token1_reserve,
            token2_reserve: config.token2_reserve,
            token1_price: config.token1_price,
            token2_total_supply: config.token2_total_supply,
        })
    }

    /// Current config view of this pool
    pub fn to_config(&self) -> PoolConfig {
        PoolConfig {
            token1_symbol: self.token1_symbol.clone(),
            token2_symbol: self.token2_symbol.clone(),
            token1_reserve: self.token1_reserve,
            token2_reserve: self.token2_reserve,
            token1_price: self.token1_price,
            token2_total_supply: self.token2_total_supply,
        }
    }

    /// Constant product k
    pub fn k(&self) -> f64 {
        self.token1_reserve * self.token2_reserve
    }

    /// Price of token1 in token2 (token2 per token1)
    pub fn current_price(&self) -> f64 {
        debug_assert!(self.token1_reserve > 0.0, "token1 reserve must stay positive");
        self.token2_reserve / self.token1_reserve
    }

    /// USD value of one token2, routed through the pool rate
    pub fn token2_price_usd(&self) -> f64 {
        self.token1_price / self.current_price()
    }

    /// Signed deviation (%) of the token1 price implied by the pool from the
    /// reference price.
    ///
    /// The implied price is rebuilt from `token2_price_usd`, which is itself
    /// derived from the reference price, so this is 0 up to rounding error.
    pub fn slippage_percentage(&self) -> f64 {
        let market_price = self.token1_price;
        let implied_token1_price = self.token2_price_usd() * self.current_price();

        (implied_token1_price - market_price) / market_price * 100.0
    }

    /// Output of swapping `input_amount` into the pool.
    ///
    /// `input_reserve` and `output_reserve` must be the live reserves of this
    /// pool: `k` is taken from the pool, not from the arguments.
    pub fn calculate_output_amount(&self, input_amount: f64, input_reserve: f64, output_reserve: f64) -> f64 {
        if input_amount <= 0.0 {
            return 0.0;
        }

        let k = self.k();
        let new_input_reserve = input_reserve + input_amount;
        let new_output_reserve = k / new_input_reserve;

        output_reserve - new_output_reserve
    }

    /// Absolute deviation (%) of the effective trade price from the marginal
    /// price, rounded to two decimals
    pub fn calculate_price_impact(&self, input_amount: f64, input_reserve: f64, output_reserve: f64) -> f64 {
        if input_amount <= 0.0 {
            return 0.0;
        }

        let initial_price = output_reserve / input_reserve;
        let output_amount = self.calculate_output_amount(input_amount, input_reserve, output_reserve);
        let effective_price = output_amount / input_amount;
        let impact = ((effective_price - initial_price) / initial_price).abs() * 100.0;

        round_to_cents(impact)
    }

    /// token2 still outside the pool
    pub fn available_supply(&self) -> f64 {
        self.token2_total_supply - self.token2_reserve
    }

    /// Check a token2 amount against the supply limits
    pub fn validate_token2_amount(&self, amount: f64, operation: Token2Operation) -> PoolResult<()> {
        let available_supply = self.available_supply();

        match operation {
            Token2Operation::Add if amount > available_supply => Err(PoolError::SupplyExceeded {
                operation: "add",
                amount,
                symbol: self.token2_symbol.clone(),
                available: available_supply,
                scope: "total supply",
            }),
            Token2Operation::Remove if amount > self.token2_reserve => Err(PoolError::InsufficientPoolReserve {
                amount,
                symbol: self.token2_symbol.clone(),
                available: self.token2_reserve,
            }),
            Token2Operation::Sell if amount > available_supply => Err(PoolError::SupplyExceeded {
                operation: "sell",
                amount,
                symbol: self.token2_symbol.clone(),
                available: available_supply,
                scope: "circulating supply",
            }),
            _ => Ok(()),
        }
    }

    /// Amount of the other token that keeps the current pool ratio
    pub fn calculate_proportional_amount(&self, input_amount: f64, input_is_token1: bool) -> f64 {
        let current_ratio = self.token2_reserve / self.token1_reserve;
        if input_is_token1 {
            input_amount * current_ratio
        } else {
            input_amount / current_ratio
        }
    }

    /// USD market cap of the pooled token2
    pub fn market_cap(&self) -> f64 {
        (self.token2_reserve / self.token2_total_supply) * self.token2_total_supply * self.token2_price_usd()
    }

    /// Share (%) of the token2 supply held by the pool
    pub fn pool_share_percentage(&self) -> f64 {
        self.token2_reserve / self.token2_total_supply * 100.0
    }

    pub fn token1_reserve_usd(&self) -> f64 {
        self.token1_reserve * self.token1_price
    }

    pub fn token2_reserve_usd(&self) -> f64 {
        self.token2_reserve * self.token2_price_usd()
    }
}

/// Round to two decimal places
pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
