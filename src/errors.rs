//! Pool engine errors

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PoolError {
    #[error("Cannot {operation} {amount} {symbol}. Only {available} available from {scope}.")]
    SupplyExceeded {
        operation: &'static str,
        amount: f64,
        symbol: String,
        available: f64,
        scope: &'static str,
    },

    #[error("Cannot remove {amount} {symbol}. Only {available} available in pool.")]
    InsufficientPoolReserve {
        amount: f64,
        symbol: String,
        available: f64,
    },

    #[error("Cannot remove more liquidity than available in pool")]
    InsufficientLiquidity,

    #[error("Cannot remove all liquidity from pool")]
    WouldDrainPool,

    #[error("Invalid {operation} amount: {amount}")]
    InvalidAmount { operation: &'static str, amount: f64 },

    #[error("Invalid pool configuration: {0}")]
    InvalidConfig(String),

    #[error("Pool configuration is locked while simulating")]
    ConfigLocked,

    #[error("Simulation is already running")]
    AlreadyLocked,
}

pub type PoolResult<T> = std::result::Result<T, PoolError>;
