//! Constant-Product Liquidity Pool Simulator
//!
//! Simulates a two-asset, zero-fee x * y = k pool: trades and liquidity
//! operations run as ordered batches against a single pool, with bounded
//! price and transaction histories for inspection.

pub mod analytics;
pub mod config;
pub mod errors;
pub mod simulation;
pub mod utils;

pub use config::PoolConfig;
pub use errors::{PoolError, PoolResult};
pub use simulation::{Orchestrator, SimulatedPool};
pub use utils::PoolState;
