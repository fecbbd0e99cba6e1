//! Utility modules

pub mod amm_math;

pub use amm_math::{PoolState, Token2Operation};
