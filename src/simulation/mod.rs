//! Simulation modules

pub mod batch;
pub mod history;
pub mod orchestrator;
pub mod pool_state;

pub use batch::{LiquidityIntent, LiquidityKind, TradeIntent, TradeKind};
pub use history::{PriceHistory, PriceHistoryPoint, Transaction, TransactionKind, TransactionLog};
pub use orchestrator::{Orchestrator, SessionResults, SessionScript, SessionStep};
pub use pool_state::{PoolSnapshot, SessionState, SimulatedPool};
