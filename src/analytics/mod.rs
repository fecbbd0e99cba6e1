//! Analytics modules for logging and summaries

pub mod logger;
pub mod metrics;

pub use logger::SimulationLogger;
pub use metrics::MetricsCalculator;
