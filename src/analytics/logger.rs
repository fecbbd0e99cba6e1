//! Structured logging for session results

use crate::analytics::metrics::MetricsCalculator;
use crate::simulation::SessionResults;
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Handles writing session results to files
pub struct SimulationLogger {
    output_dir: String,
}

impl SimulationLogger {
    /// Create a new logger with the specified output directory
    pub fn new(output_dir: &str) -> Self {
        Self {
            output_dir: output_dir.to_string(),
        }
    }

    /// Ensure output directories exist
    pub fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(format!("{}/logs", self.output_dir))
            .context("Failed to create logs directory")?;
        Ok(())
    }

    /// Save session results to a JSON file
    pub fn save_results(&self, results: &SessionResults) -> Result<String> {
        self.ensure_dirs()?;

        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
        let filename = format!("{}/logs/session_{}.json", self.output_dir, timestamp);

        let json = serde_json::to_string_pretty(results)
            .context("Failed to serialize results")?;

        let mut file = File::create(&filename)
            .context("Failed to create log file")?;

        file.write_all(json.as_bytes())
            .context("Failed to write log file")?;

        info!("Results saved to: {}", filename);
        Ok(filename)
    }

    /// Load results from a JSON file
    pub fn load_results(path: &Path) -> Result<SessionResults> {
        let contents = fs::read_to_string(path)
            .context("Failed to read results file")?;

        serde_json::from_str(&contents)
            .context("Failed to parse results file")
    }

    /// Save a summary text file
    pub fn save_summary(&self, results: &SessionResults) -> Result<String> {
        self.ensure_dirs()?;

        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
        let filename = format!("{}/logs/summary_{}.txt", self.output_dir, timestamp);

        let mut file = File::create(&filename)
            .context("Failed to create summary file")?;

        file.write_all(format_summary(results).as_bytes())
            .context("Failed to write summary file")?;

        info!("Summary saved to: {}", filename);
        Ok(filename)
    }
}

/// Format results as a text summary
pub fn format_summary(results: &SessionResults) -> String {
    let s = &results.summary;
    let start = &results.initial;
    let end = &results.final_state;
    let t1 = &end.pool.token1_symbol;
    let t2 = &end.pool.token2_symbol;
    let stats = MetricsCalculator::history_stats(results);

    let mut out = String::new();
    out.push_str("\n══════════════════════════════════════════════════════════════\n");
    out.push_str("  LIQUIDITY POOL SESSION RESULTS\n");
    out.push_str("══════════════════════════════════════════════════════════════\n\n");

    out.push_str("  POOL\n");
    out.push_str(&format!(
        "  {:<22} {:>16.4} -> {:>16.4} {}\n",
        "Reserve", start.pool.token1_reserve, end.pool.token1_reserve, t1
    ));
    out.push_str(&format!(
        "  {:<22} {:>16.2} -> {:>16.2} {}\n",
        "Reserve", start.pool.token2_reserve, end.pool.token2_reserve, t2
    ));
    out.push_str(&format!("  {:<22} {:>16.2} -> {:>16.2}\n", "Constant K", start.k, end.k));
    out.push_str(&format!(
        "  {:<22} {:>16.2} -> {:>16.2} {} per {}\n",
        "Exchange Rate", start.price, end.price, t2, t1
    ));
    out.push_str(&format!(
        "  {:<22} {:>16.8} -> {:>16.8} USD per {}\n",
        "USD Value", start.price_usd, end.price_usd, t2
    ));
    out.push_str(&format!(
        "  {:<22} {:>16.2} -> {:>16.2} USD\n",
        "Market Cap", start.market_cap, end.market_cap
    ));
    out.push_str(&format!(
        "  {:<22} {:>15.2}% of total supply in pool\n",
        "Pool Share", end.pool_share_percentage
    ));
    out.push_str(&format!("  {:<22} {:>15.2}%\n\n", "Slippage", end.slippage_percentage));

    out.push_str("  ACTIVITY\n");
    out.push_str(&format!(
        "  {:<22} {:>16} ({} rejected)\n",
        "Steps", s.total_steps, s.rejected_steps
    ));
    out.push_str(&format!("  {:<22} {:>16}\n", "Buys", s.buys));
    out.push_str(&format!("  {:<22} {:>16}\n", "Sells", s.sells));
    out.push_str(&format!("  {:<22} {:>16}\n", "Liquidity Adds", s.liquidity_adds));
    out.push_str(&format!("  {:<22} {:>16}\n", "Liquidity Removes", s.liquidity_removes));
    out.push_str(&format!("  {:<22} {:>16}\n", "Rejected Operations", s.rejected_intents));
    out.push_str(&format!("  {:<22} {:>16.4} {}\n", "Bought With", s.token1_volume_in, t1));
    out.push_str(&format!("  {:<22} {:>16.2} {}\n", "Sold", s.token2_volume_in, t2));
    out.push_str(&format!("  {:<22} {:>15.2}%\n\n", "Avg Price Impact", s.avg_price_impact));

    out.push_str("  PRICE HISTORY\n");
    out.push_str(&format!("  {:<22} {:>16}\n", "Points", stats.points));
    if stats.points > 0 {
        out.push_str(&format!("  {:<22} {:>16.8}\n", "Low", stats.min_price_usd));
        out.push_str(&format!("  {:<22} {:>16.8}\n", "High", stats.max_price_usd));
        out.push_str(&format!("  {:<22} {:>16.8}\n", "Average", stats.average_price_usd));
        out.push_str(&format!("  {:<22} {:>+15.2}%\n", "Change", stats.change_percentage));
    }

    if !results.recent_transactions.is_empty() {
        out.push_str("\n  RECENT TRANSACTIONS\n");
        for tx in &results.recent_transactions {
            out.push_str(&format!(
                "  {} {:<17} {:>16.4} {:<6} -> {:>16.4} {:<6} @ {:.4}\n",
                tx.timestamp.format("%H:%M:%S"),
                tx.kind.label(),
                tx.input_amount,
                tx.input_token,
                tx.output_amount,
                tx.output_token,
                tx.effective_rate()
            ));
        }
    }

    out.push_str(&format!(
        "\nGenerated: {}\n",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out
}

/// Print summary to terminal
pub fn print_summary(results: &SessionResults) {
    println!("{}", format_summary(results));
}
