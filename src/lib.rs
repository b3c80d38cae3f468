//! # MBT: Margin BackTest for Trading Strategies
//!
//! **MBT** is a Rust library for backtesting margin trading strategies on candlestick (OHLCV) data.
//! It replays a strategy candle by candle over a sliding window, models a **margin wallet** with
//! loans for long and short exposure, and records every step for later analysis.
//!
//! ## Why MBT?
//! - **Realistic Simulations**: Models slippage from candle momentum, commission on every fill, and loan accounting for shorts and leveraged longs.
//! - **Windowed Strategies**: Strategies see a sliding window of past candles, never the candle being simulated.
//! - **Insolvency Detection**: Marks the wallet to market against each candle's extremes and aborts when equity is gone.
//! - **Technical Analysis Ready**: Integrates with popular indicators crates for 100+ indicators (EMA, MACD, RSI, etc.).
//! - **Extensible**: Implement one trait to plug in your own strategy.
//!
//! ## Core Components
//! | Component   | Description                                                                                     |
//! |-------------|-------------------------------------------------------------------------------------------------|
//! | **`Candle`** | OHLCV (Open, High, Low, Close, Volume) data with bid volume for a single time period.          |
//! | **`Instruction`** | An entry or exit intent (order kind plus reference price) returned by a strategy.         |
//! | **`Position`** | One open margin trade: side, quantity, and entry fill price.                                 |
//! | **`Wallet`** | Tracks cash, base asset inventory, and the loans of a margin account.                          |
//! | **`Broker`** | Applies slippage, commission, and loan bookkeeping to every fill.                              |
//! | **`Report`** | Step-by-step records of the simulation: wallet snapshots, actions, returns.                    |
//! | **`Summary`** | Calculates performance stats: drawdowns, Sharpe ratio, Sortino ratio, trade rates.            |
//! | **`Optimizer`** | Sweeps strategy parameters in parallel.                                                      |
//! | **`Backtest`** | The engine that simulates strategy execution over historical data.                           |
//!
//! ## Features
//! ### 1. **Technical Indicators**
//! - Compatible with indicators crates like the [`ta`](https://crates.io/crates/ta) crate for 100+ additional indicators.
//!
//! ### 2. **Strategies**
//! | Strategy hook            | Description                                                                                     |
//! |--------------------------|-------------------------------------------------------------------------------------------------|
//! | **`enter_position`**     | Called while flat; may open a long or a short at a reference price.                           |
//! | **`exit_position`**      | Called while a trade is open; may close it at a reference price.                              |
//! | **`RandomStrategy`**     | Coin-flip entries and exits, seedable for reproducible runs.                                  |
//! | **`BuyAndHold`**         | Opens a long on the first opportunity and never exits on its own.                             |
//!
//! ### 3. **Performance Metrics**
//! | Metric               | Description                                                                                     |
//! |----------------------|-------------------------------------------------------------------------------------------------|
//! | **Max Balance Drawdown** | Largest decline from the initial balance (%).                                              |
//! | **Max Drawdown**     | Largest peak-to-trough decline over the cumulated trade returns (%).                          |
//! | **Sharpe Ratio**     | Risk-adjusted return over daily buckets (higher = better).                                    |
//! | **Sortino Ratio**    | Like Sharpe ratio, but focuses only on downside volatility.                                   |
//! | **Positive Trades**  | Percentage of winning trades.                                                                  |
//!
//! ### 4. **Optimization Tools**
//! - **Parallel Brute-Force**: Optimize strategy parameters (e.g., EMA periods) using multi-threading.
//!
//! ## Getting Started
//! ### 1. Add MBT to your project:
//! ```toml
//! [dependencies]
//! mbt_rs = "*"
//! ta = "*"  # Optional: For technical analysis indicators
//! ```
//!
//! ### 2. Run a Simple Backtest:
//! ```rust
//! use mbt_rs::prelude::*;
//! use chrono::DateTime;
//!
//! fn main() {
//!     let mut candles = Vec::new();
//!     for i in 0..20 {
//!         let candle = CandleBuilder::builder()
//!             .open(100.0)
//!             .high(101.0)
//!             .low(99.0)
//!             .close(100.0)
//!             .volume(1.0)
//!             .bid(0.5)
//!             .open_time(DateTime::from_timestamp_secs(1_700_000_000 + i * 3600).unwrap())
//!             .close_time(DateTime::from_timestamp_secs(1_700_000_000 + (i + 1) * 3600 - 1).unwrap())
//!             .build()
//!             .unwrap();
//!         candles.push(candle);
//!     }
//!
//!     // Trade 10% of the balance over a 5-candle window
//!     let config = Config::default().window_size(5).buy_percentage(0.1);
//!     let mut backtest = Backtest::new(candles.into(), config).unwrap();
//!
//!     let mut strategy = RandomStrategy::with_seed(0.5, 0.5, 42).unwrap();
//!     let report = backtest.run(&mut strategy).unwrap();
//!     println!("Simulated steps: {}", report.len());
//!     println!("Final balance: {}", backtest.balance());
//! }
//! ```
//!
//! ### Output (with the `metrics` feature):
//! ```bash
//! === Backtest Summary ===
//! Initial balance: 10000
//! End balance: 10250.5
//! Total return: 2.505%
//! Max balance drawdown: 1.2%
//! Sharpe ratio: 0.31
//! Positive trades: 57.143%
//! ```
//!
//! ## Use Cases
//! - **Retail Traders**: Test manual strategies before risking real capital.
//! - **Algo Developers**: Build and optimize automated trading systems.
//! - **Quant Researchers**: Backtest statistical arbitrage or machine learning models.
//! - **Educational**: Teach margin trading concepts with a hands-on tool.
//!
//! ## Integrations
//! | Crate          | Purpose                                                                                     |
//! |----------------|---------------------------------------------------------------------------------------------|
//! | [`csv`](https://crates.io/crates/csv) | Load exchange kline exports by column name.                                                |
//! | [`rayon`](https://crates.io/crates/rayon) | Parallel processing for optimization.                                                     |
//! | [`serde`](https://crates.io/crates/serde) | Serialize/deserialize candles and reports.                                                 |
//! | [`plotters`](https://crates.io/crates/plotters) | Visualize market candlesticks data, equity curves and positions.                                                   |
//!
//! ## Error Handling
//! MBT uses custom error types to handle:
//! - Invalid configuration (leverage, commission, window size).
//! - Malformed candles and unordered data.
//! - Insolvency during a simulation.
//!
//! Example:
//! ```rust
//! use mbt_rs::prelude::*;
//! use chrono::DateTime;
//!
//! fn main() {
//!     let candle = CandleBuilder::builder()
//!         .open(100.0)
//!         .high(110.0)
//!         .low(95.0)
//!         .close(105.0)
//!         .volume(1.0)
//!         .bid(0.5)
//!         .open_time(DateTime::from_timestamp_secs(1515151515).unwrap())
//!         .close_time(DateTime::from_timestamp_secs(1515151516).unwrap())
//!         .build()
//!         .unwrap();
//!
//!     // Leverage below 1 is rejected before the simulation starts
//!     let config = Config::default().leverage(0.0);
//!     match Backtest::new(vec![candle].into(), config) {
//!         Ok(_) => println!("Backtest ready!"),
//!         Err(e) => eprintln!("Invalid setup: {e}"),
//!     }
//! }
//! ```
//!
//! ## Contributing
//! Contributions are welcome! Open an issue or a pull request on the repository.
//!
//! ## License
//! MIT
#![warn(missing_docs)]

/// Core trading engine components: candles, instructions, positions, wallet, and backtest logic.
pub mod engine;

/// Error types for the library.
pub mod errors;

/// Candle loading from CSV and JSON sources.
pub mod utils;

/// Performance summary: drawdowns, Sharpe ratio, trade statistics, etc.
#[cfg(feature = "metrics")]
pub mod metrics;

/// Strategy parameter optimization.
#[cfg(feature = "optimizer")]
pub mod optimizer;

/// Draw graphics with a lot of backends: png, svg, html, etc.
#[cfg(feature = "draws")]
pub mod draws;

/// Re-exports of commonly used types and traits for convenience.
pub mod prelude {
    pub use super::*;
    pub use crate::engine::*;
    pub use crate::errors::*;
    pub use crate::utils::*;

    #[cfg(feature = "metrics")]
    pub use crate::metrics::*;

    #[cfg(feature = "optimizer")]
    pub use crate::optimizer::*;

    #[cfg(feature = "draws")]
    pub use crate::draws::*;
}

use std::ops::{Add, Div, Mul, Sub};

/// Trait for performing percentage-based calculations.
///
/// This trait provides methods to add, subtract, and calculate percentages
/// for numeric types, enabling common financial calculations.
pub trait PercentCalculus<Rhs = Self> {
    /// Adds a percentage to the value.
    ///
    /// ### Arguments
    /// * `rhs` - The percentage to add (e.g., 10.0 for 10%).
    ///
    /// ### Returns
    /// The value increased by the given percentage.
    fn addpercent(self, rhs: Rhs) -> Self;

    /// Subtracts a percentage from the value.
    ///
    /// ### Arguments
    /// * `rhs` - The percentage to subtract (e.g., 10.0 for 10%).
    ///
    /// ### Returns
    /// The value decreased by the given percentage.
    fn subpercent(self, rhs: Rhs) -> Self;

    /// Calculates the percentage change between two values.
    ///
    /// ### Arguments
    /// * `new` - The new value to compare with.
    ///
    /// ### Returns
    /// The percentage change from the original value to the new value.
    fn change(self, new: Self) -> Self;
}

impl PercentCalculus for f64 {
    fn addpercent(self, percent: Self) -> Self {
        self.add(self.mul(percent.div(100.0)))
    }

    fn subpercent(self, percent: Self) -> Self {
        self.sub(self.mul(percent.div(100.0)))
    }

    fn change(self, new: Self) -> Self {
        new.sub(self).div(self).mul(100.0)
    }
}

#[cfg(test)]
mod percent {
    use super::*;

    #[test]
    fn add() {
        assert_eq!(110.0, 100.0.addpercent(10.0))
    }

    #[test]
    fn sub() {
        assert_eq!(90.0, 100.0.subpercent(10.0))
    }

    #[test]
    fn change() {
        assert_eq!(10.0, 100.0.change(110.0))
    }
}
