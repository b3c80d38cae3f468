//! Performance summary for backtest reports.
//!
//! This module computes the statistics block for a finished run:
//! - Total return and balance drawdown
//! - Daily volatility, Sharpe and Sortino ratios
//! - Best/worst trade and positive-trade rates
//!
//! It needs to enable `metrics` feature to use it. Every percentage is
//! rounded to 3 decimals; day counts come from calendar-day (UTC) buckets
//! of the commission-adjusted returns, with trade-free days counting as
//! zero.

use std::fmt;

use crate::engine::*;
use crate::errors::{Error, Result};

/// A collection of trading statistics computed from a results table.
///
/// `Summary` extracts the balance curve, the per-trade returns and the
/// daily return buckets once, then derives each statistic on demand. It is
/// typically constructed from a finished `Backtest` or its `Report`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Summary {
    initial_balance: f64,
    end_balance: f64,
    min_balance: f64,
    // Commission-adjusted return of each closed trade, in row order
    trade_returns: Vec<f64>,
    // Commission-adjusted returns summed per UTC day over the full span
    daily_returns: Vec<f64>,
}

impl TryFrom<&Backtest> for Summary {
    type Error = Error;

    fn try_from(backtest: &Backtest) -> Result<Self> {
        Self::from_report(backtest.report())
    }
}

impl Summary {
    /// Builds a summary from a results table.
    ///
    /// Returns [`Error::EmptyReport`] when the table holds no rows.
    pub fn from_report(report: &Report) -> Result<Self> {
        let rows = report.rows();
        let (Some(first), Some(last)) = (rows.first(), rows.last()) else {
            return Err(Error::EmptyReport);
        };

        let initial_balance = first.balance();
        let end_balance = last.balance();
        let min_balance = rows
            .iter()
            .map(StepRecord::balance)
            .fold(f64::INFINITY, f64::min);

        let trade_returns: Vec<f64> = rows
            .iter()
            .filter_map(StepRecord::return_rate_with_commission)
            .collect();

        // Calendar-day buckets across the whole span, trade-free days stay
        // at zero
        let anchor = first.open_time().date_naive();
        let span = (last.open_time().date_naive() - anchor).num_days() as usize;
        let mut daily_returns = vec![0.0; span + 1];
        for row in rows {
            if let Some(rate) = row.return_rate_with_commission() {
                let day = (row.open_time().date_naive() - anchor).num_days() as usize;
                daily_returns[day] += rate;
            }
        }

        Ok(Self {
            initial_balance,
            end_balance,
            min_balance,
            trade_returns,
            daily_returns,
        })
    }

    /// Returns the first recorded balance.
    pub fn initial_balance(&self) -> f64 {
        self.initial_balance
    }

    /// Returns the last recorded balance.
    pub fn end_balance(&self) -> f64 {
        self.end_balance
    }

    /// Returns the number of closed trades.
    pub fn trades(&self) -> usize {
        self.trade_returns.len()
    }

    /// Returns the number of calendar days covered by the report.
    pub fn days(&self) -> usize {
        self.daily_returns.len()
    }

    /// Final balance relative to the first recorded balance, in percent.
    pub fn total_return(&self) -> f64 {
        round3(self.total_return_raw())
    }

    /// Largest drop of the balance below its starting value, in percent.
    pub fn max_balance_drawdown(&self) -> f64 {
        round3((1.0 - self.min_balance / self.initial_balance) * 100.0)
    }

    /// Largest gap between a trade's return and the best return recorded
    /// before it, in percent.
    pub fn max_drawdown(&self) -> f64 {
        let mut peak = f64::NEG_INFINITY;
        let mut worst_gap = 0.0f64;
        for &rate in &self.trade_returns {
            peak = peak.max(rate);
            worst_gap = worst_gap.max(peak - rate);
        }
        round3(worst_gap * 100.0)
    }

    /// Sample standard deviation of the daily return sums, in percent.
    ///
    /// `NaN` when the report spans fewer than two days.
    pub fn returns_std(&self) -> f64 {
        round3(sample_std(&self.daily_returns) * 100.0)
    }

    /// Total return over daily volatility scaled by the square root of the
    /// day count.
    pub fn sharpe(&self) -> f64 {
        let days = self.daily_returns.len() as f64;
        let std = sample_std(&self.daily_returns) * 100.0;
        round3(self.total_return_raw() / (std * days.sqrt()))
    }

    /// Sample standard deviation of the losing days only, shrunk by the
    /// square root of the day count, in percent.
    pub fn downside_deviation(&self) -> f64 {
        round3(self.downside_deviation_raw() * 100.0)
    }

    /// Total return over downside deviation.
    pub fn sortino(&self) -> f64 {
        round3(self.total_return_raw() / self.downside_deviation_raw())
    }

    /// Best commission-adjusted trade return, in percent. Zero when no
    /// trade closed.
    pub fn best_trade(&self) -> f64 {
        round3(self.trade_returns.iter().fold(0.0f64, |a, &b| a.max(b)) * 100.0)
    }

    /// Worst commission-adjusted trade return, in percent. Zero when no
    /// trade closed.
    pub fn worst_trade(&self) -> f64 {
        round3(self.trade_returns.iter().fold(0.0f64, |a, &b| a.min(b)) * 100.0)
    }

    /// Share of closed trades with a positive net return, in percent.
    pub fn positive_trades(&self) -> f64 {
        if self.trade_returns.is_empty() {
            return 0.0;
        }
        let winners = self.trade_returns.iter().filter(|rate| **rate > 0.0).count();
        round3(winners as f64 / self.trade_returns.len() as f64 * 100.0)
    }

    /// Share of days with a positive return sum, in percent.
    pub fn positive_trading_days(&self) -> f64 {
        let winners = self.daily_returns.iter().filter(|rate| **rate > 0.0).count();
        round3(winners as f64 / self.daily_returns.len() as f64 * 100.0)
    }

    fn total_return_raw(&self) -> f64 {
        (self.end_balance - self.initial_balance) / self.initial_balance * 100.0
    }

    fn downside_deviation_raw(&self) -> f64 {
        let losses: Vec<f64> = self
            .daily_returns
            .iter()
            .copied()
            .filter(|rate| *rate < 0.0)
            .collect();
        sample_std(&losses) / (self.daily_returns.len() as f64).sqrt()
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Backtest Summary ===")?;
        writeln!(f, "Total return: {}%", self.total_return())?;
        writeln!(f, "Sharpe: {}%", self.sharpe())?;
        writeln!(f, "Sortino: {}%", self.sortino())?;
        writeln!(f, "Max balance drawdown: {}%", self.max_balance_drawdown())?;
        writeln!(f, "Max drawdown: {}%", self.max_drawdown())?;
        writeln!(f, "Returns std: {}%", self.returns_std())?;
        writeln!(f, "Downside deviation: {}%", self.downside_deviation())?;
        writeln!(f, "Best trade: {}%", self.best_trade())?;
        writeln!(f, "Worst trade: {}%", self.worst_trade())?;
        writeln!(f, "Positive trades: {}%", self.positive_trades())?;
        writeln!(f, "Positive trading days: {}%", self.positive_trading_days())
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

// Sample standard deviation (ddof 1), NaN below two values
fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
        / (values.len() - 1) as f64;
    variance.sqrt()
}

// Helper to build a report row dated `day` days after the anchor
#[cfg(test)]
fn record(day: i64, balance: f64, rate: Option<f64>) -> StepRecord {
    let wallet = Wallet::new(balance).unwrap();
    let open_time = chrono::DateTime::from_timestamp_secs(1_614_556_800 + day * 86_400).unwrap();
    let mut row = StepRecord::new(open_time, balance, balance, &wallet);
    if let Some(rate) = rate {
        row.set_returns(rate, rate);
    }
    row
}

#[cfg(test)]
fn report_of(rows: Vec<StepRecord>) -> Report {
    let mut report = Report::default();
    for row in rows {
        report.push(row);
    }
    report
}

#[cfg(test)]
#[test]
fn summary_requires_rows() {
    let result = Summary::from_report(&Report::default());
    assert!(matches!(result, Err(Error::EmptyReport)));
}

#[cfg(test)]
#[test]
fn total_return_and_balance_drawdown() {
    let report = report_of(vec![
        record(0, 10000.0, None),
        record(1, 8000.0, None),
        record(2, 11000.0, None),
    ]);
    let summary = Summary::from_report(&report).unwrap();
    assert_eq!(summary.total_return(), 10.0);
    assert_eq!(summary.max_balance_drawdown(), 20.0);
    assert_eq!(summary.days(), 3);
    assert_eq!(summary.trades(), 0);
}

#[cfg(test)]
#[test]
fn max_drawdown_over_trade_returns() {
    let report = report_of(vec![
        record(0, 10000.0, Some(0.05)),
        record(0, 10500.0, None),
        record(1, 10500.0, Some(0.02)),
        record(2, 10700.0, Some(-0.03)),
    ]);
    let summary = Summary::from_report(&report).unwrap();
    // Running peak 0.05, deepest gap against the -0.03 trade
    assert_eq!(summary.max_drawdown(), 8.0);
    assert_eq!(summary.best_trade(), 5.0);
    assert_eq!(summary.worst_trade(), -3.0);
}

#[cfg(test)]
#[test]
fn daily_buckets_fill_gaps() {
    // Two trades on day 0, nothing on day 1, one loss on day 2
    let report = report_of(vec![
        record(0, 10000.0, Some(0.1)),
        record(0, 11000.0, Some(0.1)),
        record(2, 12000.0, Some(-0.05)),
    ]);
    let summary = Summary::from_report(&report).unwrap();
    assert_eq!(summary.days(), 3);
    assert_eq!(summary.positive_trading_days(), 33.333);
    assert_eq!(summary.returns_std(), 13.229);
}

#[cfg(test)]
#[test]
fn sharpe_and_sortino() {
    let report = report_of(vec![
        record(0, 10000.0, Some(0.2)),
        record(1, 9000.0, Some(-0.02)),
        record(2, 9500.0, Some(-0.05)),
        record(3, 11000.0, None),
    ]);
    let summary = Summary::from_report(&report).unwrap();
    assert_eq!(summary.total_return(), 10.0);
    assert_eq!(summary.returns_std(), 11.354);
    assert_eq!(summary.sharpe(), 0.44);
    assert_eq!(summary.downside_deviation(), 1.061);
    assert_eq!(summary.sortino(), 942.809);
    assert_eq!(summary.positive_trades(), 33.333);
}

#[cfg(test)]
#[test]
fn no_trades_is_a_flat_summary() {
    let report = report_of(vec![record(0, 10000.0, None), record(1, 10000.0, None)]);
    let summary = Summary::from_report(&report).unwrap();
    assert_eq!(summary.total_return(), 0.0);
    assert_eq!(summary.max_drawdown(), 0.0);
    assert_eq!(summary.best_trade(), 0.0);
    assert_eq!(summary.worst_trade(), 0.0);
    assert_eq!(summary.positive_trades(), 0.0);
    // Zero volatility leaves the ratio undefined
    assert!(summary.sharpe().is_nan());
}

#[cfg(test)]
#[test]
fn summary_from_backtest() {
    use std::sync::Arc;

    let data: Arc<[Candle]> = [100.0, 100.0, 100.0, 120.0]
        .iter()
        .enumerate()
        .map(|(i, &price)| {
            CandleBuilder::builder()
                .open(price)
                .high(price)
                .low(price)
                .close(price)
                .volume(1.0)
                .open_time(chrono::DateTime::from_timestamp_secs(i as i64 * 3600).unwrap())
                .close_time(chrono::DateTime::from_timestamp_secs((i as i64 + 1) * 3600).unwrap())
                .build()
                .unwrap()
        })
        .collect();
    let config = Config::default().window_size(2).buy_percentage(0.5);
    let mut backtest = Backtest::new(data, config).unwrap();
    backtest.run(&mut BuyAndHold).unwrap();

    let summary = Summary::try_from(&backtest).unwrap();
    assert_eq!(summary.trades(), 1);
    assert_eq!(summary.total_return(), 10.0);
    assert_eq!(summary.best_trade(), 20.0);
}

#[cfg(test)]
#[test]
fn display_prints_the_block() {
    let report = report_of(vec![
        record(0, 10000.0, Some(0.05)),
        record(1, 10500.0, None),
    ]);
    let summary = Summary::from_report(&report).unwrap();
    let text = summary.to_string();
    assert!(text.starts_with("=== Backtest Summary ==="));
    assert!(text.contains("Total return: 5%"));
    assert!(text.contains("Positive trades: 100%"));
}
