//! Core backtesting engine components.
//!
//! This module provides the fundamental types for backtesting:
//! - `Candle`: OHLCV data with a validating builder.
//! - `Instruction`: what a strategy asks the broker to do, and with which
//!   reference price.
//! - `Position`: the single open trade, long or short.
//! - `Wallet`: the margin ledger behind every fill.
//! - `Broker`: slippage-adjusted fills and return accounting.
//! - `Report`: the per-step results table.
//! - `Strategy`: the pluggable decision policy.

mod broker;
mod candle;
mod order;
mod position;
mod report;
mod strategy;
mod wallet;

use std::sync::Arc;

use crate::errors::{Error, Result};

pub use broker::*;
pub use candle::*;
pub use order::*;
pub use position::*;
pub use report::*;
pub use strategy::*;
pub(crate) use wallet::*;

// Chart marker offset above (long) or below (short) the open while a
// position is held
const POSITION_MARKER_OFFSET: f64 = 2000.0;

/// Run configuration. Build one with the chained setters and hand it to
/// [`Backtest::new`], which validates it.
///
/// Defaults: no commission, 10 000 initial balance, leverage 1, window of
/// 100 candles, 5% of balance per entry, slippage divisor 2.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct Config {
    commission: f64,
    initial_balance: f64,
    leverage: f64,
    window_size: usize,
    buy_percentage: f64,
    change_size: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            commission: 0.0,
            initial_balance: 10_000.0,
            leverage: 1.0,
            window_size: 100,
            buy_percentage: 0.05,
            change_size: 2.0,
        }
    }
}

impl Config {
    /// Sets the commission rate, a fraction of traded notional charged on
    /// every fill (e.g. 0.0002 for 2 basis points).
    pub fn commission(mut self, commission: f64) -> Self {
        self.commission = commission;
        self
    }

    /// Sets the starting cash.
    pub fn initial_balance(mut self, initial_balance: f64) -> Self {
        self.initial_balance = initial_balance;
        self
    }

    /// Sets the leverage multiplier applied to sizing and returns.
    pub fn leverage(mut self, leverage: f64) -> Self {
        self.leverage = leverage;
        self
    }

    /// Sets the number of trailing candles that form the strategy window.
    pub fn window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    /// Sets the fraction of the current balance committed on each entry.
    pub fn buy_percentage(mut self, buy_percentage: f64) -> Self {
        self.buy_percentage = buy_percentage;
        self
    }

    /// Sets the slippage divisor applied to the candle's open-to-close
    /// change.
    pub fn change_size(mut self, change_size: f64) -> Self {
        self.change_size = change_size;
        self
    }

    fn validate(&self) -> Result<()> {
        if !self.initial_balance.is_finite() || self.initial_balance <= 0.0 {
            return Err(Error::NegZeroBalance(self.initial_balance));
        }
        if !self.leverage.is_finite() || self.leverage < 1.0 {
            return Err(Error::Leverage(self.leverage));
        }
        if !(0.0..1.0).contains(&self.commission) {
            return Err(Error::CommissionRate(self.commission));
        }
        if !self.buy_percentage.is_finite()
            || self.buy_percentage <= 0.0
            || self.buy_percentage > 1.0
        {
            return Err(Error::BuyPercentage(self.buy_percentage));
        }
        if !self.change_size.is_finite() || self.change_size <= 0.0 {
            return Err(Error::ChangeSize(self.change_size));
        }
        Ok(())
    }
}

/// Backtesting engine for margin trading strategies.
///
/// Owns the wallet, the single open position and the results table; the
/// candle series is shared read-only. Dereferences to [`Wallet`] so ledger
/// accessors read directly off the backtest.
#[derive(Debug)]
pub struct Backtest {
    data: Arc<[Candle]>,
    config: Config,
    broker: Broker,
    wallet: Wallet,
    // Mark-to-market equity at the current step's open
    balance: f64,
    position: Option<Position>,
    report: Report,
}

impl std::ops::Deref for Backtest {
    type Target = Wallet;

    fn deref(&self) -> &Self::Target {
        &self.wallet
    }
}

impl Backtest {
    /// Creates a new backtest instance.
    ///
    /// ### Arguments
    /// * `data` - Candle series, chronological, at least `window_size + 1`
    ///   candles long.
    /// * `config` - Run configuration; validated here so a bad value fails
    ///   before the simulation starts.
    ///
    /// ### Returns
    /// The new backtest instance or an error.
    pub fn new(data: Arc<[Candle]>, config: Config) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::CandleDataEmpty);
        }
        config.validate()?;
        if config.window_size == 0 || data.len() < config.window_size + 1 {
            return Err(Error::WindowSize(config.window_size, data.len()));
        }
        if let Some(index) = data
            .windows(2)
            .position(|pair| pair[0].open_time() >= pair[1].open_time())
        {
            return Err(Error::UnorderedCandles(index + 1));
        }

        Ok(Self {
            broker: Broker::new(config.commission, config.leverage, config.change_size),
            wallet: Wallet::new(config.initial_balance)?,
            balance: config.initial_balance,
            position: None,
            report: Report::default(),
            data,
            config,
        })
    }

    /// Returns the candle series.
    pub fn candles(&self) -> &[Candle] {
        &self.data
    }

    /// Returns a copy of the run configuration.
    pub fn config(&self) -> Config {
        self.config
    }

    /// Returns the broker applying fills for this run.
    pub fn broker(&self) -> &Broker {
        &self.broker
    }

    /// Returns the mark-to-market balance as of the last processed step.
    pub fn balance(&self) -> f64 {
        self.balance
    }

    /// Returns the open position, if any.
    pub fn position(&self) -> Option<Position> {
        self.position
    }

    /// Returns the results table recorded so far.
    pub fn report(&self) -> &Report {
        &self.report
    }

    /// Runs the strategy over the candle series.
    ///
    /// Steps through the data one candle at a time once the warm-up window
    /// is filled. Each step first marks the wallet to market at the
    /// candle's open, high and low (failing with [`Error::OutOfMoney`] if
    /// equity dies intra-candle) and snapshots the ledger into the report,
    /// then asks the strategy to enter or exit. The window handed to the
    /// strategy is the trailing slice ending just before the current
    /// candle. A position still open on the last candle is force-closed at
    /// that candle's close price, bypassing the strategy.
    ///
    /// Call [`reset`](Backtest::reset) before running the same instance
    /// again.
    ///
    /// ### Returns
    /// The completed report, or the error that aborted the run. Rows
    /// recorded before the failure stay available through
    /// [`report`](Backtest::report).
    pub fn run<S>(&mut self, strategy: &mut S) -> Result<&Report>
    where
        S: Strategy + ?Sized,
    {
        let data = Arc::clone(&self.data);
        let last_step = data.len() - 1;
        for step in (self.config.window_size - 1)..=last_step {
            let window = &data[step + 1 - self.config.window_size..step];
            self.step(&data[step], window, step == last_step, strategy)?;
        }
        Ok(&self.report)
    }

    fn step<S>(
        &mut self,
        candle: &Candle,
        window: &[Candle],
        last: bool,
        strategy: &mut S,
    ) -> Result<()>
    where
        S: Strategy + ?Sized,
    {
        let minimal_balance = self.mark_to_market(candle)?;
        let mut record =
            StepRecord::new(candle.open_time(), self.balance, minimal_balance, &self.wallet);

        match self.position {
            None => {
                record.set_position_marker(candle.open());
                if let Some(instruction) = strategy.enter_position(window)? {
                    let fill_price = self.broker.fill_price(&instruction, candle)?;
                    let quantity = (self.balance * self.config.buy_percentage / fill_price)
                        * self.config.leverage;
                    let position =
                        self.broker
                            .open(&mut self.wallet, instruction.kind(), quantity, fill_price)?;
                    record.set_action(Action::Opened(instruction.kind()));
                    self.position = Some(position);
                }
            }
            Some(position) => {
                let marker = match position.side() {
                    PositionSide::Long => candle.open() + POSITION_MARKER_OFFSET,
                    PositionSide::Short => candle.open() - POSITION_MARKER_OFFSET,
                };
                record.set_position_marker(marker);

                let instruction = if last {
                    // Forced liquidation at the end of the series
                    Some(Instruction::from((
                        position.side().closing_kind(),
                        candle.close(),
                    )))
                } else {
                    strategy.exit_position(window, &position)?
                };

                if let Some(instruction) = instruction {
                    let fill_price = self.broker.fill_price(&instruction, candle)?;
                    let (rate, rate_with_commission) = self.broker.close(
                        &mut self.wallet,
                        &position,
                        instruction.kind(),
                        fill_price,
                    )?;
                    record.set_action(Action::Closed(instruction.kind()));
                    record.set_returns(rate, rate_with_commission);
                    self.position = None;
                }
            }
        }

        self.report.push(record);
        Ok(())
    }

    /// Recomputes the balance at the candle's open and checks solvency at
    /// its high and low. Returns the lowest intra-candle equity.
    fn mark_to_market(&mut self, candle: &Candle) -> Result<f64> {
        let balance = self.wallet.equity(candle.open());
        let balance_high = self.wallet.equity(candle.high());
        let balance_low = self.wallet.equity(candle.low());

        let minimal_balance = balance_high.min(balance_low);
        if minimal_balance <= 0.0 {
            return Err(Error::OutOfMoney(minimal_balance, candle.open_time()));
        }

        self.balance = balance;
        Ok(minimal_balance)
    }

    /// Resets the backtest to its initial state.
    pub fn reset(&mut self) {
        self.wallet.reset();
        self.balance = self.config.initial_balance;
        self.position = None;
        self.report = Report::default();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{DateTime, Utc};

    use super::*;

    fn ts(i: usize) -> DateTime<Utc> {
        DateTime::from_timestamp_secs(1_700_000_000 + i as i64 * 3600).unwrap()
    }

    fn make_candle(i: usize, open: f64, high: f64, low: f64, close: f64) -> Candle {
        CandleBuilder::builder()
            .open(open)
            .high(high)
            .low(low)
            .close(close)
            .volume(1000.0)
            .open_time(ts(i))
            .close_time(ts(i + 1))
            .build()
            .unwrap()
    }

    // Flat candles trade at exactly one price, so fills equal references
    fn flat_series(prices: &[f64]) -> Arc<[Candle]> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &price)| make_candle(i, price, price, price, price))
            .collect()
    }

    #[derive(Default)]
    struct LongRoundTrip {
        opened: bool,
        exit_price: Option<f64>,
    }

    impl Strategy for LongRoundTrip {
        fn enter_position(&mut self, window: &[Candle]) -> Result<Option<Instruction>> {
            if self.opened {
                return Ok(None);
            }
            self.opened = true;
            let price = window.last().unwrap().close();
            Ok(Some(Instruction::from((OrderKind::OpenLong, price))))
        }

        fn exit_position(
            &mut self,
            _window: &[Candle],
            position: &Position,
        ) -> Result<Option<Instruction>> {
            let Some(price) = self.exit_price else {
                return Ok(None);
            };
            Ok(Some(Instruction::from((
                position.side().closing_kind(),
                price,
            ))))
        }
    }

    #[test]
    fn new_rejects_empty_data() {
        let result = Backtest::new(flat_series(&[]), Config::default());
        assert!(matches!(result, Err(Error::CandleDataEmpty)));
    }

    #[test]
    fn new_rejects_short_data() {
        let data = flat_series(&[100.0; 50]);
        let result = Backtest::new(data, Config::default());
        assert!(matches!(result, Err(Error::WindowSize(100, 50))));
    }

    #[test]
    fn new_rejects_invalid_config() {
        let data = flat_series(&[100.0; 10]);
        let config = Config::default().window_size(2);

        let result = Backtest::new(Arc::clone(&data), config.initial_balance(-1.0));
        assert!(matches!(result, Err(Error::NegZeroBalance(_))));

        let result = Backtest::new(Arc::clone(&data), config.leverage(0.5));
        assert!(matches!(result, Err(Error::Leverage(_))));

        let result = Backtest::new(Arc::clone(&data), config.commission(1.0));
        assert!(matches!(result, Err(Error::CommissionRate(_))));

        let result = Backtest::new(Arc::clone(&data), config.buy_percentage(0.0));
        assert!(matches!(result, Err(Error::BuyPercentage(_))));

        let result = Backtest::new(Arc::clone(&data), config.change_size(0.0));
        assert!(matches!(result, Err(Error::ChangeSize(_))));

        let result = Backtest::new(Arc::clone(&data), config.window_size(0));
        assert!(matches!(result, Err(Error::WindowSize(0, 10))));
    }

    #[test]
    fn new_rejects_unordered_candles() {
        let mut candles = vec![
            make_candle(0, 100.0, 100.0, 100.0, 100.0),
            make_candle(2, 100.0, 100.0, 100.0, 100.0),
        ];
        // Duplicate timestamp
        candles.push(candles[1].clone());
        let result = Backtest::new(candles.into(), Config::default().window_size(1));
        assert!(matches!(result, Err(Error::UnorderedCandles(2))));
    }

    #[test]
    fn window_excludes_current_candle() {
        #[derive(Default)]
        struct Probe {
            seen: Vec<(usize, Option<f64>)>,
        }

        impl Strategy for Probe {
            fn enter_position(&mut self, window: &[Candle]) -> Result<Option<Instruction>> {
                self.seen
                    .push((window.len(), window.last().map(|c| c.close())));
                Ok(None)
            }

            fn exit_position(
                &mut self,
                _window: &[Candle],
                _position: &Position,
            ) -> Result<Option<Instruction>> {
                Ok(None)
            }
        }

        let data = flat_series(&[100.0, 101.0, 102.0, 103.0, 104.0]);
        let mut bt = Backtest::new(data, Config::default().window_size(3)).unwrap();
        let mut probe = Probe::default();
        bt.run(&mut probe).unwrap();

        // One call per step; the window never contains the current candle
        assert_eq!(
            probe.seen,
            vec![(2, Some(101.0)), (2, Some(102.0)), (2, Some(103.0))]
        );
        assert_eq!(bt.report().len(), 3);
    }

    #[test]
    fn window_size_one_gives_empty_window() {
        #[derive(Default)]
        struct Probe {
            lens: Vec<usize>,
        }

        impl Strategy for Probe {
            fn enter_position(&mut self, window: &[Candle]) -> Result<Option<Instruction>> {
                self.lens.push(window.len());
                Ok(None)
            }

            fn exit_position(
                &mut self,
                _window: &[Candle],
                _position: &Position,
            ) -> Result<Option<Instruction>> {
                Ok(None)
            }
        }

        let data = flat_series(&[100.0, 101.0, 102.0]);
        let mut bt = Backtest::new(data, Config::default().window_size(1)).unwrap();
        let mut probe = Probe::default();
        bt.run(&mut probe).unwrap();

        assert_eq!(probe.lens, vec![0, 0, 0]);
        assert_eq!(bt.report().len(), 3);
    }

    #[test]
    fn scenario_window_warmup_row_count() {
        let data = flat_series(&[100.0; 150]);
        let mut bt = Backtest::new(data, Config::default()).unwrap();
        // Never trades; every step still records a row
        let mut strategy = RandomStrategy::with_seed(0.0, 0.0, 1).unwrap();
        let report = bt.run(&mut strategy).unwrap();

        assert_eq!(report.len(), 51);
        assert!(report.rows().iter().all(|row| row.balance() == 10000.0));
        assert!(report.rows().iter().all(|row| row.action().is_none()));
    }

    #[test]
    fn scenario_long_round_trip() {
        let data = flat_series(&[100.0; 5]);
        let config = Config::default().window_size(2).buy_percentage(0.5);
        let mut bt = Backtest::new(data, config).unwrap();
        let mut strategy = LongRoundTrip {
            opened: false,
            exit_price: Some(110.0),
        };
        bt.run(&mut strategy).unwrap();

        let rows = bt.report().rows();
        assert_eq!(rows.len(), 4);

        // Entry step: snapshot taken before the fill
        assert_eq!(rows[0].action(), Some(Action::Opened(OrderKind::OpenLong)));
        assert_eq!(rows[0].balance(), 10000.0);
        assert_eq!(rows[0].cash(), 10000.0);
        assert_eq!(rows[0].position_marker(), 100.0);

        // Holding 50 units bought at 100
        assert_eq!(rows[1].cash(), 5000.0);
        assert_eq!(rows[1].base(), 50.0);
        assert_eq!(rows[1].loaned_cash(), 0.0);
        assert_eq!(rows[1].balance(), 10000.0);
        assert_eq!(rows[1].position_marker(), 2100.0);
        assert_eq!(rows[1].action(), Some(Action::Closed(OrderKind::CloseLong)));
        assert_eq!(rows[1].return_rate(), Some(0.1));
        assert_eq!(rows[1].return_rate_with_commission(), Some(0.1));

        // Flat afterwards, profit realized
        assert_eq!(rows[2].cash(), 10500.0);
        assert_eq!(rows[2].balance(), 10500.0);
        assert!(rows[2].action().is_none());

        assert!(bt.position().is_none());
        assert_eq!(bt.balance(), 10500.0);
        assert_eq!(bt.cash(), 10500.0);
    }

    #[test]
    fn scenario_short_round_trip_with_leverage() {
        #[derive(Default)]
        struct ShortRoundTrip {
            opened: bool,
        }

        impl Strategy for ShortRoundTrip {
            fn enter_position(&mut self, window: &[Candle]) -> Result<Option<Instruction>> {
                if self.opened {
                    return Ok(None);
                }
                self.opened = true;
                let price = window.last().unwrap().close();
                Ok(Some(Instruction::from((OrderKind::OpenShort, price))))
            }

            fn exit_position(
                &mut self,
                _window: &[Candle],
                position: &Position,
            ) -> Result<Option<Instruction>> {
                Ok(Some(Instruction::from((
                    position.side().closing_kind(),
                    90.0,
                ))))
            }
        }

        let data = flat_series(&[100.0; 4]);
        let config = Config::default()
            .window_size(2)
            .buy_percentage(0.02)
            .leverage(2.0);
        let mut bt = Backtest::new(data, config).unwrap();
        bt.run(&mut ShortRoundTrip::default()).unwrap();

        let rows = bt.report().rows();
        assert_eq!(rows.len(), 3);

        // 4 units sold short at 100, half of them borrowed
        assert_eq!(rows[0].action(), Some(Action::Opened(OrderKind::OpenShort)));
        assert_eq!(rows[1].cash(), 10400.0);
        assert_eq!(rows[1].base(), -2.0);
        assert_eq!(rows[1].loaned_base(), 2.0);
        assert_eq!(rows[1].loaned_cash(), 0.0);
        assert_eq!(rows[1].position_marker(), 100.0 - 2000.0);

        // Covered at 90: return (100-90)/100 doubled by leverage
        assert_eq!(rows[1].action(), Some(Action::Closed(OrderKind::CloseShort)));
        assert_eq!(rows[1].return_rate(), Some(0.2));
        assert_eq!(bt.cash(), 10040.0);
        assert_eq!(bt.base(), 0.0);
        assert_eq!(bt.loaned_base(), 0.0);
        assert!(bt.position().is_none());
    }

    #[test]
    fn scenario_forced_close_at_series_end() {
        let mut candles: Vec<Candle> = (0..4)
            .map(|i| make_candle(i, 100.0, 100.0, 100.0, 100.0))
            .collect();
        candles.push(make_candle(4, 120.0, 120.0, 120.0, 120.0));

        let config = Config::default().window_size(2).buy_percentage(0.5);
        let mut bt = Backtest::new(candles.into(), config).unwrap();
        bt.run(&mut BuyAndHold).unwrap();

        let rows = bt.report().rows();
        assert_eq!(rows.len(), 4);

        // Exactly one entry, held until the last candle
        let opened = rows
            .iter()
            .filter(|row| matches!(row.action(), Some(Action::Opened(_))))
            .count();
        assert_eq!(opened, 1);

        let last = rows.last().unwrap();
        assert_eq!(last.action(), Some(Action::Closed(OrderKind::CloseLong)));
        assert_eq!(last.balance(), 11000.0);
        assert_eq!(last.position_marker(), 2120.0);
        assert_eq!(last.return_rate(), Some(0.2));

        // The run always ends flat
        assert!(bt.position().is_none());
        assert_eq!(bt.cash(), 11000.0);
        assert_eq!(bt.base(), 0.0);
    }

    #[test]
    fn scenario_out_of_money_aborts_run() {
        let mut candles: Vec<Candle> = (0..3)
            .map(|i| make_candle(i, 100.0, 100.0, 100.0, 100.0))
            .collect();
        // Crash candle: low implies negative equity for a 10x long
        candles.push(make_candle(3, 95.0, 96.0, 85.0, 90.0));
        candles.push(make_candle(4, 90.0, 90.0, 90.0, 90.0));

        let config = Config::default()
            .window_size(2)
            .buy_percentage(1.0)
            .leverage(10.0);
        let mut bt = Backtest::new(candles.into(), config).unwrap();
        let result = bt.run(&mut BuyAndHold);

        match result {
            Err(Error::OutOfMoney(equity, at)) => {
                assert_eq!(equity, -5000.0);
                assert_eq!(at, ts(3));
            }
            other => panic!("expected OutOfMoney, got {other:?}"),
        }

        // Rows up to the failing step are preserved
        assert_eq!(bt.report().len(), 2);
    }

    #[test]
    fn strategy_contract_violations_fail_fast() {
        struct BadEnter;

        impl Strategy for BadEnter {
            fn enter_position(&mut self, window: &[Candle]) -> Result<Option<Instruction>> {
                let price = window.last().unwrap().close();
                Ok(Some(Instruction::from((OrderKind::CloseLong, price))))
            }

            fn exit_position(
                &mut self,
                _window: &[Candle],
                _position: &Position,
            ) -> Result<Option<Instruction>> {
                Ok(None)
            }
        }

        struct BadExit;

        impl Strategy for BadExit {
            fn enter_position(&mut self, window: &[Candle]) -> Result<Option<Instruction>> {
                let price = window.last().unwrap().close();
                Ok(Some(Instruction::from((OrderKind::OpenLong, price))))
            }

            fn exit_position(
                &mut self,
                _window: &[Candle],
                _position: &Position,
            ) -> Result<Option<Instruction>> {
                Ok(Some(Instruction::from((OrderKind::OpenShort, 100.0))))
            }
        }

        let data = flat_series(&[100.0; 5]);
        let config = Config::default().window_size(2);

        let mut bt = Backtest::new(Arc::clone(&data), config).unwrap();
        let result = bt.run(&mut BadEnter);
        assert!(matches!(
            result,
            Err(Error::EntryInstruction(OrderKind::CloseLong))
        ));

        let mut bt = Backtest::new(data, config).unwrap();
        let result = bt.run(&mut BadExit);
        assert!(matches!(
            result,
            Err(Error::ExitInstruction(OrderKind::OpenShort, PositionSide::Long))
        ));
    }

    #[test]
    fn dyn_strategy_runs() {
        let data = flat_series(&[100.0; 5]);
        let mut bt = Backtest::new(data, Config::default().window_size(2)).unwrap();
        let mut strategy: Box<dyn Strategy> = Box::new(BuyAndHold);
        bt.run(&mut *strategy).unwrap();
        assert!(bt.position().is_none());
    }

    #[test]
    fn reset_restores_initial_state() {
        let data = flat_series(&[100.0; 6]);
        let config = Config::default().window_size(2).buy_percentage(0.5);
        let mut bt = Backtest::new(data, config).unwrap();

        bt.run(&mut BuyAndHold).unwrap();
        let first_balance = bt.balance();
        assert!(!bt.report().is_empty());

        bt.reset();
        assert_eq!(bt.balance(), 10000.0);
        assert_eq!(bt.cash(), 10000.0);
        assert_eq!(bt.fees_paid(), 0.0);
        assert!(bt.report().is_empty());
        assert!(bt.position().is_none());

        // Identical rerun after reset
        bt.run(&mut BuyAndHold).unwrap();
        assert_eq!(bt.balance(), first_balance);
    }

    #[test]
    fn scenario_seeded_random_reproducible() {
        let prices: Vec<f64> = (0..80).map(|i| 100.0 + (i % 7) as f64).collect();
        let data = flat_series(&prices);
        let config = Config::default().window_size(10).buy_percentage(0.1);

        let mut left = Backtest::new(Arc::clone(&data), config).unwrap();
        let mut right = Backtest::new(data, config).unwrap();

        left.run(&mut RandomStrategy::with_seed(0.3, 0.2, 99).unwrap())
            .unwrap();
        right
            .run(&mut RandomStrategy::with_seed(0.3, 0.2, 99).unwrap())
            .unwrap();

        assert_eq!(left.report().len(), right.report().len());
        assert_eq!(left.balance(), right.balance());
        assert_eq!(left.cash(), right.cash());
        assert_eq!(left.fees_paid(), right.fees_paid());
    }
}
