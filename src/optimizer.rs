//! Strategy parameter optimization.
//!
//! This module provides tools to optimize trading strategies by testing
//! different parameter combinations. The `Optimizer` struct handles the
//! execution of backtests for each combination, while the
//! `ParameterCombination` trait defines how to generate parameter sets.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::engine::{Backtest, Candle, Config, Strategy};
use crate::errors::Result;

use rayon::prelude::*;

/// Trait defining how to generate parameter combinations for optimization.
///
/// Implement this trait for your parameter types to define how combinations
/// should be generated. The associated type `Output` represents a single
/// parameter combination (e.g., a tuple of values).
pub trait ParameterCombination: Sync {
    /// Type representing a single parameter combination (e.g., `(usize, f64)`).
    type Output: Clone + Send + Sync;

    /// Generates all possible parameter combinations to test.
    ///
    /// # Returns
    /// A vector containing all parameter combinations.
    fn generate() -> Vec<Self::Output>;
}

/// Optimizer for testing trading strategies with different parameter
/// combinations.
///
/// This struct fans the combinations out over the available cores, runs one
/// backtest per combination and collects the resulting balances for
/// analysis.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Optimizer<PC: ParameterCombination> {
    data: Vec<Candle>,
    config: Config,
    _marker: PhantomData<PC>,
}

impl<PC: ParameterCombination> From<&Backtest> for Optimizer<PC> {
    fn from(value: &Backtest) -> Self {
        Self {
            _marker: PhantomData,
            data: value.candles().to_vec(),
            config: value.config(),
        }
    }
}

impl<PC: ParameterCombination> Optimizer<PC> {
    /// Creates a new `Optimizer` with the given data and run configuration.
    ///
    /// # Arguments
    /// * `data` - Historical candle data for backtesting.
    /// * `config` - Run configuration shared by every tested combination.
    ///
    /// # Returns
    /// A new `Optimizer` instance.
    pub fn new(data: Vec<Candle>, config: Config) -> Self {
        Self {
            data,
            config,
            _marker: PhantomData,
        }
    }

    /// Optimizes a trading strategy by testing all parameter combinations.
    ///
    /// The combinations are split into one chunk per logical CPU; each chunk
    /// owns a single `Backtest` that is reset between runs, and `combinator`
    /// builds a fresh strategy for every combination.
    ///
    /// # Arguments
    /// * `combinator` - Function that converts a parameter combination into
    ///   a strategy instance.
    ///
    /// # Returns
    /// A vector of tuples containing each parameter combination and its
    /// resulting balance, in generation order.
    ///
    /// # Errors
    /// Returns an error if strategy construction or backtest execution
    /// fails.
    pub fn with<S, C>(&self, combinator: C) -> Result<Vec<(PC::Output, f64)>>
    where
        S: Strategy,
        C: Fn(&PC::Output) -> Result<S> + Sync,
    {
        let num_cpus = num_cpus::get();
        let combinations = PC::generate();
        let chunk_size = combinations.len().div_ceil(num_cpus).max(1);
        let data: Arc<[Candle]> = self.data.as_slice().into();

        combinations
            .par_chunks(chunk_size)
            .map::<_, Result<_>>(|chunk| {
                let mut backtest = Backtest::new(Arc::clone(&data), self.config)?;
                let mut local_results = Vec::with_capacity(chunk.len());

                for params in chunk {
                    let mut strategy = combinator(params)?;
                    backtest.run(&mut strategy)?;
                    local_results.push((params.clone(), backtest.balance()));
                    backtest.reset();
                }

                Ok(local_results)
            })
            .collect::<Result<Vec<_>>>()
            .map(|chunks| chunks.into_iter().flatten().collect())
    }
}

#[cfg(test)]
fn get_data() -> Vec<Candle> {
    use crate::engine::CandleBuilder;
    use chrono::DateTime;

    (0..60)
        .map(|i: i64| {
            let price = 100.0 + 10.0 * f64::sin(i as f64 * 0.35);
            CandleBuilder::builder()
                .open(price)
                .high(price)
                .low(price)
                .close(price)
                .volume(10.0)
                .open_time(DateTime::from_timestamp_secs(1515151515 + i * 3600).unwrap())
                .close_time(DateTime::from_timestamp_secs(1515151515 + (i + 1) * 3600).unwrap())
                .build()
                .unwrap()
        })
        .collect()
}

#[cfg(test)]
#[derive(Clone)]
struct Parameters;

#[cfg(test)]
impl ParameterCombination for Parameters {
    type Output = (usize, usize);

    fn generate() -> Vec<Self::Output> {
        let min = 3;
        let max = 6;
        (min..=max)
            .flat_map(|fast| (min..=max).map(move |slow| (fast, slow)))
            .collect()
    }
}

#[cfg(test)]
struct EmaCross {
    fast: ta::indicators::ExponentialMovingAverage,
    slow: ta::indicators::ExponentialMovingAverage,
}

#[cfg(test)]
impl Strategy for EmaCross {
    fn enter_position(
        &mut self,
        window: &[Candle],
    ) -> Result<Option<crate::engine::Instruction>> {
        use crate::engine::OrderKind;
        use ta::Next;

        let Some(last) = window.last() else {
            return Ok(None);
        };
        let fast = self.fast.next(last.close());
        let slow = self.slow.next(last.close());
        if fast > slow {
            return Ok(Some((OrderKind::OpenLong, last.close()).into()));
        }
        Ok(None)
    }

    fn exit_position(
        &mut self,
        window: &[Candle],
        position: &crate::engine::Position,
    ) -> Result<Option<crate::engine::Instruction>> {
        use ta::Next;

        let Some(last) = window.last() else {
            return Ok(None);
        };
        let fast = self.fast.next(last.close());
        let slow = self.slow.next(last.close());
        if fast < slow {
            return Ok(Some((position.side().closing_kind(), last.close()).into()));
        }
        Ok(None)
    }
}

#[cfg(test)]
#[test]
fn optimizer_with_ema_cross() {
    use ta::indicators::ExponentialMovingAverage;

    let config = Config::default().window_size(10).buy_percentage(0.1);
    let backtest = Backtest::new(get_data().into(), config).unwrap();
    let optimizer = Optimizer::<Parameters>::from(&backtest);

    let results = optimizer
        .with(|&(fast, slow)| {
            Ok(EmaCross {
                fast: ExponentialMovingAverage::new(fast).unwrap(),
                slow: ExponentialMovingAverage::new(slow).unwrap(),
            })
        })
        .unwrap();

    assert_eq!(results.len(), Parameters::generate().len());
    assert!(results.iter().all(|(_, balance)| *balance > 0.0));
}

#[cfg(test)]
#[test]
fn optimizer_matches_standalone_runs() {
    use crate::engine::RandomStrategy;

    struct Seeds;

    impl ParameterCombination for Seeds {
        type Output = u64;

        fn generate() -> Vec<u64> {
            (0..8).collect()
        }
    }

    let data = get_data();
    let config = Config::default().window_size(5).buy_percentage(0.1);
    let optimizer = Optimizer::<Seeds>::new(data.clone(), config);
    let results = optimizer
        .with(|&seed| RandomStrategy::with_seed(0.4, 0.3, seed))
        .unwrap();
    assert_eq!(results.len(), 8);

    // Shared-backtest runs and standalone runs produce identical balances
    for (seed, balance) in results {
        let mut standalone = Backtest::new(data.clone().into(), config).unwrap();
        standalone
            .run(&mut RandomStrategy::with_seed(0.4, 0.3, seed).unwrap())
            .unwrap();
        assert_eq!(balance, standalone.balance());
    }
}
