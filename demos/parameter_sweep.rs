//! # Parallel EMA Cross Parameter Sweep
//!
//! Finds the best fast/slow EMA periods by brute force, one fresh backtest
//! per combination spread over the available cores.
mod utils;

use mbt_rs::prelude::*;
use ta::indicators::ExponentialMovingAverage;
use ta::Next;

const START: usize = 5;
const END: usize = 30;

struct Parameters;

impl ParameterCombination for Parameters {
    type Output = (usize, usize);

    fn generate() -> Vec<Self::Output> {
        (START..END)
            .flat_map(|fast| (fast + 1..=END).map(move |slow| (fast, slow)))
            .collect()
    }
}

struct EmaCross {
    fast: ExponentialMovingAverage,
    slow: ExponentialMovingAverage,
}

impl Strategy for EmaCross {
    fn enter_position(&mut self, window: &[Candle]) -> Result<Option<Instruction>> {
        let Some(last) = window.last() else {
            return Ok(None);
        };
        let close = last.close();
        let fast = self.fast.next(close);
        let slow = self.slow.next(close);
        if fast > slow {
            return Ok(Some(Instruction::from((OrderKind::OpenLong, close))));
        }
        Ok(None)
    }

    fn exit_position(
        &mut self,
        window: &[Candle],
        position: &Position,
    ) -> Result<Option<Instruction>> {
        let Some(last) = window.last() else {
            return Ok(None);
        };
        let close = last.close();
        let fast = self.fast.next(close);
        let slow = self.slow.next(close);
        if fast < slow {
            return Ok(Some(Instruction::from((
                position.side().closing_kind(),
                close,
            ))));
        }
        Ok(None)
    }
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let candles = utils::example_candles();
    let initial_balance = 10_000.0;

    let config = Config::default()
        .initial_balance(initial_balance)
        .window_size(48)
        .buy_percentage(0.25);

    let optimizer = Optimizer::<Parameters>::new(candles, config);
    let mut results = optimizer.with(|&(fast, slow)| {
        Ok(EmaCross {
            fast: ExponentialMovingAverage::new(fast).map_err(|e| Error::Msg(e.to_string()))?,
            slow: ExponentialMovingAverage::new(slow).map_err(|e| Error::Msg(e.to_string()))?,
        })
    })?;

    results.sort_by(|(_, balance1), (_, balance2)| {
        balance2
            .partial_cmp(balance1)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let top = results
        .into_iter()
        .filter(|(_, balance)| *balance > initial_balance)
        .take(5)
        .collect::<Vec<_>>();

    println!("\n=== TOP {} EMA cross parameters ===", top.len());
    for ((fast, slow), balance) in top {
        let performance = initial_balance.change(balance);
        println!("({fast}, {slow}) | {balance:.3} ({performance:+.2}%)");
    }

    Ok(())
}
