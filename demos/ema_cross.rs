//! # EMA Cross
//!
//! A fast/slow exponential moving average crossover strategy fed from the
//! sliding window.
mod utils;

use mbt_rs::prelude::*;
use ta::indicators::ExponentialMovingAverage;
use ta::Next;

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
        .buy_percentage(0.25)
        .commission(0.0005);
    let mut backtest = Backtest::new(candles.into(), config)?;

    let mut strategy = EmaCross {
        fast: ExponentialMovingAverage::new(12)?,
        slow: ExponentialMovingAverage::new(26)?,
    };
    let report = backtest.run(&mut strategy)?;

    let trades = report
        .rows()
        .iter()
        .filter(|row| row.return_rate().is_some())
        .count();
    println!("steps {} / trades {trades}", report.len());

    let balance = backtest.balance();
    let performance = initial_balance.change(balance);
    println!("performance {balance:.2} ({performance:+.2}%)");

    #[cfg(feature = "metrics")]
    println!("{}", Summary::try_from(&backtest)?);

    Ok(())
}
