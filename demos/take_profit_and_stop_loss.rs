//! # Take Profit And Stop Loss
//!
//! Enters long on a momentum burst and exits at a fixed take-profit or
//! stop-loss level derived from the entry price.
mod utils;

use mbt_rs::prelude::*;

const TAKE_PROFIT: f64 = 4.0;
const STOP_LOSS: f64 = 2.0;

struct TakeProfitStopLoss;

impl Strategy for TakeProfitStopLoss {
    fn enter_position(&mut self, window: &[Candle]) -> Result<Option<Instruction>> {
        let [.., previous, last] = window else {
            return Ok(None);
        };
        // Momentum burst: two consecutive rising closes
        if last.close() > previous.close() && previous.close() > previous.open() {
            return Ok(Some(Instruction::from((OrderKind::OpenLong, last.close()))));
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
        let take_profit = position.entry_price().addpercent(TAKE_PROFIT);
        let stop_loss = position.entry_price().subpercent(STOP_LOSS);
        let close = last.close();
        if close >= take_profit || close <= stop_loss {
            return Ok(Some(Instruction::from((
                position.side().closing_kind(),
                close,
            ))));
        }
        Ok(None)
    }
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let candles = utils::generate_sample_candles(1000, 3, 100.0);
    let initial_balance = 10_000.0;

    let config = Config::default()
        .initial_balance(initial_balance)
        .window_size(24)
        .buy_percentage(0.5);
    let mut backtest = Backtest::new(candles.into(), config)?;

    let report = backtest.run(&mut TakeProfitStopLoss)?;

    let mut wins = 0;
    let mut losses = 0;
    for row in report.rows() {
        match row.return_rate() {
            Some(rate) if rate > 0.0 => wins += 1,
            Some(_) => losses += 1,
            None => {}
        }
    }
    println!("steps {} / wins {wins} / losses {losses}", report.len());

    let balance = backtest.balance();
    let performance = initial_balance.change(balance);
    println!("performance {balance:.2} ({performance:+.2}%)");

    backtest.report().save_csv("tpsl_report.csv")?;
    println!("report saved to tpsl_report.csv");

    Ok(())
}
