//! # Random Baseline
//!
//! Runs the seeded coin-flip strategy and draws the candle chart with the
//! balance curves on a secondary axis.
mod utils;

use mbt_rs::prelude::*;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let candles = utils::generate_sample_candles(300, 7, 100.0);

    let config = Config::default()
        .window_size(24)
        .buy_percentage(0.2)
        .commission(0.001);
    let mut backtest = Backtest::new(candles.into(), config)?;

    let mut strategy = RandomStrategy::with_seed(0.15, 0.05, 42)?;
    let report = backtest.run(&mut strategy)?;

    let trades = report
        .rows()
        .iter()
        .filter(|row| row.return_rate().is_some())
        .count();
    println!("steps {} / trades {trades}", report.len());
    println!("final balance {:.3}", backtest.balance());

    let options = DrawOptions::default()
        .title("Random baseline")
        .show_volume(true)
        .draw_output(DrawOutput::Svg("random_strategy.svg"));
    Draw::from(&backtest).with_options(options).plot()?;
    println!("chart saved to random_strategy.svg");

    Ok(())
}
