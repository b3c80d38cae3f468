//! # Buy And Hold
//!
//! Opens a long on the first window and lets the forced close at the end of
//! the series realize the return, then compares it against the raw price move.
mod utils;

use mbt_rs::prelude::*;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let candles = utils::example_candles();
    let first_price = candles.first().unwrap().close();
    let last_price = candles.last().unwrap().close();

    let initial_balance = 10_000.0;
    let config = Config::default()
        .initial_balance(initial_balance)
        .window_size(50)
        .buy_percentage(1.0);
    let mut backtest = Backtest::new(candles.into(), config)?;

    backtest.run(&mut BuyAndHold)?;

    let new_balance = backtest.balance();
    let performance = initial_balance.change(new_balance);
    println!("buy and hold {new_balance:.2} ({performance:+.2}%)");

    let raw_move = first_price.change(last_price);
    println!("raw price move {raw_move:+.2}%");

    #[cfg(feature = "metrics")]
    println!("{}", Summary::try_from(&backtest)?);

    Ok(())
}
