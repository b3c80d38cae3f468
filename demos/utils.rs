use chrono::{DateTime, Duration};
use mbt_rs::engine::{Candle, CandleBuilder};

/// Generates deterministic candle data.
pub fn generate_sample_candles(max: i64, seed: i64, base_price: f64) -> Vec<Candle> {
    let mut open_time = DateTime::default();
    let mut open = base_price;

    (0..=max)
        .map(|i| {
            // Base price with trend (+ 0.5*i)
            let trend = base_price + 0.5 * (i as f64);

            // Price variation using simple trigonometric function with seed
            let variation = 5.0 * ((i as f64 * 0.3 + seed as f64).sin() * 0.5 + 0.5);

            let close = trend + variation;
            // Keep both open and close inside the candle's range
            let high = close.max(open) + 0.3 * variation.abs();
            let low = close.min(open) - 0.3 * variation.abs();
            // Volume with seasonal pattern, bid is the taker buy share of it
            let volume = 1000.0 + 500.0 * ((i as f64 * 0.2).sin()).abs();
            let bid = volume * (0.5 + 0.25 * (i as f64 * 0.45).sin());

            let close_time = open_time + Duration::hours(1);

            let candle = CandleBuilder::builder()
                .open(open)
                .high(high)
                .low(low)
                .close(close)
                .volume(volume)
                .bid(bid)
                .open_time(open_time)
                .close_time(close_time - Duration::seconds(1))
                .build()
                .unwrap();

            open_time = close_time;
            open = close;
            candle
        })
        .collect()
}

#[allow(dead_code)]
pub fn example_candles() -> Vec<Candle> {
    generate_sample_candles(3000, 42, 100.0)
}
