use chrono::{DateTime, Utc};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// A single OHLCV candle, one per time step.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
    // Taker buy quote volume; zero when the feed does not provide it
    bid: f64,
    open_time: DateTime<Utc>,
    close_time: DateTime<Utc>,
}

impl Candle {
    /// Returns the opening price.
    pub fn open(&self) -> f64 {
        self.open
    }

    /// Returns the highest price.
    pub fn high(&self) -> f64 {
        self.high
    }

    /// Returns the lowest price.
    pub fn low(&self) -> f64 {
        self.low
    }

    /// Returns the closing price.
    pub fn close(&self) -> f64 {
        self.close
    }

    /// Returns the traded volume.
    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Returns the taker buy quote volume.
    pub fn bid(&self) -> f64 {
        self.bid
    }

    /// Returns the remaining volume once the taker buy side is removed.
    pub fn ask(&self) -> f64 {
        self.volume - self.bid
    }

    /// Returns the opening timestamp.
    pub fn open_time(&self) -> DateTime<Utc> {
        self.open_time
    }

    /// Returns the closing timestamp.
    pub fn close_time(&self) -> DateTime<Utc> {
        self.close_time
    }
}

/// Builds a [`Candle`], rejecting incomplete or inconsistent input.
///
/// All fields except `bid` are required. `build` checks that the prices
/// satisfy `low <= open, close <= high`.
#[derive(Debug, Default)]
pub struct CandleBuilder {
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
    volume: Option<f64>,
    bid: Option<f64>,
    open_time: Option<DateTime<Utc>>,
    close_time: Option<DateTime<Utc>>,
}

impl CandleBuilder {
    /// Creates an empty builder.
    pub fn builder() -> Self {
        Self::default()
    }

    /// Sets the opening price.
    pub fn open(mut self, open: f64) -> Self {
        self.open = Some(open);
        self
    }

    /// Sets the highest price.
    pub fn high(mut self, high: f64) -> Self {
        self.high = Some(high);
        self
    }

    /// Sets the lowest price.
    pub fn low(mut self, low: f64) -> Self {
        self.low = Some(low);
        self
    }

    /// Sets the closing price.
    pub fn close(mut self, close: f64) -> Self {
        self.close = Some(close);
        self
    }

    /// Sets the traded volume.
    pub fn volume(mut self, volume: f64) -> Self {
        self.volume = Some(volume);
        self
    }

    /// Sets the taker buy quote volume.
    pub fn bid(mut self, bid: f64) -> Self {
        self.bid = Some(bid);
        self
    }

    /// Sets the opening timestamp.
    pub fn open_time(mut self, open_time: DateTime<Utc>) -> Self {
        self.open_time = Some(open_time);
        self
    }

    /// Sets the closing timestamp.
    pub fn close_time(mut self, close_time: DateTime<Utc>) -> Self {
        self.close_time = Some(close_time);
        self
    }

    /// Consumes the builder and validates the candle.
    pub fn build(self) -> Result<Candle> {
        let open = self.open.ok_or(Error::CandleField("open"))?;
        let high = self.high.ok_or(Error::CandleField("high"))?;
        let low = self.low.ok_or(Error::CandleField("low"))?;
        let close = self.close.ok_or(Error::CandleField("close"))?;
        let volume = self.volume.ok_or(Error::CandleField("volume"))?;
        let open_time = self.open_time.ok_or(Error::CandleField("open_time"))?;
        let close_time = self.close_time.ok_or(Error::CandleField("close_time"))?;
        let bid = self.bid.unwrap_or(0.0);

        let bounded = |price: f64| price.is_finite() && low <= price && price <= high;
        if !(low.is_finite() && high.is_finite() && bounded(open) && bounded(close)) {
            return Err(Error::CandleBounds(open, high, low, close));
        }

        Ok(Candle {
            open,
            high,
            low,
            close,
            volume,
            bid,
            open_time,
            close_time,
        })
    }
}

#[cfg(test)]
#[test]
fn build_valid_candle() {
    let candle = CandleBuilder::builder()
        .open(100.0)
        .high(105.0)
        .low(95.0)
        .close(102.0)
        .volume(1000.0)
        .open_time(DateTime::from_timestamp_secs(1515151515).unwrap())
        .close_time(DateTime::from_timestamp_secs(1515151515 + 3599).unwrap())
        .build()
        .unwrap();

    assert_eq!(candle.open(), 100.0);
    assert_eq!(candle.high(), 105.0);
    assert_eq!(candle.low(), 95.0);
    assert_eq!(candle.close(), 102.0);
    assert_eq!(candle.volume(), 1000.0);
    assert_eq!(candle.bid(), 0.0);
}

#[cfg(test)]
#[test]
fn build_missing_field() {
    let result = CandleBuilder::builder().open(100.0).build();
    assert!(matches!(result, Err(Error::CandleField("high"))));
}

#[cfg(test)]
#[test]
fn build_out_of_bounds() {
    // close above high
    let result = CandleBuilder::builder()
        .open(100.0)
        .high(105.0)
        .low(95.0)
        .close(106.0)
        .volume(1000.0)
        .open_time(DateTime::from_timestamp_secs(1515151515).unwrap())
        .close_time(DateTime::from_timestamp_secs(1515151516).unwrap())
        .build();
    assert!(matches!(result, Err(Error::CandleBounds(_, _, _, _))));

    // low above high
    let result = CandleBuilder::builder()
        .open(100.0)
        .high(95.0)
        .low(105.0)
        .close(100.0)
        .volume(1000.0)
        .open_time(DateTime::from_timestamp_secs(1515151515).unwrap())
        .close_time(DateTime::from_timestamp_secs(1515151516).unwrap())
        .build();
    assert!(matches!(result, Err(Error::CandleBounds(_, _, _, _))));
}
