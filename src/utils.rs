use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};

#[cfg(feature = "serde")]
use chrono::serde::ts_milliseconds;

use crate::engine::{Candle, CandleBuilder};
use crate::errors::{Error, Result};

// Open time,Open,High,Low,Close,Volume,Close time,
// Quote asset volume,Number of trades,Taker buy volume,
// Taker buy quote asset volume
// 2021-03-01 0:00:00,45134.11,45550.0,44950.1,...

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Reads candles from CSV kline data.
///
/// Columns are matched by header name, not position. `Open time`,
/// `Close time`, `Open`, `High`, `Low`, `Close` and `Volume` are required;
/// `Taker buy quote asset volume` feeds the candle's bid volume when
/// present. Timestamps are `%Y-%m-%d %H:%M:%S` datetimes, with or without
/// a zero-padded hour.
pub fn candles_from_csv<R: Read>(reader: R) -> Result<Vec<Candle>> {
    let mut reader = csv::Reader::from_reader(reader);

    let headers = reader.headers()?.clone();
    let column = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|header| header == name)
            .ok_or_else(|| Error::CsvColumn(name.into()))
    };

    let open_time = column("Open time")?;
    let close_time = column("Close time")?;
    let open = column("Open")?;
    let high = column("High")?;
    let low = column("Low")?;
    let close = column("Close")?;
    let volume = column("Volume")?;
    let bid = headers
        .iter()
        .position(|header| header == "Taker buy quote asset volume");

    let mut candles = Vec::new();
    for record in reader.records() {
        let record = record?;
        let field = |index: usize| record.get(index).unwrap_or_default().trim();
        let price = |index: usize| -> Result<f64> {
            let raw = field(index);
            raw.parse()
                .map_err(|_| Error::CsvValue(headers[index].into(), raw.into()))
        };

        let mut builder = CandleBuilder::builder()
            .open(price(open)?)
            .high(price(high)?)
            .low(price(low)?)
            .close(price(close)?)
            .volume(price(volume)?)
            .open_time(parse_datetime(&headers[open_time], field(open_time))?)
            .close_time(parse_datetime(&headers[close_time], field(close_time))?);
        if let Some(bid) = bid {
            builder = builder.bid(price(bid)?);
        }
        candles.push(builder.build()?);
    }

    Ok(candles)
}

/// Reads candles from the CSV file at `path`. See [`candles_from_csv`].
pub fn candles_from_csv_file<P: AsRef<Path>>(path: P) -> Result<Vec<Candle>> {
    let file = File::open(path)?;
    candles_from_csv(BufReader::new(file))
}

// Kline exports sometimes drop the leading zero on the hour
fn parse_datetime(column: &str, raw: &str) -> Result<DateTime<Utc>> {
    let padded;
    let text = match raw.split_once(' ') {
        Some((date, time)) if time.as_bytes().get(1) == Some(&b':') => {
            padded = format!("{date} 0{time}");
            &padded
        }
        _ => raw,
    };
    let naive = NaiveDateTime::parse_from_str(text, DATETIME_FORMAT)
        .map_err(|_| Error::CsvValue(column.into(), raw.into()))?;
    Ok(naive.and_utc())
}

// {
//   "open_time": 1614556800000,
//   "open_price": 45134.11,
//   ...
//   "taker_buy_quote_volume": 27000000.0
// }
#[cfg(feature = "serde")]
#[derive(Debug, serde::Deserialize)]
struct RawCandle {
    #[serde(alias = "open_price")]
    open: f64,
    #[serde(alias = "high_price")]
    high: f64,
    #[serde(alias = "low_price")]
    low: f64,
    #[serde(alias = "close_price")]
    close: f64,
    volume: f64,
    #[serde(default, alias = "taker_buy_quote_volume")]
    bid: f64,
    #[serde(with = "ts_milliseconds")]
    open_time: DateTime<Utc>,
    #[serde(with = "ts_milliseconds")]
    close_time: DateTime<Utc>,
}

/// Reads candles from a JSON array of kline records.
///
/// Field names follow the exchange export (`open_price`, `high_price`,
/// ...) or their short forms (`open`, `high`, ...); timestamps are epoch
/// milliseconds. Unknown fields are ignored.
#[cfg(feature = "serde")]
pub fn candles_from_json<R: Read>(reader: R) -> Result<Vec<Candle>> {
    let raw: Vec<RawCandle> = serde_json::from_reader(reader)?;
    raw.into_iter()
        .map(|data| {
            CandleBuilder::builder()
                .open(data.open)
                .high(data.high)
                .low(data.low)
                .close(data.close)
                .volume(data.volume)
                .bid(data.bid)
                .open_time(data.open_time)
                .close_time(data.close_time)
                .build()
        })
        .collect()
}

/// Reads candles from the JSON file at `path`. See [`candles_from_json`].
#[cfg(feature = "serde")]
pub fn candles_from_json_file<P: AsRef<Path>>(path: P) -> Result<Vec<Candle>> {
    let file = File::open(path)?;
    candles_from_json(BufReader::new(file))
}

#[cfg(test)]
const KLINES_CSV: &str = "\
Open time,Open,High,Low,Close,Volume,Close time,Quote asset volume,Number of trades,Taker buy volume,Taker buy quote asset volume
2021-03-01 0:00:00,45134.11,45550.0,44950.1,45500.99,1234.5,2021-03-01 0:59:59,55000000.0,100,600.0,27000000.0
2021-03-01 1:00:00,45500.99,46000.0,45400.0,45900.0,2345.6,2021-03-01 1:59:59,56000000.0,110,700.0,28000000.0
";

#[cfg(test)]
#[test]
fn csv_loads_klines() {
    let candles = candles_from_csv(KLINES_CSV.as_bytes()).unwrap();
    assert_eq!(candles.len(), 2);

    let first = &candles[0];
    assert_eq!(first.open(), 45134.11);
    assert_eq!(first.high(), 45550.0);
    assert_eq!(first.low(), 44950.1);
    assert_eq!(first.close(), 45500.99);
    assert_eq!(first.volume(), 1234.5);
    assert_eq!(first.bid(), 27000000.0);
    // Unpadded hour parses too
    assert_eq!(first.open_time().timestamp(), 1614556800);
    assert_eq!(candles[1].open_time().timestamp(), 1614560400);
}

#[cfg(test)]
#[test]
fn csv_columns_found_by_name_not_position() {
    let reordered = "\
Close,Open time,Close time,Low,High,Open,Volume
45500.99,2021-03-01 13:00:00,2021-03-01 13:59:59,44950.1,45550.0,45134.11,1234.5
";
    let candles = candles_from_csv(reordered.as_bytes()).unwrap();
    assert_eq!(candles.len(), 1);
    assert_eq!(candles[0].open(), 45134.11);
    assert_eq!(candles[0].close(), 45500.99);
    // No taker column: bid volume defaults to zero
    assert_eq!(candles[0].bid(), 0.0);
}

#[cfg(test)]
#[test]
fn csv_missing_column_is_an_error() {
    let headless = "\
Open time,Open,High,Low,Close,Close time
2021-03-01 0:00:00,45134.11,45550.0,44950.1,45500.99,2021-03-01 0:59:59
";
    let result = candles_from_csv(headless.as_bytes());
    assert!(matches!(result, Err(Error::CsvColumn(name)) if name == "Volume"));
}

#[cfg(test)]
#[test]
fn csv_bad_cell_is_an_error() {
    let garbled = "\
Open time,Open,High,Low,Close,Volume,Close time
2021-03-01 0:00:00,oops,45550.0,44950.1,45500.99,1234.5,2021-03-01 0:59:59
";
    let result = candles_from_csv(garbled.as_bytes());
    assert!(matches!(result, Err(Error::CsvValue(column, _)) if column == "Open"));
}

#[cfg(all(test, feature = "serde"))]
#[test]
fn json_accepts_exported_field_names() {
    let raw = r#"[{
        "open_time": 1614556800000,
        "open_price": 45134.11,
        "high_price": 45550.0,
        "low_price": 44950.1,
        "close_price": 45500.99,
        "volume": 1234.5,
        "close_time": 1614560399999,
        "quote_asset_volume": 55000000.0,
        "number_of_trades": 100,
        "taker_buy_quote_volume": 27000000.0
    }]"#;
    let candles = candles_from_json(raw.as_bytes()).unwrap();
    assert_eq!(candles.len(), 1);
    assert_eq!(candles[0].open(), 45134.11);
    assert_eq!(candles[0].bid(), 27000000.0);
    assert_eq!(candles[0].open_time().timestamp(), 1614556800);
}
