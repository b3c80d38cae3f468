pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The candle data provided is empty. Backtesting requires at least one candle.
    #[error("Candle data is empty: backtesting requires at least one candle")]
    CandleDataEmpty,

    /// The candle data is not in chronological order at the given index.
    #[error("Candle data is not chronological at index {0}")]
    UnorderedCandles(usize),

    /// A required candle field was not set on the builder.
    #[error("Candle field `{0}` is missing")]
    CandleField(&'static str),

    /// The candle's prices do not satisfy low <= open, close <= high.
    /// Payload: (open, high, low, close)
    #[error("Candle bounds violated (open: {0}, high: {1}, low: {2}, close: {3})")]
    CandleBounds(f64, f64, f64, f64),

    /// The initial or current balance is not positive. Trading requires a positive balance.
    #[error("Balance must be positive (got: {0})")]
    NegZeroBalance(f64),

    /// The leverage multiplier is below 1. Loan accounts would go negative.
    #[error("Leverage must be at least 1 (got: {0})")]
    Leverage(f64),

    /// The commission rate is not a fraction in [0, 1).
    #[error("Commission rate must be a fraction in [0, 1) (got: {0})")]
    CommissionRate(f64),

    /// The buy percentage is not a fraction in (0, 1].
    #[error("Buy percentage must be a fraction in (0, 1] (got: {0})")]
    BuyPercentage(f64),

    /// The slippage divisor is not positive.
    #[error("Change size must be positive (got: {0})")]
    ChangeSize(f64),

    /// The window size does not fit the candle data.
    /// Payload: (window_size, candles available)
    #[error("Window size must be at least 1 and below the candle count (window: {0}, candles: {1})")]
    WindowSize(usize, usize),

    /// A probability handed to a strategy is outside [0, 1].
    #[error("Probability must be within [0, 1] (got: {0})")]
    Probability(f64),

    /// Mark-to-market equity dropped to or below zero within a candle.
    /// Fatal: the run is aborted. Payload: (equity, candle open time)
    #[error("Out of money: equity {0:.2} at {1}")]
    OutOfMoney(f64, chrono::DateTime<chrono::Utc>),

    /// An instruction's reference price is not a positive finite number.
    #[error("Instruction price must be positive and finite (got: {0})")]
    InstructionPrice(f64),

    /// A strategy emitted a non-open instruction while flat.
    #[error("Expected an open instruction to enter a position (got: {0})")]
    EntryInstruction(crate::engine::OrderKind),

    /// A strategy emitted an instruction that does not close the open position.
    #[error("Instruction {0} does not close a {1} position")]
    ExitInstruction(crate::engine::OrderKind, crate::engine::PositionSide),

    /// A CSV column required for candle loading is absent.
    #[error("CSV column `{0}` is missing")]
    CsvColumn(String),

    /// A CSV cell could not be parsed for the named column.
    /// Payload: (column, raw value)
    #[error("CSV column `{0}` holds an unparsable value: `{1}`")]
    CsvValue(String, String),

    /// A general error with a message, for strategy and user code.
    #[error("{0}")]
    Msg(String),

    /// An unreachable context was encountered. This is likely a bug.
    #[error("Unreachable context (internal error): {0}")]
    Unreachable(String),

    /// I/O error occurred.
    // utils.rs
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV serialization/deserialization error occurred.
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// JSON serialization/deserialization error occurred.
    #[cfg(feature = "serde")]
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The report holds no rows, so there is nothing to summarize.
    #[cfg(feature = "metrics")]
    #[error("The report is empty: nothing to summarize")]
    EmptyReport,

    /// Chart rendering error occurred.
    #[cfg(feature = "draws")]
    #[error("Plotters error: {0}")]
    Plotters(String),
}
