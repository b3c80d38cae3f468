use crate::engine::{Candle, Instruction, OrderKind, Position, PositionSide, Wallet};
use crate::errors::{Error, Result};

/// Applies instructions to the wallet: computes slippage-adjusted fill
/// prices, moves the ledger, and produces the realized return rates on
/// close. Holds the run-level execution parameters.
#[derive(Debug, Clone, Copy)]
pub struct Broker {
    // Fraction of traded notional charged on every fill
    commission: f64,
    // Run-level multiplier applied to sizing and returns
    leverage: f64,
    // Slippage divisor applied to the candle's open-to-close change
    change_size: f64,
}

impl Broker {
    pub(crate) fn new(commission: f64, leverage: f64, change_size: f64) -> Self {
        Self {
            commission,
            leverage,
            change_size,
        }
    }

    /// Returns the commission rate.
    pub fn commission(&self) -> f64 {
        self.commission
    }

    /// Returns the leverage multiplier.
    pub fn leverage(&self) -> f64 {
        self.leverage
    }

    /// Computes the fill price for an instruction within the given candle.
    ///
    /// The slippage rate is the candle's open-to-close change divided by
    /// `change_size`. Buying pressure kinds (open long, close short) fill at
    /// or above the reference price; the other kinds fill at or below it.
    /// Slippage is never favorable to the trader.
    pub fn fill_price(&self, instruction: &Instruction, candle: &Candle) -> Result<f64> {
        let price = instruction.price();
        if !price.is_finite() || price <= 0.0 {
            return Err(Error::InstructionPrice(price));
        }

        let rate = ((candle.close() - candle.open()) / candle.open()) / self.change_size;
        let fill = match instruction.kind() {
            OrderKind::OpenLong | OrderKind::CloseShort => (price + price * rate).max(price),
            OrderKind::OpenShort | OrderKind::CloseLong => (price - price * rate).min(price),
        };
        Ok(fill)
    }

    /// Opens a position: validates the kind and applies the fill to the
    /// wallet. The quantity is the full leveraged quantity.
    pub(crate) fn open(
        &self,
        wallet: &mut Wallet,
        kind: OrderKind,
        quantity: f64,
        fill_price: f64,
    ) -> Result<Position> {
        if !kind.is_open() {
            return Err(Error::EntryInstruction(kind));
        }
        wallet
            .apply(kind, quantity, fill_price, self.commission, self.leverage)
            .ok_or_else(|| Error::Unreachable(format!("{kind} produced no position")))
    }

    /// Closes the open position: validates that the kind matches the
    /// position's side, applies the fill to the wallet with the position's
    /// own quantity, and returns the realized return rates
    /// `(raw, commission-adjusted)`.
    pub(crate) fn close(
        &self,
        wallet: &mut Wallet,
        position: &Position,
        kind: OrderKind,
        fill_price: f64,
    ) -> Result<(f64, f64)> {
        if kind != position.side().closing_kind() {
            return Err(Error::ExitInstruction(kind, position.side()));
        }
        let rate = self.return_rate(position, fill_price);
        let rate_with_commission = self.return_rate_with_commission(position, fill_price);
        wallet.apply(
            kind,
            position.quantity(),
            fill_price,
            self.commission,
            self.leverage,
        );
        Ok((rate, rate_with_commission))
    }

    /// Raw return rate of a position realized at the given price, scaled
    /// by leverage.
    pub fn return_rate(&self, position: &Position, close_price: f64) -> f64 {
        let entry = position.entry_price();
        let rate = match position.side() {
            PositionSide::Long => (close_price - entry) / entry,
            PositionSide::Short => (entry - close_price) / entry,
        };
        rate * self.leverage
    }

    /// Return rate net of the entry and exit commissions, scaled by
    /// leverage.
    pub fn return_rate_with_commission(&self, position: &Position, close_price: f64) -> f64 {
        let entry = position.entry_price();
        let commission = entry * self.commission + close_price * self.commission;
        let rate = match position.side() {
            PositionSide::Long => (close_price - entry - commission) / entry,
            PositionSide::Short => (entry - close_price - commission) / entry,
        };
        rate * self.leverage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::CandleBuilder;
    use chrono::DateTime;

    fn make_candle(open: f64, close: f64) -> Candle {
        let (high, low) = (open.max(close) + 1.0, open.min(close) - 1.0);
        CandleBuilder::builder()
            .open(open)
            .high(high)
            .low(low)
            .close(close)
            .volume(1000.0)
            .open_time(DateTime::from_timestamp_secs(1515151515).unwrap())
            .close_time(DateTime::from_timestamp_secs(1515151515 + 3599).unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn fill_price_rising_candle() {
        let broker = Broker::new(0.0, 1.0, 2.0);
        // +10% open to close, divided by 2: a 5% slippage rate
        let candle = make_candle(100.0, 110.0);

        let buy = Instruction::from((OrderKind::OpenLong, 100.0));
        assert_eq!(broker.fill_price(&buy, &candle).unwrap(), 105.0);

        let cover = Instruction::from((OrderKind::CloseShort, 100.0));
        assert_eq!(broker.fill_price(&cover, &candle).unwrap(), 105.0);

        let sell = Instruction::from((OrderKind::OpenShort, 100.0));
        assert_eq!(broker.fill_price(&sell, &candle).unwrap(), 95.0);

        let close = Instruction::from((OrderKind::CloseLong, 100.0));
        assert_eq!(broker.fill_price(&close, &candle).unwrap(), 95.0);
    }

    #[test]
    fn fill_price_falling_candle_clamps_to_reference() {
        let broker = Broker::new(0.0, 1.0, 2.0);
        let candle = make_candle(100.0, 90.0);

        // Negative rate would improve the buy fill; the reference wins
        let buy = Instruction::from((OrderKind::OpenLong, 100.0));
        assert_eq!(broker.fill_price(&buy, &candle).unwrap(), 100.0);

        let cover = Instruction::from((OrderKind::CloseShort, 100.0));
        assert_eq!(broker.fill_price(&cover, &candle).unwrap(), 100.0);

        // And would improve the sell fill just the same
        let sell = Instruction::from((OrderKind::OpenShort, 100.0));
        assert_eq!(broker.fill_price(&sell, &candle).unwrap(), 100.0);

        let close = Instruction::from((OrderKind::CloseLong, 100.0));
        assert_eq!(broker.fill_price(&close, &candle).unwrap(), 100.0);
    }

    #[test]
    fn fill_price_never_favorable() {
        let broker = Broker::new(0.0, 1.0, 2.0);
        for (open, close) in [(100.0, 110.0), (100.0, 90.0), (100.0, 100.0)] {
            let candle = make_candle(open, close);
            for kind in [OrderKind::OpenLong, OrderKind::CloseShort] {
                let fill = broker
                    .fill_price(&Instruction::from((kind, 100.0)), &candle)
                    .unwrap();
                assert!(fill >= 100.0);
            }
            for kind in [OrderKind::OpenShort, OrderKind::CloseLong] {
                let fill = broker
                    .fill_price(&Instruction::from((kind, 100.0)), &candle)
                    .unwrap();
                assert!(fill <= 100.0);
            }
        }
    }

    #[test]
    fn fill_price_uses_change_size() {
        let candle = make_candle(100.0, 110.0);
        let buy = Instruction::from((OrderKind::OpenLong, 100.0));

        let broker = Broker::new(0.0, 1.0, 4.0);
        assert_eq!(broker.fill_price(&buy, &candle).unwrap(), 102.5);
    }

    #[test]
    fn fill_price_rejects_bad_reference() {
        let broker = Broker::new(0.0, 1.0, 2.0);
        let candle = make_candle(100.0, 110.0);

        for price in [0.0, -10.0, f64::NAN, f64::INFINITY] {
            let result = broker.fill_price(&Instruction::from((OrderKind::OpenLong, price)), &candle);
            assert!(matches!(result, Err(Error::InstructionPrice(_))));
        }
    }

    #[test]
    fn return_rates_long() {
        let broker = Broker::new(0.0, 1.0, 2.0);
        let position = Position::from((PositionSide::Long, 100.0, 1.0));

        assert_eq!(broker.return_rate(&position, 110.0), 0.1);
        assert_eq!(broker.return_rate(&position, 90.0), -0.1);
    }

    #[test]
    fn return_rates_short() {
        let broker = Broker::new(0.0, 1.0, 2.0);
        let position = Position::from((PositionSide::Short, 100.0, 1.0));

        assert_eq!(broker.return_rate(&position, 90.0), 0.1);
        assert_eq!(broker.return_rate(&position, 110.0), -0.1);
    }

    #[test]
    fn return_rates_scaled_by_leverage() {
        let broker = Broker::new(0.0, 4.0, 2.0);
        let position = Position::from((PositionSide::Long, 100.0, 1.0));

        assert_eq!(broker.return_rate(&position, 110.0), 0.4);
        assert_eq!(broker.return_rate(&position, 90.0), -0.4);
    }

    #[test]
    fn commission_reduces_return() {
        let broker = Broker::new(0.001, 1.0, 2.0);
        let long = Position::from((PositionSide::Long, 100.0, 1.0));
        let short = Position::from((PositionSide::Short, 100.0, 1.0));

        for price in [80.0, 100.0, 120.0] {
            assert!(
                broker.return_rate_with_commission(&long, price) < broker.return_rate(&long, price)
            );
            assert!(
                broker.return_rate_with_commission(&short, price)
                    < broker.return_rate(&short, price)
            );
        }
    }

    #[test]
    fn open_rejects_close_kinds() {
        let broker = Broker::new(0.0, 1.0, 2.0);
        let mut wallet = Wallet::new(10000.0).unwrap();

        let result = broker.open(&mut wallet, OrderKind::CloseLong, 1.0, 100.0);
        assert!(matches!(result, Err(Error::EntryInstruction(OrderKind::CloseLong))));
        assert_eq!(wallet.cash(), 10000.0);
    }

    #[test]
    fn close_rejects_mismatched_side() {
        let broker = Broker::new(0.0, 1.0, 2.0);
        let mut wallet = Wallet::new(10000.0).unwrap();
        let position = broker.open(&mut wallet, OrderKind::OpenLong, 1.0, 100.0).unwrap();

        let result = broker.close(&mut wallet, &position, OrderKind::CloseShort, 110.0);
        assert!(matches!(
            result,
            Err(Error::ExitInstruction(OrderKind::CloseShort, PositionSide::Long))
        ));
        // Ledger untouched by the rejected close
        assert_eq!(wallet.cash(), 9900.0);
        assert_eq!(wallet.base(), 1.0);
    }

    #[test]
    fn open_then_close_realizes_return() {
        let broker = Broker::new(0.0, 1.0, 2.0);
        let mut wallet = Wallet::new(10000.0).unwrap();

        let position = broker.open(&mut wallet, OrderKind::OpenLong, 1.0, 100.0).unwrap();
        let (rate, rate_with_commission) = broker
            .close(&mut wallet, &position, OrderKind::CloseLong, 110.0)
            .unwrap();

        assert_eq!(rate, 0.1);
        assert_eq!(rate_with_commission, 0.1);
        assert_eq!(wallet.cash(), 10010.0);
    }
}
