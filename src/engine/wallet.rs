#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::engine::{OrderKind, Position, PositionSide};
use crate::errors::{Error, Result};

/// The margin ledger: quote-currency cash, base-asset holdings and the two
/// synthetic loan accounts that model leveraged exposure.
///
/// At most one position is open at a time, so `loaned_cash` (margin longs)
/// and `loaned_base` (margin shorts) are never nonzero together.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug)]
pub struct Wallet {
    // Initial cash used for reset
    initial_cash: f64,
    // Quote currency available
    cash: f64,
    // Base asset held (negative while short)
    base: f64,
    // Quote currency borrowed for margin longs
    loaned_cash: f64,
    // Base asset borrowed for margin shorts
    loaned_base: f64,
    // Cumulative commission paid
    fees: f64,
}

impl Wallet {
    /// Creates a new wallet holding the given cash.
    /// Negative or zero balances are rejected.
    pub fn new(cash: f64) -> Result<Self> {
        if cash <= 0.0 {
            return Err(Error::NegZeroBalance(cash));
        }

        Ok(Self {
            cash,
            base: 0.0,
            loaned_cash: 0.0,
            loaned_base: 0.0,
            fees: 0.0,
            initial_cash: cash,
        })
    }

    /// Returns the quote-currency cash.
    pub fn cash(&self) -> f64 {
        self.cash
    }

    /// Returns the base-asset quantity held.
    pub fn base(&self) -> f64 {
        self.base
    }

    /// Returns the quote currency currently borrowed.
    pub fn loaned_cash(&self) -> f64 {
        self.loaned_cash
    }

    /// Returns the base asset currently borrowed.
    pub fn loaned_base(&self) -> f64 {
        self.loaned_base
    }

    /// Returns the fees paid to the market.
    pub fn fees_paid(&self) -> f64 {
        self.fees
    }

    /// Mark-to-market equity at the given price: cash plus holdings valued
    /// at the price, minus both loan accounts.
    pub fn equity(&self, price: f64) -> f64 {
        self.cash + self.base * price - self.loaned_cash - self.loaned_base * price
    }

    /// Applies one fill to the ledger. Commission is deducted from cash
    /// first, then the ledger moves per order kind. Open kinds return the
    /// position created; close kinds return `None`.
    ///
    /// Solvency is not checked here; the run loop marks to market at every
    /// candle's high and low.
    pub(crate) fn apply(
        &mut self,
        kind: OrderKind,
        quantity: f64,
        price: f64,
        commission_rate: f64,
        leverage: f64,
    ) -> Option<Position> {
        let commission = quantity * price * commission_rate;
        self.cash -= commission;
        self.fees += commission;

        // Own funds engaged; the rest of the notional is loaned
        let margin_quantity = quantity / leverage;
        match kind {
            OrderKind::OpenLong => {
                self.cash -= margin_quantity * price;
                self.base += quantity;
                self.loaned_cash += (quantity - margin_quantity) * price;
                Some(Position::from((PositionSide::Long, price, quantity)))
            }
            OrderKind::OpenShort => {
                self.cash += quantity * price;
                self.base -= margin_quantity;
                self.loaned_base += quantity - margin_quantity;
                Some(Position::from((PositionSide::Short, price, quantity)))
            }
            OrderKind::CloseLong => {
                self.cash += quantity * price - self.loaned_cash;
                self.base -= quantity;
                self.loaned_cash = 0.0;
                None
            }
            OrderKind::CloseShort => {
                self.cash -= quantity * price;
                self.base += margin_quantity;
                self.loaned_base = 0.0;
                None
            }
        }
    }

    /// Resets the wallet to its initial cash.
    pub(crate) fn reset(&mut self) {
        self.cash = self.initial_cash;
        self.base = 0.0;
        self.loaned_cash = 0.0;
        self.loaned_base = 0.0;
        self.fees = 0.0;
    }
}

#[cfg(test)]
#[test]
fn new_wallet_valid_balance() {
    let wallet = Wallet::new(10000.0).unwrap();
    assert_eq!(wallet.cash(), 10000.0);
    assert_eq!(wallet.base(), 0.0);
    assert_eq!(wallet.loaned_cash(), 0.0);
    assert_eq!(wallet.loaned_base(), 0.0);
    assert_eq!(wallet.equity(123.0), 10000.0);
}

#[cfg(test)]
#[test]
fn new_wallet_invalid_balance() {
    let result = Wallet::new(0.0);
    assert!(matches!(result, Err(Error::NegZeroBalance(_))));

    let result = Wallet::new(-10.0);
    assert!(matches!(result, Err(Error::NegZeroBalance(_))));
}

#[cfg(test)]
#[test]
fn open_long_without_leverage() {
    let mut wallet = Wallet::new(10000.0).unwrap();
    let position = wallet.apply(OrderKind::OpenLong, 1.0, 100.0, 0.0, 1.0);

    assert_eq!(wallet.cash(), 9900.0);
    assert_eq!(wallet.base(), 1.0);
    assert_eq!(wallet.loaned_cash(), 0.0);
    assert_eq!(wallet.loaned_base(), 0.0);

    let position = position.unwrap();
    assert_eq!(position.side(), PositionSide::Long);
    assert_eq!(position.entry_price(), 100.0);
    assert_eq!(position.quantity(), 1.0);
}

#[cfg(test)]
#[test]
fn close_long_without_leverage() {
    let mut wallet = Wallet::new(10000.0).unwrap();
    wallet.apply(OrderKind::OpenLong, 1.0, 100.0, 0.0, 1.0);
    let position = wallet.apply(OrderKind::CloseLong, 1.0, 110.0, 0.0, 1.0);

    assert!(position.is_none());
    assert_eq!(wallet.cash(), 10010.0);
    assert_eq!(wallet.base(), 0.0);
    assert_eq!(wallet.loaned_cash(), 0.0);
}

#[cfg(test)]
#[test]
fn open_long_with_leverage() {
    let mut wallet = Wallet::new(10000.0).unwrap();
    wallet.apply(OrderKind::OpenLong, 1.0, 100.0, 0.0, 2.0);

    // Half the notional on margin, half loaned
    assert_eq!(wallet.cash(), 9950.0);
    assert_eq!(wallet.base(), 1.0);
    assert_eq!(wallet.loaned_cash(), 50.0);
    assert_eq!(wallet.equity(100.0), 10000.0);
}

#[cfg(test)]
#[test]
fn close_long_repays_loan() {
    let mut wallet = Wallet::new(10000.0).unwrap();
    wallet.apply(OrderKind::OpenLong, 1.0, 100.0, 0.0, 2.0);
    wallet.apply(OrderKind::CloseLong, 1.0, 110.0, 0.0, 2.0);

    assert_eq!(wallet.cash(), 10010.0);
    assert_eq!(wallet.base(), 0.0);
    assert_eq!(wallet.loaned_cash(), 0.0);
}

#[cfg(test)]
#[test]
fn open_short_with_leverage() {
    let mut wallet = Wallet::new(10000.0).unwrap();
    let position = wallet.apply(OrderKind::OpenShort, 1.0, 100.0, 0.0, 2.0);

    assert_eq!(wallet.cash(), 10100.0);
    assert_eq!(wallet.base(), -0.5);
    assert_eq!(wallet.loaned_base(), 0.5);
    assert_eq!(wallet.loaned_cash(), 0.0);
    assert_eq!(wallet.equity(100.0), 10000.0);

    let position = position.unwrap();
    assert_eq!(position.side(), PositionSide::Short);
}

#[cfg(test)]
#[test]
fn close_short_returns_base() {
    let mut wallet = Wallet::new(10000.0).unwrap();
    wallet.apply(OrderKind::OpenShort, 1.0, 100.0, 0.0, 2.0);
    wallet.apply(OrderKind::CloseShort, 1.0, 90.0, 0.0, 2.0);

    assert_eq!(wallet.cash(), 10010.0);
    assert_eq!(wallet.base(), 0.0);
    assert_eq!(wallet.loaned_base(), 0.0);
}

#[cfg(test)]
#[test]
fn round_trip_restores_cash() {
    // Same fill price in and out, zero commission: cash must come back exact
    let mut wallet = Wallet::new(10000.0).unwrap();
    wallet.apply(OrderKind::OpenLong, 3.0, 97.0, 0.0, 4.0);
    wallet.apply(OrderKind::CloseLong, 3.0, 97.0, 0.0, 4.0);
    assert_eq!(wallet.cash(), 10000.0);
    assert_eq!(wallet.base(), 0.0);

    wallet.apply(OrderKind::OpenShort, 3.0, 97.0, 0.0, 4.0);
    wallet.apply(OrderKind::CloseShort, 3.0, 97.0, 0.0, 4.0);
    assert_eq!(wallet.cash(), 10000.0);
    assert_eq!(wallet.base(), 0.0);
}

#[cfg(test)]
#[test]
fn commission_deducted_first() {
    let mut wallet = Wallet::new(10000.0).unwrap();
    wallet.apply(OrderKind::OpenLong, 1.0, 100.0, 0.001, 1.0);

    let commission = 1.0 * 100.0 * 0.001;
    assert_eq!(wallet.cash(), 10000.0 - commission - 100.0);
    assert_eq!(wallet.fees_paid(), commission);

    wallet.apply(OrderKind::CloseLong, 1.0, 100.0, 0.001, 1.0);
    assert_eq!(wallet.fees_paid(), 2.0 * commission);
}

#[cfg(test)]
#[test]
fn loans_are_mutually_exclusive() {
    let mut wallet = Wallet::new(10000.0).unwrap();

    wallet.apply(OrderKind::OpenLong, 1.0, 100.0, 0.0, 4.0);
    assert!(wallet.loaned_cash() > 0.0);
    assert_eq!(wallet.loaned_base(), 0.0);

    wallet.apply(OrderKind::CloseLong, 1.0, 100.0, 0.0, 4.0);
    wallet.apply(OrderKind::OpenShort, 1.0, 100.0, 0.0, 4.0);
    assert_eq!(wallet.loaned_cash(), 0.0);
    assert!(wallet.loaned_base() > 0.0);
}

#[cfg(test)]
#[test]
fn equity_values_holdings() {
    let mut wallet = Wallet::new(10000.0).unwrap();
    wallet.apply(OrderKind::OpenLong, 1.0, 100.0, 0.0, 2.0);

    assert_eq!(wallet.equity(100.0), 10000.0);
    assert_eq!(wallet.equity(90.0), 9990.0);
    assert_eq!(wallet.equity(110.0), 10010.0);
}

#[cfg(test)]
#[test]
fn reset_wallet() {
    let mut wallet = Wallet::new(10000.0).unwrap();
    wallet.apply(OrderKind::OpenShort, 2.0, 100.0, 0.001, 2.0);

    wallet.reset();
    assert_eq!(wallet.cash(), 10000.0);
    assert_eq!(wallet.base(), 0.0);
    assert_eq!(wallet.loaned_cash(), 0.0);
    assert_eq!(wallet.loaned_base(), 0.0);
    assert_eq!(wallet.fees_paid(), 0.0);
}
