use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::engine::OrderKind;

/// The side of an open position.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionSide {
    Long,
    Short,
}

impl PositionSide {
    /// Returns the order kind that closes a position on this side.
    pub fn closing_kind(&self) -> OrderKind {
        match self {
            Self::Long => OrderKind::CloseLong,
            Self::Short => OrderKind::CloseShort,
        }
    }
}

impl fmt::Display for PositionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = match self {
            Self::Long => "long",
            Self::Short => "short",
        };
        write!(f, "{side}")
    }
}

/// An open position. At most one exists per run.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    side: PositionSide,
    entry_price: f64,
    quantity: f64,
}

impl Position {
    /// Returns the position side.
    pub fn side(&self) -> PositionSide {
        self.side
    }

    /// Returns the quantity of base asset held or owed.
    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    /// Returns the fill price the position was opened at.
    pub fn entry_price(&self) -> f64 {
        self.entry_price
    }
}

impl From<(PositionSide, f64, f64)> for Position {
    fn from((side, entry_price, quantity): (PositionSide, f64, f64)) -> Self {
        Self {
            side,
            entry_price,
            quantity,
        }
    }
}

#[cfg(test)]
#[test]
fn create_position() {
    let position: Position = (PositionSide::Long, 100.0, 2.0).into();
    assert_eq!(position.side(), PositionSide::Long);
    assert_eq!(position.entry_price(), 100.0);
    assert_eq!(position.quantity(), 2.0);
}

#[cfg(test)]
#[test]
fn closing_kinds() {
    assert_eq!(PositionSide::Long.closing_kind(), OrderKind::CloseLong);
    assert_eq!(PositionSide::Short.closing_kind(), OrderKind::CloseShort);
}
