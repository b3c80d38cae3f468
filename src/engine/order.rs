use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::engine::PositionSide;

/// The four order kinds a strategy can emit.
///
/// The enum is closed on purpose: every consumer matches it exhaustively,
/// so adding a kind is a compile-time-checked change.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderKind {
    OpenLong,
    OpenShort,
    CloseLong,
    CloseShort,
}

impl OrderKind {
    /// Returns `true` for the kinds that open a position.
    pub fn is_open(&self) -> bool {
        match self {
            Self::OpenLong | Self::OpenShort => true,
            Self::CloseLong | Self::CloseShort => false,
        }
    }

    /// Returns the position side this kind concerns.
    pub fn side(&self) -> PositionSide {
        match self {
            Self::OpenLong | Self::CloseLong => PositionSide::Long,
            Self::OpenShort | Self::CloseShort => PositionSide::Short,
        }
    }
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::OpenLong => "open_long",
            Self::OpenShort => "open_short",
            Self::CloseLong => "close_long",
            Self::CloseShort => "close_short",
        };
        write!(f, "{kind}")
    }
}

/// A broker instruction: an order kind and the reference price it should
/// execute around. Produced by a strategy, consumed by the broker within
/// the same step.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Instruction {
    kind: OrderKind,
    price: f64,
}

impl From<(OrderKind, f64)> for Instruction {
    fn from((kind, price): (OrderKind, f64)) -> Self {
        Self { kind, price }
    }
}

impl Instruction {
    /// Returns the order kind.
    pub fn kind(&self) -> OrderKind {
        self.kind
    }

    /// Returns the reference price.
    pub fn price(&self) -> f64 {
        self.price
    }
}

#[cfg(test)]
#[test]
fn open_kinds() {
    assert!(OrderKind::OpenLong.is_open());
    assert!(OrderKind::OpenShort.is_open());
    assert!(!OrderKind::CloseLong.is_open());
    assert!(!OrderKind::CloseShort.is_open());
}

#[cfg(test)]
#[test]
fn kind_sides() {
    assert_eq!(OrderKind::OpenLong.side(), PositionSide::Long);
    assert_eq!(OrderKind::CloseLong.side(), PositionSide::Long);
    assert_eq!(OrderKind::OpenShort.side(), PositionSide::Short);
    assert_eq!(OrderKind::CloseShort.side(), PositionSide::Short);
}

#[cfg(test)]
#[test]
fn kind_display() {
    assert_eq!(OrderKind::OpenLong.to_string(), "open_long");
    assert_eq!(OrderKind::CloseShort.to_string(), "close_short");
}

#[cfg(test)]
#[test]
fn create_instruction() {
    let instruction: Instruction = (OrderKind::OpenLong, 100.0).into();
    assert_eq!(instruction.kind(), OrderKind::OpenLong);
    assert_eq!(instruction.price(), 100.0);
}
