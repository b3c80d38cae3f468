use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::engine::{Candle, Instruction, OrderKind, Position};
use crate::errors::{Error, Result};

/// A trading policy driven by the run loop.
///
/// The engine calls exactly one of the two methods per step: while flat it
/// asks [`enter_position`](Strategy::enter_position), while holding a
/// position it asks [`exit_position`](Strategy::exit_position). The window
/// is the trailing slice of candles ending just before the current one;
/// strategies may keep internal state but must not rely on anything beyond
/// the window and the position handed to them.
pub trait Strategy {
    /// Decides whether to open a position. Returning `None` stays flat.
    /// The instruction must carry an open kind.
    fn enter_position(&mut self, window: &[Candle]) -> Result<Option<Instruction>>;

    /// Decides whether to close the open position. Returning `None` keeps
    /// it. The instruction must carry the close kind matching the
    /// position's side.
    fn exit_position(
        &mut self,
        window: &[Candle],
        position: &Position,
    ) -> Result<Option<Instruction>>;
}

/// Enters long or short at random and exits at random. A baseline to
/// compare real strategies against.
#[derive(Debug)]
pub struct RandomStrategy {
    buy_probability: f64,
    sell_probability: f64,
    rng: StdRng,
}

impl RandomStrategy {
    /// Creates a random strategy seeded from the operating system.
    /// Probabilities outside `[0, 1]` are rejected.
    pub fn new(buy_probability: f64, sell_probability: f64) -> Result<Self> {
        Self::with_rng(buy_probability, sell_probability, StdRng::from_os_rng())
    }

    /// Creates a random strategy with a fixed seed, for reproducible runs.
    pub fn with_seed(buy_probability: f64, sell_probability: f64, seed: u64) -> Result<Self> {
        Self::with_rng(
            buy_probability,
            sell_probability,
            StdRng::seed_from_u64(seed),
        )
    }

    fn with_rng(buy_probability: f64, sell_probability: f64, rng: StdRng) -> Result<Self> {
        for probability in [buy_probability, sell_probability] {
            if !(0.0..=1.0).contains(&probability) {
                return Err(Error::Probability(probability));
            }
        }
        Ok(Self {
            buy_probability,
            sell_probability,
            rng,
        })
    }
}

impl Default for RandomStrategy {
    fn default() -> Self {
        Self {
            buy_probability: 0.1,
            sell_probability: 0.005,
            rng: StdRng::from_os_rng(),
        }
    }
}

impl Strategy for RandomStrategy {
    fn enter_position(&mut self, window: &[Candle]) -> Result<Option<Instruction>> {
        let Some(last) = window.last() else {
            return Ok(None);
        };
        if !self.rng.random_bool(self.buy_probability) {
            return Ok(None);
        }
        let kind = if self.rng.random_bool(0.5) {
            OrderKind::OpenLong
        } else {
            OrderKind::OpenShort
        };
        Ok(Some(Instruction::from((kind, last.close()))))
    }

    fn exit_position(
        &mut self,
        window: &[Candle],
        position: &Position,
    ) -> Result<Option<Instruction>> {
        let Some(last) = window.last() else {
            return Ok(None);
        };
        if !self.rng.random_bool(self.sell_probability) {
            return Ok(None);
        }
        let kind = position.side().closing_kind();
        Ok(Some(Instruction::from((kind, last.close()))))
    }
}

/// Opens a long on the first opportunity and never exits; the forced close
/// at the end of the series realizes the return.
#[derive(Debug, Default)]
pub struct BuyAndHold;

impl Strategy for BuyAndHold {
    fn enter_position(&mut self, window: &[Candle]) -> Result<Option<Instruction>> {
        let Some(last) = window.last() else {
            return Ok(None);
        };
        Ok(Some(Instruction::from((OrderKind::OpenLong, last.close()))))
    }

    fn exit_position(
        &mut self,
        _window: &[Candle],
        _position: &Position,
    ) -> Result<Option<Instruction>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{CandleBuilder, PositionSide};
    use chrono::DateTime;

    fn make_window() -> Vec<Candle> {
        (0..3)
            .map(|i: i64| {
                CandleBuilder::builder()
                    .open(100.0 + i as f64)
                    .high(105.0 + i as f64)
                    .low(95.0 + i as f64)
                    .close(101.0 + i as f64)
                    .volume(1000.0)
                    .open_time(DateTime::from_timestamp_secs(1515151515 + i * 3600).unwrap())
                    .close_time(DateTime::from_timestamp_secs(1515151515 + (i + 1) * 3600).unwrap())
                    .build()
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn probabilities_validated() {
        assert!(matches!(
            RandomStrategy::new(1.5, 0.1),
            Err(Error::Probability(_))
        ));
        assert!(matches!(
            RandomStrategy::new(0.1, -0.2),
            Err(Error::Probability(_))
        ));
        assert!(RandomStrategy::new(0.0, 1.0).is_ok());
    }

    #[test]
    fn random_strategy_enters_and_exits_at_last_close() {
        let window = make_window();
        let mut strategy = RandomStrategy::with_seed(1.0, 1.0, 7).unwrap();

        let instruction = strategy.enter_position(&window).unwrap().unwrap();
        assert!(instruction.kind().is_open());
        assert_eq!(instruction.price(), 103.0);

        let position = Position::from((PositionSide::Long, 100.0, 1.0));
        let instruction = strategy.exit_position(&window, &position).unwrap().unwrap();
        assert_eq!(instruction.kind(), OrderKind::CloseLong);
        assert_eq!(instruction.price(), 103.0);

        let position = Position::from((PositionSide::Short, 100.0, 1.0));
        let instruction = strategy.exit_position(&window, &position).unwrap().unwrap();
        assert_eq!(instruction.kind(), OrderKind::CloseShort);
    }

    #[test]
    fn random_strategy_declines() {
        let window = make_window();
        let mut strategy = RandomStrategy::with_seed(0.0, 0.0, 7).unwrap();

        assert!(strategy.enter_position(&window).unwrap().is_none());
        let position = Position::from((PositionSide::Long, 100.0, 1.0));
        assert!(strategy.exit_position(&window, &position).unwrap().is_none());
    }

    #[test]
    fn seeded_runs_are_identical() {
        let window = make_window();
        let mut left = RandomStrategy::with_seed(0.5, 0.5, 42).unwrap();
        let mut right = RandomStrategy::with_seed(0.5, 0.5, 42).unwrap();

        for _ in 0..50 {
            let a = left.enter_position(&window).unwrap().map(|i| i.kind());
            let b = right.enter_position(&window).unwrap().map(|i| i.kind());
            assert_eq!(a, b);
        }
    }

    #[test]
    fn empty_window_declines_to_trade() {
        let mut strategy = RandomStrategy::with_seed(1.0, 1.0, 7).unwrap();
        assert!(strategy.enter_position(&[]).unwrap().is_none());

        let mut strategy = BuyAndHold;
        assert!(strategy.enter_position(&[]).unwrap().is_none());
    }

    #[test]
    fn buy_and_hold_always_enters_long() {
        let window = make_window();
        let mut strategy = BuyAndHold;

        let instruction = strategy.enter_position(&window).unwrap().unwrap();
        assert_eq!(instruction.kind(), OrderKind::OpenLong);
        assert_eq!(instruction.price(), 103.0);

        let position = Position::from((PositionSide::Long, 103.0, 1.0));
        assert!(strategy.exit_position(&window, &position).unwrap().is_none());
    }
}
