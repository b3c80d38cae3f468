use std::fmt;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::engine::{OrderKind, Wallet};
use crate::errors::Result;

/// The action recorded on a step: a position was opened with the given
/// order kind, or closed by it.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Opened(OrderKind),
    Closed(OrderKind),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Open rows carry the kind, close rows the closed marker
            Self::Opened(kind) => write!(f, "{kind}"),
            Self::Closed(_) => write!(f, "closed"),
        }
    }
}

/// One row of the results table: the wallet and balance snapshot taken at
/// the start of a step, plus whatever the step did.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct StepRecord {
    open_time: DateTime<Utc>,
    balance: f64,
    minimal_balance: f64,
    cash: f64,
    base: f64,
    loaned_cash: f64,
    loaned_base: f64,
    action: Option<Action>,
    return_rate: Option<f64>,
    return_rate_with_commission: Option<f64>,
    position_marker: f64,
}

impl StepRecord {
    pub(crate) fn new(
        open_time: DateTime<Utc>,
        balance: f64,
        minimal_balance: f64,
        wallet: &Wallet,
    ) -> Self {
        Self {
            open_time,
            balance,
            minimal_balance,
            cash: wallet.cash(),
            base: wallet.base(),
            loaned_cash: wallet.loaned_cash(),
            loaned_base: wallet.loaned_base(),
            action: None,
            return_rate: None,
            return_rate_with_commission: None,
            position_marker: 0.0,
        }
    }

    pub(crate) fn set_position_marker(&mut self, marker: f64) {
        self.position_marker = marker;
    }

    pub(crate) fn set_action(&mut self, action: Action) {
        self.action = Some(action);
    }

    pub(crate) fn set_returns(&mut self, rate: f64, rate_with_commission: f64) {
        self.return_rate = Some(rate);
        self.return_rate_with_commission = Some(rate_with_commission);
    }

    /// Returns the open time of the step's candle.
    pub fn open_time(&self) -> DateTime<Utc> {
        self.open_time
    }

    /// Returns the mark-to-market balance at the candle's open.
    pub fn balance(&self) -> f64 {
        self.balance
    }

    /// Returns the lowest equity implied by the candle's high and low.
    pub fn minimal_balance(&self) -> f64 {
        self.minimal_balance
    }

    /// Returns the wallet's cash at the snapshot.
    pub fn cash(&self) -> f64 {
        self.cash
    }

    /// Returns the wallet's base-asset quantity at the snapshot.
    pub fn base(&self) -> f64 {
        self.base
    }

    /// Returns the borrowed quote currency at the snapshot.
    pub fn loaned_cash(&self) -> f64 {
        self.loaned_cash
    }

    /// Returns the borrowed base asset at the snapshot.
    pub fn loaned_base(&self) -> f64 {
        self.loaned_base
    }

    /// Returns the action taken on this step, if any.
    pub fn action(&self) -> Option<Action> {
        self.action
    }

    /// Returns the realized return rate, recorded on close steps only.
    pub fn return_rate(&self) -> Option<f64> {
        self.return_rate
    }

    /// Returns the realized return rate net of commissions, recorded on
    /// close steps only.
    pub fn return_rate_with_commission(&self) -> Option<f64> {
        self.return_rate_with_commission
    }

    /// Returns the position marker used by charts: the candle's open while
    /// flat, offset above (long) or below (short) it while in a position.
    pub fn position_marker(&self) -> f64 {
        self.position_marker
    }
}

/// The results table: one [`StepRecord`] per processed step, append-only.
///
/// This is the sole interface handed to the summary and chart collaborators.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default)]
pub struct Report {
    rows: Vec<StepRecord>,
}

const CSV_HEADER: [&str; 11] = [
    "Open time",
    "Balance",
    "Minimal balance",
    "Cash",
    "Base",
    "Loaned cash",
    "Loaned base",
    "Actions",
    "Return rate",
    "Return rate with comm",
    "Pos",
];

impl Report {
    pub(crate) fn push(&mut self, row: StepRecord) {
        self.rows.push(row);
    }

    /// Returns all recorded rows in step order.
    pub fn rows(&self) -> &[StepRecord] {
        &self.rows
    }

    /// Returns the number of recorded rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` when no row has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the last recorded row.
    pub fn last(&self) -> Option<&StepRecord> {
        self.rows.last()
    }

    /// Writes the table as CSV. Cells without a value stay empty.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(CSV_HEADER)?;
        for row in &self.rows {
            writer.write_record([
                row.open_time.format("%Y-%m-%d %H:%M:%S").to_string(),
                row.balance.to_string(),
                row.minimal_balance.to_string(),
                row.cash.to_string(),
                row.base.to_string(),
                row.loaned_cash.to_string(),
                row.loaned_base.to_string(),
                row.action.map(|a| a.to_string()).unwrap_or_default(),
                row.return_rate.map(|r| r.to_string()).unwrap_or_default(),
                row.return_rate_with_commission
                    .map(|r| r.to_string())
                    .unwrap_or_default(),
                row.position_marker.to_string(),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Writes the table as CSV to the given path.
    pub fn save_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        self.write_csv(std::io::BufWriter::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::PositionSide;

    fn make_row(cash: f64) -> StepRecord {
        let wallet = Wallet::new(cash).unwrap();
        let open_time = DateTime::from_timestamp_secs(1515151515).unwrap();
        StepRecord::new(open_time, cash, cash, &wallet)
    }

    #[test]
    fn action_rendering() {
        assert_eq!(Action::Opened(OrderKind::OpenShort).to_string(), "open_short");
        assert_eq!(Action::Closed(OrderKind::CloseShort).to_string(), "closed");
    }

    #[test]
    fn push_and_read_rows() {
        let mut report = Report::default();
        assert!(report.is_empty());

        report.push(make_row(10000.0));
        report.push(make_row(10100.0));

        assert_eq!(report.len(), 2);
        assert_eq!(report.rows()[0].balance(), 10000.0);
        assert_eq!(report.last().unwrap().balance(), 10100.0);
    }

    #[test]
    fn csv_rendering() {
        let mut report = Report::default();

        let mut row = make_row(10000.0);
        row.set_position_marker(100.0);
        row.set_action(Action::Opened(OrderKind::OpenLong));
        report.push(row);

        let mut row = make_row(10000.0);
        row.set_position_marker(2100.0);
        row.set_action(Action::Closed(PositionSide::Long.closing_kind()));
        row.set_returns(0.5, 0.25);
        report.push(row);

        let mut buffer = Vec::new();
        report.write_csv(&mut buffer).unwrap();
        let csv = String::from_utf8(buffer).unwrap();
        let mut lines = csv.lines();

        assert_eq!(
            lines.next().unwrap(),
            "Open time,Balance,Minimal balance,Cash,Base,Loaned cash,Loaned base,\
             Actions,Return rate,Return rate with comm,Pos"
        );
        assert_eq!(
            lines.next().unwrap(),
            "2018-01-05 11:25:15,10000,10000,10000,0,0,0,open_long,,,100"
        );
        assert_eq!(
            lines.next().unwrap(),
            "2018-01-05 11:25:15,10000,10000,10000,0,0,0,closed,0.5,0.25,2100"
        );
    }
}
