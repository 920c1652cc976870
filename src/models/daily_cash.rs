use chrono::{DateTime, NaiveDate, Utc};

/// One shop's cash ledger header for one business date.
///
/// At most one row exists per (shop_id, business_date); the unique constraint
/// on the table is what serializes concurrent first-access creation. `locked`
/// gates the closing fields only: ledger entries may still be appended after a
/// day is closed, and opening-balance confirmation is allowed at any time.
#[derive(sqlx::FromRow, Clone)]
pub struct DailyCash {
    pub id: i64,
    pub shop_id: i64,
    pub business_date: NaiveDate,
    pub opening_cash: f64,
    pub opening_confirmed: bool,
    pub closing_cash: Option<f64>,
    pub locked: bool,
    pub closed_by: Option<i64>,
    pub closed_at: Option<DateTime<Utc>>,
}

/// Lifecycle status of a day record, derived from `locked`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayStatus {
    Open,
    Closed,
}

/// Mutations whose availability depends on the record's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayOperation {
    AddEntry,
    Close,
    ConfirmOpening,
}

impl DayStatus {
    /// The allowed-operations policy, in one place. Late ledger entries and
    /// opening-balance corrections remain legal after close; only re-closing
    /// is refused.
    pub fn allows(self, op: DayOperation) -> bool {
        match (self, op) {
            (DayStatus::Open, _) => true,
            (DayStatus::Closed, DayOperation::AddEntry) => true,
            (DayStatus::Closed, DayOperation::ConfirmOpening) => true,
            (DayStatus::Closed, DayOperation::Close) => false,
        }
    }
}

impl DailyCash {
    pub fn status(&self) -> DayStatus {
        if self.locked {
            DayStatus::Closed
        } else {
            DayStatus::Open
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DayOperation, DayStatus};

    #[test]
    fn close_is_one_way() {
        assert!(DayStatus::Open.allows(DayOperation::Close));
        assert!(!DayStatus::Closed.allows(DayOperation::Close));
    }

    #[test]
    fn closed_day_still_accepts_entries_and_opening_corrections() {
        assert!(DayStatus::Closed.allows(DayOperation::AddEntry));
        assert!(DayStatus::Closed.allows(DayOperation::ConfirmOpening));
    }
}
