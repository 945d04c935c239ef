use std::collections::HashMap;
use types::{Day, DayId, Period, PeriodId};

/// Grid row 1 is the period header, so the first period lands on row 2.
pub const ROW_OFFSET: usize = 2;
/// Grid column 1 holds period labels, so the first day lands on column 2.
pub const COLUMN_OFFSET: usize = 2;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCell {
    pub column: usize,
    pub row: usize,
}

/// Stable sort by start time; equal starts keep their input order.
pub fn sort_periods(periods: &mut [Period]) {
    periods.sort_by_key(|p| p.start_minute);
}

pub fn period_rows(periods: &[Period]) -> HashMap<PeriodId, usize> {
    periods
        .iter()
        .enumerate()
        .map(|(i, p)| (p.id, i + ROW_OFFSET))
        .collect()
}

pub fn day_columns(days: &[Day]) -> HashMap<DayId, usize> {
    days.iter()
        .enumerate()
        .map(|(i, d)| (d.id, i + COLUMN_OFFSET))
        .collect()
}

/// Row and column lookups for one pair of axis lists. Rebuild it whenever
/// either list changes.
#[derive(Clone, Debug)]
pub struct GridGeometry {
    rows: HashMap<PeriodId, usize>,
    columns: HashMap<DayId, usize>,
}

impl GridGeometry {
    pub fn new(days: &[Day], periods: &[Period]) -> Self {
        Self {
            rows: period_rows(periods),
            columns: day_columns(days),
        }
    }

    pub fn row(&self, period: PeriodId) -> Option<usize> {
        self.rows.get(&period).copied()
    }

    pub fn column(&self, day: DayId) -> Option<usize> {
        self.columns.get(&day).copied()
    }

    pub fn cell(&self, day: DayId, period: PeriodId) -> Option<GridCell> {
        Some(GridCell {
            column: self.column(day)?,
            row: self.row(period)?,
        })
    }

    /// Cells covered by something starting at (`day`, `start`) and lasting
    /// `length` periods, cut off at the last period row.
    pub fn footprint(&self, day: DayId, start: PeriodId, length: u32) -> Vec<GridCell> {
        let Some(origin) = self.cell(day, start) else {
            return Vec::new();
        };
        let rows_below = self.row_count() - (origin.row - ROW_OFFSET);
        let span = (length.max(1) as usize).min(rows_below);
        (0..span)
            .map(|i| GridCell {
                column: origin.column,
                row: origin.row + i,
            })
            .collect()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
