//! Reporting period for filtering ledger postings by date

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

const MONTHS: [&str; 12] = [
    "Januari", "Februari", "Maret", "April", "Mei", "Juni", "Juli", "Agustus", "September", "Oktober",
    "November", "Desember",
];

/// Period a report is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportPeriod {
    /// Every posting, dated or not
    All,
    /// One fiscal year
    Year { year: i32 },
    /// Inclusive month range within a year
    Months { year: i32, from: u32, to: u32 },
    /// Inclusive date range
    Custom { start: NaiveDate, end: NaiveDate },
}

impl Default for ReportPeriod {
    fn default() -> Self {
        ReportPeriod::All
    }
}

impl ReportPeriod {
    /// Build a period from optional year and month bounds
    pub fn from_parts(year: Option<i32>, from_month: Option<u32>, to_month: Option<u32>) -> CoreResult<Self> {
        let period = match (year, from_month, to_month) {
            (None, None, None) => ReportPeriod::All,
            (Some(year), None, None) => ReportPeriod::Year { year },
            (Some(year), from, to) => ReportPeriod::Months {
                year,
                from: from.unwrap_or(1),
                to: to.unwrap_or(12),
            },
            (None, _, _) => {
                return Err(CoreError::InvalidRequest {
                    message: "a month range needs a year".to_string(),
                })
            }
        };
        period.validate()?;
        Ok(period)
    }

    /// Check month and date bounds
    pub fn validate(&self) -> CoreResult<()> {
        let invalid = |message: String| Err(CoreError::InvalidRequest { message });
        match *self {
            ReportPeriod::All => Ok(()),
            ReportPeriod::Year { year } => {
                if NaiveDate::from_ymd_opt(year, 1, 1).is_none() {
                    return invalid(format!("year {} is out of range", year));
                }
                Ok(())
            }
            ReportPeriod::Months { year, from, to } => {
                if !(1..=12).contains(&from) || !(1..=12).contains(&to) {
                    return invalid(format!("months must be between 1 and 12, got {} to {}", from, to));
                }
                if from > to {
                    return invalid(format!("month range {} to {} is reversed", from, to));
                }
                if NaiveDate::from_ymd_opt(year, 1, 1).is_none() {
                    return invalid(format!("year {} is out of range", year));
                }
                Ok(())
            }
            ReportPeriod::Custom { start, end } => {
                if start > end {
                    return invalid(format!("period start {} is after end {}", start, end));
                }
                Ok(())
            }
        }
    }

    /// Whether the period restricts postings at all
    pub fn is_bounded(&self) -> bool {
        !matches!(self, ReportPeriod::All)
    }

    /// First day of the period
    pub fn start_date(&self) -> Option<NaiveDate> {
        match *self {
            ReportPeriod::All => None,
            ReportPeriod::Year { year } => NaiveDate::from_ymd_opt(year, 1, 1),
            ReportPeriod::Months { year, from, .. } => NaiveDate::from_ymd_opt(year, from, 1),
            ReportPeriod::Custom { start, .. } => Some(start),
        }
    }

    /// Last day of the period
    pub fn end_date(&self) -> Option<NaiveDate> {
        match *self {
            ReportPeriod::All => None,
            ReportPeriod::Year { year } => NaiveDate::from_ymd_opt(year, 12, 31),
            ReportPeriod::Months { year, to, .. } => {
                let next = if to >= 12 {
                    NaiveDate::from_ymd_opt(year + 1, 1, 1)
                } else {
                    NaiveDate::from_ymd_opt(year, to + 1, 1)
                };
                next.and_then(|d| d.pred_opt())
            }
            ReportPeriod::Custom { end, .. } => Some(end),
        }
    }

    /// Check if a posting date falls in the period.
    ///
    /// Undated postings only belong to the unbounded period.
    pub fn contains(&self, date: Option<NaiveDate>) -> bool {
        if !self.is_bounded() {
            return true;
        }
        let Some(date) = date else {
            return false;
        };
        match (self.start_date(), self.end_date()) {
            (None, None) => true,
            (Some(s), None) => date >= s,
            (None, Some(e)) => date <= e,
            (Some(s), Some(e)) => date >= s && date <= e,
        }
    }

    /// Human-readable description, in the report's language
    pub fn description(&self) -> String {
        match *self {
            ReportPeriod::All => "Semua Periode".to_string(),
            ReportPeriod::Year { year } => format!("Tahun {}", year),
            ReportPeriod::Months { year, from, to } => {
                let name = |m: u32| MONTHS.get(m.saturating_sub(1) as usize).copied().unwrap_or("?");
                if from == to {
                    format!("{} {}", name(from), year)
                } else {
                    format!("{} - {} {}", name(from), name(to), year)
                }
            }
            ReportPeriod::Custom { start, end } => format!("{} s.d. {}", start, end),
        }
    }
}
