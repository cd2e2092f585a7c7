//! Projection output rows, summary statistics and CSV export

use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::error::{Error, Result};

/// One year of projection output. Monetary fields are rounded to cents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyProjection {
    /// 1-based year index
    pub year: i64,
    pub annual_income: f64,
    pub annual_expenses: f64,
    /// Nominal contribution, constant across years
    pub annual_savings: f64,
    /// Compounded balance including this year's contribution and growth
    pub accumulated_savings: f64,
    /// Income minus expenses; the savings contribution is not subtracted
    pub net_cash_flow: f64,
}

impl YearlyProjection {
    /// Whether every monetary field is a finite number
    pub fn is_finite(&self) -> bool {
        [
            self.annual_income,
            self.annual_expenses,
            self.annual_savings,
            self.accumulated_savings,
            self.net_cash_flow,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

/// Reject a projection whose values left the `f64` range
pub fn ensure_finite(rows: &[YearlyProjection]) -> Result<()> {
    match rows.iter().find(|r| !r.is_finite()) {
        Some(row) => Err(Error::validation(format!(
            "projection overflows numeric range in year {}",
            row.year
        ))),
        None => Ok(()),
    }
}

/// Summary statistics for a projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub years: usize,
    pub total_income: f64,
    pub total_expenses: f64,
    pub total_contributions: f64,
    pub total_net_cash_flow: f64,
    pub final_accumulated_savings: f64,
    /// Final balance minus everything contributed
    pub investment_growth: f64,
}

impl ProjectionSummary {
    pub fn from_rows(rows: &[YearlyProjection]) -> Self {
        let total_income: f64 = rows.iter().map(|r| r.annual_income).sum();
        let total_expenses: f64 = rows.iter().map(|r| r.annual_expenses).sum();
        let total_contributions: f64 = rows.iter().map(|r| r.annual_savings).sum();
        let total_net_cash_flow: f64 = rows.iter().map(|r| r.net_cash_flow).sum();

        let final_accumulated_savings = rows.last().map(|r| r.accumulated_savings).unwrap_or(0.0);

        Self {
            years: rows.len(),
            total_income,
            total_expenses,
            total_contributions,
            total_net_cash_flow,
            final_accumulated_savings,
            investment_growth: final_accumulated_savings - total_contributions,
        }
    }
}

/// Write projection rows as CSV, one line per year
pub fn write_csv<W: Write>(rows: &[YearlyProjection], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record([
        "Year",
        "AnnualIncome",
        "AnnualExpenses",
        "AnnualSavings",
        "AccumulatedSavings",
        "NetCashFlow",
    ])?;

    for row in rows {
        csv_writer.write_record([
            row.year.to_string(),
            format!("{:.2}", row.annual_income),
            format!("{:.2}", row.annual_expenses),
            format!("{:.2}", row.annual_savings),
            format!("{:.2}", row.accumulated_savings),
            format!("{:.2}", row.net_cash_flow),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}
