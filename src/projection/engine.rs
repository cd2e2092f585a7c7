//! Core projection loop: compounds income, expenses and savings year by year

use serde::{Deserialize, Serialize};

use super::cashflows::YearlyProjection;
use super::state::ProjectionState;
use crate::error::{Error, Result};

/// Default number of years to project
pub const DEFAULT_HORIZON_YEARS: i64 = 10;

/// Default annual inflation, in percent
pub const DEFAULT_INFLATION_RATE: f64 = 4.5;

/// Default annual investment return, in percent
pub const DEFAULT_INVESTMENT_RETURN_RATE: f64 = 10.0;

/// Parameters of a projection run
///
/// Rates are annual percentages (4.5 means 4.5%); monetary amounts are monthly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionInput {
    pub horizon_years: i64,
    pub monthly_income: f64,
    pub monthly_expenses: f64,
    pub monthly_savings: f64,
    pub inflation_rate: f64,
    pub investment_return_rate: f64,
}

impl Default for ProjectionInput {
    fn default() -> Self {
        Self {
            horizon_years: DEFAULT_HORIZON_YEARS,
            monthly_income: 0.0,
            monthly_expenses: 0.0,
            monthly_savings: 0.0,
            inflation_rate: DEFAULT_INFLATION_RATE,
            investment_return_rate: DEFAULT_INVESTMENT_RETURN_RATE,
        }
    }
}

impl ProjectionInput {
    pub fn new(
        horizon_years: i64,
        monthly_income: f64,
        monthly_expenses: f64,
        monthly_savings: f64,
        inflation_rate: f64,
        investment_return_rate: f64,
    ) -> Self {
        Self {
            horizon_years,
            monthly_income,
            monthly_expenses,
            monthly_savings,
            inflation_rate,
            investment_return_rate,
        }
    }

    /// Boundary check for callers accepting untrusted input.
    ///
    /// `project` itself accepts anything; this rejects horizons outside
    /// `1..=max_horizon_years` and non-finite amounts or rates.
    pub fn validate(&self, max_horizon_years: i64) -> Result<()> {
        if self.horizon_years < 1 || self.horizon_years > max_horizon_years {
            return Err(Error::validation(format!(
                "years must be between 1 and {}",
                max_horizon_years
            )));
        }

        let fields = [
            ("monthly_income", self.monthly_income),
            ("monthly_expenses", self.monthly_expenses),
            ("monthly_savings", self.monthly_savings),
            ("inflation_rate", self.inflation_rate),
            ("investment_return", self.investment_return_rate),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(Error::validation(format!("{} must be a finite number", name)));
            }
        }

        Ok(())
    }
}

/// Round a monetary amount to cents, half away from zero (`f64::round`).
///
/// Values too large to scale by 100 are returned unchanged.
pub fn round_cents(value: f64) -> f64 {
    let scaled = value * 100.0;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / 100.0
}

/// Run the projection for every year of the horizon.
///
/// Pure and deterministic. A non-positive horizon yields an empty sequence.
pub fn project(input: &ProjectionInput) -> Vec<YearlyProjection> {
    let inflation_rate = input.inflation_rate / 100.0;
    let return_rate = input.investment_return_rate / 100.0;

    // Contribution is nominal and identical every year
    let annual_savings = input.monthly_savings * 12.0;

    let capacity = usize::try_from(input.horizon_years).unwrap_or(0);
    let mut rows = Vec::with_capacity(capacity);
    let mut state = ProjectionState::initial();

    for _year in 1..=input.horizon_years {
        state.advance_year(inflation_rate, annual_savings, return_rate);

        // Income tracks the same price index as expenses
        let annual_income = input.monthly_income * 12.0 * state.inflation_factor;
        let adjusted_monthly_expenses = input.monthly_expenses * state.inflation_factor;
        let annual_expenses = adjusted_monthly_expenses * 12.0;

        rows.push(YearlyProjection {
            year: state.year,
            annual_income: round_cents(annual_income),
            annual_expenses: round_cents(annual_expenses),
            annual_savings: round_cents(annual_savings),
            accumulated_savings: round_cents(state.accumulated_savings),
            net_cash_flow: round_cents(annual_income - annual_expenses),
        });
    }

    rows
}
