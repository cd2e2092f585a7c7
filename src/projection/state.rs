//! Running state carried from one projection year to the next

/// State of the projection at the end of a year
#[derive(Debug, Clone, Default)]
pub struct ProjectionState {
    /// Last completed year (0 before the first step)
    pub year: i64,

    /// Cumulative inflation multiplier from the baseline, `(1 + inflation)^year`
    pub inflation_factor: f64,

    /// Compounded savings balance, kept unrounded
    pub accumulated_savings: f64,
}

impl ProjectionState {
    /// State at the projection baseline
    pub fn initial() -> Self {
        Self {
            year: 0,
            inflation_factor: 1.0,
            accumulated_savings: 0.0,
        }
    }

    /// Advance one year: refresh the inflation factor, add the year's contribution
    /// and grow the balance for a full year at `return_rate`
    pub fn advance_year(&mut self, inflation_rate: f64, annual_contribution: f64, return_rate: f64) {
        self.year += 1;

        // Compounded from the baseline rather than multiplied year over year
        self.inflation_factor = match i32::try_from(self.year) {
            Ok(year) => (1.0 + inflation_rate).powi(year),
            Err(_) => (1.0 + inflation_rate).powf(self.year as f64),
        };

        self.accumulated_savings = (self.accumulated_savings + annual_contribution) * (1.0 + return_rate);
    }
}
