//! Scenario runner for comparing rate assumptions
//!
//! Holds one set of monthly cash flows and projects it under several
//! inflation / return scenarios, in parallel.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::projection::{project, ProjectionInput, ProjectionSummary, YearlyProjection};

/// A named pair of annual rates, in percent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateScenario {
    pub label: String,
    pub inflation_rate: f64,
    pub investment_return_rate: f64,
}

impl RateScenario {
    pub fn new(label: impl Into<String>, inflation_rate: f64, investment_return_rate: f64) -> Self {
        Self {
            label: label.into(),
            inflation_rate,
            investment_return_rate,
        }
    }
}

/// Projection of the base cash flows under one scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario: RateScenario,
    pub rows: Vec<YearlyProjection>,
    pub summary: ProjectionSummary,
}

/// Pre-configured runner for batch projections
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new(input);
/// let results = runner.run_scenarios(&[
///     RateScenario::new("low", 3.0, 6.0),
///     RateScenario::new("high", 6.0, 12.0),
/// ]);
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    /// Horizon and monthly amounts shared by every scenario
    base_input: ProjectionInput,
}

impl ScenarioRunner {
    pub fn new(base_input: ProjectionInput) -> Self {
        Self { base_input }
    }

    /// Run a single scenario
    pub fn run(&self, scenario: &RateScenario) -> ScenarioResult {
        let input = ProjectionInput {
            inflation_rate: scenario.inflation_rate,
            investment_return_rate: scenario.investment_return_rate,
            ..self.base_input.clone()
        };
        let rows = project(&input);
        let summary = ProjectionSummary::from_rows(&rows);

        ScenarioResult {
            scenario: scenario.clone(),
            rows,
            summary,
        }
    }

    /// Run every scenario in parallel; results keep the input order
    pub fn run_scenarios(&self, scenarios: &[RateScenario]) -> Vec<ScenarioResult> {
        scenarios.par_iter().map(|s| self.run(s)).collect()
    }

    pub fn base_input(&self) -> &ProjectionInput {
        &self.base_input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> ProjectionInput {
        ProjectionInput::new(20, 6000.0, 4000.0, 800.0, 4.5, 10.0)
    }

    #[test]
    fn test_scenario_runner_batch() {
        let runner = ScenarioRunner::new(base());
        let scenarios: Vec<_> = [4.0, 8.0, 12.0]
            .iter()
            .map(|&rate| RateScenario::new(format!("{}%", rate), 4.5, rate))
            .collect();

        let results = runner.run_scenarios(&scenarios);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].scenario.label, "4%");
        assert_eq!(results[2].scenario.label, "12%");

        // Higher return should end with a larger balance
        assert!(results[2].summary.final_accumulated_savings > results[0].summary.final_accumulated_savings);
    }

    #[test]
    fn test_scenario_matches_direct_projection() {
        let runner = ScenarioRunner::new(base());
        let result = runner.run(&RateScenario::new("base", 4.5, 10.0));
        assert_eq!(result.rows, project(&base()));
        assert_eq!(result.rows.len(), 20);
    }
}
