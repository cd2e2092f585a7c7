//! Cash Flow Planner CLI
//!
//! Runs projections locally without the HTTP layer.

use anyhow::{bail, Context, Result};
use cashflow_planner::projection::{
    ensure_finite, write_csv, DEFAULT_INFLATION_RATE, DEFAULT_INVESTMENT_RETURN_RATE,
};
use cashflow_planner::{
    project, ProjectionInput, ProjectionSummary, RateScenario, ScenarioRunner, ServiceConfig, YearlyProjection,
};
use clap::{Args, Parser, Subcommand};
use log::info;
use std::fs::File;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cashflow_planner")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Project income, expenses and savings year by year
    Project {
        #[command(flatten)]
        input: InputArgs,

        /// Write every row to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Run the same baseline under several rate scenarios
    Compare {
        #[command(flatten)]
        input: InputArgs,

        /// Scenario as LABEL:INFLATION:RETURN, repeatable
        #[arg(short, long = "scenario", required = true)]
        scenarios: Vec<String>,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Number of years to project
    #[arg(short, long, default_value_t = 10)]
    years: i64,

    /// Monthly income
    #[arg(long, default_value_t = 0.0)]
    income: f64,

    /// Monthly expenses
    #[arg(long, default_value_t = 0.0)]
    expenses: f64,

    /// Monthly savings contribution
    #[arg(long, default_value_t = 0.0)]
    savings: f64,

    /// Annual inflation, in percent
    #[arg(long, default_value_t = DEFAULT_INFLATION_RATE)]
    inflation: f64,

    /// Annual investment return, in percent
    #[arg(long = "return", default_value_t = DEFAULT_INVESTMENT_RETURN_RATE)]
    investment_return: f64,
}

impl InputArgs {
    fn to_input(&self) -> Result<ProjectionInput> {
        let input = ProjectionInput::new(
            self.years,
            self.income,
            self.expenses,
            self.savings,
            self.inflation,
            self.investment_return,
        );
        input.validate(ServiceConfig::from_env()?.max_horizon_years)?;
        Ok(input)
    }
}

fn parse_scenario(raw: &str) -> Result<RateScenario> {
    let parts: Vec<&str> = raw.split(':').collect();
    let [label, inflation, investment_return] = parts.as_slice() else {
        bail!("scenario '{}' must look like LABEL:INFLATION:RETURN", raw);
    };

    let inflation: f64 = inflation
        .trim()
        .parse()
        .with_context(|| format!("bad inflation rate in scenario '{}'", raw))?;
    let investment_return: f64 = investment_return
        .trim()
        .parse()
        .with_context(|| format!("bad return rate in scenario '{}'", raw))?;

    Ok(RateScenario::new(label.trim(), inflation, investment_return))
}

fn print_rows(rows: &[YearlyProjection]) {
    println!(
        "{:>5} {:>16} {:>16} {:>14} {:>18} {:>16}",
        "Year", "Income", "Expenses", "Savings", "Accumulated", "Net Cash Flow"
    );
    println!("{}", "-".repeat(90));
    for row in rows {
        println!(
            "{:>5} {:>16.2} {:>16.2} {:>14.2} {:>18.2} {:>16.2}",
            row.year,
            row.annual_income,
            row.annual_expenses,
            row.annual_savings,
            row.accumulated_savings,
            row.net_cash_flow,
        );
    }
}

fn print_summary(summary: &ProjectionSummary) {
    println!("\nSummary:");
    println!("  Years: {}", summary.years);
    println!("  Total Income: {:.2}", summary.total_income);
    println!("  Total Expenses: {:.2}", summary.total_expenses);
    println!("  Total Contributions: {:.2}", summary.total_contributions);
    println!("  Total Net Cash Flow: {:.2}", summary.total_net_cash_flow);
    println!("  Final Accumulated Savings: {:.2}", summary.final_accumulated_savings);
    println!("  Investment Growth: {:.2}", summary.investment_growth);
}

fn run_project(input: &ProjectionInput, csv: Option<PathBuf>) -> Result<()> {
    let rows = project(input);
    ensure_finite(&rows)?;
    print_rows(&rows);
    print_summary(&ProjectionSummary::from_rows(&rows));

    if let Some(path) = csv {
        let file = File::create(&path).with_context(|| format!("cannot create {}", path.display()))?;
        write_csv(&rows, file)?;
        info!("Wrote {} rows to {}", rows.len(), path.display());
        println!("\nFull results written to: {}", path.display());
    }
    Ok(())
}

fn run_compare(input: ProjectionInput, scenarios: &[String]) -> Result<()> {
    let scenarios = scenarios
        .iter()
        .map(|s| parse_scenario(s))
        .collect::<Result<Vec<_>>>()?;

    let runner = ScenarioRunner::new(input);
    let results = runner.run_scenarios(&scenarios);
    for result in &results {
        ensure_finite(&result.rows).with_context(|| format!("scenario '{}'", result.scenario.label))?;
    }

    let base = runner.base_input();
    println!(
        "{} years, monthly income {:.2}, expenses {:.2}, savings {:.2}\n",
        base.horizon_years, base.monthly_income, base.monthly_expenses, base.monthly_savings
    );

    println!(
        "{:<16} {:>10} {:>10} {:>18} {:>18}",
        "Scenario", "Inflation", "Return", "Final Savings", "Growth"
    );
    println!("{}", "-".repeat(76));
    for result in &results {
        println!(
            "{:<16} {:>9.2}% {:>9.2}% {:>18.2} {:>18.2}",
            result.scenario.label,
            result.scenario.inflation_rate,
            result.scenario.investment_return_rate,
            result.summary.final_accumulated_savings,
            result.summary.investment_growth,
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Project { input, csv } => run_project(&input.to_input()?, csv),
        Commands::Compare { input, scenarios } => run_compare(input.to_input()?, &scenarios),
    }
}
