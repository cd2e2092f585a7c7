//! Yearly cash-flow projection engine

mod state;
mod engine;
mod cashflows;

pub use state::ProjectionState;
pub use engine::{
    project, round_cents, ProjectionInput, DEFAULT_HORIZON_YEARS, DEFAULT_INFLATION_RATE,
    DEFAULT_INVESTMENT_RETURN_RATE,
};
pub use cashflows::{ensure_finite, write_csv, ProjectionSummary, YearlyProjection};
