//! Persisted records: users and their financial data

mod user;
mod financial;

pub use user::{NewUser, User, UserView};
pub use financial::{
    ApiKey, ApiKeyView, CashFlowProjection, ExpenseUpdate, FinancialProfile, Investment, MonthlyExpense,
    NewApiKey, NewExpense, NewInvestment, NewProjection, ProfileUpdate, ProjectionView,
    DEFAULT_EDUCATION_TYPE, DEFAULT_RISK_LEVEL,
};
