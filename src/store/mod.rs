//! Persistence interface consumed by the HTTP layer
//!
//! Every record other than users is owned by exactly one user, and all lookups,
//! listings and deletions of those records are scoped by the owner's id.

mod memory;

pub use memory::MemoryStore;

use crate::error::Result;
use crate::records::{
    ApiKey, CashFlowProjection, FinancialProfile, Investment, MonthlyExpense, NewApiKey, NewExpense,
    NewInvestment, NewProjection, NewUser, User,
};

/// Storage operations for users and their financial records
pub trait Store: Send + Sync {
    /// Insert a user together with its default financial profile, atomically
    fn insert_user(&self, new_user: NewUser) -> Result<User>;
    fn get_user(&self, user_id: u64) -> Result<Option<User>>;
    fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;
    fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
    fn find_user_by_access_key(&self, access_key: &str) -> Result<Option<User>>;
    fn update_user(&self, user: User) -> Result<User>;

    fn get_profile(&self, user_id: u64) -> Result<Option<FinancialProfile>>;
    /// Insert or replace the profile of `profile.user_id`
    fn save_profile(&self, profile: FinancialProfile) -> Result<FinancialProfile>;

    fn insert_expense(&self, user_id: u64, new_expense: NewExpense) -> Result<MonthlyExpense>;
    fn list_expenses(&self, user_id: u64) -> Result<Vec<MonthlyExpense>>;
    fn get_expense(&self, user_id: u64, expense_id: u64) -> Result<Option<MonthlyExpense>>;
    fn update_expense(&self, expense: MonthlyExpense) -> Result<MonthlyExpense>;
    fn delete_expense(&self, user_id: u64, expense_id: u64) -> Result<bool>;

    fn insert_investment(&self, user_id: u64, new_investment: NewInvestment) -> Result<Investment>;
    fn list_investments(&self, user_id: u64) -> Result<Vec<Investment>>;
    fn delete_investment(&self, user_id: u64, investment_id: u64) -> Result<bool>;

    fn insert_api_key(&self, user_id: u64, new_key: NewApiKey) -> Result<ApiKey>;
    fn list_api_keys(&self, user_id: u64) -> Result<Vec<ApiKey>>;
    fn delete_api_key(&self, user_id: u64, key_id: u64) -> Result<bool>;

    fn insert_projection(&self, user_id: u64, new_projection: NewProjection) -> Result<CashFlowProjection>;
    fn list_projections(&self, user_id: u64) -> Result<Vec<CashFlowProjection>>;
    fn get_projection(&self, user_id: u64, projection_id: u64) -> Result<Option<CashFlowProjection>>;
    fn delete_projection(&self, user_id: u64, projection_id: u64) -> Result<bool>;
}
