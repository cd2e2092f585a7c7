//! Financial profile, expense, investment, API key and projection routes

use log::{error, info};
use serde_json::{json, Value};

use super::{to_json, Api, ApiRequest, ApiResponse};
use crate::error::{Error, Result};
use crate::projection::{ensure_finite, project};
use crate::records::{
    ExpenseUpdate, FinancialProfile, NewApiKey, NewExpense, NewInvestment, NewProjection, ProfileUpdate, User,
    DEFAULT_RISK_LEVEL,
};

impl Api {
    /// Stored profile, or a default one that is not persisted
    fn profile_or_default(&self, user: &User) -> Result<FinancialProfile> {
        Ok(self
            .store
            .get_profile(user.id)?
            .unwrap_or_else(|| FinancialProfile::default_for(user.id)))
    }

    pub(super) fn get_financial_profile(&self, user: &User) -> Result<ApiResponse> {
        let profile = match self.store.get_profile(user.id)? {
            Some(profile) => profile,
            None => self.store.save_profile(FinancialProfile::default_for(user.id))?,
        };
        Ok(ApiResponse::ok(to_json(&profile)?))
    }

    pub(super) fn update_financial_profile(&self, user: &User, request: &ApiRequest) -> Result<ApiResponse> {
        let body = request.json_body()?;
        let update = ProfileUpdate {
            monthly_income: body.opt_f64("monthly_income")?,
            monthly_expenses: body.opt_f64("monthly_expenses")?,
            monthly_savings: body.opt_f64("monthly_savings")?,
            inflation_rate: body.opt_f64("inflation_rate")?,
            investment_return_rate: body.opt_f64("investment_return_rate")?,
            education_type: body.opt_str("education_type")?,
            housing_cost: body.opt_f64("housing_cost")?,
        };

        let mut profile = self.profile_or_default(user)?;
        profile.apply(&update);
        let profile = self.store.save_profile(profile)?;

        Ok(ApiResponse::ok(json!({
            "message": "Financial profile updated successfully",
            "profile": to_json(&profile)?,
        })))
    }

    pub(super) fn list_expenses(&self, user: &User) -> Result<ApiResponse> {
        Ok(ApiResponse::ok(to_json(&self.store.list_expenses(user.id)?)?))
    }

    pub(super) fn add_expense(&self, user: &User, request: &ApiRequest) -> Result<ApiResponse> {
        let body = request.json_body()?;
        let new_expense = NewExpense {
            category: body.req_str("category")?,
            description: body.opt_str("description")?.unwrap_or_default(),
            amount: body.req_f64("amount")?,
            is_recurring: body.opt_bool("is_recurring")?.unwrap_or(true),
        };

        let expense = self.store.insert_expense(user.id, new_expense)?;
        Ok(ApiResponse::created(json!({
            "message": "Expense added successfully",
            "expense": to_json(&expense)?,
        })))
    }

    pub(super) fn update_expense(&self, user: &User, expense_id: u64, request: &ApiRequest) -> Result<ApiResponse> {
        let mut expense = self
            .store
            .get_expense(user.id, expense_id)?
            .ok_or_else(|| Error::not_found("Expense not found"))?;

        let body = request.json_body()?;
        expense.apply(&ExpenseUpdate {
            category: body.opt_str("category")?,
            description: body.opt_str("description")?,
            amount: body.opt_f64("amount")?,
            is_recurring: body.opt_bool("is_recurring")?,
        });

        let expense = self.store.update_expense(expense)?;
        Ok(ApiResponse::ok(json!({
            "message": "Expense updated successfully",
            "expense": to_json(&expense)?,
        })))
    }

    pub(super) fn delete_expense(&self, user: &User, expense_id: u64) -> Result<ApiResponse> {
        if !self.store.delete_expense(user.id, expense_id)? {
            return Err(Error::not_found("Expense not found"));
        }
        Ok(ApiResponse::ok(json!({ "message": "Expense deleted successfully" })))
    }

    pub(super) fn list_investments(&self, user: &User) -> Result<ApiResponse> {
        Ok(ApiResponse::ok(to_json(&self.store.list_investments(user.id)?)?))
    }

    pub(super) fn add_investment(&self, user: &User, request: &ApiRequest) -> Result<ApiResponse> {
        let body = request.json_body()?;
        let new_investment = NewInvestment {
            investment_type: body.req_str("investment_type")?,
            name: body.req_str("name")?,
            amount: body.req_f64("amount")?,
            expected_return: body.opt_f64("expected_return")?.unwrap_or(0.0),
            risk_level: body
                .opt_str("risk_level")?
                .unwrap_or_else(|| DEFAULT_RISK_LEVEL.to_string()),
        };

        let investment = self.store.insert_investment(user.id, new_investment)?;
        Ok(ApiResponse::created(json!({
            "message": "Investment added successfully",
            "investment": to_json(&investment)?,
        })))
    }

    pub(super) fn delete_investment(&self, user: &User, investment_id: u64) -> Result<ApiResponse> {
        if !self.store.delete_investment(user.id, investment_id)? {
            return Err(Error::not_found("Investment not found"));
        }
        Ok(ApiResponse::ok(json!({ "message": "Investment deleted successfully" })))
    }

    pub(super) fn list_api_keys(&self, user: &User) -> Result<ApiResponse> {
        let views: Vec<_> = self.store.list_api_keys(user.id)?.iter().map(|k| k.view()).collect();
        Ok(ApiResponse::ok(to_json(&views)?))
    }

    pub(super) fn add_api_key(&self, user: &User, request: &ApiRequest) -> Result<ApiResponse> {
        let body = request.json_body()?;
        let new_key = NewApiKey {
            key_name: body.req_str("key_name")?,
            api_key: body.req_str("api_key")?,
        };

        let key = self.store.insert_api_key(user.id, new_key)?;
        Ok(ApiResponse::created(json!({
            "message": "API key added successfully",
            "api_key": to_json(&key.view())?,
        })))
    }

    pub(super) fn delete_api_key(&self, user: &User, key_id: u64) -> Result<ApiResponse> {
        if !self.store.delete_api_key(user.id, key_id)? {
            return Err(Error::not_found("API key not found"));
        }
        Ok(ApiResponse::ok(json!({ "message": "API key deleted successfully" })))
    }

    /// Run the projection engine and save the result for the caller.
    ///
    /// Fields missing from the body fall back to the caller's financial profile.
    pub(super) fn calculate_cash_flow(&self, user: &User, request: &ApiRequest) -> Result<ApiResponse> {
        let body = request.json_body()?;
        let profile = self.profile_or_default(user)?;

        let horizon_years = body.opt_i64("years")?.unwrap_or(self.config.default_horizon_years);
        let mut input = profile.projection_input(horizon_years);
        let overrides = [
            ("monthly_income", &mut input.monthly_income),
            ("monthly_expenses", &mut input.monthly_expenses),
            ("monthly_savings", &mut input.monthly_savings),
            ("inflation_rate", &mut input.inflation_rate),
            ("investment_return", &mut input.investment_return_rate),
        ];
        for (key, field) in overrides {
            if let Some(value) = body.opt_f64(key)? {
                *field = value;
            }
        }
        input.validate(self.config.max_horizon_years)?;

        let rows = project(&input);
        ensure_finite(&rows)?;

        let name = body
            .non_empty_str("name")
            .unwrap_or_else(|| format!("Projection {} years", horizon_years));
        let record = self
            .store
            .insert_projection(user.id, NewProjection::from_rows(name, &rows)?)
            .map_err(|e| {
                error!("Could not save projection for user {}: {}", user.id, e);
                e
            })?;

        info!(
            "User {} saved projection {} ({} years)",
            user.id, record.id, horizon_years
        );
        Ok(ApiResponse::ok(json!({
            "message": "Cash flow projection calculated successfully",
            "projections": to_json(&rows)?,
            "projection_id": record.id,
        })))
    }

    pub(super) fn list_projections(&self, user: &User) -> Result<ApiResponse> {
        let views: Vec<Value> = self
            .store
            .list_projections(user.id)?
            .iter()
            .map(|p| to_json(&p.view()))
            .collect::<Result<_>>()?;
        Ok(ApiResponse::ok(Value::Array(views)))
    }

    pub(super) fn delete_projection(&self, user: &User, projection_id: u64) -> Result<ApiResponse> {
        if !self.store.delete_projection(user.id, projection_id)? {
            return Err(Error::not_found("Projection not found"));
        }
        Ok(ApiResponse::ok(json!({ "message": "Projection deleted successfully" })))
    }
}
