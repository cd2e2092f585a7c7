//! Financial records owned by a user

use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::projection::{ProjectionInput, YearlyProjection, DEFAULT_INFLATION_RATE, DEFAULT_INVESTMENT_RETURN_RATE};

pub const DEFAULT_EDUCATION_TYPE: &str = "public";
pub const DEFAULT_RISK_LEVEL: &str = "medium";

/// Per-user planning parameters; rates in percent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialProfile {
    pub id: u64,
    pub user_id: u64,
    pub monthly_income: f64,
    pub monthly_expenses: f64,
    pub monthly_savings: f64,
    pub inflation_rate: f64,
    pub investment_return_rate: f64,
    /// public, private or international
    pub education_type: String,
    pub housing_cost: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FinancialProfile {
    /// Profile with default planning values; `id` is assigned by the store
    pub fn default_for(user_id: u64) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            user_id,
            monthly_income: 0.0,
            monthly_expenses: 0.0,
            monthly_savings: 0.0,
            inflation_rate: DEFAULT_INFLATION_RATE,
            investment_return_rate: DEFAULT_INVESTMENT_RETURN_RATE,
            education_type: DEFAULT_EDUCATION_TYPE.to_string(),
            housing_cost: 0.0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update and bump `updated_at`
    pub fn apply(&mut self, update: &ProfileUpdate) {
        if let Some(v) = update.monthly_income {
            self.monthly_income = v;
        }
        if let Some(v) = update.monthly_expenses {
            self.monthly_expenses = v;
        }
        if let Some(v) = update.monthly_savings {
            self.monthly_savings = v;
        }
        if let Some(v) = update.inflation_rate {
            self.inflation_rate = v;
        }
        if let Some(v) = update.investment_return_rate {
            self.investment_return_rate = v;
        }
        if let Some(v) = &update.education_type {
            self.education_type = v.clone();
        }
        if let Some(v) = update.housing_cost {
            self.housing_cost = v;
        }
        self.updated_at = Utc::now();
    }

    /// Projection parameters taken from this profile
    pub fn projection_input(&self, horizon_years: i64) -> ProjectionInput {
        ProjectionInput::new(
            horizon_years,
            self.monthly_income,
            self.monthly_expenses,
            self.monthly_savings,
            self.inflation_rate,
            self.investment_return_rate,
        )
    }
}

/// Partial profile update; `None` leaves the field untouched
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub monthly_income: Option<f64>,
    pub monthly_expenses: Option<f64>,
    pub monthly_savings: Option<f64>,
    pub inflation_rate: Option<f64>,
    pub investment_return_rate: Option<f64>,
    pub education_type: Option<String>,
    pub housing_cost: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyExpense {
    pub id: u64,
    pub user_id: u64,
    pub category: String,
    pub description: String,
    pub amount: f64,
    pub is_recurring: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewExpense {
    pub category: String,
    pub description: String,
    pub amount: f64,
    pub is_recurring: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ExpenseUpdate {
    pub category: Option<String>,
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub is_recurring: Option<bool>,
}

impl MonthlyExpense {
    pub fn apply(&mut self, update: &ExpenseUpdate) {
        if let Some(v) = &update.category {
            self.category = v.clone();
        }
        if let Some(v) = &update.description {
            self.description = v.clone();
        }
        if let Some(v) = update.amount {
            self.amount = v;
        }
        if let Some(v) = update.is_recurring {
            self.is_recurring = v;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Investment {
    pub id: u64,
    pub user_id: u64,
    /// stocks, bonds, savings, ...
    pub investment_type: String,
    pub name: String,
    pub amount: f64,
    pub expected_return: f64,
    /// low, medium or high
    pub risk_level: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewInvestment {
    pub investment_type: String,
    pub name: String,
    pub amount: f64,
    pub expected_return: f64,
    pub risk_level: String,
}

/// Third-party data provider key stored for a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiKey {
    pub id: u64,
    pub user_id: u64,
    pub key_name: String,
    pub api_key: String,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct NewApiKey {
    pub key_name: String,
    pub api_key: String,
}

/// Public form of an [`ApiKey`]; only the first 8 characters of the key are shown
#[derive(Debug, Clone, Serialize)]
pub struct ApiKeyView {
    pub id: u64,
    pub user_id: u64,
    pub key_name: String,
    pub api_key: String,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

impl ApiKey {
    pub fn view(&self) -> ApiKeyView {
        let prefix: String = self.api_key.chars().take(8).collect();
        ApiKeyView {
            id: self.id,
            user_id: self.user_id,
            key_name: self.key_name.clone(),
            api_key: format!("{}...", prefix),
            created_at: self.created_at,
            is_active: self.is_active,
        }
    }
}

/// Persisted projection run. `projection_data` is the JSON-encoded row sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowProjection {
    pub id: u64,
    pub user_id: u64,
    pub projection_name: String,
    pub projection_data: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProjection {
    pub projection_name: String,
    pub projection_data: String,
}

impl NewProjection {
    pub fn from_rows(projection_name: impl Into<String>, rows: &[YearlyProjection]) -> crate::error::Result<Self> {
        Ok(Self {
            projection_name: projection_name.into(),
            projection_data: serde_json::to_string(rows)?,
        })
    }
}

/// Public form of a [`CashFlowProjection`] with the rows decoded
#[derive(Debug, Clone, Serialize)]
pub struct ProjectionView {
    pub id: u64,
    pub user_id: u64,
    pub projection_name: String,
    pub projection_data: Vec<YearlyProjection>,
    pub created_at: DateTime<Utc>,
}

impl CashFlowProjection {
    /// Decoded rows; an undecodable blob yields an empty sequence
    pub fn rows(&self) -> Vec<YearlyProjection> {
        if self.projection_data.is_empty() {
            return Vec::new();
        }
        match serde_json::from_str(&self.projection_data) {
            Ok(rows) => rows,
            Err(e) => {
                warn!("Projection {} has unreadable data: {}", self.id, e);
                Vec::new()
            }
        }
    }

    pub fn view(&self) -> ProjectionView {
        ProjectionView {
            id: self.id,
            user_id: self.user_id,
            projection_name: self.projection_name.clone(),
            projection_data: self.rows(),
            created_at: self.created_at,
        }
    }
}
