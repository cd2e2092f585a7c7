//! Registration, login and account routes

use log::info;
use serde_json::json;

use super::{to_json, Api, ApiRequest, ApiResponse};
use crate::auth::{generate_access_key, hash_password, verify_password};
use crate::error::{Error, Result};
use crate::records::{NewUser, User};

impl Api {
    pub(super) fn register(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let body = request.json_body()?;

        let (Some(username), Some(email), Some(password)) = (
            body.non_empty_str("username"),
            body.non_empty_str("email"),
            body.non_empty_str("password"),
        ) else {
            return Err(Error::validation("Username, email and password are required"));
        };

        if self.store.find_user_by_username(&username)?.is_some() {
            return Err(Error::Conflict("Username already exists".to_string()));
        }
        if self.store.find_user_by_email(&email)?.is_some() {
            return Err(Error::Conflict("Email already exists".to_string()));
        }

        // Creates the default financial profile in the same write
        let user = self.store.insert_user(NewUser {
            username,
            email,
            password: hash_password(&password),
            access_key: generate_access_key(),
        })?;

        info!("Registered user {} ({})", user.id, user.username);
        Ok(ApiResponse::created(json!({
            "message": "User created successfully",
            "user": to_json(&user.view())?,
        })))
    }

    pub(super) fn login(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let body = request.json_body()?;

        let (Some(username), Some(password)) = (body.non_empty_str("username"), body.non_empty_str("password")) else {
            return Err(Error::validation("Username and password are required"));
        };

        let user = match self.store.find_user_by_username(&username)? {
            Some(user) if verify_password(&password, &user.password) => user,
            _ => return Err(Error::Unauthorized("Invalid credentials".to_string())),
        };
        if !user.is_active {
            return Err(Error::Unauthorized("Account is inactive".to_string()));
        }

        Ok(ApiResponse::ok(json!({
            "message": "Login successful",
            "access_key": user.access_key,
            "user": to_json(&user.view())?,
        })))
    }

    pub(super) fn get_account(&self, user: &User) -> Result<ApiResponse> {
        let profile = self.store.get_profile(user.id)?;
        Ok(ApiResponse::ok(json!({
            "user": to_json(&user.view())?,
            "financial_profile": to_json(&profile)?,
        })))
    }

    pub(super) fn update_account(&self, user: &User, request: &ApiRequest) -> Result<ApiResponse> {
        let body = request.json_body()?;
        let mut updated = user.clone();

        if let Some(email) = body.opt_str("email")? {
            if email.trim().is_empty() {
                return Err(Error::validation("Email cannot be empty"));
            }
            if let Some(existing) = self.store.find_user_by_email(&email)? {
                if existing.id != user.id {
                    return Err(Error::Conflict("Email already exists".to_string()));
                }
            }
            updated.email = email;
        }

        if let Some(password) = body.opt_str("password")? {
            if password.trim().is_empty() {
                return Err(Error::validation("Password cannot be empty"));
            }
            updated.password = hash_password(&password);
        }

        let updated = self.store.update_user(updated)?;
        Ok(ApiResponse::ok(json!({
            "message": "Profile updated successfully",
            "user": to_json(&updated.view())?,
        })))
    }

    pub(super) fn validate_key(&self, user: &User) -> Result<ApiResponse> {
        Ok(ApiResponse::ok(json!({
            "valid": true,
            "user": to_json(&user.view())?,
        })))
    }
}
