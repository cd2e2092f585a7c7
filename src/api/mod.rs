//! Transport-independent HTTP API
//!
//! [`Api::handle`] maps an [`ApiRequest`] to an [`ApiResponse`]. The store and the
//! access-key verifier are injected, so the same router serves the Lambda adapter,
//! the CLI and the tests.

mod params;
mod auth_routes;
mod financial_routes;
mod market_routes;

pub use params::JsonBody;

use log::{error, info, warn};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::auth::{bearer_token, AuthVerifier, StoreAuthVerifier};
use crate::config::ServiceConfig;
use crate::error::{Error, Result};
use crate::records::User;
use crate::store::Store;

/// An HTTP request reduced to what the router needs
#[derive(Debug, Clone, Default)]
pub struct ApiRequest {
    pub method: String,
    pub path: String,
    pub query: HashMap<String, String>,
    /// Header names are stored lowercase
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
}

impl ApiRequest {
    pub fn new(method: &str, path: &str) -> Self {
        Self {
            method: method.to_uppercase(),
            path: path.to_string(),
            ..Default::default()
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_lowercase(), value.to_string());
        self
    }

    pub fn with_query(mut self, name: &str, value: &str) -> Self {
        self.query.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_json(mut self, body: &Value) -> Self {
        self.body = Some(body.to_string());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    fn json_body(&self) -> Result<JsonBody> {
        JsonBody::parse(self.body.as_deref())
    }
}

/// Status code plus JSON body
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    pub fn created(body: Value) -> Self {
        Self { status: 201, body }
    }

    pub fn error(status: u16, message: &str) -> Self {
        Self {
            status,
            body: json!({ "error": message }),
        }
    }

    fn from_error(err: &Error) -> Self {
        Self::error(err.status_code(), &err.to_string())
    }
}

/// Serialize a record for a response body
fn to_json<T: Serialize>(value: &T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

/// Request router with injected collaborators
pub struct Api {
    store: Arc<dyn Store>,
    verifier: Arc<dyn AuthVerifier>,
    config: ServiceConfig,
}

impl Api {
    pub fn new(store: Arc<dyn Store>, verifier: Arc<dyn AuthVerifier>, config: ServiceConfig) -> Self {
        Self { store, verifier, config }
    }

    /// Router authenticating against the access keys held in `store`
    pub fn with_store(store: Arc<dyn Store>, config: ServiceConfig) -> Self {
        let verifier = Arc::new(StoreAuthVerifier::new(store.clone()));
        Self::new(store, verifier, config)
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn handle(&self, request: &ApiRequest) -> ApiResponse {
        let response = match self.dispatch(request) {
            Ok(response) => response,
            Err(err) => {
                if err.status_code() >= 500 {
                    error!("{} {} failed: {}", request.method, request.path, err);
                } else {
                    warn!("{} {} rejected: {}", request.method, request.path, err);
                }
                ApiResponse::from_error(&err)
            }
        };

        info!("{} {} -> {}", request.method, request.path, response.status);
        response
    }

    /// Resolve the caller from the `Authorization` header
    fn authenticate(&self, request: &ApiRequest) -> Result<User> {
        let token = request
            .header("authorization")
            .and_then(bearer_token)
            .ok_or_else(|| Error::Unauthorized("Access key required".to_string()))?;
        self.verifier.verify(token)
    }

    fn dispatch(&self, request: &ApiRequest) -> Result<ApiResponse> {
        if request.method == "OPTIONS" {
            return Ok(ApiResponse::ok(json!({})));
        }

        let Some(rest) = request.path.strip_prefix(self.config.api_prefix.as_str()) else {
            return Ok(not_found());
        };
        let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
        let method = request.method.as_str();

        match segments.as_slice() {
            ["auth", "register"] => match method {
                "POST" => self.register(request),
                _ => Ok(method_not_allowed()),
            },
            ["auth", "login"] => match method {
                "POST" => self.login(request),
                _ => Ok(method_not_allowed()),
            },
            ["auth", "profile"] => match method {
                "GET" => self.get_account(&self.authenticate(request)?),
                "PUT" => self.update_account(&self.authenticate(request)?, request),
                _ => Ok(method_not_allowed()),
            },
            ["auth", "validate"] => match method {
                "GET" => self.validate_key(&self.authenticate(request)?),
                _ => Ok(method_not_allowed()),
            },

            ["financial", "profile"] => match method {
                "GET" => self.get_financial_profile(&self.authenticate(request)?),
                "PUT" => self.update_financial_profile(&self.authenticate(request)?, request),
                _ => Ok(method_not_allowed()),
            },
            ["financial", "expenses"] => match method {
                "GET" => self.list_expenses(&self.authenticate(request)?),
                "POST" => self.add_expense(&self.authenticate(request)?, request),
                _ => Ok(method_not_allowed()),
            },
            ["financial", "expenses", id] => {
                let Some(id) = parse_id(id) else { return Ok(not_found()) };
                match method {
                    "PUT" => self.update_expense(&self.authenticate(request)?, id, request),
                    "DELETE" => self.delete_expense(&self.authenticate(request)?, id),
                    _ => Ok(method_not_allowed()),
                }
            }
            ["financial", "investments"] => match method {
                "GET" => self.list_investments(&self.authenticate(request)?),
                "POST" => self.add_investment(&self.authenticate(request)?, request),
                _ => Ok(method_not_allowed()),
            },
            ["financial", "investments", id] => {
                let Some(id) = parse_id(id) else { return Ok(not_found()) };
                match method {
                    "DELETE" => self.delete_investment(&self.authenticate(request)?, id),
                    _ => Ok(method_not_allowed()),
                }
            }
            ["financial", "api-keys"] => match method {
                "GET" => self.list_api_keys(&self.authenticate(request)?),
                "POST" => self.add_api_key(&self.authenticate(request)?, request),
                _ => Ok(method_not_allowed()),
            },
            ["financial", "api-keys", id] => {
                let Some(id) = parse_id(id) else { return Ok(not_found()) };
                match method {
                    "DELETE" => self.delete_api_key(&self.authenticate(request)?, id),
                    _ => Ok(method_not_allowed()),
                }
            }
            ["financial", "projections", "cash-flow"] => match method {
                "POST" => self.calculate_cash_flow(&self.authenticate(request)?, request),
                _ => Ok(method_not_allowed()),
            },
            ["financial", "projections"] => match method {
                "GET" => self.list_projections(&self.authenticate(request)?),
                _ => Ok(method_not_allowed()),
            },
            ["financial", "projections", id] => {
                let Some(id) = parse_id(id) else { return Ok(not_found()) };
                match method {
                    "DELETE" => self.delete_projection(&self.authenticate(request)?, id),
                    _ => Ok(method_not_allowed()),
                }
            }

            ["market", "inflation"] => match method {
                "GET" => {
                    self.authenticate(request)?;
                    self.inflation(request)
                }
                _ => Ok(method_not_allowed()),
            },
            ["market", "interest-rates"] => match method {
                "GET" => {
                    self.authenticate(request)?;
                    self.interest_rates()
                }
                _ => Ok(method_not_allowed()),
            },
            ["market", "investments", "stocks"] => match method {
                "GET" => {
                    self.authenticate(request)?;
                    self.stocks(request)
                }
                _ => Ok(method_not_allowed()),
            },
            ["market", "investments", "indices"] => match method {
                "GET" => {
                    self.authenticate(request)?;
                    self.indices()
                }
                _ => Ok(method_not_allowed()),
            },
            ["market", "update-live-data"] => match method {
                "POST" => self.update_live_data(&self.authenticate(request)?),
                _ => Ok(method_not_allowed()),
            },
            ["market", "economic-indicators"] => match method {
                "GET" => {
                    self.authenticate(request)?;
                    self.economic_indicators()
                }
                _ => Ok(method_not_allowed()),
            },

            _ => Ok(not_found()),
        }
    }
}

fn parse_id(segment: &str) -> Option<u64> {
    segment.parse().ok()
}

fn not_found() -> ApiResponse {
    ApiResponse::error(404, "Not found")
}

fn method_not_allowed() -> ApiResponse {
    ApiResponse::error(405, "Method not allowed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    pub(crate) fn test_api() -> Api {
        Api::with_store(Arc::new(MemoryStore::new()), ServiceConfig::default())
    }

    /// Register a user and return its access key
    pub(crate) fn register(api: &Api, username: &str) -> String {
        let response = api.handle(&ApiRequest::new("POST", "/api/auth/register").with_json(&json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": "pw-123",
        })));
        assert_eq!(response.status, 201, "{}", response.body);
        response.body["user"]["access_key"].as_str().unwrap().to_string()
    }

    pub(crate) fn authed(method: &str, path: &str, key: &str) -> ApiRequest {
        ApiRequest::new(method, path).with_header("Authorization", &format!("Bearer {}", key))
    }

    #[test]
    fn test_unknown_route_is_404() {
        let api = test_api();
        assert_eq!(api.handle(&ApiRequest::new("GET", "/api/nothing")).status, 404);
        assert_eq!(api.handle(&ApiRequest::new("GET", "/elsewhere")).status, 404);
        assert_eq!(api.handle(&ApiRequest::new("DELETE", "/api/financial/expenses/abc")).status, 404);
    }

    #[test]
    fn test_wrong_method_is_405() {
        let api = test_api();
        assert_eq!(api.handle(&ApiRequest::new("GET", "/api/auth/register")).status, 405);
        assert_eq!(api.handle(&ApiRequest::new("POST", "/api/financial/projections")).status, 405);
    }

    #[test]
    fn test_options_preflight() {
        let api = test_api();
        assert_eq!(api.handle(&ApiRequest::new("OPTIONS", "/api/financial/profile")).status, 200);
    }

    #[test]
    fn test_missing_and_invalid_access_key() {
        let api = test_api();

        let response = api.handle(&ApiRequest::new("GET", "/api/financial/profile"));
        assert_eq!(response.status, 401);
        assert_eq!(response.body["error"], "Access key required");

        let response = api.handle(&authed("GET", "/api/financial/profile", "bogus"));
        assert_eq!(response.status, 401);
        assert_eq!(response.body["error"], "Invalid access key");
    }

    #[test]
    fn test_bare_access_key_header_accepted() {
        let api = test_api();
        let key = register(&api, "ana");
        let request = ApiRequest::new("GET", "/api/auth/validate").with_header("authorization", &key);
        let response = api.handle(&request);
        assert_eq!(response.status, 200);
        assert_eq!(response.body["valid"], true);
    }

    #[test]
    fn test_custom_prefix() {
        let config = ServiceConfig {
            api_prefix: "/v2".to_string(),
            ..Default::default()
        };
        let api = Api::with_store(Arc::new(MemoryStore::new()), config);
        assert_eq!(api.handle(&ApiRequest::new("POST", "/v2/auth/login")).status, 400);
        assert_eq!(api.handle(&ApiRequest::new("POST", "/api/auth/login")).status, 404);
    }
}
