//! Market reference data routes

use chrono::Utc;
use log::info;
use serde_json::json;

use super::{to_json, Api, ApiRequest, ApiResponse};
use crate::error::{Error, Result};
use crate::market::{self, ECONOMIC_INDICATORS, INDICES, INTEREST_RATES, MOCK_SOURCE};
use crate::records::User;

const DEFAULT_COUNTRY: &str = "brazil";

impl Api {
    pub(super) fn inflation(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let country = request.query.get("country").map(String::as_str).unwrap_or(DEFAULT_COUNTRY);
        let data = market::inflation_for(country).ok_or_else(|| Error::not_found("Country not supported"))?;

        Ok(ApiResponse::ok(json!({
            "country": country,
            "data": to_json(data)?,
            "source": MOCK_SOURCE,
        })))
    }

    pub(super) fn interest_rates(&self) -> Result<ApiResponse> {
        Ok(ApiResponse::ok(json!({
            "data": to_json(&INTEREST_RATES)?,
            "source": MOCK_SOURCE,
            "last_updated": Utc::now().to_rfc3339(),
        })))
    }

    pub(super) fn stocks(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let symbols: Vec<&str> = request
            .query
            .get("symbols")
            .map(|s| s.split(',').map(str::trim).filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();

        Ok(ApiResponse::ok(json!({
            "stocks": to_json(&market::stocks_matching(&symbols))?,
            "source": MOCK_SOURCE,
        })))
    }

    pub(super) fn indices(&self) -> Result<ApiResponse> {
        Ok(ApiResponse::ok(json!({
            "indices": to_json(&INDICES)?,
            "source": MOCK_SOURCE,
            "last_updated": Utc::now().to_rfc3339(),
        })))
    }

    /// Refresh market data for a user with at least one provider key.
    ///
    /// No provider is contacted; the refreshed payload is the static data set.
    pub(super) fn update_live_data(&self, user: &User) -> Result<ApiResponse> {
        if self.store.list_api_keys(user.id)?.is_empty() {
            return Ok(ApiResponse {
                status: 400,
                body: json!({
                    "error": "No API keys configured. Please add API keys first.",
                    "suggestion": "Add API keys for brapi.dev or other financial data providers",
                }),
            });
        }

        info!("User {} requested a market data refresh", user.id);
        Ok(ApiResponse::ok(json!({
            "message": "Live data updated successfully",
            "data": {
                "inflation": to_json(&market::inflation_by_country())?,
                "interest_rates": to_json(&INTEREST_RATES)?,
                "investments": {
                    "stocks": to_json(&market::stocks_matching(&[]))?,
                    "indices": to_json(&INDICES)?,
                },
                "last_updated": Utc::now().to_rfc3339(),
                "status": "updated_with_mock_data",
            },
        })))
    }

    pub(super) fn economic_indicators(&self) -> Result<ApiResponse> {
        let mut indicators = to_json(&ECONOMIC_INDICATORS)?;
        if let Some(fields) = indicators.as_object_mut() {
            fields.insert("last_updated".to_string(), json!(Utc::now().to_rfc3339()));
        }

        Ok(ApiResponse::ok(json!({
            "indicators": indicators,
            "source": MOCK_SOURCE,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{authed, register, test_api};
    use super::super::ApiRequest;
    use serde_json::json;

    #[test]
    fn test_market_routes_require_access_key() {
        let api = test_api();
        for path in [
            "/api/market/inflation",
            "/api/market/interest-rates",
            "/api/market/investments/stocks",
            "/api/market/investments/indices",
            "/api/market/economic-indicators",
        ] {
            assert_eq!(api.handle(&ApiRequest::new("GET", path)).status, 401, "{}", path);
        }
    }

    #[test]
    fn test_inflation_by_country() {
        let api = test_api();
        let key = register(&api, "ana");

        let response = api.handle(&authed("GET", "/api/market/inflation", &key));
        assert_eq!(response.status, 200);
        assert_eq!(response.body["country"], "brazil");
        assert_eq!(response.body["data"]["current_rate"], 4.62);
        assert_eq!(response.body["source"], "mock_data");

        let response = api.handle(&authed("GET", "/api/market/inflation", &key).with_query("country", "Brazil"));
        assert_eq!(response.status, 200);

        let response = api.handle(&authed("GET", "/api/market/inflation", &key).with_query("country", "atlantis"));
        assert_eq!(response.status, 404);
        assert_eq!(response.body["error"], "Country not supported");
    }

    #[test]
    fn test_rates_indices_and_indicators() {
        let api = test_api();
        let key = register(&api, "ana");

        let rates = api.handle(&authed("GET", "/api/market/interest-rates", &key));
        assert_eq!(rates.body["data"]["selic"]["current_rate"], 10.75);
        assert!(rates.body["last_updated"].is_string());

        let indices = api.handle(&authed("GET", "/api/market/investments/indices", &key));
        assert_eq!(indices.body["indices"][0]["name"], "IBOVESPA");
        assert!(indices.body["last_updated"].is_string());

        let indicators = api.handle(&authed("GET", "/api/market/economic-indicators", &key));
        assert_eq!(indicators.body["indicators"]["commodity_prices"]["gold"], 1987.32);
        assert!(indicators.body["indicators"]["last_updated"].is_string());
    }

    #[test]
    fn test_stock_symbol_filter() {
        let api = test_api();
        let key = register(&api, "ana");

        let all = api.handle(&authed("GET", "/api/market/investments/stocks", &key));
        assert_eq!(all.body["stocks"].as_array().unwrap().len(), 4);

        let some = api.handle(
            &authed("GET", "/api/market/investments/stocks", &key).with_query("symbols", "VALE3, ITUB4"),
        );
        let symbols: Vec<_> = some.body["stocks"]
            .as_array()
            .unwrap()
            .iter()
            .map(|q| q["symbol"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(symbols, vec!["VALE3", "ITUB4"]);
    }

    #[test]
    fn test_update_live_data_needs_a_provider_key() {
        let api = test_api();
        let key = register(&api, "ana");

        let response = api.handle(&authed("POST", "/api/market/update-live-data", &key));
        assert_eq!(response.status, 400);
        assert_eq!(response.body["error"], "No API keys configured. Please add API keys first.");
        assert!(response.body["suggestion"].is_string());

        api.handle(&authed("POST", "/api/financial/api-keys", &key).with_json(&json!({
            "key_name": "brapi",
            "api_key": "0123456789abcdef",
        })));

        let response = api.handle(&authed("POST", "/api/market/update-live-data", &key));
        assert_eq!(response.status, 200);
        assert_eq!(response.body["message"], "Live data updated successfully");
        assert_eq!(response.body["data"]["status"], "updated_with_mock_data");
        assert_eq!(response.body["data"]["inflation"]["brazil"]["target"], 3.0);
        assert_eq!(response.body["data"]["investments"]["stocks"][0]["symbol"], "PETR4");
    }
}
