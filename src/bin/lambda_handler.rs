//! AWS Lambda handler serving the HTTP API
//!
//! Accepts Lambda Function URL events, routes them through [`Api`] and returns
//! Function URL responses with permissive CORS headers.
//!
//! Configuration comes from `CASHFLOW_*` environment variables; set
//! `CASHFLOW_DATA_PATH` to persist the store as a JSON snapshot.

use aws_lambda_events::event::lambda_function_urls::LambdaFunctionUrlRequest;
use cashflow_planner::{Api, ApiRequest, ApiResponse, MemoryStore, ServiceConfig, Store};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use log::info;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Function URL response payload
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionUrlResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
    pub is_base64_encoded: bool,
}

impl From<ApiResponse> for FunctionUrlResponse {
    fn from(response: ApiResponse) -> Self {
        let headers = [
            ("Content-Type", "application/json"),
            ("Access-Control-Allow-Origin", "*"),
            ("Access-Control-Allow-Methods", "GET, POST, PUT, DELETE, OPTIONS"),
            ("Access-Control-Allow-Headers", "Content-Type, Authorization"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            status_code: response.status,
            headers,
            body: response.body.to_string(),
            is_base64_encoded: false,
        }
    }
}

/// Reduce a Function URL event to a router request
fn to_api_request(event: &LambdaFunctionUrlRequest) -> ApiRequest {
    let method = event.request_context.http.method.as_deref().unwrap_or("GET");
    let path = event
        .raw_path
        .as_deref()
        .or(event.request_context.http.path.as_deref())
        .unwrap_or("/");

    let mut request = ApiRequest::new(method, path);
    for (name, value) in event.headers.iter() {
        if let Ok(value) = value.to_str() {
            request = request.with_header(name.as_str(), value);
        }
    }
    for (name, value) in &event.query_string_parameters {
        request = request.with_query(name, value);
    }
    request.body = event.body.clone();
    request
}

fn handle_event(api: &Api, event: &LambdaFunctionUrlRequest) -> FunctionUrlResponse {
    if event.is_base64_encoded {
        return ApiResponse::error(400, "Binary request bodies are not supported").into();
    }
    api.handle(&to_api_request(event)).into()
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();

    let config = ServiceConfig::from_env()?;
    let store: Arc<dyn Store> = match &config.data_path {
        Some(path) => {
            info!("Using store snapshot at {}", path.display());
            Arc::new(MemoryStore::open(path)?)
        }
        None => Arc::new(MemoryStore::new()),
    };
    let api = Arc::new(Api::with_store(store, config));

    run(service_fn(move |event: LambdaEvent<LambdaFunctionUrlRequest>| {
        let api = api.clone();
        async move { Ok::<_, Error>(handle_event(&api, &event.payload)) }
    }))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn event(method: &str, path: &str, headers: Value, body: Option<&str>) -> LambdaFunctionUrlRequest {
        serde_json::from_value(json!({
            "version": "2.0",
            "rawPath": path,
            "rawQueryString": "",
            "headers": headers,
            "queryStringParameters": {},
            "requestContext": {
                "accountId": "anonymous",
                "apiId": "abc123",
                "domainName": "abc123.lambda-url.us-east-1.on.aws",
                "domainPrefix": "abc123",
                "requestId": "req-1",
                "time": "16/Oct/2026:12:00:00 +0000",
                "timeEpoch": 1792152000000i64,
                "http": {
                    "method": method,
                    "path": path,
                    "protocol": "HTTP/1.1",
                    "sourceIp": "127.0.0.1",
                    "userAgent": "test"
                }
            },
            "body": body,
            "isBase64Encoded": false
        }))
        .unwrap()
    }

    fn test_api() -> Api {
        Api::with_store(Arc::new(MemoryStore::new()), ServiceConfig::default())
    }

    #[test]
    fn test_event_conversion() {
        let e = event("post", "/api/auth/login", json!({"Authorization": "Bearer k", "x-other": "1"}), Some("{}"));
        let request = to_api_request(&e);
        assert_eq!(request.method, "POST");
        assert_eq!(request.path, "/api/auth/login");
        assert_eq!(request.header("authorization"), Some("Bearer k"));
        assert_eq!(request.body.as_deref(), Some("{}"));
    }

    #[test]
    fn test_register_through_function_url() {
        let api = test_api();
        let body = r#"{"username":"ana","email":"ana@example.com","password":"pw"}"#;
        let response = handle_event(&api, &event("POST", "/api/auth/register", json!({}), Some(body)));

        assert_eq!(response.status_code, 201);
        assert_eq!(response.headers["Access-Control-Allow-Origin"], "*");
        let parsed: Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(parsed["user"]["username"], "ana");
    }

    #[test]
    fn test_response_uses_function_url_field_names() {
        let response: FunctionUrlResponse = ApiResponse::error(404, "Not found").into();
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["statusCode"], 404);
        assert_eq!(json["isBase64Encoded"], false);
        assert_eq!(json["body"], r#"{"error":"Not found"}"#);
    }
}
