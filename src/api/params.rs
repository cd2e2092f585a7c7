//! Request body coercion
//!
//! Numeric fields accept JSON numbers or numeric strings. `null` is treated
//! as an absent field.

use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// A JSON object request body
#[derive(Debug, Clone, Default)]
pub struct JsonBody {
    fields: Map<String, Value>,
}

impl JsonBody {
    /// Parse a raw body; a missing or blank body is an empty object
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        let raw = raw.map(str::trim).unwrap_or("");
        if raw.is_empty() {
            return Ok(Self::default());
        }

        match serde_json::from_str::<Value>(raw)? {
            Value::Object(fields) => Ok(Self { fields }),
            _ => Err(Error::validation("Request body must be a JSON object")),
        }
    }

    fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|v| !v.is_null())
    }

    pub fn opt_f64(&self, key: &str) -> Result<Option<f64>> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };

        let number = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };

        match number {
            Some(n) if n.is_finite() => Ok(Some(n)),
            _ => Err(Error::validation(format!("{} must be a number", key))),
        }
    }

    pub fn req_f64(&self, key: &str) -> Result<f64> {
        self.opt_f64(key)?.ok_or_else(|| missing(key))
    }

    pub fn opt_i64(&self, key: &str) -> Result<Option<i64>> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };

        let number = match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };

        number
            .map(Some)
            .ok_or_else(|| Error::validation(format!("{} must be an integer", key)))
    }

    pub fn opt_str(&self, key: &str) -> Result<Option<String>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(Error::validation(format!("{} must be a string", key))),
        }
    }

    pub fn req_str(&self, key: &str) -> Result<String> {
        self.opt_str(key)?.ok_or_else(|| missing(key))
    }

    /// String field that must be present and non-blank
    pub fn non_empty_str(&self, key: &str) -> Option<String> {
        match self.get(key) {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
            _ => None,
        }
    }

    pub fn opt_bool(&self, key: &str) -> Result<Option<bool>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(_) => Err(Error::validation(format!("{} must be a boolean", key))),
        }
    }
}

fn missing(key: &str) -> Error {
    Error::validation(format!("{} is required", key))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(raw: &str) -> JsonBody {
        JsonBody::parse(Some(raw)).unwrap()
    }

    #[test]
    fn test_empty_body_is_empty_object() {
        assert_eq!(JsonBody::parse(None).unwrap().opt_str("x").unwrap(), None);
        assert_eq!(JsonBody::parse(Some("  ")).unwrap().opt_f64("x").unwrap(), None);
    }

    #[test]
    fn test_non_object_body_rejected() {
        assert!(matches!(JsonBody::parse(Some("[1,2]")), Err(Error::Validation(_))));
        assert!(matches!(JsonBody::parse(Some("{oops")), Err(Error::Json(_))));
    }

    #[test]
    fn test_numbers_and_numeric_strings() {
        let b = body(r#"{"a": 12.5, "b": "7", "c": "x", "d": null, "e": true}"#);
        assert_eq!(b.opt_f64("a").unwrap(), Some(12.5));
        assert_eq!(b.opt_f64("b").unwrap(), Some(7.0));
        assert!(b.opt_f64("c").is_err());
        assert_eq!(b.opt_f64("d").unwrap(), None);
        assert!(b.opt_f64("e").is_err());
        assert_eq!(b.opt_f64("missing").unwrap(), None);
        assert!(b.req_f64("missing").is_err());
    }

    #[test]
    fn test_non_finite_strings_rejected() {
        let b = body(r#"{"a": "NaN", "b": "inf"}"#);
        assert!(b.opt_f64("a").is_err());
        assert!(b.opt_f64("b").is_err());
    }

    #[test]
    fn test_integers() {
        let b = body(r#"{"years": 15, "text": "20", "frac": 2.5}"#);
        assert_eq!(b.opt_i64("years").unwrap(), Some(15));
        assert_eq!(b.opt_i64("text").unwrap(), Some(20));
        assert!(b.opt_i64("frac").is_err());
    }

    #[test]
    fn test_strings_and_bools() {
        let b = body(r#"{"name": "x", "blank": "  ", "n": 3, "flag": false}"#);
        assert_eq!(b.req_str("name").unwrap(), "x");
        assert!(b.opt_str("n").is_err());
        assert_eq!(b.non_empty_str("blank"), None);
        assert_eq!(b.opt_bool("flag").unwrap(), Some(false));
        assert!(b.opt_bool("n").is_err());
    }
}
