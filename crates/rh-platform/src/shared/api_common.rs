//! Common API types and utilities

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::outcome::StepReport;

/// Query values arrive as strings from the browser client; accept either.
pub(crate) mod string_or_number {
    use serde::{de, Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNum<N> {
        Num(N),
        Str(String),
    }

    pub fn deserialize_u32_opt<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<StringOrNum<u32>>::deserialize(deserializer)? {
            Some(StringOrNum::Num(n)) => Ok(Some(n)),
            Some(StringOrNum::Str(s)) if s.trim().is_empty() => Ok(None),
            Some(StringOrNum::Str(s)) => s.trim().parse().map(Some).map_err(de::Error::custom),
            None => Ok(None),
        }
    }

    pub fn deserialize_f64_opt<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<StringOrNum<f64>>::deserialize(deserializer)? {
            Some(StringOrNum::Num(n)) => Ok(Some(n)),
            Some(StringOrNum::Str(s)) if s.trim().is_empty() => Ok(None),
            Some(StringOrNum::Str(s)) => s.trim().parse().map(Some).map_err(de::Error::custom),
            None => Ok(None),
        }
    }
}

/// Standard API error response
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiError {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Message plus the ordered writes of a compound operation
#[derive(Debug, Serialize, ToSchema)]
pub struct StepsResponse {
    pub message: String,
    pub steps: Vec<StepReport>,
}

/// Result of a single-document write
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WriteResponse {
    pub acknowledged: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_count: Option<u64>,
}

impl WriteResponse {
    pub fn modified(count: u64) -> Self {
        Self { acknowledged: true, modified_count: Some(count), deleted_count: None }
    }

    pub fn deleted(count: u64) -> Self {
        Self { acknowledged: true, modified_count: None, deleted_count: Some(count) }
    }
}

/// `?email=` filter used by the per-user list endpoints
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EmailQuery {
    /// Defaults to the caller's own email
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Params {
        #[serde(default, deserialize_with = "string_or_number::deserialize_u32_opt")]
        page: Option<u32>,
        #[serde(default, deserialize_with = "string_or_number::deserialize_f64_opt")]
        price: Option<f64>,
    }

    #[test]
    fn test_string_or_number() {
        let p: Params = serde_json::from_str(r#"{"page": "3", "price": 12.5}"#).unwrap();
        assert_eq!(p.page, Some(3));
        assert_eq!(p.price, Some(12.5));

        let p: Params = serde_json::from_str(r#"{"page": 2, "price": "100"}"#).unwrap();
        assert_eq!(p.page, Some(2));
        assert_eq!(p.price, Some(100.0));

        let p: Params = serde_json::from_str(r#"{"page": ""}"#).unwrap();
        assert_eq!(p.page, None);
        assert_eq!(p.price, None);
    }
}
