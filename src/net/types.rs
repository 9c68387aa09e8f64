//! Wire DTOs for the activity backend REST API.
//!
//! DESIGN
//! ======
//! Only fields the client acts on are typed. Everything else the backend
//! sends is kept in a flattened `extra` map so callers that print or forward
//! records lose nothing. Numeric identifiers accept JSON integers, integral
//! floats, and numeric strings, since backends are inconsistent about them.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// `POST /auth/login` request body.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// `POST /auth/login` success body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub user_id: i64,
    pub user_name: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub role_id: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An activity listed by `GET /activities`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// Start time as sent by the backend (ISO-8601 string).
    #[serde(default)]
    pub starts_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A notice about an activity the user follows, from `GET /notices`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: i64,
    pub message: String,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub activity_id: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The authenticated user's profile from `GET /users/me`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub role_id: Option<i64>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `PUT /users/me` body. Absent fields are left unchanged by the backend.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// `PUT /users/me/password` body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

/// `POST /users/me/interests/:id` body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterestRequest {
    pub activity_id: i64,
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    id_from_value(&value).map_err(D::Error::custom)
}

fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    id_from_value(&value).map(Some).map_err(D::Error::custom)
}

fn id_from_value(value: &Value) -> Result<i64, String> {
    match value {
        Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                return Ok(int);
            }
            #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
            if let Some(float) = number.as_f64()
                && float.is_finite()
                && float.fract() == 0.0
                && float >= i64::MIN as f64
                && float <= i64::MAX as f64
            {
                return Ok(float as i64);
            }
            Err("expected integer-compatible number".to_owned())
        }
        Value::String(raw) => raw.trim().parse::<i64>().map_err(|_| format!("expected numeric id, got {raw:?}")),
        _ => Err("expected number or numeric string".to_owned()),
    }
}
