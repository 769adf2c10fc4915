use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde_json::json;

use super::error::HandlerErr;
use super::types::{AppState, Request, Session};
use crate::model::{parse_flexible_datetime, Id, User};

pub fn get_required_str(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

pub fn get_required_id(params: &serde_json::Value, key: &str) -> Result<Id, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

pub fn get_optional_id(params: &serde_json::Value, key: &str) -> Result<Option<Id>, HandlerErr> {
    match params.get(key) {
        None => Ok(None),
        Some(v) if v.is_null() => Ok(None),
        Some(v) => v
            .as_i64()
            .map(Some)
            .ok_or_else(|| HandlerErr::bad_params(format!("{} must be an integer id", key))),
    }
}

/// Calendar-day filter parameter. Accepts YYYY-MM-DD or a full timestamp;
/// only the day part is kept either way.
pub fn get_optional_day(
    params: &serde_json::Value,
    key: &str,
) -> Result<Option<NaiveDate>, HandlerErr> {
    match params.get(key) {
        None => Ok(None),
        Some(v) if v.is_null() => Ok(None),
        Some(v) => {
            let s = v
                .as_str()
                .ok_or_else(|| HandlerErr::bad_params(format!("{} must be a date string", key)))?;
            parse_flexible_datetime(s)
                .map(|dt| Some(dt.date_naive()))
                .ok_or_else(|| {
                    HandlerErr::bad_params(format!("{} must be YYYY-MM-DD or RFC 3339", key))
                })
        }
    }
}

/// Deserializes the whole params object into a typed payload. Unknown keys
/// (the token, for one) are ignored by serde.
pub fn parse_body<T: DeserializeOwned>(params: &serde_json::Value) -> Result<T, HandlerErr> {
    serde_json::from_value(params.clone()).map_err(|e| HandlerErr::bad_params(e.to_string()))
}

/// Deserializes one named field of the params object.
pub fn parse_field<T: DeserializeOwned>(
    params: &serde_json::Value,
    key: &str,
) -> Result<T, HandlerErr> {
    let value = params
        .get(key)
        .cloned()
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))?;
    serde_json::from_value(value)
        .map_err(|e| HandlerErr::bad_params(format!("{}: {}", key, e)))
}

/// The `patch` object of an update call.
pub fn parse_patch<T: DeserializeOwned>(params: &serde_json::Value) -> Result<T, HandlerErr> {
    let patch = params
        .get("patch")
        .cloned()
        .ok_or_else(|| HandlerErr::bad_params("missing patch"))?;
    if !patch.is_object() {
        return Err(HandlerErr::bad_params("patch must be an object"));
    }
    serde_json::from_value(patch).map_err(|e| HandlerErr::bad_params(format!("patch: {}", e)))
}

/// Resolves the `token` param to a live session.
pub fn session_for(state: &AppState, req: &Request) -> Result<Session, HandlerErr> {
    let token = req
        .params
        .get("token")
        .and_then(|v| v.as_str())
        .ok_or_else(|| HandlerErr::unauthorized("missing token"))?;
    state
        .sessions
        .get(token)
        .cloned()
        .ok_or_else(|| HandlerErr::unauthorized("invalid or expired token"))
}

/// Wire shape of a user. The stored password never leaves the daemon.
pub fn user_json(user: &User) -> serde_json::Value {
    json!({
        "id": user.id,
        "username": user.username,
        "displayName": user.display_name,
        "isAdmin": user.is_admin,
        "createdAt": user.created_at,
    })
}
