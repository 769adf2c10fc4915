use super::error::err;
use super::helpers;
use super::handlers;
use super::types::{AppState, Request};

pub fn handle_request(state: &mut AppState, req: Request) -> serde_json::Value {
    // ping and auth.* are the only methods served without a session.
    if let Some(resp) = handlers::core::try_handle(state, &req) {
        return resp;
    }

    let session = match helpers::session_for(state, &req) {
        Ok(s) => s,
        Err(e) => return e.response(&req.id),
    };

    if let Some(resp) = handlers::school_years::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::courses::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::classes::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::students::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::enrollments::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::attendance::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::payments::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::users::try_handle(state, &session, &req) {
        return resp;
    }

    tracing::debug!(method = %req.method, "unknown method");
    err(
        &req.id,
        "not_implemented",
        format!("unknown method: {}", req.method),
        None,
    )
}
