use serde_json::json;
use uuid::Uuid;

use crate::ipc::error::{ok, HandlerErr, HandlerResult};
use crate::ipc::helpers::{get_required_str, session_for, user_json};
use crate::ipc::types::{AppState, Request, Session};

fn login(state: &mut AppState, params: &serde_json::Value) -> HandlerResult {
    let username = get_required_str(params, "username")?;
    let password = get_required_str(params, "password")?;

    let Some(user) = state.store.user_by_username(&username) else {
        tracing::warn!(%username, "login rejected: unknown user");
        return Err(HandlerErr::unauthorized("invalid credentials"));
    };
    // Plaintext comparison, faithful to the system being replaced.
    if user.password != password {
        tracing::warn!(%username, "login rejected: wrong password");
        return Err(HandlerErr::unauthorized("invalid credentials"));
    }

    let token = Uuid::new_v4().to_string();
    state.sessions.insert(
        token.clone(),
        Session {
            user_id: user.id,
            is_admin: user.is_admin,
        },
    );
    tracing::info!(%username, user_id = user.id, "login ok");
    Ok(json!({
        "token": token,
        "user": user_json(&user),
    }))
}

fn logout(state: &mut AppState, params: &serde_json::Value) -> HandlerResult {
    let token = get_required_str(params, "token")?;
    let removed = state.sessions.remove(&token).is_some();
    Ok(json!({ "loggedOut": removed }))
}

fn me(state: &AppState, req: &Request) -> HandlerResult {
    let session = session_for(state, req)?;
    let user = state
        .store
        .user(session.user_id)
        .ok_or_else(|| HandlerErr::not_found("user no longer exists"))?;
    Ok(json!({ "user": user_json(&user) }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "ping" => Ok(json!({ "pong": true })),
        "auth.login" => login(state, &req.params),
        "auth.logout" => logout(state, &req.params),
        "auth.me" => me(state, req),
        _ => return None,
    };
    Some(match result {
        Ok(value) => ok(&req.id, value),
        Err(e) => e.response(&req.id),
    })
}
