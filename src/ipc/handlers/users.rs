use serde_json::json;

use crate::ipc::error::{ok, HandlerErr, HandlerResult};
use crate::ipc::helpers::{parse_body, user_json};
use crate::ipc::types::{AppState, Request, Session};
use crate::model::InsertUser;

fn require_admin(session: &Session) -> Result<(), HandlerErr> {
    if session.is_admin {
        Ok(())
    } else {
        Err(HandlerErr::forbidden("admin session required"))
    }
}

fn list(state: &AppState, session: &Session) -> HandlerResult {
    require_admin(session)?;
    let users: Vec<serde_json::Value> = state.store.users().iter().map(user_json).collect();
    Ok(json!({ "users": users }))
}

fn create(state: &mut AppState, session: &Session, params: &serde_json::Value) -> HandlerResult {
    require_admin(session)?;
    let input: InsertUser = parse_body(params)?;
    if input.username.trim().is_empty() || input.password.is_empty() {
        return Err(HandlerErr::bad_params("username and password must not be empty"));
    }
    if state.store.user_by_username(&input.username).is_some() {
        return Err(HandlerErr::conflict("username already exists"));
    }
    let user = state.store.create_user(input);
    tracing::info!(username = %user.username, is_admin = user.is_admin, "user created");
    Ok(json!({ "user": user_json(&user) }))
}

pub fn try_handle(
    state: &mut AppState,
    session: &Session,
    req: &Request,
) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "users.list" => list(state, session),
        "users.create" => create(state, session, &req.params),
        _ => return None,
    };
    Some(match result {
        Ok(value) => ok(&req.id, value),
        Err(e) => e.response(&req.id),
    })
}
