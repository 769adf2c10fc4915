use serde_json::json;

use crate::ipc::error::{ok, HandlerErr, HandlerResult};
use crate::ipc::helpers::{get_optional_id, get_required_id, parse_body, parse_patch};
use crate::ipc::types::{AppState, Request};
use crate::model::{ClassPatch, InsertClass};

fn list(state: &AppState, params: &serde_json::Value) -> HandlerResult {
    let course_id = get_optional_id(params, "courseId")?;
    Ok(json!({ "classes": state.store.classes(course_id) }))
}

fn get(state: &AppState, params: &serde_json::Value) -> HandlerResult {
    let id = get_required_id(params, "classId")?;
    let class = state
        .store
        .class(id)
        .ok_or_else(|| HandlerErr::not_found("class not found"))?;
    Ok(json!({ "class": class }))
}

fn create(state: &mut AppState, params: &serde_json::Value) -> HandlerResult {
    let input: InsertClass = parse_body(params)?;
    if !state.store.has_course(input.course_id) {
        return Err(HandlerErr::not_found("course not found"));
    }
    let class = state.store.create_class(input);
    Ok(json!({ "class": class }))
}

fn update(state: &mut AppState, params: &serde_json::Value) -> HandlerResult {
    let id = get_required_id(params, "classId")?;
    let patch: ClassPatch = parse_patch(params)?;
    if let Some(course_id) = patch.course_id {
        if !state.store.has_course(course_id) {
            return Err(HandlerErr::not_found("course not found"));
        }
    }
    let class = state
        .store
        .update_class(id, patch)
        .ok_or_else(|| HandlerErr::not_found("class not found"))?;
    Ok(json!({ "class": class }))
}

fn delete(state: &mut AppState, params: &serde_json::Value) -> HandlerResult {
    let id = get_required_id(params, "classId")?;
    Ok(json!({ "deleted": state.store.delete_class(id) }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "classes.list" => list(state, &req.params),
        "classes.get" => get(state, &req.params),
        "classes.create" => create(state, &req.params),
        "classes.update" => update(state, &req.params),
        "classes.delete" => delete(state, &req.params),
        _ => return None,
    };
    Some(match result {
        Ok(value) => ok(&req.id, value),
        Err(e) => e.response(&req.id),
    })
}
