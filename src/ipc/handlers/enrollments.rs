use serde_json::json;

use crate::ipc::error::{ok, HandlerErr, HandlerResult};
use crate::ipc::helpers::{get_optional_id, get_required_id, parse_body, parse_patch};
use crate::ipc::types::{AppState, Request};
use crate::model::{EnrollmentPatch, InsertEnrollment};

fn list(state: &AppState, params: &serde_json::Value) -> HandlerResult {
    let student_id = get_optional_id(params, "studentId")?;
    let class_id = get_optional_id(params, "classId")?;
    Ok(json!({ "enrollments": state.store.enrollments(student_id, class_id) }))
}

fn get(state: &AppState, params: &serde_json::Value) -> HandlerResult {
    let id = get_required_id(params, "enrollmentId")?;
    let enrollment = state
        .store
        .enrollment(id)
        .ok_or_else(|| HandlerErr::not_found("enrollment not found"))?;
    Ok(json!({ "enrollment": enrollment }))
}

fn create(state: &mut AppState, params: &serde_json::Value) -> HandlerResult {
    let input: InsertEnrollment = parse_body(params)?;
    if !state.store.has_student(input.student_id) {
        return Err(HandlerErr::not_found("student not found"));
    }
    if !state.store.has_class(input.class_id) {
        return Err(HandlerErr::not_found("class not found"));
    }
    let enrollment = state.store.create_enrollment(input);
    Ok(json!({ "enrollment": enrollment }))
}

fn update(state: &mut AppState, params: &serde_json::Value) -> HandlerResult {
    let id = get_required_id(params, "enrollmentId")?;
    let patch: EnrollmentPatch = parse_patch(params)?;
    let enrollment = state
        .store
        .update_enrollment(id, patch)
        .ok_or_else(|| HandlerErr::not_found("enrollment not found"))?;
    Ok(json!({ "enrollment": enrollment }))
}

fn delete(state: &mut AppState, params: &serde_json::Value) -> HandlerResult {
    let id = get_required_id(params, "enrollmentId")?;
    Ok(json!({ "deleted": state.store.delete_enrollment(id) }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "enrollments.list" => list(state, &req.params),
        "enrollments.get" => get(state, &req.params),
        "enrollments.create" => create(state, &req.params),
        "enrollments.update" => update(state, &req.params),
        "enrollments.delete" => delete(state, &req.params),
        _ => return None,
    };
    Some(match result {
        Ok(value) => ok(&req.id, value),
        Err(e) => e.response(&req.id),
    })
}
