use serde_json::json;

use crate::ipc::error::{ok, HandlerErr, HandlerResult};
use crate::ipc::helpers::{get_optional_id, get_required_id, parse_body, parse_patch};
use crate::ipc::types::{AppState, Request};
use crate::model::{CoursePatch, InsertCourse};

fn list(state: &AppState, params: &serde_json::Value) -> HandlerResult {
    let school_year_id = get_optional_id(params, "schoolYearId")?;
    Ok(json!({ "courses": state.store.courses(school_year_id) }))
}

fn get(state: &AppState, params: &serde_json::Value) -> HandlerResult {
    let id = get_required_id(params, "courseId")?;
    let course = state
        .store
        .course(id)
        .ok_or_else(|| HandlerErr::not_found("course not found"))?;
    Ok(json!({ "course": course }))
}

fn create(state: &mut AppState, params: &serde_json::Value) -> HandlerResult {
    let input: InsertCourse = parse_body(params)?;
    if !state.store.has_school_year(input.school_year_id) {
        return Err(HandlerErr::not_found("school year not found"));
    }
    let course = state.store.create_course(input);
    Ok(json!({ "course": course }))
}

fn update(state: &mut AppState, params: &serde_json::Value) -> HandlerResult {
    let id = get_required_id(params, "courseId")?;
    let patch: CoursePatch = parse_patch(params)?;
    if let Some(year_id) = patch.school_year_id {
        if !state.store.has_school_year(year_id) {
            return Err(HandlerErr::not_found("school year not found"));
        }
    }
    let course = state
        .store
        .update_course(id, patch)
        .ok_or_else(|| HandlerErr::not_found("course not found"))?;
    Ok(json!({ "course": course }))
}

fn delete(state: &mut AppState, params: &serde_json::Value) -> HandlerResult {
    let id = get_required_id(params, "courseId")?;
    Ok(json!({ "deleted": state.store.delete_course(id) }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "courses.list" => list(state, &req.params),
        "courses.get" => get(state, &req.params),
        "courses.create" => create(state, &req.params),
        "courses.update" => update(state, &req.params),
        "courses.delete" => delete(state, &req.params),
        _ => return None,
    };
    Some(match result {
        Ok(value) => ok(&req.id, value),
        Err(e) => e.response(&req.id),
    })
}
