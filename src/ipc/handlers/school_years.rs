use serde_json::json;

use crate::ipc::error::{ok, HandlerErr, HandlerResult};
use crate::ipc::helpers::{get_required_id, parse_body, parse_patch};
use crate::ipc::types::{AppState, Request};
use crate::model::{InsertSchoolYear, SchoolYearPatch};

fn list(state: &AppState) -> HandlerResult {
    Ok(json!({ "schoolYears": state.store.school_years() }))
}

fn get(state: &AppState, params: &serde_json::Value) -> HandlerResult {
    let id = get_required_id(params, "schoolYearId")?;
    let year = state
        .store
        .school_year(id)
        .ok_or_else(|| HandlerErr::not_found("school year not found"))?;
    Ok(json!({ "schoolYear": year }))
}

fn create(state: &mut AppState, params: &serde_json::Value) -> HandlerResult {
    let input: InsertSchoolYear = parse_body(params)?;
    let year = state.store.create_school_year(input);
    Ok(json!({ "schoolYear": year }))
}

fn update(state: &mut AppState, params: &serde_json::Value) -> HandlerResult {
    let id = get_required_id(params, "schoolYearId")?;
    let patch: SchoolYearPatch = parse_patch(params)?;
    let year = state
        .store
        .update_school_year(id, patch)
        .ok_or_else(|| HandlerErr::not_found("school year not found"))?;
    Ok(json!({ "schoolYear": year }))
}

fn delete(state: &mut AppState, params: &serde_json::Value) -> HandlerResult {
    let id = get_required_id(params, "schoolYearId")?;
    Ok(json!({ "deleted": state.store.delete_school_year(id) }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "schoolYears.list" => list(state),
        "schoolYears.get" => get(state, &req.params),
        "schoolYears.create" => create(state, &req.params),
        "schoolYears.update" => update(state, &req.params),
        "schoolYears.delete" => delete(state, &req.params),
        _ => return None,
    };
    Some(match result {
        Ok(value) => ok(&req.id, value),
        Err(e) => e.response(&req.id),
    })
}
