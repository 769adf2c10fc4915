use serde_json::json;

use crate::import;
use crate::ipc::error::{ok, HandlerErr, HandlerResult};
use crate::ipc::helpers::{get_required_id, get_required_str, parse_body, parse_field, parse_patch};
use crate::ipc::types::{AppState, Request};
use crate::model::{InsertStudent, StudentPatch};

fn list(state: &AppState) -> HandlerResult {
    Ok(json!({ "students": state.store.students() }))
}

fn get(state: &AppState, params: &serde_json::Value) -> HandlerResult {
    let id = get_required_id(params, "studentId")?;
    let student = state
        .store
        .student(id)
        .ok_or_else(|| HandlerErr::not_found("student not found"))?;
    Ok(json!({ "student": student }))
}

fn create(state: &mut AppState, params: &serde_json::Value) -> HandlerResult {
    let input: InsertStudent = parse_body(params)?;
    let student = state.store.create_student(input);
    Ok(json!({ "student": student }))
}

/// Schema validation happens here, in one pass over the payload; once the
/// vector deserializes, creation cannot fail partway.
fn create_many(state: &mut AppState, params: &serde_json::Value) -> HandlerResult {
    let inputs: Vec<InsertStudent> = parse_field(params, "students")?;
    let students = state.store.create_students(inputs);
    Ok(json!({ "students": students }))
}

/// Delimited upload. The whole batch is rejected if any row fails
/// validation; nothing is created on a partial failure.
fn import_batch(state: &mut AppState, params: &serde_json::Value) -> HandlerResult {
    let content = get_required_str(params, "content")?;
    let delimiter = match params.get("delimiter") {
        None => None,
        Some(v) if v.is_null() => None,
        Some(v) => {
            let s = v
                .as_str()
                .ok_or_else(|| HandlerErr::bad_params("delimiter must be a one-character string"))?;
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(c),
                _ => {
                    return Err(HandlerErr::bad_params(
                        "delimiter must be a one-character string",
                    ))
                }
            }
        }
    };

    let inputs = import::parse_students(&content, delimiter).map_err(|errors| {
        tracing::warn!(rows = errors.len(), "student import rejected");
        let rows: Vec<serde_json::Value> = errors
            .iter()
            .map(|e| json!({ "row": e.row, "message": e.message }))
            .collect();
        HandlerErr::new("bad_rows", "import rejected, no students created")
            .with_details(json!({ "errors": rows }))
    })?;

    let students = state.store.create_students(inputs);
    tracing::info!(count = students.len(), "student import committed");
    Ok(json!({ "students": students }))
}

fn update(state: &mut AppState, params: &serde_json::Value) -> HandlerResult {
    let id = get_required_id(params, "studentId")?;
    let patch: StudentPatch = parse_patch(params)?;
    let student = state
        .store
        .update_student(id, patch)
        .ok_or_else(|| HandlerErr::not_found("student not found"))?;
    Ok(json!({ "student": student }))
}

fn delete(state: &mut AppState, params: &serde_json::Value) -> HandlerResult {
    let id = get_required_id(params, "studentId")?;
    Ok(json!({ "deleted": state.store.delete_student(id) }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "students.list" => list(state),
        "students.get" => get(state, &req.params),
        "students.create" => create(state, &req.params),
        "students.createMany" => create_many(state, &req.params),
        "students.import" => import_batch(state, &req.params),
        "students.update" => update(state, &req.params),
        "students.delete" => delete(state, &req.params),
        _ => return None,
    };
    Some(match result {
        Ok(value) => ok(&req.id, value),
        Err(e) => e.response(&req.id),
    })
}
