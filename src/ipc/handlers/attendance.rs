use serde_json::json;

use crate::ipc::error::{ok, HandlerErr, HandlerResult};
use crate::ipc::helpers::{
    get_optional_day, get_optional_id, get_required_id, parse_body, parse_field, parse_patch,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{AttendancePatch, InsertAttendance};

fn by_class(state: &AppState, params: &serde_json::Value) -> HandlerResult {
    let class_id = get_required_id(params, "classId")?;
    let day = get_optional_day(params, "date")?;
    Ok(json!({ "attendance": state.store.attendance_by_class(class_id, day) }))
}

fn by_student(state: &AppState, params: &serde_json::Value) -> HandlerResult {
    let student_id = get_required_id(params, "studentId")?;
    let class_id = get_optional_id(params, "classId")?;
    Ok(json!({ "attendance": state.store.attendance_by_student(student_id, class_id) }))
}

fn get(state: &AppState, params: &serde_json::Value) -> HandlerResult {
    let id = get_required_id(params, "attendanceId")?;
    let record = state
        .store
        .attendance(id)
        .ok_or_else(|| HandlerErr::not_found("attendance record not found"))?;
    Ok(json!({ "attendance": record }))
}

fn create(state: &mut AppState, params: &serde_json::Value) -> HandlerResult {
    let input: InsertAttendance = parse_body(params)?;
    if !state.store.has_student(input.student_id) {
        return Err(HandlerErr::not_found("student not found"));
    }
    if !state.store.has_class(input.class_id) {
        return Err(HandlerErr::not_found("class not found"));
    }
    let record = state.store.create_attendance(input);
    Ok(json!({ "attendance": record }))
}

fn update(state: &mut AppState, params: &serde_json::Value) -> HandlerResult {
    let id = get_required_id(params, "attendanceId")?;
    let patch: AttendancePatch = parse_patch(params)?;
    let record = state
        .store
        .update_attendance(id, patch)
        .ok_or_else(|| HandlerErr::not_found("attendance record not found"))?;
    Ok(json!({ "attendance": record }))
}

fn delete(state: &mut AppState, params: &serde_json::Value) -> HandlerResult {
    let id = get_required_id(params, "attendanceId")?;
    Ok(json!({ "deleted": state.store.delete_attendance(id) }))
}

/// Register save. One input per (student, class, day); the store updates
/// the matching record when one exists instead of inserting a duplicate.
fn bulk_upsert(state: &mut AppState, params: &serde_json::Value) -> HandlerResult {
    let records: Vec<InsertAttendance> = parse_field(params, "records")?;
    let saved = state.store.bulk_upsert_attendance(records);
    Ok(json!({ "attendance": saved }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "attendance.byClass" => by_class(state, &req.params),
        "attendance.byStudent" => by_student(state, &req.params),
        "attendance.get" => get(state, &req.params),
        "attendance.create" => create(state, &req.params),
        "attendance.update" => update(state, &req.params),
        "attendance.delete" => delete(state, &req.params),
        "attendance.bulkUpsert" => bulk_upsert(state, &req.params),
        _ => return None,
    };
    Some(match result {
        Ok(value) => ok(&req.id, value),
        Err(e) => e.response(&req.id),
    })
}
