use serde_json::json;

use crate::ipc::error::{ok, HandlerErr, HandlerResult};
use crate::ipc::helpers::{get_required_id, parse_body, parse_patch};
use crate::ipc::types::{AppState, Request};
use crate::model::{InsertPayment, PaymentFilter, PaymentPatch};

fn month_in_range(month: u32) -> Result<(), HandlerErr> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(HandlerErr::bad_params("month must be between 1 and 12"))
    }
}

fn list(state: &AppState, params: &serde_json::Value) -> HandlerResult {
    let filter: PaymentFilter = parse_body(params)?;
    Ok(json!({ "payments": state.store.payments(&filter) }))
}

fn get(state: &AppState, params: &serde_json::Value) -> HandlerResult {
    let id = get_required_id(params, "paymentId")?;
    let payment = state
        .store
        .payment(id)
        .ok_or_else(|| HandlerErr::not_found("payment not found"))?;
    Ok(json!({ "payment": payment }))
}

fn create(state: &mut AppState, params: &serde_json::Value) -> HandlerResult {
    let input: InsertPayment = parse_body(params)?;
    month_in_range(input.month)?;
    if !state.store.has_student(input.student_id) {
        return Err(HandlerErr::not_found("student not found"));
    }
    if !state.store.has_course(input.course_id) {
        return Err(HandlerErr::not_found("course not found"));
    }
    let payment = state.store.create_payment(input);
    Ok(json!({ "payment": payment }))
}

fn update(state: &mut AppState, params: &serde_json::Value) -> HandlerResult {
    let id = get_required_id(params, "paymentId")?;
    let patch: PaymentPatch = parse_patch(params)?;
    if let Some(month) = patch.month {
        month_in_range(month)?;
    }
    let payment = state
        .store
        .update_payment(id, patch)
        .ok_or_else(|| HandlerErr::not_found("payment not found"))?;
    Ok(json!({ "payment": payment }))
}

fn delete(state: &mut AppState, params: &serde_json::Value) -> HandlerResult {
    let id = get_required_id(params, "paymentId")?;
    Ok(json!({ "deleted": state.store.delete_payment(id) }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "payments.list" => list(state, &req.params),
        "payments.get" => get(state, &req.params),
        "payments.create" => create(state, &req.params),
        "payments.update" => update(state, &req.params),
        "payments.delete" => delete(state, &req.params),
        _ => return None,
    };
    Some(match result {
        Ok(value) => ok(&req.id, value),
        Err(e) => e.response(&req.id),
    })
}
