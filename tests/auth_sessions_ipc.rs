
use serde_json::json;
use test_support::{error_code, login_admin, request_err, request_ok, spawn_daemon};

#[test]
fn login_issues_token_and_me_resolves_it() {
    let (_child, mut stdin, mut reader) = spawn_daemon();

    let result = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "auth.login",
        json!({ "username": "admin", "password": "admin" }),
    );
    let token = result.get("token").and_then(|v| v.as_str()).expect("token");
    assert_eq!(
        result.pointer("/user/username").and_then(|v| v.as_str()),
        Some("admin")
    );
    assert!(
        result.pointer("/user/password").is_none(),
        "password must not cross the wire"
    );

    let me = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "auth.me",
        json!({ "token": token }),
    );
    assert_eq!(me.pointer("/user/isAdmin").and_then(|v| v.as_bool()), Some(true));
}

#[test]
fn wrong_password_is_rejected() {
    let (_child, mut stdin, mut reader) = spawn_daemon();
    let error = request_err(
        &mut stdin,
        &mut reader,
        "1",
        "auth.login",
        json!({ "username": "admin", "password": "nope" }),
    );
    assert_eq!(error_code(&error), "unauthorized");
}

#[test]
fn requests_without_token_are_unauthorized() {
    let (_child, mut stdin, mut reader) = spawn_daemon();
    let error = request_err(&mut stdin, &mut reader, "1", "students.list", json!({}));
    assert_eq!(error_code(&error), "unauthorized");

    let error = request_err(
        &mut stdin,
        &mut reader,
        "2",
        "students.list",
        json!({ "token": "not-a-real-token" }),
    );
    assert_eq!(error_code(&error), "unauthorized");
}

#[test]
fn logout_invalidates_the_token() {
    let (_child, mut stdin, mut reader) = spawn_daemon();
    let token = login_admin(&mut stdin, &mut reader);

    let result = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "auth.logout",
        json!({ "token": token }),
    );
    assert_eq!(result.get("loggedOut").and_then(|v| v.as_bool()), Some(true));

    let error = request_err(
        &mut stdin,
        &mut reader,
        "2",
        "students.list",
        json!({ "token": token }),
    );
    assert_eq!(error_code(&error), "unauthorized");
}

#[test]
fn user_creation_is_admin_only() {
    let (_child, mut stdin, mut reader) = spawn_daemon();
    let admin_token = login_admin(&mut stdin, &mut reader);

    let created = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "users.create",
        json!({
            "token": admin_token,
            "username": "front-desk",
            "password": "secret",
            "displayName": "Front Desk",
        }),
    );
    assert_eq!(
        created.pointer("/user/isAdmin").and_then(|v| v.as_bool()),
        Some(false)
    );

    // Duplicate username is refused.
    let error = request_err(
        &mut stdin,
        &mut reader,
        "2",
        "users.create",
        json!({
            "token": admin_token,
            "username": "front-desk",
            "password": "other",
            "displayName": "Front Desk 2",
        }),
    );
    assert_eq!(error_code(&error), "conflict");

    // The non-admin session can work, but not mint users.
    let login = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "auth.login",
        json!({ "username": "front-desk", "password": "secret" }),
    );
    let staff_token = login.get("token").and_then(|v| v.as_str()).expect("token");

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "students.list",
        json!({ "token": staff_token }),
    );
    let error = request_err(
        &mut stdin,
        &mut reader,
        "5",
        "users.create",
        json!({
            "token": staff_token,
            "username": "sneaky",
            "password": "x",
            "displayName": "Sneaky",
        }),
    );
    assert_eq!(error_code(&error), "forbidden");

    let error = request_err(
        &mut stdin,
        &mut reader,
        "6",
        "users.list",
        json!({ "token": staff_token }),
    );
    assert_eq!(error_code(&error), "forbidden");
}

#[test]
fn unknown_method_with_valid_token_is_not_implemented() {
    let (_child, mut stdin, mut reader) = spawn_daemon();
    let token = login_admin(&mut stdin, &mut reader);
    let error = request_err(
        &mut stdin,
        &mut reader,
        "1",
        "students.rewind",
        json!({ "token": token }),
    );
    assert_eq!(error_code(&error), "not_implemented");
}
