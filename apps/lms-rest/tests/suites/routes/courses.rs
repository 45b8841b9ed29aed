use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::json;

use super::get_as;
use crate::common::{assert_error_envelope, assert_success_data, assert_success_msg};
use crate::support::auth::bearer_for;
use crate::support::factory::{
    ALICE, BOB, BOB_LOGIN, CATEGORY, EMPTY_COURSE, ROOT, RUST_COURSE, RUST_COURSE_OBJ,
};
use crate::support::{build_test_state, create_test_app};

fn enroll_as(bearer: &str, body: serde_json::Value) -> actix_http::Request {
    test::TestRequest::post()
        .uri("/v1/courses/enroll")
        .insert_header(("Authorization", bearer.to_string()))
        .set_json(body)
        .to_request()
}

#[actix_web::test]
async fn test_list_my_courses() {
    let ts = build_test_state();
    let alice = bearer_for(&ts.state, ALICE).await;
    let bob = bearer_for(&ts.state, BOB).await;
    let app = create_test_app(ts.state).with_prod_routes().build().await;

    let data = assert_success_data(test::call_service(&app, get_as("/v1/courses", &alice)).await)
        .await;
    let courses = data["courses"].as_array().unwrap();
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0]["ref_id"], RUST_COURSE);
    assert_eq!(courses[0]["type"], "crs");

    let data =
        assert_success_data(test::call_service(&app, get_as("/v1/courses", &bob)).await).await;
    assert_eq!(data["courses"], json!([]));
}

#[actix_web::test]
async fn test_course_detail_requires_read_permission() {
    let ts = build_test_state();
    let alice = bearer_for(&ts.state, ALICE).await;
    let bob = bearer_for(&ts.state, BOB).await;
    let app = create_test_app(ts.state).with_prod_routes().build().await;
    let uri = format!("/v1/courses/{RUST_COURSE}");

    let data = assert_success_data(test::call_service(&app, get_as(&uri, &alice)).await).await;
    assert_eq!(data["info"]["obj_id"], RUST_COURSE_OBJ);
    assert_eq!(data["info"]["title"], "Rust 101");
    assert_eq!(data["members"], json!([ALICE.0]));

    let resp = test::call_service(&app, get_as(&uri, &bob)).await;
    assert_error_envelope(resp, StatusCode::FORBIDDEN, "PERMISSION_DENIED", Some("read")).await;
}

#[actix_web::test]
async fn test_course_lookup_failures() {
    let ts = build_test_state();
    let root = bearer_for(&ts.state, ROOT).await;
    let app = create_test_app(ts.state).with_prod_routes().build().await;

    for ref_id in [9999, CATEGORY] {
        let resp = test::call_service(&app, get_as(&format!("/v1/courses/{ref_id}"), &root)).await;
        assert_error_envelope(resp, StatusCode::NOT_FOUND, "READ_FAILED", None).await;
    }

    let resp = test::call_service(&app, get_as("/v1/courses/not-a-number", &root)).await;
    assert_error_envelope(resp, StatusCode::BAD_REQUEST, "INVALID_PARAMETER", None).await;
}

#[actix_web::test]
async fn test_join_and_leave() {
    let ts = build_test_state();
    let bob = bearer_for(&ts.state, BOB).await;
    let app = create_test_app(ts.state).with_prod_routes().build().await;

    let join = format!("/v1/courses/join/{EMPTY_COURSE}");
    let leave = format!("/v1/courses/leave/{EMPTY_COURSE}");

    // Not a member yet
    let resp = test::call_service(&app, get_as(&leave, &bob)).await;
    assert_error_envelope(resp, StatusCode::FORBIDDEN, "PERMISSION_DENIED", Some("leave")).await;

    let msg = assert_success_msg(test::call_service(&app, get_as(&join, &bob)).await).await;
    assert!(msg.contains(&EMPTY_COURSE.to_string()));

    let resp = test::call_service(&app, get_as(&join, &bob)).await;
    assert_error_envelope(resp, StatusCode::BAD_REQUEST, "CREATE_FAILED", Some("already")).await;

    let data =
        assert_success_data(test::call_service(&app, get_as("/v1/courses", &bob)).await).await;
    assert_eq!(data["courses"][0]["ref_id"], EMPTY_COURSE);

    assert_success_msg(test::call_service(&app, get_as(&leave, &bob)).await).await;
    let data =
        assert_success_data(test::call_service(&app, get_as("/v1/courses", &bob)).await).await;
    assert_eq!(data["courses"], json!([]));
}

#[actix_web::test]
async fn test_join_non_course_is_not_found() {
    let ts = build_test_state();
    let bob = bearer_for(&ts.state, BOB).await;
    let app = create_test_app(ts.state).with_prod_routes().build().await;

    let resp = test::call_service(&app, get_as(&format!("/v1/courses/join/{CATEGORY}"), &bob)).await;
    assert_error_envelope(resp, StatusCode::NOT_FOUND, "READ_FAILED", Some("not a course")).await;
}

#[actix_web::test]
async fn test_admin_enrolls_by_login_and_by_id() {
    let ts = build_test_state();
    let root = bearer_for(&ts.state, ROOT).await;
    let app = create_test_app(ts.state).with_prod_routes().build().await;

    let data = assert_success_data(
        test::call_service(
            &app,
            enroll_as(
                &root,
                json!({"mode": "by_login", "login": BOB_LOGIN.to_uppercase(), "crs_ref_id": RUST_COURSE}),
            ),
        )
        .await,
    )
    .await;
    assert_eq!(data, json!({"usr_id": BOB.0, "crs_ref_id": RUST_COURSE}));

    let data = assert_success_data(
        test::call_service(
            &app,
            enroll_as(
                &root,
                json!({"mode": "by_id", "usr_id": ROOT.0, "crs_ref_id": EMPTY_COURSE}),
            ),
        )
        .await,
    )
    .await;
    assert_eq!(data["usr_id"], ROOT.0);

    let detail = assert_success_data(
        test::call_service(&app, get_as(&format!("/v1/courses/{RUST_COURSE}"), &root)).await,
    )
    .await;
    assert_eq!(detail["members"], json!([ALICE.0, BOB.0]));
}

#[actix_web::test]
async fn test_enroll_validation() {
    let ts = build_test_state();
    let root = bearer_for(&ts.state, ROOT).await;
    let app = create_test_app(ts.state).with_prod_routes().build().await;

    let resp = test::call_service(
        &app,
        enroll_as(&root, json!({"mode": "by_id", "crs_ref_id": RUST_COURSE})),
    )
    .await;
    assert_error_envelope(resp, StatusCode::BAD_REQUEST, "MISSING_PARAMETER", Some("usr_id"))
        .await;

    let resp = test::call_service(
        &app,
        enroll_as(
            &root,
            json!({"mode": "by_login", "login": "nobody", "crs_ref_id": RUST_COURSE}),
        ),
    )
    .await;
    assert_error_envelope(resp, StatusCode::NOT_FOUND, "READ_FAILED", Some("nobody")).await;

    let resp = test::call_service(
        &app,
        enroll_as(&root, json!({"mode": "by_magic", "crs_ref_id": RUST_COURSE})),
    )
    .await;
    assert_error_envelope(resp, StatusCode::BAD_REQUEST, "INVALID_JSON", None).await;

    let req = test::TestRequest::post()
        .uri("/v1/courses/enroll")
        .insert_header(("Authorization", root.clone()))
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"mode\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_error_envelope(resp, StatusCode::BAD_REQUEST, "INVALID_JSON", Some("Invalid JSON"))
        .await;
}

#[actix_web::test]
async fn test_enroll_body_over_limit() {
    let ts = build_test_state();
    let root = bearer_for(&ts.state, ROOT).await;
    let app = create_test_app(ts.state).with_prod_routes().build().await;

    let login = "x".repeat(70 * 1024);
    let resp = test::call_service(
        &app,
        enroll_as(
            &root,
            json!({"mode": "by_login", "login": login, "crs_ref_id": RUST_COURSE}),
        ),
    )
    .await;
    let envelope =
        assert_error_envelope(resp, StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", None)
            .await;
    assert_eq!(envelope.code_id, 206);
}

#[actix_web::test]
async fn test_enroll_is_admin_only() {
    let ts = build_test_state();
    let alice = bearer_for(&ts.state, ALICE).await;
    let app = create_test_app(ts.state).with_prod_routes().build().await;

    let resp = test::call_service(
        &app,
        enroll_as(
            &alice,
            json!({"mode": "by_id", "usr_id": ALICE.0, "crs_ref_id": EMPTY_COURSE}),
        ),
    )
    .await;
    assert_error_envelope(resp, StatusCode::FORBIDDEN, "INSUFFICIENT_ROLE", None).await;
}
