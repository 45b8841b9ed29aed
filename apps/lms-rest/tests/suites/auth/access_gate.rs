// The PERMISSION / ADMIN gate in front of protected routes.

use actix_web::http::StatusCode;
use actix_web::test;

use crate::common::{assert_error_envelope, assert_success_data};
use crate::support::auth::{bearer_for, expired_access_token, foreign_access_token, issue_pair};
use crate::support::factory::{ALICE, ROOT, RUST_COURSE};
use crate::support::test_state::test_security;
use crate::support::{build_test_state, create_test_app};

const TOKENINFO: &str = "/v2/oauth2/tokeninfo";

fn get_with_auth(uri: &str, authorization: &str) -> actix_http::Request {
    test::TestRequest::get()
        .uri(uri)
        .insert_header(("Authorization", authorization))
        .to_request()
}

#[actix_web::test]
async fn test_missing_bearer_is_unauthorized() {
    let ts = build_test_state();
    let app = create_test_app(ts.state).with_prod_routes().build().await;

    let resp = test::call_service(&app, test::TestRequest::get().uri(TOKENINFO).to_request()).await;

    assert_eq!(
        resp.headers().get("www-authenticate").unwrap(),
        "Bearer error=\"invalid_token\""
    );
    assert_error_envelope(
        resp,
        StatusCode::UNAUTHORIZED,
        "UNAUTHORIZED_MISSING_BEARER",
        None,
    )
    .await;
}

#[actix_web::test]
async fn test_non_bearer_scheme_is_unauthorized() {
    let ts = build_test_state();
    let app = create_test_app(ts.state).with_prod_routes().build().await;

    for value in ["Basic cm9vdDpob21lcg==", "Bearer", "Bearer a b"] {
        let resp = test::call_service(&app, get_with_auth(TOKENINFO, value)).await;
        assert_error_envelope(
            resp,
            StatusCode::UNAUTHORIZED,
            "UNAUTHORIZED_MISSING_BEARER",
            None,
        )
        .await;
    }
}

#[actix_web::test]
async fn test_token_failures_map_to_distinct_codes() {
    let ts = build_test_state();
    let security = test_security();
    let pair = issue_pair(&ts.state, ALICE).await;
    let app = create_test_app(ts.state).with_prod_routes().build().await;

    let cases = [
        ("garbage".to_string(), "TOKEN_MALFORMED"),
        (expired_access_token(ALICE, &security), "TOKEN_EXPIRED"),
        (foreign_access_token(ALICE), "TOKEN_REVOKED"),
        (pair.refresh_token.clone(), "TOKEN_WRONG_TYPE"),
    ];

    for (token, code) in cases {
        let resp = test::call_service(&app, get_with_auth(TOKENINFO, &format!("Bearer {token}")))
            .await;
        let envelope = assert_error_envelope(resp, StatusCode::UNAUTHORIZED, code, None).await;
        assert_eq!(envelope.error, "invalid_token");
    }
}

#[actix_web::test]
async fn test_valid_token_reaches_handler() {
    let ts = build_test_state();
    let bearer = bearer_for(&ts.state, ALICE).await;
    let app = create_test_app(ts.state).with_prod_routes().build().await;

    let resp = test::call_service(&app, get_with_auth(TOKENINFO, &bearer)).await;

    assert!(resp.headers().get("x-request-id").is_some());
    let data = assert_success_data(resp).await;
    assert_eq!(data["user_id"], ALICE.0);
    assert_eq!(data["is_admin"], false);
    assert_eq!(data["token_type"], "Bearer");
    let expires_in = data["expires_in"].as_i64().unwrap();
    assert!(expires_in > 30 * 60 - 5 && expires_in <= 30 * 60);
}

#[actix_web::test]
async fn test_access_token_from_query_parameter() {
    let ts = build_test_state();
    let pair = issue_pair(&ts.state, ROOT).await;
    let app = create_test_app(ts.state).with_prod_routes().build().await;

    let req = test::TestRequest::get()
        .uri(&format!("{TOKENINFO}?access_token={}", pair.access_token))
        .to_request();
    let data = assert_success_data(test::call_service(&app, req).await).await;

    assert_eq!(data["user_id"], ROOT.0);
    assert_eq!(data["is_admin"], true);
}

#[actix_web::test]
async fn test_subject_unknown_to_lms_is_forbidden() {
    let ts = build_test_state();
    let bearer = bearer_for(&ts.state, ALICE).await;
    ts.lms.remove_user(ALICE);
    let app = create_test_app(ts.state).with_prod_routes().build().await;

    let resp = test::call_service(&app, get_with_auth(TOKENINFO, &bearer)).await;

    let envelope = assert_error_envelope(
        resp,
        StatusCode::FORBIDDEN,
        "FORBIDDEN_USER_NOT_FOUND",
        None,
    )
    .await;
    assert_eq!(envelope.error, "insufficient_scope");
}

#[actix_web::test]
async fn test_admin_level_requires_admin() {
    let ts = build_test_state();
    let alice = bearer_for(&ts.state, ALICE).await;
    let root = bearer_for(&ts.state, ROOT).await;
    let app = create_test_app(ts.state).with_prod_routes().build().await;
    let uri = format!("/admin/describe/{RUST_COURSE}");

    let denied = test::call_service(&app, get_with_auth(&uri, &alice)).await;
    assert_error_envelope(
        denied,
        StatusCode::FORBIDDEN,
        "INSUFFICIENT_ROLE",
        Some("ADMIN"),
    )
    .await;

    let granted = test::call_service(&app, get_with_auth(&uri, &root)).await;
    assert_success_data(granted).await;
}

#[actix_web::test]
async fn test_gate_runs_before_body_parsing() {
    let ts = build_test_state();
    let app = create_test_app(ts.state).with_prod_routes().build().await;

    let req = test::TestRequest::post()
        .uri("/v1/courses/enroll")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_error_envelope(
        resp,
        StatusCode::UNAUTHORIZED,
        "UNAUTHORIZED_MISSING_BEARER",
        None,
    )
    .await;
}

#[actix_web::test]
async fn test_unprotected_routes_need_no_token() {
    let ts = build_test_state();
    let app = create_test_app(ts.state).with_prod_routes().build().await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;

    assert_eq!(resp.status(), StatusCode::OK);
}
