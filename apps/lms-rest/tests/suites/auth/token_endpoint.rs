// POST /v2/oauth2/token: password and refresh_token grants.

use actix_web::http::StatusCode;
use actix_web::test;

use crate::common::{assert_error_envelope, assert_success_data};
use crate::support::factory::{ALICE_LOGIN, ALICE_PASSWORD, ROOT_LOGIN, ROOT_PASSWORD};
use crate::support::test_state::{build_test_state_with, test_security};
use crate::support::{build_test_state, create_test_app};

fn token_request(form: &[(&str, &str)]) -> actix_http::Request {
    test::TestRequest::post()
        .uri("/v2/oauth2/token")
        .set_form(form)
        .to_request()
}

#[actix_web::test]
async fn test_password_grant_issues_pair() {
    let ts = build_test_state();
    let app = create_test_app(ts.state).with_prod_routes().build().await;

    let resp = test::call_service(
        &app,
        token_request(&[
            ("grant_type", "password"),
            ("username", ALICE_LOGIN),
            ("password", ALICE_PASSWORD),
        ]),
    )
    .await;

    assert_eq!(
        resp.headers().get("cache-control").unwrap(),
        "no-store",
        "token responses must not be cached"
    );
    let data = assert_success_data(resp).await;
    assert_eq!(data["token_type"], "Bearer");
    assert_eq!(data["expires_in"], 30 * 60);
    assert_eq!(data["refresh_expires_in"], 14 * 24 * 60 * 60);
    assert!(!data["access_token"].as_str().unwrap().is_empty());
    assert_ne!(data["access_token"], data["refresh_token"]);
}

#[actix_web::test]
async fn test_login_is_case_insensitive() {
    let ts = build_test_state();
    let app = create_test_app(ts.state).with_prod_routes().build().await;

    let resp = test::call_service(
        &app,
        token_request(&[
            ("grant_type", "password"),
            ("username", "  ROOT "),
            ("password", ROOT_PASSWORD),
        ]),
    )
    .await;

    assert_success_data(resp).await;
}

#[actix_web::test]
async fn test_wrong_password_is_rejected() {
    let ts = build_test_state();
    let app = create_test_app(ts.state).with_prod_routes().build().await;

    let resp = test::call_service(
        &app,
        token_request(&[
            ("grant_type", "password"),
            ("username", ROOT_LOGIN),
            ("password", "not-homer"),
        ]),
    )
    .await;

    assert!(resp.headers().get("www-authenticate").is_some());
    let envelope = assert_error_envelope(
        resp,
        StatusCode::UNAUTHORIZED,
        "INVALID_CREDENTIALS",
        None,
    )
    .await;
    assert!(
        !envelope.msg.contains("not-homer"),
        "password must not be echoed"
    );
}

#[actix_web::test]
async fn test_missing_parameters() {
    let ts = build_test_state();
    let app = create_test_app(ts.state).with_prod_routes().build().await;

    let cases: [(&[(&str, &str)], &str); 4] = [
        (&[("username", ALICE_LOGIN)], "grant_type"),
        (&[("grant_type", "password"), ("password", "x")], "username"),
        (&[("grant_type", "password"), ("username", ALICE_LOGIN)], "password"),
        (&[("grant_type", "refresh_token")], "refresh_token"),
    ];

    for (form, param) in cases {
        let resp = test::call_service(&app, token_request(form)).await;
        assert_error_envelope(resp, StatusCode::BAD_REQUEST, "MISSING_PARAMETER", Some(param))
            .await;
    }
}

#[actix_web::test]
async fn test_blank_parameter_counts_as_missing() {
    let ts = build_test_state();
    let app = create_test_app(ts.state).with_prod_routes().build().await;

    let resp = test::call_service(
        &app,
        token_request(&[
            ("grant_type", "password"),
            ("username", "   "),
            ("password", ALICE_PASSWORD),
        ]),
    )
    .await;

    assert_error_envelope(
        resp,
        StatusCode::BAD_REQUEST,
        "MISSING_PARAMETER",
        Some("username"),
    )
    .await;
}

#[actix_web::test]
async fn test_unsupported_grant_type() {
    let ts = build_test_state();
    let app = create_test_app(ts.state).with_prod_routes().build().await;

    let resp = test::call_service(
        &app,
        token_request(&[("grant_type", "client_credentials")]),
    )
    .await;

    let envelope = assert_error_envelope(
        resp,
        StatusCode::BAD_REQUEST,
        "UNSUPPORTED_GRANT_TYPE",
        Some("client_credentials"),
    )
    .await;
    assert_eq!(envelope.error, "invalid_request");
}

#[actix_web::test]
async fn test_client_id_checked_against_api_keys() {
    let ts = build_test_state_with(test_security().with_api_keys(["app-1"]));
    let app = create_test_app(ts.state).with_prod_routes().build().await;

    let without_client = test::call_service(
        &app,
        token_request(&[
            ("grant_type", "password"),
            ("username", ALICE_LOGIN),
            ("password", ALICE_PASSWORD),
        ]),
    )
    .await;
    let envelope = assert_error_envelope(
        without_client,
        StatusCode::UNAUTHORIZED,
        "INVALID_CLIENT",
        None,
    )
    .await;
    assert_eq!(envelope.error, "invalid_client");

    let unknown_client = test::call_service(
        &app,
        token_request(&[
            ("grant_type", "password"),
            ("username", ALICE_LOGIN),
            ("password", ALICE_PASSWORD),
            ("client_id", "app-2"),
        ]),
    )
    .await;
    assert_error_envelope(unknown_client, StatusCode::UNAUTHORIZED, "INVALID_CLIENT", None)
        .await;

    let known_client = test::call_service(
        &app,
        token_request(&[
            ("grant_type", "password"),
            ("username", ALICE_LOGIN),
            ("password", ALICE_PASSWORD),
            ("client_id", "app-1"),
        ]),
    )
    .await;
    assert_success_data(known_client).await;
}

#[actix_web::test]
async fn test_refresh_grant_rotates_and_consumes() {
    let ts = build_test_state();
    let app = create_test_app(ts.state).with_prod_routes().build().await;

    let login = test::call_service(
        &app,
        token_request(&[
            ("grant_type", "password"),
            ("username", ALICE_LOGIN),
            ("password", ALICE_PASSWORD),
        ]),
    )
    .await;
    let first = assert_success_data(login).await;
    let first_refresh = first["refresh_token"].as_str().unwrap().to_string();

    let refreshed = test::call_service(
        &app,
        token_request(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", first_refresh.as_str()),
        ]),
    )
    .await;
    let second = assert_success_data(refreshed).await;
    assert_ne!(second["refresh_token"], first["refresh_token"]);
    assert_ne!(second["access_token"], first["access_token"]);

    let replay = test::call_service(
        &app,
        token_request(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", first_refresh.as_str()),
        ]),
    )
    .await;
    let envelope =
        assert_error_envelope(replay, StatusCode::BAD_REQUEST, "INVALID_GRANT", None).await;
    assert_eq!(envelope.error, "invalid_grant");
}

#[actix_web::test]
async fn test_refresh_grant_rejects_bad_tokens() {
    let ts = build_test_state();
    let pair = crate::support::auth::issue_pair(&ts.state, crate::support::factory::ALICE).await;
    let app = create_test_app(ts.state).with_prod_routes().build().await;

    for raw in [pair.access_token.as_str(), "not-a-token"] {
        let resp = test::call_service(
            &app,
            token_request(&[("grant_type", "refresh_token"), ("refresh_token", raw)]),
        )
        .await;
        assert_error_envelope(resp, StatusCode::BAD_REQUEST, "INVALID_GRANT", None).await;
    }
}

#[actix_web::test]
async fn test_user_added_at_runtime_can_log_in() {
    let ts = build_test_state();
    let login = lms_rest_test_support::unique_helpers::unique_login("student");
    let id = ts.lms.insert_user(lms_rest::lms::FixtureUser {
        id: 9001,
        login: login.clone(),
        password: "s3cret".to_string(),
        firstname: "New".to_string(),
        lastname: "Student".to_string(),
        email: None,
        admin: false,
        contacts: Vec::new(),
    });
    let app = create_test_app(ts.state).with_prod_routes().build().await;

    let resp = test::call_service(
        &app,
        token_request(&[
            ("grant_type", "password"),
            ("username", login.as_str()),
            ("password", "s3cret"),
        ]),
    )
    .await;
    let data = assert_success_data(resp).await;
    let access = data["access_token"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/v2/oauth2/tokeninfo")
        .insert_header(("Authorization", format!("Bearer {access}")))
        .to_request();
    let info = assert_success_data(test::call_service(&app, req).await).await;
    assert_eq!(info["user_id"], id.0);
    assert_eq!(info["is_admin"], false);
}
