//! Error envelope test helpers
//!
//! Asserts the gateway's failure body without depending on gateway types:
//!
//! ```json
//! {"status":"failed","code":"...","code_id":201,"error":"...","msg":"...","trace_id":"..."}
//! ```

use actix_web::http::StatusCode;
use serde::{Deserialize, Serialize};

/// Local mirror of the gateway's error body
#[derive(Debug, Deserialize, Serialize)]
pub struct ErrorEnvelopeLike {
    pub status: String,
    pub code: String,
    pub code_id: i32,
    pub error: String,
    pub msg: String,
    pub trace_id: String,
}

/// Assert that response parts conform to the stable error contract
///
/// Validates:
/// - HTTP status matches expected
/// - `status` is `"failed"`
/// - x-trace-id header exists and matches body trace_id
/// - `code` matches, and `msg` contains the expected substring if given
pub fn assert_error_envelope_from_parts(
    status: StatusCode,
    headers: &actix_web::http::header::HeaderMap,
    body_bytes: &[u8],
    expected_status: StatusCode,
    expected_code: &str,
    expected_msg_contains: Option<&str>,
) -> ErrorEnvelopeLike {
    assert_eq!(status, expected_status);

    let body_str =
        String::from_utf8(body_bytes.to_vec()).expect("Response body should be valid UTF-8");
    let envelope: ErrorEnvelopeLike =
        serde_json::from_str(&body_str).expect("Response body should be a valid error envelope");

    assert_eq!(envelope.status, "failed");

    let trace_id_header = headers
        .get("x-trace-id")
        .expect("x-trace-id header should be present")
        .to_str()
        .expect("x-trace-id header should be valid UTF-8");
    assert_eq!(
        envelope.trace_id, trace_id_header,
        "trace_id in body should match x-trace-id header"
    );

    assert_eq!(envelope.code, expected_code);

    if let Some(expected_msg) = expected_msg_contains {
        assert!(
            envelope.msg.contains(expected_msg),
            "Expected msg to contain '{}', but got '{}'",
            expected_msg,
            envelope.msg
        );
    }

    envelope
}

/// Assert that a ServiceResponse conforms to the stable error contract
pub async fn assert_error_envelope(
    resp: actix_web::dev::ServiceResponse<actix_web::body::BoxBody>,
    expected_status: StatusCode,
    expected_code: &str,
    expected_msg_contains: Option<&str>,
) -> ErrorEnvelopeLike {
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = actix_web::test::read_body(resp).await;

    assert_error_envelope_from_parts(
        status,
        &headers,
        &body,
        expected_status,
        expected_code,
        expected_msg_contains,
    )
}
