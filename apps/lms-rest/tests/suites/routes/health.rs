use actix_web::http::StatusCode;
use actix_web::test;

use crate::common::assert_success_data;
use crate::support::{build_test_state, create_test_app};

#[actix_web::test]
async fn test_health_and_response_headers() {
    let ts = build_test_state();
    let app = create_test_app(ts.state).with_prod_routes().build().await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let headers = resp.headers();
    assert!(headers.get("x-request-id").is_some());
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("cache-control").unwrap(), "no-store");

    let data = assert_success_data(resp).await;
    assert_eq!(data["app_version"], env!("CARGO_PKG_VERSION"));
    assert!(data["time"].as_str().is_some());
}
