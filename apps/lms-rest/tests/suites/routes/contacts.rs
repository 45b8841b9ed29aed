use actix_web::http::StatusCode;
use actix_web::test;

use super::get_as;
use crate::common::{assert_error_envelope, assert_success_data};
use crate::support::auth::bearer_for;
use crate::support::factory::{ALICE, BOB, ROOT};
use crate::support::{build_test_state, create_test_app};

#[actix_web::test]
async fn test_own_contacts() {
    let ts = build_test_state();
    let alice = bearer_for(&ts.state, ALICE).await;
    let app = create_test_app(ts.state).with_prod_routes().build().await;

    let data =
        assert_success_data(test::call_service(&app, get_as("/v1/contacts", &alice)).await).await;

    assert_eq!(data["usr_id"], ALICE.0);
    let contacts = data["contacts"].as_array().unwrap();
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0]["id"], BOB.0);
    assert_eq!(contacts[0]["login"], "bob");

    let data = assert_success_data(
        test::call_service(&app, get_as(&format!("/v1/contacts/{}", ALICE.0), &alice)).await,
    )
    .await;
    assert_eq!(data["usr_id"], ALICE.0);
}

#[actix_web::test]
async fn test_other_users_contacts_need_admin() {
    let ts = build_test_state();
    let alice = bearer_for(&ts.state, ALICE).await;
    let root = bearer_for(&ts.state, ROOT).await;
    let app = create_test_app(ts.state).with_prod_routes().build().await;
    let uri = format!("/v1/contacts/{}", BOB.0);

    let resp = test::call_service(&app, get_as(&uri, &alice)).await;
    assert_error_envelope(resp, StatusCode::FORBIDDEN, "INSUFFICIENT_ROLE", None).await;

    let data = assert_success_data(test::call_service(&app, get_as(&uri, &root)).await).await;
    assert_eq!(data["usr_id"], BOB.0);
    assert_eq!(data["contacts"].as_array().unwrap().len(), 0);

    let resp = test::call_service(&app, get_as("/v1/contacts/9999", &root)).await;
    assert_error_envelope(resp, StatusCode::NOT_FOUND, "READ_FAILED", None).await;
}
