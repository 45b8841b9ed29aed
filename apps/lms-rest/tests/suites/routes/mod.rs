mod contacts;
mod courses;
mod health;

use actix_web::test;

pub(crate) fn get_as(uri: &str, bearer: &str) -> actix_http::Request {
    test::TestRequest::get()
        .uri(uri)
        .insert_header(("Authorization", bearer.to_string()))
        .to_request()
}
