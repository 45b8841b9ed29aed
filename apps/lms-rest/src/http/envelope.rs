//! Success bodies: `{"status":"success","data":...}` or `{"status":"success","msg":"..."}`.

use actix_web::HttpResponse;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct DataEnvelope<T> {
    status: &'static str,
    data: T,
}

#[derive(Debug, Serialize)]
struct MsgEnvelope {
    status: &'static str,
    msg: String,
}

pub fn success<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(DataEnvelope {
        status: "success",
        data,
    })
}

pub fn success_msg(msg: impl Into<String>) -> HttpResponse {
    HttpResponse::Ok().json(MsgEnvelope {
        status: "success",
        msg: msg.into(),
    })
}
