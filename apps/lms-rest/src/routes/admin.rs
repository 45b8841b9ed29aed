//! Administrative lookups.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::token::UserId;
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::http::success;
use crate::lms::{LmsUser, ObjectMetadata, ObjectRef};
use crate::middleware::RequireAccess;
use crate::state::app_state::AppState;

/// How the `{id}` of `/admin/describe/{id}` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdType {
    #[default]
    RefId,
    ObjId,
    UsrId,
    FileId,
}

#[derive(Debug, Deserialize)]
pub struct DescribeQuery {
    pub id_type: Option<String>,
}

impl DescribeQuery {
    fn id_type(&self) -> Result<IdType, AppError> {
        match self.id_type.as_deref().map(str::trim) {
            None | Some("") | Some("ref_id") => Ok(IdType::RefId),
            Some("obj_id") => Ok(IdType::ObjId),
            Some("usr_id") => Ok(IdType::UsrId),
            Some("file_id") => Ok(IdType::FileId),
            Some(other) => Err(AppError::bad_request(
                ErrorCode::InvalidParameter,
                format!("Unknown id_type '{other}'"),
            )),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Described {
    Object {
        id_type: IdType,
        object: ObjectMetadata,
    },
    User {
        id_type: IdType,
        user: LmsUser,
    },
}

/// `GET /admin/describe/{id}?id_type=ref_id|obj_id|usr_id|file_id`
async fn describe(
    path: web::Path<i64>,
    query: web::Query<DescribeQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let id_type = query.id_type()?;

    let described = match id_type {
        IdType::RefId => {
            let object = state
                .lms
                .load_object(ObjectRef::RefId(id))
                .await?
                .ok_or_else(|| AppError::read_failed(format!("No object with ref_id {id}")))?;
            Described::Object {
                id_type,
                object: metadata(&state, object.obj_id).await?,
            }
        }
        IdType::ObjId => Described::Object {
            id_type,
            object: metadata(&state, id).await?,
        },
        IdType::FileId => {
            let object = metadata(&state, id).await?;
            if object.kind != "file" {
                return Err(AppError::read_failed(format!("Object {id} is not a file")));
            }
            Described::Object { id_type, object }
        }
        IdType::UsrId => {
            let user = state
                .lms
                .user(UserId(id))
                .await?
                .ok_or_else(|| AppError::read_failed(format!("User {id} does not exist")))?;
            Described::User { id_type, user }
        }
    };

    Ok(success(described))
}

async fn metadata(state: &AppState, obj_id: i64) -> Result<ObjectMetadata, AppError> {
    state
        .lms
        .object_metadata(obj_id)
        .await?
        .ok_or_else(|| AppError::read_failed(format!("No object with obj_id {obj_id}")))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/describe/{id}")
            .wrap(RequireAccess::admin())
            .route(web::get().to(describe)),
    );
}
