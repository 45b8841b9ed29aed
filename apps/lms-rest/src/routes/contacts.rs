use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::auth::token::UserId;
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::extractors::CurrentUser;
use crate::http::success;
use crate::lms::LmsUser;
use crate::middleware::RequireAccess;
use crate::state::app_state::AppState;

#[derive(Debug, Serialize)]
struct ContactList {
    usr_id: UserId,
    contacts: Vec<LmsUser>,
}

async fn my_contacts(
    user: CurrentUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    contacts_for(&state, user.user_id).await
}

/// Contacts of another user: the caller must be that user or an admin.
async fn contacts_of(
    user: CurrentUser,
    path: web::Path<i64>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let target = UserId(path.into_inner());
    if target != user.user_id && !user.is_admin {
        return Err(AppError::forbidden(
            ErrorCode::InsufficientRole,
            "Only admins may read other users' contacts",
        ));
    }
    contacts_for(&state, target).await
}

async fn contacts_for(state: &AppState, usr_id: UserId) -> Result<HttpResponse, AppError> {
    if state.lms.user(usr_id).await?.is_none() {
        return Err(AppError::read_failed(format!("User {usr_id} does not exist")));
    }
    let contacts = state.lms.contacts_of(usr_id).await?;
    Ok(success(ContactList { usr_id, contacts }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/contacts")
            .wrap(RequireAccess::permission())
            .route(web::get().to(my_contacts)),
    )
    .service(
        web::resource("/contacts/{id}")
            .wrap(RequireAccess::permission())
            .route(web::get().to(contacts_of)),
    );
}
