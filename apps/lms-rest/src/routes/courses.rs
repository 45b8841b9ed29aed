use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::token::UserId;
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::extractors::{CurrentUser, ValidatedJson};
use crate::http::{success, success_msg};
use crate::lms::{Action, LmsObject, LmsUser, ObjectRef};
use crate::middleware::RequireAccess;
use crate::state::app_state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollMode {
    ById,
    ByLogin,
}

#[derive(Debug, Deserialize)]
pub struct EnrollRequest {
    pub mode: EnrollMode,
    pub crs_ref_id: i64,
    pub usr_id: Option<i64>,
    pub login: Option<String>,
}

#[derive(Debug, Serialize)]
struct CourseList {
    courses: Vec<LmsObject>,
}

#[derive(Debug, Serialize)]
struct CourseDetail {
    info: LmsObject,
    members: Vec<UserId>,
}

#[derive(Debug, Serialize)]
struct Enrolled {
    usr_id: UserId,
    crs_ref_id: i64,
}

async fn list_courses(
    user: CurrentUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let courses = state.lms.courses_of(user.user_id).await?;
    Ok(success(CourseList { courses }))
}

async fn course_detail(
    user: CurrentUser,
    path: web::Path<i64>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let ref_id = path.into_inner();
    let info = load_course(&state, ref_id).await?;
    require_permission(&state, &user, Action::Read, ref_id).await?;

    let members = state.lms.course_members(ref_id).await?;
    Ok(success(CourseDetail { info, members }))
}

async fn join_course(
    user: CurrentUser,
    path: web::Path<i64>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let ref_id = path.into_inner();
    load_course(&state, ref_id).await?;
    require_permission(&state, &user, Action::Join, ref_id).await?;

    state.lms.enroll(user.user_id, ref_id).await?;
    info!(user_id = %user.user_id, ref_id, "course_joined");
    Ok(success_msg(format!("Joined course {ref_id}")))
}

async fn leave_course(
    user: CurrentUser,
    path: web::Path<i64>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let ref_id = path.into_inner();
    load_course(&state, ref_id).await?;
    require_permission(&state, &user, Action::Leave, ref_id).await?;

    state.lms.unenroll(user.user_id, ref_id).await?;
    info!(user_id = %user.user_id, ref_id, "course_left");
    Ok(success_msg(format!("Left course {ref_id}")))
}

/// Enroll another user into a course. Admin only.
async fn enroll(
    admin: CurrentUser,
    body: ValidatedJson<EnrollRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner();
    load_course(&state, request.crs_ref_id).await?;

    let target = match request.mode {
        EnrollMode::ById => {
            let id = request
                .usr_id
                .map(UserId)
                .ok_or_else(|| AppError::missing_parameter("usr_id"))?;
            state
                .lms
                .user(id)
                .await?
                .ok_or_else(|| AppError::read_failed(format!("User {id} does not exist")))?
        }
        EnrollMode::ByLogin => {
            let login = crate::http::required(request.login.as_deref(), "login")?;
            find_by_login(&state, login).await?
        }
    };

    state.lms.enroll(target.id, request.crs_ref_id).await?;
    info!(
        admin_id = %admin.user_id,
        user_id = %target.id,
        ref_id = request.crs_ref_id,
        "user_enrolled"
    );

    Ok(success(Enrolled {
        usr_id: target.id,
        crs_ref_id: request.crs_ref_id,
    }))
}

async fn find_by_login(state: &AppState, login: &str) -> Result<LmsUser, AppError> {
    state
        .lms
        .find_user_by_login(login)
        .await?
        .ok_or_else(|| AppError::read_failed(format!("No user with login '{login}'")))
}

async fn load_course(state: &AppState, ref_id: i64) -> Result<LmsObject, AppError> {
    match state.lms.load_object(ObjectRef::RefId(ref_id)).await? {
        Some(object) if object.kind == "crs" => Ok(object),
        Some(_) => Err(AppError::read_failed(format!("Object {ref_id} is not a course"))),
        None => Err(AppError::read_failed(format!("Course {ref_id} does not exist"))),
    }
}

async fn require_permission(
    state: &AppState,
    user: &CurrentUser,
    action: Action,
    ref_id: i64,
) -> Result<(), AppError> {
    if state
        .lms
        .check_permission(user.user_id, action, ref_id)
        .await?
    {
        Ok(())
    } else {
        Err(AppError::forbidden(
            ErrorCode::PermissionDenied,
            format!("Missing '{action}' permission on {ref_id}"),
        ))
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    // Literal segments before `{ref_id}` so they are matched first.
    cfg.service(
        web::resource("/courses")
            .wrap(RequireAccess::permission())
            .route(web::get().to(list_courses)),
    )
    .service(
        web::resource("/courses/enroll")
            .wrap(RequireAccess::admin())
            .route(web::post().to(enroll)),
    )
    .service(
        web::resource("/courses/join/{ref_id}")
            .wrap(RequireAccess::permission())
            .route(web::get().to(join_course)),
    )
    .service(
        web::resource("/courses/leave/{ref_id}")
            .wrap(RequireAccess::permission())
            .route(web::get().to(leave_course)),
    )
    .service(
        web::resource("/courses/{ref_id}")
            .wrap(RequireAccess::permission())
            .route(web::get().to(course_detail)),
    );
}
