//! Boundary to the learning-management system.
//!
//! The gateway never owns LMS data. Everything it needs from the LMS goes
//! through the [`Lms`] trait: identity, roles, object lookup, permission
//! checks and course membership changes.

pub mod memory;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use memory::{FixtureObject, FixtureUser, InMemoryLms, LmsFixture};

use crate::auth::token::UserId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LmsError {
    #[error("read failed: {0}")]
    ReadFailed(String),
    #[error("create failed: {0}")]
    CreateFailed(String),
    #[error("lms unavailable: {0}")]
    Unavailable(String),
}

/// Objects are addressed either by reference id (a placement in the
/// repository tree) or by object id (the object itself).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectRef {
    RefId(i64),
    ObjId(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Read,
    Join,
    Leave,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Read => "read",
            Action::Join => "join",
            Action::Leave => "leave",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LmsUser {
    pub id: UserId,
    pub login: String,
    pub firstname: String,
    pub lastname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub is_admin: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LmsObject {
    pub ref_id: i64,
    pub obj_id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectMetadata {
    pub obj_id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub description: String,
    pub owner: UserId,
    pub ref_ids: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<FileInfo>,
}

#[async_trait]
pub trait Lms: Send + Sync {
    /// Check a login/password pair; `None` when the pair is rejected.
    async fn authenticate(&self, login: &str, password: &str) -> Result<Option<UserId>, LmsError>;

    async fn user(&self, id: UserId) -> Result<Option<LmsUser>, LmsError>;

    async fn find_user_by_login(&self, login: &str) -> Result<Option<LmsUser>, LmsError>;

    async fn is_admin(&self, id: UserId) -> Result<bool, LmsError> {
        Ok(self.user(id).await?.is_some_and(|user| user.is_admin))
    }

    async fn load_object(&self, object: ObjectRef) -> Result<Option<LmsObject>, LmsError>;

    async fn object_metadata(&self, obj_id: i64) -> Result<Option<ObjectMetadata>, LmsError>;

    async fn check_permission(
        &self,
        user: UserId,
        action: Action,
        ref_id: i64,
    ) -> Result<bool, LmsError>;

    async fn enroll(&self, user: UserId, ref_id: i64) -> Result<(), LmsError>;

    async fn unenroll(&self, user: UserId, ref_id: i64) -> Result<(), LmsError>;

    async fn courses_of(&self, user: UserId) -> Result<Vec<LmsObject>, LmsError>;

    async fn course_members(&self, ref_id: i64) -> Result<Vec<UserId>, LmsError>;

    async fn contacts_of(&self, user: UserId) -> Result<Vec<LmsUser>, LmsError>;
}
