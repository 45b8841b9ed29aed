//! In-process LMS directory seeded from a JSON fixture.
//!
//! Used for local runs and tests. Passwords are kept only as blake3 digests.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Deserialize;

use super::{Action, FileInfo, Lms, LmsError, LmsObject, LmsUser, ObjectMetadata, ObjectRef};
use crate::auth::token::UserId;

/// Fixture document:
///
/// ```json
/// {
///   "users":   [{"id": 6, "login": "root", "password": "...", "admin": true}],
///   "objects": [{"ref_id": 70, "obj_id": 270, "type": "crs", "title": "Rust", "owner": 6,
///                "members": [6]}]
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LmsFixture {
    #[serde(default)]
    pub users: Vec<FixtureUser>,
    #[serde(default)]
    pub objects: Vec<FixtureObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FixtureUser {
    pub id: i64,
    pub login: String,
    pub password: String,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub contacts: Vec<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FixtureObject {
    pub ref_id: i64,
    pub obj_id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub owner: i64,
    #[serde(default)]
    pub members: Vec<i64>,
    #[serde(default)]
    pub file: Option<FileInfo>,
}

#[derive(Debug)]
struct StoredUser {
    user: LmsUser,
    password_digest: blake3::Hash,
    contacts: Vec<UserId>,
}

#[derive(Debug)]
struct StoredObject {
    object: LmsObject,
    owner: UserId,
    file: Option<FileInfo>,
}

#[derive(Debug, Default)]
struct Directory {
    users: HashMap<UserId, StoredUser>,
    objects: HashMap<i64, StoredObject>,
    members: HashMap<i64, BTreeSet<UserId>>,
}

impl Directory {
    fn user_by_login(&self, login: &str) -> Option<&StoredUser> {
        let login = normalize_login(login);
        self.users.values().find(|u| u.user.login == login)
    }

    fn is_admin(&self, id: UserId) -> bool {
        self.users.get(&id).is_some_and(|u| u.user.is_admin)
    }

    fn is_member(&self, id: UserId, ref_id: i64) -> bool {
        self.members
            .get(&ref_id)
            .is_some_and(|members| members.contains(&id))
    }

    fn course(&self, ref_id: i64) -> Result<&StoredObject, LmsError> {
        self.objects
            .get(&ref_id)
            .filter(|o| o.object.kind == "crs")
            .ok_or_else(|| LmsError::ReadFailed(format!("no course with ref_id {ref_id}")))
    }
}

#[derive(Debug, Default)]
pub struct InMemoryLms {
    directory: RwLock<Directory>,
}

impl InMemoryLms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fixture(fixture: LmsFixture) -> Self {
        let lms = Self::new();
        for user in fixture.users {
            lms.insert_user(user);
        }
        for object in fixture.objects {
            lms.insert_object(object);
        }
        lms
    }

    /// Load a fixture document from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LmsError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            LmsError::Unavailable(format!("cannot read fixture {}: {e}", path.display()))
        })?;
        let fixture: LmsFixture = serde_json::from_str(&raw).map_err(|e| {
            LmsError::Unavailable(format!("invalid fixture {}: {e}", path.display()))
        })?;
        Ok(Self::from_fixture(fixture))
    }

    pub fn insert_user(&self, user: FixtureUser) -> UserId {
        let id = UserId(user.id);
        let stored = StoredUser {
            user: LmsUser {
                id,
                login: normalize_login(&user.login),
                firstname: user.firstname,
                lastname: user.lastname,
                email: user.email,
                is_admin: user.admin,
            },
            password_digest: blake3::hash(user.password.as_bytes()),
            contacts: user.contacts.into_iter().map(UserId).collect(),
        };
        self.directory.write().users.insert(id, stored);
        id
    }

    pub fn insert_object(&self, object: FixtureObject) {
        let mut dir = self.directory.write();
        let members: BTreeSet<UserId> = object.members.iter().copied().map(UserId).collect();
        dir.members.insert(object.ref_id, members);
        dir.objects.insert(
            object.ref_id,
            StoredObject {
                object: LmsObject {
                    ref_id: object.ref_id,
                    obj_id: object.obj_id,
                    kind: object.kind,
                    title: object.title,
                    description: object.description,
                },
                owner: UserId(object.owner),
                file: object.file,
            },
        );
    }

    pub fn remove_user(&self, id: UserId) {
        let mut dir = self.directory.write();
        dir.users.remove(&id);
        for members in dir.members.values_mut() {
            members.remove(&id);
        }
    }
}

fn normalize_login(login: &str) -> String {
    login.trim().to_lowercase()
}

#[async_trait]
impl Lms for InMemoryLms {
    async fn authenticate(&self, login: &str, password: &str) -> Result<Option<UserId>, LmsError> {
        let dir = self.directory.read();
        let digest = blake3::hash(password.as_bytes());
        Ok(dir
            .user_by_login(login)
            .filter(|u| u.password_digest == digest)
            .map(|u| u.user.id))
    }

    async fn user(&self, id: UserId) -> Result<Option<LmsUser>, LmsError> {
        Ok(self.directory.read().users.get(&id).map(|u| u.user.clone()))
    }

    async fn find_user_by_login(&self, login: &str) -> Result<Option<LmsUser>, LmsError> {
        Ok(self
            .directory
            .read()
            .user_by_login(login)
            .map(|u| u.user.clone()))
    }

    async fn load_object(&self, object: ObjectRef) -> Result<Option<LmsObject>, LmsError> {
        let dir = self.directory.read();
        let found = match object {
            ObjectRef::RefId(ref_id) => dir.objects.get(&ref_id),
            ObjectRef::ObjId(obj_id) => dir
                .objects
                .values()
                .filter(|o| o.object.obj_id == obj_id)
                .min_by_key(|o| o.object.ref_id),
        };
        Ok(found.map(|o| o.object.clone()))
    }

    async fn object_metadata(&self, obj_id: i64) -> Result<Option<ObjectMetadata>, LmsError> {
        let dir = self.directory.read();
        let mut placements: Vec<&StoredObject> = dir
            .objects
            .values()
            .filter(|o| o.object.obj_id == obj_id)
            .collect();
        placements.sort_by_key(|o| o.object.ref_id);

        let Some(first) = placements.first() else {
            return Ok(None);
        };

        Ok(Some(ObjectMetadata {
            obj_id,
            kind: first.object.kind.clone(),
            title: first.object.title.clone(),
            description: first.object.description.clone(),
            owner: first.owner,
            ref_ids: placements.iter().map(|o| o.object.ref_id).collect(),
            file: first.file.clone(),
        }))
    }

    async fn check_permission(
        &self,
        user: UserId,
        action: Action,
        ref_id: i64,
    ) -> Result<bool, LmsError> {
        let dir = self.directory.read();
        let Some(object) = dir.objects.get(&ref_id) else {
            return Ok(false);
        };
        let admin = dir.is_admin(user);
        let owner = object.owner == user;

        let allowed = match action {
            Action::Read => admin || owner || dir.is_member(user, ref_id),
            Action::Join => object.object.kind == "crs" && dir.users.contains_key(&user),
            Action::Leave => dir.is_member(user, ref_id),
        };
        Ok(allowed)
    }

    async fn enroll(&self, user: UserId, ref_id: i64) -> Result<(), LmsError> {
        let mut dir = self.directory.write();
        dir.course(ref_id)?;
        if !dir.users.contains_key(&user) {
            return Err(LmsError::CreateFailed(format!("unknown user {user}")));
        }
        let inserted = dir.members.entry(ref_id).or_default().insert(user);
        if !inserted {
            return Err(LmsError::CreateFailed(format!(
                "user {user} is already a member of course {ref_id}"
            )));
        }
        Ok(())
    }

    async fn unenroll(&self, user: UserId, ref_id: i64) -> Result<(), LmsError> {
        let mut dir = self.directory.write();
        dir.course(ref_id)?;
        let removed = dir
            .members
            .get_mut(&ref_id)
            .is_some_and(|members| members.remove(&user));
        if !removed {
            return Err(LmsError::CreateFailed(format!(
                "user {user} is not a member of course {ref_id}"
            )));
        }
        Ok(())
    }

    async fn courses_of(&self, user: UserId) -> Result<Vec<LmsObject>, LmsError> {
        let dir = self.directory.read();
        let mut courses: Vec<LmsObject> = dir
            .members
            .iter()
            .filter(|(_, members)| members.contains(&user))
            .filter_map(|(ref_id, _)| dir.objects.get(ref_id))
            .filter(|o| o.object.kind == "crs")
            .map(|o| o.object.clone())
            .collect();
        courses.sort_by_key(|c| c.ref_id);
        Ok(courses)
    }

    async fn course_members(&self, ref_id: i64) -> Result<Vec<UserId>, LmsError> {
        let dir = self.directory.read();
        dir.course(ref_id)?;
        Ok(dir
            .members
            .get(&ref_id)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn contacts_of(&self, user: UserId) -> Result<Vec<LmsUser>, LmsError> {
        let dir = self.directory.read();
        let stored = dir
            .users
            .get(&user)
            .ok_or_else(|| LmsError::ReadFailed(format!("no user with id {user}")))?;
        Ok(stored
            .contacts
            .iter()
            .filter_map(|id| dir.users.get(id))
            .map(|u| u.user.clone())
            .collect())
    }
}
