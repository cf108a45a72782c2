//! Admin reference lists, users, and roles.

use serde::{Deserialize, Serialize};

/// The protected seed account: never deleted, never overwritten by import.
pub const MASTER_USER_ID: &str = "user-master";

/// Default password assigned to users created through bulk import.
pub const IMPORT_DEFAULT_PASSWORD: &str = "changeme123";

/// An entry of one of the admin reference lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminItem {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// The five admin reference lists addressable over the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminListKey {
    Procediments,
    SentitInformes,
    Departaments,
    Tecnics,
    Regidors,
}

impl AdminListKey {
    /// All keys, in the order the frontend presents them.
    pub const ALL: [AdminListKey; 5] = [
        AdminListKey::Procediments,
        AdminListKey::SentitInformes,
        AdminListKey::Departaments,
        AdminListKey::Tecnics,
        AdminListKey::Regidors,
    ];

    /// The camelCase key used in URLs and the AdminData JSON shape.
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminListKey::Procediments => "procediments",
            AdminListKey::SentitInformes => "sentitInformes",
            AdminListKey::Departaments => "departaments",
            AdminListKey::Tecnics => "tecnics",
            AdminListKey::Regidors => "regidors",
        }
    }

    /// The snake_case discriminator stored in the database.
    pub fn table_key(&self) -> &'static str {
        match self {
            AdminListKey::Procediments => "procediments",
            AdminListKey::SentitInformes => "sentit_informes",
            AdminListKey::Departaments => "departaments",
            AdminListKey::Tecnics => "tecnics",
            AdminListKey::Regidors => "regidors",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        AdminListKey::ALL.iter().copied().find(|k| k.as_str() == s)
    }
}

/// Access level of a user account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Editor,
    #[default]
    Viewer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Editor => "editor",
            Role::Viewer => "viewer",
        }
    }

    /// Parse a role, falling back to viewer for absent or invalid values.
    pub fn parse_or_viewer(s: &str) -> Self {
        match s {
            "admin" => Role::Admin,
            "editor" => Role::Editor,
            _ => Role::Viewer,
        }
    }
}

/// An application user account.
///
/// Handlers strip the password from user-facing responses; it stays present
/// in full ApplicationData snapshots so backups round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Role,
}

impl User {
    /// Copy with the password removed, for API responses.
    pub fn without_password(&self) -> User {
        User {
            password: None,
            ..self.clone()
        }
    }
}

/// All reference data: the five admin lists plus the user accounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminData {
    pub procediments: Vec<AdminItem>,
    pub sentit_informes: Vec<AdminItem>,
    pub tecnics: Vec<AdminItem>,
    pub departaments: Vec<AdminItem>,
    pub regidors: Vec<AdminItem>,
    pub users: Vec<User>,
}

impl AdminData {
    pub fn list(&self, key: AdminListKey) -> &Vec<AdminItem> {
        match key {
            AdminListKey::Procediments => &self.procediments,
            AdminListKey::SentitInformes => &self.sentit_informes,
            AdminListKey::Departaments => &self.departaments,
            AdminListKey::Tecnics => &self.tecnics,
            AdminListKey::Regidors => &self.regidors,
        }
    }
}

/// Request body for creating or restoring an admin-list item.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAdminItemRequest {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Request body for updating an admin-list item.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAdminItemRequest {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Request body for creating a user.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Role,
}

/// Request body for updating a user. An absent password leaves the stored
/// one untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUserRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Role,
}

/// Credential check request.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// The authenticated identity returned by login: a user minus the password.
#[derive(Debug, Clone, Serialize)]
pub struct SessionUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}
