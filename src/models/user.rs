use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

/// Registry entry. Passwords are stored as typed; the registry is local only.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserRecord {
    pub username: String,
    pub password: String,
    pub role: Role,
    pub avatar_url: Option<String>,
    pub banner_url: Option<String>,
    pub bio: String,
}

/// What the session slot holds: the user without the password.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionUser {
    pub username: String,
    pub role: Role,
    pub avatar_url: Option<String>,
    pub banner_url: Option<String>,
    pub bio: String,
}

impl SessionUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn initials(&self) -> String {
        self.username.chars().take(2).collect::<String>().to_uppercase()
    }
}

impl From<&UserRecord> for SessionUser {
    fn from(user: &UserRecord) -> Self {
        Self {
            username: user.username.clone(),
            role: user.role,
            avatar_url: user.avatar_url.clone(),
            banner_url: user.banner_url.clone(),
            bio: user.bio.clone(),
        }
    }
}
