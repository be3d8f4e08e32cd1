// src/users.rs
use log::{debug, info};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use url::Url;

use crate::diagnostics::Diagnostics;
use crate::models::user::{Role, SessionUser, UserRecord};
use crate::storage::{read_json, write_json, KeyValueStore, Slot, StorageError};

/// Usernames that sign up as admins.
pub const ADMIN_USERNAMES: [&str; 3] = ["admin", "owner", "rustaradise"];

const DEFAULT_BANNER_URL: &str =
    "https://images.pexels.com/photos/2832072/pexels-photo-2832072.jpeg";
const DEFAULT_BIO: &str = "Welcome to Rustaradise.";
const AVATAR_BASE_URL: &str = "https://api.dicebear.com/9.x/bottts/svg";

type Registry = BTreeMap<String, UserRecord>;

#[derive(Debug)]
pub enum AccountError {
    MissingSignupFields,
    MissingLoginFields,
    MissingRenameFields,
    MissingPasswordFields,
    PasswordMismatch,
    NewPasswordMismatch,
    UsernameTaken,
    UnknownUser,
    IncorrectPassword,
    IncorrectCurrentPassword,
    Storage(StorageError),
}

impl fmt::Display for AccountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSignupFields => write!(f, "Fill in username, password, and confirmation."),
            Self::MissingLoginFields => write!(f, "Enter a username and password to continue."),
            Self::MissingRenameFields => write!(f, "Fill in new username and current password."),
            Self::MissingPasswordFields => write!(f, "Fill in all password fields."),
            Self::PasswordMismatch => write!(f, "Passwords don't match. Please try again."),
            Self::NewPasswordMismatch => write!(f, "New passwords don't match."),
            Self::UsernameTaken => write!(f, "That username is already taken."),
            Self::UnknownUser => write!(f, "No account found with that username. Sign up first."),
            Self::IncorrectPassword => write!(f, "Incorrect password. Please try again."),
            Self::IncorrectCurrentPassword => write!(f, "Current password is incorrect."),
            Self::Storage(e) => write!(f, "Failed to save account: {}", e),
        }
    }
}

impl std::error::Error for AccountError {}

impl From<StorageError> for AccountError {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

fn normalize(username: &str) -> String {
    username.trim().to_lowercase()
}

/// Generated avatar with the username percent-encoded as the seed.
fn default_avatar(username: &str) -> Option<String> {
    Url::parse_with_params(AVATAR_BASE_URL, &[("seed", username)])
        .ok()
        .map(String::from)
}

/// Local user registry and the single signed-in session.
pub struct UserRegistry {
    store: Arc<dyn KeyValueStore>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl UserRegistry {
    pub fn new(store: Arc<dyn KeyValueStore>, diagnostics: Arc<dyn Diagnostics>) -> Self {
        Self { store, diagnostics }
    }

    fn registry(&self) -> Registry {
        read_json(&*self.store, &*self.diagnostics, Slot::UsersRegistry)
            .ok()
            .flatten()
            .unwrap_or_default()
    }

    fn save_registry(&self, registry: &Registry) -> Result<(), StorageError> {
        write_json(&*self.store, Slot::UsersRegistry, registry)
    }

    fn start_session(&self, user: &UserRecord) -> Result<SessionUser, StorageError> {
        let session = SessionUser::from(user);
        write_json(&*self.store, Slot::CurrentUser, &session)?;
        Ok(session)
    }

    pub fn current_user(&self) -> Option<SessionUser> {
        read_json(&*self.store, &*self.diagnostics, Slot::CurrentUser)
            .ok()
            .flatten()
    }

    pub fn sign_up(
        &self,
        username: &str,
        password: &str,
        confirm: &str,
    ) -> Result<SessionUser, AccountError> {
        let (password, confirm) = (password.trim(), confirm.trim());
        if username.trim().is_empty() || password.is_empty() || confirm.is_empty() {
            return Err(AccountError::MissingSignupFields);
        }
        if password != confirm {
            return Err(AccountError::PasswordMismatch);
        }

        let username = normalize(username);
        let mut registry = self.registry();
        if registry.contains_key(&username) {
            return Err(AccountError::UsernameTaken);
        }

        let role = if ADMIN_USERNAMES.contains(&username.as_str()) {
            Role::Admin
        } else {
            Role::User
        };
        let user = UserRecord {
            avatar_url: default_avatar(&username),
            banner_url: Some(DEFAULT_BANNER_URL.to_string()),
            bio: DEFAULT_BIO.to_string(),
            username: username.clone(),
            password: password.to_string(),
            role,
        };
        registry.insert(username.clone(), user.clone());
        self.save_registry(&registry)?;
        info!("Registered user {} ({:?})", username, role);
        Ok(self.start_session(&user)?)
    }

    pub fn log_in(&self, username: &str, password: &str) -> Result<SessionUser, AccountError> {
        let password = password.trim();
        if username.trim().is_empty() || password.is_empty() {
            return Err(AccountError::MissingLoginFields);
        }

        let registry = self.registry();
        let user = registry
            .get(&normalize(username))
            .ok_or(AccountError::UnknownUser)?;
        if user.password != password {
            return Err(AccountError::IncorrectPassword);
        }
        debug!("User {} signed in", user.username);
        Ok(self.start_session(user)?)
    }

    pub fn log_out(&self) -> Result<(), StorageError> {
        self.store.remove(Slot::CurrentUser)
    }

    /// Profile edit for the signed-in user. `None` keeps the existing image.
    pub fn update_profile(
        &self,
        username: &str,
        bio: &str,
        avatar_url: Option<String>,
        banner_url: Option<String>,
    ) -> Result<SessionUser, AccountError> {
        let mut registry = self.registry();
        let user = registry
            .get_mut(username)
            .ok_or(AccountError::UnknownUser)?;
        user.bio = bio.trim().to_string();
        if avatar_url.is_some() {
            user.avatar_url = avatar_url;
        }
        if banner_url.is_some() {
            user.banner_url = banner_url;
        }
        let updated = user.clone();
        self.save_registry(&registry)?;
        Ok(self.start_session(&updated)?)
    }

    pub fn change_username(
        &self,
        old_username: &str,
        new_username: &str,
        current_password: &str,
    ) -> Result<SessionUser, AccountError> {
        if new_username.trim().is_empty() || current_password.is_empty() {
            return Err(AccountError::MissingRenameFields);
        }

        let mut registry = self.registry();
        match registry.get(old_username) {
            Some(existing) if existing.password == current_password => {}
            _ => return Err(AccountError::IncorrectCurrentPassword),
        }
        let normalized = normalize(new_username);
        if registry.contains_key(&normalized) {
            return Err(AccountError::UsernameTaken);
        }

        let mut user = registry
            .remove(old_username)
            .ok_or(AccountError::IncorrectCurrentPassword)?;
        user.username = normalized.clone();
        registry.insert(normalized.clone(), user.clone());
        self.save_registry(&registry)?;
        info!("Renamed user {} to {}", old_username, normalized);
        Ok(self.start_session(&user)?)
    }

    pub fn change_password(
        &self,
        username: &str,
        current_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<(), AccountError> {
        if current_password.is_empty() || new_password.is_empty() || confirm_password.is_empty() {
            return Err(AccountError::MissingPasswordFields);
        }
        if new_password != confirm_password {
            return Err(AccountError::NewPasswordMismatch);
        }

        let mut registry = self.registry();
        let user = match registry.get_mut(username) {
            Some(user) if user.password == current_password => user,
            _ => return Err(AccountError::IncorrectCurrentPassword),
        };
        user.password = new_password.to_string();
        self.save_registry(&registry)?;
        Ok(())
    }

    pub fn delete_account(&self, username: &str, password: &str) -> Result<(), AccountError> {
        let mut registry = self.registry();
        match registry.get(username) {
            Some(user) if user.password == password => {}
            _ => return Err(AccountError::IncorrectPassword),
        }
        registry.remove(username);
        self.save_registry(&registry)?;
        self.log_out()?;
        info!("Deleted user {}", username);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStore;
    use crate::testing::RecordingDiagnostics;

    fn registry() -> (UserRegistry, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let users = UserRegistry::new(store.clone(), RecordingDiagnostics::new());
        (users, store)
    }

    #[test]
    fn test_sign_up_normalizes_and_signs_in() {
        let (users, store) = registry();
        let session = users.sign_up("  Wolf ", "hunter2", "hunter2").unwrap();

        assert_eq!(session.username, "wolf");
        assert_eq!(session.role, Role::User);
        assert_eq!(session.bio, DEFAULT_BIO);
        assert_eq!(users.current_user(), Some(session));

        // the session slot never carries the password
        let raw = store.get(Slot::CurrentUser).unwrap().unwrap();
        assert!(!raw.contains("hunter2"));
    }

    #[test]
    fn test_avatar_seed_is_encoded() {
        let (users, _) = registry();
        let session = users.sign_up("Rock & Roll #1", "pw", "pw").unwrap();
        assert_eq!(
            session.avatar_url.as_deref(),
            Some("https://api.dicebear.com/9.x/bottts/svg?seed=rock+%26+roll+%231")
        );
    }

    #[test]
    fn test_reserved_names_become_admins() {
        let (users, _) = registry();
        assert!(users.sign_up("Owner", "pw", "pw").unwrap().is_admin());
    }

    #[test]
    fn test_sign_up_errors() {
        let (users, _) = registry();
        assert!(matches!(
            users.sign_up("wolf", "", "x"),
            Err(AccountError::MissingSignupFields)
        ));
        assert!(matches!(
            users.sign_up("wolf", "a", "b"),
            Err(AccountError::PasswordMismatch)
        ));
        users.sign_up("wolf", "a", "a").unwrap();
        assert!(matches!(
            users.sign_up("WOLF", "b", "b"),
            Err(AccountError::UsernameTaken)
        ));
    }

    #[test]
    fn test_log_in() {
        let (users, _) = registry();
        users.sign_up("wolf", "pw", "pw").unwrap();
        users.log_out().unwrap();
        assert_eq!(users.current_user(), None);

        assert!(matches!(users.log_in("bear", "pw"), Err(AccountError::UnknownUser)));
        assert!(matches!(
            users.log_in("wolf", "nope"),
            Err(AccountError::IncorrectPassword)
        ));
        assert_eq!(users.log_in("Wolf", " pw ").unwrap().username, "wolf");
        assert!(users.current_user().is_some());
    }

    #[test]
    fn test_change_username_moves_record_and_session() {
        let (users, _) = registry();
        users.sign_up("wolf", "pw", "pw").unwrap();
        users.sign_up("bear", "pw", "pw").unwrap();

        assert!(matches!(
            users.change_username("bear", "Wolf", "pw"),
            Err(AccountError::UsernameTaken)
        ));
        assert!(matches!(
            users.change_username("bear", "fox", "bad"),
            Err(AccountError::IncorrectCurrentPassword)
        ));

        let session = users.change_username("bear", "Fox", "pw").unwrap();
        assert_eq!(session.username, "fox");
        assert_eq!(users.current_user().unwrap().username, "fox");
        assert!(matches!(users.log_in("bear", "pw"), Err(AccountError::UnknownUser)));
        users.log_in("fox", "pw").unwrap();
    }

    #[test]
    fn test_change_password() {
        let (users, _) = registry();
        users.sign_up("wolf", "old", "old").unwrap();

        assert!(matches!(
            users.change_password("wolf", "old", "new", "other"),
            Err(AccountError::NewPasswordMismatch)
        ));
        assert!(matches!(
            users.change_password("wolf", "wrong", "new", "new"),
            Err(AccountError::IncorrectCurrentPassword)
        ));
        users.change_password("wolf", "old", "new", "new").unwrap();
        users.log_in("wolf", "new").unwrap();
    }

    #[test]
    fn test_update_profile_keeps_images_when_absent() {
        let (users, _) = registry();
        let before = users.sign_up("wolf", "pw", "pw").unwrap();

        let after = users
            .update_profile("wolf", "  raiding at dawn ", None, Some("data:image/png;base64,AA".into()))
            .unwrap();
        assert_eq!(after.bio, "raiding at dawn");
        assert_eq!(after.avatar_url, before.avatar_url);
        assert_eq!(after.banner_url.as_deref(), Some("data:image/png;base64,AA"));
    }

    #[test]
    fn test_delete_account() {
        let (users, _) = registry();
        users.sign_up("wolf", "pw", "pw").unwrap();

        assert!(matches!(
            users.delete_account("wolf", "nope"),
            Err(AccountError::IncorrectPassword)
        ));
        users.delete_account("wolf", "pw").unwrap();
        assert_eq!(users.current_user(), None);
        assert!(matches!(users.log_in("wolf", "pw"), Err(AccountError::UnknownUser)));
    }

    #[test]
    fn test_corrupt_registry_reads_as_empty() {
        let (users, store) = registry();
        store.set(Slot::UsersRegistry, "[1, 2").unwrap();
        store.set(Slot::CurrentUser, "nope").unwrap();

        assert_eq!(users.current_user(), None);
        assert!(matches!(users.log_in("wolf", "pw"), Err(AccountError::UnknownUser)));
        users.sign_up("wolf", "pw", "pw").unwrap();
    }
}
