//! Accounts and sessions.
//!
//! [`Authenticator`] is the one identity abstraction the rest of the app
//! talks to. [`LocalAuth`] implements it on top of a [`KeyValueStore`]:
//!
//! - `user:<username>` holds the account (profile, salt, password hash).
//! - `session` holds the username of whoever is logged in.
//!
//! Passwords are stored as salted SHA-256. This guards a local journal
//! database, not a network service.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::model::{ProfileUpdate, User};
use crate::storage::{KeyValueStore, StorageError};

const SESSION_KEY: &str = "session";
const MIN_USERNAME_LEN: usize = 3;
const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("username must be at least 3 characters")]
    UsernameTooShort,

    #[error("username can only contain letters, numbers, and underscores")]
    UsernameInvalid,

    #[error("display name is required")]
    DisplayNameMissing,

    #[error("password must be at least 6 characters")]
    PasswordTooShort,

    #[error("username already taken: {0}")]
    UsernameTaken(String),

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("not logged in")]
    NotLoggedIn,

    #[error("corrupt account record: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type Result<T> = core::result::Result<T, AuthError>;

/// Register, log in, log out, and look up the current user.
pub trait Authenticator {
    /// Creates an account and logs it in.
    fn register(&self, username: &str, display_name: &str, password: &str) -> Result<User>;

    /// Starts a session for an existing account.
    fn login(&self, username: &str, password: &str) -> Result<User>;

    /// Ends the current session. Idempotent.
    fn logout(&self) -> Result<()>;

    /// The logged-in user, if any.
    fn current_user(&self) -> Result<Option<User>>;

    /// Updates the logged-in user's profile.
    fn update_profile(&self, update: ProfileUpdate) -> Result<User>;
}

/// Stored form of an account.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Account {
    user: User,
    salt: String,
    password_hash: String,
}

/// Accounts kept in the local store.
pub struct LocalAuth<'a, S: KeyValueStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: KeyValueStore + ?Sized> LocalAuth<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    fn load_account(&self, username: &str) -> Result<Option<Account>> {
        match self.store.get(&user_key(username))? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn save_account(&self, account: &Account) -> Result<()> {
        let json = serde_json::to_string(account)?;
        self.store.set(&user_key(&account.user.username), &json)?;
        Ok(())
    }

    fn current_account(&self) -> Result<Option<Account>> {
        let Some(username) = self.store.get(SESSION_KEY)? else {
            return Ok(None);
        };
        let account = self.load_account(&username)?;
        if account.is_none() {
            tracing::warn!(%username, "session points at a missing account");
        }
        Ok(account)
    }
}

impl<S: KeyValueStore + ?Sized> Authenticator for LocalAuth<'_, S> {
    fn register(&self, username: &str, display_name: &str, password: &str) -> Result<User> {
        validate_username(username)?;
        if display_name.trim().is_empty() {
            return Err(AuthError::DisplayNameMissing);
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::PasswordTooShort);
        }
        if self.load_account(username)?.is_some() {
            return Err(AuthError::UsernameTaken(username.to_string()));
        }

        let salt = Uuid::new_v4().simple().to_string();
        let account = Account {
            user: User {
                id: Uuid::new_v4(),
                username: username.to_string(),
                display_name: display_name.trim().to_string(),
                bio: None,
                profile_image: None,
                created_at: Timestamp::now(),
            },
            password_hash: hash_password(&salt, password),
            salt,
        };
        self.save_account(&account)?;
        self.store.set(SESSION_KEY, username)?;
        tracing::info!(%username, "registered");
        Ok(account.user)
    }

    fn login(&self, username: &str, password: &str) -> Result<User> {
        let account = self
            .load_account(username)?
            .ok_or(AuthError::InvalidCredentials)?;
        if hash_password(&account.salt, password) != account.password_hash {
            return Err(AuthError::InvalidCredentials);
        }
        self.store.set(SESSION_KEY, username)?;
        tracing::info!(%username, "logged in");
        Ok(account.user)
    }

    fn logout(&self) -> Result<()> {
        self.store.remove(SESSION_KEY)?;
        Ok(())
    }

    fn current_user(&self) -> Result<Option<User>> {
        Ok(self.current_account()?.map(|a| a.user))
    }

    fn update_profile(&self, update: ProfileUpdate) -> Result<User> {
        let mut account = self.current_account()?.ok_or(AuthError::NotLoggedIn)?;
        account.user.apply(update);
        self.save_account(&account)?;
        Ok(account.user)
    }
}

fn user_key(username: &str) -> String {
    format!("user:{}", username.to_lowercase())
}

fn validate_username(username: &str) -> Result<()> {
    if username.chars().count() < MIN_USERNAME_LEN {
        return Err(AuthError::UsernameTooShort);
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(AuthError::UsernameInvalid);
    }
    Ok(())
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}
