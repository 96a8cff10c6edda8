//! Local user accounts.
//!
//! Accounts only separate one person's inventory from another's on the same
//! machine. Passwords are stored as salted SHA-256 digests.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::{info, warn};

use crate::error::{Result, TrackerError};
use crate::storage::KeyValueStore;

const USERS_KEY: &str = "users";
const AUTH_KEY: &str = "auth";

pub const DEMO_USERNAME: &str = "devk";
pub const DEMO_PASSWORD: &str = "dev123";
const MIN_PASSWORD_LEN: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub email: String,
    pub password_hash: String,
    pub salt: String,
    #[serde(default)]
    pub is_demo: bool,
    pub created_at: String,
}

pub fn inventory_key(username: &str) -> String {
    format!("inventory:{username}")
}

fn new_salt() -> String {
    let mut salt = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);
    hex::encode(salt)
}

pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

pub struct AccountRegistry {
    storage: Rc<dyn KeyValueStore>,
}

impl AccountRegistry {
    pub fn new(storage: Rc<dyn KeyValueStore>) -> Self {
        AccountRegistry { storage }
    }

    /// All accounts. An unreadable user table is dropped and treated as empty.
    pub fn users(&self) -> Result<BTreeMap<String, UserRecord>> {
        let Some(raw) = self.storage.read(USERS_KEY)? else {
            return Ok(BTreeMap::new());
        };
        match serde_json::from_str(&raw) {
            Ok(users) => Ok(users),
            Err(e) => {
                warn!(error = %e, "discarding unreadable user table");
                self.storage.remove(USERS_KEY)?;
                Ok(BTreeMap::new())
            }
        }
    }

    fn save_users(&self, users: &BTreeMap<String, UserRecord>) -> Result<()> {
        self.storage.write(USERS_KEY, &serde_json::to_string(users)?)
    }

    pub fn register(&self, username: &str, email: &str, password: &str) -> Result<()> {
        let username = username.trim();
        let email = email.trim();
        if username.is_empty() || email.is_empty() || password.is_empty() {
            return Err(TrackerError::InvalidInput("username, email and password are required".into()));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(TrackerError::InvalidInput(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let mut users = self.users()?;
        if users.contains_key(username) {
            return Err(TrackerError::UserExists(username.to_string()));
        }

        let salt = new_salt();
        users.insert(
            username.to_string(),
            UserRecord {
                email: email.to_string(),
                password_hash: hash_password(password, &salt),
                salt,
                is_demo: false,
                created_at: chrono::Utc::now().to_rfc3339(),
            },
        );
        self.save_users(&users)?;
        info!(username, "registered account");
        Ok(())
    }

    /// Check credentials and mark the user as signed in.
    pub fn login(&self, username: &str, password: &str) -> Result<()> {
        let username = username.trim();
        let users = self.users()?;
        let user = users
            .get(username)
            .ok_or_else(|| TrackerError::UnknownUser(username.to_string()))?;
        if hash_password(password, &user.salt) != user.password_hash {
            warn!(username, "rejected login");
            return Err(TrackerError::InvalidCredentials);
        }
        self.set_current_user(username)?;
        info!(username, "signed in");
        Ok(())
    }

    /// The signed-in user, if that account still exists.
    pub fn current_user(&self) -> Result<Option<String>> {
        let Some(username) = self.storage.read(AUTH_KEY)? else {
            return Ok(None);
        };
        if self.users()?.contains_key(&username) {
            Ok(Some(username))
        } else {
            self.storage.remove(AUTH_KEY)?;
            Ok(None)
        }
    }

    pub fn set_current_user(&self, username: &str) -> Result<()> {
        self.storage.write(AUTH_KEY, username)
    }

    pub fn logout(&self) -> Result<()> {
        self.storage.remove(AUTH_KEY)
    }

    /// Create the demo account, or reset its password if it already exists.
    /// Returns true when the account was newly created.
    pub fn ensure_demo_account(&self) -> Result<bool> {
        let mut users = self.users()?;
        let salt = new_salt();
        let password_hash = hash_password(DEMO_PASSWORD, &salt);

        let created = match users.get_mut(DEMO_USERNAME) {
            Some(user) => {
                user.salt = salt;
                user.password_hash = password_hash;
                user.is_demo = true;
                false
            }
            None => {
                users.insert(
                    DEMO_USERNAME.to_string(),
                    UserRecord {
                        email: "devk@local".to_string(),
                        password_hash,
                        salt,
                        is_demo: true,
                        created_at: chrono::Utc::now().to_rfc3339(),
                    },
                );
                true
            }
        };
        self.save_users(&users)?;
        Ok(created)
    }
}
