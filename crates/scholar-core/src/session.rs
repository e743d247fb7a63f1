// ── Authentication collaborator ──
//
// Operators sign in against a local user directory. The signed-in user is
// held by an explicit `SessionContext` that the CLI creates at startup,
// restoring the persisted session record once, and passes to whatever
// needs it.

use std::fs;
use std::path::{Path, PathBuf};

use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::model::User;
use crate::validate::{FieldErrors, is_valid_email};

const USERS_FILE: &str = "users.json";
const SESSION_FILE: &str = "session.json";
const SALT_LEN: usize = 16;

// ── User directory ──────────────────────────────────────────────────

/// Credential store behind login and sign-up.
pub trait UserDirectory: Send + Sync {
    /// The user whose email and password both match, if any.
    fn find_user(&self, email: &str, password: &str) -> Result<Option<User>, CoreError>;

    /// Add a user. Fails when the email is already registered.
    fn register(&self, user: &User, password: &str) -> Result<(), CoreError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredUser {
    #[serde(flatten)]
    user: User,
    /// Argon2id PHC string, salt included.
    password_hash: String,
}

/// Users persisted as a JSON array with salted Argon2id password hashes.
pub struct FileUserDirectory {
    path: PathBuf,
}

impl FileUserDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<StoredUser>, CoreError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| CoreError::Session {
                message: format!("corrupt user directory {}: {e}", self.path.display()),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(io_error(&self.path, &e)),
        }
    }

    fn store(&self, users: &[StoredUser]) -> Result<(), CoreError> {
        let json = serde_json::to_string_pretty(users).map_err(|e| CoreError::Session {
            message: format!("cannot encode user directory: {e}"),
        })?;
        write_file(&self.path, &json)
    }
}

impl UserDirectory for FileUserDirectory {
    fn find_user(&self, email: &str, password: &str) -> Result<Option<User>, CoreError> {
        Ok(self
            .load()?
            .into_iter()
            .find(|u| u.user.email == email && verify_password(password, &u.password_hash))
            .map(|u| u.user))
    }

    fn register(&self, user: &User, password: &str) -> Result<(), CoreError> {
        let mut users = self.load()?;
        if users.iter().any(|u| u.user.email == user.email) {
            return Err(FieldErrors::single("email", "An account with this email already exists").into());
        }
        users.push(StoredUser {
            user: user.clone(),
            password_hash: hash_password(password)?,
        });
        self.store(&users)
    }
}

fn hash_password(password: &str) -> Result<String, CoreError> {
    let mut bytes = [0u8; SALT_LEN];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    let hashed = SaltString::encode_b64(&bytes)
        .and_then(|salt| Argon2::default().hash_password(password.as_bytes(), &salt).map(|h| h.to_string()));
    hashed.map_err(|e| CoreError::Session {
        message: format!("cannot hash password: {e}"),
    })
}

/// A stored hash that fails to parse never verifies.
fn verify_password(password: &str, stored: &str) -> bool {
    PasswordHash::new(stored)
        .is_ok_and(|hash| Argon2::default().verify_password(password.as_bytes(), &hash).is_ok())
}

// ── Session record ──────────────────────────────────────────────────

/// The persisted "current session" record.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the record. A corrupt file reads as signed out.
    pub fn load(&self) -> Result<Option<User>, CoreError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(user) => Ok(Some(user)),
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "ignoring corrupt session record");
                    Ok(None)
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&self.path, &e)),
        }
    }

    pub fn save(&self, user: &User) -> Result<(), CoreError> {
        let json = serde_json::to_string_pretty(user).map_err(|e| CoreError::Session {
            message: format!("cannot encode session: {e}"),
        })?;
        write_file(&self.path, &json)
    }

    pub fn clear(&self) -> Result<(), CoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&self.path, &e)),
        }
    }
}

// ── Session context ─────────────────────────────────────────────────

/// Input for `SessionContext::sign_up`.
#[derive(Debug, Clone, Default)]
pub struct SignUp {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

impl SignUp {
    fn validate(&self) -> Result<User, FieldErrors> {
        let mut errors = FieldErrors::new();
        for (field, value, message) in [
            ("first_name", &self.first_name, "First name is required"),
            ("last_name", &self.last_name, "Last name is required"),
            ("email", &self.email, "Email is required"),
        ] {
            if value.trim().is_empty() {
                errors.insert(field, message);
            }
        }
        if !self.email.trim().is_empty() && !is_valid_email(self.email.trim()) {
            errors.insert("email", "Email is invalid");
        }
        if self.password.is_empty() {
            errors.insert("password", "Password is required");
        }
        errors.into_result(User {
            first_name: self.first_name.trim().to_owned(),
            last_name: self.last_name.trim().to_owned(),
            email: self.email.trim().to_owned(),
        })
    }
}

/// Who is signed in, plus the stores that back it.
pub struct SessionContext {
    directory: Box<dyn UserDirectory>,
    store: SessionStore,
    current: Option<User>,
}

impl SessionContext {
    /// Build a context and restore the persisted session, if any.
    pub fn restore(directory: Box<dyn UserDirectory>, store: SessionStore) -> Result<Self, CoreError> {
        let current = store.load()?;
        if let Some(user) = &current {
            debug!(email = %user.email, "restored session");
        }
        Ok(Self {
            directory,
            store,
            current,
        })
    }

    /// File-backed context rooted at `data_dir`.
    pub fn open(data_dir: &Path) -> Result<Self, CoreError> {
        Self::restore(
            Box::new(FileUserDirectory::new(data_dir.join(USERS_FILE))),
            SessionStore::new(data_dir.join(SESSION_FILE)),
        )
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    /// The signed-in user, or `Unauthenticated`.
    pub fn require_user(&self) -> Result<&User, CoreError> {
        self.current.as_ref().ok_or(CoreError::Unauthenticated)
    }

    pub fn login(&mut self, email: &str, password: &str) -> Result<&User, CoreError> {
        let user = self
            .directory
            .find_user(email.trim(), password)?
            .ok_or(CoreError::AuthenticationFailed)?;
        self.store.save(&user)?;
        info!(email = %user.email, "logged in");
        Ok(self.current.insert(user))
    }

    /// Register a new operator and sign them in.
    pub fn sign_up(&mut self, form: &SignUp) -> Result<&User, CoreError> {
        let user = form.validate()?;
        self.directory.register(&user, &form.password)?;
        self.store.save(&user)?;
        info!(email = %user.email, "signed up");
        Ok(self.current.insert(user))
    }

    pub fn logout(&mut self) -> Result<(), CoreError> {
        self.store.clear()?;
        if let Some(user) = self.current.take() {
            info!(email = %user.email, "logged out");
        }
        Ok(())
    }
}

// ── File helpers ────────────────────────────────────────────────────

fn write_file(path: &Path, contents: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_error(parent, &e))?;
    }
    fs::write(path, contents).map_err(|e| io_error(path, &e))
}

fn io_error(path: &Path, err: &std::io::Error) -> CoreError {
    CoreError::Session {
        message: format!("{}: {err}", path.display()),
    }
}
