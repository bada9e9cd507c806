//! User directory: registration and identity checks against stored users.

use crate::core::access::{AdminCapability, Caller};
use crate::core::error::{EngineError, EngineResult};
use crate::core::model::{NewUser, User, UserId};
use crate::core::repository::Repository;

/// Owns user rows within a transaction.
pub struct UserDirectory<'r, R: Repository> {
    repo: &'r mut R,
}

impl<'r, R: Repository> UserDirectory<'r, R> {
    /// Bind the directory to an open transaction.
    pub fn new(repo: &'r mut R) -> Self {
        Self { repo }
    }

    /// Register a user. Username, email and contact number must be unused.
    pub fn register(&mut self, new: NewUser, is_admin: bool) -> EngineResult<User> {
        let new = NewUser {
            username: required("username", &new.username)?,
            email: required("email", &new.email)?,
            contact_number: new
                .contact_number
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            address: required("address", &new.address)?,
        };

        if self.repo.user_by_username(&new.username)?.is_some() {
            return Err(duplicate("username", &new.username));
        }
        if self.repo.user_by_email(&new.email)?.is_some() {
            return Err(duplicate("email", &new.email));
        }
        if let Some(contact) = &new.contact_number {
            if self.repo.user_by_contact(contact)?.is_some() {
                return Err(duplicate("contact_number", contact));
            }
        }
        self.repo.insert_user(new, is_admin)
    }
}

/// Stored user for `id`.
pub fn load_user<R: Repository>(repo: &R, id: UserId) -> EngineResult<User> {
    repo.user(id)?.ok_or_else(|| EngineError::not_found("user", id))
}

/// Re-assert an admin capability against the stored user.
pub fn verify_admin<R: Repository>(repo: &R, capability: &AdminCapability) -> EngineResult<User> {
    let user = load_user(repo, capability.user_id())?;
    if !user.is_admin {
        return Err(EngineError::Forbidden(format!(
            "user {} is not an administrator",
            user.id
        )));
    }
    Ok(user)
}

/// Ensure the caller is a registered regular user; administrators manage
/// lots but do not park.
pub fn verify_member<R: Repository>(repo: &R, caller: &Caller) -> EngineResult<User> {
    let user = load_user(repo, caller.user_id)?;
    if user.is_admin || caller.is_admin {
        return Err(EngineError::Forbidden(
            "administrators cannot book parking spots".into(),
        ));
    }
    Ok(user)
}

fn duplicate(field: &'static str, value: &str) -> EngineError {
    EngineError::DuplicateUser {
        field,
        value: value.to_string(),
    }
}

fn required(field: &str, value: &str) -> EngineResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}
