//! Authentication store: user names, Argon2id password hashes, roles.

use crate::error::{StorageError, StorageResult};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use transdoc_model::User;
use transdoc_types::Id;

/// Authentication collaborator consumed by the dispatcher.
///
/// `verify` answers `None` both for an unknown user name and for a wrong
/// password, so a caller cannot probe which user names exist.
#[async_trait]
pub trait AuthStore: Send + Sync {
    /// Registers credentials for a user. Fails with
    /// [`StorageError::UserNameTaken`] when the name is in use.
    async fn put_credentials(
        &self,
        user_name: &str,
        password: &str,
        user: Id<User>,
    ) -> StorageResult<()>;

    /// Verifies a name/password pair, returning the user id on success.
    async fn verify(&self, user_name: &str, password: &str) -> StorageResult<Option<Id<User>>>;

    /// Renames and/or re-passwords an existing credential record. The old
    /// pair must verify first; returns `false` when it does not.
    async fn update_credentials(
        &self,
        old_user_name: &str,
        new_user_name: &str,
        old_password: &str,
        new_password: &str,
    ) -> StorageResult<bool>;

    /// Drops the credentials bound to a user id (user deletion).
    async fn remove_user(&self, user: &Id<User>) -> StorageResult<()>;
}

struct Credential {
    user: Id<User>,
    /// PHC string, Argon2id.
    password_hash: String,
}

/// In-memory reference implementation of [`AuthStore`].
#[derive(Clone, Default)]
pub struct MemAuthStore {
    inner: Arc<RwLock<HashMap<String, Credential>>>,
}

impl MemAuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn hash_password(password: &str) -> StorageResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| StorageError::Credential(e.to_string()))
    }

    fn verify_hash(password: &str, phc: &str) -> StorageResult<bool> {
        let parsed = PasswordHash::new(phc).map_err(|e| StorageError::Credential(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

#[async_trait]
impl AuthStore for MemAuthStore {
    async fn put_credentials(
        &self,
        user_name: &str,
        password: &str,
        user: Id<User>,
    ) -> StorageResult<()> {
        let password_hash = Self::hash_password(password)?;
        let mut inner = self.inner.write().unwrap();
        if inner.contains_key(user_name) {
            return Err(StorageError::UserNameTaken {
                user_name: user_name.to_string(),
            });
        }
        inner.insert(
            user_name.to_string(),
            Credential {
                user,
                password_hash,
            },
        );
        Ok(())
    }

    async fn verify(&self, user_name: &str, password: &str) -> StorageResult<Option<Id<User>>> {
        // Clone the hash out so verification runs outside the lock.
        let found = {
            let inner = self.inner.read().unwrap();
            inner
                .get(user_name)
                .map(|c| (c.user.clone(), c.password_hash.clone()))
        };
        match found {
            Some((user, phc)) if Self::verify_hash(password, &phc)? => Ok(Some(user)),
            _ => Ok(None),
        }
    }

    async fn update_credentials(
        &self,
        old_user_name: &str,
        new_user_name: &str,
        old_password: &str,
        new_password: &str,
    ) -> StorageResult<bool> {
        let Some(user) = self.verify(old_user_name, old_password).await? else {
            return Ok(false);
        };
        let password_hash = Self::hash_password(new_password)?;

        let mut inner = self.inner.write().unwrap();
        if new_user_name != old_user_name && inner.contains_key(new_user_name) {
            return Err(StorageError::UserNameTaken {
                user_name: new_user_name.to_string(),
            });
        }
        inner.remove(old_user_name);
        inner.insert(
            new_user_name.to_string(),
            Credential {
                user,
                password_hash,
            },
        );
        Ok(true)
    }

    async fn remove_user(&self, user: &Id<User>) -> StorageResult<()> {
        let mut inner = self.inner.write().unwrap();
        inner.retain(|_, c| c.user != *user);
        Ok(())
    }
}
