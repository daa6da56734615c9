//! In-memory user catalog for tests

use super::UserCatalog;
use crate::descriptor::{RoleGrant, UserDescriptor};
use crate::error::BootstrapError;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub(crate) struct MemoryCatalog {
    users: Mutex<HashMap<(String, String), StoredUser>>,
    unreachable: bool,
    read_only: bool,
    create_calls: Mutex<u32>,
}

#[derive(Clone)]
pub(crate) struct StoredUser {
    pub credential: String,
    pub roles: Vec<RoleGrant>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request fails as if no server answered.
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    /// The session may read but not create users.
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }

    pub fn insert(&self, database: &str, name: &str, roles: Vec<RoleGrant>) {
        self.users.lock().unwrap().insert(
            (database.to_string(), name.to_string()),
            StoredUser {
                credential: String::new(),
                roles,
            },
        );
    }

    pub fn user(&self, database: &str, name: &str) -> Option<StoredUser> {
        self.users
            .lock()
            .unwrap()
            .get(&(database.to_string(), name.to_string()))
            .cloned()
    }

    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    pub fn create_calls(&self) -> u32 {
        *self.create_calls.lock().unwrap()
    }

    /// Mirrors server-side authentication: the principal only exists in the
    /// database it was created in.
    pub fn authenticate(&self, database: &str, name: &str, password: &str) -> bool {
        self.user(database, name)
            .map(|u| u.credential == password)
            .unwrap_or(false)
    }

    fn check_reachable(&self) -> Result<(), BootstrapError> {
        if self.unreachable {
            return Err(BootstrapError::ConnectionError(
                "Server selection timeout: No available servers".to_string(),
            ));
        }
        Ok(())
    }
}

impl UserCatalog for MemoryCatalog {
    async fn create_user(&self, database: &str, user: &UserDescriptor) -> Result<(), BootstrapError> {
        *self.create_calls.lock().unwrap() += 1;
        self.check_reachable()?;
        if self.read_only {
            return Err(BootstrapError::PermissionDenied(format!(
                "not authorized on {} to execute command {{ createUser: \"{}\" }}",
                database, user.name
            )));
        }

        let mut users = self.users.lock().unwrap();
        let key = (database.to_string(), user.name.clone());
        if users.contains_key(&key) {
            return Err(BootstrapError::AlreadyExists {
                user: user.name.clone(),
                database: database.to_string(),
            });
        }
        users.insert(
            key,
            StoredUser {
                credential: user.credential.clone(),
                roles: user.roles.clone(),
            },
        );
        Ok(())
    }

    async fn user_grants(
        &self,
        database: &str,
        name: &str,
    ) -> Result<Option<Vec<RoleGrant>>, BootstrapError> {
        self.check_reachable()?;
        Ok(self.user(database, name).map(|u| u.roles))
    }
}
