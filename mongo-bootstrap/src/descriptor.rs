//! User descriptor and role grants
//!
//! A descriptor is built once (from config or the built-in default) and
//! consumed by a single create-user request.

use crate::error::BootstrapError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Database the built-in default user is created in.
pub const DEFAULT_DATABASE: &str = "mongo";

/// A role name and the database its permissions apply to.
///
/// Serializes as `{ role, db }`, the shape MongoDB uses in `createUser`
/// and `usersInfo`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleGrant {
    pub role: String,
    pub db: String,
}

impl RoleGrant {
    pub fn new(role: impl Into<String>, db: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            db: db.into(),
        }
    }
}

impl fmt::Display for RoleGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.role, self.db)
    }
}

/// MongoDB built-in roles recognized without extra configuration.
///
/// Covers the built-ins documented through MongoDB 8.0. Roles added by later
/// server releases can be listed in `custom_roles`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinRole {
    Read,
    ReadWrite,
    DbAdmin,
    DbOwner,
    UserAdmin,
    ReadAnyDatabase,
    ReadWriteAnyDatabase,
    UserAdminAnyDatabase,
    DbAdminAnyDatabase,
    ClusterAdmin,
    ClusterManager,
    ClusterMonitor,
    HostManager,
    EnableSharding,
    DirectShardOperations,
    Backup,
    Restore,
    Root,
    System,
}

impl BuiltinRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::ReadWrite => "readWrite",
            Self::DbAdmin => "dbAdmin",
            Self::DbOwner => "dbOwner",
            Self::UserAdmin => "userAdmin",
            Self::ReadAnyDatabase => "readAnyDatabase",
            Self::ReadWriteAnyDatabase => "readWriteAnyDatabase",
            Self::UserAdminAnyDatabase => "userAdminAnyDatabase",
            Self::DbAdminAnyDatabase => "dbAdminAnyDatabase",
            Self::ClusterAdmin => "clusterAdmin",
            Self::ClusterManager => "clusterManager",
            Self::ClusterMonitor => "clusterMonitor",
            Self::HostManager => "hostManager",
            Self::EnableSharding => "enableSharding",
            Self::DirectShardOperations => "directShardOperations",
            Self::Backup => "backup",
            Self::Restore => "restore",
            Self::Root => "root",
            Self::System => "__system",
        }
    }

    /// Roles that can only be granted on the `admin` database.
    pub fn admin_only(&self) -> bool {
        !matches!(
            self,
            Self::Read | Self::ReadWrite | Self::DbAdmin | Self::DbOwner | Self::UserAdmin
        )
    }
}

impl FromStr for BuiltinRole {
    type Err = ();

    // Role names are case-sensitive on the server.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "read" => Self::Read,
            "readWrite" => Self::ReadWrite,
            "dbAdmin" => Self::DbAdmin,
            "dbOwner" => Self::DbOwner,
            "userAdmin" => Self::UserAdmin,
            "readAnyDatabase" => Self::ReadAnyDatabase,
            "readWriteAnyDatabase" => Self::ReadWriteAnyDatabase,
            "userAdminAnyDatabase" => Self::UserAdminAnyDatabase,
            "dbAdminAnyDatabase" => Self::DbAdminAnyDatabase,
            "clusterAdmin" => Self::ClusterAdmin,
            "clusterManager" => Self::ClusterManager,
            "clusterMonitor" => Self::ClusterMonitor,
            "hostManager" => Self::HostManager,
            "enableSharding" => Self::EnableSharding,
            "directShardOperations" => Self::DirectShardOperations,
            "backup" => Self::Backup,
            "restore" => Self::Restore,
            "root" => Self::Root,
            "__system" => Self::System,
            _ => return Err(()),
        })
    }
}

/// The principal to create: name, password and ordered role grants.
#[derive(Clone, Deserialize)]
pub struct UserDescriptor {
    pub name: String,
    #[serde(rename = "password")]
    pub credential: String,
    pub roles: Vec<RoleGrant>,
}

impl UserDescriptor {
    /// The default provisioning user: read/write plus admin on `mongo`.
    pub fn tester() -> Self {
        Self {
            name: "tester".to_string(),
            credential: "tester".to_string(),
            roles: vec![
                RoleGrant::new(BuiltinRole::ReadWrite.as_str(), DEFAULT_DATABASE),
                RoleGrant::new(BuiltinRole::DbAdmin.as_str(), DEFAULT_DATABASE),
            ],
        }
    }

    /// Check the descriptor before anything is sent to the server.
    ///
    /// Role names must be built-in or listed in `custom_roles`.
    pub fn validate(&self, custom_roles: &[String]) -> Result<(), BootstrapError> {
        if self.name.trim().is_empty() {
            return Err(invalid("user name is empty"));
        }
        if self.credential.is_empty() {
            return Err(invalid(format!("password for {:?} is empty", self.name)));
        }
        if self.roles.is_empty() {
            return Err(invalid(format!("no roles granted to {:?}", self.name)));
        }

        for grant in &self.roles {
            if grant.role.trim().is_empty() || grant.db.trim().is_empty() {
                return Err(invalid(format!(
                    "role grant {:?}@{:?} has an empty field",
                    grant.role, grant.db
                )));
            }

            match grant.role.parse::<BuiltinRole>() {
                Ok(role) if role.admin_only() && grant.db != "admin" => {
                    return Err(invalid(format!(
                        "role {} can only be granted on the admin database, not {:?}",
                        role.as_str(),
                        grant.db
                    )));
                }
                Ok(_) => {}
                Err(()) if custom_roles.iter().any(|r| r == &grant.role) => {}
                Err(()) => {
                    return Err(invalid(format!("unknown role {:?}", grant.role)));
                }
            }
        }

        Ok(())
    }

    /// True if `granted` holds exactly this descriptor's roles, in any order.
    pub fn grants_match(&self, granted: &[RoleGrant]) -> bool {
        let wanted: HashSet<&RoleGrant> = self.roles.iter().collect();
        let actual: HashSet<&RoleGrant> = granted.iter().collect();
        wanted == actual
    }
}

impl fmt::Debug for UserDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserDescriptor")
            .field("name", &self.name)
            .field("credential", &"<redacted>")
            .field("roles", &self.roles)
            .finish()
    }
}

fn invalid(reason: impl Into<String>) -> BootstrapError {
    BootstrapError::InvalidDescriptor(reason.into())
}
