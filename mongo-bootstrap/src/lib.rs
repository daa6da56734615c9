//! MongoDB user bootstrap
//!
//! Creates one principal in a target database with a fixed set of role
//! grants, typically from a container entrypoint on first start.
//!
//! - `descriptor`: the user and its role grants
//! - `catalog`: the user-catalog seam and its MongoDB implementation
//! - `bootstrap`: configuration loading and the create/verify statement

pub mod bootstrap;
pub mod catalog;
pub mod descriptor;
pub mod error;

pub use bootstrap::{BootstrapConfig, BootstrapStatement, DatabaseConfig, Verification};
pub use catalog::{MongoCatalog, MongoTarget, UserCatalog};
pub use descriptor::{BuiltinRole, RoleGrant, UserDescriptor};
pub use error::BootstrapError;
